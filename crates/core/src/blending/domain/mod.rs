pub mod blend_accumulator;
pub mod frame_sampler;
pub mod pixel_conversion;
