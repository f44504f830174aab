pub mod blending;
pub mod pipeline;
pub mod shared;
pub mod video;
