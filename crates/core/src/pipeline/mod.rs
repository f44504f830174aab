pub mod create_timelapse_use_case;
pub mod encode_sequence_use_case;
pub mod pipeline_logger;
pub mod sample_and_blend_use_case;
pub mod timelapse_error;
pub mod timelapse_runner;
