pub mod encode_sequence_use_case;
pub mod pipeline_logger;
