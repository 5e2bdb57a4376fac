pub mod byte_codec;
pub mod constants;
pub mod encode_settings;
pub mod frame;
pub mod video_metadata;
