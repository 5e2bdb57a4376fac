pub mod image_sequence_reader;
pub mod jpeg_frame_encoder;
pub mod mjpeg_avi_writer;
