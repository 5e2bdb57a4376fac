pub mod avi_writer;
