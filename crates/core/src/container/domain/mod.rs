pub mod fourcc;
pub mod frame_chunk;
pub mod header_records;
pub mod index_builder;
pub mod summary;
