pub mod config;
pub mod constants;
pub mod raw_stream;
