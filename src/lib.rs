pub mod audio;
pub mod common;
pub mod configs;
