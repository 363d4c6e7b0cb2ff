pub mod buffer;
pub mod decode;
pub mod spectrum;
