pub mod decode;
pub mod scale;
