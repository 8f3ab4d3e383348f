pub mod block;
pub mod source;
pub mod spectrum;
