pub mod routine;
pub mod source;
