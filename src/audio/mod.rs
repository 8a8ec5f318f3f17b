pub mod decode;
pub mod info;
pub mod merge;
pub mod source;
