pub mod document;
pub mod request;
pub mod section;
pub mod source;
