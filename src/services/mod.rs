pub mod collector;
pub mod dispatcher;
pub mod extractor;
pub mod multipart;
pub mod payload;
pub mod relay;
