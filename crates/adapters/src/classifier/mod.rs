//! Image classification backends

pub mod http;
pub mod stub;

pub use http::HttpImageClassifier;
pub use stub::StubImageClassifier;
