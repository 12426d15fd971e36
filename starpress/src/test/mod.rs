//! Integration tests: the gateway router and the upload client, both exercised against a
//! wiremock stand-in for the content service.

pub mod posts;
pub mod utils;
