//! Request/response models for the gateway API.

pub mod posts;
