//! Social media caption generator for a dental implant clinic
//!
//! Encodes uploaded images and an optional audio clip, asks a multimodal
//! Gemini model for three captions (informative, friendly, professional)
//! under a strict JSON schema, and validates the reply.

pub mod ai;
pub mod app;
pub mod error;
pub mod media;
pub mod models;
pub mod prompts;

pub use error::{Error, ErrorKind, Result};
