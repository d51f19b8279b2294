#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Typed Rust HTTP client for the OmniCaption caption generation API
//!
//! Submits a topic, a tone and an optional image as a multipart form and
//! returns one caption per platform. [`CaptionSession`] wraps the client with
//! the form state and the single-request lifecycle a front end needs.

mod client;
pub mod error;
mod generator;
pub mod session;
pub mod types;

pub use client::CaptionClient;
pub use error::{CaptionClientError, ErrorKind, Result};
pub use generator::CaptionGenerator;
pub use session::{CaptionSession, GENERIC_FAILURE_MESSAGE, Phase, SessionError};
pub use types::*;
