//! Form state and request lifecycle around a single in-flight generation

use crate::error::CaptionClientError;
use crate::generator::CaptionGenerator;
use crate::types::{CaptionsResponse, GenerationRequest, ImageUpload, Tone};

/// Message shown for every failed generation, whatever the cause
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate captions. Please try again.";

/// Where the session is in its request lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted, or results cleared
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// Last request succeeded
    Ready(CaptionsResponse),
    /// Last request failed; carries the user-facing message
    Failed(String),
}

/// Reasons a submission did not produce captions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another request is still in flight
    #[error("a caption request is already in progress")]
    Busy,
    /// Neither topic nor image is set
    #[error("enter a topic or select an image first")]
    Invalid,
    /// The request was sent and failed
    #[error("{0}")]
    Failed(String),
}

/// Caption form plus the Idle/Loading/Ready/Failed state machine
///
/// Only one request may be in flight; a second `begin` while loading is
/// rejected rather than queued. Results of a failed request never mix with
/// those of an earlier success.
#[derive(Debug, Clone, Default)]
pub struct CaptionSession {
    topic: String,
    tone: Tone,
    image: Option<ImageUpload>,
    phase: Phase,
}

impl CaptionSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Form --

    /// Raw topic text as entered
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub const fn tone(&self) -> Tone {
        self.tone
    }

    pub const fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub const fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    /// Attach an image, replacing any previous one
    pub fn select_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    /// Detach the current image, returning it
    pub const fn remove_image(&mut self) -> Option<ImageUpload> {
        self.image.take()
    }

    // -- Lifecycle --

    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether a request is in flight
    pub const fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// Captions from the last successful request
    pub const fn results(&self) -> Option<&CaptionsResponse> {
        match &self.phase {
            Phase::Ready(results) => Some(results),
            _ => None,
        }
    }

    /// User-facing message from the last failed request
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether the submit action should be enabled
    pub fn can_submit(&self) -> bool {
        !self.is_busy() && (!self.topic.trim().is_empty() || self.image.is_some())
    }

    /// Start a submission
    ///
    /// On success the previous results and error are cleared, the session is
    /// `Loading`, and the returned request reflects the current form.
    ///
    /// # Errors
    ///
    /// Returns `Busy` while a request is in flight and `Invalid` when there is
    /// nothing to caption; the session is unchanged in both cases
    pub fn begin(&mut self) -> Result<GenerationRequest, SessionError> {
        if self.is_busy() {
            return Err(SessionError::Busy);
        }

        let request = GenerationRequest::new(&self.topic, self.tone, self.image.clone());
        if request.validate().is_err() {
            return Err(SessionError::Invalid);
        }

        self.phase = Phase::Loading;

        Ok(request)
    }

    /// Record the outcome of the request started by [`CaptionSession::begin`]
    ///
    /// Returns false and drops the outcome when no request is in flight, e.g.
    /// after [`CaptionSession::clear`].
    pub fn finish(&mut self, outcome: Result<CaptionsResponse, CaptionClientError>) -> bool {
        if !self.is_busy() {
            tracing::debug!("dropping caption outcome for a request that is no longer pending");
            return false;
        }

        self.phase = match outcome {
            Ok(results) => Phase::Ready(results),
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "caption generation failed");
                Phase::Failed(GENERIC_FAILURE_MESSAGE.to_owned())
            }
        };

        true
    }

    /// Submit the current form through `generator` and wait for the outcome
    ///
    /// # Errors
    ///
    /// Returns `Busy` or `Invalid` from [`CaptionSession::begin`], or
    /// `Failed` with the generic message when the request fails
    pub async fn submit<G>(&mut self, generator: &G) -> Result<&CaptionsResponse, SessionError>
    where
        G: CaptionGenerator + ?Sized,
    {
        let request = self.begin()?;
        let outcome = generator.generate(&request).await;
        self.finish(outcome);

        match &self.phase {
            Phase::Ready(results) => Ok(results),
            Phase::Failed(message) => Err(SessionError::Failed(message.clone())),
            Phase::Idle | Phase::Loading => {
                Err(SessionError::Failed(GENERIC_FAILURE_MESSAGE.to_owned()))
            }
        }
    }

    /// Drop results and errors and return to `Idle`
    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
    }
}
