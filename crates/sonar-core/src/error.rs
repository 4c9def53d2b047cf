use thiserror::Error;

/// Failures surfaced by the audio device while starting up.
///
/// Everything past `start_audio` is total: unknown ids, empty removals and
/// out-of-range positions are absorbed rather than reported.
#[derive(Debug, Error)]
pub enum SonarError {
    /// The host has no usable audio backend.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// The listener could not be placed or oriented.
    #[error("listener setup failed: {0}")]
    Listener(String),

    /// An oscillator/gain/panner chain could not be built.
    #[error("source creation failed: {0}")]
    SourceCreation(String),
}

impl SonarError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::AudioUnavailable(msg.into())
    }

    pub fn listener(msg: impl Into<String>) -> Self {
        Self::Listener(msg.into())
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::SourceCreation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SonarError>;
