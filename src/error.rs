//! Error types for the nova assistant.

/// Top-level error type for the voice command assistant.
#[derive(Debug, thiserror::Error)]
pub enum NovaError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Language-model request or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text-to-speech rendering error.
    #[error("TTS error: {0}")]
    Speech(String),

    /// Speech-to-text capture error.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// OS process control or keystroke injection error.
    #[error("platform error: {0}")]
    Platform(String),

    /// Operation not available on this host.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Calendar service error.
    #[error("calendar error: {0}")]
    Calendar(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Typed failure of a single speech-input capture.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Audio was captured but no speech could be understood.
    #[error("no speech understood")]
    NoSpeech,

    /// The recognizer could not be reached or started.
    #[error("speech recognition unavailable: {0}")]
    Unavailable(String),

    /// Any other recognizer failure.
    #[error("speech recognition failed: {0}")]
    Other(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, NovaError>;
