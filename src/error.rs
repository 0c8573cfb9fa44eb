use thiserror::Error;

/// Errors surfaced to the operator by the voiceprint workflow.
///
/// Every failure is terminal for that single attempt: nothing is retried
/// automatically, and no failure is fatal to the workflow as a whole.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Microphone access was denied or the device is unavailable.
    /// The recording lifecycle stays in Idle.
    #[error("microphone unavailable: {0}")]
    DeviceAccess(String),

    /// A required local input is missing or an operation was invoked in the
    /// wrong state. Reported before any network call is made.
    #[error("{0}")]
    Validation(String),

    /// The remote service answered with a non-2xx status. The raw response
    /// body is the only diagnostic.
    #[error("remote service returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// Connection-level failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Finalizing the captured clip into a WAV container failed.
    #[error("failed to finalize recording: {0}")]
    Finalize(#[from] hound::Error),

    /// A background task (encode on the blocking pool) panicked.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
