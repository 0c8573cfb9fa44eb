pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod view;

pub use api::{
    ApiClient, EnrollRequest, EnrollResponse, IdentificationLogEntry, IdentificationResult,
    IdentifyRequest, Stats, VoiceprintRecord,
};
pub use audio::{
    decode, encode, AudioChunk, AudioClip, CaptureBackend, CaptureConfig, EncodedAudio,
    MicrophoneBackend, RecordingController, SessionState, CLIP_MEDIA_TYPE,
};
pub use config::Config;
pub use error::{Result, WorkflowError};
pub use view::{Confirm, StdinConfirm, ViewState, Workflow, WorkflowState};
