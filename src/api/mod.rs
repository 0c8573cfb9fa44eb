//! Client for the remote voiceprint service
//!
//! Six REST operations over a fixed contract:
//! - POST /api/voiceprint/enroll - Enroll captured audio for a user
//! - POST /api/voiceprint/identify - Identify the speaker of captured audio
//! - GET /api/voiceprint/user/:user_id - List a user's voiceprint records
//! - DELETE /api/voiceprint/:id - Delete one record
//! - GET /api/voiceprint/logs - Fetch the identification log
//! - GET /api/voiceprint/stats - Fetch aggregate statistics

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    EnrollRequest, EnrollResponse, IdentificationLogEntry, IdentificationResult, IdentifyRequest,
    Stats, VoiceprintRecord,
};
