use serde::{Deserialize, Serialize};

/// POST /api/voiceprint/enroll request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: String,
    pub audio_base64: String,
}

/// POST /api/voiceprint/enroll success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub message: String,
}

/// POST /api/voiceprint/identify request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
    pub audio_base64: String,
}

/// Outcome of an identify call. A null `user_id` means no match; a null
/// score means the match was unscored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// A remote-owned voiceprint record, scoped to a user. Ids are assigned by
/// the service, never by this client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceprintRecord {
    pub id: i64,
    pub create_time: String,
}

/// One entry of the remote identification log (append-only from the
/// client's perspective)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationLogEntry {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    pub create_time: String,
}

/// Aggregate counters reported by GET /api/voiceprint/stats.
///
/// Fields the service omits render as zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub today: u64,
}
