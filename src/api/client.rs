use serde::de::DeserializeOwned;
use tracing::info;

use super::types::{
    EnrollRequest, EnrollResponse, IdentificationLogEntry, IdentificationResult, IdentifyRequest,
    Stats, VoiceprintRecord,
};
use crate::audio::EncodedAudio;
use crate::error::{Result, WorkflowError};

/// Client for the six operations of the remote voiceprint service.
///
/// Each call is a single request with a single completion: no retry, no
/// timeout, no cancellation. Local preconditions are checked before any
/// network I/O; every non-2xx response surfaces the raw body verbatim.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Enroll the captured audio as a voiceprint for `user_id`.
    pub async fn enroll(
        &self,
        user_id: &str,
        audio: Option<&EncodedAudio>,
    ) -> Result<EnrollResponse> {
        if user_id.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "a user id is required to enroll".to_string(),
            ));
        }
        let audio = audio.ok_or_else(no_audio)?;

        info!("Enrolling voiceprint for user {}", user_id);

        let body = EnrollRequest {
            user_id: user_id.to_string(),
            audio_base64: audio.as_str().to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/voiceprint/enroll", self.base_url))
            .json(&body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Submit the captured audio for identification.
    pub async fn identify(&self, audio: Option<&EncodedAudio>) -> Result<IdentificationResult> {
        let audio = audio.ok_or_else(no_audio)?;

        info!("Submitting audio for identification");

        let body = IdentifyRequest {
            audio_base64: audio.as_str().to_string(),
        };
        let response = self
            .http
            .post(format!("{}/api/voiceprint/identify", self.base_url))
            .json(&body)
            .send()
            .await?;

        read_json(response).await
    }

    /// List the voiceprint records enrolled for `user_id`.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<VoiceprintRecord>> {
        if user_id.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "a user id is required to list voiceprints".to_string(),
            ));
        }

        let response = self
            .http
            .get(format!("{}/api/voiceprint/user/{}", self.base_url, user_id))
            .send()
            .await?;

        read_json(response).await
    }

    /// Delete a voiceprint record by id. The caller is responsible for
    /// confirming the deletion with the operator first.
    pub async fn delete_record(&self, id: i64) -> Result<()> {
        info!("Deleting voiceprint record {}", id);

        let response = self
            .http
            .delete(format!("{}/api/voiceprint/{}", self.base_url, id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(WorkflowError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Fetch the remote identification log.
    pub async fn list_logs(&self) -> Result<Vec<IdentificationLogEntry>> {
        let response = self
            .http
            .get(format!("{}/api/voiceprint/logs", self.base_url))
            .send()
            .await?;

        read_json(response).await
    }

    /// Fetch the aggregate voiceprint statistics.
    pub async fn get_stats(&self) -> Result<Stats> {
        let response = self
            .http
            .get(format!("{}/api/voiceprint/stats", self.base_url))
            .send()
            .await?;

        read_json(response).await
    }
}

fn no_audio() -> WorkflowError {
    WorkflowError::Validation("no audio has been captured yet".to_string())
}

/// Read a 2xx body as JSON; any other status carries the raw body through as
/// the only diagnostic. A malformed success body is treated the same way.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(WorkflowError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| WorkflowError::Remote {
        status: status.as_u16(),
        body: format!("malformed response body: {}", e),
    })
}
