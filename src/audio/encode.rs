use base64::Engine;

use crate::error::{Result, WorkflowError};

/// Transport-safe text form of a clip's bytes (standard base64, padded).
///
/// Encoding is lossless and deterministic: decoding always recovers the
/// original bytes exactly, including for zero-length clips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    base64: String,
}

impl EncodedAudio {
    pub fn from_base64(base64: String) -> Self {
        Self { base64 }
    }

    pub fn as_str(&self) -> &str {
        &self.base64
    }
}

/// Encode clip bytes to base64 on the blocking pool, suspending the caller
/// exactly once.
pub async fn encode(bytes: Vec<u8>) -> Result<EncodedAudio> {
    let base64 =
        tokio::task::spawn_blocking(move || base64::engine::general_purpose::STANDARD.encode(bytes))
            .await?;
    Ok(EncodedAudio { base64 })
}

/// Recover the original clip bytes from their base64 form.
pub async fn decode(encoded: &EncodedAudio) -> Result<Vec<u8>> {
    let text = encoded.base64.clone();
    tokio::task::spawn_blocking(move || base64::engine::general_purpose::STANDARD.decode(text))
        .await?
        .map_err(|e| WorkflowError::Validation(format!("invalid base64 audio: {}", e)))
}
