use chrono::Utc;
use tracing::{info, warn};

use super::state::ViewState;
use crate::api::{ApiClient, IdentificationResult};
use crate::audio::{encode, AudioClip, CaptureBackend, EncodedAudio, RecordingController};
use crate::error::{Result, WorkflowError};

/// Overall workflow state, composed from the recording lifecycle and the
/// pending request state.
///
/// A failed submission returns to `EncodedReady`: the encoded audio is
/// retained so the same clip can be resubmitted. A fresh capture discards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Recording,
    EncodedReady,
    Submitting,
    Done,
}

/// Confirmation seam for destructive operations. The console implementation
/// blocks on a yes/no prompt; tests script the answer.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Blocking yes/no prompt on the operator's terminal
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        use std::io::Write;

        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

/// Reconciles operation outcomes into the display state and triggers the
/// dependent refreshes:
///
/// - successful enroll → refresh the record list for that user
/// - successful identify → refresh the identification log
/// - successful delete → refresh the record list for the selected user
/// - changing the selected user → fetch that user's record list
/// - initial load → stats and logs, fetched independently
pub struct Workflow<C: Confirm> {
    client: ApiClient,
    confirm: C,
    recorder: RecordingController,
    state: WorkflowState,
    encoded: Option<EncodedAudio>,
    pub view: ViewState,
}

impl<C: Confirm> Workflow<C> {
    pub fn new(client: ApiClient, confirm: C) -> Self {
        Self {
            client,
            confirm,
            recorder: RecordingController::new(),
            state: WorkflowState::Idle,
            encoded: None,
            view: ViewState::default(),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn encoded_audio(&self) -> Option<&EncodedAudio> {
        self.encoded.as_ref()
    }

    pub fn confirmer(&self) -> &C {
        &self.confirm
    }

    /// Fetch stats and logs once, with no ordering dependency between them.
    /// Both results are applied independently; the first failure (if any) is
    /// surfaced after both have settled.
    pub async fn initial_load(&mut self) -> Result<()> {
        let (stats, logs) = tokio::join!(self.client.get_stats(), self.client.list_logs());

        let mut first_err = None;

        match stats {
            Ok(s) => {
                self.view.stats = Some(s);
                self.view.stats_refreshed_at = Some(Utc::now());
            }
            Err(e) => first_err = Some(e),
        }

        match logs {
            Ok(entries) => self.view.logs = entries,
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Begin a new capture. The previously encoded audio is discarded only
    /// once the device grant succeeds.
    pub async fn start_recording(&mut self, backend: Box<dyn CaptureBackend>) -> Result<()> {
        self.recorder.start(backend).await?;
        self.encoded = None;
        self.view.last_identification = None;
        self.state = WorkflowState::Recording;
        Ok(())
    }

    /// Stop the capture, finalize the clip, and encode it for transport.
    pub async fn stop_recording(&mut self) -> Result<AudioClip> {
        let clip = self.recorder.stop().await?;
        self.encoded = Some(encode(clip.bytes.clone()).await?);
        self.state = WorkflowState::EncodedReady;
        Ok(clip)
    }

    /// Enroll the captured clip for `user_id`; on success the record list for
    /// that user is refreshed.
    pub async fn enroll(&mut self, user_id: &str) -> Result<String> {
        let prev = self.state;
        let submitting = self.encoded.is_some() && !user_id.trim().is_empty();
        if submitting {
            self.state = WorkflowState::Submitting;
        }

        match self.client.enroll(user_id, self.encoded.as_ref()).await {
            Ok(response) => {
                self.state = WorkflowState::Done;
                self.view.selected_user = Some(user_id.to_string());
                if let Err(e) = self.refresh_records().await {
                    warn!("Record list refresh failed after enroll: {}", e);
                }
                Ok(response.message)
            }
            Err(e) => {
                self.state = if submitting {
                    WorkflowState::EncodedReady
                } else {
                    prev
                };
                Err(e)
            }
        }
    }

    /// Identify the speaker of the captured clip; the identification log is
    /// refreshed on success whether or not anyone matched.
    pub async fn identify(&mut self) -> Result<IdentificationResult> {
        let prev = self.state;
        let submitting = self.encoded.is_some();
        if submitting {
            self.state = WorkflowState::Submitting;
        }

        match self.client.identify(self.encoded.as_ref()).await {
            Ok(result) => {
                self.state = WorkflowState::Done;
                self.view.last_identification = Some(result.clone());
                if let Err(e) = self.refresh_logs().await {
                    warn!("Log list refresh failed after identify: {}", e);
                }
                Ok(result)
            }
            Err(e) => {
                self.state = if submitting {
                    WorkflowState::EncodedReady
                } else {
                    prev
                };
                Err(e)
            }
        }
    }

    /// Change the selected user and fetch that user's record list.
    pub async fn select_user(&mut self, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "a user id is required".to_string(),
            ));
        }
        self.view.selected_user = Some(user_id.to_string());
        self.refresh_records().await
    }

    /// Delete a voiceprint record after explicit confirmation. Returns
    /// `false` (and sends nothing) when the operator declines.
    pub async fn delete_record(&mut self, id: i64) -> Result<bool> {
        if !self.confirm.confirm(&format!("Delete voiceprint {}?", id)) {
            info!("Deletion of record {} not confirmed", id);
            return Ok(false);
        }

        self.client.delete_record(id).await?;
        if let Err(e) = self.refresh_records().await {
            warn!("Record list refresh failed after delete: {}", e);
        }
        Ok(true)
    }

    /// Re-fetch the aggregate stats snapshot.
    pub async fn refresh_stats(&mut self) -> Result<()> {
        self.view.stats = Some(self.client.get_stats().await?);
        self.view.stats_refreshed_at = Some(Utc::now());
        Ok(())
    }

    /// Re-fetch the record list for the currently selected user, if any.
    pub async fn refresh_records(&mut self) -> Result<()> {
        let Some(user) = self.view.selected_user.clone() else {
            return Ok(());
        };
        self.view.records = self.client.list_by_user(&user).await?;
        Ok(())
    }

    /// Re-fetch the identification log.
    pub async fn refresh_logs(&mut self) -> Result<()> {
        self.view.logs = self.client.list_logs().await?;
        Ok(())
    }
}
