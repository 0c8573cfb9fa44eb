use std::io::Cursor;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::capture::{AudioChunk, CaptureBackend};
use crate::error::{Result, WorkflowError};

/// Media type declared on every finalized clip.
pub const CLIP_MEDIA_TYPE: &str = "audio/wav";

/// Lifecycle state of the capture workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session exists
    Idle,
    /// Device access requested, grant/denial pending
    Requesting,
    /// Device granted, chunks accumulating
    Recording,
    /// Clip finalized, device released
    Stopped,
}

/// An immutable captured clip: WAV bytes plus the declared media type
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
    /// Clip length derived from the captured sample count
    pub duration_secs: f64,
}

/// The single active capture, owned by the controller rather than held in
/// ambient scope so two sessions can never share chunk buffers.
struct RecordingSession {
    backend: Box<dyn CaptureBackend>,
    chunk_rx: mpsc::UnboundedReceiver<AudioChunk>,
}

/// Owns the microphone capture lifecycle.
///
/// At most one session is active at a time; a `start()` while a session is
/// active is rejected instead of merging chunk sequences.
pub struct RecordingController {
    state: SessionState,
    session: Option<RecordingSession>,
}

impl RecordingController {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Request device access and begin accumulating chunks.
    ///
    /// On denial the controller reports the failure synchronously and remains
    /// Idle; the backend is dropped, which releases any partial grant.
    pub async fn start(&mut self, mut backend: Box<dyn CaptureBackend>) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Stopped => {}
            SessionState::Requesting | SessionState::Recording => {
                return Err(WorkflowError::Validation(
                    "a recording is already in progress".to_string(),
                ));
            }
        }

        info!("Requesting audio input device ({})", backend.name());
        self.state = SessionState::Requesting;

        match backend.start().await {
            Ok(chunk_rx) => {
                self.session = Some(RecordingSession { backend, chunk_rx });
                self.state = SessionState::Recording;
                info!("Recording started");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Stop capturing and finalize the accumulated chunks into a clip.
    ///
    /// The device is released first, unconditionally, before finalization.
    pub async fn stop(&mut self) -> Result<AudioClip> {
        if self.state != SessionState::Recording {
            return Err(WorkflowError::Validation(
                "no recording is in progress".to_string(),
            ));
        }

        let mut session = match self.session.take() {
            Some(s) => s,
            None => {
                self.state = SessionState::Idle;
                return Err(WorkflowError::Validation(
                    "no recording is in progress".to_string(),
                ));
            }
        };

        if let Err(e) = session.backend.stop().await {
            // The device is released by the backend on its own exit path;
            // the chunks captured so far are still usable.
            warn!("Capture backend reported an error on stop: {}", e);
        }

        let mut chunks = Vec::new();
        while let Ok(chunk) = session.chunk_rx.try_recv() {
            chunks.push(chunk);
        }
        self.state = SessionState::Stopped;

        let clip = finalize_clip(&chunks)?;
        info!(
            "Recording stopped: {:.1}s, {} bytes",
            clip.duration_secs,
            clip.bytes.len()
        );

        Ok(clip)
    }
}

impl Default for RecordingController {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate captured chunks into a single in-memory WAV blob.
fn finalize_clip(chunks: &[AudioChunk]) -> Result<AudioClip> {
    let (sample_rate, channels) = chunks
        .first()
        .map(|c| (c.sample_rate, c.channels))
        .unwrap_or((16000, 1));

    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut sample_count: usize = 0;
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for chunk in chunks {
            for &sample in &chunk.samples {
                writer.write_sample(sample)?;
            }
            sample_count += chunk.samples.len();
        }
        writer.finalize()?;
    }

    let duration_secs = sample_count as f64 / (sample_rate as f64 * channels as f64);

    Ok(AudioClip {
        bytes: cursor.into_inner(),
        media_type: CLIP_MEDIA_TYPE,
        duration_secs,
    })
}
