use tokio::sync::mpsc;

use crate::error::Result;

/// Audio sample data captured from an input device (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for a capture backend
#[derive(Debug, Clone, Default)]
pub struct CaptureConfig {
    /// Input device name; the system default device is used when unset
    pub device: Option<String>,
}

/// Audio capture backend trait
///
/// The microphone is an exclusively held resource: a backend acquires it in
/// `start()` and must release it on every exit path, whether `stop()` is
/// called, the grant fails, or the backend is dropped mid-capture.
#[async_trait::async_trait]
pub trait CaptureBackend: Send {
    /// Request access to the input device and start capturing.
    ///
    /// Returns a channel receiver that will receive audio chunks. Fails with
    /// a device-access error when the device is denied or unavailable.
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>>;

    /// Stop capturing and release the device.
    async fn stop(&mut self) -> Result<()>;

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
