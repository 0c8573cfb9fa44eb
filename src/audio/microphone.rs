use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc as std_mpsc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::capture::{AudioChunk, CaptureBackend, CaptureConfig};
use crate::error::{Result, WorkflowError};

/// Microphone capture backend built on cpal.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated thread and
/// the async side talks to it through channels. `start()` resolves only once
/// the device grant or denial is known.
pub struct MicrophoneBackend {
    config: CaptureConfig,
    worker: Option<Worker>,
}

struct Worker {
    stop_tx: std_mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl MicrophoneBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            worker: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>> {
        if self.worker.is_some() {
            return Err(WorkflowError::Validation(
                "capture is already running".to_string(),
            ));
        }

        let (ready_tx, ready_rx) = std_mpsc::channel::<std::result::Result<(), String>>();
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();

        let device_name = self.config.device.clone();
        let handle = thread::spawn(move || capture_thread(device_name, chunk_tx, ready_tx, stop_rx));

        // Wait for the grant/denial without blocking the runtime.
        let ready = tokio::task::spawn_blocking(move || ready_rx.recv()).await?;

        match ready {
            Ok(Ok(())) => {
                self.worker = Some(Worker { stop_tx, handle });
                Ok(chunk_rx)
            }
            Ok(Err(msg)) => {
                let _ = handle.join();
                Err(WorkflowError::DeviceAccess(msg))
            }
            Err(_) => {
                let _ = handle.join();
                Err(WorkflowError::DeviceAccess(
                    "capture thread exited before the device grant resolved".to_string(),
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            warn!("Microphone stop requested but capture is not running");
            return Ok(());
        };

        let joined = tokio::task::spawn_blocking(move || {
            let _ = worker.stop_tx.send(());
            worker.handle.join()
        })
        .await?;

        if joined.is_err() {
            warn!("Capture thread panicked during shutdown");
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            // Signal the thread; it releases the device on its own.
            let _ = worker.stop_tx.send(());
        }
    }
}

/// Owns the cpal stream for the lifetime of one capture.
///
/// Dropping the stream releases the input device, so the thread holds it
/// until a stop signal arrives or the backend is dropped.
fn capture_thread(
    device_name: Option<String>,
    chunk_tx: mpsc::UnboundedSender<AudioChunk>,
    ready_tx: std_mpsc::Sender<std::result::Result<(), String>>,
    stop_rx: std_mpsc::Receiver<()>,
) {
    let stream = match open_input_stream(device_name, chunk_tx) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(msg) => {
            let _ = ready_tx.send(Err(msg));
            return;
        }
    };

    loop {
        match stop_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(()) | Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
            Err(std_mpsc::RecvTimeoutError::Timeout) => {}
        }
    }

    drop(stream);
    info!("Microphone released");
}

fn open_input_stream(
    device_name: Option<String>,
    chunk_tx: mpsc::UnboundedSender<AudioChunk>,
) -> std::result::Result<cpal::Stream, String> {
    let host = cpal::default_host();

    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| format!("failed to enumerate input devices: {}", e))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| format!("input device '{}' not found", name))?,
        None => host
            .default_input_device()
            .ok_or_else(|| "no input device available".to_string())?,
    };

    let supported = device
        .default_input_config()
        .map_err(|e| format!("failed to query device config: {}", e))?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();
    let sample_rate = stream_config.sample_rate.0;
    let channels = stream_config.channels;

    info!(
        "Capturing from '{}' at {} Hz, {} channel(s)",
        device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate,
        channels
    );

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            let tx = chunk_tx.clone();
            let mut samples_seen: u64 = 0;
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<i16> = data
                        .iter()
                        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    push_chunk(&tx, samples, sample_rate, channels, &mut samples_seen);
                },
                stream_error,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let tx = chunk_tx.clone();
            let mut samples_seen: u64 = 0;
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    push_chunk(&tx, data.to_vec(), sample_rate, channels, &mut samples_seen);
                },
                stream_error,
                None,
            )
        }
        other => return Err(format!("unsupported sample format: {:?}", other)),
    }
    .map_err(|e| format!("failed to open input stream: {}", e))?;

    stream
        .play()
        .map_err(|e| format!("failed to start input stream: {}", e))?;

    Ok(stream)
}

fn push_chunk(
    tx: &mpsc::UnboundedSender<AudioChunk>,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
    samples_seen: &mut u64,
) {
    let timestamp_ms = *samples_seen * 1000 / (sample_rate as u64 * channels as u64);
    *samples_seen += samples.len() as u64;

    // A dropped receiver means the session was abandoned; nothing to do.
    let _ = tx.send(AudioChunk {
        samples,
        sample_rate,
        channels,
        timestamp_ms,
    });
}

fn stream_error(e: cpal::StreamError) {
    error!("Input stream error: {}", e);
}
