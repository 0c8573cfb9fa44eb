//! Microphone capture lifecycle and clip encoding
//!
//! This module provides:
//! - The `CaptureBackend` trait and the cpal microphone implementation
//! - `RecordingController`, the state machine owning the single active session
//! - Lossless base64 encoding of finalized clips for transport

pub mod capture;
pub mod encode;
pub mod microphone;
pub mod recorder;

pub use capture::{AudioChunk, CaptureBackend, CaptureConfig};
pub use encode::{decode, encode, EncodedAudio};
pub use microphone::MicrophoneBackend;
pub use recorder::{AudioClip, RecordingController, SessionState, CLIP_MEDIA_TYPE};
