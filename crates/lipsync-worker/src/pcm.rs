//! Raw little-endian PCM reading and writing.

use std::path::Path;

use lipsync_models::DecodedAudio;
use serde::{Deserialize, Serialize};

use crate::error::{WorkerError, WorkerResult};

/// Sample encoding of a raw PCM file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 32-bit float, little endian
    #[default]
    F32le,
    /// 16-bit signed integer, little endian
    S16le,
}

impl SampleFormat {
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            SampleFormat::F32le => 4,
            SampleFormat::S16le => 2,
        }
    }
}

/// Decode interleaved PCM bytes.
pub fn decode_pcm(
    bytes: &[u8],
    format: SampleFormat,
    sample_rate: u32,
    channels: u16,
) -> WorkerResult<DecodedAudio> {
    let width = format.bytes_per_sample();
    if bytes.len() % width != 0 {
        return Err(WorkerError::invalid_audio(format!(
            "{} bytes is not a whole number of {:?} samples",
            bytes.len(),
            format
        )));
    }

    let samples: Vec<f32> = match format {
        SampleFormat::F32le => bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        SampleFormat::S16le => bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect(),
    };

    Ok(DecodedAudio::from_interleaved(samples, sample_rate, channels)?)
}

/// Encode audio as interleaved f32le bytes.
pub fn encode_f32le(audio: &DecodedAudio) -> Vec<u8> {
    audio.samples().iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub async fn read_pcm(
    path: &Path,
    format: SampleFormat,
    sample_rate: u32,
    channels: u16,
) -> WorkerResult<DecodedAudio> {
    let bytes = tokio::fs::read(path).await?;
    decode_pcm(&bytes, format, sample_rate, channels)
}

pub async fn write_f32le(path: &Path, audio: &DecodedAudio) -> WorkerResult<()> {
    tokio::fs::write(path, encode_f32le(audio)).await?;
    Ok(())
}
