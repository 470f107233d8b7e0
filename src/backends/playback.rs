//! Audio playback through rodio.
//!
//! The sink is polled from a blocking task. A drop guard on the calling
//! future cancels the token, so an aborted speech attempt stops the sink
//! instead of playing on past its budget.

use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStreamBuilder, Sink};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::ProviderError;

/// Sample rate of the PCM both cloud backends are asked for.
pub const PCM_SAMPLE_RATE: u32 = 24_000;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Signed 16-bit little-endian PCM → f32 in [-1, 1). A trailing odd byte is dropped.
pub fn pcm16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

/// Play mono samples and wait until they finish or the caller is dropped.
pub async fn play(samples: Vec<f32>, sample_rate: u32) -> Result<(), ProviderError> {
    if samples.is_empty() {
        return Err(ProviderError::EmptyOutput);
    }

    let cancel = CancellationToken::new();
    let _stop_on_drop = cancel.clone().drop_guard();

    tokio::task::spawn_blocking(move || play_blocking(samples, sample_rate, &cancel))
        .await
        .map_err(|e| ProviderError::Audio(format!("playback task failed: {e}")))?
}

fn play_blocking(
    samples: Vec<f32>,
    sample_rate: u32,
    cancel: &CancellationToken,
) -> Result<(), ProviderError> {
    if cancel.is_cancelled() {
        return Ok(());
    }
    // Opening the device cannot be interrupted; a hung open still holds
    // this blocking thread until it returns.
    let stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| ProviderError::Audio(format!("Failed to open audio output: {e}")))?;
    if cancel.is_cancelled() {
        debug!("Playback cancelled while opening the device");
        return Ok(());
    }

    let sink = Sink::connect_new(stream.mixer());
    sink.append(SamplesBuffer::new(1, sample_rate, samples));

    while !sink.empty() {
        if cancel.is_cancelled() {
            sink.stop();
            debug!("Playback cancelled");
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_little_endian_pairs() {
        let bytes = [0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x01];
        let samples = pcm16le_to_f32(&bytes);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < f32::EPSILON);
        assert_eq!(samples[2], -1.0);
    }

    #[tokio::test]
    async fn empty_audio_is_rejected_before_opening_a_device() {
        let result = play(Vec::new(), PCM_SAMPLE_RATE).await;
        assert!(matches!(result, Err(ProviderError::EmptyOutput)));
    }

    #[test]
    fn cancelled_attempt_never_opens_a_device() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(play_blocking(vec![0.0; 240], PCM_SAMPLE_RATE, &cancel).is_ok());
    }
}
