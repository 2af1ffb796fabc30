//! # Audio Capture Module
//!
//! Opens the default input device with CPAL and runs a [`GameSession`] inside
//! the input callback. The callback never blocks: frames go out with
//! `try_send` and commands are polled with `try_recv`.
//!
//! ## Device selection
//! - Any channel count is accepted; only the first channel is played
//! - 32-bit float samples only
//! - The supported rate closest to the configured one is used, and the
//!   session is built for the rate the device actually delivers

use anyhow::{Context, Result, anyhow};
use cpal::{SupportedBufferSize, SupportedStreamConfigRange};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, trace};

use crate::TickFrame;
use crate::composition::Composition;
use crate::config::GameConfig;
use crate::session::{GameSession, SessionCommand};

/// Starts capture from the default input device and plays `composition`.
///
/// # Arguments
/// * `config` - Game settings; `sample_rate` is a request, not a guarantee
/// * `composition` - The piece to play
/// * `frames` - Receives one [`TickFrame`] per analysed window; frames are dropped while it is full
/// * `commands` - Polled once per callback
///
/// # Returns
/// * `Ok((stream, sample_rate))` - The running stream and the rate in use
/// * `Err(e)` - No device, no float format, or the session could not be built
pub fn start_audio_capture(
    config: &GameConfig,
    composition: &Composition,
    frames: Sender<TickFrame>,
    commands: Receiver<SessionCommand>,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!(device = %device.name()?, "using audio input device");

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, config.sample_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let scratch_frames = scratch_capacity(supported_config.buffer_size(), config.window_size);
    let sample_rate = config.sample_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let stream_config: cpal::StreamConfig = supported_config
        .with_sample_rate(cpal::SampleRate(sample_rate))
        .into();
    let channels = stream_config.channels.max(1) as usize;

    info!(sample_rate, channels, scratch_frames, "selected input format");

    let session_config = GameConfig {
        sample_rate,
        ..config.clone()
    };
    let mut session = GameSession::new(&session_config, composition)
        .context("could not start a game session")?;

    // First-channel scratch buffer, reused across callbacks.
    let mut mono: Vec<f32> = Vec::with_capacity(scratch_frames);

    let err_fn = |err| error!("An error occurred on the audio stream: {}", err);

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            while let Ok(command) = commands.try_recv() {
                session.apply(command);
            }

            let samples = first_channel(data, channels, &mut mono);

            session.push_samples(samples, |frame| {
                if frames.try_send(frame).is_err() {
                    trace!("renderer busy, frame dropped");
                }
            });
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Largest mono block a callback can deliver, capped at [`MAX_SCRATCH_FRAMES`].
///
/// Falls back to `window_size` when the device does not report a range.
fn scratch_capacity(buffer_size: &SupportedBufferSize, window_size: usize) -> usize {
    match buffer_size {
        SupportedBufferSize::Range { max, .. } => (*max as usize).min(MAX_SCRATCH_FRAMES).max(window_size),
        SupportedBufferSize::Unknown => window_size,
    }
}

/// Upper bound on the scratch reservation; some backends report huge maxima.
const MAX_SCRATCH_FRAMES: usize = 1 << 16;

/// First channel of an interleaved block. Mono input is passed through,
/// anything else is copied into `scratch`.
fn first_channel<'a>(data: &'a [f32], channels: usize, scratch: &'a mut Vec<f32>) -> &'a [f32] {
    if channels <= 1 {
        return data;
    }
    scratch.clear();
    scratch.extend(data.iter().step_by(channels));
    scratch
}

/// Picks the f32 configuration whose rate range is closest to `target_rate`,
/// preferring fewer channels.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| (rate_distance(c, target_rate), c.channels()))
}

/// Distance from `target_rate` to the rate range of `config`; 0 when inside.
fn rate_distance(config: &SupportedStreamConfigRange, target_rate: u32) -> u32 {
    let min = config.min_sample_rate().0;
    let max = config.max_sample_rate().0;
    if target_rate < min {
        min - target_rate
    } else {
        target_rate.saturating_sub(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::{SampleFormat, SampleRate};

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn prefers_float_format_covering_the_rate() {
        let configs = vec![
            range(1, 44100, 44100, SampleFormat::I16),
            range(2, 8000, 96000, SampleFormat::F32),
            range(1, 8000, 22050, SampleFormat::F32),
        ];
        let chosen = find_supported_config(configs, 44100).unwrap();
        assert_eq!(chosen.channels(), 2);
        assert_eq!(chosen.sample_format(), SampleFormat::F32);
    }

    #[test]
    fn prefers_mono_when_rates_tie() {
        let configs = vec![
            range(2, 44100, 48000, SampleFormat::F32),
            range(1, 44100, 48000, SampleFormat::F32),
        ];
        assert_eq!(find_supported_config(configs, 44100).unwrap().channels(), 1);
    }

    #[test]
    fn no_float_format_is_none() {
        let configs = vec![range(1, 44100, 44100, SampleFormat::I16)];
        assert!(find_supported_config(configs, 44100).is_none());
    }

    #[test]
    fn stereo_block_plays_the_left_channel() {
        let data = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let mut scratch = Vec::with_capacity(3);
        assert_eq!(first_channel(&data, 2, &mut scratch), &[0.1, 0.2, 0.3]);
        assert_eq!(scratch.capacity(), 3);

        // Reused without growing for a block of the same size.
        let next = [0.4, 0.0, 0.5, 0.0, 0.6, 0.0];
        assert_eq!(first_channel(&next, 2, &mut scratch), &[0.4, 0.5, 0.6]);
        assert_eq!(scratch.capacity(), 3);
    }

    #[test]
    fn mono_block_is_not_copied() {
        let data = [0.5, 0.25];
        let mut scratch = Vec::new();
        assert_eq!(first_channel(&data, 1, &mut scratch).as_ptr(), data.as_ptr());
        assert!(scratch.is_empty());
    }

    #[test]
    fn scratch_covers_the_largest_callback() {
        assert_eq!(scratch_capacity(&SupportedBufferSize::Range { min: 64, max: 8192 }, 2048), 8192);
        assert_eq!(scratch_capacity(&SupportedBufferSize::Range { min: 64, max: 512 }, 2048), 2048);
        assert_eq!(scratch_capacity(&SupportedBufferSize::Unknown, 2048), 2048);
        assert_eq!(
            scratch_capacity(&SupportedBufferSize::Range { min: 1, max: u32::MAX }, 2048),
            MAX_SCRATCH_FRAMES
        );
    }

    #[test]
    fn distance_to_rate_range() {
        let config = range(1, 22050, 48000, SampleFormat::F32);
        assert_eq!(rate_distance(&config, 44100), 0);
        assert_eq!(rate_distance(&config, 96000), 48000);
        assert_eq!(rate_distance(&config, 8000), 14050);
    }
}
