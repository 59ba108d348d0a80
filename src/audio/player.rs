//! Blocking playback through cpal's default host and output device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};

use super::render::ChordRenderer;
use super::AudioError;
use crate::output::{Delivered, Method, OutputError, OutputStrategy, Performance};

/// Serializes access to the output device.
static DEVICE_LOCK: Mutex<()> = Mutex::new(());

/// Extra time allowed beyond the rendered length before giving up.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Longest performance rendered in one go; samples are held in memory.
pub const MAX_PLAYBACK_SECONDS: f64 = 600.0;

/// How often the caller checks whether the stream has drained.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays performances on the default output device.
#[derive(Debug, Clone, Default)]
pub struct AudioPlayer;

impl AudioPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Play `performance` and block until it has been handed to the device.
    ///
    /// Returns the host driver name, e.g. "ALSA", "CoreAudio" or "WASAPI".
    pub fn play(&self, performance: &Performance) -> Result<String, AudioError> {
        let seconds = performance.total_duration();
        if seconds.is_nan() || seconds > MAX_PLAYBACK_SECONDS {
            return Err(AudioError::TooLong(seconds));
        }

        let _guard = DEVICE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let host = cpal::default_host();
        let driver = host.id().name().to_string();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        tracing::info!(
            driver = %driver,
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            "playing on audio device"
        );

        let samples = ChordRenderer::new(sample_rate, channels).render(performance);
        let rb = HeapRb::<f32>::new(samples.len().max(1));
        let (mut producer, mut consumer) = rb.split();
        producer.push_slice(&samples);

        let drained = Arc::new(AtomicBool::new(false));
        let drained_flag = Arc::clone(&drained);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let written = consumer.pop_slice(data);
                    data[written..].fill(0.0);
                    if written < data.len() {
                        drained_flag.store(true, Ordering::Release);
                    }
                },
                |err: cpal::StreamError| {
                    tracing::error!(%err, "audio stream error");
                },
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        let length = samples.len() as f64 / (sample_rate as f64 * channels.max(1) as f64);
        let deadline = Instant::now() + Duration::from_secs_f64(length) + DRAIN_GRACE;
        while !drained.load(Ordering::Acquire) {
            if Instant::now() >= deadline {
                return Err(AudioError::Playback(
                    "stream did not drain before the deadline".to_string(),
                ));
            }
            thread::sleep(POLL_INTERVAL);
        }

        Ok(driver)
    }
}

impl OutputStrategy for AudioPlayer {
    fn method(&self) -> Method {
        Method::Audio
    }

    fn deliver(&self, performance: &Performance) -> Result<Delivered, OutputError> {
        if performance.is_empty() {
            return Err(OutputError::EmptyPerformance);
        }
        let driver = self.play(performance)?;
        Ok(Delivered::played(driver))
    }
}
