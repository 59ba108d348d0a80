//! Chord rendering: additive voices with an ADSR envelope, hard-limited.
//!
//! This is a preview tone for auditioning chords, not a synthesizer: every
//! pitch is one oscillator, every chord event one envelope.

use std::f64::consts::PI;

use crate::output::Performance;

/// Output ceiling applied after mixing.
pub const LIMITER_CEILING: f32 = 0.95;

/// Overall level before the limiter.
const MASTER_GAIN: f64 = 0.8;

/// Available waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
}

/// One sample of `waveform` at `phase` in `[0, 1)`, in `[-1, 1]`.
pub fn oscillator(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => (phase * 2.0 * PI).sin(),
        Waveform::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
    }
}

/// MIDI note to frequency, A4 (69) = 440 Hz.
pub fn midi_to_freq(note: u8) -> f64 {
    440.0 * 2.0f64.powf((note as f64 - 69.0) / 12.0)
}

/// Attack-Decay-Sustain-Release envelope. Times in seconds, sustain a level.
#[derive(Debug, Clone, Copy)]
pub struct AdsrEnvelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrEnvelope {
    /// Amplitude at `t` seconds into a note held for `held` seconds.
    pub fn amplitude(&self, t: f64, held: f64) -> f64 {
        if t < 0.0 {
            0.0
        } else if t >= held {
            // Release starts from wherever the envelope was when the key lifted.
            let level = self.amplitude_held(held);
            if self.release <= 0.0 {
                0.0
            } else {
                (level * (1.0 - (t - held) / self.release)).max(0.0)
            }
        } else {
            self.amplitude_held(t)
        }
    }

    fn amplitude_held(&self, t: f64) -> f64 {
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 - (t - self.attack) / self.decay * (1.0 - self.sustain)
        } else {
            self.sustain
        }
    }
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.3,
            sustain: 0.6,
            release: 0.4,
        }
    }
}

/// Renders a [`Performance`] into interleaved `f32` samples.
#[derive(Debug, Clone)]
pub struct ChordRenderer {
    sample_rate: u32,
    channels: u16,
    waveform: Waveform,
    envelope: AdsrEnvelope,
}

impl ChordRenderer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            waveform: Waveform::Triangle,
            envelope: AdsrEnvelope::default(),
        }
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_envelope(mut self, envelope: AdsrEnvelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Frames needed for the performance including the release tail.
    pub fn frame_count(&self, performance: &Performance) -> usize {
        let seconds = performance.total_duration() + self.envelope.release;
        (seconds * self.sample_rate as f64).ceil() as usize
    }

    pub fn render(&self, performance: &Performance) -> Vec<f32> {
        let sr = self.sample_rate as f64;
        let frames = self.frame_count(performance);
        let mut mono = vec![0.0f64; frames];

        for event in performance.events() {
            if event.pitches.is_empty() {
                continue;
            }
            let level =
                MASTER_GAIN * event.velocity as f64 / 127.0 / event.pitches.len() as f64;
            let first = (event.start * sr) as usize;
            let last = (((event.end() + self.envelope.release) * sr).ceil() as usize).min(frames);

            for &pitch in &event.pitches {
                let freq = midi_to_freq(pitch);
                for (i, out) in mono.iter_mut().enumerate().take(last).skip(first) {
                    let t = (i - first) as f64 / sr;
                    let amp = self.envelope.amplitude(t, event.duration);
                    *out += level * amp * oscillator(self.waveform, (freq * t).fract());
                }
            }
        }

        let channels = self.channels as usize;
        let mut interleaved = Vec::with_capacity(frames * channels);
        for sample in mono {
            let s = (sample as f32).clamp(-LIMITER_CEILING, LIMITER_CEILING);
            interleaved.extend(std::iter::repeat(s).take(channels));
        }
        interleaved
    }
}
