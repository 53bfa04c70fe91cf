/// A single square-wave tone with an exponential decay envelope
use cpal::{FromSample, Sample, SizedSample};

pub const START_GAIN: f32 = 0.3;
pub const FLOOR_GAIN: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct Voice {
    phase: f32,
    phase_increment: f32,
    gain: f32,
    // Per-sample gain multiplier
    decay: f32,
    remaining: u64,
}

impl Voice {
    pub fn new(frequency: f32, duration_secs: f32, sample_rate: f32) -> Self {
        let total = ((duration_secs * sample_rate).round() as u64).max(1);

        Self {
            phase: 0.0,
            phase_increment: frequency / sample_rate,
            gain: START_GAIN,
            decay: (FLOOR_GAIN / START_GAIN).powf(1.0 / total as f32),
            remaining: total,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.remaining == 0 {
            return 0.0;
        }

        let square = if self.phase < 0.5 { 1.0 } else { -1.0 };
        let sample = square * self.gain;

        self.gain *= self.decay;
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.remaining -= 1;

        sample
    }
}

/// Mix all voices into an interleaved buffer, the same signal on every
/// channel, then drop the voices that have ended.
pub fn render_frames<T>(voices: &mut Vec<Voice>, data: &mut [T], channels: usize)
where
    T: SizedSample + FromSample<f32>,
{
    let channels = channels.max(1);

    for frame in data.chunks_mut(channels) {
        let mixed: f32 = voices.iter_mut().map(Voice::next_sample).sum();
        let value = T::from_sample(mixed.clamp(-1.0, 1.0));
        for sample in frame.iter_mut() {
            *sample = value;
        }
    }

    voices.retain(|voice| !voice.is_finished());
}
