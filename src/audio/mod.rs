/// Audio output using cpal
/// The device is opened lazily on the first tone and kept for the life of
/// the output. If it cannot be opened, tones are dropped silently.
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub mod voice;

pub use voice::Voice;

pub const DEFAULT_TONE: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoDevice,

    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),
}

/// Anything that can sound a tone. Fire-and-forget: calls may overlap.
pub trait TonePlayer {
    fn play_tone(&mut self, frequency: f32, duration: Duration);

    fn play(&mut self, frequency: f32) {
        self.play_tone(frequency, DEFAULT_TONE);
    }
}

enum OutputState {
    Unopened,
    Open {
        _stream: cpal::Stream,
        sample_rate: f32,
    },
    Unavailable,
}

pub struct AudioOutput {
    state: OutputState,
    voices: Arc<Mutex<Vec<Voice>>>,
    device_name: Option<String>,
}

impl AudioOutput {
    pub fn new(device_name: Option<String>) -> Self {
        Self {
            state: OutputState::Unopened,
            voices: Arc::new(Mutex::new(Vec::new())),
            device_name,
        }
    }

    /// An output that never opens a device.
    pub fn disabled() -> Self {
        Self {
            state: OutputState::Unavailable,
            voices: Arc::new(Mutex::new(Vec::new())),
            device_name: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.state, OutputState::Unavailable)
    }

    /// Sample rate of the open device, opening it with `open` on first use.
    /// A failed open is final: later calls neither retry nor sound.
    fn sample_rate_or_open<F>(&mut self, open: F) -> Option<f32>
    where
        F: FnOnce(&Self) -> Result<(cpal::Stream, f32), AudioError>,
    {
        if let OutputState::Unopened = self.state {
            self.state = match open(&*self) {
                Ok((stream, sample_rate)) => OutputState::Open {
                    _stream: stream,
                    sample_rate,
                },
                Err(err) => {
                    warn!("audio unavailable, continuing without sound: {}", err);
                    OutputState::Unavailable
                }
            };
        }

        match self.state {
            OutputState::Open { sample_rate, .. } => Some(sample_rate),
            _ => None,
        }
    }

    fn open(&self) -> Result<(cpal::Stream, f32), AudioError> {
        let host = cpal::default_host();
        let device = select_device(&host, self.device_name.as_deref())?;
        let supported = device.default_output_config()?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0 as f32;
        let voices = Arc::clone(&self.voices);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, voices)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, voices)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, voices)?,
            other => return Err(AudioError::UnsupportedFormat(other)),
        };
        stream.play()?;

        info!(
            "audio output open: {} @ {} Hz, {} channels",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            config.sample_rate.0,
            config.channels
        );
        Ok((stream, sample_rate))
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TonePlayer for AudioOutput {
    fn play_tone(&mut self, frequency: f32, duration: Duration) {
        self.play_tone_with(frequency, duration, Self::open);
    }
}

impl AudioOutput {
    fn play_tone_with<F>(&mut self, frequency: f32, duration: Duration, open: F)
    where
        F: FnOnce(&Self) -> Result<(cpal::Stream, f32), AudioError>,
    {
        let Some(sample_rate) = self.sample_rate_or_open(open) else {
            return;
        };

        let voice = Voice::new(frequency, duration.as_secs_f32(), sample_rate);
        if let Ok(mut voices) = self.voices.lock() {
            voices.push(voice);
        }
    }
}

fn select_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, AudioError> {
    if let Some(name) = name {
        let found = host.output_devices().ok().and_then(|mut devices| {
            devices.find(|d| d.name().map(|n| n == name).unwrap_or(false))
        });
        match found {
            Some(device) => return Ok(device),
            None => warn!("output device {:?} not found, using default", name),
        }
    }

    host.default_output_device().ok_or(AudioError::NoDevice)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    voices: Arc<Mutex<Vec<Voice>>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| match voices.lock() {
            Ok(mut voices) => voice::render_frames(&mut voices, data, channels),
            Err(_) => data.fill(T::EQUILIBRIUM),
        },
        |err| error!("audio stream error: {}", err),
        None,
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every tone instead of sounding it.
    #[derive(Debug, Default)]
    pub struct RecordingPlayer {
        pub tones: Vec<(f32, Duration)>,
    }

    impl TonePlayer for RecordingPlayer {
        fn play_tone(&mut self, frequency: f32, duration: Duration) {
            self.tones.push((frequency, duration));
        }
    }

    #[test]
    fn test_default_tone_length() {
        let mut player = RecordingPlayer::default();
        player.play(440.0);
        player.play_tone(523.0, Duration::from_millis(200));
        assert_eq!(
            player.tones,
            vec![(440.0, DEFAULT_TONE), (523.0, Duration::from_millis(200))]
        );
    }

    #[test]
    fn test_failed_open_goes_silent() {
        let mut output = AudioOutput::new(Some("missing".to_string()));
        assert!(output.is_available());

        output.play_tone_with(440.0, DEFAULT_TONE, |_| Err(AudioError::NoDevice));
        assert!(!output.is_available());
        assert!(output.voices.lock().unwrap().is_empty());

        // No second attempt at opening
        output.play_tone_with(523.0, DEFAULT_TONE, |_| {
            panic!("device opened twice")
        });
        output.play(587.0);
        assert!(!output.is_available());
        assert!(output.voices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_output_is_silent() {
        let mut output = AudioOutput::disabled();
        assert!(!output.is_available());
        output.play(440.0);
        assert!(output.voices.lock().unwrap().is_empty());
    }
}
