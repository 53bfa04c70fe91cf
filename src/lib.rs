/// FORSURE - soundboard and 16-step composer
///
/// This library provides the core components behind the soundboard:
/// - A static clip library
/// - A sliding-window composition of the last 16 placed notes
/// - A tick-driven playback engine
/// - Square-wave tone output with a decay envelope
/// - A session tying these together for a view to drive

pub mod audio;
pub mod config;
pub mod library;
pub mod sequencer;
pub mod session;

// Re-export commonly used types
pub use audio::{AudioError, AudioOutput, TonePlayer};
pub use config::{AppConfig, ConfigError};
pub use library::{find_by_id, Clip};
pub use sequencer::playback::{PlaybackEngine, PlaybackEvent, PlaybackState};
pub use sequencer::{Composition, Note};
pub use session::{Session, SessionEvent};
