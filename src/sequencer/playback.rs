/// Playback engine - walks the composition one note per tick
/// Timing is cooperative: the owner polls with the current time and gets
/// at most one tick per poll. Missed intervals are dropped, not queued.
use super::Composition;
use log::{debug, info};
use std::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_millis(200);
pub const STEP_TONE: Duration = Duration::from_millis(200);
pub const STEP_FLASH: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    StepAdvanced {
        playhead: usize,
        clip_id: &'static str,
    },
    Finished,
}

/// Repeating deadline, first due one period after it starts.
/// A poll that is a whole period or more late fires once and resyncs.
#[derive(Debug, Clone)]
struct Ticker {
    period: Duration,
    next_due: Instant,
}

impl Ticker {
    fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    fn fire(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        if now >= self.next_due + self.period {
            self.next_due = now + self.period;
        } else {
            self.next_due += self.period;
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct PlaybackEngine {
    ticker: Option<Ticker>,
    cursor: usize,
    playhead: usize,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        if self.ticker.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn playhead(&self) -> usize {
        self.playhead
    }

    /// Start from the first note. Returns false (and stays idle) when
    /// there is nothing to play. Any running ticker is replaced.
    pub fn start(&mut self, composition: &Composition, now: Instant) -> bool {
        if composition.is_empty() {
            debug!("play ignored, composition is empty");
            return false;
        }

        self.ticker = Some(Ticker::start(TICK_PERIOD, now));
        self.cursor = 0;
        self.playhead = 0;
        info!("playback started, {} notes", composition.len());
        true
    }

    /// Returns whether playback was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.ticker.take().is_some();
        self.cursor = 0;
        self.playhead = 0;
        if was_running {
            info!("playback stopped");
        }
        was_running
    }

    pub fn poll_event(&mut self, composition: &Composition, now: Instant) -> Option<PlaybackEvent> {
        let ticker = self.ticker.as_mut()?;
        if !ticker.fire(now) {
            return None;
        }
        Some(self.tick(composition))
    }

    fn tick(&mut self, composition: &Composition) -> PlaybackEvent {
        match composition.at(self.cursor) {
            Some(note) => {
                self.playhead = self.cursor;
                self.cursor += 1;
                debug!("tick: playhead {} -> {}", self.playhead, note.title);
                PlaybackEvent::StepAdvanced {
                    playhead: self.playhead,
                    clip_id: note.clip_id,
                }
            }
            None => {
                self.stop();
                PlaybackEvent::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;

    fn composition(ids: &[&str]) -> Composition {
        let mut comp = Composition::new();
        for id in ids {
            comp.append(library::find_by_id(id).unwrap());
        }
        comp
    }

    #[test]
    fn test_start_on_empty() {
        let comp = Composition::new();
        let mut engine = PlaybackEngine::new();
        assert!(!engine.start(&comp, Instant::now()));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(engine.poll_event(&comp, Instant::now() + TICK_PERIOD * 4).is_none());
    }

    #[test]
    fn test_ticks_then_finishes() {
        let comp = composition(&["1", "2"]);
        let mut engine = PlaybackEngine::new();
        let t0 = Instant::now();
        assert!(engine.start(&comp, t0));

        assert!(engine.poll_event(&comp, t0 + TICK_PERIOD / 2).is_none());

        let event = engine.poll_event(&comp, t0 + TICK_PERIOD);
        assert_eq!(
            event,
            Some(PlaybackEvent::StepAdvanced { playhead: 0, clip_id: "1" })
        );

        let event = engine.poll_event(&comp, t0 + TICK_PERIOD * 2);
        assert_eq!(
            event,
            Some(PlaybackEvent::StepAdvanced { playhead: 1, clip_id: "2" })
        );
        assert_eq!(engine.playhead(), 1);

        let event = engine.poll_event(&comp, t0 + TICK_PERIOD * 3);
        assert_eq!(event, Some(PlaybackEvent::Finished));
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.playhead(), 0);
    }

    #[test]
    fn test_late_poll_fires_once() {
        let comp = composition(&["1", "2", "3"]);
        let mut engine = PlaybackEngine::new();
        let t0 = Instant::now();
        engine.start(&comp, t0);

        let late = t0 + TICK_PERIOD * 10;
        assert_eq!(
            engine.poll_event(&comp, late),
            Some(PlaybackEvent::StepAdvanced { playhead: 0, clip_id: "1" })
        );
        assert!(engine.poll_event(&comp, late).is_none());
        assert!(engine.is_running());

        // Resynced: next tick is one period after the late poll
        assert!(engine
            .poll_event(&comp, late + TICK_PERIOD - Duration::from_millis(1))
            .is_none());
        assert_eq!(
            engine.poll_event(&comp, late + TICK_PERIOD),
            Some(PlaybackEvent::StepAdvanced { playhead: 1, clip_id: "2" })
        );
    }

    #[test]
    fn test_slightly_late_poll_keeps_cadence() {
        let comp = composition(&["1", "2", "3"]);
        let mut engine = PlaybackEngine::new();
        let t0 = Instant::now();
        engine.start(&comp, t0);

        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(250))
            .is_some());
        // Still due at 400ms, not 450ms
        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(400))
            .is_some());
    }

    #[test]
    fn test_restart_keeps_single_ticker() {
        let comp = composition(&["1", "2", "3", "4"]);
        let mut engine = PlaybackEngine::new();
        let t0 = Instant::now();
        engine.start(&comp, t0);
        engine.start(&comp, t0 + Duration::from_millis(50));

        // The first ticker would have been due at 200ms
        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(220))
            .is_none());
        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(250))
            .is_some());
        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(300))
            .is_none());
        assert!(engine
            .poll_event(&comp, t0 + Duration::from_millis(450))
            .is_some());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let comp = composition(&["1"]);
        let mut engine = PlaybackEngine::new();
        assert!(!engine.stop());

        engine.start(&comp, Instant::now());
        assert!(engine.stop());
        assert!(!engine.stop());
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.playhead(), 0);
    }

    #[test]
    fn test_reads_live_composition() {
        let mut comp = composition(&["1"]);
        let mut engine = PlaybackEngine::new();
        let t0 = Instant::now();
        engine.start(&comp, t0);

        engine.poll_event(&comp, t0 + TICK_PERIOD);
        comp.append(library::find_by_id("9").unwrap());

        let event = engine.poll_event(&comp, t0 + TICK_PERIOD * 2);
        assert_eq!(
            event,
            Some(PlaybackEvent::StepAdvanced { playhead: 1, clip_id: "9" })
        );
    }
}
