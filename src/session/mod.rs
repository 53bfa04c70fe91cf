/// Session - what the presentation layer talks to
/// Owns the composition, the playback engine, the tile highlight and the
/// tone player. User intents come in as method calls; notifications for
/// the view queue up until drained with `poll_events`.
use crate::audio::TonePlayer;
use crate::library;
use crate::sequencer::playback::{
    PlaybackEngine, PlaybackEvent, PlaybackState, STEP_FLASH, STEP_TONE,
};
use crate::sequencer::{Composition, Note};
use log::debug;
use std::time::{Duration, Instant};

pub const CLICK_FLASH: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ClipActivated(&'static str),
    CompositionChanged(Vec<Note>),
    PlaybackTick { playhead: usize, is_playing: bool },
}

/// Transient highlight. A newer flash always replaces an older one.
#[derive(Debug, Clone, Copy)]
struct Flash {
    clip_id: &'static str,
    until: Instant,
}

pub struct Session<P: TonePlayer> {
    composition: Composition,
    playback: PlaybackEngine,
    flash: Option<Flash>,
    player: P,
    events: Vec<SessionEvent>,
}

impl<P: TonePlayer> Session<P> {
    pub fn new(player: P) -> Self {
        Self {
            composition: Composition::new(),
            playback: PlaybackEngine::new(),
            flash: None,
            player,
            events: Vec::new(),
        }
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn notes(&self) -> Vec<Note> {
        self.composition.iter().cloned().collect()
    }

    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_running()
    }

    pub fn playhead(&self) -> usize {
        self.playback.playhead()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// The highlighted clip, if its flash has not yet expired at `now`.
    pub fn active_clip(&self, now: Instant) -> Option<&'static str> {
        self.flash
            .filter(|flash| now < flash.until)
            .map(|flash| flash.clip_id)
    }

    pub fn click_clip(&mut self, clip_id: &str, now: Instant) -> Option<Note> {
        let Some(clip) = library::find_by_id(clip_id) else {
            debug!("ignoring click on unknown clip {:?}", clip_id);
            return None;
        };

        self.flash(clip.id, now + CLICK_FLASH);
        self.player.play(clip.frequency);

        let note = self.composition.append(clip);
        let notes = self.notes();
        self.events.push(SessionEvent::CompositionChanged(notes));
        Some(note)
    }

    /// No-op on an empty composition. Restarts from the top if already playing.
    pub fn play(&mut self, now: Instant) {
        if self.playback.start(&self.composition, now) {
            self.events.push(SessionEvent::PlaybackTick {
                playhead: 0,
                is_playing: true,
            });
        }
    }

    pub fn stop(&mut self) {
        if self.playback.stop() {
            self.flash = None;
            self.events.push(SessionEvent::PlaybackTick {
                playhead: 0,
                is_playing: false,
            });
        }
    }

    pub fn clear(&mut self) {
        self.stop();
        if !self.composition.is_empty() {
            self.composition.clear();
            self.events.push(SessionEvent::CompositionChanged(Vec::new()));
        }
    }

    /// Fire the playback tick due at `now`, if any, and expire the highlight.
    pub fn update(&mut self, now: Instant) {
        if self.flash.is_some_and(|flash| now >= flash.until) {
            self.flash = None;
        }

        if let Some(event) = self.playback.poll_event(&self.composition, now) {
            match event {
                PlaybackEvent::StepAdvanced { playhead, clip_id } => {
                    if let Some(clip) = library::find_by_id(clip_id) {
                        self.player.play_tone(clip.frequency, STEP_TONE);
                        self.flash(clip.id, now + STEP_FLASH);
                    }
                    self.events.push(SessionEvent::PlaybackTick {
                        playhead,
                        is_playing: true,
                    });
                }
                PlaybackEvent::Finished => {
                    self.flash = None;
                    self.events.push(SessionEvent::PlaybackTick {
                        playhead: 0,
                        is_playing: false,
                    });
                }
            }
        }
    }

    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn flash(&mut self, clip_id: &'static str, until: Instant) {
        self.flash = Some(Flash { clip_id, until });
        self.events.push(SessionEvent::ClipActivated(clip_id));
    }
}
