#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use forsure::{library, AppConfig, AudioOutput, Note, Session, SessionEvent};

#[cfg(feature = "gui")]
use std::time::{Duration, Instant};

fn init_logging(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    let path = AppConfig::path_from_env();
    let loaded = AppConfig::load(&path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    init_logging(&config.log.filter);
    if let Err(err) = loaded {
        log::warn!("{}: {}, using defaults", path, err);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_title("FOR SURE - Meme Machine"),
        ..Default::default()
    };

    eframe::run_native(
        "FORSURE",
        options,
        Box::new(move |_cc| Ok(Box::new(SoundboardApp::new(&config)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    init_logging("info");
    log::error!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
const TILE_COLUMNS: usize = 4;

#[cfg(feature = "gui")]
struct SoundboardApp {
    session: Session<AudioOutput>,

    // View state, refreshed from session events
    notes: Vec<Note>,
    playhead: usize,
    is_playing: bool,
}

#[cfg(feature = "gui")]
impl SoundboardApp {
    fn new(config: &AppConfig) -> Self {
        let output = if config.audio.enabled {
            AudioOutput::new(config.audio.device.clone())
        } else {
            log::info!("audio disabled by config");
            AudioOutput::disabled()
        };

        Self {
            session: Session::new(output),
            notes: Vec::new(),
            playhead: 0,
            is_playing: false,
        }
    }

    fn handle_session_events(&mut self, ctx: &egui::Context) {
        for event in self.session.poll_events() {
            match event {
                SessionEvent::ClipActivated(_) => ctx.request_repaint(),
                SessionEvent::CompositionChanged(notes) => self.notes = notes,
                SessionEvent::PlaybackTick {
                    playhead,
                    is_playing,
                } => {
                    self.playhead = playhead;
                    self.is_playing = is_playing;
                }
            }
        }
    }

    fn tile_grid(&mut self, ui: &mut egui::Ui, now: Instant) {
        let active = self.session.active_clip(now);
        let mut clicked = None;

        egui::Grid::new("tiles")
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                for (i, clip) in library::all().iter().enumerate() {
                    let text = format!(
                        "{}\n{}\n{}",
                        clip.title, clip.subtitle, clip.duration_label
                    );

                    let button = egui::Button::new(egui::RichText::new(text).strong())
                        .min_size(egui::vec2(180.0, 80.0))
                        .fill(if active == Some(clip.id) {
                            egui::Color32::WHITE
                        } else {
                            accent(clip.color)
                        });

                    if ui.add(button).clicked() {
                        clicked = Some(clip.id);
                    }
                    if (i + 1) % TILE_COLUMNS == 0 {
                        ui.end_row();
                    }
                }
            });

        if let Some(id) = clicked {
            self.session.click_clip(id, now);
        }
    }

    fn timeline(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for i in 0..forsure::sequencer::CAPACITY {
                let note = self.notes.get(i);
                let is_current = self.is_playing && self.playhead == i;

                let label = match note {
                    Some(note) => note.title.chars().take(3).collect(),
                    None => format!("{}", i + 1),
                };
                let fill = if is_current {
                    egui::Color32::from_rgb(100, 200, 100)
                } else if let Some(clip) = note.and_then(|n| library::find_by_id(n.clip_id)) {
                    accent(clip.color)
                } else {
                    egui::Color32::from_rgb(40, 40, 40)
                };

                ui.add(
                    egui::Button::new(label)
                        .min_size(egui::vec2(44.0, 44.0))
                        .fill(fill)
                        .sense(egui::Sense::hover()),
                );
            }
        });
    }
}

#[cfg(feature = "gui")]
fn accent(color: library::Color) -> egui::Color32 {
    egui::Color32::from_rgb(color.r, color.g, color.b)
}

#[cfg(feature = "gui")]
impl eframe::App for SoundboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.session.update(now);
        self.handle_session_events(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("FOR SURE");
            ui.label("Sample · Compose · Remix");
            ui.add_space(10.0);

            ui.label("Library:");
            self.tile_grid(ui, now);

            ui.add_space(20.0);

            ui.label("Composer:");
            self.timeline(ui);

            ui.add_space(10.0);

            // Transport controls
            ui.horizontal(|ui| {
                if self.session.is_playing() {
                    if ui.button("■ Stop").clicked() {
                        self.session.stop();
                    }
                } else if ui.button("▶ Play").clicked() {
                    self.session.play(now);
                }

                if ui.button("✕ Clear").clicked() {
                    self.session.clear();
                }

                ui.add_space(20.0);
                ui.label(format!(
                    "{}/{} samples",
                    self.session.composition().len(),
                    forsure::sequencer::CAPACITY
                ));
            });

            ui.separator();
            ui.label("Click a tile to hear it and add it to the timeline");
            if !self.session.player().is_available() {
                ui.colored_label(egui::Color32::YELLOW, "⚠ No audio output - playing silently");
            }
        });

        // Pick up what this frame's clicks changed
        self.handle_session_events(ctx);

        if self.session.is_playing() || self.session.active_clip(now).is_some() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}
