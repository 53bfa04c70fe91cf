// Clip library - the static catalog of tiles on the soundboard
// Never mutated at runtime; clips are referenced by id everywhere else.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }
}

pub const BLUE: Color = Color::from_hex(0x0055a4);
pub const RED: Color = Color::from_hex(0xef4135);

#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Display only, tones are never this long
    pub duration_label: &'static str,
    pub frequency: f32,
    pub color: Color,
}

const fn clip(
    id: &'static str,
    title: &'static str,
    subtitle: &'static str,
    duration_label: &'static str,
    frequency: f32,
    color: Color,
) -> Clip {
    Clip {
        id,
        title,
        subtitle,
        duration_label,
        frequency,
        color,
    }
}

static CLIPS: [Clip; 12] = [
    clip("1", "FOR SURE", "The Original", "0:02", 440.0, BLUE),
    clip("2", "POUR SÛR", "French Edition", "0:03", 523.0, RED),
    clip("3", "Certainement", "Formal Mode", "0:02", 349.0, BLUE),
    clip("4", "ABSOLUMENT", "Extra Confident", "0:04", 392.0, RED),
    clip("5", "Bien Sûr", "Casual Macron", "0:02", 587.0, BLUE),
    clip("6", "ÉVIDEMMENT", "The Obvious", "0:03", 659.0, RED),
    clip("7", "Sans Doute", "No Doubt", "0:02", 698.0, BLUE),
    clip("8", "NATURELLEMENT", "Naturally", "0:03", 784.0, RED),
    clip("9", "C'est Clair", "It's Clear", "0:02", 880.0, BLUE),
    clip("10", "TOTALEMENT", "Totally", "0:03", 494.0, RED),
    clip("11", "Exactement", "Precisely", "0:02", 554.0, BLUE),
    clip("12", "DÉFINITIVEMENT", "Definitively", "0:04", 622.0, RED),
];

pub fn all() -> &'static [Clip] {
    &CLIPS
}

pub fn find_by_id(id: &str) -> Option<&'static Clip> {
    CLIPS.iter().find(|clip| clip.id == id)
}
