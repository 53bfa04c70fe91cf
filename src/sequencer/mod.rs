/// Composition buffer - the 16 most recently placed notes, oldest first
/// Backed by a fixed ring of cells addressed by a running insertion counter.
use crate::library::Clip;
use log::debug;
use uuid::Uuid;

pub mod playback;

pub const CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub clip_id: &'static str,
    /// Length of the buffer at insertion time, mod 16
    pub slot: usize,
    pub title: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Composition {
    cells: [Option<Note>; CAPACITY],
    // Insertions since the last clear
    counter: usize,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        CAPACITY
    }

    pub fn len(&self) -> usize {
        self.counter.min(CAPACITY)
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    pub fn at(&self, index: usize) -> Option<&Note> {
        if index >= self.len() {
            return None;
        }
        let start = self.counter - self.len();
        self.cells[(start + index) % CAPACITY].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> + '_ {
        (0..self.len()).filter_map(move |i| self.at(i))
    }

    /// Place a note for `clip`, evicting the oldest one when full.
    pub fn append(&mut self, clip: &Clip) -> Note {
        let note = Note {
            id: Uuid::new_v4(),
            clip_id: clip.id,
            slot: self.len() % CAPACITY,
            title: clip.title,
        };

        // When full, this cell holds the oldest note
        self.cells[self.counter % CAPACITY] = Some(note.clone());
        self.counter += 1;

        debug!(
            "appended note {} ({}) at slot {}, {} notes",
            note.id,
            note.title,
            note.slot,
            self.len()
        );
        note
    }

    pub fn clear(&mut self) {
        self.cells = Default::default();
        self.counter = 0;
    }
}
