#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Note-timeline provider backed by Standard MIDI Files.
//!
//! Every track of the file becomes an ordered list of [`NoteEvent`] values
//! whose onset times honour the file's tempo map.

mod tempo;

use std::{
    collections::{HashMap, VecDeque},
    fs,
    path::{Path, PathBuf},
};

use blobsync_core::NoteEvent;
use midly::{MidiMessage, Smf, TrackEventKind};
use thiserror::Error;
use tracing::debug;

use tempo::TempoMap;

/// Errors raised while loading a note timeline.
#[derive(Debug, Error)]
pub enum MidiError {
    /// The file could not be read.
    #[error("failed to read MIDI file {}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not a valid Standard MIDI File.
    #[error("malformed MIDI data")]
    Parse(#[from] midly::Error),
}

/// Ordered notes for every track of a MIDI file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteTimeline {
    tracks: Vec<Vec<NoteEvent>>,
}

impl NoteTimeline {
    /// Notes of the track at `index`, ascending by onset.
    #[must_use]
    pub fn track(&self, index: usize) -> Option<&[NoteEvent]> {
        self.tracks.get(index).map(Vec::as_slice)
    }

    /// Number of tracks in the file, including tracks without notes.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Time in seconds at which the last note of any track is released.
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.tracks
            .iter()
            .flatten()
            .map(|note| note.time + note.duration)
            .fold(0.0, f64::max)
    }
}

/// Reads and parses the MIDI file at `path`.
pub fn load(path: &Path) -> Result<NoteTimeline, MidiError> {
    let bytes = fs::read(path).map_err(|source| MidiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&bytes)
}

/// Parses a Standard MIDI File held in memory.
///
/// A note-on with velocity zero is treated as a note-off. Releases close the
/// oldest sounding note of the same channel and key; notes that are never
/// released keep a zero duration.
pub fn parse(bytes: &[u8]) -> Result<NoteTimeline, MidiError> {
    let smf = Smf::parse(bytes)?;
    let tempo = TempoMap::from_smf(&smf);

    let tracks: Vec<Vec<NoteEvent>> = smf
        .tracks
        .iter()
        .map(|track| {
            let mut notes = Vec::new();
            let mut sounding: HashMap<(u8, u8), VecDeque<usize>> = HashMap::new();
            let mut tick = 0_u64;

            for event in track {
                tick += u64::from(event.delta.as_int());
                let TrackEventKind::Midi { channel, message } = event.kind else {
                    continue;
                };
                let (key, velocity) = match message {
                    MidiMessage::NoteOn { key, vel } => (key.as_int(), vel.as_int()),
                    MidiMessage::NoteOff { key, .. } => (key.as_int(), 0),
                    _ => continue,
                };
                let voice = (channel.as_int(), key);

                if velocity > 0 {
                    sounding.entry(voice).or_default().push_back(notes.len());
                    notes.push(NoteEvent {
                        tick,
                        time: tempo.seconds_at(tick),
                        duration: 0.0,
                        pitch: key,
                        velocity,
                    });
                } else if let Some(index) = sounding.get_mut(&voice).and_then(VecDeque::pop_front) {
                    let note: &mut NoteEvent = &mut notes[index];
                    note.duration = tempo.seconds_at(tick) - note.time;
                }
            }
            notes
        })
        .collect();

    debug!(
        tracks = tracks.len(),
        notes = tracks.iter().map(Vec::len).sum::<usize>(),
        "parsed note timeline"
    );
    Ok(NoteTimeline { tracks })
}
