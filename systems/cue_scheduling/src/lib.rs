#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Converts note timelines into deduplicated, ordinal-stamped cues.
//!
//! Scheduling never fires anything itself. Each admitted note is handed to a
//! [`CueSink`], normally the playback transport, which owns the clock and
//! delivers the payload once playback reaches the note's time.

use blobsync_core::{CuePayload, CueSetId, NoteEvent};
use tracing::debug;

/// Time-indexed callback registration offered by a playback engine.
pub trait CueSink {
    /// Registers `payload` to be delivered when playback reaches `time` seconds.
    fn add_cue(&mut self, time: f64, payload: CuePayload);
}

impl CueSink for Vec<(f64, CuePayload)> {
    fn add_cue(&mut self, time: f64, payload: CuePayload) {
        self.push((time, payload));
    }
}

/// Stateless system that registers one cue per distinct note onset.
#[derive(Debug, Default)]
pub struct CueScheduler;

impl CueScheduler {
    /// Registers cues for a time-sorted note timeline and returns how many were admitted.
    ///
    /// Notes sharing the tick of the previously admitted note are dropped, which
    /// collapses a chord into a single cue. With `allow_polyphony` set every
    /// note of a chord gets its own cue.
    /// Simultaneity is exact tick equality, so notes at the same time but on
    /// different ticks stay separate. Ordinals start at one and increase by one
    /// per admitted cue.
    pub fn schedule<S>(
        &self,
        notes: &[NoteEvent],
        cue_set: CueSetId,
        allow_polyphony: bool,
        sink: &mut S,
    ) -> usize
    where
        S: CueSink + ?Sized,
    {
        let mut last_tick: Option<u64> = None;
        let mut ordinal: u32 = 1;

        for note in notes {
            if !allow_polyphony && last_tick == Some(note.tick) {
                continue;
            }

            sink.add_cue(
                note.time,
                CuePayload {
                    cue_set,
                    ordinal,
                    source_time: note.time,
                    note: Some(*note),
                },
            );
            last_tick = Some(note.tick);
            ordinal = ordinal.saturating_add(1);
        }

        let admitted = (ordinal - 1) as usize;
        debug!(%cue_set, notes = notes.len(), admitted, "scheduled cue set");
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_registrations_in_call_order() {
        let mut sink: Vec<(f64, CuePayload)> = Vec::new();
        let admitted = CueScheduler.schedule(
            &[NoteEvent::at(0, 0.0), NoteEvent::at(5, 0.5)],
            CueSetId::OutlineBatch,
            false,
            &mut sink,
        );
        assert_eq!(admitted, 2);
        assert_eq!(sink[1].1.ordinal, 2);
        assert_eq!(sink[1].0, 0.5);
    }
}
