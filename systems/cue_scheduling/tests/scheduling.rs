use blobsync_core::{CuePayload, CueSetId, NoteEvent};
use blobsync_system_cue_scheduling::{CueScheduler, CueSink};

#[derive(Debug, Default)]
struct RecordingSink {
    cues: Vec<(f64, CuePayload)>,
}

impl CueSink for RecordingSink {
    fn add_cue(&mut self, time: f64, payload: CuePayload) {
        self.cues.push((time, payload));
    }
}

fn schedule(notes: &[NoteEvent], allow_polyphony: bool) -> Vec<(f64, CuePayload)> {
    let mut sink = RecordingSink::default();
    let admitted =
        CueScheduler.schedule(notes, CueSetId::PhysicsPrimary, allow_polyphony, &mut sink);
    assert_eq!(admitted, sink.cues.len());
    sink.cues
}

#[test]
fn duplicated_tick_collapses_into_one_cue() {
    let notes = [
        NoteEvent::at(10, 0.0),
        NoteEvent::at(10, 0.05),
        NoteEvent::at(20, 1.0),
    ];

    let cues = schedule(&notes, false);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].0, 0.0);
    assert_eq!(cues[0].1.ordinal, 1);
    assert_eq!(cues[1].0, 1.0);
    assert_eq!(cues[1].1.ordinal, 2);
    assert_eq!(cues[1].1.note, Some(notes[2]));
}

#[test]
fn chord_of_k_notes_registers_once_with_first_time() {
    let chord: Vec<NoteEvent> = (0..5)
        .map(|voice| NoteEvent::at(480, 2.0 + f64::from(voice) * 0.001))
        .collect();

    let cues = schedule(&chord, false);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].1.source_time, 2.0);
}

#[test]
fn polyphony_admits_every_voice_at_a_shared_fire_time() {
    let chord = [NoteEvent::at(480, 2.0); 4];

    let cues = schedule(&chord, true);

    assert_eq!(cues.len(), 4);
    assert!(cues.iter().all(|(time, _)| *time == 2.0));
    let ordinals: Vec<u32> = cues.iter().map(|(_, cue)| cue.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4]);
}

#[test]
fn ordinals_increase_without_gaps_across_dropped_notes() {
    let notes = [
        NoteEvent::at(0, 0.0),
        NoteEvent::at(0, 0.0),
        NoteEvent::at(120, 0.25),
        NoteEvent::at(240, 0.5),
        NoteEvent::at(240, 0.5),
        NoteEvent::at(240, 0.5),
        NoteEvent::at(360, 0.75),
    ];

    let ordinals: Vec<u32> = schedule(&notes, false)
        .into_iter()
        .map(|(_, cue)| cue.ordinal)
        .collect();

    assert_eq!(ordinals, vec![1, 2, 3, 4]);
}

#[test]
fn equal_times_on_different_ticks_stay_separate() {
    let notes = [NoteEvent::at(100, 1.0), NoteEvent::at(101, 1.0)];

    assert_eq!(schedule(&notes, false).len(), 2);
}

#[test]
fn non_adjacent_repeats_of_a_tick_are_admitted() {
    let notes = [
        NoteEvent::at(10, 0.0),
        NoteEvent::at(20, 0.1),
        NoteEvent::at(10, 0.2),
    ];

    assert_eq!(schedule(&notes, false).len(), 3);
}

#[test]
fn empty_timeline_registers_nothing() {
    assert!(schedule(&[], false).is_empty());
    assert!(schedule(&[], true).is_empty());
}

#[test]
fn payload_carries_cue_set_identity() {
    let mut sink = RecordingSink::default();
    let _ = CueScheduler.schedule(
        &[NoteEvent::at(1, 0.1)],
        CueSetId::AnimatedBatch,
        false,
        &mut sink,
    );
    assert_eq!(sink.cues[0].1.cue_set, CueSetId::AnimatedBatch);
}
