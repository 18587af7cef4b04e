use std::time::Duration;

use blobsync_core::{CuePayload, CueSetId, NoteEvent, SessionState};
use blobsync_playback::Transport;
use blobsync_system_cue_scheduling::{CueScheduler, CueSink};

fn payload(cue_set: CueSetId, ordinal: u32) -> CuePayload {
    CuePayload {
        cue_set,
        ordinal,
        source_time: 0.0,
        note: None,
    }
}

fn fire(transport: &mut Transport, millis: u64) -> Vec<u32> {
    let mut fired = Vec::new();
    transport.advance(Duration::from_millis(millis), &mut fired);
    fired.into_iter().map(|cue| cue.ordinal).collect()
}

#[test]
fn cues_fire_in_time_order_exactly_once() {
    let mut transport = Transport::new(10.0);
    transport.add_cue(2.0, payload(CueSetId::PhysicsPrimary, 3));
    transport.add_cue(0.5, payload(CueSetId::PhysicsPrimary, 1));
    transport.add_cue(1.0, payload(CueSetId::PhysicsPrimary, 2));
    transport.play();

    assert_eq!(fire(&mut transport, 600), vec![1]);
    assert_eq!(fire(&mut transport, 1_500), vec![2, 3]);
    assert!(fire(&mut transport, 1_000).is_empty());
}

#[test]
fn equal_times_keep_registration_order() {
    let mut transport = Transport::new(5.0);
    for ordinal in 1..=4 {
        transport.add_cue(1.0, payload(CueSetId::AnimatedBatch, ordinal));
    }
    transport.play();
    assert_eq!(fire(&mut transport, 1_000), vec![1, 2, 3, 4]);
}

#[test]
fn cue_at_zero_fires_on_the_first_advance() {
    let mut transport = Transport::new(5.0);
    transport.add_cue(0.0, payload(CueSetId::OutlineBatch, 1));
    transport.play();
    assert_eq!(fire(&mut transport, 0), vec![1]);
}

#[test]
fn paused_clock_holds_cues() {
    let mut transport = Transport::new(5.0);
    transport.add_cue(1.0, payload(CueSetId::PhysicsPrimary, 1));
    transport.play();
    assert!(fire(&mut transport, 500).is_empty());

    transport.toggle();
    assert_eq!(transport.state(), SessionState::Paused);
    assert!(fire(&mut transport, 5_000).is_empty());
    assert_eq!(transport.current_time(), 0.5);

    transport.toggle();
    assert!(transport.is_playing());
    assert_eq!(fire(&mut transport, 500), vec![1]);
}

#[test]
fn idle_transport_does_not_advance() {
    let mut transport = Transport::new(5.0);
    transport.add_cue(0.0, payload(CueSetId::PhysicsPrimary, 1));
    assert!(fire(&mut transport, 1_000).is_empty());
    assert_eq!(transport.state(), SessionState::Idle);
    assert_eq!(transport.current_time(), 0.0);
}

#[test]
fn reaching_the_end_stops_the_clock_and_skips_late_cues() {
    let mut transport = Transport::new(2.0);
    transport.add_cue(1.5, payload(CueSetId::PhysicsPrimary, 1));
    transport.add_cue(3.0, payload(CueSetId::PhysicsPrimary, 2));
    transport.play();

    assert_eq!(fire(&mut transport, 5_000), vec![1]);
    assert_eq!(transport.state(), SessionState::Ended);
    assert_eq!(transport.current_time(), transport.duration());
    assert!(fire(&mut transport, 5_000).is_empty());
}

#[test]
fn playing_after_the_end_replays_with_cues_re_armed() {
    let mut transport = Transport::new(2.0);
    transport.add_cue(0.5, payload(CueSetId::PhysicsPrimary, 1));
    transport.play();
    assert_eq!(fire(&mut transport, 3_000), vec![1]);

    transport.toggle();
    assert_eq!(transport.state(), SessionState::Running);
    assert_eq!(transport.current_time(), 0.0);
    assert_eq!(transport.pending_cues(), 1);
    assert_eq!(fire(&mut transport, 600), vec![1]);
}

#[test]
fn stop_rewinds_to_idle() {
    let mut transport = Transport::new(4.0);
    transport.add_cue(1.0, payload(CueSetId::PhysicsPrimary, 1));
    transport.play();
    let _ = fire(&mut transport, 1_500);

    transport.stop();
    assert_eq!(transport.state(), SessionState::Idle);
    assert_eq!(transport.current_time(), 0.0);
    assert_eq!(transport.pending_cues(), 1);
}

#[test]
fn scheduler_registers_directly_with_the_transport() {
    let notes = [
        NoteEvent::at(10, 0.0),
        NoteEvent::at(10, 0.05),
        NoteEvent::at(20, 1.0),
    ];
    let mut transport = Transport::new(3.0);
    let admitted = CueScheduler.schedule(&notes, CueSetId::PhysicsPrimary, false, &mut transport);
    assert_eq!(admitted, 2);
    assert_eq!(transport.cue_count(), 2);

    transport.play();
    assert_eq!(fire(&mut transport, 0), vec![1]);
    assert_eq!(fire(&mut transport, 1_000), vec![2]);
}
