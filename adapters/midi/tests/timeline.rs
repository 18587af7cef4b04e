use blobsync_midi::{load, parse, MidiError};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Fps, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};

fn note_on(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

fn note_off(delta: u32, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        },
    }
}

fn meta(delta: u32, message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(message),
    }
}

fn encode(timing: Timing, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(Format::Parallel, timing));
    for mut track in tracks {
        track.push(meta(0, MetaMessage::EndOfTrack));
        smf.tracks.push(track);
    }
    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).expect("in-memory write");
    bytes
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

#[test]
fn notes_follow_the_tempo_map_of_the_conductor_track() {
    let bytes = encode(
        Timing::Metrical(u15::new(480)),
        vec![
            vec![
                meta(0, MetaMessage::Tempo(u24::new(500_000))),
                meta(960, MetaMessage::Tempo(u24::new(1_000_000))),
            ],
            vec![
                note_on(0, 60, 100),
                note_off(480, 60),
                note_on(480, 62, 90),
                note_off(480, 62),
            ],
        ],
    );

    let timeline = parse(&bytes).expect("valid file");
    assert_eq!(timeline.track_count(), 2);
    assert!(timeline.track(0).expect("conductor track").is_empty());

    let notes = timeline.track(1).expect("note track");
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].tick, 0);
    assert_close(notes[0].time, 0.0);
    assert_close(notes[0].duration, 0.5);
    assert_eq!(notes[1].tick, 960);
    assert_eq!(notes[1].pitch, 62);
    assert_eq!(notes[1].velocity, 90);
    assert_close(notes[1].time, 1.0);
    assert_close(notes[1].duration, 1.0);
    assert_close(timeline.end_time(), 2.0);
}

#[test]
fn zero_velocity_note_on_releases_the_note() {
    let bytes = encode(
        Timing::Metrical(u15::new(480)),
        vec![vec![note_on(0, 64, 80), note_on(240, 64, 0), note_on(240, 64, 70)]],
    );

    let notes = parse(&bytes).expect("valid file").track(0).expect("track").to_vec();
    assert_eq!(notes.len(), 2);
    assert_close(notes[0].duration, 0.25);
    assert_eq!(notes[1].duration, 0.0, "unreleased notes keep a zero duration");
}

#[test]
fn chord_voices_share_their_tick() {
    let bytes = encode(
        Timing::Metrical(u15::new(96)),
        vec![vec![
            note_on(96, 60, 100),
            note_on(0, 64, 100),
            note_on(0, 67, 100),
            note_off(96, 60),
            note_off(0, 64),
            note_off(0, 67),
        ]],
    );

    let timeline = parse(&bytes).expect("valid file");
    let notes = timeline.track(0).expect("track");
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|note| note.tick == 96));
    assert!(notes.iter().all(|note| (note.duration - 0.5).abs() < 1e-9));
}

#[test]
fn timecode_files_use_absolute_tick_lengths() {
    let bytes = encode(
        Timing::Timecode(Fps::Fps25, 40),
        vec![vec![note_on(1_500, 60, 100), note_off(500, 60)]],
    );

    let notes = parse(&bytes).expect("valid file").track(0).expect("track").to_vec();
    assert_close(notes[0].time, 1.5);
    assert_close(notes[0].duration, 0.5);
}

#[test]
fn missing_tracks_are_reported_as_absent() {
    let bytes = encode(Timing::Metrical(u15::new(480)), vec![vec![]]);
    let timeline = parse(&bytes).expect("valid file");
    assert!(timeline.track(5).is_none());
    assert_eq!(timeline.end_time(), 0.0);
}

#[test]
fn garbage_bytes_are_a_parse_error() {
    assert!(matches!(parse(b"not a midi file"), Err(MidiError::Parse(_))));
}

#[test]
fn unreadable_paths_are_an_io_error() {
    let error = load(std::path::Path::new("/nonexistent/blobsync/track.mid"))
        .expect_err("missing file");
    assert!(matches!(error, MidiError::Io { .. }));
    assert!(error.to_string().contains("track.mid"));
}
