#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulated playback transport.
//!
//! The transport stands in for an audio player: it owns the playback clock,
//! accepts time-indexed cue registrations and fires them in nondecreasing
//! time order, each exactly once per playthrough, as the clock advances.

use std::time::Duration;

use blobsync_core::{CuePayload, SessionState, CREDITS_LINE};
use blobsync_system_cue_scheduling::CueSink;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScheduledCue {
    time: f64,
    payload: CuePayload,
}

/// Playback clock with pre-registered cues.
#[derive(Debug)]
pub struct Transport {
    cues: Vec<ScheduledCue>,
    cursor: usize,
    position: f64,
    duration: f64,
    state: SessionState,
    credits_logged: bool,
}

impl Transport {
    /// Creates an idle transport for a track of `duration` seconds.
    #[must_use]
    pub fn new(duration: f64) -> Self {
        Self {
            cues: Vec::new(),
            cursor: 0,
            position: 0.0,
            duration: duration.max(0.0),
            state: SessionState::Idle,
            credits_logged: false,
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the playback clock is advancing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Playback position in seconds.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.position
    }

    /// Length of the track in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of registered cues.
    #[must_use]
    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    /// Number of cues that have not fired during the current playthrough.
    #[must_use]
    pub fn pending_cues(&self) -> usize {
        self.cues.len() - self.cursor
    }

    /// Starts or resumes playback. After the end of the track it replays from the start.
    pub fn play(&mut self) {
        match self.state {
            SessionState::Running => return,
            SessionState::Ended => self.rewind(),
            SessionState::Idle | SessionState::Paused => {}
        }
        self.transition(SessionState::Running);
    }

    /// Halts the clock, keeping pending cues armed.
    pub fn pause(&mut self) {
        if self.state == SessionState::Running {
            self.transition(SessionState::Paused);
        }
    }

    /// Rewinds to the start and re-arms every cue.
    pub fn stop(&mut self) {
        self.rewind();
        if self.state != SessionState::Idle {
            self.transition(SessionState::Idle);
        }
    }

    /// Pauses a running transport, otherwise starts it.
    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advances the clock and appends every cue that became due to `out`.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<CuePayload>) {
        if self.state != SessionState::Running {
            return;
        }

        self.position = (self.position + dt.as_secs_f64()).min(self.duration);
        while let Some(cue) = self.cues.get(self.cursor) {
            if cue.time > self.position {
                break;
            }
            out.push(cue.payload);
            self.cursor += 1;
        }

        if self.position >= self.duration {
            self.transition(SessionState::Ended);
            if !self.credits_logged {
                self.credits_logged = true;
                info!("{CREDITS_LINE}");
            }
        }
    }

    fn rewind(&mut self) {
        self.position = 0.0;
        self.cursor = 0;
    }

    fn transition(&mut self, next: SessionState) {
        info!(from = ?self.state, to = ?next, position = self.position, "playback state changed");
        self.state = next;
    }
}

impl CueSink for Transport {
    fn add_cue(&mut self, time: f64, payload: CuePayload) {
        let index = self.cues.partition_point(|cue| cue.time <= time);
        if index < self.cursor {
            self.cursor += 1;
        }
        self.cues.insert(index, ScheduledCue { time, payload });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobsync_core::CueSetId;

    fn payload(ordinal: u32) -> CuePayload {
        CuePayload {
            cue_set: CueSetId::PhysicsPrimary,
            ordinal,
            source_time: 0.0,
            note: None,
        }
    }

    #[test]
    fn late_registration_before_the_cursor_waits_for_the_next_playthrough() {
        let mut transport = Transport::new(2.0);
        transport.add_cue(1.0, payload(1));
        transport.play();
        let mut fired = Vec::new();
        transport.advance(Duration::from_millis(1_500), &mut fired);
        assert_eq!(fired.len(), 1);

        transport.add_cue(0.5, payload(2));
        transport.advance(Duration::from_secs(1), &mut fired);
        assert_eq!(fired.len(), 1);
        assert_eq!(transport.pending_cues(), 0);
    }
}
