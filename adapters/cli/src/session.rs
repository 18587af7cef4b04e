use std::time::Duration;

use blobsync_core::{Canvas, Command, CuePayload, Event, PhysicsBackend, SessionState};
use blobsync_midi::NoteTimeline;
use blobsync_playback::Transport;
use blobsync_rendering::FrameInput;
use blobsync_system_cue_scheduling::CueScheduler;
use blobsync_system_director::{KinematicSketch, PhysicsSketch};
use blobsync_world::{self as world, query, World, WorldTuning};
use tracing::{info, warn};

use crate::config::TrackBinding;

/// Director variant steering the session.
#[derive(Debug)]
pub(crate) enum Director {
    Physics(PhysicsSketch),
    Kinematic(KinematicSketch),
}

impl Director {
    fn start(&self, out: &mut Vec<Command>) {
        match self {
            Self::Physics(sketch) => sketch.start(out),
            Self::Kinematic(_) => {}
        }
    }

    fn handle(
        &mut self,
        cues: &[CuePayload],
        events: &[Event],
        session: SessionState,
        world: &World,
        out: &mut Vec<Command>,
    ) {
        let canvas = query::canvas(world);
        match self {
            Self::Physics(sketch) => sketch.handle(cues, events, session, canvas, out),
            Self::Kinematic(sketch) => {
                let footprints = query::outline_footprints(world);
                sketch.handle(cues, session, canvas, &footprints, out);
            }
        }
    }
}

/// Registers the cues of every bound track on the transport.
///
/// Bindings naming tracks the file does not have are skipped with a warning.
pub(crate) fn schedule_tracks(
    timeline: &NoteTimeline,
    bindings: &[TrackBinding],
    transport: &mut Transport,
) -> usize {
    let scheduler = CueScheduler;
    let mut scheduled = 0;
    for binding in bindings {
        let Some(notes) = timeline.track(binding.track) else {
            warn!(
                track = binding.track,
                cue_set = %binding.cue_set,
                available = timeline.track_count(),
                "bound track is missing from the MIDI file"
            );
            continue;
        };
        scheduled += scheduler.schedule(notes, binding.cue_set, binding.polyphony, transport);
    }
    scheduled
}

/// Drives one playback session frame by frame.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    transport: Transport,
    director: Director,
    fired: Vec<CuePayload>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Session {
    /// Configures the world for `canvas` and lets the director prepare the stage.
    pub(crate) fn new(
        physics: Box<dyn PhysicsBackend>,
        tuning: WorldTuning,
        canvas: Canvas,
        transport: Transport,
        director: Director,
    ) -> Self {
        let mut session = Self {
            world: World::with_tuning(physics, tuning),
            transport,
            director,
            fired: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        };

        session.commands.push(Command::ConfigureCanvas { canvas });
        session.director.start(&mut session.commands);
        session.flush_commands();
        info!(
            cues = session.transport.cue_count(),
            duration = session.transport.duration(),
            "session ready"
        );
        session
    }

    #[must_use]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Advances the session by one rendered frame.
    pub(crate) fn frame(&mut self, dt: Duration, input: &FrameInput) {
        if input.toggle_playback {
            self.transport.toggle();
        }
        if let Some(canvas) = input.resize {
            self.commands.push(Command::ConfigureCanvas { canvas });
        }

        // Cues fired on the frame playback ends still count as running.
        let cue_state = self.transport.state();
        self.fired.clear();
        self.transport.advance(dt, &mut self.fired);
        self.commands.push(Command::SetSessionState { state: cue_state });
        self.flush_commands();

        let events = std::mem::take(&mut self.events);
        self.director.handle(
            &self.fired,
            &events,
            cue_state,
            &self.world,
            &mut self.commands,
        );
        self.commands.push(Command::SetSessionState {
            state: self.transport.state(),
        });
        self.commands.push(Command::Tick { dt });
        self.flush_commands();
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
