use midly::{MetaMessage, Smf, Timing, TrackEventKind};

const DEFAULT_MICROS_PER_BEAT: f64 = 500_000.0;

/// Piecewise-linear tick to seconds conversion.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TempoMap {
    /// Ticks are beat subdivisions; seconds depend on tempo changes.
    Metrical {
        /// `(tick, seconds at tick, seconds per tick)` sorted by tick.
        segments: Vec<(u64, f64, f64)>,
    },
    /// Ticks are fixed fractions of a second.
    Timecode { seconds_per_tick: f64 },
}

impl TempoMap {
    pub(crate) fn from_smf(smf: &Smf<'_>) -> Self {
        match smf.header.timing {
            Timing::Timecode(fps, subframes) => Self::Timecode {
                seconds_per_tick: 1.0 / (f64::from(fps.as_f32()) * f64::from(subframes.max(1))),
            },
            Timing::Metrical(ticks) => {
                let ticks_per_beat = f64::from(ticks.as_int().max(1));
                let mut changes: Vec<(u64, f64)> = Vec::new();
                for track in &smf.tracks {
                    let mut tick = 0_u64;
                    for event in track {
                        tick += u64::from(event.delta.as_int());
                        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                            changes.push((tick, f64::from(tempo.as_int())));
                        }
                    }
                }
                Self::metrical(ticks_per_beat, changes)
            }
        }
    }

    fn metrical(ticks_per_beat: f64, mut changes: Vec<(u64, f64)>) -> Self {
        changes.sort_by_key(|(tick, _)| *tick);
        let per_tick = |micros: f64| micros / 1_000_000.0 / ticks_per_beat;

        let mut segments = vec![(0, 0.0, per_tick(DEFAULT_MICROS_PER_BEAT))];
        for (tick, micros) in changes {
            let Some(&(start, seconds, rate)) = segments.last() else {
                continue;
            };
            let at = seconds + (tick - start) as f64 * rate;
            if tick == start {
                let _ = segments.pop();
            }
            segments.push((tick, at, per_tick(micros)));
        }

        Self::Metrical { segments }
    }

    pub(crate) fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            Self::Timecode { seconds_per_tick } => tick as f64 * seconds_per_tick,
            Self::Metrical { segments } => {
                let index = segments.partition_point(|(start, _, _)| *start <= tick);
                match index.checked_sub(1).and_then(|index| segments.get(index)) {
                    Some(&(start, seconds, rate)) => seconds + (tick - start) as f64 * rate,
                    None => 0.0,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn default_tempo_is_one_hundred_twenty_bpm() {
        let map = TempoMap::metrical(480.0, Vec::new());
        assert_close(map.seconds_at(480), 0.5);
        assert_eq!(map.seconds_at(0), 0.0);
    }

    #[test]
    fn tempo_changes_apply_from_their_tick() {
        // 120 bpm for one beat, then 60 bpm.
        let map = TempoMap::metrical(480.0, vec![(480, 1_000_000.0), (0, 500_000.0)]);
        assert_close(map.seconds_at(480), 0.5);
        assert_close(map.seconds_at(960), 1.5);
        assert_close(map.seconds_at(240), 0.25);
    }

    #[test]
    fn timecode_ticks_are_fixed_fractions_of_a_second() {
        let map = TempoMap::Timecode {
            seconds_per_tick: 1.0 / 1000.0,
        };
        assert_close(map.seconds_at(1500), 1.5);
    }
}
