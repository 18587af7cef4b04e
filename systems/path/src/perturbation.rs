use blobsync_core::PathCommand;

/// Default offset magnitude applied to perturbed vertices.
pub const PERTURBATION_AMPLITUDE: f32 = 10.0;

/// Number of commands at each end of a path that are never perturbed.
pub const SEAM_LENGTH: usize = 2;

/// Reports whether the command at `index` belongs to the stable seam of a path of `len` commands.
#[must_use]
pub const fn is_seam(index: usize, len: usize) -> bool {
    index < SEAM_LENGTH || index + SEAM_LENGTH >= len
}

/// Continuous deformation driven by time and vertex index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexPerturbation {
    amplitude: f32,
}

impl Default for VertexPerturbation {
    fn default() -> Self {
        Self::new(PERTURBATION_AMPLITUDE)
    }
}

impl VertexPerturbation {
    /// Creates a perturbation with the provided amplitude.
    #[must_use]
    pub const fn new(amplitude: f32) -> Self {
        Self { amplitude }
    }

    /// Offset magnitude applied on each axis.
    #[must_use]
    pub const fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Offsets a single vertex. Pure in all four inputs.
    #[must_use]
    pub fn perturb(&self, x: f32, y: f32, index: usize, time: f32) -> (f32, f32) {
        let phase = time + index as f32;
        (
            x + phase.sin() * self.amplitude,
            y + phase.cos() * self.amplitude,
        )
    }

    /// Returns a copy of `path` with every interior command perturbed.
    ///
    /// Quadratic curves offset their control point with the command index and
    /// their end point with the following index.
    #[must_use]
    pub fn apply(&self, path: &[PathCommand], time: f32) -> Vec<PathCommand> {
        let len = path.len();
        path.iter()
            .enumerate()
            .map(|(index, command)| {
                if is_seam(index, len) {
                    return command.clone();
                }
                match *command {
                    PathCommand::Move { x, y } => {
                        let (x, y) = self.perturb(x, y, index, time);
                        PathCommand::Move { x, y }
                    }
                    PathCommand::QuadraticCurve { cx, cy, x, y } => {
                        let (cx, cy) = self.perturb(cx, cy, index, time);
                        let (x, y) = self.perturb(x, y, index + 1, time);
                        PathCommand::QuadraticCurve { cx, cy, x, y }
                    }
                    PathCommand::Unsupported { .. } => command.clone(),
                }
            })
            .collect()
    }
}
