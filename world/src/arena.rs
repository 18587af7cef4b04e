use blobsync_core::{BodyHandle, Canvas, PhysicsBackend, RectangleBody};

/// Edge of the canvas a wall guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallSide {
    /// Wall along the top edge.
    Top,
    /// Wall along the bottom edge.
    Bottom,
    /// Wall along the left edge.
    Left,
    /// Wall along the right edge.
    Right,
}

impl WallSide {
    /// Whether the wall runs along the horizontal axis.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Single static containment wall with its reveal state.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaWall {
    side: WallSide,
    body: BodyHandle,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    revealed: f32,
}

impl ArenaWall {
    /// Edge the wall guards.
    #[must_use]
    pub fn side(&self) -> WallSide {
        self.side
    }

    /// Body registered for the wall.
    #[must_use]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Centre of the wall.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Full extent of the wall body.
    #[must_use]
    pub fn full_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Thickness revealed so far.
    #[must_use]
    pub fn revealed(&self) -> f32 {
        self.revealed
    }

    /// Size of the visible rectangle, centred on the wall.
    ///
    /// Horizontal walls reveal their height, vertical walls reveal their width.
    #[must_use]
    pub fn visible_size(&self) -> (f32, f32) {
        if self.side.is_horizontal() {
            (self.width, self.revealed.min(self.height))
        } else {
            (self.revealed.min(self.width), self.height)
        }
    }

    fn span(&self) -> f32 {
        if self.side.is_horizontal() {
            self.height
        } else {
            self.width
        }
    }
}

/// The four containment walls. Either all four exist or none do.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaWalls {
    walls: [ArenaWall; 4],
}

impl ArenaWalls {
    /// Registers four static bodies framing the canvas.
    pub(crate) fn build(physics: &mut dyn PhysicsBackend, canvas: Canvas) -> Self {
        let Canvas { width, height } = canvas;
        let thickness = canvas.wall_thickness();
        let layout = [
            (WallSide::Top, width / 2.0, 0.0, width, thickness),
            (WallSide::Bottom, width / 2.0, height, width, thickness),
            (WallSide::Right, width, height / 2.0, thickness, height),
            (WallSide::Left, 0.0, height / 2.0, thickness, height),
        ];

        let walls = layout.map(|(side, x, y, width, height)| ArenaWall {
            side,
            body: physics.insert_static_rectangle(RectangleBody {
                x,
                y,
                width,
                height,
            }),
            x,
            y,
            width,
            height,
            revealed: 0.0,
        });
        Self { walls }
    }

    /// Releases every wall body, consuming the set.
    pub(crate) fn teardown(self, physics: &mut dyn PhysicsBackend) {
        for wall in self.walls {
            let _ = physics.remove(wall.body);
        }
    }

    /// Grows every wall's reveal by `increment`, clamped to its full span.
    pub(crate) fn advance_reveal(&mut self, increment: f32) {
        for wall in &mut self.walls {
            wall.revealed = (wall.revealed + increment).min(wall.span());
        }
    }

    /// The walls in top, bottom, right, left order.
    #[must_use]
    pub fn walls(&self) -> &[ArenaWall; 4] {
        &self.walls
    }

    /// Whether every wall reached its full span.
    #[must_use]
    pub fn is_fully_revealed(&self) -> bool {
        self.walls.iter().all(|wall| wall.revealed >= wall.span())
    }
}
