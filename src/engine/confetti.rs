//! Particle burst shown when a sentence is completed.
//!
//! The simulation itself is clock-free: callers deliver frames and the
//! expiry signal, each tagged with the [`BurstId`] returned by
//! [`Confetti::activate`]. Anything tagged with an older id is ignored, so a
//! restarted or cancelled burst can never be advanced or ended by events
//! that were already in flight.

use std::time::Duration;

use rand::Rng;

pub const PALETTE: [&str; 12] = [
    "#FF6B6B", // coral red
    "#4ECDC4", // teal
    "#FFE66D", // sunshine yellow
    "#95E1D3", // mint
    "#F38181", // salmon
    "#AA96DA", // lavender
    "#FCBAD3", // pink
    "#A8E6CF", // seafoam
    "#FFD93D", // gold
    "#6BCB77", // green
    "#4D96FF", // blue
    "#FF6B9D", // hot pink
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Star,
    Ribbon,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Square, Shape::Star, Shape::Ribbon];
}

#[derive(Clone, Debug)]
pub struct Piece {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub color: &'static str,
    pub size: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub shape: Shape,
    pub opacity: f32,
}

impl Piece {
    fn spawn<R: Rng>(id: usize, width: f32, rng: &mut R) -> Self {
        Self {
            id,
            x: rng.gen_range(0.0..width.max(1.0)),
            y: -20.0 - rng.gen_range(0.0..100.0),
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
            size: 8.0 + rng.gen_range(0.0..12.0),
            rotation: rng.gen_range(0.0..360.0),
            rotation_speed: rng.gen_range(-5.0..5.0),
            velocity_x: rng.gen_range(-3.0..3.0),
            velocity_y: 2.0 + rng.gen_range(0.0..4.0),
            shape: Shape::ALL[rng.gen_range(0..Shape::ALL.len())],
            opacity: 0.8 + rng.gen_range(0.0..0.2),
        }
    }

    fn step(&mut self, settings: &ConfettiSettings) {
        self.x += self.velocity_x;
        self.y += self.velocity_y;
        self.rotation += self.rotation_speed;
        self.velocity_y += settings.gravity;
        self.velocity_x *= settings.drag;
        self.opacity = (self.opacity - settings.fade).max(0.0);
    }
}

#[derive(Clone, Debug)]
pub struct ConfettiSettings {
    pub piece_count: usize,
    pub duration: Duration,
    pub frame_interval: Duration,
    /// Added to vertical velocity every frame.
    pub gravity: f32,
    /// Multiplies horizontal velocity every frame. Must stay below 1.
    pub drag: f32,
    /// Subtracted from opacity every frame.
    pub fade: f32,
}

impl Default for ConfettiSettings {
    fn default() -> Self {
        Self {
            piece_count: 80,
            duration: Duration::from_millis(2500),
            frame_interval: Duration::from_millis(16),
            gravity: 0.15,
            drag: 0.99,
            fade: 0.002,
        }
    }
}

/// Width of the spawn area, in the same units as piece positions. Pieces
/// start above the top edge, so height never enters the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BurstId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Bursting,
}

pub struct Confetti {
    settings: ConfettiSettings,
    pieces: Vec<Piece>,
    phase: Phase,
    generation: u64,
    frames: u64,
}

impl Confetti {
    pub fn new(settings: ConfettiSettings) -> Self {
        Self {
            settings,
            pieces: Vec::new(),
            phase: Phase::Idle,
            generation: 0,
            frames: 0,
        }
    }

    pub fn settings(&self) -> &ConfettiSettings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_bursting(&self) -> bool {
        self.phase == Phase::Bursting
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Frames advanced in the live burst.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn current(&self) -> Option<BurstId> {
        self.is_bursting().then_some(BurstId(self.generation))
    }

    fn is_live(&self, id: BurstId) -> bool {
        self.is_bursting() && id.0 == self.generation
    }

    /// Start a burst. A burst already running is dropped first, so every
    /// activation gets a full set of pieces and its own id.
    pub fn activate<R: Rng>(&mut self, viewport: Viewport, rng: &mut R) -> BurstId {
        if self.is_bursting() {
            self.go_idle();
        }

        self.generation += 1;
        self.frames = 0;
        self.pieces = (0..self.settings.piece_count)
            .map(|id| Piece::spawn(id, viewport.width, rng))
            .collect();
        self.phase = Phase::Bursting;

        tracing::debug!(burst = self.generation, pieces = self.pieces.len(), "confetti burst started");
        BurstId(self.generation)
    }

    /// Advance every piece by one frame. Returns false for stale ids.
    pub fn frame(&mut self, id: BurstId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        for piece in &mut self.pieces {
            piece.step(&self.settings);
        }
        self.frames += 1;
        true
    }

    /// End the burst once its duration has elapsed.
    ///
    /// Returns true exactly once per burst; that is the completion signal.
    pub fn expire(&mut self, id: BurstId) -> bool {
        if !self.is_live(id) {
            return false;
        }
        tracing::debug!(burst = id.0, frames = self.frames, "confetti burst finished");
        self.go_idle();
        true
    }

    /// Tear down without signalling completion.
    pub fn cancel(&mut self) {
        if self.is_bursting() {
            self.go_idle();
        }
    }

    fn go_idle(&mut self) {
        self.pieces.clear();
        self.phase = Phase::Idle;
        // Invalidates every id handed out so far.
        self.generation += 1;
    }
}

impl Default for Confetti {
    fn default() -> Self {
        Self::new(ConfettiSettings::default())
    }
}
