//! Simulation state shared by the pipeline, the controller and the shells.
//!
//! State values are moved through the pipeline stage by stage; nothing here
//! hands out interior mutability, so a previous state can never be observed
//! half-updated.

use glam::Vec2;
use std::fmt;

use crate::constants::LISTENER_UV;

/// Oscillator waveform of a source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Timbre {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Timbre {
    pub fn as_str(self) -> &'static str {
        match self {
            Timbre::Sine => "sine",
            Timbre::Triangle => "triangle",
            Timbre::Square => "square",
            Timbre::Sawtooth => "sawtooth",
        }
    }
}

impl fmt::Display for Timbre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a placed source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source-{}", self.0)
    }
}

/// One emitting point on the plane.
#[derive(Clone, Debug, PartialEq)]
pub struct SoundSource {
    pub id: SourceId,
    /// Display only.
    pub color: &'static str,
    pub base_frequency: f32,
    pub timbre: Timbre,
    /// Normalized position in \[0, 1\]²; the listener is at (0.5, 0.5).
    pub position: Vec2,
    /// Derived from `position`; cached for the beep scheduler.
    pub normalized_distance: f32,
}

impl SoundSource {
    #[inline]
    pub fn listener_position() -> Vec2 {
        Vec2::new(LISTENER_UV[0], LISTENER_UV[1])
    }
}

/// Proximity signal produced by an external detector.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestObject {
    /// Expected in \[0, 2\]; anything beyond is silent.
    pub distance: f32,
    pub position: Vec2,
    pub kind: Option<String>,
}

impl NearestObject {
    pub fn new(distance: f32, position: Vec2) -> Self {
        Self {
            distance,
            position,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Aggregate root owned by the controller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationState {
    /// Creation order; doubles as display and channel order.
    pub sources: Vec<SoundSource>,
    pub audio_started: bool,
    pub nearest_object: Option<NearestObject>,
    /// Next id handed out by the add-source stage.
    pub next_id: u64,
}

impl SimulationState {
    pub fn source(&self, id: SourceId) -> Option<&SoundSource> {
        self.sources.iter().find(|s| s.id == id)
    }
}

/// A move request for one source, in normalized coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragEvent {
    pub source_id: SourceId,
    pub position: Vec2,
}

/// Discrete user or sensor action fed through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    AddSource,
    RemoveLastSource,
    MoveSource(DragEvent),
    UpdateNearestObject(Option<NearestObject>),
}

impl Action {
    pub fn move_source(source_id: SourceId, position: Vec2) -> Self {
        Action::MoveSource(DragEvent {
            source_id,
            position,
        })
    }
}
