use glam::Vec2;

use crate::mapping::{clamp_position, distance_from_center};
use crate::state::{DragEvent, SoundSource, SourceId};

/// Return a copy of `sources` with the dragged source moved.
///
/// The position is clamped into \[0, 1\]² and the cached distance recomputed.
/// An unknown id leaves the list unchanged: it is a late event for a source
/// that has already been removed.
pub fn apply_drag(sources: &[SoundSource], event: &DragEvent) -> Vec<SoundSource> {
    sources
        .iter()
        .map(|source| {
            if source.id == event.source_id {
                let position = clamp_position(event.position);
                SoundSource {
                    position,
                    normalized_distance: distance_from_center(position),
                    ..source.clone()
                }
            } else {
                source.clone()
            }
        })
        .collect()
}

/// Pointer capture for one drag gesture.
///
/// Created on press over a source and dropped on release or cancel, wherever
/// the pointer happens to be at that point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub source_id: SourceId,
    pub pointer_id: i32,
}

impl DragSession {
    pub fn begin(source_id: SourceId, pointer_id: i32) -> Self {
        Self {
            source_id,
            pointer_id,
        }
    }

    #[inline]
    pub fn owns(&self, pointer_id: i32) -> bool {
        self.pointer_id == pointer_id
    }

    /// Move event for the captured source at a normalized position.
    #[inline]
    pub fn move_to(&self, uv: Vec2) -> DragEvent {
        DragEvent {
            source_id: self.source_id,
            position: uv,
        }
    }
}

/// Surface rectangle in client pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Client pixel coordinates to clamped surface uv. A degenerate rect maps to
/// the listener.
#[inline]
pub fn surface_uv(client_x: f32, client_y: f32, rect: SurfaceRect) -> Vec2 {
    if rect.width > 0.0 && rect.height > 0.0 {
        let u = ((client_x - rect.left) / rect.width).clamp(0.0, 1.0);
        let v = ((client_y - rect.top) / rect.height).clamp(0.0, 1.0);
        Vec2::new(u, v)
    } else {
        SoundSource::listener_position()
    }
}
