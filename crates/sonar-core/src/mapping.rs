//! Pure sensory mappings from position/distance to audio control values.
//!
//! Inputs are clamped once at the boundary (`clamp_unit`,
//! `clamp_nearest_distance`); the curves below assume clamped values.

use glam::{Vec2, Vec3};

use crate::config::SonificationOptions;
use crate::constants::*;
use crate::state::{NearestObject, SoundSource, Timbre};

/// Control values pushed to one device handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioTarget {
    pub frequency: f32,
    pub gain: f32,
    /// Listener-relative placement; y is always 0.
    pub position: Vec3,
}

// ---------------- Boundary clamping ----------------

/// Clamp a normalized coordinate into \[0, 1\]. NaN falls back to the listener.
#[inline]
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        LISTENER_UV[0]
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[inline]
pub fn clamp_position(p: Vec2) -> Vec2 {
    Vec2::new(clamp_unit(p.x), clamp_unit(p.y))
}

/// Clamp a nearest-object distance into \[0, 2\].
#[inline]
pub fn clamp_nearest_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        NEAREST_DISTANCE_MAX
    } else {
        distance.clamp(0.0, NEAREST_DISTANCE_MAX)
    }
}

// ---------------- Placed sources ----------------

/// Map the unit square onto a \[-1, 1\] horizontal plane around the listener.
#[inline]
pub fn placement(p: Vec2) -> Vec3 {
    let p = clamp_position(p);
    Vec3::new((p.x - 0.5) * 2.0, 0.0, (p.y - 0.5) * 2.0)
}

/// Distance to the listener scaled so the square's inscribed circle is 1.
#[inline]
pub fn distance_from_center(p: Vec2) -> f32 {
    let p = clamp_position(p);
    let dx = p.x - LISTENER_UV[0];
    let dy = p.y - LISTENER_UV[1];
    ((dx * dx + dy * dy).sqrt() * 2.0).clamp(0.0, 1.0)
}

/// Quadratic falloff: 0.5 at the listener, 0.001 at distance 1.
#[inline]
pub fn falloff_gain(distance: f32) -> f32 {
    let t = distance.clamp(0.0, 1.0);
    let near = 1.0 - t;
    SOURCE_GAIN_MIN + (SOURCE_GAIN_MAX - SOURCE_GAIN_MIN) * near * near
}

pub fn source_target(source: &SoundSource) -> AudioTarget {
    AudioTarget {
        frequency: source.base_frequency,
        gain: falloff_gain(distance_from_center(source.position)),
        position: placement(source.position),
    }
}

// ---------------- Standalone proximity beep ----------------

/// `(1 - d)²`, the shared weight for gain, cadence and pitch shift.
#[inline]
pub fn proximity_factor(normalized_distance: f32) -> f32 {
    let near = 1.0 - normalized_distance.clamp(0.0, 1.0);
    near * near
}

#[inline]
pub fn in_proximity_band(normalized_distance: f32) -> bool {
    normalized_distance.is_finite() && normalized_distance < PROXIMITY_BEEP_THRESHOLD
}

/// Beep period, 1500 ms far away down to 150 ms at the listener.
#[inline]
pub fn proximity_interval_ms(normalized_distance: f32) -> f64 {
    let f = proximity_factor(normalized_distance) as f64;
    PROXIMITY_INTERVAL_MAX_MS - (PROXIMITY_INTERVAL_MAX_MS - PROXIMITY_INTERVAL_MIN_MS) * f
}

#[inline]
pub fn proximity_gain(normalized_distance: f32) -> f32 {
    proximity_factor(normalized_distance) * PROXIMITY_BEEP_GAIN_MAX
}

#[inline]
pub fn proximity_frequency(base_frequency: f32, normalized_distance: f32) -> f32 {
    base_frequency + PROXIMITY_PITCH_SHIFT_MAX_HZ * proximity_factor(normalized_distance)
}

// ---------------- Nearest object ----------------

/// Closer is higher: 1200 Hz at 0 down to 300 Hz at 2.
#[inline]
pub fn nearest_pitch(distance: f32) -> f32 {
    NEAREST_PITCH_MAX_HZ - clamp_nearest_distance(distance) * NEAREST_PITCH_SLOPE_HZ
}

/// Linear from `volume_max` down, never below the 0.1 floor (the raw line
/// crosses it at distance 1).
#[inline]
pub fn nearest_gain(distance: f32, volume_max: f32) -> f32 {
    let raw = volume_max - clamp_nearest_distance(distance) * (volume_max - NEAREST_GAIN_FLOOR);
    raw.max(NEAREST_GAIN_FLOOR.min(volume_max))
}

/// Beeps per second; bottoms out at `tempo_min` once the line reaches it.
#[inline]
pub fn nearest_tempo_hz(distance: f32, opts: &SonificationOptions) -> f32 {
    let raw = opts.tempo_max - clamp_nearest_distance(distance) * (opts.tempo_max - opts.tempo_min);
    raw.max(opts.tempo_min)
}

#[inline]
pub fn nearest_period_ms(distance: f32, opts: &SonificationOptions) -> f64 {
    1000.0 / nearest_tempo_hz(distance, opts) as f64
}

/// Pick a waveform per detected object kind (English or Spanish labels).
pub fn timbre_for_kind(kind: Option<&str>) -> Timbre {
    let Some(kind) = kind else {
        return Timbre::Sine;
    };
    match kind.trim().to_ascii_lowercase().as_str() {
        "person" | "persona" => Timbre::Triangle,
        "wall" | "pared" => Timbre::Square,
        "door" | "puerta" => Timbre::Sawtooth,
        _ => Timbre::Sine,
    }
}

/// Everything the nearest-object channel needs for one signal update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestCue {
    pub frequency: f32,
    pub gain: f32,
    pub timbre: Timbre,
    pub position: Vec3,
    pub period_ms: f64,
    /// False beyond distance 2 (or for a non-finite distance).
    pub audible: bool,
}

pub fn nearest_cue(object: &NearestObject, opts: &SonificationOptions) -> NearestCue {
    let audible = object.distance.is_finite() && object.distance <= NEAREST_DISTANCE_MAX;
    NearestCue {
        frequency: nearest_pitch(object.distance),
        gain: if audible {
            nearest_gain(object.distance, opts.volume_max)
        } else {
            0.0
        },
        timbre: timbre_for_kind(object.kind.as_deref()),
        position: placement(object.position),
        period_ms: nearest_period_ms(object.distance, opts),
        audible,
    }
}
