//! Seams to the audio and haptic hardware.
//!
//! The web shell implements these over WebAudio; tests use a recording fake.

use glam::Vec3;

use crate::error::Result;
use crate::state::Timbre;

/// Control surface of one oscillator -> gain -> panner chain.
///
/// Times are on the device clock (seconds, see [`AudioDevice::current_time`]);
/// `None` means "now".
pub trait SourceHandle {
    fn set_frequency(&mut self, hz: f32);
    fn set_gain(&mut self, level: f32, at: Option<f64>);
    fn set_position(&mut self, position: Vec3, at: Option<f64>);
    fn set_timbre(&mut self, timbre: Timbre);
    fn start(&mut self);
    /// Silence without releasing resources.
    fn stop(&mut self);
    /// Drop gain events already written at or after `from`, so a stale
    /// envelope cannot override a value set afterwards.
    fn cancel_scheduled(&mut self, from: f64);
    /// Release the device resources. Consumes the handle so it runs once.
    fn disconnect(self)
    where
        Self: Sized;
}

pub trait AudioDevice {
    type Handle: SourceHandle;

    /// Put the listener at the origin facing -z with +y up.
    fn init_listener(&mut self) -> Result<()>;

    /// Build a muted chain for a new source.
    fn create_source(&mut self, base_frequency: f32, timbre: Timbre) -> Result<Self::Handle>;

    /// Device clock in seconds.
    fn current_time(&self) -> f64;
}

/// Best-effort vibration; a missing motor is not an error.
pub trait Haptics {
    fn vibrate(&mut self, duration_ms: u32);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&mut self, _duration_ms: u32) {}
}
