//! Tuning knobs for the controller and the nearest-object channel.

use crate::constants::NEAREST_GAIN_FLOOR;

/// Options for the nearest-object sonification channel.
#[derive(Clone, Debug, PartialEq)]
pub struct SonificationOptions {
    /// Peak gain at distance 0 (0..1).
    pub volume_max: f32,
    /// Slowest beeps per second, held from distance 1 outward.
    pub tempo_min: f32,
    /// Beeps per second at distance 0.
    pub tempo_max: f32,
    /// Beep length in seconds; also the haptic pulse length.
    pub beep_duration: f64,
    pub haptic_enabled: bool,
}

impl Default for SonificationOptions {
    fn default() -> Self {
        Self {
            volume_max: 0.7,
            tempo_min: 1.0,
            tempo_max: 5.0,
            beep_duration: 0.08,
            haptic_enabled: true,
        }
    }
}

impl SonificationOptions {
    pub fn with_volume_max(mut self, volume_max: f32) -> Self {
        self.volume_max = volume_max;
        self
    }

    pub fn with_tempo(mut self, tempo_min: f32, tempo_max: f32) -> Self {
        self.tempo_min = tempo_min;
        self.tempo_max = tempo_max;
        self
    }

    pub fn with_beep_duration(mut self, seconds: f64) -> Self {
        self.beep_duration = seconds;
        self
    }

    pub fn with_haptics(mut self, enabled: bool) -> Self {
        self.haptic_enabled = enabled;
        self
    }

    /// Repair user-supplied values so the mapping curves stay well defined:
    /// tempos positive and ordered, volume within \[floor, 1\], a non-zero beep.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.volume_max.is_finite() {
            self.volume_max = defaults.volume_max;
        }
        self.volume_max = self.volume_max.clamp(NEAREST_GAIN_FLOOR, 1.0);
        if !(self.tempo_min.is_finite() && self.tempo_min > 0.0) {
            self.tempo_min = defaults.tempo_min;
        }
        if !(self.tempo_max.is_finite() && self.tempo_max > 0.0) {
            self.tempo_max = defaults.tempo_max;
        }
        if self.tempo_min > self.tempo_max {
            std::mem::swap(&mut self.tempo_min, &mut self.tempo_max);
        }
        if !(self.beep_duration.is_finite() && self.beep_duration > 0.0) {
            self.beep_duration = defaults.beep_duration;
        }
        self
    }

    #[inline]
    pub fn beep_duration_ms(&self) -> f64 {
        self.beep_duration * 1000.0
    }
}

/// How placed sources sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Continuous tone with distance falloff.
    #[default]
    Continuous,
    /// Periodic proximity beeps instead of a steady tone.
    Beeping,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControllerConfig {
    pub source_mode: SourceMode,
    pub sonification: SonificationOptions,
}

impl ControllerConfig {
    /// Read overrides from a URL query such as `?mode=beep&haptics=off`.
    ///
    /// Recognised keys: `mode` (`beep`|`continuous`), `haptics` (`on`|`off`),
    /// `volume`, `tempo_min`, `tempo_max` and `beep_ms`. Unknown keys and
    /// unparsable values are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut config = Self::default();
        let pairs = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='));
        for (key, value) in pairs {
            let opts = &mut config.sonification;
            match key {
                "mode" => match value {
                    "beep" | "beeping" => config.source_mode = SourceMode::Beeping,
                    "continuous" => config.source_mode = SourceMode::Continuous,
                    _ => log::warn!("[config] unknown mode {:?}", value),
                },
                "haptics" => opts.haptic_enabled = !matches!(value, "off" | "0" | "false"),
                "volume" => {
                    if let Ok(v) = value.parse() {
                        opts.volume_max = v;
                    }
                }
                "tempo_min" => {
                    if let Ok(v) = value.parse() {
                        opts.tempo_min = v;
                    }
                }
                "tempo_max" => {
                    if let Ok(v) = value.parse() {
                        opts.tempo_max = v;
                    }
                }
                "beep_ms" => {
                    if let Ok(v) = value.parse::<f64>() {
                        opts.beep_duration = v / 1000.0;
                    }
                }
                _ => {}
            }
        }
        config.sonification = config.sonification.sanitized();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_orders_tempos_and_clamps_volume() {
        let opts = SonificationOptions::default()
            .with_tempo(6.0, 2.0)
            .with_volume_max(3.0)
            .sanitized();
        assert_eq!(opts.tempo_min, 2.0);
        assert_eq!(opts.tempo_max, 6.0);
        assert_eq!(opts.volume_max, 1.0);
    }

    #[test]
    fn query_overrides_defaults() {
        let config = ControllerConfig::from_query("?mode=beep&haptics=off&volume=0.5&beep_ms=120");
        assert_eq!(config.source_mode, SourceMode::Beeping);
        assert!(!config.sonification.haptic_enabled);
        assert_eq!(config.sonification.volume_max, 0.5);
        assert!((config.sonification.beep_duration - 0.12).abs() < 1e-12);
    }

    #[test]
    fn query_ignores_junk() {
        let config = ControllerConfig::from_query("volume=loud&&tempo_max&foo=bar");
        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn sanitized_replaces_non_positive_values() {
        let opts = SonificationOptions::default()
            .with_tempo(0.0, f32::NAN)
            .with_beep_duration(-1.0)
            .sanitized();
        assert_eq!(opts, SonificationOptions::default());
    }
}
