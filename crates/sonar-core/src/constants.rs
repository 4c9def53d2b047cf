use crate::state::Timbre;

// Palettes and tuning constants shared by the pipeline, mapping and beep code.

// Add-source palettes, cycled by insertion index
pub const SOURCE_COLORS: [&str; 6] = [
    "#60A5FA", // blue
    "#34D399", // green
    "#A78BFA", // violet
    "#FBBF24", // amber
    "#F472B6", // pink
    "#818CF8", // indigo
];
pub const SOURCE_FREQUENCIES_HZ: [f32; 6] = [220.0, 261.63, 293.66, 329.63, 349.23, 392.0];
pub const SOURCE_TIMBRES: [Timbre; 6] = [
    Timbre::Sine,
    Timbre::Triangle,
    Timbre::Sine,
    Timbre::Triangle,
    Timbre::Sine,
    Timbre::Triangle,
];

// Listener sits at the centre of the unit square
pub const LISTENER_UV: [f32; 2] = [0.5, 0.5];

// Placed-source gain falloff
pub const SOURCE_GAIN_MIN: f32 = 0.001; // near-inaudible at the edge
pub const SOURCE_GAIN_MAX: f32 = 0.5;

// Standalone proximity beep
pub const PROXIMITY_BEEP_THRESHOLD: f32 = 0.99; // normalized distance
pub const PROXIMITY_BEEP_GAIN_MAX: f32 = 0.5;
pub const PROXIMITY_INTERVAL_MAX_MS: f64 = 1500.0;
pub const PROXIMITY_INTERVAL_MIN_MS: f64 = 150.0;
pub const PROXIMITY_PITCH_SHIFT_MAX_HZ: f32 = 100.0;
pub const PROXIMITY_DECAY_SEC: f64 = 0.18;

// Beep envelope attack, shared by both beep variants
pub const BEEP_ATTACK_SEC: f64 = 0.01;

// Nearest-object channel
pub const NEAREST_DISTANCE_MAX: f32 = 2.0;
pub const NEAREST_PITCH_MAX_HZ: f32 = 1200.0;
pub const NEAREST_PITCH_SLOPE_HZ: f32 = 450.0; // Hz lost per distance unit
pub const NEAREST_GAIN_FLOOR: f32 = 0.1;
pub const NEAREST_BASE_FREQUENCY_HZ: f32 = 440.0;

// Seconds the device takes to glide to a new panner position
pub const POSITION_GLIDE_SEC: f64 = 0.1;
