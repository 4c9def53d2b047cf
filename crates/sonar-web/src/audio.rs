use glam::Vec3;
use sonar_core::{AudioDevice, Haptics, SonarError, SourceHandle, Timbre, POSITION_GLIDE_SEC};
use wasm_bindgen::JsValue;
use web_sys as web;

fn oscillator_type(timbre: Timbre) -> web::OscillatorType {
    match timbre {
        Timbre::Sine => web::OscillatorType::Sine,
        Timbre::Triangle => web::OscillatorType::Triangle,
        Timbre::Square => web::OscillatorType::Square,
        Timbre::Sawtooth => web::OscillatorType::Sawtooth,
    }
}

// Device calls after start are best-effort; a rejected call is logged and dropped
fn log_err<T>(res: Result<T, JsValue>, what: &str) {
    if let Err(e) = res {
        log::warn!("[audio] {} failed: {:?}", what, e);
    }
}

pub struct WebAudioDevice {
    ctx: web::AudioContext,
}

impl WebAudioDevice {
    pub fn new() -> Result<Self, SonarError> {
        let ctx = web::AudioContext::new().map_err(|e| SonarError::unavailable(format!("{:?}", e)))?;
        Ok(Self { ctx })
    }

    /// Browsers keep a fresh context suspended until a user gesture.
    pub fn resume(&self) {
        log_err(self.ctx.resume(), "resume");
    }
}

impl AudioDevice for WebAudioDevice {
    type Handle = WebSourceHandle;

    fn init_listener(&mut self) -> Result<(), SonarError> {
        let listener = self.ctx.listener();
        listener.set_position(0.0, 0.0, 0.0);
        listener.set_orientation(0.0, 0.0, -1.0, 0.0, 1.0, 0.0);
        Ok(())
    }

    fn create_source(
        &mut self,
        base_frequency: f32,
        timbre: Timbre,
    ) -> Result<WebSourceHandle, SonarError> {
        let err = |e: JsValue| SonarError::source(format!("{:?}", e));
        let osc = web::OscillatorNode::new(&self.ctx).map_err(err)?;
        osc.set_type(oscillator_type(timbre));
        osc.frequency().set_value(base_frequency);

        let gain = web::GainNode::new(&self.ctx).map_err(err)?;
        gain.gain().set_value(0.0);

        let panner = web::PannerNode::new(&self.ctx).map_err(err)?;
        panner.set_panning_model(web::PanningModelType::Hrtf);
        panner.set_distance_model(web::DistanceModelType::Inverse);
        panner.set_ref_distance(1.0);
        panner.set_max_distance(10_000.0);
        panner.set_rolloff_factor(1.0);

        osc.connect_with_audio_node(&gain).map_err(err)?;
        gain.connect_with_audio_node(&panner).map_err(err)?;
        panner
            .connect_with_audio_node(&self.ctx.destination())
            .map_err(err)?;

        Ok(WebSourceHandle {
            ctx: self.ctx.clone(),
            osc,
            gain,
            panner,
            started: false,
        })
    }

    fn current_time(&self) -> f64 {
        self.ctx.current_time()
    }
}

/// Oscillator -> gain -> HRTF panner -> destination.
pub struct WebSourceHandle {
    ctx: web::AudioContext,
    osc: web::OscillatorNode,
    gain: web::GainNode,
    panner: web::PannerNode,
    started: bool,
}

impl SourceHandle for WebSourceHandle {
    fn set_frequency(&mut self, hz: f32) {
        let now = self.ctx.current_time();
        log_err(self.osc.frequency().set_value_at_time(hz, now), "frequency");
    }

    fn set_gain(&mut self, level: f32, at: Option<f64>) {
        let t = at.unwrap_or_else(|| self.ctx.current_time());
        log_err(self.gain.gain().set_value_at_time(level, t), "gain");
    }

    fn set_position(&mut self, position: Vec3, at: Option<f64>) {
        let t = at.unwrap_or_else(|| self.ctx.current_time() + POSITION_GLIDE_SEC);
        log_err(
            self.panner.position_x().linear_ramp_to_value_at_time(position.x, t),
            "position x",
        );
        log_err(
            self.panner.position_y().linear_ramp_to_value_at_time(position.y, t),
            "position y",
        );
        log_err(
            self.panner.position_z().linear_ramp_to_value_at_time(position.z, t),
            "position z",
        );
    }

    fn set_timbre(&mut self, timbre: Timbre) {
        self.osc.set_type(oscillator_type(timbre));
    }

    fn start(&mut self) {
        if !self.started {
            log_err(self.osc.start(), "oscillator start");
            self.started = true;
        }
    }

    fn stop(&mut self) {
        self.set_gain(0.0, None);
    }

    fn cancel_scheduled(&mut self, from: f64) {
        log_err(self.gain.gain().cancel_scheduled_values(from), "cancel gain");
    }

    fn disconnect(self) {
        if self.started {
            log_err(self.osc.stop(), "oscillator stop");
        }
        log_err(self.osc.disconnect(), "oscillator disconnect");
        log_err(self.gain.disconnect(), "gain disconnect");
        log_err(self.panner.disconnect(), "panner disconnect");
    }
}

/// `navigator.vibrate`, where the browser has it.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHaptics;

impl Haptics for BrowserHaptics {
    fn vibrate(&mut self, duration_ms: u32) {
        if let Some(w) = web::window() {
            // false just means no vibration motor or permission
            let _ = w.navigator().vibrate_with_duration(duration_ms);
        }
    }
}
