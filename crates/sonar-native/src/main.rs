//! Headless driver: runs a scripted session against a device that only logs
//! the control values it receives.

use glam::{Vec2, Vec3};
use instant::Instant;
use sonar_core::{
    AudioDevice, ControllerConfig, Haptics, NearestObject, Result, SimulationController,
    SourceHandle, SourceId, SourceMode, Timbre,
};
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

/// Device clock shared with every handle; seconds since the session began.
#[derive(Clone)]
struct Clock {
    origin: Instant,
}

impl Clock {
    fn seconds(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

struct LoggingDevice {
    clock: Clock,
    next_handle: u32,
    voices: Rc<Cell<usize>>,
}

struct LoggingHandle {
    index: u32,
    voices: Rc<Cell<usize>>,
}

impl AudioDevice for LoggingDevice {
    type Handle = LoggingHandle;

    fn init_listener(&mut self) -> Result<()> {
        log::info!("[device] listener at origin facing -z");
        Ok(())
    }

    fn create_source(&mut self, frequency: f32, timbre: Timbre) -> Result<LoggingHandle> {
        let index = self.next_handle;
        self.next_handle += 1;
        self.voices.set(self.voices.get() + 1);
        log::info!("[device] voice {} created {:.1}Hz {}", index, frequency, timbre);
        Ok(LoggingHandle {
            index,
            voices: self.voices.clone(),
        })
    }

    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }
}

impl SourceHandle for LoggingHandle {
    fn set_frequency(&mut self, hz: f32) {
        log::debug!("[voice {}] frequency {:.1}Hz", self.index, hz);
    }

    fn set_gain(&mut self, level: f32, at: Option<f64>) {
        match at {
            Some(t) => log::debug!("[voice {}] gain {:.3} at {:.3}s", self.index, level, t),
            None => log::debug!("[voice {}] gain {:.3}", self.index, level),
        }
    }

    fn set_position(&mut self, position: Vec3, at: Option<f64>) {
        log::debug!(
            "[voice {}] position ({:.2},{:.2},{:.2}) by {:?}",
            self.index,
            position.x,
            position.y,
            position.z,
            at
        );
    }

    fn set_timbre(&mut self, timbre: Timbre) {
        log::debug!("[voice {}] timbre {}", self.index, timbre);
    }

    fn start(&mut self) {
        log::debug!("[voice {}] start", self.index);
    }

    fn stop(&mut self) {
        log::debug!("[voice {}] stop", self.index);
    }

    fn cancel_scheduled(&mut self, from: f64) {
        log::debug!("[voice {}] envelope cleared from {:.3}s", self.index, from);
    }

    fn disconnect(self) {
        self.voices.set(self.voices.get().saturating_sub(1));
        log::info!("[device] voice {} released", self.index);
    }
}

struct LoggingHaptics;

impl Haptics for LoggingHaptics {
    fn vibrate(&mut self, duration_ms: u32) {
        log::debug!("[haptics] pulse {}ms", duration_ms);
    }
}

type Controller = SimulationController<LoggingDevice, LoggingHaptics>;

/// Tick the controller at frame rate for `frames` frames, calling `step`
/// with the frame index before each tick.
fn run_frames(
    controller: &mut Controller,
    clock: &Clock,
    frames: u32,
    mut step: impl FnMut(&mut Controller, u32),
) {
    for i in 0..frames {
        step(controller, i);
        controller.tick(clock.seconds() * 1000.0);
        thread::sleep(FRAME);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let query = std::env::args().nth(1).unwrap_or_default();
    let mut config = ControllerConfig::from_query(&query);
    if query.is_empty() {
        config.source_mode = SourceMode::Beeping;
    }
    log::info!("[config] {:?}", config);

    let clock = Clock {
        origin: Instant::now(),
    };
    let voices = Rc::new(Cell::new(0));
    let device = LoggingDevice {
        clock: clock.clone(),
        next_handle: 0,
        voices: voices.clone(),
    };
    let mut controller = SimulationController::with_haptics(device, LoggingHaptics, config);
    controller.start_audio()?;

    for _ in 0..3 {
        controller.add_source();
    }
    for s in controller.sources() {
        log::info!(
            "[scene] {} {} at ({:.2},{:.2}) d={:.2}",
            s.id,
            s.color,
            s.position.x,
            s.position.y,
            s.normalized_distance
        );
    }

    // Sweep the first source across the field towards the listener and back out.
    let sweep = SourceId(0);
    controller.begin_drag(sweep);
    run_frames(&mut controller, &clock, 60, |c, i| {
        let t = i as f32 / 59.0;
        c.move_source(sweep, Vec2::new(0.1 + 0.8 * t, 0.5));
    });
    controller.end_drag();
    if let Some(target) = controller.target(sweep) {
        log::info!(
            "[scene] {} settled at {:.1}Hz gain {:.3}",
            sweep,
            target.frequency,
            target.gain
        );
    }
    run_frames(&mut controller, &clock, 60, |_, _| {});

    // An obstacle approaching from out of range to contact.
    run_frames(&mut controller, &clock, 120, |c, i| {
        let distance = 2.5 - 2.5 * (i as f32 / 119.0);
        let object = NearestObject::new(distance, Vec2::new(0.5, 0.3)).with_kind("person");
        c.set_nearest_object(Some(object));
        if i % 30 == 0 {
            log::info!("[scene] nearest at {:.2}", distance);
        }
    });
    controller.set_nearest_object(None);

    controller.remove_last_source();
    log::info!(
        "[scene] {} source(s), {} pending task(s)",
        controller.sources().len(),
        controller.pending_tasks()
    );
    controller.shutdown();
    log::info!("[scene] done; {} voice(s) still held", voices.get());
    Ok(())
}
