// Recording fakes for the device seams.
#![allow(dead_code)]

use glam::Vec3;
use sonar_core::{AudioDevice, Haptics, Result, SonarError, SourceHandle, Timbre};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Listener,
    Create { handle: usize, hz: f32, timbre: Timbre },
    Frequency { handle: usize, hz: f32 },
    Gain { handle: usize, level: f32, at: Option<f64> },
    Position { handle: usize, position: Vec3 },
    Timbre { handle: usize, timbre: Timbre },
    Start(usize),
    Stop(usize),
    Disconnect(usize),
    Cancel { handle: usize, from: f64 },
}

impl Call {
    pub fn handle(&self) -> Option<usize> {
        match self {
            Call::Listener => None,
            Call::Create { handle, .. }
            | Call::Frequency { handle, .. }
            | Call::Gain { handle, .. }
            | Call::Position { handle, .. }
            | Call::Timbre { handle, .. } => Some(*handle),
            Call::Start(h) | Call::Stop(h) | Call::Disconnect(h) => Some(*h),
            Call::Cancel { handle, .. } => Some(*handle),
        }
    }
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub struct FakeHandle {
    id: usize,
    log: CallLog,
}

impl SourceHandle for FakeHandle {
    fn set_frequency(&mut self, hz: f32) {
        self.log.borrow_mut().push(Call::Frequency { handle: self.id, hz });
    }
    fn set_gain(&mut self, level: f32, at: Option<f64>) {
        self.log.borrow_mut().push(Call::Gain {
            handle: self.id,
            level,
            at,
        });
    }
    fn set_position(&mut self, position: Vec3, _at: Option<f64>) {
        self.log.borrow_mut().push(Call::Position {
            handle: self.id,
            position,
        });
    }
    fn set_timbre(&mut self, timbre: Timbre) {
        self.log.borrow_mut().push(Call::Timbre {
            handle: self.id,
            timbre,
        });
    }
    fn start(&mut self) {
        self.log.borrow_mut().push(Call::Start(self.id));
    }
    fn stop(&mut self) {
        self.log.borrow_mut().push(Call::Stop(self.id));
    }
    fn cancel_scheduled(&mut self, from: f64) {
        self.log.borrow_mut().push(Call::Cancel {
            handle: self.id,
            from,
        });
    }
    fn disconnect(self) {
        self.log.borrow_mut().push(Call::Disconnect(self.id));
    }
}

#[derive(Default)]
pub struct FakeDevice {
    pub log: CallLog,
    pub time: Rc<Cell<f64>>,
    pub fail_listener: bool,
    /// Fail the n-th `create_source` call (0-based).
    pub fail_create_at: Option<usize>,
    created: usize,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_listener() -> Self {
        Self {
            fail_listener: true,
            ..Self::default()
        }
    }

    /// Refuse the n-th `create_source` call (0-based).
    pub fn failing_create_at(n: usize) -> Self {
        Self {
            fail_create_at: Some(n),
            ..Self::default()
        }
    }
}

impl AudioDevice for FakeDevice {
    type Handle = FakeHandle;

    fn init_listener(&mut self) -> Result<()> {
        if self.fail_listener {
            return Err(SonarError::listener("no listener"));
        }
        self.log.borrow_mut().push(Call::Listener);
        Ok(())
    }

    fn create_source(&mut self, base_frequency: f32, timbre: Timbre) -> Result<FakeHandle> {
        let id = self.created;
        self.created += 1;
        if self.fail_create_at == Some(id) {
            return Err(SonarError::source("oscillator refused"));
        }
        self.log.borrow_mut().push(Call::Create {
            handle: id,
            hz: base_frequency,
            timbre,
        });
        Ok(FakeHandle {
            id,
            log: self.log.clone(),
        })
    }

    fn current_time(&self) -> f64 {
        self.time.get()
    }
}

#[derive(Clone, Default)]
pub struct FakeHaptics {
    pub pulses: Rc<RefCell<Vec<u32>>>,
}

impl Haptics for FakeHaptics {
    fn vibrate(&mut self, duration_ms: u32) {
        self.pulses.borrow_mut().push(duration_ms);
    }
}

// ---------------- Log queries ----------------

pub fn calls_for(log: &CallLog, handle: usize) -> Vec<Call> {
    log.borrow()
        .iter()
        .filter(|c| c.handle() == Some(handle))
        .cloned()
        .collect()
}

pub fn gains_for(log: &CallLog, handle: usize) -> Vec<(f32, Option<f64>)> {
    calls_for(log, handle)
        .into_iter()
        .filter_map(|c| match c {
            Call::Gain { level, at, .. } => Some((level, at)),
            _ => None,
        })
        .collect()
}

pub fn last_gain(log: &CallLog, handle: usize) -> Option<f32> {
    gains_for(log, handle).last().map(|(g, _)| *g)
}

pub fn frequencies_for(log: &CallLog, handle: usize) -> Vec<f32> {
    calls_for(log, handle)
        .into_iter()
        .filter_map(|c| match c {
            Call::Frequency { hz, .. } => Some(hz),
            _ => None,
        })
        .collect()
}

pub fn is_disconnected(log: &CallLog, handle: usize) -> bool {
    log.borrow().contains(&Call::Disconnect(handle))
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
