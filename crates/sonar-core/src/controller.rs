//! Owner of the canonical simulation state and of every device handle.
//!
//! All entry points run synchronously to completion: a dispatch that appends
//! a source also creates and primes its handle before returning, so no caller
//! ever observes a source without a channel once audio is running.

use fnv::FnvHashMap;
use smallvec::SmallVec;

use crate::beep::{BeepPlan, Channel, ProximityBeep, TaskKind};
use crate::config::{ControllerConfig, SourceMode};
use crate::constants::NEAREST_BASE_FREQUENCY_HZ;
use crate::device::{AudioDevice, Haptics, NoHaptics, SourceHandle};
use crate::error::Result;
use crate::mapping::{nearest_cue, source_target, AudioTarget};
use crate::pipeline::{Context, Pipeline};
use crate::scheduler::TaskScheduler;
use crate::state::{Action, NearestObject, SimulationState, SoundSource, SourceId, Timbre};
use glam::Vec2;

struct SourceChannel<H> {
    handle: H,
    beep: ProximityBeep,
    /// Last continuous target pushed, to skip redundant writes.
    target: Option<AudioTarget>,
}

struct NearestChannel<H> {
    handle: H,
    beep: ProximityBeep,
    timbre: Timbre,
}

pub struct SimulationController<D: AudioDevice, P: Haptics = NoHaptics> {
    state: SimulationState,
    pipeline: Pipeline,
    config: ControllerConfig,
    device: D,
    haptics: P,
    scheduler: TaskScheduler<TaskKind>,
    channels: FnvHashMap<SourceId, SourceChannel<D::Handle>>,
    nearest: Option<NearestChannel<D::Handle>>,
    dragging: Option<SourceId>,
    /// Host clock (ms) as of the last `tick`.
    now_ms: f64,
}

impl<D: AudioDevice> SimulationController<D, NoHaptics> {
    pub fn new(device: D, config: ControllerConfig) -> Self {
        Self::with_haptics(device, NoHaptics, config)
    }
}

impl<D: AudioDevice, P: Haptics> SimulationController<D, P> {
    pub fn with_haptics(device: D, haptics: P, mut config: ControllerConfig) -> Self {
        config.sonification = config.sonification.sanitized();
        Self {
            state: SimulationState::default(),
            pipeline: Pipeline::standard(),
            config,
            device,
            haptics,
            scheduler: TaskScheduler::new(),
            channels: FnvHashMap::default(),
            nearest: None,
            dragging: None,
            now_ms: 0.0,
        }
    }

    /// Replace the stage list, e.g. to add a stage for a new action.
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    // ---------------- Accessors ----------------

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn sources(&self) -> &[SoundSource] {
        &self.state.sources
    }

    pub fn audio_started(&self) -> bool {
        self.state.audio_started
    }

    pub fn nearest_object(&self) -> Option<&NearestObject> {
        self.state.nearest_object.as_ref()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn haptics(&self) -> &P {
        &self.haptics
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn dragging(&self) -> Option<SourceId> {
        self.dragging
    }

    /// Continuous target last pushed to a source's handle.
    pub fn target(&self, id: SourceId) -> Option<AudioTarget> {
        self.channels.get(&id).and_then(|c| c.target)
    }

    pub fn beep_plan(&self, channel: Channel) -> Option<BeepPlan> {
        match channel {
            Channel::Source(id) => self.channels.get(&id).and_then(|c| c.beep.plan().copied()),
            Channel::Nearest => self.nearest.as_ref().and_then(|n| n.beep.plan().copied()),
        }
    }

    pub fn is_beeping(&self, channel: Channel) -> bool {
        self.beep_plan(channel).is_some()
    }

    // ---------------- Lifecycle ----------------

    /// Initialise the listener and build every channel. Idempotent.
    ///
    /// A device failure is returned once and leaves audio stopped with no
    /// handles held; the controller does not retry on its own.
    pub fn start_audio(&mut self) -> Result<()> {
        if self.state.audio_started {
            return Ok(());
        }
        self.device.init_listener()?;

        let mut nearest_handle = self
            .device
            .create_source(NEAREST_BASE_FREQUENCY_HZ, Timbre::Sine)?;
        nearest_handle.set_gain(0.0, None);
        nearest_handle.start();

        let mut created: Vec<(SourceId, D::Handle)> = Vec::with_capacity(self.state.sources.len());
        for source in &self.state.sources {
            match self.device.create_source(source.base_frequency, source.timbre) {
                Ok(handle) => created.push((source.id, handle)),
                Err(e) => {
                    log::error!("[audio] start aborted: {}", e);
                    for (_, handle) in created {
                        handle.disconnect();
                    }
                    nearest_handle.disconnect();
                    return Err(e);
                }
            }
        }

        self.nearest = Some(NearestChannel {
            handle: nearest_handle,
            beep: ProximityBeep::new(Channel::Nearest),
            timbre: Timbre::Sine,
        });
        for (id, mut handle) in created {
            handle.set_gain(0.0, None);
            handle.start();
            self.channels.insert(id, new_channel(id, handle));
        }
        self.state = SimulationState {
            audio_started: true,
            ..std::mem::take(&mut self.state)
        };
        log::info!(
            "[audio] started with {} source(s)",
            self.state.sources.len()
        );
        self.sync_sources();
        self.sync_nearest();
        Ok(())
    }

    /// Cancel every timer and release every handle. Sources are kept; a later
    /// `start_audio` rebuilds their channels.
    pub fn shutdown(&mut self) {
        if !self.state.audio_started {
            return;
        }
        let ids: SmallVec<[SourceId; 8]> = self.channels.keys().copied().collect();
        for id in ids {
            self.release_channel(id);
        }
        if let Some(mut nearest) = self.nearest.take() {
            nearest.beep.stop(&mut self.scheduler);
            nearest.handle.cancel_scheduled(self.device.current_time());
            nearest.handle.set_gain(0.0, None);
            nearest.handle.disconnect();
        }
        self.scheduler.clear();
        self.dragging = None;
        self.state = SimulationState {
            audio_started: false,
            ..std::mem::take(&mut self.state)
        };
        log::info!("[audio] shut down");
    }

    // ---------------- Actions ----------------

    /// Run `action` through the pipeline and push whatever changed to the
    /// device.
    pub fn dispatch(&mut self, action: Action) {
        let prev_sources = self.state.sources.clone();
        let prev_nearest = self.state.nearest_object.clone();
        let ctx = self.pipeline.run(Context {
            state: std::mem::take(&mut self.state),
            action,
        });
        self.state = ctx.state;

        if self.dragging.is_some_and(|id| self.state.source(id).is_none()) {
            self.dragging = None;
        }
        if !self.state.audio_started {
            return;
        }
        if self.state.sources != prev_sources {
            self.sync_sources();
        }
        if self.state.nearest_object != prev_nearest {
            self.sync_nearest();
        }
    }

    pub fn add_source(&mut self) {
        self.dispatch(Action::AddSource);
    }

    pub fn remove_last_source(&mut self) {
        self.dispatch(Action::RemoveLastSource);
    }

    pub fn move_source(&mut self, id: SourceId, position: Vec2) {
        self.dispatch(Action::move_source(id, position));
    }

    pub fn set_nearest_object(&mut self, object: Option<NearestObject>) {
        self.dispatch(Action::UpdateNearestObject(object));
    }

    /// A drag holds the source on its continuous tone so the user hears it
    /// move; beeping resumes at `end_drag`.
    pub fn begin_drag(&mut self, id: SourceId) {
        if self.state.source(id).is_none() {
            return;
        }
        self.dragging = Some(id);
        log::debug!("[drag] begin {}", id);
        if self.state.audio_started {
            self.sync_sources();
        }
    }

    pub fn end_drag(&mut self) {
        let Some(id) = self.dragging.take() else {
            return;
        };
        log::debug!("[drag] end {}", id);
        if self.state.audio_started {
            self.sync_sources();
        }
    }

    /// Advance the host clock and fire every task due by `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
        if self.scheduler.is_empty() {
            return;
        }
        let audio_now = self.device.current_time();
        for fired in self.scheduler.advance(now_ms) {
            match fired.payload {
                TaskKind::Beep(Channel::Source(id)) => {
                    if let Some(ch) = self.channels.get_mut(&id) {
                        ch.beep.on_tick(
                            &mut ch.handle,
                            &mut self.haptics,
                            audio_now,
                            now_ms,
                            &mut self.scheduler,
                        );
                    }
                }
                TaskKind::Beep(Channel::Nearest) => {
                    if let Some(n) = self.nearest.as_mut() {
                        n.beep.on_tick(
                            &mut n.handle,
                            &mut self.haptics,
                            audio_now,
                            now_ms,
                            &mut self.scheduler,
                        );
                    }
                }
                TaskKind::Release(Channel::Source(id)) => {
                    if let Some(ch) = self.channels.get_mut(&id) {
                        ch.beep.on_release(&mut ch.handle, fired.token);
                    }
                }
                TaskKind::Release(Channel::Nearest) => {
                    if let Some(n) = self.nearest.as_mut() {
                        n.beep.on_release(&mut n.handle, fired.token);
                    }
                }
            }
        }
    }

    // ---------------- Device sync ----------------

    fn release_channel(&mut self, id: SourceId) {
        let Some(mut ch) = self.channels.remove(&id) else {
            return;
        };
        ch.beep.stop(&mut self.scheduler);
        self.scheduler
            .cancel_where(|kind| kind.channel() == Channel::Source(id));
        ch.handle.cancel_scheduled(self.device.current_time());
        ch.handle.set_gain(0.0, None);
        ch.handle.stop();
        ch.handle.disconnect();
        log::info!("[audio] released {}", id);
    }

    /// Bring the channel map in line with `state.sources` and push targets.
    fn sync_sources(&mut self) {
        let stale: SmallVec<[SourceId; 4]> = self
            .channels
            .keys()
            .filter(|id| self.state.source(**id).is_none())
            .copied()
            .collect();
        for id in stale {
            self.release_channel(id);
        }

        for source in &self.state.sources {
            if self.channels.contains_key(&source.id) {
                continue;
            }
            match self.device.create_source(source.base_frequency, source.timbre) {
                Ok(mut handle) => {
                    handle.set_gain(0.0, None);
                    handle.start();
                    self.channels.insert(source.id, new_channel(source.id, handle));
                    log::info!(
                        "[audio] created {} ({} Hz, {})",
                        source.id,
                        source.base_frequency,
                        source.timbre
                    );
                }
                // Retried on the next source change.
                Err(e) => log::warn!("[audio] {} has no channel: {}", source.id, e),
            }
        }

        let mode = self.config.source_mode;
        let audio_now = self.device.current_time();
        for source in &self.state.sources {
            let Some(ch) = self.channels.get_mut(&source.id) else {
                continue;
            };
            let target = source_target(source);
            if ch.target != Some(target) {
                ch.handle.set_position(target.position, None);
                if mode == SourceMode::Continuous {
                    ch.handle.set_frequency(target.frequency);
                }
            }
            let held = self.dragging == Some(source.id);
            match mode {
                SourceMode::Continuous => {
                    if ch.target != Some(target) {
                        ch.handle.set_gain(target.gain, None);
                    }
                }
                SourceMode::Beeping if held => {
                    if ch.beep.is_beeping() {
                        ch.beep.stop(&mut self.scheduler);
                        ch.handle.cancel_scheduled(audio_now);
                    }
                    ch.handle.set_frequency(target.frequency);
                    ch.handle.set_gain(target.gain, None);
                }
                SourceMode::Beeping => {
                    let plan = BeepPlan::proximity(source.base_frequency, source.normalized_distance);
                    let restarted = ch.beep.retarget(plan, self.now_ms, &mut self.scheduler);
                    if plan.is_none() || restarted {
                        ch.handle.cancel_scheduled(audio_now);
                        ch.handle.set_gain(0.0, None);
                    }
                }
            }
            ch.target = Some(target);
            log::debug!(
                "[audio] {} -> gain {:.3} pos ({:.2}, {:.2})",
                source.id,
                target.gain,
                target.position.x,
                target.position.z
            );
        }
    }

    fn sync_nearest(&mut self) {
        let audio_now = self.device.current_time();
        let Some(n) = self.nearest.as_mut() else {
            return;
        };
        let opts = &self.config.sonification;
        match &self.state.nearest_object {
            None => {
                n.beep.stop(&mut self.scheduler);
                n.handle.cancel_scheduled(audio_now);
                n.handle.set_gain(0.0, None);
            }
            Some(object) => {
                let cue = nearest_cue(object, opts);
                n.handle.set_frequency(cue.frequency);
                n.handle.set_position(cue.position, None);
                if cue.timbre != n.timbre {
                    n.handle.set_timbre(cue.timbre);
                    n.timbre = cue.timbre;
                }
                let plan = BeepPlan::nearest(&cue, opts);
                let restarted = n.beep.retarget(plan, self.now_ms, &mut self.scheduler);
                if plan.is_none() || restarted {
                    n.handle.cancel_scheduled(audio_now);
                    n.handle.set_gain(0.0, None);
                }
            }
        }
    }
}

fn new_channel<H>(id: SourceId, handle: H) -> SourceChannel<H> {
    SourceChannel {
        handle,
        beep: ProximityBeep::new(Channel::Source(id)),
        target: None,
    }
}
