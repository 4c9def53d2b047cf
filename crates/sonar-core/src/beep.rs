//! Proximity beeps: a two-state (idle/beeping) timer per channel.

use crate::config::SonificationOptions;
use crate::constants::{BEEP_ATTACK_SEC, PROXIMITY_DECAY_SEC};
use crate::device::{Haptics, SourceHandle};
use crate::mapping::{
    in_proximity_band, proximity_frequency, proximity_gain, proximity_interval_ms, NearestCue,
};
use crate::scheduler::{CancelToken, TaskScheduler};
use crate::state::SourceId;

/// Owner of a device handle and its timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Source(SourceId),
    Nearest,
}

/// Scheduler payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Periodic beep trigger.
    Beep(Channel),
    /// One-shot end of a beep envelope.
    Release(Channel),
}

impl TaskKind {
    #[inline]
    pub fn channel(self) -> Channel {
        match self {
            TaskKind::Beep(c) | TaskKind::Release(c) => c,
        }
    }
}

/// How a beep returns to silence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// Zero written ahead on the device timeline.
    Timeline,
    /// Zero written by a one-shot scheduler task.
    Callback,
}

/// Cadence and envelope for one distance value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeepPlan {
    pub period_ms: f64,
    pub gain: f32,
    /// Pitch to set on every beep, if the plan owns the pitch.
    pub frequency: Option<f32>,
    pub decay_sec: f64,
    pub release: Release,
    pub haptic: bool,
}

impl BeepPlan {
    /// Standalone per-source beep; `None` outside the audible band.
    pub fn proximity(base_frequency: f32, normalized_distance: f32) -> Option<Self> {
        if !in_proximity_band(normalized_distance) {
            return None;
        }
        Some(Self {
            period_ms: proximity_interval_ms(normalized_distance),
            gain: proximity_gain(normalized_distance),
            frequency: Some(proximity_frequency(base_frequency, normalized_distance)),
            decay_sec: PROXIMITY_DECAY_SEC,
            release: Release::Timeline,
            haptic: false,
        })
    }

    /// Nearest-object beep; `None` when the object is out of range.
    pub fn nearest(cue: &NearestCue, opts: &SonificationOptions) -> Option<Self> {
        if !cue.audible {
            return None;
        }
        Some(Self {
            period_ms: cue.period_ms,
            gain: cue.gain,
            frequency: None,
            decay_sec: opts.beep_duration,
            release: Release::Callback,
            haptic: opts.haptic_enabled,
        })
    }

    #[inline]
    pub fn decay_ms(&self) -> f64 {
        self.decay_sec * 1000.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BeepState {
    Idle,
    Beeping { token: CancelToken, plan: BeepPlan },
}

#[derive(Debug)]
pub struct ProximityBeep {
    channel: Channel,
    state: BeepState,
    pending_release: Option<CancelToken>,
}

impl ProximityBeep {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            state: BeepState::Idle,
            pending_release: None,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn state(&self) -> BeepState {
        self.state
    }

    pub fn is_beeping(&self) -> bool {
        matches!(self.state, BeepState::Beeping { .. })
    }

    pub fn plan(&self) -> Option<&BeepPlan> {
        match &self.state {
            BeepState::Beeping { plan, .. } => Some(plan),
            BeepState::Idle => None,
        }
    }

    /// Move to the cadence for a new distance.
    ///
    /// A changed plan always cancels the running timer and starts a fresh
    /// one; an identical plan leaves the timer alone. Returns whether a
    /// timer was (re)started.
    pub fn retarget(
        &mut self,
        plan: Option<BeepPlan>,
        now_ms: f64,
        scheduler: &mut TaskScheduler<TaskKind>,
    ) -> bool {
        match (self.state, plan) {
            // Past distance 1 gain and tempo are floored, so distinct distances
            // can share a plan; the running timer is kept on purpose then.
            (BeepState::Beeping { plan: current, .. }, Some(next)) if current == next => false,
            (_, None) => {
                self.stop(scheduler);
                false
            }
            (state, Some(next)) => {
                if let BeepState::Beeping { token, .. } = state {
                    scheduler.cancel(token);
                }
                let token =
                    scheduler.schedule_repeating(now_ms, next.period_ms, TaskKind::Beep(self.channel));
                log::debug!(
                    "[beep] {:?} every {:.0} ms at gain {:.3}",
                    self.channel,
                    next.period_ms,
                    next.gain
                );
                self.state = BeepState::Beeping { token, plan: next };
                true
            }
        }
    }

    /// Back to idle; cancels the periodic timer and any pending release.
    pub fn stop(&mut self, scheduler: &mut TaskScheduler<TaskKind>) {
        if let BeepState::Beeping { token, .. } = self.state {
            scheduler.cancel(token);
            log::debug!("[beep] {:?} idle", self.channel);
        }
        if let Some(token) = self.pending_release.take() {
            scheduler.cancel(token);
        }
        self.state = BeepState::Idle;
    }

    /// Play one beep envelope on `handle`.
    pub fn on_tick<H: SourceHandle>(
        &mut self,
        handle: &mut H,
        haptics: &mut dyn Haptics,
        audio_now: f64,
        now_ms: f64,
        scheduler: &mut TaskScheduler<TaskKind>,
    ) {
        let BeepState::Beeping { plan, .. } = self.state else {
            return;
        };
        if let Some(hz) = plan.frequency {
            handle.set_frequency(hz);
        }
        handle.set_gain(0.0, Some(audio_now));
        handle.set_gain(plan.gain, Some(audio_now + BEEP_ATTACK_SEC));
        match plan.release {
            Release::Timeline => handle.set_gain(0.0, Some(audio_now + plan.decay_sec)),
            Release::Callback => {
                if let Some(token) = self.pending_release.take() {
                    scheduler.cancel(token);
                }
                self.pending_release = Some(scheduler.schedule_once(
                    now_ms,
                    plan.decay_ms(),
                    TaskKind::Release(self.channel),
                ));
            }
        }
        if plan.haptic {
            haptics.vibrate(plan.decay_ms().round() as u32);
        }
    }

    /// End of a callback-released envelope. A release superseded by a later
    /// beep in the same batch is ignored.
    pub fn on_release<H: SourceHandle>(&mut self, handle: &mut H, token: CancelToken) {
        if self.pending_release != Some(token) {
            return;
        }
        self.pending_release = None;
        handle.set_gain(0.0, None);
    }
}
