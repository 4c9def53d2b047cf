//! Ordered stage pipeline turning an [`Action`] into a new state.
//!
//! Each stage recognises one action variant and passes every other context
//! through untouched, so stages compose by plain left-to-right folding and a
//! new action only needs a new stage.

use crate::constants::{SOURCE_COLORS, SOURCE_FREQUENCIES_HZ, SOURCE_TIMBRES};
use crate::drag::apply_drag;
use crate::state::{Action, SimulationState, SoundSource, SourceId};

/// State and the action being applied to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Context {
    pub state: SimulationState,
    pub action: Action,
}

pub type Stage = fn(Context) -> Context;

#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline with every built-in stage in its canonical order.
    pub fn standard() -> Self {
        Self::new()
            .with_stage(add_source)
            .with_stage(remove_last_source)
            .with_stage(move_source)
            .with_stage(update_nearest_object)
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn run(&self, ctx: Context) -> Context {
        self.stages.iter().fold(ctx, |ctx, stage| stage(ctx))
    }
}

// ---------------- Stages ----------------

pub fn add_source(mut ctx: Context) -> Context {
    if !matches!(ctx.action, Action::AddSource) {
        return ctx;
    }
    let idx = ctx.state.sources.len();
    let id = SourceId(ctx.state.next_id);
    ctx.state.next_id += 1;
    ctx.state.sources.push(SoundSource {
        id,
        color: SOURCE_COLORS[idx % SOURCE_COLORS.len()],
        base_frequency: SOURCE_FREQUENCIES_HZ[idx % SOURCE_FREQUENCIES_HZ.len()],
        timbre: SOURCE_TIMBRES[idx % SOURCE_TIMBRES.len()],
        position: SoundSource::listener_position(),
        normalized_distance: 0.0,
    });
    ctx
}

pub fn remove_last_source(mut ctx: Context) -> Context {
    if !matches!(ctx.action, Action::RemoveLastSource) {
        return ctx;
    }
    ctx.state.sources.pop();
    ctx
}

pub fn move_source(mut ctx: Context) -> Context {
    let Action::MoveSource(event) = &ctx.action else {
        return ctx;
    };
    ctx.state.sources = apply_drag(&ctx.state.sources, event);
    ctx
}

pub fn update_nearest_object(mut ctx: Context) -> Context {
    let Action::UpdateNearestObject(object) = &ctx.action else {
        return ctx;
    };
    ctx.state.nearest_object = object.clone();
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: SimulationState, action: Action) -> SimulationState {
        Pipeline::standard().run(Context { state, action }).state
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let ctx = Context {
            state: SimulationState::default(),
            action: Action::AddSource,
        };
        assert_eq!(Pipeline::new().run(ctx.clone()), ctx);
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let s = run(SimulationState::default(), Action::AddSource);
        let s = run(s, Action::RemoveLastSource);
        let s = run(s, Action::AddSource);
        assert_eq!(s.sources[0].id, SourceId(1));
    }

    #[test]
    fn stages_ignore_foreign_actions() {
        let ctx = Context {
            state: SimulationState::default(),
            action: Action::RemoveLastSource,
        };
        assert_eq!(add_source(ctx.clone()), ctx);
        assert_eq!(move_source(ctx.clone()), ctx);
        assert_eq!(update_nearest_object(ctx.clone()), ctx);
    }
}
