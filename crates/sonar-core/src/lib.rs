//! Core logic for the spatial sonar demo.
//!
//! Everything here is platform-neutral: the web and native front-ends provide
//! an [`AudioDevice`] and drive [`SimulationController::tick`] from their
//! own frame loops.

pub mod beep;
pub mod config;
pub mod constants;
pub mod controller;
pub mod device;
pub mod drag;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod scheduler;
pub mod state;

pub use beep::*;
pub use config::*;
pub use constants::*;
pub use controller::*;
pub use device::*;
pub use drag::*;
pub use error::*;
pub use mapping::*;
pub use pipeline::*;
pub use scheduler::*;
pub use state::*;
