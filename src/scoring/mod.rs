//! Cricket scoring engine - innings FSM and over accumulation.
//!
//! This module provides the core engine:
//! - Typestate innings FSM with four phases and guarded transitions
//! - Pure over accumulation and derived figures
//! - Event generation and display-layer views

// Submodules
pub mod constants;
pub mod entities;
pub mod functional;
pub mod state_machine;
pub mod states;

pub use state_machine::{
    Innings, InningsData, InningsError, InningsEvent, InningsProjection, InningsState,
};
pub use states::CompletionReason;
