//! Explicit conversion-surface state machine.
//!
//! The conversion core itself is a pure request→result mapping with no
//! ambient state; this machine is what a calling surface (CLI, UI shell)
//! drives to keep its "in progress" bookkeeping honest. Transitions are
//! total: an event that does not apply in the current state is rejected
//! rather than silently swallowed, and an error always returns the machine
//! to an interactive state.
//!
//! Single active conversion at a time is assumed: `Converting` refuses a
//! re-entrant `ConvertRequested`.

use serde::{Deserialize, Serialize};

/// Where the conversion surface currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConverterState {
    /// No file selected.
    #[default]
    Idle,
    /// A file has been ingested; awaiting a convert request.
    FileSelected,
    /// A conversion is in flight. No re-entrant submissions.
    Converting,
    /// A result blob is ready for download.
    Done,
    /// The last conversion failed; the surface stays interactive.
    Failed,
}

/// Discrete events that drive the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    FileChosen,
    ConvertRequested,
    ResultReady,
    ErrorRaised,
    Reset,
}

impl ConverterState {
    /// Apply an event, returning the next state, or `None` when the event
    /// does not apply in the current state.
    pub fn apply(self, event: StateEvent) -> Option<ConverterState> {
        use ConverterState::*;
        use StateEvent::*;
        match (self, event) {
            (Idle, FileChosen) => Some(FileSelected),
            (FileSelected, FileChosen) => Some(FileSelected),
            (FileSelected, ConvertRequested) => Some(Converting),
            (FileSelected, Reset) => Some(Idle),
            (Converting, ResultReady) => Some(Done),
            (Converting, ErrorRaised) => Some(Failed),
            (Done, Reset) => Some(Idle),
            (Done, FileChosen) => Some(FileSelected),
            (Failed, ConvertRequested) => Some(Converting),
            (Failed, FileChosen) => Some(FileSelected),
            (Failed, Reset) => Some(Idle),
            _ => None,
        }
    }

    /// True while a conversion is in flight.
    pub fn is_converting(&self) -> bool {
        matches!(self, ConverterState::Converting)
    }
}
