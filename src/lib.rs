// Library root
// -----------
// Client for the UnicodeFix cleaning service. The controller is independent
// of any UI toolkit: it drives named elements through the `View` trait and
// talks to the service through `CleaningService`. The binary (`main.rs`)
// hosts it in an interactive terminal front end.
//
// Module responsibilities:
// - `mode`, `input`, `orchestrator`, `presenter`: the four parts of the
//   controller (mode switching, input acquisition, the single-flight
//   request cycle, result display and export).
// - `controller`: owns the view and collaborators and routes UI events.
// - `api`: HTTP client for the two cleaning endpoints.
// - `view`, `prefs`, `clipboard`, `download`: collaborator traits and their
//   concrete implementations.
// - `ui`: the terminal front end.
pub mod api;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod input;
pub mod mode;
pub mod orchestrator;
pub mod prefs;
pub mod presenter;
pub mod ui;
pub mod view;

pub use controller::{Controller, Propagation, UiEvent};
pub use error::{Result, UnicodeFixError, ValidationError};
pub use mode::Mode;
