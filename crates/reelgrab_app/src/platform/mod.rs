//! Terminal front end: parses flags, drives the controller state machine and
//! executes its effects.
mod app;
pub mod cli;
mod effects;
mod render;

pub use app::{run_app, EXIT_FATAL};
