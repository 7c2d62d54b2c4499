//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive the session timers, the audio
//! worker, keyboard controls, directory scanning and playlist persistence.

mod load;
mod schema;

pub use schema::*;
