//! Dancing Fountain library - audio-reactive particle fountain simulation

pub mod audio;
pub mod cli;
pub mod error;
pub mod features;
pub mod fountain;
pub mod frame;
pub mod params;
pub mod snapshot;

pub use error::{Error, Result};
