//! Chordsmith: chord and progression generator with a small music theory engine.

pub mod ai;
pub mod audio;
pub mod config;
pub mod export;
pub mod output;
pub mod service;
pub mod theory;
