//! # Interface Layer
//!
//! The bot's user-facing behaviour: features that react to forum items and commands.

pub mod features;
