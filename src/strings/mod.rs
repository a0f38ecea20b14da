//! # Strings Module
//!
//! Centralizes log lines and user-facing reply text.
//! Ensures consistency in messaging and easier updates.

pub mod logs;
pub mod messages;
