//! # Application Layer
//!
//! Contains the core logic and orchestration of the bot.
//! This includes the polling loop, cursor tracking, dispatch to features, and command parsing.

pub mod cursor;
pub mod dispatch;
pub mod logging;
pub mod parsing;
pub mod poller;
