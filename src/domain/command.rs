//! # Commands
//!
//! The structured form of a `!name -option value` instruction embedded in an item body.
//! Produced by `application::parsing::try_parse` and shared read-only by every feature
//! that receives the item.

use std::fmt;

/// A parsed command.
///
/// Option values are `Option<String>`: `None` is a flag-style option given without a value,
/// `Some(String::new())` is an explicitly empty quoted value (`""`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    options: Vec<(String, Option<String>)>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Builder used by tests and the parser alike.
    pub fn with_option(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.set_option(name.into(), value.map(str::to_string));
        self
    }

    /// Sets an option. A repeated name keeps its original position and takes the new value.
    pub(crate) fn set_option(&mut self, name: String, value: Option<String>) {
        match self.options.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.options.push((name, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` if the option was not given, `Some(None)` if it was given without a value.
    pub fn option(&self, name: &str) -> Option<Option<&str>> {
        self.options
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_deref())
    }

    /// Options in the order they first appeared.
    pub fn options(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// True when the command carries no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.name)?;
        for (name, value) in self.options() {
            match value {
                Some(value) => write!(f, " -{} \"{}\"", name, value)?,
                None => write!(f, " -{}", name)?,
            }
        }
        Ok(())
    }
}
