//! Command and Batch - the units of work flowing through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single timestamped input line
///
/// Created by the batcher for every non-marker line; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Arrival time, seconds since the Unix epoch
    pub timestamp: i64,

    /// The raw line text (newline stripped)
    pub payload: String,
}

impl Command {
    /// Create a new command
    pub fn new(timestamp: i64, payload: impl Into<String>) -> Self {
        Self {
            timestamp,
            payload: payload.into(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.timestamp, self.payload)
    }
}

/// An ordered group of commands delivered to consumers as one unit
///
/// Insertion order is arrival order. Once formed by the batcher a batch is
/// immutable; the registry hands each subscriber its own clone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch from an already-ordered command sequence
    pub fn from_commands(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Append a command, preserving arrival order
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Number of commands in the batch
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the batch holds no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands in arrival order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Iterate over commands in arrival order
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    /// Iterate over the payload text of each command
    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.payload.as_str())
    }

    /// Timestamp of the first command, if any
    pub fn first_timestamp(&self) -> Option<i64> {
        self.commands.first().map(|c| c.timestamp)
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            write!(f, " {command}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
