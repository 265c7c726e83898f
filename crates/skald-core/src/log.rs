//! Typed log records and the shared sink they flow through
//!
//! The interpreter and stores never print: `$log` output and runtime
//! diagnostics are pushed as `LogLine` records into a `LogSink`, and the
//! driver drains the sink once per frame and decides how to render it.
//! The sink is a cloneable `Rc` handle, which also pins the whole
//! subsystem to a single thread.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Display color of a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogColor {
    White,
    Green,
    Red,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl LogColor {
    /// Parse a color name as it appears in `$log.<color>` instructions
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "white" => Some(Self::White),
            "green" => Some(Self::Green),
            "red" => Some(Self::Red),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "magenta" => Some(Self::Magenta),
            "cyan" => Some(Self::Cyan),
            _ => None,
        }
    }

    /// Color name as written in instruction text
    pub fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Green => "green",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
        }
    }
}

impl fmt::Display for LogColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One emitted log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub color: LogColor,
    pub text: String,
}

impl LogLine {
    pub fn new(color: LogColor, text: impl Into<String>) -> Self {
        Self {
            color,
            text: text.into(),
        }
    }
}

/// Cloneable handle to the session's log buffer
///
/// Warnings are yellow, errors red, by convention. `drain` hands the
/// buffered lines to the caller and empties the buffer.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    lines: Rc<RefCell<Vec<LogLine>>>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line in the given color
    pub fn push(&self, color: LogColor, text: impl Into<String>) {
        self.lines.borrow_mut().push(LogLine::new(color, text));
    }

    /// Append a warning (yellow)
    pub fn warn(&self, text: impl Into<String>) {
        self.push(LogColor::Yellow, text);
    }

    /// Append an error (red)
    pub fn error(&self, text: impl Into<String>) {
        self.push(LogColor::Red, text);
    }

    /// Number of buffered lines
    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Take every buffered line, emptying the buffer
    pub fn drain(&self) -> Vec<LogLine> {
        self.lines.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_names_round_trip() {
        for color in [
            LogColor::White,
            LogColor::Green,
            LogColor::Red,
            LogColor::Yellow,
            LogColor::Blue,
            LogColor::Magenta,
            LogColor::Cyan,
        ] {
            assert_eq!(LogColor::from_name(color.name()), Some(color));
        }
        assert_eq!(LogColor::from_name("plaid"), None);
    }

    #[test]
    fn test_sink_shares_buffer_across_clones() {
        let sink = LogSink::new();
        let clone = sink.clone();
        clone.push(LogColor::Green, "hello");
        sink.warn("careful");

        let lines = sink.drain();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "hello");
        assert_eq!(lines[1].color, LogColor::Yellow);
        assert!(clone.is_empty());
    }
}
