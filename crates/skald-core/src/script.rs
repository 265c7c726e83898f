//! Instruction streams and the registry that owns them
//!
//! A `Script` is the parsed form of one content-file stream: the raw text
//! of each retained line plus its typed command (or a marker for lines
//! that did not parse). Streams are immutable once loaded; the registry
//! hands out shared line-list handles so a stream can sit on the call
//! stack more than once without copying.

use crate::command::Command;
use crate::error::{Error, Result};
use crate::ids::ScriptId;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::rc::Rc;

/// What one retained instruction line parsed into
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// A recognized instruction
    Command(Command),
    /// No recognized sigil; executes as an advance-only no-op
    Unrecognized,
    /// Recognized sigil but malformed body; logged when reached
    Malformed { reason: String },
}

/// One retained line of an instruction stream
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    /// Raw text as written in the content file, for diagnostics
    pub raw: String,
    pub kind: LineKind,
}

impl ScriptLine {
    pub fn new(raw: impl Into<String>, kind: LineKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
        }
    }

    /// Shorthand for a parsed command line
    pub fn command(raw: impl Into<String>, command: Command) -> Self {
        Self::new(raw, LineKind::Command(command))
    }
}

/// A loaded instruction stream
#[derive(Debug, Clone)]
pub struct Script {
    pub id: ScriptId,
    /// Run this stream automatically at session start
    pub autorun: bool,
    lines: Rc<[ScriptLine]>,
}

impl Script {
    pub fn new(id: ScriptId, autorun: bool, lines: Vec<ScriptLine>) -> Self {
        Self {
            id,
            autorun,
            lines: lines.into(),
        }
    }

    /// Shared handle to the line list
    pub fn lines(&self) -> Rc<[ScriptLine]> {
        Rc::clone(&self.lines)
    }

    /// Number of retained lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True for a stream with no retained lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// All loaded streams plus first-run bookkeeping
///
/// The stream table is immutable after loading; only the executed set
/// changes at runtime. `$call.script` and plain invocation mark a stream
/// executed, `$recall.script` does not.
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: IndexMap<ScriptId, Script>,
    executed: HashSet<ScriptId>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream; rejects duplicate ids
    pub fn insert(&mut self, script: Script) -> Result<()> {
        if self.scripts.contains_key(&script.id) {
            return Err(Error::DuplicateScript(script.id));
        }
        self.scripts.insert(script.id, script);
        Ok(())
    }

    pub fn get(&self, id: ScriptId) -> Option<&Script> {
        self.scripts.get(&id)
    }

    /// Shared line-list handle for a stream, if registered
    pub fn lines(&self, id: ScriptId) -> Option<Rc<[ScriptLine]>> {
        self.scripts.get(&id).map(Script::lines)
    }

    pub fn contains(&self, id: ScriptId) -> bool {
        self.scripts.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Ids of autorun streams, in load order
    pub fn autorun_ids(&self) -> Vec<ScriptId> {
        self.scripts
            .values()
            .filter(|s| s.autorun)
            .map(|s| s.id)
            .collect()
    }

    /// Record that a stream has had its first run
    pub fn mark_executed(&mut self, id: ScriptId) {
        self.executed.insert(id);
    }

    pub fn was_executed(&self, id: ScriptId) -> bool {
        self.executed.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::log::LogColor;

    fn log_line(text: &str) -> ScriptLine {
        ScriptLine::command(
            format!("$log.green(\"{}\")", text),
            Command::Log {
                color: LogColor::Green,
                message: text.to_string(),
            },
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut registry = ScriptRegistry::new();
        registry
            .insert(Script::new(ScriptId(1), false, vec![log_line("hi")]))
            .unwrap();

        assert!(registry.contains(ScriptId(1)));
        assert_eq!(registry.get(ScriptId(1)).unwrap().len(), 1);
        assert!(registry.lines(ScriptId(2)).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = ScriptRegistry::new();
        registry
            .insert(Script::new(ScriptId(1), false, vec![]))
            .unwrap();
        let err = registry.insert(Script::new(ScriptId(1), true, vec![]));
        assert!(matches!(err, Err(Error::DuplicateScript(ScriptId(1)))));
    }

    #[test]
    fn test_autorun_ids_in_load_order() {
        let mut registry = ScriptRegistry::new();
        registry
            .insert(Script::new(ScriptId(5), true, vec![]))
            .unwrap();
        registry
            .insert(Script::new(ScriptId(2), false, vec![]))
            .unwrap();
        registry
            .insert(Script::new(ScriptId(9), true, vec![]))
            .unwrap();

        assert_eq!(registry.autorun_ids(), vec![ScriptId(5), ScriptId(9)]);
    }

    #[test]
    fn test_executed_bookkeeping() {
        let mut registry = ScriptRegistry::new();
        registry
            .insert(Script::new(ScriptId(3), false, vec![]))
            .unwrap();

        assert!(!registry.was_executed(ScriptId(3)));
        registry.mark_executed(ScriptId(3));
        assert!(registry.was_executed(ScriptId(3)));
    }

    #[test]
    fn test_lines_handle_is_shared() {
        let mut registry = ScriptRegistry::new();
        registry
            .insert(Script::new(ScriptId(1), false, vec![log_line("a")]))
            .unwrap();

        let first = registry.lines(ScriptId(1)).unwrap();
        let second = registry.lines(ScriptId(1)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }
}
