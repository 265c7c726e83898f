//! The command interpreter: a cooperative state machine over instruction
//! streams
//!
//! Execution is driven entirely by the driver's once-per-frame `tick`.
//! Within a tick the interpreter runs instructions back-to-back until its
//! call stack drains or a `!delay` suspends it; a suspension stores only a
//! wake deadline, because every cursor on the stack already points at its
//! next instruction. `$call.script` pushes a new cursor, so a delay inside
//! a called stream parks the whole stack and the caller resumes after the
//! callee finishes.
//!
//! Nothing here halts a stream: malformed lines, unknown ids, and refused
//! requests are logged and stepped over.

use crate::command::Command;
use crate::ids::ScriptId;
use crate::log::{LogColor, LogSink};
use crate::script::{LineKind, ScriptLine, ScriptRegistry};
use crate::time::Clock;
use crate::world::World;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Runaway guard: instructions executed within a single tick
const MAX_STEPS_PER_TICK: usize = 10_000;

/// Interpreter execution state; `tick` is the only transition trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    /// No stream active
    Idle,
    /// A stream is executing this tick
    Running,
    /// Waiting for the clock to reach the wake deadline
    Suspended { wake: Duration },
}

/// Where a cursor's lines came from, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
enum StreamSource {
    Registered(ScriptId),
    /// Lines handed in directly, e.g. a menu or dialog button
    Inline,
}

impl StreamSource {
    fn describe(self) -> String {
        match self {
            StreamSource::Registered(id) => format!("script {}", id),
            StreamSource::Inline => "inline commands".to_string(),
        }
    }
}

/// One call-stack frame: a stream handle, progress, and this frame's
/// conditional nesting
#[derive(Debug, Clone)]
struct Cursor {
    source: StreamSource,
    lines: Rc<[ScriptLine]>,
    index: usize,
    cond_depth: u32,
    skipping: bool,
}

impl Cursor {
    fn new(source: StreamSource, lines: Rc<[ScriptLine]>) -> Self {
        Self {
            source,
            lines,
            index: 0,
            cond_depth: 0,
            skipping: false,
        }
    }
}

/// A queued top-level run request
#[derive(Debug, Clone)]
enum Invocation {
    Script { id: ScriptId, record_run: bool },
    Inline { lines: Rc<[ScriptLine]> },
}

/// Outcome of executing one instruction
enum StepFlow {
    Continue,
    Suspend(Duration),
}

/// The script execution engine
///
/// Owns the script registry and the collaborator world; both are injected
/// at construction. Top-level invocations arriving while a stream is
/// active or suspended queue FIFO and start once the stack drains.
pub struct Interpreter {
    registry: ScriptRegistry,
    world: World,
    log: LogSink,
    stack: Vec<Cursor>,
    queue: VecDeque<Invocation>,
    state: RunState,
}

impl Interpreter {
    pub fn new(registry: ScriptRegistry, world: World, log: LogSink) -> Self {
        Self {
            registry,
            world,
            log,
            stack: Vec::new(),
            queue: VecDeque::new(),
            state: RunState::Idle,
        }
    }

    /// Queue a stream for execution, marking it executed when it starts
    pub fn invoke(&mut self, id: ScriptId) {
        self.queue.push_back(Invocation::Script {
            id,
            record_run: true,
        });
    }

    /// Queue a stream without first-run bookkeeping
    pub fn recall(&mut self, id: ScriptId) {
        self.queue.push_back(Invocation::Script {
            id,
            record_run: false,
        });
    }

    /// Queue loose lines (menu and dialog buttons) as their own stream
    pub fn invoke_inline(&mut self, lines: Vec<ScriptLine>) {
        self.queue.push_back(Invocation::Inline {
            lines: lines.into(),
        });
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// True when nothing is active, suspended, or queued
    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle && self.stack.is_empty() && self.queue.is_empty()
    }

    pub fn registry(&self) -> &ScriptRegistry {
        &self.registry
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Advance execution for one frame
    ///
    /// Clears a suspension whose deadline has passed, then executes until
    /// the stack and queue drain, the next suspension, or the per-tick
    /// guard.
    pub fn tick(&mut self, clock: &Clock) {
        if let RunState::Suspended { wake } = self.state {
            if !clock.has_reached(wake) {
                return;
            }
            self.state = RunState::Running;
        }

        let mut steps = 0;
        loop {
            steps += 1;
            if steps > MAX_STEPS_PER_TICK {
                let at = self
                    .stack
                    .last()
                    .map(|cursor| cursor.source.describe())
                    .unwrap_or_else(|| "queue".to_string());
                self.log.warn(format!(
                    "instruction guard tripped in {}; yielding until next tick",
                    at
                ));
                return;
            }

            if self.stack.is_empty() {
                match self.queue.pop_front() {
                    Some(invocation) => {
                        if !self.start(invocation) {
                            continue;
                        }
                    }
                    None => {
                        self.state = RunState::Idle;
                        return;
                    }
                }
            }

            self.state = RunState::Running;
            match self.step(clock) {
                StepFlow::Continue => {}
                StepFlow::Suspend(wake) => {
                    self.state = RunState::Suspended { wake };
                    return;
                }
            }
        }
    }

    /// Begin a queued invocation; false when it cannot start
    fn start(&mut self, invocation: Invocation) -> bool {
        match invocation {
            Invocation::Script { id, record_run } => self.push_stream(id, record_run),
            Invocation::Inline { lines } => {
                self.stack.push(Cursor::new(StreamSource::Inline, lines));
                true
            }
        }
    }

    /// Push a registered stream onto the call stack
    fn push_stream(&mut self, id: ScriptId, record_run: bool) -> bool {
        match self.registry.lines(id) {
            Some(lines) => {
                if record_run {
                    self.registry.mark_executed(id);
                }
                self.stack
                    .push(Cursor::new(StreamSource::Registered(id), lines));
                true
            }
            None => {
                self.log.error(format!("script {} not found", id));
                false
            }
        }
    }

    /// Execute the top cursor's next instruction
    fn step(&mut self, clock: &Clock) -> StepFlow {
        let Some(top) = self.stack.last_mut() else {
            return StepFlow::Continue;
        };
        if top.index >= top.lines.len() {
            self.stack.pop();
            return StepFlow::Continue;
        }
        let line = top.lines[top.index].clone();
        top.index += 1;

        // Conditional structure is tracked even while skipping; a guard is
        // evaluated once, at open time, and only outside a skipped region.
        match &line.kind {
            LineKind::Command(Command::OpenIf(cond)) => {
                top.cond_depth += 1;
                if !top.skipping && self.world.values.get(cond.slot) <= cond.threshold {
                    top.skipping = true;
                }
                return StepFlow::Continue;
            }
            LineKind::Command(Command::EndIf) => {
                top.cond_depth = top.cond_depth.saturating_sub(1);
                if top.cond_depth == 0 {
                    top.skipping = false;
                }
                return StepFlow::Continue;
            }
            _ => {}
        }
        if top.skipping {
            return StepFlow::Continue;
        }

        match line.kind {
            LineKind::Command(command) => self.exec(command, &line.raw, clock),
            LineKind::Unrecognized => StepFlow::Continue,
            LineKind::Malformed { reason } => {
                self.log
                    .error(format!("bad instruction `{}`: {}", line.raw, reason));
                StepFlow::Continue
            }
        }
    }

    /// Dispatch one command to the world
    fn exec(&mut self, command: Command, raw: &str, clock: &Clock) -> StepFlow {
        match command {
            Command::Log { color, message } => {
                let text = self.world.values.format_text(&message);
                self.log.push(color, text);
            }
            Command::GiveItem { item, slot } => {
                if !self.world.inventory.give_item(item, slot) {
                    self.log
                        .error(format!("inventory refused item {}: `{}`", item, raw));
                }
            }
            Command::SpawnEnemy {
                template,
                x,
                y,
                initialize,
            } => {
                if self.world.enemies.spawn(template, x, y, initialize).is_none() {
                    self.log
                        .error(format!("enemy spawn failed: `{}`", raw));
                }
            }
            Command::SpawnNpc {
                npc,
                x,
                y,
                initialize,
            } => {
                if self.world.npcs.spawn(npc, x, y, initialize).is_none() {
                    self.log.error(format!("npc spawn failed: `{}`", raw));
                }
            }
            Command::StartDialog(npc) => {
                if !self.world.npcs.start_dialog(npc) {
                    self.log
                        .error(format!("dialog refused for npc {}: `{}`", npc, raw));
                }
            }
            Command::SetMap(map) => {
                if !self.world.maps.set_active(map) {
                    self.log.error(format!("map {} unknown: `{}`", map, raw));
                }
            }
            Command::GiveQuest(quest) => {
                let given = self.world.quests.give(quest);
                self.log
                    .push(LogColor::White, format!("quest {} given: {}", quest, given));
            }
            Command::CancelQuest(quest) => {
                let cancelled = self.world.quests.cancel(quest);
                self.log.push(
                    LogColor::White,
                    format!("quest {} cancelled: {}", quest, cancelled),
                );
            }
            Command::CallScript(id) => {
                self.push_stream(id, true);
            }
            Command::RecallScript(id) => {
                self.push_stream(id, false);
            }
            Command::Delay { seconds } => {
                return StepFlow::Suspend(clock.deadline_in(seconds));
            }
            // conditional structure handled in step
            Command::OpenIf(_) | Command::EndIf => {}
            Command::AdjustValue { slot, op, amount } => {
                self.world.values.apply(slot, op, amount);
            }
            Command::OpenMenu(menu) => {
                if !self.world.menus.open(menu) {
                    self.log.error(format!("menu {} unknown: `{}`", menu, raw));
                }
            }
            Command::CloseMenu => {
                self.world.menus.close();
            }
            Command::CloseDialog => {
                self.world.npcs.close_dialog();
            }
        }
        StepFlow::Continue
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("state", &self.state)
            .field("stack_depth", &self.stack.len())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
