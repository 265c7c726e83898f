//! Console Quest
//!
//! An interactive console session over bundled RON content.
//! - Fixed-rate tick loop with non-blocking input
//! - Number keys pick dialog or menu buttons, or run a script by id
//! - `a` attacks the first live enemy, `e` uses the first item in the bag
//! - ESC closes the open menu or dialog, then quits

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skald_core::{LogColor, LogLine, ScriptId};
use skald_engine::{Engine, EngineConfig, SpawnState};
use std::collections::VecDeque;
use std::io::{stdout, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const PLAYER_DAMAGE: f64 = 4.0;
const FEED_LINES: usize = 10;
const FRAME_WIDTH: usize = 72;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(session_config())?;

    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = run_session(&mut stdout, &mut engine);

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Locate the bundled content directory from the workspace root or the
/// demo's own directory
fn session_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    let candidates = ["demos/console_quest/content", "content", "../content"];
    for candidate in candidates {
        if Path::new(candidate).is_dir() {
            config.content_dir = PathBuf::from(candidate);
            break;
        }
    }
    config
}

fn run_session(
    stdout: &mut Stdout,
    engine: &mut Engine,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Duration::from_millis(1000 / u64::from(engine.config().tick_hz.max(1)));
    let mut feed: VecDeque<LogLine> = VecDeque::new();
    let mut status = String::from("You arrive at the village.");
    let mut last_tick = Instant::now();

    loop {
        // Non-blocking input between frames
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc => {
                        if engine.menu().is_some() {
                            engine.close_menu();
                        } else if engine.dialog().is_some() {
                            engine.close_dialog();
                        } else {
                            return Ok(());
                        }
                    }
                    KeyCode::Char('a') => status = attack(engine),
                    KeyCode::Char('e') => status = eat(engine),
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        if let Some(note) = handle_digit(engine, c) {
                            status = note;
                        }
                    }
                    _ => {}
                }
            }
        }

        let now = Instant::now();
        if now.duration_since(last_tick) >= frame {
            let dt = now.duration_since(last_tick);
            last_tick = now;

            for line in engine.tick(dt) {
                feed.push_back(line);
            }
            while feed.len() > FEED_LINES {
                feed.pop_front();
            }

            render(stdout, engine, &feed, &status)?;
        }
    }
}

/// Route a number key to whatever is open, or run a script by id
fn handle_digit(engine: &mut Engine, digit: char) -> Option<String> {
    let n = digit.to_digit(10).unwrap_or(0) as usize;
    if n == 0 {
        return None;
    }
    if engine.dialog().is_some() {
        engine.choose_dialog_button(n - 1);
        None
    } else if engine.menu().is_some() {
        engine.press_menu_button(n - 1);
        None
    } else {
        let id = ScriptId(n as u32);
        if engine.registry().contains(id) {
            engine.invoke_script(id);
            Some(format!("Running script {}.", n))
        } else {
            Some(format!("No script {}.", n))
        }
    }
}

fn attack(engine: &mut Engine) -> String {
    let target = engine.enemies().into_iter().find(|enemy| enemy.is_alive());
    match target {
        Some(enemy) => {
            let name = engine
                .enemy_name(enemy.template)
                .unwrap_or_else(|| "it".to_string());
            engine.damage_enemy(enemy.handle, PLAYER_DAMAGE);
            format!("You strike the {}.", name)
        }
        None => "Nothing to attack.".to_string(),
    }
}

/// Use whatever sits in the first occupied bag slot
fn eat(engine: &mut Engine) -> String {
    let Some(slot) = engine.inventory().iter().position(Option::is_some) else {
        return "Your bag is empty.".to_string();
    };
    if engine.use_item(slot) {
        "You feel better.".to_string()
    } else {
        "That was no help.".to_string()
    }
}

fn term_color(color: LogColor) -> Color {
    match color {
        LogColor::White => Color::White,
        LogColor::Green => Color::Green,
        LogColor::Red => Color::Red,
        LogColor::Yellow => Color::Yellow,
        LogColor::Blue => Color::Blue,
        LogColor::Magenta => Color::Magenta,
        LogColor::Cyan => Color::Cyan,
    }
}

fn render(
    stdout: &mut Stdout,
    engine: &Engine,
    feed: &VecDeque<LogLine>,
    status: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;

    let rule = "=".repeat(FRAME_WIDTH);
    let map = engine
        .active_map_name()
        .unwrap_or_else(|| "nowhere".to_string());

    execute!(
        stdout,
        SetForegroundColor(Color::Yellow),
        Print(&rule),
        MoveTo(0, 1),
        Print(format!(
            "  CONSOLE QUEST   {}   tick {}   {:.1}s",
            map,
            engine.clock().tick,
            engine.clock().elapsed.as_secs_f64()
        )),
        MoveTo(0, 2),
        Print(&rule),
        ResetColor
    )?;

    // Vitals and values
    let health = engine.health();
    let health_color = if health.current() > health.max() * 0.5 {
        Color::Green
    } else if health.current() > health.max() * 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    let values: Vec<String> = engine
        .world()
        .values
        .iter()
        .map(|slot| format!("{} {}", slot.name, slot.value))
        .collect();
    execute!(
        stdout,
        MoveTo(0, 3),
        Print("  HP "),
        SetForegroundColor(health_color),
        Print(format!("{:.0}/{:.0}", health.current(), health.max())),
        ResetColor,
        Print(format!("   {}", values.join("   ")))
    )?;

    // Bag
    let bag: Vec<&str> = engine
        .inventory()
        .iter()
        .map(|slot| match slot {
            Some(item) => engine.item_name(*item).unwrap_or("?"),
            None => "-",
        })
        .collect();
    execute!(
        stdout,
        MoveTo(0, 4),
        Print(format!("  bag: {}", bag.join(" | ")))
    )?;

    // Quests
    let quests = engine.quest_lines();
    let quest_text = if quests.is_empty() {
        "none".to_string()
    } else {
        quests.join("; ")
    };
    execute!(stdout, MoveTo(0, 5), Print(format!("  quests: {}", quest_text)))?;

    // Nearby enemies and NPCs
    let mut row: u16 = 6;
    for enemy in engine.enemies().iter().take(3) {
        let name = engine
            .enemy_name(enemy.template)
            .unwrap_or_else(|| "?".to_string());
        let state = match enemy.state {
            SpawnState::Alive { health } => format!("{:.0} hp", health),
            SpawnState::Placeholder => "stirring".to_string(),
            SpawnState::Dead { .. } => "dead".to_string(),
        };
        execute!(
            stdout,
            MoveTo(0, row),
            Print(format!(
                "  {} at ({}, {}) [{}]",
                name, enemy.x, enemy.y, state
            ))
        )?;
        row += 1;
    }
    for npc in engine.npcs().iter().take(2) {
        let name = engine
            .npc_name(npc.npc)
            .unwrap_or_else(|| "?".to_string());
        execute!(
            stdout,
            MoveTo(0, row),
            Print(format!("  {} at ({}, {})", name, npc.x, npc.y))
        )?;
        row += 1;
    }

    // Log feed
    execute!(stdout, MoveTo(0, 11), Print(&rule))?;
    let mut feed_row: u16 = 12;
    for line in feed {
        execute!(
            stdout,
            MoveTo(0, feed_row),
            SetForegroundColor(term_color(line.color)),
            Print(format!("  {}", line.text)),
            ResetColor
        )?;
        feed_row += 1;
    }
    execute!(stdout, MoveTo(0, 12 + FEED_LINES as u16), Print(&rule))?;

    // Dialog or menu overlay
    let overlay_row = 13 + FEED_LINES as u16;
    if let Some(dialog) = engine.dialog() {
        execute!(
            stdout,
            MoveTo(0, overlay_row),
            SetForegroundColor(Color::Cyan),
            Print(format!("  {}: \"{}\"", dialog.speaker, dialog.text)),
            ResetColor
        )?;
        for (i, label) in dialog.buttons.iter().enumerate() {
            execute!(
                stdout,
                MoveTo(0, overlay_row + 1 + i as u16),
                Print(format!("    [{}] {}", i + 1, label))
            )?;
        }
    } else if let Some(menu) = engine.menu() {
        execute!(
            stdout,
            MoveTo(0, overlay_row),
            SetForegroundColor(Color::Cyan),
            Print(format!("  {}", menu.title)),
            ResetColor
        )?;
        for (i, (label, cooldown)) in menu.buttons.iter().enumerate() {
            let suffix = if *cooldown > 0 {
                format!(" ({} ticks)", cooldown)
            } else {
                String::new()
            };
            execute!(
                stdout,
                MoveTo(0, overlay_row + 1 + i as u16),
                Print(format!("    [{}] {}{}", i + 1, label, suffix))
            )?;
        }
    }

    // Status and key help
    execute!(
        stdout,
        MoveTo(0, overlay_row + 6),
        Print(format!("  {}", status)),
        MoveTo(0, overlay_row + 7),
        SetForegroundColor(Color::DarkGrey),
        Print("  [1-9] choose or run script  [a] attack  [e] use item  [ESC] close/quit  [q] quit"),
        ResetColor
    )?;

    stdout.flush()?;
    Ok(())
}
