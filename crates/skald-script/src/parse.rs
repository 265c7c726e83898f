//! Instruction line parser
//!
//! Script sources are plain text, one instruction per line. The leading
//! sigil selects the family: `$` engine commands, `!` flow control, `&`
//! conditionals, `%` value mutation, `@` interface. A line whose sigil or
//! head matches nothing becomes [`LineKind::Unrecognized`] and is skipped
//! without a report; a line that matches a known head but carries a bad
//! body becomes [`LineKind::Malformed`] and is reported when reached.

use skald_core::{
    Command, Condition, EnemyId, ItemId, LineKind, LogColor, MapId, MenuId, ModifyOp, NpcId,
    QuestId, ScriptId, ScriptLine, SlotArg, SlotIndex, ValueId,
};

/// Parse a whole script source into its retained lines.
///
/// Blank lines and `#` comments are dropped; unrecognized and malformed
/// lines are retained so execution can account for them.
pub fn parse_source(text: &str) -> Vec<ScriptLine> {
    text.lines().filter_map(compile_line).collect()
}

/// Parse a list of instruction lines, as stored on dialog and menu buttons.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Vec<ScriptLine> {
    lines
        .iter()
        .filter_map(|line| compile_line(line.as_ref()))
        .collect()
}

fn compile_line(raw: &str) -> Option<ScriptLine> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(ScriptLine::new(line, parse_line(line)))
}

/// Classify a single trimmed instruction line.
pub fn parse_line(line: &str) -> LineKind {
    if let Some(rest) = line.strip_prefix('$') {
        parse_engine_command(rest)
    } else if let Some(rest) = line.strip_prefix('!') {
        parse_flow(rest)
    } else if let Some(rest) = line.strip_prefix('&') {
        parse_conditional(rest.trim())
    } else if let Some(rest) = line.strip_prefix('%') {
        wrap(parse_mutation(rest))
    } else if let Some(rest) = line.strip_prefix('@') {
        parse_interface(rest)
    } else {
        LineKind::Unrecognized
    }
}

fn wrap(parsed: Result<Command, String>) -> LineKind {
    match parsed {
        Ok(command) => LineKind::Command(command),
        Err(reason) => LineKind::Malformed { reason },
    }
}

// === `$` engine commands ===

fn parse_engine_command(rest: &str) -> LineKind {
    if let Some(body) = rest.strip_prefix("log.") {
        return wrap(parse_log(body));
    }
    if let Some(tail) = rest.strip_prefix("inventory.GiveItem") {
        return wrap(parse_give_item(tail));
    }
    if let Some(tail) = rest.strip_prefix("enemy.spawn") {
        return wrap(spawn_args(tail).map(|(id, x, y, initialize)| Command::SpawnEnemy {
            template: EnemyId(id),
            x,
            y,
            initialize,
        }));
    }
    if let Some(tail) = rest.strip_prefix("npc.spawn") {
        return wrap(spawn_args(tail).map(|(id, x, y, initialize)| Command::SpawnNpc {
            npc: NpcId(id),
            x,
            y,
            initialize,
        }));
    }
    if let Some(tail) = rest.strip_prefix("npc.dialog") {
        return wrap(single_id(tail).map(|id| Command::StartDialog(NpcId(id))));
    }
    if let Some(tail) = rest.strip_prefix("map.set") {
        return wrap(single_id(tail).map(|id| Command::SetMap(MapId(id))));
    }
    if let Some(tail) = rest.strip_prefix("call.script") {
        return wrap(single_id(tail).map(|id| Command::CallScript(ScriptId(id))));
    }
    if let Some(tail) = rest.strip_prefix("recall.script") {
        return wrap(single_id(tail).map(|id| Command::RecallScript(ScriptId(id))));
    }
    if let Some(tail) = rest.strip_prefix("quest.Give") {
        return wrap(single_id(tail).map(|id| Command::GiveQuest(QuestId(id))));
    }
    if let Some(tail) = rest.strip_prefix("quest.Cancel") {
        return wrap(single_id(tail).map(|id| Command::CancelQuest(QuestId(id))));
    }
    LineKind::Unrecognized
}

fn parse_log(body: &str) -> Result<Command, String> {
    let (name, tail) = body
        .split_once('(')
        .ok_or_else(|| String::from("expected a quoted message in parentheses"))?;
    let name = name.trim();
    let color =
        LogColor::from_name(name).ok_or_else(|| format!("unknown log color `{name}`"))?;
    let inner = tail
        .strip_suffix(')')
        .ok_or_else(|| String::from("missing closing parenthesis"))?;
    let message = parse_quoted(inner.trim())?;
    Ok(Command::Log { color, message })
}

fn parse_give_item(tail: &str) -> Result<Command, String> {
    let args = expect_args(tail, 2)?;
    let item = ItemId(parse_u32(args[0])?);
    // A literal `false` in the slot position means "first free slot".
    let slot = if args[1].eq_ignore_ascii_case("false") {
        SlotArg::FirstFree
    } else {
        SlotArg::Fixed(SlotIndex(parse_u32(args[1])?))
    };
    Ok(Command::GiveItem { item, slot })
}

fn spawn_args(tail: &str) -> Result<(u32, i32, i32, bool), String> {
    let args = expect_args(tail, 4)?;
    Ok((
        parse_u32(args[0])?,
        parse_i32(args[1])?,
        parse_i32(args[2])?,
        parse_bool(args[3])?,
    ))
}

// === `!` flow control ===

fn parse_flow(rest: &str) -> LineKind {
    if let Some(tail) = rest.strip_prefix("delay") {
        return wrap(single_number(tail).map(|seconds| Command::Delay { seconds }));
    }
    LineKind::Unrecognized
}

// === `&` conditionals ===

fn parse_conditional(rest: &str) -> LineKind {
    if rest == "end" {
        return LineKind::Command(Command::EndIf);
    }
    wrap(parse_condition(rest).map(Command::OpenIf))
}

fn parse_condition(rest: &str) -> Result<Condition, String> {
    let body = rest
        .strip_suffix(':')
        .ok_or_else(|| String::from("conditional must end with `:`"))?;
    let (slot_text, threshold_text) = body
        .split_once('>')
        .ok_or_else(|| String::from("expected `<slot>.v><literal>:`"))?;
    let slot_text = slot_text
        .trim()
        .strip_suffix(".v")
        .ok_or_else(|| String::from("condition must test a value slot with `.v`"))?;
    let slot = ValueId(parse_u32(slot_text.trim())?);
    let threshold = parse_f64(threshold_text.trim())?;
    Ok(Condition { slot, threshold })
}

// === `%` value mutation ===

fn parse_mutation(rest: &str) -> Result<Command, String> {
    let (slot_text, tail) = rest
        .split_once(".v")
        .ok_or_else(|| String::from("expected `<slot>.v -= <amount>`"))?;
    let slot = ValueId(parse_u32(slot_text.trim())?);
    let tail = tail.trim_start();
    let (op, amount_text) = if let Some(t) = tail.strip_prefix("-=") {
        (ModifyOp::Sub, t)
    } else if let Some(t) = tail.strip_prefix("+=") {
        (ModifyOp::Add, t)
    } else {
        return Err(String::from("expected `-=` or `+=` after the slot"));
    };
    let amount = parse_f64(amount_text.trim())?;
    Ok(Command::AdjustValue { slot, op, amount })
}

// === `@` interface ===

fn parse_interface(rest: &str) -> LineKind {
    if let Some(tail) = rest.strip_prefix("open.menu") {
        return wrap(single_id(tail).map(|id| Command::OpenMenu(MenuId(id))));
    }
    // `close.menu` must be tried before the bare dialog `close`.
    if rest == "close.menu" {
        return LineKind::Command(Command::CloseMenu);
    }
    if rest == "close" {
        return LineKind::Command(Command::CloseDialog);
    }
    LineKind::Unrecognized
}

// === argument helpers ===

fn paren_args(tail: &str) -> Result<Vec<&str>, String> {
    let inner = tail
        .trim()
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| String::from("expected a parenthesized argument list"))?;
    Ok(inner.split(',').map(str::trim).collect())
}

fn expect_args(tail: &str, count: usize) -> Result<Vec<&str>, String> {
    let args = paren_args(tail)?;
    if args.len() != count {
        return Err(format!("expected {count} arguments, found {}", args.len()));
    }
    Ok(args)
}

fn single_id(tail: &str) -> Result<u32, String> {
    let args = expect_args(tail, 1)?;
    parse_u32(args[0])
}

fn single_number(tail: &str) -> Result<f64, String> {
    let args = expect_args(tail, 1)?;
    parse_f64(args[0])
}

fn parse_quoted(text: &str) -> Result<String, String> {
    let mut chars = text.chars();
    let quote = match chars.next() {
        Some(c @ ('"' | '\'')) => c,
        _ => return Err(String::from("message must be quoted")),
    };
    chars
        .as_str()
        .strip_suffix(quote)
        .map(str::to_string)
        .ok_or_else(|| String::from("unterminated quote"))
}

fn parse_u32(text: &str) -> Result<u32, String> {
    text.parse().map_err(|_| format!("invalid id `{text}`"))
}

fn parse_i32(text: &str) -> Result<i32, String> {
    text.parse()
        .map_err(|_| format!("invalid coordinate `{text}`"))
}

fn parse_f64(text: &str) -> Result<f64, String> {
    text.parse().map_err(|_| format!("invalid number `{text}`"))
}

fn parse_bool(text: &str) -> Result<bool, String> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("invalid boolean `{text}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_line(line) {
            LineKind::Command(command) => command,
            other => panic!("expected a command for `{line}`, got {other:?}"),
        }
    }

    fn is_malformed(line: &str) -> bool {
        matches!(parse_line(line), LineKind::Malformed { .. })
    }

    #[test]
    fn test_log_double_quotes() {
        assert_eq!(
            command(r#"$log.green("well done")"#),
            Command::Log {
                color: LogColor::Green,
                message: String::from("well done"),
            }
        );
    }

    #[test]
    fn test_log_single_quotes() {
        assert_eq!(
            command("$log.red('ouch')"),
            Command::Log {
                color: LogColor::Red,
                message: String::from("ouch"),
            }
        );
    }

    #[test]
    fn test_log_message_keeps_commas_and_parens() {
        assert_eq!(
            command(r#"$log.white("hello, traveler (again)")"#),
            Command::Log {
                color: LogColor::White,
                message: String::from("hello, traveler (again)"),
            }
        );
    }

    #[test]
    fn test_log_unknown_color_is_malformed() {
        assert!(is_malformed(r#"$log.plaid("x")"#));
    }

    #[test]
    fn test_log_unterminated_quote_is_malformed() {
        assert!(is_malformed(r#"$log.green("oops)"#));
    }

    #[test]
    fn test_give_item_fixed_slot() {
        assert_eq!(
            command("$inventory.GiveItem(5, 2)"),
            Command::GiveItem {
                item: ItemId(5),
                slot: SlotArg::Fixed(SlotIndex(2)),
            }
        );
    }

    #[test]
    fn test_give_item_false_means_first_free() {
        assert_eq!(
            command("$inventory.GiveItem(5, false)"),
            Command::GiveItem {
                item: ItemId(5),
                slot: SlotArg::FirstFree,
            }
        );
        // Historic content carries mixed-case booleans.
        assert_eq!(
            command("$inventory.GiveItem(5, False)"),
            Command::GiveItem {
                item: ItemId(5),
                slot: SlotArg::FirstFree,
            }
        );
    }

    #[test]
    fn test_spawn_enemy() {
        assert_eq!(
            command("$enemy.spawn(3, 10, -4, true)"),
            Command::SpawnEnemy {
                template: EnemyId(3),
                x: 10,
                y: -4,
                initialize: true,
            }
        );
    }

    #[test]
    fn test_spawn_npc_lazy_placeholder() {
        assert_eq!(
            command("$npc.spawn(1, 0, 0, False)"),
            Command::SpawnNpc {
                npc: NpcId(1),
                x: 0,
                y: 0,
                initialize: false,
            }
        );
    }

    #[test]
    fn test_single_id_commands() {
        assert_eq!(command("$npc.dialog(4)"), Command::StartDialog(NpcId(4)));
        assert_eq!(command("$map.set(2)"), Command::SetMap(MapId(2)));
        assert_eq!(command("$call.script(7)"), Command::CallScript(ScriptId(7)));
        assert_eq!(
            command("$recall.script(7)"),
            Command::RecallScript(ScriptId(7))
        );
        assert_eq!(command("$quest.Give(9)"), Command::GiveQuest(QuestId(9)));
        assert_eq!(command("$quest.Cancel(9)"), Command::CancelQuest(QuestId(9)));
    }

    #[test]
    fn test_delay_accepts_fractions() {
        assert_eq!(command("!delay(2)"), Command::Delay { seconds: 2.0 });
        assert_eq!(command("!delay(0.25)"), Command::Delay { seconds: 0.25 });
    }

    #[test]
    fn test_conditional_open_and_end() {
        assert_eq!(
            command("&0.v>10:"),
            Command::OpenIf(Condition {
                slot: ValueId(0),
                threshold: 10.0,
            })
        );
        assert_eq!(command("&end"), Command::EndIf);
    }

    #[test]
    fn test_conditional_tolerates_spacing() {
        assert_eq!(
            command("&3.v > 2.5 :"),
            Command::OpenIf(Condition {
                slot: ValueId(3),
                threshold: 2.5,
            })
        );
    }

    #[test]
    fn test_conditional_wrong_operator_is_malformed() {
        assert!(is_malformed("&0.v<10:"));
        assert!(is_malformed("&0.v>10"));
    }

    #[test]
    fn test_mutation_forms() {
        assert_eq!(
            command("%0.v -= 25"),
            Command::AdjustValue {
                slot: ValueId(0),
                op: ModifyOp::Sub,
                amount: 25.0,
            }
        );
        assert_eq!(
            command("%2.v += 1.5"),
            Command::AdjustValue {
                slot: ValueId(2),
                op: ModifyOp::Add,
                amount: 1.5,
            }
        );
    }

    #[test]
    fn test_mutation_without_operator_is_malformed() {
        assert!(is_malformed("%0.v = 25"));
    }

    #[test]
    fn test_interface_lines() {
        assert_eq!(command("@open.menu(2)"), Command::OpenMenu(MenuId(2)));
        assert_eq!(command("@close.menu"), Command::CloseMenu);
        assert_eq!(command("@close"), Command::CloseDialog);
    }

    #[test]
    fn test_unknown_heads_are_unrecognized() {
        assert_eq!(parse_line("wait()"), LineKind::Unrecognized);
        assert_eq!(parse_line("$weather.set(1)"), LineKind::Unrecognized);
        assert_eq!(parse_line("!loop(3)"), LineKind::Unrecognized);
        assert_eq!(parse_line("@dance"), LineKind::Unrecognized);
    }

    #[test]
    fn test_bad_arguments_are_malformed() {
        assert!(is_malformed("$inventory.GiveItem(oops, 1)"));
        assert!(is_malformed("$inventory.GiveItem(5, true)"));
        assert!(is_malformed("$enemy.spawn(3, 10)"));
        assert!(is_malformed("!delay()"));
        assert!(is_malformed("@open.menu(banana)"));
    }

    #[test]
    fn test_source_skips_blanks_and_comments() {
        let lines = parse_source(
            "\n# opening chatter\n$log.green(\"hi\")\n\n  !delay(1)  \n&end\n",
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "$log.green(\"hi\")");
        assert_eq!(lines[1].raw, "!delay(1)");
        assert_eq!(
            lines[2].kind,
            LineKind::Command(Command::EndIf)
        );
    }

    #[test]
    fn test_parse_lines_from_button_bodies() {
        let body = [String::from("$quest.Give(1)"), String::from("@close")];
        let lines = parse_lines(&body);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].kind, LineKind::Command(Command::GiveQuest(QuestId(1))));
    }
}
