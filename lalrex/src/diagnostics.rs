//! Human-readable error context: expected-token sets, symbol descriptions and
//! source excerpts.

use crate::location::Location;
use crate::table::{GrammarTable, ParserAction, StateID, SymbolID};

/// Lines of an excerpt region kept at each end when the region is collapsed.
const VISIBLE_LINES: usize = 2;

/// Describes a terminal for error messages: `end of input` for `$end`, the
/// registered description if any, otherwise the quoted symbol name.
pub fn describe_symbol(table: &GrammarTable, symbol: SymbolID) -> String {
    if symbol == SymbolID::EOF {
        return "end of input".to_string();
    }
    if let Some(descr) = table.description(symbol) {
        return descr.to_string();
    }
    match table.symbol_name(symbol) {
        Some(name) if name.starts_with('\'') || name.starts_with('"') => name.to_string(),
        Some(name) => format!("'{name}'"),
        None => format!("'{symbol}'"),
    }
}

/// Terminals acceptable in `state`, excluding `error`.
///
/// Returns the descriptions, de-duplicated in symbol order, and the matching
/// symbol ids.
pub fn expected_token_set(table: &GrammarTable, state: StateID) -> (Vec<String>, Vec<SymbolID>) {
    let mut descriptions: Vec<String> = Vec::new();
    let mut ids = Vec::new();
    for (symbol, action) in table.row(state) {
        if symbol == SymbolID::ERROR
            || !table.is_terminal(symbol)
            || matches!(action, ParserAction::Error | ParserAction::Goto(_))
        {
            continue;
        }
        let descr = describe_symbol(table, symbol);
        if !descriptions.contains(&descr) {
            descriptions.push(descr);
            ids.push(symbol);
        }
    }
    (descriptions, ids)
}

/// Formats a one-line excerpt with a caret under the first upcoming
/// character:
///
/// ```text
/// abc def
/// ----^
/// ```
pub fn show_position(past: &str, upcoming: &str) -> String {
    let dashes = "-".repeat(past.chars().count());
    format!("{past}{upcoming}\n{dashes}^")
}

struct ExcerptLine {
    text: String,
    region: usize,
    nonempty: bool,
}

/// Renders the source lines around `loc` with line numbers and a `^` marker
/// line beneath every marked line.
///
/// `lead` lines before and `tail` lines after the marked span are shown. A
/// region (lead, marked or tail) with more than four non-empty lines is
/// collapsed to its first and last two, with a `(...continued...)`
/// placeholder in between.
pub fn pretty_print_range(source: &str, loc: &Location, lead: usize, tail: usize) -> String {
    let lines: Vec<&str> = source
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let first = loc.start.line.max(1);
    let last = loc.end.line.max(first);
    let l0 = first.saturating_sub(lead).max(1);
    let l1 = (last + tail).min(lines.len()).max(l0);
    let width = l1.to_string().len();

    let mut rows = Vec::new();
    for lno in l0..=l1 {
        let line = lines.get(lno - 1).copied().unwrap_or("").replace('\t', " ");
        let line_len = line.chars().count();
        let mut text = format!("{lno:>width$}: {line}");

        let mark = if lno == first {
            let to = if lno == last { loc.end.column } else { line_len };
            Some((loc.start.column, to.saturating_sub(loc.start.column).max(1)))
        } else if lno == last {
            Some((0, loc.end.column.max(1)))
        } else if lno > first && lno < last {
            Some((0, line_len.max(1)))
        } else {
            None
        };
        let region = match mark {
            Some((offset, len)) => {
                text.push('\n');
                text.push_str(&"^".repeat(width));
                text.push_str(&".".repeat(2 + offset));
                text.push_str(&"^".repeat(len));
                1
            }
            None if lno < first => 0,
            None => 2,
        };
        rows.push(ExcerptLine {
            text,
            region,
            nonempty: !line.trim().is_empty(),
        });
    }

    let mut hidden = vec![false; rows.len()];
    let mut placeholder_at = Vec::new();
    for region in 0..3 {
        let nonempty: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.region == region && r.nonempty)
            .map(|(i, _)| i)
            .collect();
        if nonempty.len() > 2 * VISIBLE_LINES {
            let from = nonempty[VISIBLE_LINES - 1] + 1;
            let to = nonempty[nonempty.len() - VISIBLE_LINES];
            for h in &mut hidden[from..to] {
                *h = true;
            }
            placeholder_at.push((from, region));
        }
    }

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if let Some(&(_, region)) = placeholder_at.iter().find(|(at, _)| *at == i) {
            let mut p = format!("{}  (...continued...)", " ".repeat(width));
            if region == 1 {
                p.push_str(&format!("\n{}  (---------------)", "-".repeat(width)));
            }
            out.push(p);
        }
        if !hidden[i] {
            out.push(row.text.clone());
        }
    }
    out.join("\n")
}
