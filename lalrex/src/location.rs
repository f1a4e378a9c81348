//! Source positions, locations and the lexer cursor.
//!
//! A [`Location`] is the runtime counterpart of a jison `yylloc`: a
//! first/last position pair plus an optional character-offset range. The
//! [`LexerCursor`] keeps the lexer's current position in step with its byte
//! offset and is able to walk backwards again when matched text is handed
//! back to the input (`unput`, `less`, `reject`).

/// A line/column position in source text.
///
/// Lines are 1-based, columns are 0-based and counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 0-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

/// A half-open source range `[start, end)` with an optional character range.
///
/// `range` is only filled in when the lexer runs with the `ranges` option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub start: Position,
    pub end: Position,
    pub range: Option<(usize, usize)>,
}

impl Location {
    /// Creates a new `Location` without a character range.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            range: None,
        }
    }

    /// Start (or restart) this location at its current `end` position.
    /// Effect: loc(x,y, z,w) -> loc(z,w, z,w)
    pub fn collapse(&mut self) {
        self.start = self.end;
        if let Some((_, end)) = self.range {
            self.range = Some((end, end));
        }
    }

    /// Returns an empty location at the end of `self`.
    pub fn collapsed(&self) -> Location {
        let mut loc = *self;
        loc.collapse();
        loc
    }

    /// Merge with another location by covering both.
    pub fn merge(&self, other: &Location) -> Location {
        let start = if self.start <= other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end >= other.end {
            self.end
        } else {
            other.end
        };
        let range = match (self.range, other.range) {
            (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
            (r, None) | (None, r) => r,
        };
        Location { start, end, range }
    }

    /// Is this location empty (start == end)?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> String {
        format!(
            "span {}:{} to {}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }

    /// Describes the location the way error messages refer to it, e.g.
    /// `line 3, columns 4 .. 9`.
    pub fn describe(&self) -> String {
        let (l1, c1) = (self.start.line, self.start.column);
        let (l2, c2) = (self.end.line, self.end.column);
        let mut s = if l1 == l2 {
            if c1 + 1 == c2 {
                format!("line {l1}, column {c1}")
            } else {
                format!("line {l1}, columns {c1} .. {c2}")
            }
        } else {
            format!("lines {l1}(column {c1}) .. {l2}(column {c2})")
        };
        if let Some((r1, r2)) = self.range {
            if r2 > r1 + 1 {
                s.push_str(&format!(" {{String Offset range: {r1} .. {r2}}}"));
            } else {
                s.push_str(&format!(" {{String Offset: {r1}}}"));
            }
        }
        s
    }
}

/// Tracks the lexer's position inside its input buffer.
///
/// The cursor advances and retreats over the buffer, keeping the byte offset,
/// the character offset and the line/column [`Position`] in step. `\r\n`,
/// lone `\r` and lone `\n` each count as one line break. Column widths of
/// finished lines are remembered so that retreating over a line break restores
/// the exact previous column.
#[derive(Debug, Clone, Default)]
pub struct LexerCursor {
    /// Byte offset into the buffer.
    pub offset: usize,
    /// Character offset into the buffer.
    pub char_offset: usize,
    /// Current line/column.
    pub position: Position,
    line_widths: Vec<usize>,
}

impl LexerCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 0-based count of line breaks consumed so far (jison's `yylineno`).
    #[inline]
    pub fn line_no(&self) -> usize {
        self.position.line - 1
    }

    /// Advance over `source[self.offset..end]`.
    pub fn advance(&mut self, source: &str, end: usize) {
        debug_assert!(end >= self.offset);
        let mut prev_cr = source[..self.offset].ends_with('\r');
        for c in source[self.offset..end].chars() {
            match c {
                '\n' if prev_cr => {}
                '\r' | '\n' => {
                    self.line_widths.push(self.position.column);
                    self.position.line += 1;
                    self.position.column = 0;
                }
                _ => self.position.column += 1,
            }
            prev_cr = c == '\r';
            self.char_offset += 1;
        }
        self.offset = end;
    }

    /// Retreat over `source[start..self.offset]`, undoing a previous advance.
    pub fn retreat(&mut self, source: &str, start: usize) {
        debug_assert!(start <= self.offset);
        let mut chars = source[start..self.offset].chars().rev().peekable();
        while let Some(c) = chars.next() {
            let before_is_cr = match chars.peek() {
                Some(&p) => p == '\r',
                None => source[..start].ends_with('\r'),
            };
            match c {
                '\n' if before_is_cr => {}
                '\r' | '\n' => {
                    self.position.line -= 1;
                    self.position.column = self.line_widths.pop().unwrap_or(0);
                }
                _ => self.position.column = self.position.column.saturating_sub(1),
            }
            self.char_offset -= 1;
        }
        self.offset = start;
    }
}

/// Build a [`Location`] inline from line/column coordinates.
///
/// Lines are 1-based and columns 0-based, as produced by the lexer.
///
/// # Examples
///
/// ```rust
/// # use lalrex::loc;
/// let l = loc!(1, 0, 1, 4);
/// assert_eq!(l.end.column, 4);
/// ```
#[macro_export]
macro_rules! loc {
    ($line_start:expr, $col_start:expr, $line_end:expr, $col_end:expr) => {
        $crate::Location {
            start: $crate::Position {
                line: $line_start,
                column: $col_start,
            },
            end: $crate::Position {
                line: $line_end,
                column: $col_end,
            },
            range: None,
        }
    };
}
