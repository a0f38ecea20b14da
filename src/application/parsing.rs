//! # Command Parsing
//!
//! Extracts a `Command` from free text of the form `!name -option value -flag`.
//!
//! A single left-to-right scan with no backtracking:
//! - Spaces are allowed around `!` and `-` (some autocorrect systems insert them).
//! - Names are one or more ASCII letters or digits.
//! - A value starting with `"` or `“` runs to the next unescaped `"` or `”`, so users can
//!   enter values containing spaces and newlines. Curly quotes are accepted because some
//!   mobile keyboards default to them.
//! - Any malformed token rejects the whole input.

use crate::domain::command::Command;

const OPENING_QUOTES: [char; 2] = ['"', '\u{201C}'];
const CLOSING_QUOTES: [char; 2] = ['"', '\u{201D}'];

/// Returns the command embedded in `text`, or `None` if `text` is not a valid command.
pub fn try_parse(text: &str) -> Option<Command> {
    let mut scanner = Scanner::new(text);

    scanner.skip_spaces();
    if !scanner.eat('!') {
        return None;
    }
    scanner.skip_spaces();

    let mut command = Command::new(scanner.name()?);
    match scanner.peek() {
        None => return Some(command),
        Some(' ') => {}
        Some(_) => return None,
    }

    loop {
        scanner.skip_spaces();
        if scanner.at_end() {
            return Some(command);
        }
        if !scanner.eat('-') {
            return None;
        }
        scanner.skip_spaces();

        let option = scanner.name()?.to_string();
        match scanner.peek() {
            None => {
                command.set_option(option, None);
                return Some(command);
            }
            Some(' ') => {}
            Some(_) => return None,
        }

        scanner.skip_spaces();
        if scanner.at_end() {
            command.set_option(option, None);
            return Some(command);
        }

        let value = match scanner.peek() {
            Some(c) if OPENING_QUOTES.contains(&c) => scanner.quoted_value()?,
            _ => scanner.plain_value(),
        };
        command.set_option(option, Some(value.to_string()));
    }
}

/// Returns true if `text` looks like an attempt at a command (first non-space character is `!`).
pub fn looks_like_command(text: &str) -> bool {
    text.trim_start_matches(' ').starts_with('!')
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_spaces(&mut self) {
        while self.eat(' ') {}
    }

    /// One or more ASCII alphanumerics. `None` if there are none.
    fn name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let len = self.text.as_bytes()[start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&self.text[start..self.pos])
    }

    /// Everything up to the next space or end of input.
    fn plain_value(&mut self) -> &'a str {
        let start = self.pos;
        let end = self.text[start..]
            .find(' ')
            .map_or(self.text.len(), |offset| start + offset);
        self.pos = end;
        &self.text[start..end]
    }

    /// Positioned on an opening quote. Returns the text up to the next closing quote that is
    /// not preceded by a backslash, leaving the scanner just past it. `None` if unterminated.
    fn quoted_value(&mut self) -> Option<&'a str> {
        let opening = self.peek()?;
        let start = self.pos + opening.len_utf8();

        let mut search_from = start;
        loop {
            let (offset, closing) = self.text[search_from..]
                .char_indices()
                .find(|(_, c)| CLOSING_QUOTES.contains(c))?;
            let at = search_from + offset;

            if self.text[..at].ends_with('\\') {
                search_from = at + closing.len_utf8();
                continue;
            }

            self.pos = at + closing.len_utf8();
            return Some(&self.text[start..at]);
        }
    }
}
