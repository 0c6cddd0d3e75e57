//! Line protocol driving a set of byte-string keys
//!
//! Input is a stream of whitespace-separated `(command, key)` pairs. `+` inserts, `?` looks
//! up and `-` removes the key; every recognized command answers `OK` or `FAIL` on its own
//! line. Unknown commands are skipped together with their key and produce no output.

use std::{
    fmt,
    io::{BufRead, Write},
};

use tracing::{debug, trace};

use crate::{error::CommandError, open_set::OpenAddressingSet};

/// A recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `+ key`
    Insert,
    /// `? key`
    Contains,
    /// `- key`
    Remove,
}

impl Command {
    /// Parses a command token. Returns `None` for anything other than `+`, `?` or `-`.
    #[must_use]
    pub fn parse(token: &[u8]) -> Option<Self> {
        match token {
            b"+" => Some(Self::Insert),
            b"?" => Some(Self::Contains),
            b"-" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// Answer printed for a recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// The operation reported success
    Ok,
    /// The operation reported the expected negative outcome
    Fail,
}

impl From<bool> for Answer {
    fn from(success: bool) -> Self {
        if success { Self::Ok } else { Self::Fail }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Recognized commands executed
    pub executed: usize,
    /// Commands answered `OK`
    pub ok: usize,
    /// Commands answered `FAIL`
    pub failed: usize,
    /// Pairs skipped because of an unknown command
    pub ignored: usize,
}

/// Applies one command to the set
///
/// # Errors
///
/// Returns [`CommandError::Insert`] if an insert fails for any reason other than a duplicate.
pub fn execute(
    set: &mut OpenAddressingSet<Vec<u8>>,
    command: Command,
    key: &[u8],
) -> Result<Answer, CommandError> {
    let success = match command {
        Command::Insert => match set.insert(key.to_vec()) {
            Ok(_) => true,
            Err(err) if err.is_duplicate() => false,
            Err(source) => {
                return Err(CommandError::Insert {
                    key: String::from_utf8_lossy(key).into_owned(),
                    source,
                });
            }
        },
        Command::Contains => set.contains(key),
        Command::Remove => set.remove(key).is_ok(),
    };
    trace!(?command, key = %String::from_utf8_lossy(key), success, "executed command");
    Ok(Answer::from(success))
}

/// Reads commands from `input` until end of input and writes one answer line per
/// recognized command to `output`. Pairs may span line breaks; a trailing command without a
/// key is dropped.
///
/// Tokens are raw bytes split on ASCII whitespace, so keys need not be valid UTF-8.
///
/// # Errors
///
/// Fails on i/o errors and on fatal insert errors. Answers written before the failure stay
/// in `output`.
pub fn run<R, W>(
    set: &mut OpenAddressingSet<Vec<u8>>,
    mut input: R,
    mut output: W,
) -> Result<Tally, CommandError>
where
    R: BufRead,
    W: Write,
{
    let mut tally = Tally::default();
    let mut pending: Option<Vec<u8>> = None;
    let mut line = Vec::new();

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }

        for token in line.split(u8::is_ascii_whitespace).filter(|token| !token.is_empty()) {
            let Some(command_token) = pending.take() else {
                pending = Some(token.to_vec());
                continue;
            };

            let Some(command) = Command::parse(&command_token) else {
                debug!(
                    command = %String::from_utf8_lossy(&command_token),
                    key = %String::from_utf8_lossy(token),
                    "ignoring unknown command"
                );
                tally.ignored = tally.ignored.saturating_add(1);
                continue;
            };

            let answer = execute(set, command, token)?;
            writeln!(output, "{answer}")?;
            tally.executed = tally.executed.saturating_add(1);
            match answer {
                Answer::Ok => tally.ok = tally.ok.saturating_add(1),
                Answer::Fail => tally.failed = tally.failed.saturating_add(1),
            }
        }
    }

    if let Some(command_token) = pending {
        debug!(
            command = %String::from_utf8_lossy(&command_token),
            "dropping command without a key at end of input"
        );
    }
    output.flush()?;
    Ok(tally)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn run_bytes(input: &[u8]) -> (String, Tally) {
        let mut set = OpenAddressingSet::new();
        let mut output = Vec::new();
        let tally = run(&mut set, input, &mut output).unwrap();
        (String::from_utf8(output).unwrap(), tally)
    }

    fn run_str(input: &str) -> (String, Tally) {
        run_bytes(input.as_bytes())
    }

    #[test]
    fn test_reference_scenario() {
        let (output, tally) = run_str("+ a\n+ b\n? a\n- a\n? a\n- a\n+ a\n? a\n");
        assert_eq!(output, "OK\nOK\nOK\nOK\nFAIL\nFAIL\nOK\nOK\n");
        assert_eq!(tally, Tally { executed: 8, ok: 6, failed: 2, ignored: 0 });
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let (output, _) = run_str("+ key + key ? key");
        assert_eq!(output, "OK\nFAIL\nOK\n");
    }

    #[test]
    fn test_unknown_commands_are_ignored() {
        let (output, tally) = run_str("* a\n+ a\n! b\n? a\n");
        assert_eq!(output, "OK\nOK\n");
        assert_eq!(tally.ignored, 2);
        assert_eq!(tally.executed, 2);
    }

    #[test]
    fn test_pairs_span_lines() {
        let (output, _) = run_str("+\nalpha ?\n\n  alpha\n");
        assert_eq!(output, "OK\nOK\n");
    }

    #[test]
    fn test_trailing_command_is_dropped() {
        let (output, tally) = run_str("+ a ?");
        assert_eq!(output, "OK\n");
        assert_eq!(tally.executed, 1);
    }

    #[test]
    fn test_empty_input() {
        let (output, tally) = run_str("");
        assert!(output.is_empty());
        assert_eq!(tally, Tally::default());
    }

    #[test]
    fn test_many_keys_survive_growth() {
        let mut input = String::new();
        for i in 0..100 {
            writeln!(input, "+ k{i}").unwrap();
        }
        for i in 0..100 {
            writeln!(input, "? k{i}").unwrap();
        }
        let (output, tally) = run_str(&input);
        assert_eq!(tally.ok, 200);
        assert!(output.lines().all(|line| line == "OK"));
    }

    #[test]
    fn test_non_utf8_keys_do_not_stop_the_run() {
        let (output, tally) = run_bytes(b"+ a\n+ \xff\n? a\n");
        assert_eq!(output, "OK\nOK\nOK\n");
        assert_eq!(tally.executed, 3);
    }

    #[test]
    fn test_distinct_invalid_keys_stay_distinct() {
        let (output, _) = run_bytes(b"+ \xff\xfe\n? \xff\xfe\n? \xfe\xff\n+ \xfe\xff\n- \xff\xfe\n");
        assert_eq!(output, "OK\nOK\nFAIL\nOK\nOK\n");
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Command::parse(b"+"), Some(Command::Insert));
        assert_eq!(Command::parse(b"?"), Some(Command::Contains));
        assert_eq!(Command::parse(b"-"), Some(Command::Remove));
        assert_eq!(Command::parse(b"++"), None);
        assert_eq!(Answer::Ok.to_string(), "OK");
        assert_eq!(Answer::Fail.to_string(), "FAIL");
    }
}
