//! Terminal command handling.
//!
//! Maps one line typed on stdin to a [`Command`].  Adding a new command is a
//! single match arm in [`parse_command`].
//!
//! ## For contributors
//!
//! To add a new command:
//!
//! 1. Add a variant to [`Command`].
//! 2. Add a match arm in [`parse_command`] that produces it.
//! 3. Handle it in `main.rs` and update [`HELP`].

use std::time::Duration;

pub const HELP: &str =
    "commands: r(efresh)  m(ore)  p(oll) [secs]  s(top)  q(uit)  h(elp)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    LoadMore,
    /// Start polling; `None` means the configured default interval.
    Poll(Option<Duration>),
    StopPolling,
    Help,
    Quit,
}

/// Parse a single input line.  Blank lines and unknown input yield `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = match words.next()?.to_ascii_lowercase().as_str() {
        "r" | "refresh" => Command::Refresh,
        "m" | "more" => Command::LoadMore,
        "p" | "poll" => match words.next() {
            Some(secs) => Command::Poll(Some(Duration::from_secs(secs.parse().ok()?))),
            None => Command::Poll(None),
        },
        "s" | "stop" => Command::StopPolling,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(cmd)
}
