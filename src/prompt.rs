//! Interactive line-reading, behind a trait so the resolver can be
//! driven by scripted input in tests.

use std::io::{self, IsTerminal};

use dialoguer::{Input, Password};

/// Blocking prompt reader. Reads suspend until the operator answers;
/// there is no timeout, a human is expected to be present.
pub trait Prompter {
    /// Read a visible line. An empty answer is allowed; `default` is
    /// offered as the pre-filled value when given.
    fn read_line(&mut self, message: &str, default: Option<&str>) -> io::Result<String>;

    /// Read a credential with terminal echo disabled.
    fn read_secret(&mut self, message: &str) -> io::Result<String>;
}

/// Production prompter backed by the terminal.
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn read_line(&mut self, message: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::new();
        input.with_prompt(message).allow_empty(true);
        if let Some(value) = default {
            input.default(value.to_string());
        }
        input.interact_text()
    }

    fn read_secret(&mut self, message: &str) -> io::Result<String> {
        Password::new()
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
    }
}

/// Whether the process is attached to an interactive terminal. When it
/// is not, resolution must fail outright instead of blocking on a read
/// that can never be answered.
pub fn stdin_is_interactive() -> bool {
    io::stdin().is_terminal()
}
