//! Line-oriented prompts for the account and character commands.

use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::utils::masked_input::prompt_masked;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

impl From<io::Error> for UiError {
    fn from(err: io::Error) -> Self {
        UiError::new(err.to_string())
    }
}

/// Terminal prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    /// Read secrets through the raw-mode masked editor.
    masked: bool,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompts on the process's terminal. Secrets are masked when stdin is
    /// a terminal and read as plain lines when it is piped.
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let masked = stdin.is_terminal();
        Self {
            masked,
            ..Self::new(stdin.lock(), io::stdout())
        }
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            masked: false,
        }
    }

    /// Print `prompt` and read one line without its line ending. End of
    /// input is an error.
    fn raw_line(&mut self, prompt: &str) -> Result<String, UiError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut input = String::new();
        if self.input.read_line(&mut input)? == 0 {
            return Err(UiError::new("Input closed"));
        }
        let len = input.trim_end_matches(['\n', '\r']).len();
        input.truncate(len);
        Ok(input)
    }

    /// Print `prompt` and read one trimmed line.
    pub fn line(&mut self, prompt: &str) -> Result<String, UiError> {
        Ok(self.raw_line(prompt)?.trim().to_string())
    }

    pub fn required(&mut self, prompt: &str, field: &str) -> Result<String, UiError> {
        let value = self.line(prompt)?;
        if value.is_empty() {
            return Err(UiError::new(format!("{field} cannot be empty")));
        }
        Ok(value)
    }

    /// Like [`Prompter::line`], but an empty answer keeps `current`.
    pub fn with_default(&mut self, prompt: &str, current: &str) -> Result<String, UiError> {
        let value = self.line(&format!("{prompt} [{current}]: "))?;
        if value.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(value)
        }
    }

    /// Secret entry, returned exactly as typed. On a terminal nothing but
    /// `*` is echoed.
    pub fn password(&mut self, prompt: &str) -> Result<String, UiError> {
        let secret = if self.masked {
            prompt_masked(prompt).map_err(|err| UiError::new(err.to_string()))?
        } else {
            self.raw_line(prompt)?
        };
        if secret.is_empty() {
            return Err(UiError::new("Password cannot be empty"));
        }
        Ok(secret)
    }

    pub fn confirmation(&mut self, prompt: &str) -> Result<ConfirmationChoice, UiError> {
        let answer = self.line(&format!("{prompt} (y/N/c): "))?;
        parse_confirmation(&answer)
    }
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(ConfirmationChoice::No);
    }
    match trimmed.as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "n" | "no" => Ok(ConfirmationChoice::No),
        "c" | "cancel" => Ok(ConfirmationChoice::Cancel),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}
