//! Single-line secret entry for interactive prompts.
//!
//! Runs the terminal in raw mode and echoes one `*` per character, so the
//! secret never appears on screen. The value is returned exactly as typed.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskedState {
    pub text: String,
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedAction {
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    ClearAll,
    Paste(String),
    Submit,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskedOutcome {
    Continue { redraw: bool },
    Submit(String),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MaskedInputError {
    message: String,
}

impl MaskedInputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for MaskedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MaskedInputError {}

impl From<io::Error> for MaskedInputError {
    fn from(err: io::Error) -> Self {
        MaskedInputError::new(err.to_string())
    }
}

/// Read a secret from the terminal. Esc or Ctrl+C cancels.
pub fn prompt_masked(prompt: &str) -> Result<String, MaskedInputError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, event::EnableBracketedPaste)?;

    let result = (|| -> Result<String, MaskedInputError> {
        let mut state = MaskedState::default();
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                redraw_line(prompt, &state)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => map_key_event(&key),
                Event::Paste(text) => Some(MaskedAction::Paste(text)),
                _ => None,
            };
            if let Some(action) = action {
                match apply_action(&mut state, action) {
                    MaskedOutcome::Continue { redraw } => needs_redraw = redraw,
                    MaskedOutcome::Submit(value) => break Ok(value),
                    MaskedOutcome::Cancelled => break Err(MaskedInputError::new("Cancelled by user")),
                }
            }
        }
    })();

    // Restore the terminal even when reading failed; report the first error.
    let disable_raw_result = disable_raw_mode().map_err(MaskedInputError::from);
    let disable_paste_result =
        execute!(stdout, event::DisableBracketedPaste).map_err(MaskedInputError::from);
    println!();

    result.and_then(|value| {
        disable_raw_result?;
        disable_paste_result?;
        Ok(value)
    })
}

fn redraw_line(prompt: &str, state: &MaskedState) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[K{}{}", prompt, masked_display(state))?;

    let cursor_columns = prompt.chars().count() + state.cursor;
    if cursor_columns > 0 {
        write!(stdout, "\r\x1b[{cursor_columns}C")?;
    } else {
        write!(stdout, "\r")?;
    }
    stdout.flush()
}

pub fn masked_display(state: &MaskedState) -> String {
    "*".repeat(state.text.chars().count())
}

pub fn map_key_event(key: &event::KeyEvent) -> Option<MaskedAction> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(MaskedAction::Submit),
        KeyCode::Esc => Some(MaskedAction::Cancel),
        KeyCode::Backspace => Some(MaskedAction::Backspace),
        KeyCode::Delete => Some(MaskedAction::Delete),
        KeyCode::Left => Some(MaskedAction::MoveLeft),
        KeyCode::Right => Some(MaskedAction::MoveRight),
        KeyCode::Home => Some(MaskedAction::MoveStart),
        KeyCode::End => Some(MaskedAction::MoveEnd),
        KeyCode::Char('a') if control => Some(MaskedAction::MoveStart),
        KeyCode::Char('e') if control => Some(MaskedAction::MoveEnd),
        KeyCode::Char('u') if control => Some(MaskedAction::ClearAll),
        KeyCode::Char('c') if control => Some(MaskedAction::Cancel),
        KeyCode::Char('\n' | '\r') => Some(MaskedAction::Submit),
        KeyCode::Char(c) if !control => Some(MaskedAction::Insert(c)),
        _ => None,
    }
}

pub fn apply_action(state: &mut MaskedState, action: MaskedAction) -> MaskedOutcome {
    let len = state.text.chars().count();
    match action {
        MaskedAction::Insert(c) => {
            let byte_idx = char_to_byte_index(&state.text, state.cursor);
            state.text.insert(byte_idx, c);
            state.cursor += 1;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::Backspace if state.cursor > 0 => {
            let end = char_to_byte_index(&state.text, state.cursor);
            let start = char_to_byte_index(&state.text, state.cursor - 1);
            state.text.replace_range(start..end, "");
            state.cursor -= 1;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::Delete if state.cursor < len => {
            let start = char_to_byte_index(&state.text, state.cursor);
            let end = char_to_byte_index(&state.text, state.cursor + 1);
            state.text.replace_range(start..end, "");
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::MoveLeft if state.cursor > 0 => {
            state.cursor -= 1;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::MoveRight if state.cursor < len => {
            state.cursor += 1;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::MoveStart if state.cursor > 0 => {
            state.cursor = 0;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::MoveEnd if state.cursor < len => {
            state.cursor = len;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::ClearAll if !state.text.is_empty() => {
            state.text.clear();
            state.cursor = 0;
            MaskedOutcome::Continue { redraw: true }
        }
        MaskedAction::Paste(text) => {
            let first_line = text.split(['\n', '\r']).next().unwrap_or("");
            let pasted: String = first_line.chars().filter(|c| !c.is_control()).collect();
            if !pasted.is_empty() {
                let byte_idx = char_to_byte_index(&state.text, state.cursor);
                state.text.insert_str(byte_idx, &pasted);
                state.cursor += pasted.chars().count();
            }
            if text.contains(['\n', '\r']) {
                MaskedOutcome::Submit(state.text.clone())
            } else {
                MaskedOutcome::Continue {
                    redraw: !pasted.is_empty(),
                }
            }
        }
        MaskedAction::Submit => MaskedOutcome::Submit(state.text.clone()),
        MaskedAction::Cancel => MaskedOutcome::Cancelled,
        _ => MaskedOutcome::Continue { redraw: false },
    }
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}
