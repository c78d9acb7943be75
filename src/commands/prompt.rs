//! Interactive terminal prompts

use crate::error::{Error, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, queue};
use std::io::{self, IsTerminal, Write};

/// Decide whether a confirmation prompt has to be shown.
///
/// `assume_yes` skips the prompt; otherwise a TTY is required.
pub fn needs_prompt(is_tty: bool, assume_yes: bool, hint: &str) -> Result<bool> {
    if assume_yes {
        return Ok(false);
    }
    if !is_tty {
        return Err(Error::Config(format!("stdin is not a TTY. {}", hint)));
    }
    Ok(true)
}

pub fn stdin_is_tty() -> bool {
    io::stdin().is_terminal()
}

/// Arrow-key yes/no question
pub fn prompt_confirm(label: &str, default: bool) -> Result<bool> {
    let options = ["Yes", "No"];
    let selected = prompt_select(label, &options, if default { 0 } else { 1 })?;
    Ok(selected == 0)
}

/// Arrow-key menu; returns the chosen index.
pub fn prompt_select(label: &str, options: &[impl AsRef<str>], default_index: usize) -> Result<usize> {
    if options.is_empty() {
        return Err(Error::Validation("Nothing to choose from".to_string()));
    }

    let mut stdout = io::stdout();
    let mut selected = default_index.min(options.len() - 1);
    let _raw_mode = RawModeGuard::new()?;

    queue!(stdout, cursor::Hide)?;
    write!(stdout, "{}\r\n", label.bold())?;

    loop {
        draw_options(&mut stdout, options, selected)?;

        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Up | KeyCode::Char('k') => selected = selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if selected + 1 < options.len() {
                    selected += 1;
                }
            }
            KeyCode::Enter => return Ok(selected),
            KeyCode::Esc => return Ok(default_index.min(options.len() - 1)),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(Error::Validation("Cancelled".to_string()));
            }
            _ => {}
        }

        queue!(
            stdout,
            cursor::MoveUp(options.len() as u16),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
    }
}

fn draw_options(out: &mut impl Write, options: &[impl AsRef<str>], selected: usize) -> Result<()> {
    for (idx, option) in options.iter().enumerate() {
        if idx == selected {
            write!(out, "{} {}\r\n", "›".cyan(), option.as_ref().bold())?;
        } else {
            write!(out, "  {}\r\n", option.as_ref())?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Line prompt with a default; re-asks until `validate` accepts.
pub fn prompt_string<F>(label: &str, default: &str, validate: F) -> Result<String>
where
    F: Fn(&str) -> std::result::Result<(), String>,
{
    loop {
        print!("{} [{}]: ", label, default);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.to_string());
        }
        let value = match input.trim() {
            "" => default,
            value => value,
        };

        match validate(value) {
            Ok(()) => return Ok(value.to_string()),
            Err(message) => println!("{}", message),
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_prompt() {
        assert!(!needs_prompt(false, true, "").unwrap());
        assert!(needs_prompt(true, false, "").unwrap());

        let err = needs_prompt(false, false, "Use --yes.").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: stdin is not a TTY. Use --yes."
        );
    }

    #[test]
    fn test_draw_options_marks_selection() {
        let mut out = Vec::new();
        draw_options(&mut out, &["Yes", "No"], 1).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<_> = text.split("\r\n").collect();
        assert_eq!(lines[0], "  Yes");
        assert!(lines[1].contains('›'));
        assert!(lines[1].contains("No"));
    }
}
