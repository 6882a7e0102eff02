use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rwbot_core::review::ReviewPrompt;

/// Interactive prompt on the controlling terminal. Single-character choices
/// are read as raw keypresses; the batch-confirmation phrase is a full line.
pub struct TerminalPrompt;

impl ReviewPrompt for TerminalPrompt {
    fn show(&mut self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }

    fn read_key(&mut self) -> Result<char> {
        terminal::enable_raw_mode().context("failed to enable raw terminal mode")?;
        let key = next_key_press();
        terminal::disable_raw_mode().context("failed to disable raw terminal mode")?;
        key
    }

    fn read_line(&mut self) -> Result<String> {
        io::stdout().flush().context("failed to flush stdout")?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read confirmation line")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn next_key_press() -> Result<char> {
    loop {
        match event::read().context("failed to read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    bail!("interrupted");
                }
                if let KeyCode::Char(ch) = key.code {
                    return Ok(ch);
                }
            }
            _ => {}
        }
    }
}
