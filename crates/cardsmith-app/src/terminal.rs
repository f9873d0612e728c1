//! Terminal-backed prompts and a logging sound player.

use cardsmith_core::{SoundEffect, SoundPlayer, UserPrompt};
use std::cell::RefCell;
use std::io::{BufRead, Write};

/// Asks the user on the terminal. With `assume_yes`, confirmations never block.
pub struct TerminalPrompt<R> {
    input: RefCell<R>,
    assume_yes: bool,
}

impl<R: BufRead> TerminalPrompt<R> {
    pub fn new(input: R, assume_yes: bool) -> Self {
        Self {
            input: RefCell::new(input),
            assume_yes,
        }
    }

    fn ask(&self, message: &str) -> Option<String> {
        print!("{} ", message);
        if let Err(e) = std::io::stdout().flush() {
            log::warn!("Failed to flush stdout: {}", e);
        }
        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead> UserPrompt for TerminalPrompt<R> {
    fn alert(&self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        self.ask(&format!("{} [y/N]", message))
            .map(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn prompt_text(&self, message: &str) -> Option<String> {
        self.ask(message).filter(|text| !text.trim().is_empty())
    }
}

/// Logs sound effects instead of playing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSoundPlayer;

impl SoundPlayer for LogSoundPlayer {
    fn play(&self, effect: SoundEffect) {
        log::debug!("Sound: {} ({})", effect.name(), effect.asset_path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_confirm_reads_answer() {
        let prompt = TerminalPrompt::new(Cursor::new("y\nno\nYES\n"), false);
        assert!(prompt.confirm("Start over?"));
        assert!(!prompt.confirm("Start over?"));
        assert!(prompt.confirm("Start over?"));
        // End of input declines.
        assert!(!prompt.confirm("Start over?"));
    }

    #[test]
    fn test_assume_yes_skips_input() {
        let prompt = TerminalPrompt::new(Cursor::new(""), true);
        assert!(prompt.confirm("Start over?"));
    }

    #[test]
    fn test_prompt_text() {
        let prompt = TerminalPrompt::new(Cursor::new("Hello there\r\n\n"), false);
        assert_eq!(prompt.prompt_text("Enter text:").as_deref(), Some("Hello there"));
        assert_eq!(prompt.prompt_text("Enter text:"), None);
        assert_eq!(prompt.prompt_text("Enter text:"), None);
    }
}
