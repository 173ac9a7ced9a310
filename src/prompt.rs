use std::io::{self, BufRead, Write};
use zeroize::Zeroizing;

/// Interactive input needed by wallet commands.
pub trait Prompt {
    /// Read a secret without echoing it.
    fn password(&mut self, prompt: &str) -> io::Result<Zeroizing<String>>;

    /// Read a line of ordinary input, without the trailing newline.
    fn input(&mut self, prompt: &str) -> io::Result<String>;
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn password(&mut self, prompt: &str) -> io::Result<Zeroizing<String>> {
        rpassword::prompt_password(prompt).map(Zeroizing::new)
    }

    fn input(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
