use std::io::{self, BufRead, IsTerminal, Write};

use secrecy::SecretString;

/// Where the interaction loop reads answers and writes messages.
/// A `None` answer means input is exhausted.
pub trait Console {
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>>;

    /// Like [`Console::prompt`], without echoing the answer where possible.
    fn prompt_hidden(&mut self, prompt: &str) -> io::Result<Option<SecretString>>;

    fn out(&mut self) -> &mut dyn Write;
}

/// The process's stdin/stdout.
pub struct Terminal {
    stdout: io::Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Terminal {
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.stdout, "{}", prompt)?;
        self.stdout.flush()?;
        read_answer(&mut io::stdin().lock())
    }

    fn prompt_hidden(&mut self, prompt: &str) -> io::Result<Option<SecretString>> {
        if !io::stdin().is_terminal() {
            return Ok(self.prompt(prompt)?.map(SecretString::new));
        }
        self.stdout.flush()?;
        match rpassword::prompt_password(prompt) {
            Ok(answer) => Ok(Some(SecretString::new(answer))),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn out(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
}

#[cfg(test)]
/// Answers come from `input`, prompts and messages go to `output`.
pub struct Scripted<R, W> {
    input: R,
    output: W,
}

#[cfg(test)]
impl<R: BufRead, W: Write> Scripted<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
impl<R: BufRead, W: Write> Console for Scripted<R, W> {
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        read_answer(&mut self.input)
    }

    fn prompt_hidden(&mut self, prompt: &str) -> io::Result<Option<SecretString>> {
        Ok(self.prompt(prompt)?.map(SecretString::new))
    }

    fn out(&mut self) -> &mut dyn Write {
        &mut self.output
    }
}

/// Reads one line and strips its line ending. Other whitespace is kept.
fn read_answer(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
