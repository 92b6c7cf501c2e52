use anyhow::{bail, Context, Result};
use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

/// Terminal question/answer loop. Generic over the streams so a session can
/// be driven from a script in tests.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        if read == 0 {
            bail!("Input closed while waiting for an answer to: {}", question.trim());
        }
        Ok(line.trim().to_string())
    }

    /// Yes/no question; only "y" or "yes" count as yes.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question)?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Asks for a projected value until it parses.
    pub fn stat<T: Answer>(&mut self, name: &str, season: i32) -> Result<T> {
        loop {
            let answer = self.ask(&format!("Estimated {} for {}: ", name, season))?;
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => writeln!(self.output, "This is not a valid {}!", T::KIND)?,
            }
        }
    }

    pub fn say(&mut self, line: impl std::fmt::Display) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

/// A value that can be typed in at a prompt.
pub trait Answer: FromStr {
    /// Shown when the answer does not parse.
    const KIND: &'static str;
}

impl Answer for u32 {
    const KIND: &'static str = "integer";
}

impl Answer for f64 {
    const KIND: &'static str = "decimal";
}
