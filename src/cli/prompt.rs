//! Interactive window prompt.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the prompt asks the operator for a start/end pair and keeps asking until it
//!   gets a valid window
//!
//! Reader and writer are generic so tests can drive the prompt with in-memory buffers.

use std::io::{BufRead, Write};

use chrono::DateTime;
use chrono_tz::Tz;

use crate::app::window::WindowSource;
use crate::domain::{TimeWindow, parse_civil};
use crate::error::AppError;

/// Prompts for `[start, end)` on `output`, reading answers from `input`.
pub struct InteractiveWindow<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractiveWindow<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask until the answer parses as a CET date-time.
    pub fn prompt_start(&mut self) -> Result<DateTime<Tz>, AppError> {
        loop {
            let answer = self.ask("Enter start date and time (format: YYYY-MM-DD HH:MM): ")?;
            match parse_civil(&answer) {
                Ok(start) => return Ok(start),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    /// Ask until the answer parses and forms a valid window with `start`.
    pub fn prompt_end(&mut self, start: DateTime<Tz>) -> Result<TimeWindow, AppError> {
        loop {
            let answer = self.ask("Enter end date and time (format: YYYY-MM-DD HH:MM): ")?;
            let window = parse_civil(&answer).and_then(|end| TimeWindow::bounded(start, end));
            match window {
                Ok(window) => return Ok(window),
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    /// Ask whether to run again. Only `y`/`Y` continues; EOF counts as no.
    pub fn ask_again(&mut self) -> Result<bool, AppError> {
        let answer = self.read_answer("\nWould you like to analyze another time period? (y/n): ")?;
        Ok(answer.is_some_and(|a| a.eq_ignore_ascii_case("y")))
    }

    fn ask(&mut self, prompt: &str) -> Result<String, AppError> {
        self.read_answer(prompt)?
            .ok_or_else(|| AppError::new(2, "No input received."))
    }

    /// Show `prompt` and read one trimmed line; `None` on end of input.
    fn read_answer(&mut self, prompt: &str) -> Result<Option<String>, AppError> {
        write!(self.output, "{prompt}")
            .and_then(|()| self.output.flush())
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut line = String::new();
        let bytes = self
            .input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&mut self, message: &str) -> Result<(), AppError> {
        writeln!(self.output, "{message}")
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))
    }
}

impl<R: BufRead, W: Write> WindowSource for InteractiveWindow<R, W> {
    fn resolve(&mut self) -> Result<TimeWindow, AppError> {
        let start = self.prompt_start()?;
        self.prompt_end(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(input: &str) -> (Result<TimeWindow, AppError>, String) {
        let mut out = Vec::new();
        let result = InteractiveWindow::new(Cursor::new(input.as_bytes()), &mut out).resolve();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn accepts_valid_window() {
        let (result, out) = run("2024-09-23 00:00\n2024-09-29 00:00\n");
        let window = result.unwrap();
        assert_eq!(window.start(), parse_civil("2024-09-23 00:00").unwrap());
        assert_eq!(window.end(), parse_civil("2024-09-29 00:00").unwrap());
        assert!(out.starts_with("Enter start date and time (format: YYYY-MM-DD HH:MM): "));
        assert!(out.contains("Enter end date and time (format: YYYY-MM-DD HH:MM): "));
    }

    #[test]
    fn reprompts_on_bad_format() {
        let (result, out) = run("tomorrow\n2024-09-23\n2024-09-23 00:00\n2024-09-24 00:00\n");
        assert!(result.is_ok());
        assert_eq!(
            out.matches("Invalid date format. Please use YYYY-MM-DD HH:MM format.").count(),
            2
        );
    }

    #[test]
    fn reprompts_when_end_not_after_start() {
        let (result, out) = run("2024-09-23 00:00\n2024-09-23 00:00\n2024-09-22 12:00\n2024-09-23 01:00\n");
        assert_eq!(result.unwrap().end(), parse_civil("2024-09-23 01:00").unwrap());
        assert_eq!(out.matches("End date must be after start date. Please try again.").count(), 2);
    }

    #[test]
    fn reprompts_when_span_exceeds_thirty_days() {
        let (result, out) = run("2024-06-01 00:00\n2024-07-01 00:01\n2024-07-01 00:00\n");
        assert_eq!(result.unwrap().end(), parse_civil("2024-07-01 00:00").unwrap());
        assert_eq!(
            out.matches("Time range cannot exceed 30 days. Please enter a closer date.").count(),
            1
        );
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (result, _) = run("2024-09-23 00:00\n");
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn ask_again_only_on_yes() {
        for (input, expected) in [("y\n", true), ("Y\n", true), ("n\n", false), ("yes\n", false), ("", false)] {
            let mut out = Vec::new();
            let mut prompt = InteractiveWindow::new(Cursor::new(input.as_bytes()), &mut out);
            assert_eq!(prompt.ask_again().unwrap(), expected, "{input:?}");
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FailingInput;

    impl std::io::Read for FailingInput {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device error"))
        }
    }

    #[test]
    fn ask_again_propagates_io_failures() {
        let mut prompt = InteractiveWindow::new(Cursor::new(b"y\n".as_slice()), BrokenPipe);
        let err = prompt.ask_again().unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Failed to write prompt"));

        let mut out = Vec::new();
        let mut prompt = InteractiveWindow::new(std::io::BufReader::new(FailingInput), &mut out);
        let err = prompt.ask_again().unwrap_err();
        assert!(err.to_string().contains("Failed to read input"));
    }
}
