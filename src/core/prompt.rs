//! Interactive prompting.
//!
//! Input validation ([`parse_selection`], [`parse_yes_no`]) is pure; [`Prompt`]
//! wraps any reader/writer pair so flows can be driven from a terminal or a
//! scripted buffer.

use std::io::{self, BufRead, Write};

/// Why a numbered-menu answer was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The answer is not a plain non-negative number
    NotANumber,
    /// The number does not correspond to an option (1-based)
    OutOfRange(u64),
}

/// Validate an answer to a numbered menu of `len` options.
///
/// Options are numbered from 1; the returned index is 0-based. Only ASCII
/// digits are accepted (no sign, no whitespace inside the answer).
///
/// # Errors
/// Returns [`SelectionError::NotANumber`] or [`SelectionError::OutOfRange`].
pub fn parse_selection(input: &str, len: usize) -> Result<usize, SelectionError> {
    let answer = input.trim_end_matches(['\r', '\n']);
    if answer.is_empty() || !answer.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectionError::NotANumber);
    }
    let Ok(choice) = answer.parse::<u64>() else {
        return Err(SelectionError::OutOfRange(u64::MAX));
    };
    match usize::try_from(choice) {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(SelectionError::OutOfRange(choice)),
    }
}

/// Interpret a `(y/N)` answer: empty or `n...` is no, `y...` is yes,
/// anything else is `None` (ask again).
#[must_use]
pub fn parse_yes_no(input: &str) -> Option<bool> {
    let answer = input.trim().to_lowercase();
    match answer.chars().next() {
        None | Some('n') => Some(false),
        Some('y') => Some(true),
        _ => None,
    }
}

/// A question/answer channel
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process terminal
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prompt reading answers from `input` and writing questions to `output`
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write a line of text
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    /// Show `question` and read one line, without its line ending.
    ///
    /// # Errors
    /// Returns [`io::ErrorKind::UnexpectedEof`] when input is exhausted.
    pub fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask a `(y/N)` question until the answer is understood
    ///
    /// # Errors
    /// Returns an error when input is exhausted.
    pub fn confirm(&mut self) -> io::Result<bool> {
        loop {
            if let Some(answer) = parse_yes_no(&self.ask("(y/N): ")?) {
                return Ok(answer);
            }
        }
    }

    /// Show numbered `options` and ask until a valid one is chosen.
    ///
    /// Returns the 0-based index of the choice.
    ///
    /// # Errors
    /// Returns an error when input is exhausted, or
    /// [`io::ErrorKind::InvalidInput`] if there is nothing to choose from.
    pub fn select(&mut self, options: &[String]) -> io::Result<usize> {
        if options.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "nothing to choose from",
            ));
        }
        for (ix, option) in options.iter().enumerate() {
            writeln!(self.output, "  ({}) {option}", ix + 1)?;
        }
        loop {
            match parse_selection(&self.ask("Selection: ")?, options.len()) {
                Ok(ix) => return Ok(ix),
                Err(SelectionError::OutOfRange(n)) => writeln!(
                    self.output,
                    "{n} not within range, enter a number (i) corresponding to the desired option"
                )?,
                Err(SelectionError::NotANumber) => {}
            }
        }
    }

    /// Output sink, for reports written between questions
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Consume the prompt and return its output sink
    pub fn into_output(self) -> W {
        self.output
    }
}
