use std::path::PathBuf;
use std::fmt::Display;

use crate::grammar::Symbol;

pub trait ErrorType: Display + PartialEq {}

/// Where an error was found: the source file and line of a production, and
/// the non-terminal being defined or expanded when one is known.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Location {
    pub file: PathBuf,
    // Zero for errors about the whole source
    pub line: usize,
    pub head: Option<Symbol>
}

impl Location {
    pub fn new(file: PathBuf, line: usize) -> Self {
        Location { file, line, head: None }
    }

    // Errors that only concern a non-terminal, such as generation failures
    pub fn in_head(head: Symbol) -> Self {
        Location { head: Some(head), ..Location::default() }
    }

    pub fn with_head(self, head: Symbol) -> Self {
        Location { head: Some(head), ..self }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.file.as_os_str().is_empty(), self.line) {
            (true, 0) => {}
            // Grammars built from in-memory lines have no file
            (true, line) => write!(f, "line {}", line)?,
            (false, 0) => write!(f, "{}", self.file.display())?,
            (false, line) => write!(f, "{}:{}", self.file.display(), line)?,
        }

        match self.head {
            Some(head) if self.file.as_os_str().is_empty() && self.line == 0 => write!(f, "`{}`", head),
            Some(head) => write!(f, " in `{}`", head),
            None => Ok(()),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

pub type Errors<T> = Vec<Error<T>>;
