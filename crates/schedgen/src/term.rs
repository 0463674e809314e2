//! Translation of human-readable term names into catalog semester codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TermError {
    #[error("Invalid semester: {0}")]
    UnknownTerm(String),

    #[error("Invalid year: {0}")]
    BadYear(String),
}

/// An academic term. The discriminant is the catalog's term digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Winter = 0,
    Spring = 1,
    Summer = 7,
    Fall = 9,
}

impl Term {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Term::Winter => "winter",
            Term::Spring => "spring",
            Term::Summer => "summer",
            Term::Fall => "fall",
        }
    }
}

impl FromStr for Term {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(Term::Winter),
            "spring" => Ok(Term::Spring),
            "summer" => Ok(Term::Summer),
            "fall" => Ok(Term::Fall),
            _ => Err(TermError::UnknownTerm(s.to_string())),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A term in a specific year, e.g. fall 2024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Semester {
    pub term: Term,
    pub year: u16,
}

impl Semester {
    /// Parses a term name and a four-digit year.
    pub fn parse(term: &str, year: &str) -> Result<Self, TermError> {
        let term = term.parse::<Term>()?;
        let year = year.trim();
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TermError::BadYear(year.to_string()));
        }
        let year = year
            .parse::<u16>()
            .map_err(|_| TermError::BadYear(year.to_string()))?;

        Ok(Self { term, year })
    }

    /// The catalog's semester code: term digit followed by the year (fall 2024 is `92024`).
    pub fn code(&self) -> String {
        format!("{}{}", self.term.code(), self.year)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.term, self.year)
    }
}
