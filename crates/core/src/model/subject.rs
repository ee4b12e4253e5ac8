use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Topic a question belongs to. The catalog is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    Geography,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("invalid subject: {0}")]
    Invalid(String),
}

impl Subject {
    /// Every subject, in catalog order.
    pub const ALL: [Subject; 5] = [
        Subject::Math,
        Subject::Science,
        Subject::English,
        Subject::History,
        Subject::Geography,
    ];

    /// Canonical name, also used as the persisted value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Geography => "Geography",
        }
    }

    /// Single-letter shorthand accepted by [`Subject::normalize`].
    #[must_use]
    pub fn shorthand(self) -> char {
        match self {
            Subject::Math => 'm',
            Subject::Science => 's',
            Subject::English => 'e',
            Subject::History => 'h',
            Subject::Geography => 'g',
        }
    }

    /// Resolve operator input to a subject.
    ///
    /// Accepts the full name or the shorthand letter in any letter case.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::Invalid` carrying the input for anything else.
    pub fn normalize(input: &str) -> Result<Self, SubjectError> {
        let mut chars = input.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        };

        Self::ALL
            .into_iter()
            .find(|subject| {
                letter == Some(subject.shorthand()) || input.eq_ignore_ascii_case(subject.as_str())
            })
            .ok_or_else(|| SubjectError::Invalid(input.to_string()))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_names_in_any_case_normalize() {
        for subject in Subject::ALL {
            let name = subject.as_str();
            assert_eq!(Subject::normalize(name), Ok(subject));
            assert_eq!(Subject::normalize(&name.to_uppercase()), Ok(subject));
            assert_eq!(Subject::normalize(&name.to_lowercase()), Ok(subject));
        }
        assert_eq!(Subject::normalize("gEoGrApHy"), Ok(Subject::Geography));
    }

    #[test]
    fn shorthands_in_any_case_normalize() {
        let cases = [
            ("m", Subject::Math),
            ("S", Subject::Science),
            ("e", Subject::English),
            ("H", Subject::History),
            ("g", Subject::Geography),
        ];
        for (input, expected) in cases {
            assert_eq!(Subject::normalize(input), Ok(expected));
            assert_eq!(Subject::normalize(&input.to_uppercase()), Ok(expected));
        }
    }

    #[test]
    fn anything_else_is_rejected() {
        for input in ["", "x", "ma", "maths", " math", "math ", "Mathematics", "mm"] {
            assert_eq!(
                Subject::normalize(input),
                Err(SubjectError::Invalid(input.to_string())),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_str_and_display_agree() {
        let subject: Subject = "history".parse().unwrap();
        assert_eq!(subject.to_string(), "History");
    }
}
