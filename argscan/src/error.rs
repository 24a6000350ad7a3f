// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scan-time error types.
//!
//! `ScanError` mirrors the two-layer shape `yash_syntax::parser::error`
//! uses for `SyntaxError`: a `thiserror`-derived enum whose `Display`
//! delegates to a `default_message` method, so a caller can override
//! individual messages (see [`format_error`]) without re-deriving the whole
//! enum.

use std::fmt;

use thiserror::Error;

/// A single error accumulated while scanning, or produced while finalizing.
///
/// Scanning never aborts on error: every `ScanError` the scanner would have
/// raised is appended to the outcome's error list, and scanning continues
/// with the best recovery behavior documented for that case.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A long flag, negated long flag, or alias-resolved flag name did not
    /// match any declared flag.
    #[error("{}", self.default_message())]
    FlagNotFound {
        input: String,
        corrections: Vec<String>,
        alias_name: Option<char>,
    },
    /// A short alias character has no entry in the alias map.
    #[error("{}", self.default_message())]
    AliasNotFound { input: char },
    /// A flag that awaits a separate value token was never given one,
    /// either because scanning reached end-of-input while it was pending or
    /// because the next token interrupted it.
    #[error("{}", self.default_message())]
    UnsatisfiedFlag {
        external_flag_name: String,
        next_flag_name: Option<String>,
    },
    /// A non-variadic flag received a value after already being set.
    #[error("{}", self.default_message())]
    UnexpectedFlag {
        external_flag_name: String,
        previous_input: String,
        input: String,
    },
    /// A tuple positional received more tokens than it has slots, or an
    /// array positional exceeded its declared maximum.
    #[error("{}", self.default_message())]
    UnexpectedPositional { limit: usize, input: String },
    /// A required positional was never filled.
    #[error("{}", self.default_message())]
    UnsatisfiedPositional {
        placeholder: String,
        minimum: Option<(usize, usize)>,
    },
    /// A negated long flag was given a non-empty inline value.
    #[error("{}", self.default_message())]
    InvalidNegatedFlagSyntax {
        external_flag_name: String,
        value_text: String,
    },
    /// A flag's or positional's parse function rejected its raw input.
    #[error("{}", self.default_message())]
    ArgumentParseError {
        external_flag_name_or_placeholder: String,
        input: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A flag's or positional's raw input was not one of its declared enum
    /// values.
    #[error("{}", self.default_message())]
    EnumValidationError {
        external_flag_name_or_placeholder: String,
        input: String,
        values: Vec<String>,
        corrections: Vec<String>,
    },
}

impl ScanError {
    /// The message used by `Display` absent an [`ErrorOverrides`] override.
    pub fn default_message(&self) -> String {
        match self {
            ScanError::FlagNotFound { input, corrections, alias_name } => match alias_name {
                Some(alias) => format!("No flag registered for --{input} (aliased from -{alias})"),
                None => {
                    let mut msg = format!("No flag registered for --{input}");
                    if !corrections.is_empty() {
                        let prefixed: Vec<String> = corrections.iter().map(|c| format!("--{c}")).collect();
                        msg.push_str(&format!(", did you mean {}?", join_with_or(&prefixed)));
                    }
                    msg
                }
            },
            ScanError::AliasNotFound { input } => format!("No alias registered for -{input}"),
            ScanError::UnsatisfiedFlag { external_flag_name, next_flag_name } => match next_flag_name {
                Some(next) => format!(
                    "Expected input for flag --{external_flag_name} but encountered --{next} instead"
                ),
                None => format!("Expected input for flag --{external_flag_name}"),
            },
            ScanError::UnexpectedFlag { external_flag_name, previous_input, input } => format!(
                "Too many arguments for --{external_flag_name}, encountered {input:?} after {previous_input:?}"
            ),
            ScanError::UnexpectedPositional { limit, input } => {
                format!("Too many arguments, expected {limit} but encountered {input:?}")
            }
            ScanError::UnsatisfiedPositional { placeholder, minimum } => match minimum {
                Some((min, 0)) => format!("Expected at least {min} argument(s) for {placeholder} but found none"),
                Some((min, actual)) => format!(
                    "Expected at least {min} argument(s) for {placeholder} but only found {actual}"
                ),
                None => format!("Expected argument for {placeholder}"),
            },
            ScanError::InvalidNegatedFlagSyntax { external_flag_name, value_text } => format!(
                "Cannot negate flag --{external_flag_name} and pass {value_text:?} as value"
            ),
            ScanError::ArgumentParseError { external_flag_name_or_placeholder, input, cause } => format!(
                "Failed to parse {input:?} for {external_flag_name_or_placeholder}: {cause}"
            ),
            ScanError::EnumValidationError { input, values, corrections, .. } => {
                let mut msg = format!("Expected {input:?} to be one of ({})", values.join("|"));
                if !corrections.is_empty() {
                    msg.push_str(&format!(", did you mean {}?", join_with_or(corrections)));
                }
                msg
            }
        }
    }

    /// A stable tag identifying the variant, used as the key into
    /// [`ErrorOverrides`].
    pub fn tag(&self) -> &'static str {
        match self {
            ScanError::FlagNotFound { .. } => "flag_not_found",
            ScanError::AliasNotFound { .. } => "alias_not_found",
            ScanError::UnsatisfiedFlag { .. } => "unsatisfied_flag",
            ScanError::UnexpectedFlag { .. } => "unexpected_flag",
            ScanError::UnexpectedPositional { .. } => "unexpected_positional",
            ScanError::UnsatisfiedPositional { .. } => "unsatisfied_positional",
            ScanError::InvalidNegatedFlagSyntax { .. } => "invalid_negated_flag_syntax",
            ScanError::ArgumentParseError { .. } => "argument_parse_error",
            ScanError::EnumValidationError { .. } => "enum_validation_error",
        }
    }
}

/// Joins `items` as `"a"`, `"a or b"`, or `"a, b or c"` — the "top suggestions"
/// join rule shared by [`ScanError::FlagNotFound`] and
/// [`ScanError::EnumValidationError`]'s default messages.
fn join_with_or(items: &[String]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, rest)) if rest.is_empty() => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

/// Per-variant message overrides, keyed by [`ScanError::tag`].
///
/// Distinct from [`crate::spec::SpecError`]: spec errors are a caller bug
/// discovered while building a [`crate::spec::CommandSpec`] and are never
/// routed through formatting overrides.
#[derive(Default)]
pub struct ErrorOverrides {
    overrides: std::collections::HashMap<&'static str, Box<dyn Fn(&ScanError) -> String>>,
}

impl ErrorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, tag: &'static str, render: impl Fn(&ScanError) -> String + 'static) -> Self {
        self.overrides.insert(tag, Box::new(render));
        self
    }
}

impl fmt::Debug for ErrorOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorOverrides")
            .field("tags", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Renders `error` using `overrides` where one is registered for its tag,
/// falling back to [`ScanError::default_message`] otherwise.
pub fn format_error(error: &ScanError, overrides: &ErrorOverrides) -> String {
    match overrides.overrides.get(error.tag()) {
        Some(render) => render(error),
        None => error.default_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_includes_correction() {
        let err = ScanError::FlagNotFound {
            input: "fooFlga".to_string(),
            corrections: vec!["fooFlag".to_string()],
            alias_name: None,
        };
        assert_eq!(
            err.default_message(),
            "No flag registered for --fooFlga, did you mean --fooFlag?"
        );
    }

    #[test]
    fn default_message_joins_multiple_corrections_with_or() {
        let err = ScanError::FlagNotFound {
            input: "vebose".to_string(),
            corrections: vec!["verbose".to_string(), "verbosity".to_string()],
            alias_name: None,
        };
        assert_eq!(
            err.default_message(),
            "No flag registered for --vebose, did you mean --verbose or --verbosity?"
        );
    }

    #[test]
    fn aliased_flag_not_found_never_lists_corrections() {
        let err = ScanError::FlagNotFound {
            input: "missing".to_string(),
            corrections: vec!["present".to_string()],
            alias_name: Some('m'),
        };
        assert_eq!(err.default_message(), "No flag registered for --missing (aliased from -m)");
    }

    #[test]
    fn enum_validation_error_includes_suggestions() {
        let err = ScanError::EnumValidationError {
            external_flag_name_or_placeholder: "mode".to_string(),
            input: "fst".to_string(),
            values: vec!["fast".to_string(), "slow".to_string()],
            corrections: vec!["fast".to_string()],
        };
        assert_eq!(
            err.default_message(),
            "Expected \"fst\" to be one of (fast|slow), did you mean fast?"
        );
    }

    #[test]
    fn invalid_negated_flag_syntax_matches_contract() {
        let err = ScanError::InvalidNegatedFlagSyntax {
            external_flag_name: "forceBuild".to_string(),
            value_text: "no".to_string(),
        };
        assert_eq!(
            err.default_message(),
            "Cannot negate flag --forceBuild and pass \"no\" as value"
        );
    }

    #[test]
    fn override_replaces_default_message() {
        let err = ScanError::AliasNotFound { input: 'z' };
        let overrides = ErrorOverrides::new().set("alias_not_found", |_| "nope".to_string());
        assert_eq!(format_error(&err, &overrides), "nope");
    }

    #[test]
    fn unrelated_override_does_not_apply() {
        let err = ScanError::AliasNotFound { input: 'z' };
        let overrides = ErrorOverrides::new().set("flag_not_found", |_| "nope".to_string());
        assert_eq!(format_error(&err, &overrides), err.default_message());
    }
}
