// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure token classification: given a raw token and whether the escape
//! sequence has already been consumed, decides its shape without touching
//! any scanner state.

use crate::spec::CommandSpec;

/// The shape of one raw argument token.
#[derive(Debug, Eq, PartialEq)]
pub enum ClassifiedToken<'a> {
    /// The literal `--` escape token.
    Escape,
    /// `--name` or `--name=value`, not a recognized negation form.
    LongFlag { name: &'a str, value: Option<&'a str> },
    /// `--noName` (or `--no-kebab-name`) resolved to the boolean flag it
    /// negates.
    NegatedLongFlag { flag_index: usize, value: Option<&'a str> },
    /// `-abc` or `-abc=value`.
    ShortCluster { cluster: &'a str, value: Option<&'a str> },
    /// Anything else, including every token seen after the escape sequence.
    Positional(&'a str),
}

/// Classifies `token` against `spec`'s negation table.
///
/// `escape_seen` forces every token to [`ClassifiedToken::Positional`],
/// matching the scanner's escape-consumed mode.
pub fn classify<'a>(token: &'a str, escape_seen: bool, spec: &CommandSpec) -> ClassifiedToken<'a> {
    if escape_seen {
        return ClassifiedToken::Positional(token);
    }

    if token == "--" && spec.config().allow_argument_escape_sequence {
        return ClassifiedToken::Escape;
    }

    if let Some(rest) = token.strip_prefix("--") {
        if rest.is_empty() {
            // "--" with escape sequences disabled: treated as an ordinary
            // (almost certainly unresolvable) long flag name, not positional.
            return ClassifiedToken::LongFlag { name: rest, value: None };
        }
        let (name, value) = split_inline_value(rest);
        return match spec.resolve_negation(name) {
            Some(flag_index) => ClassifiedToken::NegatedLongFlag { flag_index, value },
            None => ClassifiedToken::LongFlag { name, value },
        };
    }

    if let Some(rest) = token.strip_prefix('-') {
        if rest.len() >= 1 && !rest.starts_with('-') {
            let (cluster, value) = split_inline_value(rest);
            if !cluster.is_empty() {
                return ClassifiedToken::ShortCluster { cluster, value };
            }
        }
    }

    ClassifiedToken::Positional(token)
}

fn split_inline_value(text: &str) -> (&str, Option<&str>) {
    match text.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{CommandSpec, FlagSpec, PositionalSpec, ScannerConfig};
    use std::collections::HashMap;

    fn spec_with_boolean(name: &str) -> CommandSpec {
        CommandSpec::new(
            vec![FlagSpec::boolean(name, "brief")],
            HashMap::new(),
            PositionalSpec::Tuple(vec![]),
            ScannerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn classifies_long_flag_with_inline_value() {
        let spec = spec_with_boolean("fooFlag");
        assert_eq!(
            classify("--fooFlag=true", false, &spec),
            ClassifiedToken::LongFlag { name: "fooFlag", value: Some("true") }
        );
    }

    #[test]
    fn classifies_negated_long_flag_exactly() {
        let spec = spec_with_boolean("forceBuild");
        assert_eq!(
            classify("--noForceBuild", false, &spec),
            ClassifiedToken::NegatedLongFlag { flag_index: 0, value: None }
        );
        // Lowercase variant must not match: it is a distinct, unresolved name.
        assert_eq!(
            classify("--noforcebuild", false, &spec),
            ClassifiedToken::LongFlag { name: "noforcebuild", value: None }
        );
    }

    #[test]
    fn classifies_short_cluster() {
        let spec = spec_with_boolean("fooFlag");
        assert_eq!(
            classify("-abc=x", false, &spec),
            ClassifiedToken::ShortCluster { cluster: "abc", value: Some("x") }
        );
    }

    #[test]
    fn lone_dash_is_positional() {
        let spec = spec_with_boolean("fooFlag");
        assert_eq!(classify("-", false, &spec), ClassifiedToken::Positional("-"));
    }

    #[test]
    fn escape_token_recognized_only_when_enabled() {
        let spec = spec_with_boolean("fooFlag");
        assert_eq!(classify("--", false, &spec), ClassifiedToken::LongFlag { name: "", value: None });

        let mut config = ScannerConfig::default();
        config.allow_argument_escape_sequence = true;
        let spec = CommandSpec::new(
            vec![FlagSpec::boolean("fooFlag", "brief")],
            HashMap::new(),
            PositionalSpec::Tuple(vec![]),
            config,
        )
        .unwrap();
        assert_eq!(classify("--", false, &spec), ClassifiedToken::Escape);
    }

    #[test]
    fn escape_seen_forces_positional() {
        let spec = spec_with_boolean("fooFlag");
        assert_eq!(classify("--fooFlag", true, &spec), ClassifiedToken::Positional("--fooFlag"));
    }
}
