// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scanning state machine: feed tokens one at a time with [`Scanner::next`],
//! then consume `self` with [`Scanner::parse_arguments`] to finalize.
//!
//! Taking `self` by value at finalization (rather than `&self`) makes
//! "finalize exactly once" a compile-time property: there is no handle left
//! to call `next` again afterward.

use std::any::Any;
use std::collections::HashMap;

use crate::classify::{classify, ClassifiedToken};
use crate::error::ScanError;
use crate::spec::{CommandSpec, DefaultValue, FlagKind, PositionalSpec, Variadic};

#[derive(Clone, Debug)]
struct BoolState {
    value: bool,
    explicit: bool,
    last_raw: String,
}

impl Default for BoolState {
    fn default() -> Self {
        BoolState { value: false, explicit: false, last_raw: String::new() }
    }
}

#[derive(Clone, Debug)]
enum Accumulator {
    Unset,
    Single(String),
    Multi(Vec<String>),
}

impl Accumulator {
    fn is_set(&self) -> bool {
        !matches!(self, Accumulator::Unset)
    }
}

/// One flag's final, type-erased value.
pub enum FlagValue {
    Bool(bool),
    Counter(u64),
    Single(Box<dyn Any>),
    Multi(Vec<Box<dyn Any>>),
    Enum(String),
    EnumMulti(Vec<String>),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_counter(&self) -> Option<u64> {
        match self {
            FlagValue::Counter(c) => Some(*c),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            FlagValue::Single(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_multi<T: 'static>(&self) -> Option<Vec<&T>> {
        match self {
            FlagValue::Multi(vs) => vs.iter().map(|v| v.downcast_ref::<T>()).collect(),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            FlagValue::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_enum_multi(&self) -> Option<&[String]> {
        match self {
            FlagValue::EnumMulti(vs) => Some(vs.as_slice()),
            _ => None,
        }
    }
}

/// Positional results, shaped per the declared [`PositionalSpec`].
pub enum PositionalValues {
    Tuple(Vec<Option<Box<dyn Any>>>),
    Array(Vec<Box<dyn Any>>),
}

/// The result of [`Scanner::parse_arguments`].
pub struct ScanOutcome {
    pub success: bool,
    pub flags: HashMap<String, FlagValue>,
    pub positionals: PositionalValues,
    pub errors: Vec<ScanError>,
}

/// Scans a sequence of raw argument tokens against a [`CommandSpec`].
pub struct Scanner<'a> {
    spec: &'a CommandSpec,
    bool_states: Vec<BoolState>,
    counter_states: Vec<u64>,
    value_states: Vec<Accumulator>,
    value_events: Vec<(usize, String)>,
    positional_raw: Vec<String>,
    escape_seen: bool,
    pending: Option<usize>,
    errors: Vec<ScanError>,
}

impl<'a> Scanner<'a> {
    pub fn new(spec: &'a CommandSpec) -> Self {
        let n = spec.flags().len();
        Scanner {
            spec,
            bool_states: vec![BoolState::default(); n],
            counter_states: vec![0; n],
            value_states: (0..n).map(|_| Accumulator::Unset).collect(),
            value_events: Vec::new(),
            positional_raw: Vec::new(),
            escape_seen: false,
            pending: None,
            errors: Vec::new(),
        }
    }

    /// Feeds one raw argument token into the scanner.
    pub fn next(&mut self, token: &str) {
        if let Some(idx) = self.pending {
            self.handle_pending(idx, token);
            return;
        }

        match classify(token, self.escape_seen, self.spec) {
            ClassifiedToken::Escape => self.escape_seen = true,
            ClassifiedToken::LongFlag { name, value } => self.handle_long_flag(name, value),
            ClassifiedToken::NegatedLongFlag { flag_index, value } => {
                self.handle_negated_long_flag(flag_index, value)
            }
            ClassifiedToken::ShortCluster { cluster, value } => self.handle_short_cluster(cluster, value),
            ClassifiedToken::Positional(text) => self.handle_positional(text),
        }
    }

    fn handle_pending(&mut self, idx: usize, token: &str) {
        match classify(token, false, self.spec) {
            ClassifiedToken::Positional(text) => {
                self.consume_value(idx, text.to_string());
                self.pending = None;
            }
            _ if self.spec.flags()[idx].kind.infer_empty() => {
                self.consume_value(idx, String::new());
                self.pending = None;
                self.next(token);
            }
            other => {
                let next_flag_name = next_flag_name_of(&other, self.spec);
                self.errors.push(ScanError::UnsatisfiedFlag {
                    external_flag_name: self.spec.flags()[idx].external_name.clone(),
                    next_flag_name,
                });
                self.pending = None;
                self.next(token);
            }
        }
    }

    fn handle_long_flag(&mut self, name: &str, value: Option<&str>) {
        match self.spec.resolve_wire_name(name) {
            Some(idx) => self.apply_flag_occurrence(idx, value),
            None => {
                let candidates = self.spec.visible_wire_names(false);
                let opts = self.spec.config().distance_options;
                let corrections =
                    argscan_distance::corrections(name, candidates, &opts.weights, opts.threshold)
                        .into_iter()
                        .map(String::from)
                        .collect();
                self.errors.push(ScanError::FlagNotFound {
                    input: name.to_string(),
                    corrections,
                    alias_name: None,
                });
            }
        }
    }

    fn handle_negated_long_flag(&mut self, flag_index: usize, value: Option<&str>) {
        if let Some(text) = value {
            if !text.is_empty() {
                self.errors.push(ScanError::InvalidNegatedFlagSyntax {
                    external_flag_name: self.spec.flags()[flag_index].external_name.clone(),
                    value_text: text.to_string(),
                });
                return;
            }
        }
        let state = &mut self.bool_states[flag_index];
        state.value = false;
        state.explicit = true;
        state.last_raw = "false".to_string();
    }

    fn handle_short_cluster(&mut self, cluster: &str, value: Option<&str>) {
        let chars: Vec<char> = cluster.chars().collect();
        for (i, c) in chars.iter().enumerate() {
            let is_last = i == chars.len() - 1;
            let Some(external_name) = self.spec.aliases.get(c).cloned() else {
                self.errors.push(ScanError::AliasNotFound { input: *c });
                continue;
            };
            let Some(idx) = self.spec.resolve_external_name(&external_name) else {
                self.errors.push(ScanError::FlagNotFound {
                    input: external_name,
                    corrections: Vec::new(),
                    alias_name: Some(*c),
                });
                continue;
            };
            let needs_value = self.spec.flags()[idx].kind.needs_separate_value();
            if is_last {
                self.apply_flag_occurrence(idx, value);
            } else if needs_value {
                self.errors.push(ScanError::UnsatisfiedFlag {
                    external_flag_name: self.spec.flags()[idx].external_name.clone(),
                    next_flag_name: None,
                });
                return;
            } else {
                self.apply_flag_occurrence(idx, None);
            }
        }
    }

    fn handle_positional(&mut self, token: &str) {
        match self.spec.positionals() {
            PositionalSpec::Tuple(params) => {
                if self.positional_raw.len() < params.len() {
                    self.positional_raw.push(token.to_string());
                } else {
                    self.errors.push(ScanError::UnexpectedPositional {
                        limit: params.len(),
                        input: token.to_string(),
                    });
                }
            }
            PositionalSpec::Array { maximum, .. } => {
                if let Some(max) = maximum {
                    if self.positional_raw.len() >= *max {
                        self.errors.push(ScanError::UnexpectedPositional {
                            limit: *max,
                            input: token.to_string(),
                        });
                        return;
                    }
                }
                self.positional_raw.push(token.to_string());
            }
        }
    }

    fn apply_flag_occurrence(&mut self, idx: usize, value: Option<&str>) {
        match &self.spec.flags()[idx].kind {
            FlagKind::Boolean => self.apply_boolean(idx, value),
            FlagKind::Counter => self.apply_counter(idx, value),
            FlagKind::Parsed { .. } | FlagKind::Enum { .. } => self.apply_value_kind(idx, value),
        }
    }

    fn apply_boolean(&mut self, idx: usize, value: Option<&str>) {
        let name = self.spec.flags()[idx].external_name.clone();
        match value {
            None => {
                let was_explicit = self.bool_states[idx].explicit;
                self.bool_states[idx] = BoolState { value: true, explicit: true, last_raw: "true".to_string() };
                if was_explicit {
                    self.errors.push(ScanError::UnexpectedFlag {
                        external_flag_name: name,
                        previous_input: "true".to_string(),
                        input: "true".to_string(),
                    });
                }
            }
            Some(text) => match parse_bool_literal(text) {
                Some(b) => {
                    let state = &self.bool_states[idx];
                    if state.explicit {
                        let previous_input = state.last_raw.clone();
                        self.errors.push(ScanError::UnexpectedFlag {
                            external_flag_name: name,
                            previous_input,
                            input: text.to_string(),
                        });
                    }
                    self.bool_states[idx] = BoolState { value: b, explicit: true, last_raw: text.to_string() };
                }
                None => self.errors.push(ScanError::ArgumentParseError {
                    external_flag_name_or_placeholder: name,
                    input: text.to_string(),
                    cause: Box::new(InvalidBoolean),
                }),
            },
        }
    }

    fn apply_counter(&mut self, idx: usize, value: Option<&str>) {
        match value {
            None => self.counter_states[idx] += 1,
            Some(text) => match text.parse::<u64>() {
                Ok(n) => self.counter_states[idx] = n,
                Err(_) => self.errors.push(ScanError::ArgumentParseError {
                    external_flag_name_or_placeholder: self.spec.flags()[idx].external_name.clone(),
                    input: text.to_string(),
                    cause: Box::new(InvalidCounter),
                }),
            },
        }
    }

    fn apply_value_kind(&mut self, idx: usize, value: Option<&str>) {
        match value {
            Some(text) => self.consume_value(idx, text.to_string()),
            None => self.pending = Some(idx),
        }
    }

    fn consume_value(&mut self, idx: usize, raw: String) {
        let variadic = self.spec.flags()[idx].kind.variadic();
        match variadic {
            Variadic::False => match &self.value_states[idx] {
                Accumulator::Unset => {
                    self.value_events.push((idx, raw.clone()));
                    self.value_states[idx] = Accumulator::Single(raw);
                }
                Accumulator::Single(prior) => {
                    let previous_input = prior.clone();
                    self.errors.push(ScanError::UnexpectedFlag {
                        external_flag_name: self.spec.flags()[idx].external_name.clone(),
                        previous_input,
                        input: raw,
                    });
                }
                Accumulator::Multi(_) => unreachable!("non-variadic flag never becomes Multi"),
            },
            Variadic::True => self.push_multi(idx, raw),
            Variadic::Separator(sep) => {
                let pieces: Vec<String> = raw.split(sep).map(String::from).collect();
                for piece in pieces {
                    self.push_multi(idx, piece);
                }
            }
        }
    }

    fn push_multi(&mut self, idx: usize, raw: String) {
        self.value_events.push((idx, raw.clone()));
        match &mut self.value_states[idx] {
            Accumulator::Unset => self.value_states[idx] = Accumulator::Multi(vec![raw]),
            Accumulator::Multi(v) => v.push(raw),
            Accumulator::Single(_) => unreachable!("variadic flag never becomes Single"),
        }
    }

    /// Proposes completions for `partial`, the in-progress token not yet
    /// fed to [`Scanner::next`]. Consumes `self` for the same reason
    /// [`Scanner::parse_arguments`] does: completion and further scanning
    /// are mutually exclusive uses of the accumulated state.
    pub fn propose_completions(
        self,
        partial: &str,
        config: &crate::spec::CompletionConfig,
    ) -> Result<Vec<crate::complete::Completion>, ScanError> {
        let already_set = |idx: usize| match &self.spec.flags()[idx].kind {
            FlagKind::Boolean => self.bool_states[idx].explicit,
            FlagKind::Counter => self.counter_states[idx] > 0,
            FlagKind::Parsed { .. } | FlagKind::Enum { .. } => self.value_states[idx].is_set(),
        };
        crate::complete::propose(self.spec, partial, self.escape_seen, self.pending, &already_set, config)
    }

    /// Finalizes the scan: closes any pending flag, applies declared
    /// defaults to everything still unset, checks required flags and
    /// positionals, and runs every parse/enum-membership check.
    pub fn parse_arguments(mut self) -> ScanOutcome {
        let mut errors = std::mem::take(&mut self.errors);

        let closed_pending = self.pending.take();
        if let Some(idx) = closed_pending {
            errors.push(ScanError::UnsatisfiedFlag {
                external_flag_name: self.spec.flags()[idx].external_name.clone(),
                next_flag_name: None,
            });
        }

        let positional_errors = self.finalize_positional_defaults();
        let flag_errors = self.finalize_flag_defaults(closed_pending);

        errors.extend(positional_errors);
        errors.extend(flag_errors);

        let (flags, mut parse_errors) = self.build_flag_values();
        let (positionals, positional_parse_errors) = self.build_positional_values();
        parse_errors.extend(positional_parse_errors);

        errors.extend(parse_errors);

        ScanOutcome { success: errors.is_empty(), flags, positionals, errors }
    }

    fn finalize_flag_defaults(&mut self, skip: Option<usize>) -> Vec<ScanError> {
        let mut errors = Vec::new();
        for idx in 0..self.spec.flags().len() {
            if Some(idx) == skip {
                continue;
            }
            let flag = &self.spec.flags()[idx];
            match &flag.kind {
                FlagKind::Boolean => {
                    if !self.bool_states[idx].explicit {
                        match &flag.default {
                            Some(DefaultValue::Single(text)) => match parse_bool_literal(text) {
                                Some(b) => self.bool_states[idx] = BoolState { value: b, explicit: false, last_raw: text.clone() },
                                None => errors.push(ScanError::ArgumentParseError {
                                    external_flag_name_or_placeholder: flag.external_name.clone(),
                                    input: text.clone(),
                                    cause: Box::new(InvalidBoolean),
                                }),
                            },
                            // A Multi default makes no sense for a boolean; treat it like no
                            // default was declared at all.
                            Some(DefaultValue::Multi(_)) | None => {
                                if !flag.optional {
                                    errors.push(ScanError::UnsatisfiedFlag {
                                        external_flag_name: flag.external_name.clone(),
                                        next_flag_name: None,
                                    });
                                }
                            }
                        }
                    }
                }
                FlagKind::Counter => {
                    if self.counter_states[idx] == 0 {
                        if let Some(DefaultValue::Single(text)) = &flag.default {
                            match text.parse::<u64>() {
                                Ok(n) => self.counter_states[idx] = n,
                                Err(_) => errors.push(ScanError::ArgumentParseError {
                                    external_flag_name_or_placeholder: flag.external_name.clone(),
                                    input: text.clone(),
                                    cause: Box::new(InvalidCounter),
                                }),
                            }
                        } else if flag.default.is_none() && !flag.optional {
                            errors.push(ScanError::UnsatisfiedFlag {
                                external_flag_name: flag.external_name.clone(),
                                next_flag_name: None,
                            });
                        }
                    }
                }
                FlagKind::Parsed { .. } | FlagKind::Enum { .. } => {
                    if !self.value_states[idx].is_set() {
                        match &flag.default {
                            Some(DefaultValue::Single(text)) => {
                                self.value_events.push((idx, text.clone()));
                                self.value_states[idx] = Accumulator::Single(text.clone());
                            }
                            Some(DefaultValue::Multi(texts)) => {
                                for t in texts {
                                    self.value_events.push((idx, t.clone()));
                                }
                                self.value_states[idx] = Accumulator::Multi(texts.clone());
                            }
                            None => {
                                if !flag.optional {
                                    errors.push(ScanError::UnsatisfiedFlag {
                                        external_flag_name: flag.external_name.clone(),
                                        next_flag_name: None,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        errors
    }

    fn finalize_positional_defaults(&mut self) -> Vec<ScanError> {
        let mut errors = Vec::new();
        match self.spec.positionals() {
            PositionalSpec::Tuple(params) => {
                for (i, param) in params.iter().enumerate() {
                    if i < self.positional_raw.len() {
                        continue;
                    }
                    match &param.default {
                        Some(default) => self.positional_raw.push(default.clone()),
                        None if !param.optional => errors.push(ScanError::UnsatisfiedPositional {
                            placeholder: param.placeholder.clone(),
                            minimum: None,
                        }),
                        None => {}
                    }
                }
            }
            PositionalSpec::Array { element, minimum, .. } => {
                let actual = self.positional_raw.len();
                if let Some(min) = minimum {
                    if actual < *min {
                        errors.push(ScanError::UnsatisfiedPositional {
                            placeholder: element.placeholder.clone(),
                            minimum: Some((*min, actual)),
                        });
                    }
                }
            }
        }
        errors
    }

    fn build_flag_values(&self) -> (HashMap<String, FlagValue>, Vec<ScanError>) {
        let mut results: HashMap<String, FlagValue> = HashMap::new();
        for (idx, flag) in self.spec.flags().iter().enumerate() {
            match &flag.kind {
                FlagKind::Boolean => {
                    results.insert(flag.external_name.clone(), FlagValue::Bool(self.bool_states[idx].value));
                }
                FlagKind::Counter => {
                    results.insert(flag.external_name.clone(), FlagValue::Counter(self.counter_states[idx]));
                }
                _ => {}
            }
        }

        let mut parse_errors = Vec::new();
        let mut parsed_single: HashMap<usize, Box<dyn Any>> = HashMap::new();
        let mut parsed_multi: HashMap<usize, Vec<Box<dyn Any>>> = HashMap::new();
        let mut enum_single: HashMap<usize, String> = HashMap::new();
        let mut enum_multi: HashMap<usize, Vec<String>> = HashMap::new();

        for (idx, raw) in &self.value_events {
            let flag = &self.spec.flags()[*idx];
            match &flag.kind {
                FlagKind::Parsed { parse, .. } => match parse(raw) {
                    Ok(v) => {
                        if flag.kind.variadic().is_variadic() {
                            parsed_multi.entry(*idx).or_default().push(v);
                        } else {
                            parsed_single.insert(*idx, v);
                        }
                    }
                    Err(cause) => parse_errors.push(ScanError::ArgumentParseError {
                        external_flag_name_or_placeholder: flag.external_name.clone(),
                        input: raw.clone(),
                        cause: to_send_sync(cause),
                    }),
                },
                FlagKind::Enum { values, .. } => {
                    if values.contains(raw) {
                        if flag.kind.variadic().is_variadic() {
                            enum_multi.entry(*idx).or_default().push(raw.clone());
                        } else {
                            enum_single.insert(*idx, raw.clone());
                        }
                    } else {
                        parse_errors.push(ScanError::EnumValidationError {
                            external_flag_name_or_placeholder: flag.external_name.clone(),
                            input: raw.clone(),
                            values: values.clone(),
                            corrections: enum_corrections(self.spec.config(), raw, values),
                        });
                    }
                }
                _ => {}
            }
        }

        for (idx, flag) in self.spec.flags().iter().enumerate() {
            match &flag.kind {
                FlagKind::Parsed { variadic, .. } if variadic.is_variadic() => {
                    if let Some(v) = parsed_multi.remove(&idx) {
                        results.insert(flag.external_name.clone(), FlagValue::Multi(v));
                    }
                }
                FlagKind::Parsed { .. } => {
                    if let Some(v) = parsed_single.remove(&idx) {
                        results.insert(flag.external_name.clone(), FlagValue::Single(v));
                    }
                }
                FlagKind::Enum { variadic, .. } if variadic.is_variadic() => {
                    if let Some(v) = enum_multi.remove(&idx) {
                        results.insert(flag.external_name.clone(), FlagValue::EnumMulti(v));
                    }
                }
                FlagKind::Enum { .. } => {
                    if let Some(v) = enum_single.remove(&idx) {
                        results.insert(flag.external_name.clone(), FlagValue::Enum(v));
                    }
                }
                _ => {}
            }
        }

        (results, parse_errors)
    }

    fn build_positional_values(&self) -> (PositionalValues, Vec<ScanError>) {
        let mut errors = Vec::new();
        match self.spec.positionals() {
            PositionalSpec::Tuple(params) => {
                let mut out = Vec::with_capacity(params.len());
                for (i, param) in params.iter().enumerate() {
                    match self.positional_raw.get(i) {
                        Some(raw) => match (param.parse)(raw) {
                            Ok(v) => out.push(Some(v)),
                            Err(cause) => {
                                errors.push(ScanError::ArgumentParseError {
                                    external_flag_name_or_placeholder: param.placeholder.clone(),
                                    input: raw.clone(),
                                    cause: to_send_sync(cause),
                                });
                                out.push(None);
                            }
                        },
                        None => out.push(None),
                    }
                }
                (PositionalValues::Tuple(out), errors)
            }
            PositionalSpec::Array { element, .. } => {
                let mut out = Vec::with_capacity(self.positional_raw.len());
                for raw in &self.positional_raw {
                    match (element.parse)(raw) {
                        Ok(v) => out.push(v),
                        Err(cause) => errors.push(ScanError::ArgumentParseError {
                            external_flag_name_or_placeholder: element.placeholder.clone(),
                            input: raw.clone(),
                            cause: to_send_sync(cause),
                        }),
                    }
                }
                (PositionalValues::Array(out), errors)
            }
        }
    }
}

fn next_flag_name_of(classified: &ClassifiedToken<'_>, spec: &CommandSpec) -> Option<String> {
    match classified {
        ClassifiedToken::Escape => None,
        ClassifiedToken::LongFlag { name, .. } => Some(name.to_string()),
        ClassifiedToken::NegatedLongFlag { flag_index, .. } => {
            Some(spec.flags()[*flag_index].external_name.clone())
        }
        ClassifiedToken::ShortCluster { cluster, .. } => {
            let first = cluster.chars().next().unwrap();
            Some(
                spec.aliases
                    .get(&first)
                    .cloned()
                    .unwrap_or_else(|| first.to_string()),
            )
        }
        ClassifiedToken::Positional(_) => None,
    }
}

fn enum_corrections(config: &crate::spec::ScannerConfig, input: &str, values: &[String]) -> Vec<String> {
    let candidates: Vec<&str> = values.iter().map(String::as_str).collect();
    let opts = config.distance_options;
    argscan_distance::corrections(input, candidates, &opts.weights, opts.threshold)
        .into_iter()
        .map(String::from)
        .collect()
}

fn parse_bool_literal(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "yes" | "y" | "t" | "1" => Some(true),
        "false" | "no" | "n" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Boxes `cause` as `Send + Sync` when it already is; otherwise wraps its
/// message in an opaque error. Caller-supplied parse functions are not
/// required to produce `Send + Sync` errors, but `ScanError` needs one
/// uniform bound to stay usable across thread boundaries.
fn to_send_sync(cause: Box<dyn std::error::Error>) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(OpaqueCause(cause.to_string()))
}

#[derive(Debug)]
struct OpaqueCause(String);

impl std::fmt::Display for OpaqueCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for OpaqueCause {}

#[derive(Debug)]
struct InvalidBoolean;

impl std::fmt::Display for InvalidBoolean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("expected true/yes/y/t/1 or false/no/n/f/0")
    }
}

impl std::error::Error for InvalidBoolean {}

#[derive(Debug)]
struct InvalidCounter;

impl std::fmt::Display for InvalidCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("expected a non-negative integer")
    }
}

impl std::error::Error for InvalidCounter {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{CommandSpec, FlagSpec, PositionalParam, ScannerConfig, Variadic};
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn identity_parser() -> crate::spec::ParseFn {
        Box::new(|s: &str| Ok(Box::new(s.to_string()) as Box<dyn Any>))
    }

    #[test]
    fn counter_cluster_increments_each_repeat() {
        let flags = vec![FlagSpec::counter("logLevel", "verbosity").optional()];
        let mut aliases = HashMap::new();
        aliases.insert('l', "logLevel".to_string());
        let spec = CommandSpec::new(flags, aliases, PositionalSpec::Tuple(vec![]), ScannerConfig::default()).unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("-ll");
        scanner.next("-ll");
        let outcome = scanner.parse_arguments();
        assert!(outcome.success);
        assert_eq!(outcome.flags["logLevel"].as_counter(), Some(4));
    }

    #[test]
    fn inline_counter_replaces_then_bare_adds() {
        let flags = vec![FlagSpec::counter("logLevel", "verbosity").optional()];
        let mut aliases = HashMap::new();
        aliases.insert('l', "logLevel".to_string());
        let spec = CommandSpec::new(flags, aliases, PositionalSpec::Tuple(vec![]), ScannerConfig::default()).unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("--logLevel=100");
        scanner.next("-l");
        let outcome = scanner.parse_arguments();
        assert!(outcome.success);
        assert_eq!(outcome.flags["logLevel"].as_counter(), Some(101));
    }

    #[test]
    fn negation_after_positive_never_errors() {
        let flags = vec![FlagSpec::boolean("forceBuild", "force").optional()];
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("--forceBuild");
        scanner.next("--noForceBuild");
        let outcome = scanner.parse_arguments();
        assert!(outcome.success);
        assert_eq!(outcome.flags["forceBuild"].as_bool(), Some(false));
    }

    #[test]
    fn repeated_bare_boolean_errors_with_hardcoded_true() {
        let flags = vec![FlagSpec::boolean("fooFlag", "foo").optional()];
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("--fooFlag");
        scanner.next("--fooFlag");
        let outcome = scanner.parse_arguments();
        assert_matches!(
            &outcome.errors[0],
            ScanError::UnexpectedFlag { previous_input, input, .. }
            if previous_input == "true" && input == "true"
        );
    }

    #[test]
    fn pending_value_interrupted_by_flag_emits_unsatisfied() {
        let flags = vec![FlagSpec::parsed("bar", "bar", Variadic::False, identity_parser()).optional()];
        let mut config = ScannerConfig::default();
        config.allow_argument_escape_sequence = true;
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), config).unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("--bar");
        scanner.next("--");
        scanner.next("--foo");
        let outcome = scanner.parse_arguments();
        assert_matches!(&outcome.errors[0], ScanError::UnsatisfiedFlag { external_flag_name, .. } if external_flag_name == "bar");
    }

    #[test]
    fn infer_empty_interrupted_sets_empty_string() {
        let flags = vec![
            FlagSpec::parsed("bar", "bar", Variadic::False, identity_parser()).optional().infer_empty(),
        ];
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("--bar");
        scanner.next("--unknown");
        let outcome = scanner.parse_arguments();
        assert_eq!(outcome.flags["bar"].downcast_ref::<String>(), Some(&String::new()));
    }

    #[test]
    fn tuple_positional_parse_error_keyed_by_placeholder() {
        let parse_number: crate::spec::ParseFn = Box::new(|s: &str| {
            s.parse::<i64>()
                .map(|n| Box::new(n) as Box<dyn Any>)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
        });
        let positionals = PositionalSpec::Tuple(vec![PositionalParam::new("count", parse_number)]);
        let spec = CommandSpec::new(vec![], HashMap::new(), positionals, ScannerConfig::default()).unwrap();
        let mut scanner = Scanner::new(&spec);
        scanner.next("notanumber");
        let outcome = scanner.parse_arguments();
        assert_matches!(
            &outcome.errors[0],
            ScanError::ArgumentParseError { external_flag_name_or_placeholder, .. }
            if external_flag_name_or_placeholder == "count"
        );
    }
}
