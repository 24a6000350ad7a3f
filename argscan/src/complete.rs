// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The completion engine: a sibling of the scanner that turns an in-progress
//! token into a list of candidate completions, reusing the same accumulated
//! state [`crate::scanner::Scanner`] builds from the tokens scanned so far.

use std::collections::HashSet;

use itertools::Itertools;

use crate::classify::{classify, ClassifiedToken};
use crate::error::ScanError;
use crate::spec::{CommandSpec, CompletionConfig, FlagKind, PositionalSpec};

/// What a [`Completion`] completes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CompletionKind {
    Escape,
    LongFlag,
    NegatedLongFlag,
    Alias,
    Value,
    Positional,
}

/// One candidate completion of the partial token passed to
/// [`Scanner::propose_completions`](crate::scanner::Scanner::propose_completions).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Completion {
    pub kind: CompletionKind,
    pub text: String,
    pub brief: String,
}

/// Computes completions for `partial` given everything already recorded in
/// `spec`, the flags already set (by external name), and whether scanning
/// had already consumed the escape sequence or was waiting on a pending
/// flag's value.
pub(crate) fn propose(
    spec: &CommandSpec,
    partial: &str,
    escape_seen: bool,
    pending: Option<usize>,
    already_set: &dyn Fn(usize) -> bool,
    config: &CompletionConfig,
) -> Result<Vec<Completion>, ScanError> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();

    if let Some(idx) = pending {
        let flag = &spec.flags()[idx];
        let candidates = match &flag.kind {
            FlagKind::Enum { values, .. } => values
                .iter()
                .filter(|v| v.starts_with(partial))
                .cloned()
                .collect(),
            _ => match &flag.completer {
                Some(completer) => completer(partial),
                None => Vec::new(),
            },
        };
        for text in candidates {
            push(&mut out, &mut seen, CompletionKind::Value, text, flag.brief.clone());
        }
        return Ok(out);
    }

    if escape_seen {
        push_positional_completions(spec, partial, &mut out, &mut seen);
        return Ok(out);
    }

    if partial.is_empty() || partial == "-" {
        if spec.config().allow_argument_escape_sequence {
            push(
                &mut out,
                &mut seen,
                CompletionKind::Escape,
                "--".to_string(),
                "All subsequent inputs should be interpreted as arguments".to_string(),
            );
        }
    }

    match classify(partial, false, spec) {
        ClassifiedToken::LongFlag { name, .. } | ClassifiedToken::Positional(name) if partial.starts_with("--") => {
            push_long_flag_completions(spec, name, already_set, config, &mut out, &mut seen);
        }
        ClassifiedToken::ShortCluster { cluster, .. } => {
            push_cluster_completions(spec, cluster, already_set, &mut out, &mut seen);
        }
        _ if partial.starts_with('-') && !partial.starts_with("--") => {
            push_cluster_completions(spec, partial.trim_start_matches('-'), already_set, &mut out, &mut seen);
        }
        _ => {
            push_positional_completions(spec, partial, &mut out, &mut seen);
        }
    }

    Ok(out)
}

fn push_long_flag_completions(
    spec: &CommandSpec,
    partial_name: &str,
    already_set: &dyn Fn(usize) -> bool,
    config: &CompletionConfig,
    out: &mut Vec<Completion>,
    seen: &mut HashSet<(CompletionKind, String)>,
) {
    for (idx, flag) in spec.flags().iter().enumerate() {
        if flag.hidden && !config.include_hidden_routes {
            continue;
        }
        if already_set(idx) && matches!(flag.kind.variadic(), crate::spec::Variadic::False) {
            continue;
        }
        let wire = &spec.primary_wire_name[idx];
        if wire.starts_with(partial_name) {
            push(out, seen, CompletionKind::LongFlag, format!("--{wire}"), flag.brief.clone());
        }
        if matches!(flag.kind, FlagKind::Boolean) {
            let negated = format!("no{}", capitalize(&flag.external_name));
            if negated.starts_with(partial_name) {
                push(out, seen, CompletionKind::NegatedLongFlag, format!("--{negated}"), flag.brief.clone());
            }
        }
    }
}

fn push_cluster_completions(
    spec: &CommandSpec,
    cluster_so_far: &str,
    already_set: &dyn Fn(usize) -> bool,
    out: &mut Vec<Completion>,
    seen: &mut HashSet<(CompletionKind, String)>,
) {
    for c in cluster_so_far.chars() {
        if !spec.aliases.contains_key(&c) {
            return;
        }
    }

    // The cluster as typed is itself a valid completion when its trailing
    // alias is still available — closing the cluster, not just extending it.
    if let Some(trailing) = cluster_so_far.chars().last() {
        if let Some(idx) = spec
            .aliases
            .get(&trailing)
            .and_then(|name| spec.resolve_external_name(name))
        {
            if !(already_set(idx) && matches!(spec.flags()[idx].kind.variadic(), crate::spec::Variadic::False)) {
                let brief = spec.flags()[idx].brief.clone();
                push(out, seen, CompletionKind::Alias, format!("-{cluster_so_far}"), brief);
            }
        }
    }

    for c in spec.aliases.keys().copied().sorted() {
        if cluster_so_far.contains(c) {
            continue;
        }
        let Some(name) = spec.aliases.get(&c) else { continue };
        let Some(idx) = spec.resolve_external_name(name) else { continue };
        if already_set(idx) && matches!(spec.flags()[idx].kind.variadic(), crate::spec::Variadic::False) {
            continue;
        }
        let brief = spec.flags()[idx].brief.clone();
        push(out, seen, CompletionKind::Alias, format!("-{cluster_so_far}{c}"), brief);
    }
}

fn push_positional_completions(
    spec: &CommandSpec,
    partial: &str,
    out: &mut Vec<Completion>,
    seen: &mut HashSet<(CompletionKind, String)>,
) {
    let (completer, brief) = match spec.positionals() {
        PositionalSpec::Tuple(params) => {
            (params.first().and_then(|p| p.completer.as_ref()), params.first().map(|p| p.placeholder.clone()))
        }
        PositionalSpec::Array { element, .. } => (element.completer.as_ref(), Some(element.placeholder.clone())),
    };
    if let Some(completer) = completer {
        let brief = brief.unwrap_or_default();
        for text in completer(partial) {
            push(out, seen, CompletionKind::Positional, text, brief.clone());
        }
    }
}

fn push(
    out: &mut Vec<Completion>,
    seen: &mut HashSet<(CompletionKind, String)>,
    kind: CompletionKind,
    text: String,
    brief: String,
) {
    if seen.insert((kind, text.clone())) {
        out.push(Completion { kind, text, brief });
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
