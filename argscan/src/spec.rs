// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The declarative parameter model: flags, aliases, and positionals, plus the
//! lookup tables the scanner and completion engine need at wire level.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use argscan_distance::Weights;

/// A value-producing function supplied by the caller, analogous to the
/// `string -> T | throws` contract in the distilled specification this crate
/// implements. `T` is erased behind [`Any`] because a single [`CommandSpec`]
/// holds many flags whose value types differ.
pub type ParseFn = Box<dyn Fn(&str) -> Result<Box<dyn Any>, Box<dyn StdError>>>;

/// A per-parameter completion callback: given the partial text already typed
/// (for separator-variadic flags, only the trailing chunk), returns candidate
/// completions of that partial.
pub type Completer = Box<dyn Fn(&str) -> Vec<String>>;

/// How many times a flag's value may be supplied.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Variadic {
    /// The flag may be supplied at most once.
    False,
    /// The flag may be repeated; every occurrence contributes one element.
    True,
    /// A single occurrence's value is split on this character; the flag may
    /// also be repeated, in which case the pieces accumulate across
    /// occurrences.
    Separator(char),
}

impl Variadic {
    pub(crate) fn is_variadic(self) -> bool {
        !matches!(self, Variadic::False)
    }
}

/// The default value declared for a flag or positional: either a single
/// string or a list, interpreted through the same parse/enum pipeline as a
/// real occurrence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DefaultValue {
    Single(String),
    Multi(Vec<String>),
}

/// The four flag shapes described by the wire grammar.
pub enum FlagKind {
    Boolean,
    Counter,
    Parsed {
        parse: ParseFn,
        variadic: Variadic,
        infer_empty: bool,
    },
    Enum {
        values: Vec<String>,
        variadic: Variadic,
    },
}

impl fmt::Debug for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagKind::Boolean => f.write_str("Boolean"),
            FlagKind::Counter => f.write_str("Counter"),
            FlagKind::Parsed { variadic, infer_empty, .. } => f
                .debug_struct("Parsed")
                .field("variadic", variadic)
                .field("infer_empty", infer_empty)
                .finish(),
            FlagKind::Enum { values, variadic } => f
                .debug_struct("Enum")
                .field("values", values)
                .field("variadic", variadic)
                .finish(),
        }
    }
}

impl FlagKind {
    pub(crate) fn variadic(&self) -> Variadic {
        match self {
            FlagKind::Boolean | FlagKind::Counter => Variadic::False,
            FlagKind::Parsed { variadic, .. } | FlagKind::Enum { variadic, .. } => *variadic,
        }
    }

    pub(crate) fn needs_separate_value(&self) -> bool {
        matches!(self, FlagKind::Parsed { .. } | FlagKind::Enum { .. })
    }

    pub(crate) fn infer_empty(&self) -> bool {
        matches!(self, FlagKind::Parsed { infer_empty: true, .. })
    }
}

/// A single flag declaration.
pub struct FlagSpec {
    pub external_name: String,
    pub brief: String,
    pub kind: FlagKind,
    pub optional: bool,
    pub default: Option<DefaultValue>,
    pub hidden: bool,
    pub completer: Option<Completer>,
}

impl fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec")
            .field("external_name", &self.external_name)
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .field("hidden", &self.hidden)
            .finish()
    }
}

impl FlagSpec {
    fn new(external_name: impl Into<String>, brief: impl Into<String>, kind: FlagKind) -> Self {
        FlagSpec {
            external_name: external_name.into(),
            brief: brief.into(),
            kind,
            optional: false,
            default: None,
            hidden: false,
            completer: None,
        }
    }

    pub fn boolean(external_name: impl Into<String>, brief: impl Into<String>) -> Self {
        Self::new(external_name, brief, FlagKind::Boolean)
    }

    pub fn counter(external_name: impl Into<String>, brief: impl Into<String>) -> Self {
        Self::new(external_name, brief, FlagKind::Counter)
    }

    pub fn parsed(
        external_name: impl Into<String>,
        brief: impl Into<String>,
        variadic: Variadic,
        parse: ParseFn,
    ) -> Self {
        Self::new(
            external_name,
            brief,
            FlagKind::Parsed {
                parse,
                variadic,
                infer_empty: false,
            },
        )
    }

    pub fn enum_flag(
        external_name: impl Into<String>,
        brief: impl Into<String>,
        values: Vec<String>,
        variadic: Variadic,
    ) -> Self {
        Self::new(external_name, brief, FlagKind::Enum { values, variadic })
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_single(mut self, value: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Single(value.into()));
        self
    }

    pub fn default_multi(mut self, values: Vec<String>) -> Self {
        self.default = Some(DefaultValue::Multi(values));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn infer_empty(mut self) -> Self {
        if let FlagKind::Parsed { infer_empty, .. } = &mut self.kind {
            *infer_empty = true;
        }
        self
    }

    pub fn with_completer(mut self, completer: Completer) -> Self {
        self.completer = Some(completer);
        self
    }
}

/// One slot of a tuple positional, or the repeated element of an array
/// positional.
pub struct PositionalParam {
    pub placeholder: String,
    pub parse: ParseFn,
    pub optional: bool,
    pub default: Option<String>,
    pub completer: Option<Completer>,
}

impl fmt::Debug for PositionalParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionalParam")
            .field("placeholder", &self.placeholder)
            .field("optional", &self.optional)
            .field("default", &self.default)
            .finish()
    }
}

impl PositionalParam {
    pub fn new(placeholder: impl Into<String>, parse: ParseFn) -> Self {
        PositionalParam {
            placeholder: placeholder.into(),
            parse,
            optional: false,
            default: None,
            completer: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_completer(mut self, completer: Completer) -> Self {
        self.completer = Some(completer);
        self
    }
}

/// The two positional shapes a command may declare.
pub enum PositionalSpec {
    Tuple(Vec<PositionalParam>),
    Array {
        element: PositionalParam,
        minimum: Option<usize>,
        maximum: Option<usize>,
    },
}

impl fmt::Debug for PositionalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionalSpec::Tuple(params) => f.debug_tuple("Tuple").field(params).finish(),
            PositionalSpec::Array { element, minimum, maximum } => f
                .debug_struct("Array")
                .field("element", element)
                .field("minimum", minimum)
                .field("maximum", maximum)
                .finish(),
        }
    }
}

/// How wire-level flag names are derived from external names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseStyle {
    Original,
    AllowKebabForCamel,
}

/// The distance-engine knobs used for flag-name corrections.
#[derive(Clone, Copy, Debug)]
pub struct DistanceOptions {
    pub threshold: u32,
    pub weights: Weights,
}

impl Default for DistanceOptions {
    fn default() -> Self {
        DistanceOptions {
            threshold: 3,
            weights: Weights::default(),
        }
    }
}

/// Scanner-wide configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScannerConfig {
    pub case_style: CaseStyle,
    pub allow_argument_escape_sequence: bool,
    pub distance_options: DistanceOptions,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            case_style: CaseStyle::Original,
            allow_argument_escape_sequence: false,
            distance_options: DistanceOptions::default(),
        }
    }
}

/// Completion-specific configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionConfig {
    pub include_aliases: bool,
    pub include_hidden_routes: bool,
}

/// A programmer mistake discovered while building a [`CommandSpec`] — never
/// added to a scan's accumulated error list, since it reflects a bug in how
/// the spec itself was assembled rather than bad user input.
#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum SpecError {
    #[error("duplicate flag external name {0:?}")]
    DuplicateFlagName(String),
    #[error("alias {0:?} is registered more than once")]
    DuplicateAlias(char),
}

/// The fully-resolved command specification: the flags/positionals the
/// caller declared plus the wire-level lookup tables derived from them.
#[derive(Debug)]
pub struct CommandSpec {
    pub(crate) flags: Vec<FlagSpec>,
    pub(crate) aliases: HashMap<char, String>,
    pub(crate) positionals: PositionalSpec,
    pub(crate) config: ScannerConfig,
    pub(crate) wire_names: HashMap<String, usize>,
    pub(crate) primary_wire_name: Vec<String>,
    pub(crate) negation_forms: HashMap<String, usize>,
    pub(crate) external_index: HashMap<String, usize>,
}

impl CommandSpec {
    pub fn new(
        flags: Vec<FlagSpec>,
        aliases: HashMap<char, String>,
        positionals: PositionalSpec,
        config: ScannerConfig,
    ) -> Result<Self, SpecError> {
        let mut external_index = HashMap::new();
        for (idx, flag) in flags.iter().enumerate() {
            if external_index.insert(flag.external_name.clone(), idx).is_some() {
                return Err(SpecError::DuplicateFlagName(flag.external_name.clone()));
            }
        }

        let mut wire_names = HashMap::new();
        let mut primary_wire_name = Vec::with_capacity(flags.len());
        for (idx, flag) in flags.iter().enumerate() {
            let primary = match config.case_style {
                CaseStyle::Original => flag.external_name.clone(),
                CaseStyle::AllowKebabForCamel => to_kebab_case(&flag.external_name),
            };
            wire_names.entry(primary.clone()).or_insert(idx);
            if primary != flag.external_name {
                wire_names.entry(flag.external_name.clone()).or_insert(idx);
            }
            primary_wire_name.push(primary);
        }

        let mut negation_forms = HashMap::new();
        for (idx, flag) in flags.iter().enumerate() {
            if !matches!(flag.kind, FlagKind::Boolean) {
                continue;
            }
            negation_forms.insert(format!("no{}", capitalize(&flag.external_name)), idx);
            if config.case_style == CaseStyle::AllowKebabForCamel {
                negation_forms.insert(format!("no-{}", to_kebab_case(&flag.external_name)), idx);
            }
        }

        let mut seen_aliases = std::collections::HashSet::new();
        for c in aliases.keys() {
            if !seen_aliases.insert(*c) {
                return Err(SpecError::DuplicateAlias(*c));
            }
        }

        Ok(CommandSpec {
            flags,
            aliases,
            positionals,
            config,
            wire_names,
            primary_wire_name,
            negation_forms,
            external_index,
        })
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    pub fn positionals(&self) -> &PositionalSpec {
        &self.positionals
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub(crate) fn resolve_wire_name(&self, name: &str) -> Option<usize> {
        self.wire_names.get(name).copied()
    }

    pub(crate) fn resolve_external_name(&self, name: &str) -> Option<usize> {
        self.external_index.get(name).copied()
    }

    pub(crate) fn resolve_negation(&self, name: &str) -> Option<usize> {
        self.negation_forms.get(name).copied()
    }

    pub(crate) fn visible_wire_names(&self, include_hidden: bool) -> Vec<&str> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, flag)| include_hidden || !flag.hidden)
            .map(|(idx, _)| self.primary_wire_name[idx].as_str())
            .collect()
    }
}

/// Converts a camelCase identifier to kebab-case, e.g. `forceBuild` ->
/// `force-build`.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i != 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_identity() -> ParseFn {
        Box::new(|s: &str| Ok(Box::new(s.to_string()) as Box<dyn Any>))
    }

    #[test]
    fn kebab_case_conversion() {
        assert_eq!(to_kebab_case("forceBuild"), "force-build");
        assert_eq!(to_kebab_case("fooFlag"), "foo-flag");
        assert_eq!(to_kebab_case("simple"), "simple");
    }

    #[test]
    fn duplicate_flag_names_rejected() {
        let flags = vec![
            FlagSpec::boolean("foo", "first"),
            FlagSpec::boolean("foo", "second"),
        ];
        let err = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap_err();
        assert_eq!(err, SpecError::DuplicateFlagName("foo".to_string()));
    }

    #[test]
    fn kebab_case_style_accepts_both_forms() {
        let flags = vec![FlagSpec::boolean("forceBuild", "force the build")];
        let config = ScannerConfig {
            case_style: CaseStyle::AllowKebabForCamel,
            ..ScannerConfig::default()
        };
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), config).unwrap();
        assert_eq!(spec.resolve_wire_name("force-build"), Some(0));
        assert_eq!(spec.resolve_wire_name("forceBuild"), Some(0));
    }

    #[test]
    fn negation_forms_are_exact_not_prefix() {
        let flags = vec![FlagSpec::boolean("forceBuild", "force the build")];
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap();
        assert_eq!(spec.resolve_negation("noForceBuild"), Some(0));
        assert_eq!(spec.resolve_negation("noforcebuild"), None);
        assert_eq!(spec.resolve_negation("noForce"), None);
    }

    #[test]
    fn enum_default_not_among_values_is_accepted_at_construction() {
        let flags = vec![FlagSpec::enum_flag(
            "mode",
            "mode",
            vec!["foo".into(), "bar".into()],
            Variadic::False,
        )
        .default_single("nope")];
        let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
            .unwrap();
        assert_eq!(spec.flags()[0].external_name, "mode");
    }

    #[test]
    fn parsed_flag_roundtrips_through_erased_type() {
        let flag = FlagSpec::parsed("count", "a count", Variadic::False, parse_identity());
        if let FlagKind::Parsed { parse, .. } = &flag.kind {
            let value = parse("42").unwrap();
            assert_eq!(value.downcast_ref::<String>().unwrap(), "42");
        } else {
            panic!("expected Parsed kind");
        }
    }
}
