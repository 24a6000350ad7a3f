// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A flag/positional argument scanner and shell-completion engine for
//! command-line interfaces.
//!
//! A [`spec::CommandSpec`] declares the flags, short aliases, and positional
//! parameters a command accepts. A [`scanner::Scanner`] is built from a
//! spec and fed raw argument tokens one at a time; [`scanner::Scanner::parse_arguments`]
//! consumes it and returns either the parsed values or the accumulated
//! errors, and [`scanner::Scanner::propose_completions`] consumes it instead to list
//! what could come next.
//!
//! ```
//! use std::collections::HashMap;
//! use argscan::spec::{CommandSpec, FlagSpec, PositionalSpec, ScannerConfig};
//! use argscan::scanner::Scanner;
//!
//! let flags = vec![FlagSpec::boolean("verbose", "print extra detail").optional()];
//! let spec = CommandSpec::new(flags, HashMap::new(), PositionalSpec::Tuple(vec![]), ScannerConfig::default())
//!     .expect("valid spec");
//! let mut scanner = Scanner::new(&spec);
//! scanner.next("--verbose");
//! let outcome = scanner.parse_arguments();
//! assert!(outcome.success);
//! assert_eq!(outcome.flags["verbose"].as_bool(), Some(true));
//! ```

pub mod classify;
pub mod complete;
pub mod error;
pub mod scanner;
pub mod spec;

pub use complete::{Completion, CompletionKind};
pub use error::{format_error, ErrorOverrides, ScanError};
pub use scanner::{FlagValue, PositionalValues, ScanOutcome, Scanner};
pub use spec::{
    CaseStyle, CommandSpec, CompletionConfig, DefaultValue, DistanceOptions, FlagKind, FlagSpec,
    ParseFn, PositionalParam, PositionalSpec, ScannerConfig, SpecError, Variadic,
};
