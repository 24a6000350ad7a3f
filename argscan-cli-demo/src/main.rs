// Copyright (c) the argscan contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A thin binary exercising `argscan` against a small example command:
//!
//! ```text
//! argscan-cli-demo --verbose --logLevel=2 -- build
//! ```
//!
//! This binary carries no grammar logic of its own; every parsing decision
//! lives in the `argscan` crate.

use std::any::Any;
use std::collections::HashMap;

use argscan::{
    CommandSpec, ErrorOverrides, FlagSpec, PositionalParam, PositionalSpec, PositionalValues,
    ScannerConfig, Scanner, Variadic,
};

fn build_spec() -> CommandSpec {
    let flags = vec![
        FlagSpec::boolean("verbose", "print extra detail").optional(),
        FlagSpec::counter("logLevel", "increase logging verbosity").optional(),
        FlagSpec::parsed("target", "build target", Variadic::False, identity_parser()).optional(),
    ];

    let mut aliases = HashMap::new();
    aliases.insert('v', "verbose".to_string());
    aliases.insert('l', "logLevel".to_string());

    let positionals = PositionalSpec::Tuple(vec![PositionalParam::new("action", choice_parser())]);

    let mut config = ScannerConfig::default();
    config.allow_argument_escape_sequence = true;

    CommandSpec::new(flags, aliases, positionals, config).expect("demo spec is valid")
}

fn identity_parser() -> argscan::ParseFn {
    Box::new(|s: &str| Ok(Box::new(s.to_string()) as Box<dyn Any>))
}

fn choice_parser() -> argscan::ParseFn {
    Box::new(|s: &str| match s {
        "build" | "test" | "clean" => Ok(Box::new(s.to_string()) as Box<dyn Any>),
        other => Err(format!("{other:?} is not one of build, test, clean").into()),
    })
}

fn main() {
    let spec = build_spec();
    let mut scanner = Scanner::new(&spec);
    for arg in std::env::args().skip(1) {
        scanner.next(&arg);
    }

    let outcome = scanner.parse_arguments();
    if !outcome.success {
        let overrides = ErrorOverrides::new();
        for error in &outcome.errors {
            eprintln!("argscan-cli-demo: {}", argscan::format_error(error, &overrides));
        }
        std::process::exit(1);
    }

    println!("verbose = {:?}", outcome.flags["verbose"].as_bool());
    println!("logLevel = {:?}", outcome.flags["logLevel"].as_counter());
    if let Some(target) = outcome.flags.get("target") {
        println!("target = {:?}", target.downcast_ref::<String>());
    }

    if let PositionalValues::Tuple(slots) = &outcome.positionals {
        if let Some(Some(action)) = slots.first() {
            println!("action = {:?}", action.downcast_ref::<String>());
        }
    }
}
