//! Scan stdin against a format string from the command line.
//!
//! Usage: `scan_check <format> [type...]`
//!
//! Reads one line from stdin, scans it against `<format>` with one argument
//! per `type` (`int`, `uint`, `float`, `bool`, `char`, `str`), and prints
//! the scanned values.
//!
//! Exit codes: 0 on success, 1 when a value fails to scan, 2 when the
//! format string (or the command line) is invalid.

use std::io::Read;
use std::process::ExitCode;

use log::debug;

use scan_oxide::{scan, ArgSlot, ArgStore, Error};

/// One requested output, pre-declared so the slots can borrow it.
enum Target {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

fn parse_targets(names: &[String]) -> Result<Vec<Target>, String> {
    names
        .iter()
        .map(|name| match name.as_str() {
            "int" => Ok(Target::Int(0)),
            "uint" => Ok(Target::Uint(0)),
            "float" => Ok(Target::Float(0.0)),
            "bool" => Ok(Target::Bool(false)),
            "char" => Ok(Target::Char('\0')),
            "str" => Ok(Target::Str(String::new())),
            other => Err(format!("unknown type '{}'", other)),
        })
        .collect()
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((format, type_names)) = args.split_first() else {
        eprintln!("usage: scan_check <format> [type...]");
        return ExitCode::from(2);
    };

    let mut targets = match parse_targets(type_names) {
        Ok(targets) => targets,
        Err(message) => {
            eprintln!("scan_check: {}", message);
            return ExitCode::from(2);
        },
    };

    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("scan_check: cannot read stdin: {}", err);
        return ExitCode::from(1);
    }
    let input = input.trim_end_matches('\n');
    debug!("scanning {:?} against {:?}", input, format);

    let slots: Vec<ArgSlot> = targets
        .iter_mut()
        .map(|target| match target {
            Target::Int(value) => ArgSlot::from(value),
            Target::Uint(value) => ArgSlot::from(value),
            Target::Float(value) => ArgSlot::from(value),
            Target::Bool(value) => ArgSlot::from(value),
            Target::Char(value) => ArgSlot::from(value),
            Target::Str(value) => ArgSlot::from(value),
        })
        .collect();

    let outcome = scan(input, format, &mut ArgStore::new(slots));
    match outcome {
        Ok(result) => {
            for target in &targets {
                match target {
                    Target::Int(value) => println!("{}", value),
                    Target::Uint(value) => println!("{}", value),
                    Target::Float(value) => println!("{}", value),
                    Target::Bool(value) => println!("{}", value),
                    Target::Char(value) => println!("{}", value),
                    Target::Str(value) => println!("{}", value),
                }
            }
            if !result.remaining.is_empty() {
                debug!("unconsumed tail: {:?}", result.remaining);
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("scan_check: {}", err);
            match err.error {
                Error::InvalidFormatString { .. } => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        },
    }
}
