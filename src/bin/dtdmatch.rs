// Content-model validator
//
//  Copyright (C) 2014-2022 Ryan Specialty Group, LLC.
//
//  This file is part of dtdmatch.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Validate XML documents against a content-model schema.
//!
//! `dtdmatch` reads a schema in the format described by
//!   [`dtdmatch::schema::xml`] and validates the element children of every
//!   element of a document that has a content model in that schema.
//! Warnings and failures are rendered to standard out.
//!
//! The exit status is `0` if the document is valid,
//!   `1` if any element failed validation,
//!   and otherwise one of the codes of [`exitcode`].

extern crate dtdmatch;

use dtdmatch::{
    diagnose::{Diagnostic, Reporter, VisualReporter},
    expand::ExpandConfig,
    inline::BoundsPrecedence,
    schema::xml::{read_schema, SchemaReadError},
    validate::{validate_document, ValidateError, Validation},
};
use getopts::{Fail, Options};
use std::{
    env,
    error::Error,
    fmt::{self, Display, Write},
    fs::File,
    io::{self, BufReader},
};

/// Types of commands
enum Command {
    Validate(String, String, ExpandConfig),
    Usage,
}

/// Validate the document at `doc_path` against the schema at
///   `schema_path`,
///     rendering every warning and failure.
fn validate<R: Reporter>(
    schema_path: &str,
    doc_path: &str,
    config: &ExpandConfig,
    reporter: &mut R,
) -> Result<Validation, DtdmatchError> {
    let schema = read_schema(BufReader::new(File::open(schema_path)?))?;
    let doc = BufReader::new(File::open(doc_path)?);

    let validation = validate_document(&schema, doc, config)?;

    // Rendering to a string ensures buffering so that we don't interleave
    //   output between processes.
    let mut out = String::new();

    for warning in &validation.warnings {
        write!(out, "{}\n", reporter.render(warning))?;
    }

    for failure in &validation.failures {
        write!(out, "{}\n", reporter.render(failure))?;
    }

    print!("{out}");

    Ok(validation)
}

/// Entrypoint for the validator
pub fn main() -> Result<(), DtdmatchError> {
    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage =
        opts.usage(&format!("Usage: {} [OPTIONS] --schema FILE DOC", program));

    match parse_options(opts, args) {
        Ok(Command::Validate(schema_path, doc_path, config)) => {
            let mut reporter = VisualReporter::new();

            match validate(&schema_path, &doc_path, &config, &mut reporter) {
                Ok(validation) if validation.is_valid() => {
                    println!(
                        "`{doc_path}` is valid ({} element(s) checked)",
                        validation.validated
                    );
                    std::process::exit(exitcode::OK);
                }
                Ok(_) => {
                    println!(
                        "fatal: `{doc_path}` is invalid due to previous {} \
                            error(s)",
                        reporter.error_count(),
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    let report = reporter.render(&e).to_string();
                    println!(
                        "{report}\nfatal: failed to validate `{doc_path}`"
                    );
                    std::process::exit(exitcode::DATAERR);
                }
            }
        }
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("s", "schema", "schema describing content models", "FILE");
    opts.optopt(
        "",
        "max-candidates",
        "maximum shapes per content model (default 4096)",
        "N|unlimited",
    );
    opts.optopt(
        "",
        "group-bounds",
        "bounds kept when a group and its reference disagree",
        "site|group",
    );
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    let doc = match matches.free.len() {
        0 => return Err(Fail::OptionMissing(String::from("DOC"))),
        1 => matches.free[0].clone(),
        _ => return Err(Fail::UnrecognizedOption(matches.free[1].clone())),
    };

    let schema = match matches.opt_str("schema") {
        Some(path) => path,
        None => return Err(Fail::OptionMissing(String::from("--schema"))),
    };

    let mut config = ExpandConfig::default();

    if let Some(max) = matches.opt_str("max-candidates") {
        config.candidate_limit = match &max[..] {
            "unlimited" => None,
            n => match n.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(Fail::UnexpectedArgument(format!(
                        "--max-candidates {max}"
                    )))
                }
            },
        };
    }

    if let Some(bounds) = matches.opt_str("group-bounds") {
        config.precedence = match &bounds[..] {
            "site" => BoundsPrecedence::Site,
            "group" => BoundsPrecedence::Group,
            _ => {
                return Err(Fail::UnexpectedArgument(format!(
                    "--group-bounds {bounds}"
                )))
            }
        };
    }

    Ok(Command::Validate(schema, doc, config))
}

/// Validator (`dtdmatch`) error.
///
/// This represents the aggregation of all errors that prevent a document
///   from being validated at all.
/// Validation failures are not errors;
///   they are reported as part of a [`Validation`].
#[derive(Debug)]
pub enum DtdmatchError {
    Io(io::Error),
    SchemaRead(SchemaReadError),
    Validate(ValidateError),
    Fmt(fmt::Error),
}

impl From<io::Error> for DtdmatchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<SchemaReadError> for DtdmatchError {
    fn from(e: SchemaReadError) -> Self {
        Self::SchemaRead(e)
    }
}

impl From<ValidateError> for DtdmatchError {
    fn from(e: ValidateError) -> Self {
        Self::Validate(e)
    }
}

impl From<fmt::Error> for DtdmatchError {
    fn from(e: fmt::Error) -> Self {
        Self::Fmt(e)
    }
}

impl Display for DtdmatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => Display::fmt(e, f),
            Self::SchemaRead(e) => write!(f, "invalid schema: {e}"),
            Self::Validate(e) => Display::fmt(e, f),
            Self::Fmt(e) => Display::fmt(e, f),
        }
    }
}

impl Error for DtdmatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::SchemaRead(e) => Some(e),
            Self::Validate(e) => Some(e),
            Self::Fmt(e) => Some(e),
        }
    }
}

impl Diagnostic for DtdmatchError {
    fn describe(&self) -> Vec<dtdmatch::diagnose::AnnotatedPath> {
        match self {
            Self::SchemaRead(e) => e.describe(),
            Self::Validate(e) => e.describe(),

            // Falls back to rendering just the error `Display`.
            _ => vec![],
        }
    }
}
