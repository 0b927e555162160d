// Instance document validation tests
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

use super::*;
use crate::{
    error::DtdConflict,
    grammar::Particle,
    inline::BoundsPrecedence,
};

fn el(kind: &str) -> Particle<String> {
    Particle::element(kind.to_string())
}

fn schema() -> Schema<String> {
    let mut schema = Schema::new();

    schema
        .define_group("inline", Particle::choice([el("b"), el("i")]))
        .unwrap();

    schema
        .define_model(
            "doc",
            Particle::sequence([el("title"), el("para").some()]),
        )
        .unwrap();

    schema
        .define_model(
            "para",
            Particle::sequence([
                el("title").optional(),
                Particle::group_ref("inline").any(),
            ]),
        )
        .unwrap();

    schema
}

fn validate(src: &str) -> Result<Validation, ValidateError> {
    validate_document(&schema(), src.as_bytes(), &Default::default())
}

#[test]
fn valid_document() {
    let given = validate(
        r#"<?xml version="1.0"?>
<doc>
  <title>Example</title>
  <para><b>bold</b> and <i>italic</i> text</para>
  <para><title>Second</title></para>
  <para/>
</doc>"#,
    )
    .unwrap();

    assert!(given.is_valid());
    assert!(given.warnings.is_empty());

    // `doc` and three `para`s;
    //   `title`, `b` and `i` have no model.
    assert_eq!(given.validated, 4);
}

#[test]
fn collects_every_failure() {
    let src = "<doc><para><title/><b/><title/></para><para><u/></para></doc>";
    let given = validate(src).unwrap();

    assert!(!given.is_valid());
    assert_eq!(given.validated, 3);

    // Elements are reported as they close.
    let failures = given
        .failures
        .iter()
        .map(|f| (f.element.as_str(), f.offset))
        .collect::<Vec<_>>();
    assert_eq!(failures, vec![("para", 5), ("para", 38), ("doc", 0)]);

    assert!(matches!(
        &given.failures[0].error,
        DtdError::ChildTypeDtdConflict { index: 2, found, .. }
            if found == "title"
    ));

    assert!(matches!(
        &given.failures[1].error,
        DtdError::ChildTypeDtdConflict { index: 0, found, .. }
            if found == "u"
    ));

    // Both `para`s were placed but `title` is missing.
    assert!(matches!(
        &given.failures[2].error,
        DtdError::ChildIsNotOptional { kind, .. } if kind == "title"
    ));
}

#[test]
fn empty_element_is_validated() {
    let given = validate("<doc/>").unwrap();

    assert_eq!(given.validated, 1);
    assert!(matches!(
        &given.failures[0].error,
        DtdError::ChildIsNotOptional { kind, .. } if kind == "title"
    ));
}

#[test]
fn elements_without_model_are_not_validated() {
    let given = validate("<html><body/></html>").unwrap();

    assert!(given.is_valid());
    assert_eq!(given.validated, 0);
}

#[test]
fn inlining_warnings_reported_once_per_model() {
    let mut schema = Schema::new();
    schema
        .define_group("g", Particle::sequence([el("a")]).some())
        .unwrap();
    schema
        .define_model("x", Particle::group_ref("g").optional())
        .unwrap();

    let given = validate_document(
        &schema,
        "<r><x><a/></x><x/><x><a/></x></r>".as_bytes(),
        &Default::default(),
    )
    .unwrap();

    assert!(given.is_valid());
    assert_eq!(given.validated, 3);
    assert_eq!(given.warnings.len(), 1);
    assert_eq!(given.warnings[0].element, "x");
}

#[test]
fn group_precedence_is_configurable() {
    let mut schema = Schema::new();
    schema
        .define_group("g", Particle::sequence([el("a")]).some())
        .unwrap();
    schema
        .define_model("x", Particle::group_ref("g").optional())
        .unwrap();

    let config = ExpandConfig {
        precedence: BoundsPrecedence::Group,
        ..Default::default()
    };

    // The group's own bounds require at least one child.
    let given =
        validate_document(&schema, "<x/>".as_bytes(), &config).unwrap();

    assert!(matches!(
        &given.failures[0].error,
        DtdError::ChildIsNotOptional { kind, .. } if kind == "a"
    ));
}

#[test]
fn candidate_limit_is_a_failure() {
    let mut schema = Schema::new();
    schema
        .define_model(
            "x",
            Particle::sequence([
                Particle::choice([el("a"), el("b")]),
                Particle::choice([el("a"), el("b")]),
            ]),
        )
        .unwrap();

    let config = ExpandConfig {
        candidate_limit: Some(2),
        ..Default::default()
    };

    // Both `x`s share one cached expansion.
    let src = "<r><x><b/><b/></x><x><a/><a/></x></r>";
    let given = validate_document(&schema, src.as_bytes(), &config).unwrap();

    assert_eq!(given.failures.len(), 2);

    for failure in &given.failures {
        assert_eq!(failure.element, "x");
        assert_eq!(
            failure.error,
            DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 2 }),
        );
    }
}

#[test]
fn unreadable_documents() {
    assert_eq!(validate(""), Err(ValidateError::MissingRoot(0)));

    assert!(matches!(
        validate("<doc><para>"),
        Err(ValidateError::UnexpectedEof(_))
    ));

    assert!(matches!(
        validate("<doc></para>"),
        Err(ValidateError::Xml(_))
    ));
}

#[test]
fn unresolvable_model() {
    let mut schema = Schema::new();
    schema
        .define_model("x", Particle::group_ref("missing"))
        .unwrap();

    assert!(matches!(
        validate_document(&schema, "<x/>".as_bytes(), &Default::default()),
        Err(ValidateError::Schema(SchemaError::UnresolvedReference { .. }))
    ));
}

#[test]
fn failure_display() {
    let given = validate("<doc/>").unwrap();

    assert_eq!(
        given.failures[0].to_string(),
        "element `doc` at byte 0: missing required child of kind `title`",
    );
}
