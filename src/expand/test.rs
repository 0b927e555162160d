// Choice expansion tests
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
use crate::grammar::{Occurrence, Particle};

type Sut = Expander<&'static str>;

fn shape(grammar: &Grammar<&'static str>) -> Vec<String> {
    grammar
        .preorder()
        .map(|id| grammar.kind(id).to_string())
        .collect()
}

fn elements(grammar: &Grammar<&'static str>) -> Vec<&'static str> {
    grammar
        .leaves()
        .into_iter()
        .filter_map(|id| match grammar.kind(id) {
            NodeKind::Element(kind) => Some(*kind),
            _ => None,
        })
        .collect()
}

fn ab_choice() -> Particle<&'static str> {
    Particle::choice([Particle::element("a"), Particle::element("b")])
}

#[test]
fn grammar_without_choice_yields_single_mirror() {
    let grammar = Grammar::from(Particle::sequence([
        Particle::element("a"),
        Particle::sequence([Particle::element("b"), Particle::element("c")])
            .optional(),
    ]));

    let sut = generate_candidates(grammar.clone(), &Default::default())
        .unwrap();

    assert_eq!(sut.choices().len(), 1);
    assert!(sut.is_exhausted());

    let candidate = &sut.choices()[0];
    assert_eq!(shape(candidate), shape(&grammar));

    // Every candidate node refers back to the template node it mirrors.
    for id in candidate.preorder() {
        let orig = candidate.get(id).original().unwrap();
        assert_eq!(candidate.kind(id), sut.template().kind(orig));
        assert_eq!(
            candidate.occurrence(id),
            sut.template().occurrence(orig)
        );
    }
}

#[test]
fn single_choice_yields_one_candidate_per_branch() {
    let grammar = Grammar::from(Particle::choice([
        Particle::element("a"),
        Particle::element("b"),
        Particle::element("c"),
    ]));

    let sut = generate_candidates(grammar, &Default::default()).unwrap();
    let choices = sut.choices();

    assert_eq!(choices.len(), 3);

    for (i, candidate) in choices.iter().enumerate() {
        let root = candidate.root();
        assert_eq!(candidate.get(root).choice(), Some(i));
        assert_eq!(candidate.children(root).len(), 1);

        let child = candidate.children(root)[0];
        let tchild = sut.template().children(sut.template().root())[i];
        assert_eq!(candidate.get(child).original(), Some(tchild));
    }

    assert_eq!(
        choices.iter().map(elements).collect::<Vec<_>>(),
        vec![vec!["a"], vec!["b"], vec!["c"]],
    );
}

#[test]
fn sibling_choices_yield_product_of_branches() {
    let grammar = Grammar::from(Particle::sequence([
        ab_choice(),
        Particle::choice([
            Particle::element("x"),
            Particle::element("y"),
            Particle::element("z"),
        ]),
    ]));

    let sut = generate_candidates(grammar, &Default::default()).unwrap();

    let mut given = sut.choices().iter().map(elements).collect::<Vec<_>>();
    assert_eq!(given.len(), 6);

    // The first candidate always commits to every first branch.
    assert_eq!(given[0], vec!["a", "x"]);

    given.sort();
    assert_eq!(
        given,
        vec![
            vec!["a", "x"],
            vec!["a", "y"],
            vec!["a", "z"],
            vec!["b", "x"],
            vec!["b", "y"],
            vec!["b", "z"],
        ],
    );
}

#[test]
fn choice_within_branch_is_expanded_in_its_candidates() {
    let grammar = Grammar::from(Particle::choice([
        Particle::element("a"),
        Particle::choice([Particle::element("b"), Particle::element("c")]),
    ]));

    let sut = generate_candidates(grammar, &Default::default()).unwrap();

    assert_eq!(
        sut.choices().iter().map(elements).collect::<Vec<_>>(),
        vec![vec!["a"], vec!["b"], vec!["c"]],
    );
}

#[test]
fn candidates_never_contain_group_references() {
    let grammar = Grammar::from(Particle::sequence([
        Particle::element("title"),
        Particle::group("inline", ab_choice()).any(),
    ]));

    let sut = generate_candidates(grammar, &Default::default()).unwrap();

    assert_eq!(sut.choices().len(), 2);
    assert!(sut.warnings().is_empty());

    for candidate in sut.choices() {
        assert!(candidate.preorder().all(|id| !matches!(
            candidate.kind(id),
            NodeKind::GroupReference(_)
        )));
    }

    // The inlined choice took on the bounds of its reference.
    let candidate = &sut.choices()[0];
    let choice = candidate.children(candidate.root())[1];
    assert_eq!(candidate.occurrence(choice), Occurrence::ANY);
    assert!(candidate.is_bag(choice));
}

#[test]
fn inlining_warnings_are_retained() {
    let group = Particle::group("inline", ab_choice().some()).optional();
    let grammar = Grammar::from(Particle::sequence([group]));

    let sut = Sut::new(grammar, &Default::default());

    assert_eq!(sut.warnings().len(), 1);
    assert!(matches!(
        sut.warnings()[0],
        InlineWarning::ConflictingBounds { .. }
    ));
}

#[test]
fn candidates_are_expanded_lazily() {
    let grammar =
        Grammar::from(Particle::sequence([ab_choice(), ab_choice()]));
    let mut sut = Sut::new(grammar, &Default::default());

    assert_eq!(sut.choices().len(), 0);

    let first = sut.candidate(0).unwrap().map(elements);
    assert_eq!(first, Some(vec!["a", "a"]));

    // Only the requested candidate has been expanded,
    //   though it has spawned its alternatives.
    assert_eq!(sut.choices().len(), 1);
    assert!(!sut.is_exhausted());

    assert!(sut.candidate(3).unwrap().is_some());
    assert_eq!(sut.choices().len(), 4);
    assert!(sut.is_exhausted());

    assert_eq!(sut.candidate(4).unwrap(), None);
}

#[test]
fn lazy_and_eager_expansion_agree() {
    let particle = Particle::sequence([
        ab_choice(),
        Particle::element("m"),
        Particle::choice([Particle::element("x"), ab_choice()]),
    ]);

    let config = ExpandConfig::default();
    let eager =
        generate_candidates(Grammar::from(particle.clone()), &config).unwrap();

    let mut lazy = Sut::new(Grammar::from(particle), &config);
    let mut given = Vec::new();

    let mut i = 0;
    while let Some(candidate) = lazy.candidate(i).unwrap() {
        given.push(candidate.clone());
        i += 1;
    }

    assert_eq!(given.as_slice(), eager.choices());
}

#[test]
fn candidate_limit_fails_fast() {
    let grammar = Grammar::from(Particle::sequence([
        ab_choice(),
        ab_choice(),
        ab_choice(),
    ]));

    let config = ExpandConfig {
        candidate_limit: Some(4),
        ..Default::default()
    };

    assert_eq!(
        generate_candidates(grammar.clone(), &config).unwrap_err(),
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 4 }),
    );

    // Without a limit,
    //   all eight are produced.
    let unlimited = ExpandConfig {
        candidate_limit: None,
        ..Default::default()
    };

    let sut = generate_candidates(grammar, &unlimited).unwrap();
    assert_eq!(sut.choices().len(), 8);
}

#[test]
fn candidate_limit_is_inclusive() {
    let grammar = Grammar::from(Particle::choice([
        Particle::element("a"),
        Particle::element("b"),
        Particle::element("c"),
    ]));

    let exact = ExpandConfig {
        candidate_limit: Some(3),
        ..Default::default()
    };

    let sut = generate_candidates(grammar.clone(), &exact).unwrap();
    assert_eq!(sut.choices().len(), 3);

    let short = ExpandConfig {
        candidate_limit: Some(2),
        ..Default::default()
    };

    assert_eq!(
        generate_candidates(grammar, &short).unwrap_err(),
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 2 }),
    );
}

#[test]
fn wide_choice_fails_before_spawning_every_branch() {
    let branches = (0..10_000).map(|_| Particle::element("a"));
    let grammar = Grammar::from(Particle::choice(branches));

    let config = ExpandConfig {
        candidate_limit: Some(8),
        ..Default::default()
    };

    let mut sut = Sut::new(grammar, &config);

    assert_eq!(
        sut.candidate(0).unwrap_err(),
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 8 }),
    );

    // Nothing was retained from the failed expansion.
    assert_eq!(sut.choices.len(), 1);
}

#[test]
fn candidate_limit_error_is_retained() {
    // (a | b), (c | d)
    let grammar = Grammar::from(Particle::sequence([
        ab_choice(),
        Particle::choice([Particle::element("c"), Particle::element("d")]),
    ]));

    let config = ExpandConfig {
        candidate_limit: Some(2),
        ..Default::default()
    };

    let mut sut = Sut::new(grammar, &config);
    let expected =
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 2 });

    assert_eq!(sut.candidate(0).unwrap_err(), expected);

    // Every later request fails the same way rather than yielding the
    //   unfinished candidate.
    assert_eq!(sut.candidate(0).unwrap_err(), expected);
    assert_eq!(sut.candidate(3).unwrap_err(), expected);
    assert_eq!(sut.expand_all().unwrap_err(), expected);

    assert!(sut.choices().is_empty());
    assert!(!sut.is_exhausted());
}

#[test]
fn bag_choice_is_expanded_like_any_other() {
    let grammar = Grammar::from(ab_choice().any());

    let sut = generate_candidates(grammar, &Default::default()).unwrap();

    assert_eq!(sut.choices().len(), 2);
    assert!(sut.choices().iter().all(|c| c.is_bag(c.root())));
}

#[test]
fn empty_choice_yields_single_childless_candidate() {
    let grammar: Grammar<&'static str> = Grammar::from(Particle::choice([]));

    let sut = generate_candidates(grammar, &Default::default()).unwrap();

    assert_eq!(sut.choices().len(), 1);

    let candidate = &sut.choices()[0];
    assert!(candidate.children(candidate.root()).is_empty());
    assert_eq!(candidate.get(candidate.root()).choice(), None);
}

#[test]
fn template_is_not_modified_by_expansion() {
    let grammar = Grammar::from(Particle::sequence([
        ab_choice(),
        Particle::element("c"),
    ]));

    let sut = generate_candidates(grammar.clone(), &Default::default())
        .unwrap();

    assert_eq!(sut.template(), &grammar);
}
