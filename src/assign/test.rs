// Child assignment tests
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
    expand::{generate_candidates, ExpandConfig},
    grammar::{GrammarPath, Occurrence, Particle, Step},
    trace::VoidTrace,
};
use std::fmt::{self, Display};

type Kind = &'static str;

fn expander(particle: Particle<Kind>) -> Expander<Kind> {
    Expander::new(Grammar::from(particle), &ExpandConfig::default())
}

fn children(kinds: &[Kind]) -> Vec<(usize, Kind)> {
    kinds.iter().copied().enumerate().collect()
}

fn el(kind: Kind) -> Particle<Kind> {
    Particle::element(kind)
}

// Sequence(A, B) accepting `[a, b]`.
#[test]
fn sequence_accepts_children_in_order() {
    let mut sut = expander(Particle::sequence([el("a"), el("b")]));

    let given = assign(&mut sut, &children(&["a", "b"])).unwrap();

    assert_eq!(given.collect_children(), vec![0, 1]);

    let leaves = given.tree().leaves();
    assert_eq!(given.held(leaves[0]), &[0]);
    assert_eq!(given.held(leaves[1]), &[1]);
}

#[test]
fn sequence_rejects_children_out_of_order() {
    let mut sut = expander(Particle::sequence([el("a"), el("b")]));

    let err = assign(&mut sut, &children(&["b", "a"])).unwrap_err();

    match err {
        DtdError::ChildTypeDtdConflict {
            index,
            found,
            expected,
            at,
        } => {
            assert_eq!(index, 1);
            assert_eq!(found, "a");
            assert_eq!(expected, vec!["b"]);
            assert_eq!(at.to_string(), "sequence/b[1]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// Choice(A, B) accepting `[a]`.
#[test]
fn choice_accepts_first_matching_branch() {
    let particle = Particle::choice([el("a"), el("b")]);
    let grammar = Grammar::from(particle.clone());

    assert_eq!(
        generate_candidates(grammar, &Default::default())
            .unwrap()
            .choices()
            .len(),
        2
    );

    let mut sut = expander(particle);
    let given = assign(&mut sut, &children(&["a"])).unwrap();

    let root = given.tree().root();
    assert_eq!(given.tree().get(root).choice(), Some(0));
    assert_eq!(given.collect_children(), vec![0]);

    // The second candidate was never needed.
    assert_eq!(sut.choices().len(), 1);
}

#[test]
fn choice_backtracks_to_later_branch() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]));

    let given = assign(&mut sut, &children(&["b"])).unwrap();

    let root = given.tree().root();
    assert_eq!(given.tree().get(root).choice(), Some(1));
    assert_eq!(given.collect_children(), vec![0]);
}

// Element(A) given no children.
#[test]
fn missing_required_child() {
    let mut sut = expander(el("a"));

    assert_eq!(
        assign(&mut sut, &children(&[])).unwrap_err(),
        DtdError::ChildIsNotOptional {
            slot: GrammarPath::new(vec![Step::new("a".into(), None)]),
            kind: "a",
            occ: Occurrence::ONE,
            held: 0,
        }
    );
}

#[test]
fn missing_required_child_between_others() {
    let mut sut =
        expander(Particle::sequence([el("a"), el("b"), el("c")]));

    match assign(&mut sut, &children(&["a", "c"])).unwrap_err() {
        DtdError::ChildIsNotOptional { slot, kind, .. } => {
            assert_eq!(kind, "b");
            assert_eq!(slot.to_string(), "sequence/b[1]");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn optional_child_may_be_omitted() {
    let mut sut =
        expander(Particle::sequence([el("a").optional(), el("b")]));

    let given = assign(&mut sut, &children(&["b"])).unwrap();
    assert_eq!(given.collect_children(), vec![0]);
}

// Element(A, 1, 2) given three.
#[test]
fn too_many_children() {
    let mut sut = expander(el("a").occurs(1, Some(2)));

    match assign(&mut sut, &children(&["a", "a", "a"])).unwrap_err() {
        DtdError::ChildOccurrenceDtdConflict {
            index,
            found,
            slot,
            occ,
        } => {
            assert_eq!(index, 2);
            assert_eq!(found, "a");
            assert_eq!(slot.to_string(), "a");
            assert_eq!(occ, Occurrence::new(1, Some(2)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn repeating_element_holds_consecutive_children() {
    let mut sut = expander(Particle::sequence([el("a").any(), el("b")]));

    let given = assign(&mut sut, &children(&["a", "a", "a", "b"])).unwrap();

    assert_eq!(given.collect_children(), vec![0, 1, 2, 3]);
    assert_eq!(given.held(given.tree().leaves()[0]), &[0, 1, 2]);
}

#[test]
fn repeating_sequence_does_not_extend_slot() {
    let mut sut = expander(Particle::sequence([el("a")]).occurs(1, Some(3)));

    assert!(matches!(
        assign(&mut sut, &children(&["a", "a"])).unwrap_err(),
        DtdError::ChildOccurrenceDtdConflict { index: 1, .. }
    ));
}

#[test]
fn repeating_choice_scales_slot_capacity() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]).some());

    let given = assign(&mut sut, &children(&["a", "a", "a"])).unwrap();
    assert_eq!(given.collect_children(), vec![0, 1, 2]);
}

#[test]
fn repeating_choice_scaled_capacity_is_bounded() {
    let mut sut =
        expander(Particle::choice([el("a"), el("b")]).occurs(1, Some(2)));

    // The first candidate fills its slot;
    //   the second does not accept `a` at all.
    match assign(&mut sut, &children(&["a", "a", "a"])).unwrap_err() {
        DtdError::DtdConflict(DtdConflict::NoCandidate {
            candidates,
            cause,
        }) => {
            assert_eq!(candidates, 2);
            assert!(matches!(
                *cause,
                DtdError::ChildOccurrenceDtdConflict { index: 2, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn repeating_choice_scales_minimum() {
    let particle = Particle::choice([el("a"), el("b")]).occurs(2, None);

    let mut sut = expander(particle.clone());
    assert!(assign(&mut sut, &children(&["b", "b"])).is_ok());

    let mut sut = expander(particle);

    match assign(&mut sut, &children(&["a"])).unwrap_err() {
        DtdError::DtdConflict(DtdConflict::NoCandidate { cause, .. }) => {
            assert!(matches!(
                *cause,
                DtdError::ChildIsNotOptional { held: 1, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn uniform_failures_report_best_candidate_directly() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]));

    match assign(&mut sut, &children(&["c"])).unwrap_err() {
        DtdError::ChildTypeDtdConflict {
            index, expected, ..
        } => {
            assert_eq!(index, 0);

            // First candidate wins ties.
            assert_eq!(expected, vec!["a"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// Bag Choice(A, B) given `[a, b, a]`.
#[test]
fn bag_pools_children_in_insertion_order() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]).any());

    let given = assign(&mut sut, &children(&["a", "b", "a"])).unwrap();

    let root = given.tree().root();
    assert_eq!(given.held(root), &[0, 1, 2]);
    assert_eq!(given.collect_children(), vec![0, 1, 2]);

    // The committed branch itself holds nothing.
    let leaf = given.tree().leaves()[0];
    assert_eq!(given.held(leaf), &[] as &[usize]);
}

#[test]
fn empty_bag_is_satisfied() {
    let mut sut = expander(Particle::sequence([
        el("title"),
        Particle::choice([el("b"), el("i")]).any(),
    ]));

    let given = assign(&mut sut, &children(&["title"])).unwrap();
    assert_eq!(given.collect_children(), vec![0]);
}

#[test]
fn bag_via_group_reference() {
    let mut sut = expander(Particle::sequence([
        el("title").optional(),
        Particle::group("inline", Particle::choice([el("b"), el("i")])).any(),
    ]));

    let kinds = children(&["title", "i", "b", "i"]);
    let given = assign(&mut sut, &kinds).unwrap();

    assert_eq!(given.collect_children(), vec![0, 1, 2, 3]);
    assert!(sut.warnings().is_empty());
}

#[test]
fn bag_rejects_undeclared_kind() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]).any());

    match assign(&mut sut, &children(&["a", "c"])).unwrap_err() {
        DtdError::ChildTypeDtdConflict {
            index,
            found,
            expected,
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(found, "c");
            assert_eq!(expected, vec!["a", "b"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ((a, b) | c)*
fn mixed_bag() -> Expander<Kind> {
    expander(
        Particle::choice([Particle::sequence([el("a"), el("b")]), el("c")])
            .any(),
    )
}

#[test]
fn bag_pools_children_of_nested_branches() {
    let mut sut = mixed_bag();

    let given = assign(&mut sut, &children(&["c", "a", "b"])).unwrap();

    let root = given.tree().root();
    assert_eq!(given.held(root), &[0, 1, 2]);
    assert_eq!(given.collect_children(), vec![0, 1, 2]);

    // Every slot beneath the bag delegates to it.
    for leaf in given.tree().leaves() {
        assert_eq!(given.tree().enclosing_bag(leaf), Some(root));
        assert!(given.held(leaf).is_empty());
    }
}

#[test]
fn bag_repeats_sequence_branch() {
    let mut sut = mixed_bag();

    let kinds = children(&["a", "b", "a", "b"]);
    let given = assign(&mut sut, &kinds).unwrap();

    assert_eq!(given.collect_children(), vec![0, 1, 2, 3]);
}

#[test]
fn bag_of_nested_branches_rejects_undeclared_kind() {
    let mut sut = mixed_bag();

    match assign(&mut sut, &children(&["c", "d"])).unwrap_err() {
        DtdError::ChildTypeDtdConflict {
            index,
            found,
            expected,
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(found, "d");
            assert_eq!(expected, vec!["a", "b", "c"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn nested_bags_pool_on_outermost() {
    // ((a | b)* | c)*
    let mut sut = expander(
        Particle::choice([Particle::choice([el("a"), el("b")]).any(), el("c")])
            .any(),
    );

    let given = assign(&mut sut, &children(&["a", "c", "b"])).unwrap();

    let root = given.tree().root();
    assert_eq!(given.held(root), &[0, 1, 2]);
    assert_eq!(given.collect_children(), vec![0, 1, 2]);
}

// Unknown kind C.
#[test]
fn unknown_kind_rejected() {
    let mut sut = expander(Particle::sequence([el("a"), el("b")]));

    assert_eq!(
        assign(&mut sut, &children(&["c"])).unwrap_err(),
        DtdError::ChildTypeDtdConflict {
            index: 0,
            found: "c",
            expected: vec!["a", "b"],
            at: GrammarPath::new(vec![
                Step::new("sequence".into(), None),
                Step::new("a".into(), Some(0)),
            ]),
        }
    );
}

#[test]
fn vacant_optional_group_is_satisfied() {
    let particle = Particle::sequence([
        el("x"),
        Particle::sequence([el("a"), el("b")]).optional(),
    ]);

    let mut sut = expander(particle.clone());
    assert!(assign(&mut sut, &children(&["x"])).is_ok());

    let mut sut = expander(particle.clone());
    assert!(assign(&mut sut, &children(&["x", "a", "b"])).is_ok());

    // All or nothing.
    let mut sut = expander(particle);
    match assign(&mut sut, &children(&["x", "a"])).unwrap_err() {
        DtdError::ChildIsNotOptional { kind, .. } => assert_eq!(kind, "b"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unverifiable_repeating_sequence_minimum() {
    let inner = Particle::sequence([el("a")]).occurs(2, Some(2));
    let mut sut = expander(Particle::sequence([inner]));

    match assign(&mut sut, &children(&["a"])).unwrap_err() {
        DtdError::DtdConflict(DtdConflict::UndefinedOccurrenceRule {
            slot,
            parent,
            parent_occ,
        }) => {
            assert_eq!(slot.to_string(), "sequence/sequence[0]/a[0]");
            assert_eq!(parent.to_string(), "sequence/sequence[0]");
            assert_eq!(parent_occ, Occurrence::new(2, Some(2)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn add_xml_child_reports_slot_errors() {
    let sut = expander(Particle::sequence([el("a")]));
    let template = sut.template().clone();
    let mut given = Assignment::new(Grammar::seed(&template));

    // Mirror the single slot by hand.
    let root = given.tree.root();
    let leaf = given.tree.copy_node(
        &template,
        template.children(template.root())[0],
        root,
    );
    given.slots.push(Vec::new());

    assert_eq!(
        given.add_xml_child(&template, leaf, 1, &"b"),
        Err(SlotError::TypeMismatch)
    );
    assert_eq!(given.add_xml_child(&template, leaf, 1, &"a"), Ok(leaf));
    assert_eq!(
        given.add_xml_child(&template, leaf, 2, &"a"),
        Err(SlotError::Full)
    );

    assert_eq!(given.held(leaf), &[1]);
}

#[test]
fn remove_child_from_slot_and_bag() {
    let mut sut = expander(Particle::sequence([
        el("title"),
        Particle::choice([el("b"), el("i")]).any(),
    ]));

    let mut given =
        assign(&mut sut, &children(&["title", "b", "i", "b"])).unwrap();

    let title = given.tree().leaves()[0];
    let bag = given.tree().children(given.tree().root())[1];

    assert_eq!(given.remove_child(&2), Some(bag));
    assert_eq!(given.collect_children(), vec![0, 1, 3]);

    assert_eq!(given.remove_child(&0), Some(title));
    assert_eq!(given.collect_children(), vec![1, 3]);

    // Removing again is a no-op.
    assert_eq!(given.remove_child(&0), None);
    assert_eq!(given.remove_child(&2), None);
    assert_eq!(given.collect_children(), vec![1, 3]);
}

#[test]
fn remove_child_removes_first_equal_object() {
    let mut sut = expander(el("a").any());

    let kinds = [("x", "a"), ("y", "a"), ("x", "a")];
    let mut given = assign(&mut sut, &kinds).unwrap();

    let root = given.tree().root();
    assert_eq!(given.remove_child(&"x"), Some(root));
    assert_eq!(given.collect_children(), vec!["y", "x"]);
}

#[test]
fn explicit_trace() {
    let mut sut = expander(Particle::choice([el("a"), el("b")]));

    let given =
        assign_traced(&mut sut, &children(&["b"]), &mut VoidTrace).unwrap();

    assert_eq!(given.collect_children(), vec![0]);
}

#[test]
fn candidate_limit_is_propagated() {
    let config = ExpandConfig {
        candidate_limit: Some(1),
        ..Default::default()
    };

    let grammar = Grammar::from(Particle::choice([el("a"), el("b")]));
    let mut sut = Expander::new(grammar, &config);

    // Expanding even the first candidate exceeds the limit.
    assert_eq!(
        assign(&mut sut, &children(&["b"])).unwrap_err(),
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 1 }),
    );
}

#[test]
fn candidate_limit_is_reported_for_every_assignment() {
    let config = ExpandConfig {
        candidate_limit: Some(2),
        ..Default::default()
    };

    // (a | b), (c | d)
    let grammar = Grammar::from(Particle::sequence([
        Particle::choice([el("a"), el("b")]),
        Particle::choice([el("c"), el("d")]),
    ]));
    let mut sut = Expander::new(grammar, &config);

    let expected =
        DtdError::DtdConflict(DtdConflict::CandidateLimit { limit: 2 });

    // The same expander is shared by every element of a model,
    //   so the verdict must not change between assignments.
    assert_eq!(assign(&mut sut, &children(&["b", "d"])).unwrap_err(), expected);
    assert_eq!(assign(&mut sut, &children(&["b", "d"])).unwrap_err(), expected);
    assert_eq!(assign(&mut sut, &children(&["a", "c"])).unwrap_err(), expected);
}

/// Kind with a single level of subtyping.
#[derive(Debug, Clone, PartialEq)]
enum Block {
    Any,
    Para,
    Note,
}

impl Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Any => write!(f, "block"),
            Self::Para => write!(f, "para"),
            Self::Note => write!(f, "note"),
        }
    }
}

impl ChildKind for Block {
    fn satisfies(&self, accepted: &Self) -> bool {
        accepted == &Self::Any || self == accepted
    }
}

#[test]
fn kinds_may_model_subtyping() {
    let grammar = Grammar::from(Particle::sequence([
        Particle::element(Block::Note).optional(),
        Particle::element(Block::Any).any(),
    ]));

    let mut sut = Expander::new(grammar, &Default::default());
    let kinds = [(0, Block::Note), (1, Block::Para), (2, Block::Note)];

    let given = assign(&mut sut, &kinds).unwrap();

    let leaves = given.tree().leaves();
    assert_eq!(given.held(leaves[0]), &[0]);
    assert_eq!(given.held(leaves[1]), &[1, 2]);
}
