// Content model validation errors
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

//! Errors raised while validating children against a content model.
//!
//! Every error is fatal to the current validation attempt;
//!   the engine never partially accepts a sequence of children.
//! It is up to the caller to decide whether to retry with different
//!   input,
//!   reject the edit that produced the children,
//!   or report the error to the user.

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic},
    fmt::{
        AndConjList, DisplayWrapper, ListDisplayWrapper, OrConjList, TtQuote,
    },
    grammar::{GrammarPath, Occurrence, Step},
};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};

/// Failure to validate a sequence of children against a content model.
///
/// `K` is the [`ChildKind`](crate::grammar::ChildKind) of the grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum DtdError<K> {
    /// A child's kind is not accepted by any remaining slot.
    ///
    /// `at` is the slot at which the search began
    ///   (or the root if the grammar has no slots),
    ///   and `expected` lists the kinds accepted from that point forward.
    ChildTypeDtdConflict {
        index: usize,
        found: K,
        expected: Vec<K>,
        at: GrammarPath,
    },

    /// A child's kind is accepted by a remaining slot,
    ///   but every such slot is already full.
    ChildOccurrenceDtdConflict {
        index: usize,
        found: K,
        slot: GrammarPath,
        occ: Occurrence,
    },

    /// A slot holds fewer children than its minimum occurrence after all
    ///   children have been assigned.
    ChildIsNotOptional {
        slot: GrammarPath,
        kind: K,
        occ: Occurrence,
        held: usize,
    },

    /// The content model as a whole could not be satisfied.
    DtdConflict(DtdConflict<K>),
}

/// Failures of a content model as a whole,
///   rather than of any particular child.
#[derive(Debug, Clone, PartialEq)]
pub enum DtdConflict<K> {
    /// No candidate tree accepted the children,
    ///   and the candidates failed for differing reasons.
    ///
    /// `cause` is the failure of the candidate that placed the most
    ///   children.
    NoCandidate {
        candidates: usize,
        cause: Box<DtdError<K>>,
    },

    /// Expansion produced more candidate trees than permitted by
    ///   [`ExpandConfig`](crate::expand::ExpandConfig).
    CandidateLimit { limit: usize },

    /// Named groups reference one another in a cycle and so cannot be
    ///   inlined into a finite grammar.
    ///
    /// Each inner vector is one cycle.
    CyclicGroups(Vec<Vec<String>>),

    /// There is no rule to decide whether a slot's minimum occurrence is
    ///   satisfied given the bounds of its parent.
    UndefinedOccurrenceRule {
        slot: GrammarPath,
        parent: GrammarPath,
        parent_occ: Occurrence,
    },
}

impl<K> DtdError<K> {
    /// Number of children that were placed before this error occurred,
    ///   used to rank the failures of competing candidate trees.
    ///
    /// An error raised after every child was placed ranks above any error
    ///   raised during placement.
    pub fn progress(&self) -> usize {
        match self {
            Self::ChildTypeDtdConflict { index, .. }
            | Self::ChildOccurrenceDtdConflict { index, .. } => *index,
            Self::ChildIsNotOptional { .. }
            | Self::DtdConflict(DtdConflict::UndefinedOccurrenceRule {
                ..
            }) => usize::MAX,
            Self::DtdConflict(DtdConflict::NoCandidate { cause, .. }) => {
                cause.progress()
            }
            Self::DtdConflict(_) => 0,
        }
    }
}

impl<K> From<DtdConflict<K>> for DtdError<K> {
    fn from(conflict: DtdConflict<K>) -> Self {
        Self::DtdConflict(conflict)
    }
}

impl<K: Display> Display for DtdError<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DtdError::*;

        match self {
            ChildTypeDtdConflict { index, found, .. } => write!(
                f,
                "child {index} of kind {} is not permitted here",
                TtQuote::wrap(found),
            ),
            ChildOccurrenceDtdConflict { index, found, .. } => write!(
                f,
                "child {index} of kind {} exceeds the maximum occurrence \
                    of its slot",
                TtQuote::wrap(found),
            ),
            ChildIsNotOptional { kind, .. } => write!(
                f,
                "missing required child of kind {}",
                TtQuote::wrap(kind)
            ),
            DtdConflict(conflict) => Display::fmt(conflict, f),
        }
    }
}

impl<K: Display> Display for DtdConflict<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use DtdConflict::*;

        match self {
            NoCandidate { candidates, .. } => write!(
                f,
                "none of the {candidates} shapes of this content model \
                    accept these children",
            ),
            CandidateLimit { limit } => write!(
                f,
                "content model expands into more than {limit} shapes",
            ),
            CyclicGroups(cycles) => write!(
                f,
                "cyclic references among groups {}",
                AndConjList::<TtQuote>::wrap(&cycles.concat()[..]),
            ),
            UndefinedOccurrenceRule { slot, .. } => write!(
                f,
                "no rule is defined to verify the minimum occurrence of {}",
                TtQuote::wrap(slot),
            ),
        }
    }
}

impl<K: Debug + Display + 'static> Error for DtdError<K> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DtdConflict(conflict) => conflict.source(),
            _ => None,
        }
    }
}

impl<K: Debug + Display + 'static> Error for DtdConflict<K> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoCandidate { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl<K: Debug + Display + 'static> Diagnostic for DtdError<K> {
    fn describe(&self) -> Vec<AnnotatedPath> {
        use DtdError::*;

        match self {
            ChildTypeDtdConflict { expected, at, .. }
                if expected.is_empty() =>
            {
                vec![at.error("no slot remains from this point onward")]
            }

            ChildTypeDtdConflict { expected, at, .. } => vec![
                at.error(format!(
                    "expected {} from here onward",
                    OrConjList::<TtQuote>::wrap(expected),
                )),
                at.help("children must appear in the order declared by"),
                at.help("  the content model"),
            ],

            ChildOccurrenceDtdConflict { slot, occ, .. } => vec![
                slot.error(format!("this slot admits {occ} occurrences")),
                slot.help("remove the extra child or raise the maximum"),
                slot.help("  occurrence of this slot"),
            ],

            ChildIsNotOptional {
                slot, occ, held, ..
            } => vec![slot.error(format!(
                "this slot requires at least {} but holds {held}",
                occ.min
            ))],

            DtdConflict(conflict) => conflict.describe(),
        }
    }
}

impl<K: Debug + Display + 'static> Diagnostic for DtdConflict<K> {
    fn describe(&self) -> Vec<AnnotatedPath> {
        use DtdConflict::*;

        let nowhere = &GrammarPath::new(vec![]);

        match self {
            NoCandidate { candidates, cause } => {
                let mut desc = cause.describe();
                desc.push(nowhere.note(format!(
                    "the above is the closest of {candidates} shapes"
                )));
                desc
            }

            CandidateLimit { .. } => vec![
                nowhere.error("expansion was abandoned"),
                nowhere.help("each choice multiplies the number of shapes"),
                nowhere.help("  of the content model; raise the candidate"),
                nowhere.help("  limit or factor choices into bags"),
            ],

            CyclicGroups(cycles) => cycles
                .iter()
                .flat_map(|cycle| {
                    let steps = cycle
                        .iter()
                        .map(|name| Step::new(format!("group({name})"), None))
                        .collect();

                    GrammarPath::new(steps)
                        .error("these groups reference one another")
                        .with_help("a group may not contain itself")
                })
                .collect(),

            UndefinedOccurrenceRule {
                slot,
                parent,
                parent_occ,
            } => vec![
                slot.mark_error(),
                parent.note(format!(
                    "this sequence must occur {parent_occ} times"
                )),
                parent.help("sequences repeated a minimum of more than once"),
                parent.help("  are not supported"),
            ],
        }
    }
}
