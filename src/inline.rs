// Group inlining
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

//! Group inlining.
//!
//! A [`NodeKind::GroupReference`] stands in for a named subgrammar and
//!   holds a copy of that subgrammar as its only child.
//! Before a grammar can be [expanded](crate::expand),
//!   each reference is replaced by its child,
//!   which takes the reference's place among its siblings and inherits the
//!   occurrence bounds declared at the reference site.
//!
//! Inlining never fails,
//!   but some grammars are ambiguous about what the author intended;
//!     those conditions are reported as [`InlineWarning`]s,
//!     which the caller is expected to surface
//!       (e.g. via a [`Reporter`](crate::diagnose::Reporter)).

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic},
    fmt::{DisplayWrapper, TtQuote},
    grammar::{ChildKind, Grammar, GrammarPath, NodeKind, Occurrence},
};
use std::{
    error::Error,
    fmt::{self, Display},
};

/// Which occurrence bounds to keep when both a group reference and the
///   root of the group it references declare non-default bounds.
///
/// For example,
///   given a group `inline` defined as `(b | i)*` and referenced as
///   `(%inline;)+`,
///     [`BoundsPrecedence::Site`] produces `(b | i)+` and
///     [`BoundsPrecedence::Group`] produces `(b | i)*`.
/// A [`InlineWarning::ConflictingBounds`] is produced either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPrecedence {
    /// Bounds of the reference site win.
    #[default]
    Site,

    /// Bounds declared by the group itself win.
    Group,
}

/// Replace every group reference in `grammar` with its child.
///
/// The child's bounds become the bounds of the reference site;
///   see [`BoundsPrecedence`] for when the child declares bounds of its
///   own.
/// A reference with more than one child keeps only the first,
///   and a reference with no child becomes an empty sequence.
///
/// References nested within references are resolved as they are
///   encountered,
///     so the resulting grammar contains no references at all.
pub fn eliminate_group_reference<K: ChildKind>(
    grammar: &mut Grammar<K>,
    precedence: BoundsPrecedence,
) -> Vec<InlineWarning> {
    let mut warnings = Vec::new();
    let mut stack = vec![grammar.root()];

    while let Some(id) = stack.pop() {
        let group = match grammar.kind(id) {
            NodeKind::GroupReference(name) => name.clone(),
            _ => {
                stack.extend(grammar.children(id).iter().rev());
                continue;
            }
        };

        let path = grammar.path(id);
        let site = grammar.occurrence(id);
        let mut body = grammar.take_children(id);

        if body.len() > 1 {
            warnings.push(InlineWarning::DiscardedGroupChildren {
                group: group.clone(),
                discarded: body.len() - 1,
                path: path.clone(),
            });

            body.truncate(1);
        }

        let child = match body.first() {
            Some(&child) => child,
            None => {
                warnings.push(InlineWarning::EmptyGroup { group, path });
                grammar.set_kind(id, NodeKind::Sequence);
                continue;
            }
        };

        let own = grammar.occurrence(child);

        if !own.is_default() {
            warnings.push(InlineWarning::ConflictingBounds {
                group,
                site,
                own,
                precedence,
                path,
            });
        }

        let occ = match precedence {
            BoundsPrecedence::Group if !own.is_default() => own,
            _ => site,
        };

        grammar.set_occurrence(child, occ);
        grammar.replace(id, child);

        // The child may itself be a reference.
        stack.push(child);
    }

    warnings
}

/// A non-fatal condition encountered during inlining.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineWarning {
    /// The root of the group declares non-default bounds of its own,
    ///   which compete with the bounds of the reference site
    ///     (even if the two agree).
    ConflictingBounds {
        group: String,
        site: Occurrence,
        own: Occurrence,
        precedence: BoundsPrecedence,
        path: GrammarPath,
    },

    /// The reference held more than one child;
    ///   all but the first were dropped.
    DiscardedGroupChildren {
        group: String,
        discarded: usize,
        path: GrammarPath,
    },

    /// The reference held no child and was replaced by an empty sequence.
    EmptyGroup { group: String, path: GrammarPath },
}

impl InlineWarning {
    /// Position of the reference within the grammar before it was
    ///   inlined.
    pub fn path(&self) -> &GrammarPath {
        match self {
            Self::ConflictingBounds { path, .. }
            | Self::DiscardedGroupChildren { path, .. }
            | Self::EmptyGroup { path, .. } => path,
        }
    }
}

impl Display for InlineWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConflictingBounds {
                group, site, own, ..
            } if site == own => write!(
                f,
                "group {} and its reference both declare bounds {own}",
                TtQuote::wrap(group),
            ),
            Self::ConflictingBounds {
                group, site, own, ..
            } => write!(
                f,
                "group {} declares bounds {own} but is referenced with \
                    bounds {site}",
                TtQuote::wrap(group),
            ),
            Self::DiscardedGroupChildren {
                group, discarded, ..
            } => write!(
                f,
                "group {} has {discarded} particle(s) beyond its first",
                TtQuote::wrap(group),
            ),
            Self::EmptyGroup { group, .. } => {
                write!(f, "group {} is empty", TtQuote::wrap(group))
            }
        }
    }
}

impl Error for InlineWarning {}

impl Diagnostic for InlineWarning {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::ConflictingBounds {
                site, own, path, ..
            } if site == own => vec![
                path.warning(format!("bounds {own} are declared twice")),
                path.help("declare bounds either on the group or on its"),
                path.help("  references, but not both"),
            ],

            Self::ConflictingBounds {
                site,
                own,
                precedence,
                path,
                ..
            } => {
                let (kept, lost) = match precedence {
                    BoundsPrecedence::Site => (site, own),
                    BoundsPrecedence::Group => (own, site),
                };

                vec![
                    path.warning(format!("using bounds {kept}")),
                    path.note(format!("bounds {lost} were ignored")),
                    path.help("declare bounds either on the group or on its"),
                    path.help("  references, but not both"),
                ]
            }

            Self::DiscardedGroupChildren { path, .. } => vec![
                path.warning("only the first particle of this group is used"),
                path.help("wrap the particles of the group in a sequence"),
            ],

            Self::EmptyGroup { path, .. } => {
                vec![path.warning("this reference matches nothing")]
            }
        }
    }
}
