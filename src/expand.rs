// Choice expansion
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

//! Choice expansion.
//!
//! A grammar containing choices is ambiguous:
//!   a child may be matched by any of several branches.
//! Expansion resolves that ambiguity by enumerating _candidate trees_,
//!   which are copies of the grammar in which every choice has committed
//!   to exactly one branch.
//! Sibling branches are not dead children of the same candidate;
//!   each lives in a separate candidate tree.
//!
//! Candidates are produced lazily and in a stable order:
//!   candidate 0 commits every choice to its first branch,
//!   and each choice encountered while expanding a candidate appends one
//!   new whole-tree candidate for each of its remaining branches.
//! The list of candidates therefore grows while it is being processed,
//!   and is processed by index until no candidate remains unexpanded.
//!
//! The number of candidates is the product of the branch counts of the
//!   grammar's choices,
//!     which grows combinatorially;
//!   [`ExpandConfig::candidate_limit`] bounds it.
//!
//! Bag choices
//!   (see [`NodeKind::Choice`])
//!   are expanded like any other,
//!     but since every slot beneath a bag accepts the kind of any
//!     element declared within it
//!     (see [`crate::assign`]),
//!     each of its candidates is equivalent.

use crate::{
    error::{DtdConflict, DtdError},
    global,
    grammar::{ChildKind, Grammar, NodeId, NodeKind},
    inline::{eliminate_group_reference, BoundsPrecedence, InlineWarning},
};

/// Configuration of an [`Expander`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandConfig {
    /// Maximum number of candidate trees,
    ///   or [`None`] for no limit.
    pub candidate_limit: Option<usize>,

    /// Bounds to keep when inlining a group whose bounds conflict with
    ///   those of its reference.
    pub precedence: BoundsPrecedence,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            candidate_limit: Some(global::DEFAULT_CANDIDATE_LIMIT),
            precedence: BoundsPrecedence::default(),
        }
    }
}

/// Lazily growing list of candidate trees for a single grammar.
///
/// The grammar is inlined once upon construction and retained as the
///   _template_ that each candidate node's
///   [original](crate::grammar::Node::original) refers to.
#[derive(Debug, Clone)]
pub struct Expander<K> {
    template: Grammar<K>,

    /// Candidate trees,
    ///   of which the first `expanded` are complete.
    choices: Vec<Grammar<K>>,

    expanded: usize,
    limit: Option<usize>,
    warnings: Vec<InlineWarning>,

    /// Set once expansion exceeds `limit`,
    ///   after which no further candidate is expanded.
    halted: Option<DtdError<K>>,
}

impl<K: ChildKind> Expander<K> {
    /// Inline `grammar` and prepare it for expansion.
    ///
    /// No candidate is expanded until requested.
    pub fn new(mut grammar: Grammar<K>, config: &ExpandConfig) -> Self {
        let warnings =
            eliminate_group_reference(&mut grammar, config.precedence);
        let seed = Grammar::seed(&grammar);

        Self {
            template: grammar,
            choices: vec![seed],
            expanded: 0,
            limit: config.candidate_limit,
            warnings,
            halted: None,
        }
    }

    /// The inlined grammar from which candidates are copied.
    pub fn template(&self) -> &Grammar<K> {
        &self.template
    }

    /// Warnings produced while inlining the grammar.
    pub fn warnings(&self) -> &[InlineWarning] {
        &self.warnings
    }

    /// Candidates that have been completely expanded so far.
    pub fn choices(&self) -> &[Grammar<K>] {
        &self.choices[..self.expanded]
    }

    /// Whether every candidate has been expanded.
    pub fn is_exhausted(&self) -> bool {
        self.expanded == self.choices.len()
    }

    /// Retrieve candidate `i`,
    ///   expanding as many candidates as necessary to produce it.
    ///
    /// Returns [`None`] once `i` exceeds the number of candidates the
    ///   grammar can represent.
    ///
    /// Once the candidate limit has been exceeded,
    ///   every request for a candidate not yet expanded fails with the
    ///   same error.
    pub fn candidate(
        &mut self,
        i: usize,
    ) -> Result<Option<&Grammar<K>>, DtdError<K>> {
        while self.expanded <= i && !self.is_exhausted() {
            self.expand_next()?;
        }

        Ok(self.choices.get(i))
    }

    /// Expand every remaining candidate.
    pub fn expand_all(&mut self) -> Result<&[Grammar<K>], DtdError<K>> {
        while !self.is_exhausted() {
            self.expand_next()?;
        }

        Ok(&self.choices)
    }

    /// Expand the next unexpanded candidate,
    ///   appending any candidates spawned by its choices.
    ///
    /// The partially expanded candidate is left unfinished if the limit is
    ///   exceeded;
    ///     it is never revisited.
    fn expand_next(&mut self) -> Result<(), DtdError<K>> {
        if let Some(err) = &self.halted {
            return Err(err.clone());
        }

        let room = self.limit.map(|limit| Room {
            limit,
            used: self.choices.len(),
        });

        let mut spawned = Vec::new();
        let tree = &mut self.choices[self.expanded];
        let root = tree.root();

        match expand_node(&self.template, tree, root, &mut spawned, room) {
            Ok(()) => {
                self.expanded += 1;
                self.choices.extend(spawned);
                Ok(())
            }
            Err(conflict) => {
                let err = DtdError::from(conflict);
                self.halted = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Number of candidates that may still be spawned under a limit.
#[derive(Debug, Clone, Copy)]
struct Room {
    limit: usize,

    /// Candidates that exist before the current expansion.
    used: usize,
}

impl Room {
    /// Fail if one more candidate beyond `spawned` would exceed the limit.
    fn reserve<K>(self, spawned: usize) -> Result<(), DtdConflict<K>> {
        match self.used + spawned < self.limit {
            true => Ok(()),
            false => Err(DtdConflict::CandidateLimit { limit: self.limit }),
        }
    }
}

/// Inline `grammar` and expand every candidate tree it represents.
pub fn generate_candidates<K: ChildKind>(
    grammar: Grammar<K>,
    config: &ExpandConfig,
) -> Result<Expander<K>, DtdError<K>> {
    let mut expander = Expander::new(grammar, config);
    expander.expand_all()?;

    Ok(expander)
}

/// Mirror the template node that `id` was copied from into `tree`,
///   recursively.
///
/// This is idempotent for nodes that have already been mirrored,
///   which is what allows a spawned candidate
///     (a copy of a partially expanded tree)
///     to be expanded again from its root.
fn expand_node<K: ChildKind>(
    template: &Grammar<K>,
    tree: &mut Grammar<K>,
    id: NodeId,
    spawned: &mut Vec<Grammar<K>>,
    room: Option<Room>,
) -> Result<(), DtdConflict<K>> {
    let orig = match tree.get(id).original() {
        Some(orig) => orig,
        None => panic!("candidate node {id} was not copied from a template"),
    };

    match template.kind(orig) {
        NodeKind::Element(_) => Ok(()),

        NodeKind::Sequence => {
            for (i, &tchild) in template.children(orig).iter().enumerate() {
                let existing = tree.children(id).get(i).copied();
                let child = match existing {
                    Some(child) => child,
                    None => tree.copy_node(template, tchild, id),
                };

                expand_node(template, tree, child, spawned, room)?;
            }

            Ok(())
        }

        NodeKind::Choice => {
            let branches = template.children(orig);

            match tree.get(id).choice() {
                Some(branch) => {
                    let existing = tree.children(id).first().copied();
                    let child = match existing {
                        Some(child) => child,
                        None => tree.copy_node(template, branches[branch], id),
                    };

                    expand_node(template, tree, child, spawned, room)
                }

                None if branches.is_empty() => Ok(()),

                None => {
                    // Alternatives share everything mirrored so far except
                    //   this choice's branch.
                    let snapshot = (branches.len() > 1).then(|| tree.clone());

                    tree.set_choice(id, 0);
                    let child = tree.copy_node(template, branches[0], id);
                    expand_node(template, tree, child, spawned, room)?;

                    if let Some(snapshot) = snapshot {
                        for branch in 1..branches.len() {
                            if let Some(room) = room {
                                room.reserve::<K>(spawned.len())?;
                            }

                            let mut alt = snapshot.clone();
                            alt.set_choice(id, branch);
                            spawned.push(alt);
                        }
                    }

                    Ok(())
                }
            }
        }

        NodeKind::GroupReference(name) => {
            panic!("group reference `{name}` survived inlining")
        }
    }
}

#[cfg(test)]
mod test;
