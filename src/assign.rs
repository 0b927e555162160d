// Child assignment
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

//! Assignment of children to the slots of a candidate tree.
//!
//! Given the children of some element as `(object, kind)` pairs,
//!   assignment searches the candidate trees of an [`Expander`] for one
//!   whose element leaves
//!     (_slots_)
//!   can hold every child in order while satisfying every slot's
//!   occurrence bounds.
//! The result is an [`Assignment`],
//!   from which children can be collected in canonical grammar order
//!   (see [`Assignment::collect_children`]).
//!
//! Placement is greedy and never backtracks within a candidate:
//!   a cursor over the candidate's slots starts at the first slot,
//!   each child is offered to the slots from the cursor onward,
//!   and the cursor moves to the slot that accepted it.
//! When a child cannot be placed,
//!   the candidate is rejected and the next is tried.
//!
//! Bags
//! ====
//! A choice bounded by `{0,}` is a _bag_:
//!   its children may appear any number of times in any order.
//! Since a candidate commits every choice to a single branch,
//!   every slot beneath a bag,
//!     however deeply nested,
//!   accepts the kind of _any_ element that the bag declares in the
//!   template.
//! Their children are pooled on the outermost enclosing bag in the order
//!   that they were placed,
//!     so `((a, b) | c)*` holds `c, a, b` as readily as `a, b, a, b`.

use crate::{
    error::{DtdConflict, DtdError},
    expand::Expander,
    grammar::{ChildKind, Grammar, NodeId, NodeKind},
    trace::{DefaultTrace, MatchTrace},
};
use std::mem::discriminant;

mod output;

/// Reason that a single slot refused a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// The slot does not accept children of this kind.
    TypeMismatch,

    /// The slot accepts this kind but holds its maximum number of
    ///   children.
    Full,
}

/// Children held by the slots of a single candidate tree.
///
/// Objects are held by the element leaf that accepted them,
///   or by the enclosing choice if it is a bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<K, O> {
    tree: Grammar<K>,

    /// Objects indexed by the [`NodeId`] of the node that holds them.
    slots: Vec<Vec<O>>,
}

impl<K: ChildKind, O> Assignment<K, O> {
    /// Begin assigning children to the slots of `tree`,
    ///   all of which are initially empty.
    pub fn new(tree: Grammar<K>) -> Self {
        let slots = (0..tree.len()).map(|_| Vec::new()).collect();
        Self { tree, slots }
    }

    /// The candidate tree whose slots hold the children.
    pub fn tree(&self) -> &Grammar<K> {
        &self.tree
    }

    /// Objects held directly by `id`.
    pub fn held(&self, id: NodeId) -> &[O] {
        &self.slots[id.index()]
    }

    /// Offer `obj` of the given `kind` to the slot `element`.
    ///
    /// `template` is the grammar from which [`Self::tree`] was expanded;
    ///   it is consulted for the branches of bags.
    ///
    /// On success,
    ///   returns the node that now holds `obj`,
    ///   which is the enclosing bag if there is one.
    ///
    /// Panics
    /// ======
    /// If `element` is not an element leaf of the tree.
    pub fn add_xml_child(
        &mut self,
        template: &Grammar<K>,
        element: NodeId,
        obj: O,
        kind: &K,
    ) -> Result<NodeId, SlotError> {
        let node = self.tree.get(element);
        let accepted = match node.kind() {
            NodeKind::Element(accepted) => accepted,
            other => panic!("{element} ({other}) is not an element slot"),
        };

        let occ = node.occurrence();
        let parent = node.up();

        if let Some(bag) = self.tree.enclosing_bag(element) {
            if !self.bag_accepts(template, bag, kind) {
                return Err(SlotError::TypeMismatch);
            }

            self.slots[bag.index()].push(obj);
            return Ok(bag);
        }

        if !kind.satisfies(accepted) {
            return Err(SlotError::TypeMismatch);
        }

        let held = self.slots[element.index()].len();
        if occ.admits(held + 1) {
            self.slots[element.index()].push(obj);
            return Ok(element);
        }

        // A repeating choice may be revisited to select this same branch
        //   again,
        //     but a repeating sequence may not since its other members
        //     would have to intervene.
        match parent.map(|p| (self.tree.kind(p), self.tree.occurrence(p))) {
            Some((NodeKind::Choice, pocc))
                if pocc.repeats() && occ.scale(pocc).admits(held + 1) =>
            {
                self.slots[element.index()].push(obj);
                Ok(element)
            }
            _ => Err(SlotError::Full),
        }
    }

    /// The grammar and node declaring the branches of `bag`.
    ///
    /// This is the template node that `bag` was copied from,
    ///   or `bag` itself if it was not copied from a template.
    fn bag_decl<'a>(
        &'a self,
        template: &'a Grammar<K>,
        bag: NodeId,
    ) -> (&'a Grammar<K>, NodeId) {
        match self.tree.get(bag).original() {
            Some(orig) => (template, orig),
            None => (&self.tree, bag),
        }
    }

    /// Kinds of every element that `bag` declares beneath it,
    ///   in grammar order.
    fn bag_kinds(&self, template: &Grammar<K>, bag: NodeId) -> Vec<K> {
        let (grammar, id) = self.bag_decl(template, bag);

        grammar
            .preorder_from(id)
            .filter_map(|desc| element_kind(grammar, desc))
            .collect()
    }

    /// Whether `bag` declares an element accepting `kind`.
    fn bag_accepts(
        &self,
        template: &Grammar<K>,
        bag: NodeId,
        kind: &K,
    ) -> bool {
        self.bag_kinds(template, bag)
            .iter()
            .any(|accepted| kind.satisfies(accepted))
    }

    /// The node that holds the children placed in the slot `element`.
    fn owner(&self, element: NodeId) -> NodeId {
        self.tree.enclosing_bag(element).unwrap_or(element)
    }

    /// Kinds accepted by `owner`,
    ///   for use in diagnostics.
    fn accepted_kinds(&self, template: &Grammar<K>, owner: NodeId) -> Vec<K> {
        match self.tree.is_bag(owner) {
            true => self.bag_kinds(template, owner),
            false => element_kind(&self.tree, owner).into_iter().collect(),
        }
    }

    /// Whether the slot `element` holds enough children to satisfy its
    ///   minimum occurrence.
    ///
    /// The minimum is relaxed when the slot is part of an optional group
    ///   that holds nothing at all,
    ///     and scaled by the bounds of a parent choice.
    /// A repeating sequence with a minimum above one cannot be verified
    ///   slot by slot;
    ///     if the scaled minimum is not met then
    ///     [`DtdConflict::UndefinedOccurrenceRule`] is returned.
    pub fn check_min_occurrence(
        &self,
        element: NodeId,
    ) -> Result<bool, DtdError<K>> {
        let node = self.tree.get(element);
        let occ = node.occurrence();
        let held = self.slots[element.index()].len();

        let parent = match node.up() {
            None => return Ok(held >= occ.min),
            Some(parent) => parent,
        };

        if self.tree.enclosing_bag(element).is_some()
            || self.within_vacant_optional(element)
        {
            return Ok(true);
        }

        let pocc = self.tree.occurrence(parent);

        match self.tree.kind(parent) {
            NodeKind::Choice => Ok(held >= occ.scale(pocc).min),
            NodeKind::Sequence if pocc.min > 1 => {
                if held >= occ.scale(pocc).min {
                    Ok(true)
                } else {
                    Err(DtdConflict::UndefinedOccurrenceRule {
                        slot: self.tree.path(element),
                        parent: self.tree.path(parent),
                        parent_occ: pocc,
                    }
                    .into())
                }
            }
            _ => Ok(held >= occ.min),
        }
    }

    /// Whether some optional ancestor of `element` holds no children
    ///   anywhere beneath it.
    fn within_vacant_optional(&self, element: NodeId) -> bool {
        let mut cur = self.tree.parent(element);

        while let Some(id) = cur {
            let optional_group = matches!(
                self.tree.kind(id),
                NodeKind::Sequence | NodeKind::Choice
            ) && self.tree.occurrence(id).min == 0;

            if optional_group && self.is_vacant(id) {
                return true;
            }

            cur = self.tree.parent(id);
        }

        false
    }

    fn is_vacant(&self, id: NodeId) -> bool {
        self.tree
            .preorder_from(id)
            .all(|id| self.slots[id.index()].is_empty())
    }

    /// Verify the minimum occurrence of every slot.
    pub fn verify(&self) -> Result<(), DtdError<K>> {
        for leaf in self.tree.leaves() {
            if self.check_min_occurrence(leaf)? {
                continue;
            }

            let kind = match element_kind(&self.tree, leaf) {
                Some(kind) => kind,
                None => unreachable!("leaf {leaf} is not an element"),
            };

            return Err(DtdError::ChildIsNotOptional {
                slot: self.tree.path(leaf),
                kind,
                occ: self.tree.occurrence(leaf),
                held: self.slots[leaf.index()].len(),
            });
        }

        Ok(())
    }
}

impl<K: ChildKind, O: Clone> Assignment<K, O> {
    /// Place each of `children` in order.
    ///
    /// This does not verify minimum occurrences;
    ///   see [`Self::verify`].
    pub fn place(
        &mut self,
        template: &Grammar<K>,
        children: &[(O, K)],
    ) -> Result<(), DtdError<K>> {
        let leaves = self.tree.leaves();
        let mut cursor = 0;

        for (index, (obj, kind)) in children.iter().enumerate() {
            let mut accepted = None;
            let mut full = None;

            for (i, &leaf) in leaves.iter().enumerate().skip(cursor) {
                match self.add_xml_child(template, leaf, obj.clone(), kind) {
                    Ok(_) => {
                        accepted = Some(i);
                        break;
                    }
                    Err(SlotError::Full) => {
                        full.get_or_insert(leaf);
                    }
                    Err(SlotError::TypeMismatch) => (),
                }
            }

            match (accepted, full) {
                (Some(i), _) => cursor = i,

                (None, Some(slot)) => {
                    return Err(DtdError::ChildOccurrenceDtdConflict {
                        index,
                        found: kind.clone(),
                        slot: self.tree.path(slot),
                        occ: self.tree.occurrence(slot),
                    })
                }

                (None, None) => {
                    // Slots of a bag are adjacent and share its kinds.
                    let mut owners = leaves[cursor..]
                        .iter()
                        .map(|&leaf| self.owner(leaf))
                        .collect::<Vec<_>>();
                    owners.dedup();

                    let expected = owners
                        .into_iter()
                        .flat_map(|owner| self.accepted_kinds(template, owner))
                        .collect();

                    let at = leaves.get(cursor).copied();

                    return Err(DtdError::ChildTypeDtdConflict {
                        index,
                        found: kind.clone(),
                        expected,
                        at: self.tree.path(at.unwrap_or(self.tree.root())),
                    });
                }
            }
        }

        Ok(())
    }
}

fn element_kind<K: Clone>(grammar: &Grammar<K>, id: NodeId) -> Option<K> {
    match grammar.kind(id) {
        NodeKind::Element(kind) => Some(kind.clone()),
        _ => None,
    }
}

/// Assign `children` to the first candidate of `expander` that can hold
///   them all.
///
/// Candidates are expanded only as needed.
/// If every candidate is rejected,
///   the error of the candidate that placed the most children is returned
///   if all candidates failed for the same reason;
///     otherwise,
///       that error is wrapped in [`DtdConflict::NoCandidate`].
pub fn assign<K: ChildKind, O: Clone>(
    expander: &mut Expander<K>,
    children: &[(O, K)],
) -> Result<Assignment<K, O>, DtdError<K>> {
    assign_traced(expander, children, &mut DefaultTrace::default())
}

/// [`assign`] with an explicit [`MatchTrace`].
pub fn assign_traced<K: ChildKind, O: Clone, T: MatchTrace>(
    expander: &mut Expander<K>,
    children: &[(O, K)],
    trace: &mut T,
) -> Result<Assignment<K, O>, DtdError<K>> {
    let kinds = children.iter().map(|(_, kind)| kind).collect::<Vec<_>>();
    let mut failures = Vec::new();
    let mut i = 0;

    while let Some(tree) = expander.candidate(i)?.cloned() {
        trace.trace_candidate_begin(i, &tree, &kinds);

        let mut assignment = Assignment::new(tree);
        let result = assignment
            .place(expander.template(), children)
            .and_then(|()| assignment.verify());

        let placed = match &result {
            Ok(()) => children.len(),
            Err(e) => e.progress().min(children.len()),
        };
        trace.trace_candidate_end(placed, &result);

        match result {
            Ok(()) => return Ok(assignment),
            Err(e) => failures.push(e),
        }

        i += 1;
    }

    Err(select_failure(failures))
}

/// Choose the error to report once every candidate has been rejected.
fn select_failure<K>(failures: Vec<DtdError<K>>) -> DtdError<K> {
    let candidates = failures.len();
    let uniform = failures
        .windows(2)
        .all(|pair| discriminant(&pair[0]) == discriminant(&pair[1]));

    // Ties go to the earliest candidate.
    let best = failures.into_iter().reduce(|best, e| {
        if e.progress() > best.progress() {
            e
        } else {
            best
        }
    });

    match best {
        Some(best) if uniform => best,
        Some(best) => DtdConflict::NoCandidate {
            candidates,
            cause: Box::new(best),
        }
        .into(),
        None => unreachable!("expansion always yields a candidate"),
    }
}

#[cfg(test)]
mod test;
