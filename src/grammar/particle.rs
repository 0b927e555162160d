// Grammar declarations
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

//! Declarative construction of grammars.
//!
//! A [`Particle`] is an owned tree describing a content model,
//!   named after the XSD term for a term paired with occurrence bounds.
//! It is converted into a [`Grammar`](super::Grammar) arena using
//!   [`From`].

use super::{NodeKind, Occurrence};

/// Declaration of a content model.
#[derive(Debug, Clone, PartialEq)]
pub enum Particle<K> {
    /// A slot accepting children of the given kind.
    Element(K, Occurrence),

    /// Ordered conjunction.
    Sequence(Vec<Particle<K>>, Occurrence),

    /// Alternation.
    Choice(Vec<Particle<K>>, Occurrence),

    /// Reference to a named group.
    ///
    /// The body is normally a single particle.
    /// A reference whose body is empty has not yet been resolved;
    ///   see [`Schema`](crate::schema::Schema).
    Group(String, Vec<Particle<K>>, Occurrence),
}

impl<K> Particle<K> {
    pub fn element(kind: K) -> Self {
        Self::Element(kind, Occurrence::ONE)
    }

    pub fn sequence(items: impl IntoIterator<Item = Particle<K>>) -> Self {
        Self::Sequence(items.into_iter().collect(), Occurrence::ONE)
    }

    pub fn choice(items: impl IntoIterator<Item = Particle<K>>) -> Self {
        Self::Choice(items.into_iter().collect(), Occurrence::ONE)
    }

    /// A reference to the group `name` whose body is already known.
    pub fn group<S: Into<String>>(name: S, body: Particle<K>) -> Self {
        Self::Group(name.into(), vec![body], Occurrence::ONE)
    }

    /// An unresolved reference to the group `name`.
    pub fn group_ref<S: Into<String>>(name: S) -> Self {
        Self::Group(name.into(), Vec::new(), Occurrence::ONE)
    }

    /// Replace the occurrence bounds of this particle.
    pub fn occurs(self, min: usize, max: Option<usize>) -> Self {
        self.with_occurrence(Occurrence::new(min, max))
    }

    /// `?`
    pub fn optional(self) -> Self {
        self.with_occurrence(Occurrence::OPTIONAL)
    }

    /// `*`
    pub fn any(self) -> Self {
        self.with_occurrence(Occurrence::ANY)
    }

    /// `+`
    pub fn some(self) -> Self {
        self.with_occurrence(Occurrence::SOME)
    }

    pub fn with_occurrence(self, occ: Occurrence) -> Self {
        match self {
            Self::Element(kind, _) => Self::Element(kind, occ),
            Self::Sequence(items, _) => Self::Sequence(items, occ),
            Self::Choice(items, _) => Self::Choice(items, occ),
            Self::Group(name, body, _) => Self::Group(name, body, occ),
        }
    }

    pub fn occurrence(&self) -> Occurrence {
        match self {
            Self::Element(_, occ)
            | Self::Sequence(_, occ)
            | Self::Choice(_, occ)
            | Self::Group(_, _, occ) => *occ,
        }
    }

    /// Particles nested directly within this one.
    pub fn items(&self) -> &[Particle<K>] {
        match self {
            Self::Element(..) => &[],
            Self::Sequence(items, _)
            | Self::Choice(items, _)
            | Self::Group(_, items, _) => items,
        }
    }

    pub(crate) fn items_mut(&mut self) -> Option<&mut Vec<Particle<K>>> {
        match self {
            Self::Element(..) => None,
            Self::Sequence(items, _)
            | Self::Choice(items, _)
            | Self::Group(_, items, _) => Some(items),
        }
    }

    pub(super) fn into_parts(
        self,
    ) -> (NodeKind<K>, Occurrence, Vec<Particle<K>>) {
        match self {
            Self::Element(kind, occ) => {
                (NodeKind::Element(kind), occ, Vec::new())
            }
            Self::Sequence(items, occ) => (NodeKind::Sequence, occ, items),
            Self::Choice(items, occ) => (NodeKind::Choice, occ, items),
            Self::Group(name, body, occ) => {
                (NodeKind::GroupReference(name), occ, body)
            }
        }
    }
}
