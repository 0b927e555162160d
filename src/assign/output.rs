// Child reconstruction
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

//! Reconstruction of children in grammar order.

use super::Assignment;
use crate::grammar::{ChildKind, NodeId};
use fixedbitset::FixedBitSet;

impl<K: ChildKind, O> Assignment<K, O> {
    /// Children in canonical grammar order.
    ///
    /// Slots are visited depth-first in grammar order,
    ///   each emitting its children in the order that they were placed.
    /// The pooled children of a bag are emitted once,
    ///   at the first slot anywhere beneath it.
    pub fn collect_children(&self) -> Vec<O>
    where
        O: Clone,
    {
        let mut visited = FixedBitSet::with_capacity(self.tree.len());
        let mut children = Vec::new();

        for leaf in self.tree.leaves() {
            let owner = self.owner(leaf);

            if visited.put(owner.index()) {
                continue;
            }

            children.extend(self.slots[owner.index()].iter().cloned());
        }

        children
    }

    /// Remove the first child equal to `obj`,
    ///   returning the node that held it.
    ///
    /// If no node holds `obj`,
    ///   then nothing is removed and [`None`] is returned.
    pub fn remove_child(&mut self, obj: &O) -> Option<NodeId>
    where
        O: PartialEq,
    {
        let owner = self
            .tree
            .preorder()
            .find(|id| self.slots[id.index()].contains(obj))?;

        let held = &mut self.slots[owner.index()];
        let pos = held.iter().position(|held| held == obj)?;
        held.remove(pos);

        Some(owner)
    }
}
