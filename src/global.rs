// Global constants across the entirety of the system
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// A size capable of representing every node of a single grammar arena,
///   including every node of every candidate tree copied from it.
///
/// Candidate trees are copies of the same arena and so share this bound;
///   expansion does not add nodes beyond what the template describes.
pub type NodeIdSize = u32;

/// Default ceiling on the number of candidate trees that may be produced
///   by expanding a single grammar.
///
/// The number of candidates is the product of the branch counts of every
///   choice in the grammar,
///     which grows combinatorially.
/// Exceeding this limit is an error rather than an unbounded allocation;
///   see [`crate::expand::ExpandConfig`].
pub const DEFAULT_CANDIDATE_LIMIT: usize = 4096;
