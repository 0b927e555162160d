// Grammar paths
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

//! Positions within a grammar for use in diagnostics.

use std::fmt::{self, Display};

/// One step of a [`GrammarPath`]:
///   a node label and its index within its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    label: String,
    index: Option<usize>,
}

impl Step {
    pub fn new(label: String, index: Option<usize>) -> Self {
        Self { label, index }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.label, index),
            None => f.write_str(&self.label),
        }
    }
}

/// Path from the root of a grammar to one of its nodes,
///   rendered as `sequence/choice[1]/b[0]`.
///
/// Paths are the grammar's equivalent of source spans:
///   they are what [diagnostics](crate::diagnose) annotate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarPath(Vec<Step>);

impl GrammarPath {
    pub fn new(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// The step naming the node this path leads to.
    pub fn last(&self) -> Option<&Step> {
        self.0.last()
    }
}

impl Display for GrammarPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }

            Display::fmt(step, f)?;
        }

        Ok(())
    }
}
