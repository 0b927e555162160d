// Content model schemas
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

//! Named content models and groups.
//!
//! A [`Schema`] associates element names with the content models
//!   ([`Particle`]s) that their children must satisfy,
//!   and holds the named groups that those models reference.
//! Group references are resolved when the [`Grammar`] of a model is
//!   requested,
//!     by copying the named group's body beneath each reference.
//! The resulting grammar is then inlined during
//!   [expansion](crate::expand).
//!
//! Groups that reference one another in a cycle would expand without end
//!   and are rejected with [`DtdConflict::CyclicGroups`].
//!
//! Schemas are usually read from an XML description;
//!   see [`xml`].

use crate::{
    diagnose::{Annotate, AnnotatedPath, Diagnostic},
    error::DtdConflict,
    fmt::{DisplayWrapper, TtQuote},
    grammar::{ChildKind, Grammar, GrammarPath, NodeId, NodeKind, Particle},
};
use fxhash::FxHashMap;
use petgraph::{algo::tarjan_scc, graph::DiGraph};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};

pub mod xml;

/// Content models by element name,
///   along with the groups they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema<K> {
    /// Groups in order of definition.
    groups: Vec<(String, Particle<K>)>,
    group_index: FxHashMap<String, usize>,
    models: FxHashMap<String, Particle<K>>,
}

impl<K> Default for Schema<K> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            group_index: FxHashMap::default(),
            models: FxHashMap::default(),
        }
    }
}

impl<K: ChildKind> Schema<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the group `name` with the body `particle`.
    pub fn define_group<S: Into<String>>(
        &mut self,
        name: S,
        particle: Particle<K>,
    ) -> Result<(), SchemaError<K>> {
        let name = name.into();

        if self.group_index.contains_key(&name) {
            return Err(SchemaError::Redefinition(Definition::Group, name));
        }

        self.group_index.insert(name.clone(), self.groups.len());
        self.groups.push((name, particle));

        Ok(())
    }

    /// Define the content model of the element `element`.
    pub fn define_model<S: Into<String>>(
        &mut self,
        element: S,
        particle: Particle<K>,
    ) -> Result<(), SchemaError<K>> {
        let element = element.into();

        if self.models.contains_key(&element) {
            return Err(SchemaError::Redefinition(Definition::Model, element));
        }

        self.models.insert(element, particle);
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&Particle<K>> {
        self.group_index.get(name).map(|&i| &self.groups[i].1)
    }

    pub fn model(&self, element: &str) -> Option<&Particle<K>> {
        self.models.get(element)
    }

    /// Number of content models defined.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// The content model of `element` with every group reference
    ///   resolved,
    ///     or [`None`] if `element` has no model.
    pub fn grammar(
        &self,
        element: &str,
    ) -> Result<Option<Grammar<K>>, SchemaError<K>> {
        let model = match self.models.get(element) {
            Some(model) => model,
            None => return Ok(None),
        };

        self.check_cycles()?;

        let mut grammar = Grammar::from(model.clone());
        self.resolve(&mut grammar)?;

        Ok(Some(grammar))
    }

    /// Verify that every group reference in the schema can be resolved.
    pub fn check(&self) -> Result<(), SchemaError<K>> {
        self.check_cycles()?;

        let defs = self
            .groups
            .iter()
            .map(|(name, p)| (Definition::Group, name, p))
            .chain(
                self.models
                    .iter()
                    .map(|(name, p)| (Definition::Model, name, p)),
            );

        for (def, name, particle) in defs {
            let mut refs = Vec::new();
            collect_refs(particle, &mut refs);

            if let Some(unknown) =
                refs.into_iter().find(|r| !self.group_index.contains_key(*r))
            {
                return Err(SchemaError::UnknownGroup {
                    name: unknown.into(),
                    from: (def, name.clone()),
                });
            }
        }

        Ok(())
    }

    /// Reject groups that reference one another in a cycle.
    ///
    /// References to undefined groups are ignored here;
    ///   they are reported during resolution.
    fn check_cycles(&self) -> Result<(), SchemaError<K>> {
        let mut graph = DiGraph::<&str, ()>::new();
        let nodes = self
            .groups
            .iter()
            .map(|(name, _)| graph.add_node(name.as_str()))
            .collect::<Vec<_>>();

        for (from, (_, particle)) in self.groups.iter().enumerate() {
            let mut refs = Vec::new();
            collect_refs(particle, &mut refs);

            for to in refs.into_iter().filter_map(|r| self.group_index.get(r))
            {
                graph.update_edge(nodes[from], nodes[*to], ());
            }
        }

        let mut cycles = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| {
                // A lone group is a cycle only if it references itself.
                scc.len() > 1 || graph.contains_edge(scc[0], scc[0])
            })
            .map(|scc| {
                let mut names = scc
                    .iter()
                    .map(|&n| graph[n].to_string())
                    .collect::<Vec<_>>();
                names.sort();
                names
            })
            .collect::<Vec<_>>();

        if cycles.is_empty() {
            Ok(())
        } else {
            cycles.sort();
            Err(DtdConflict::CyclicGroups(cycles).into())
        }
    }

    /// Copy the body of each named group beneath every unresolved
    ///   reference to it,
    ///     recursively.
    ///
    /// Groups must be free of cycles.
    fn resolve(
        &self,
        grammar: &mut Grammar<K>,
    ) -> Result<(), SchemaError<K>> {
        let mut bodies = FxHashMap::<&str, Grammar<K>>::default();
        let mut pending = unresolved_refs(grammar, grammar.root());

        while let Some(id) = pending.pop() {
            let name = match grammar.kind(id) {
                NodeKind::GroupReference(name) => name.clone(),
                _ => continue,
            };

            let (key, particle) = match self.group_index.get(&name) {
                Some(&i) => (self.groups[i].0.as_str(), &self.groups[i].1),
                None => {
                    return Err(SchemaError::UnresolvedReference {
                        name,
                        at: grammar.path(id),
                    })
                }
            };

            let body = bodies
                .entry(key)
                .or_insert_with(|| Grammar::from(particle.clone()));

            let copy = grammar.deep_copy(body, body.root(), id);
            pending.extend(unresolved_refs(grammar, copy));
        }

        Ok(())
    }
}

/// References without a body within the subtree rooted at `id`.
fn unresolved_refs<K: ChildKind>(
    grammar: &Grammar<K>,
    id: NodeId,
) -> Vec<NodeId> {
    grammar
        .preorder_from(id)
        .filter(|&n| {
            matches!(grammar.kind(n), NodeKind::GroupReference(_))
                && grammar.children(n).is_empty()
        })
        .collect()
}

/// Names of the groups referenced without a body by `particle`.
fn collect_refs<'a, K>(particle: &'a Particle<K>, refs: &mut Vec<&'a str>) {
    match particle {
        Particle::Group(name, body, _) if body.is_empty() => refs.push(name),
        _ => {
            for item in particle.items() {
                collect_refs(item, refs);
            }
        }
    }
}

/// Kind of definition within a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Group,
    Model,
}

impl Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Model => write!(f, "content model"),
        }
    }
}

/// Error defining a [`Schema`] or deriving a [`Grammar`] from it.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError<K> {
    /// The named group or model has already been defined.
    Redefinition(Definition, String),

    /// A definition references a group that does not exist.
    UnknownGroup {
        name: String,
        from: (Definition, String),
    },

    /// A grammar contains a reference to a group that does not exist.
    UnresolvedReference { name: String, at: GrammarPath },

    DtdConflict(DtdConflict<K>),
}

impl<K> From<DtdConflict<K>> for SchemaError<K> {
    fn from(conflict: DtdConflict<K>) -> Self {
        Self::DtdConflict(conflict)
    }
}

impl<K: Display> Display for SchemaError<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Redefinition(def, name) => {
                write!(f, "{def} {} is already defined", TtQuote::wrap(name))
            }
            Self::UnknownGroup {
                name,
                from: (def, from),
            } => write!(
                f,
                "{def} {} references unknown group {}",
                TtQuote::wrap(from),
                TtQuote::wrap(name),
            ),
            Self::UnresolvedReference { name, .. } => {
                write!(f, "reference to unknown group {}", TtQuote::wrap(name))
            }
            Self::DtdConflict(conflict) => Display::fmt(conflict, f),
        }
    }
}

impl<K: Debug + Display + 'static> Error for SchemaError<K> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DtdConflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

impl<K: Debug + Display + 'static> Diagnostic for SchemaError<K> {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::UnresolvedReference { at, .. } => {
                vec![at.error("no group of this name is defined")]
            }
            Self::DtdConflict(conflict) => conflict.describe(),
            _ => vec![],
        }
    }
}
