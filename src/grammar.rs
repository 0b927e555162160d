// Content model grammar
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

//! Content model grammar.
//!
//! A grammar describes which children a composite document node may
//!   contain:
//!     their kinds,
//!     their order,
//!     how many times each may appear,
//!     and which alternatives are permitted.
//! This is the content model of a DTD `<!ELEMENT>` declaration
//!   (or an XSD model group)
//!   held as a tree of [`Node`]s.
//!
//! Arena
//! =====
//! Nodes are stored in a [`Grammar`] arena and addressed by [`NodeId`].
//! The only owning edge is a node's list of children;
//!   the parent ("up") and original back-references are plain handles used
//!   for lookup only.
//!
//! Cloning a [`Grammar`] clones the entire arena,
//!   and so every [`NodeId`] remains valid in the clone and refers to the
//!   node at the same position in the tree.
//! [Expansion](crate::expand) relies on this to locate a choice within a
//!   freshly cloned candidate tree.
//!
//! Nodes that are detached from the tree
//!   (e.g. group references eliminated by [inlining](crate::inline))
//!   remain allocated in the arena but are unreachable from the root;
//!     every traversal in this system begins at [`Grammar::root`].
//!
//! Declaring Grammars
//! ==================
//! Grammars are most easily constructed from a [`Particle`] declaration:
//!
//! ```
//! use dtdmatch::grammar::{Grammar, Particle};
//!
//! // (title?, (b | i)*)
//! let grammar = Grammar::from(Particle::sequence([
//!     Particle::element("title").optional(),
//!     Particle::choice([Particle::element("b"), Particle::element("i")])
//!         .any(),
//! ]));
//!
//! assert_eq!(grammar.leaves().len(), 3);
//! ```

mod particle;
mod path;

pub use particle::Particle;
pub use path::{GrammarPath, Step};

use crate::global;
use std::fmt::{self, Debug, Display};

/// The kind of a concrete child,
///   and the kind accepted by an element slot.
///
/// A concrete child may be placed into an element slot only if its kind
///   [satisfies](ChildKind::satisfies) the kind accepted by that slot.
/// For simple string kinds this is equality,
///   but implementations may model subtyping.
pub trait ChildKind: Clone + Debug + Display {
    /// Whether a child of kind `self` may be placed in a slot accepting
    ///   `accepted`.
    fn satisfies(&self, accepted: &Self) -> bool;
}

impl ChildKind for String {
    fn satisfies(&self, accepted: &Self) -> bool {
        self == accepted
    }
}

impl ChildKind for &'static str {
    fn satisfies(&self, accepted: &Self) -> bool {
        self == accepted
    }
}

/// Handle to a [`Node`] within a [`Grammar`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(global::NodeIdSize);

assert_eq_size!(NodeId, global::NodeIdSize);

impl NodeId {
    fn new(index: usize) -> Self {
        match global::NodeIdSize::try_from(index) {
            Ok(id) => Self(id),
            Err(_) => panic!(
                "grammar arena exhausted: more than {} nodes",
                global::NodeIdSize::MAX
            ),
        }
    }

    /// Position of this node within its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Occurrence bounds of a grammar node.
///
/// A maximum of [`None`] is unbounded.
/// The default is exactly one occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub min: usize,
    pub max: Option<usize>,
}

impl Occurrence {
    /// Exactly once (the default).
    pub const ONE: Self = Self::new(1, Some(1));

    /// Zero or one time (`?`).
    pub const OPTIONAL: Self = Self::new(0, Some(1));

    /// Any number of times (`*`).
    pub const ANY: Self = Self::new(0, None);

    /// At least once (`+`).
    pub const SOME: Self = Self::new(1, None);

    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Whether these are the default bounds of exactly one occurrence.
    pub fn is_default(&self) -> bool {
        *self == Self::ONE
    }

    /// Whether these bounds denote a bag when placed on a choice.
    pub fn is_bag(&self) -> bool {
        *self == Self::ANY
    }

    /// Whether more than one occurrence is permitted.
    pub fn repeats(&self) -> bool {
        self.max.map_or(true, |max| max > 1)
    }

    /// Whether `n` occurrences do not exceed the maximum.
    pub fn admits(&self, n: usize) -> bool {
        self.max.map_or(true, |max| n <= max)
    }

    /// Bounds of `self` repeated within something bounded by `outer`.
    ///
    /// The product saturates rather than overflowing.
    pub fn scale(self, outer: Occurrence) -> Occurrence {
        Self {
            min: self.min.saturating_mul(outer.min),
            max: self
                .max
                .zip(outer.max)
                .map(|(inner, outer)| inner.saturating_mul(outer)),
        }
    }
}

impl Default for Occurrence {
    fn default() -> Self {
        Self::ONE
    }
}

impl Display for Occurrence {
    /// Render in the style of a regular expression quantifier.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{{{}}}", max),
            Some(max) => write!(f, "{{{},{}}}", self.min, max),
            None => write!(f, "{{{},}}", self.min),
        }
    }
}

/// The variant of a grammar [`Node`].
///
/// This set is closed;
///   every algorithm operating on a grammar matches exhaustively on it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind<K> {
    /// A slot accepting concrete children whose kind satisfies `K`.
    Element(K),

    /// Ordered conjunction of its children.
    Sequence,

    /// Alternation among its children.
    ///
    /// With the bounds [`Occurrence::ANY`] this is a _bag_,
    ///   which pools the children of its element branches in insertion
    ///   order.
    Choice,

    /// Placeholder for a named subgrammar,
    ///   holding a copy of that subgrammar as its only child.
    ///
    /// These are eliminated by [inlining](crate::inline).
    GroupReference(String),
}

impl<K: Display> Display for NodeKind<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Element(kind) => write!(f, "element `{}`", kind),
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::GroupReference(name) => write!(f, "group `{}`", name),
        }
    }
}

/// A node of a [`Grammar`].
#[derive(Debug, Clone, PartialEq)]
pub struct Node<K> {
    kind: NodeKind<K>,
    occ: Occurrence,
    children: Vec<NodeId>,
    up: Option<NodeId>,
    original: Option<NodeId>,
    choice: Option<usize>,
}

impl<K> Node<K> {
    fn new(kind: NodeKind<K>, occ: Occurrence) -> Self {
        Self {
            kind,
            occ,
            children: Vec::new(),
            up: None,
            original: None,
            choice: None,
        }
    }

    pub fn kind(&self) -> &NodeKind<K> {
        &self.kind
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occ
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent of this node,
    ///   or [`None`] if this is the root or the node has been detached.
    pub fn up(&self) -> Option<NodeId> {
        self.up
    }

    /// The node of the template grammar that this node was copied from.
    ///
    /// This is set only on nodes of candidate trees.
    pub fn original(&self) -> Option<NodeId> {
        self.original
    }

    /// The branch of the template choice that this choice has committed
    ///   to.
    ///
    /// This is set only on choices of candidate trees.
    pub fn choice(&self) -> Option<usize> {
        self.choice
    }

    /// Whether this node is a choice bounded by [`Occurrence::ANY`].
    pub fn is_bag(&self) -> bool {
        matches!(self.kind, NodeKind::Choice) && self.occ.is_bag()
    }
}

/// Arena of grammar [`Node`]s with a designated root.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar<K> {
    nodes: Vec<Node<K>>,
    root: NodeId,
}

impl<K: Clone> Grammar<K> {
    /// Create a grammar consisting of only a root node.
    pub fn new(kind: NodeKind<K>, occ: Occurrence) -> Self {
        Self {
            nodes: vec![Node::new(kind, occ)],
            root: NodeId::new(0),
        }
    }

    /// Begin a candidate tree as a copy of the root of `template`.
    ///
    /// The new root records the template root as its original;
    ///   its children are mirrored later during
    ///   [expansion](crate::expand).
    pub fn seed(template: &Grammar<K>) -> Self {
        let src = template.get(template.root);

        let mut root = Node::new(src.kind.clone(), src.occ);
        root.original = Some(template.root);

        Self {
            nodes: vec![root],
            root: NodeId::new(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes allocated in the arena,
    ///   including detached nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Retrieve a node by its handle.
    ///
    /// Panics
    /// ======
    /// A [`NodeId`] is only ever produced by the arena it indexes
    ///   (or a clone of it).
    /// A handle from a foreign arena that is out of range is a bug and
    ///   will panic.
    pub fn get(&self, id: NodeId) -> &Node<K> {
        match self.nodes.get(id.index()) {
            Some(node) => node,
            None => panic!(
                "invalid NodeId {id}: grammar arena has only {} nodes",
                self.nodes.len()
            ),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<K> {
        let len = self.nodes.len();

        match self.nodes.get_mut(id.index()) {
            Some(node) => node,
            None => panic!(
                "invalid NodeId {id}: grammar arena has only {len} nodes"
            ),
        }
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind<K> {
        &self.get(id).kind
    }

    pub fn occurrence(&self, id: NodeId) -> Occurrence {
        self.get(id).occ
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).up
    }

    /// Whether `id` is a choice bounded by [`Occurrence::ANY`].
    pub fn is_bag(&self, id: NodeId) -> bool {
        self.get(id).is_bag()
    }

    /// The outermost bag enclosing `id`,
    ///   if any.
    ///
    /// Every slot beneath a bag delegates to it,
    ///   however deeply nested.
    pub fn enclosing_bag(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.parent(id);
        let mut bag = None;

        while let Some(ancestor) = cur {
            if self.is_bag(ancestor) {
                bag = Some(ancestor);
            }

            cur = self.parent(ancestor);
        }

        bag
    }

    fn alloc(&mut self, node: Node<K>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn attach(&mut self, parent: NodeId, node: Node<K>) -> NodeId {
        let id = self.alloc(Node { up: Some(parent), ..node });
        self.get_mut(parent).children.push(id);
        id
    }

    /// Append a new node to the children of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind<K>,
        occ: Occurrence,
    ) -> NodeId {
        self.attach(parent, Node::new(kind, occ))
    }

    /// Copy a single node of `template` as the last child of `parent`,
    ///   without any of its children.
    ///
    /// The copy records `id` as its original and has not committed to any
    ///   choice.
    pub fn copy_node(
        &mut self,
        template: &Grammar<K>,
        id: NodeId,
        parent: NodeId,
    ) -> NodeId {
        let src = template.get(id);

        let mut node = Node::new(src.kind.clone(), src.occ);
        node.original = Some(id);

        self.attach(parent, node)
    }

    /// Copy the subtree of `src` rooted at `id` as the last child of
    ///   `parent`.
    ///
    /// Unlike [`Grammar::copy_node`],
    ///   deep copies are independent of `src` and so record no original.
    pub fn deep_copy(
        &mut self,
        src: &Grammar<K>,
        id: NodeId,
        parent: NodeId,
    ) -> NodeId {
        let node = src.get(id);
        let copy = self.add_child(parent, node.kind.clone(), node.occ);

        for &child in &node.children {
            self.deep_copy(src, child, copy);
        }

        copy
    }

    /// Replace `old` in its parent's list of children with `new`,
    ///   preserving its position.
    ///
    /// If `old` is the root,
    ///   then `new` becomes the root.
    /// `new` is detached from its own parent and `old` is left detached.
    pub(crate) fn replace(&mut self, old: NodeId, new: NodeId) {
        if let Some(prev) = self.get(new).up {
            self.get_mut(prev).children.retain(|&c| c != new);
        }

        match self.get(old).up {
            Some(parent) => {
                let parent_node = self.get_mut(parent);

                if let Some(slot) =
                    parent_node.children.iter_mut().find(|c| **c == old)
                {
                    *slot = new;
                }

                self.get_mut(new).up = Some(parent);
            }

            None => {
                if self.root == old {
                    self.root = new;
                }

                self.get_mut(new).up = None;
            }
        }

        self.get_mut(old).up = None;
    }

    /// Detach every child of `id`,
    ///   returning them.
    pub(crate) fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = std::mem::take(&mut self.get_mut(id).children);

        for &child in &children {
            self.get_mut(child).up = None;
        }

        children
    }

    pub(crate) fn set_kind(&mut self, id: NodeId, kind: NodeKind<K>) {
        self.get_mut(id).kind = kind;
    }

    pub(crate) fn set_occurrence(&mut self, id: NodeId, occ: Occurrence) {
        self.get_mut(id).occ = occ;
    }

    pub(crate) fn set_choice(&mut self, id: NodeId, branch: usize) {
        self.get_mut(id).choice = Some(branch);
    }

    /// Nodes reachable from the root in grammar (pre-)order.
    pub fn preorder(&self) -> Preorder<K> {
        self.preorder_from(self.root)
    }

    /// Nodes of the subtree rooted at `id` in grammar (pre-)order,
    ///   including `id` itself.
    pub fn preorder_from(&self, id: NodeId) -> Preorder<K> {
        Preorder {
            grammar: self,
            stack: vec![id],
        }
    }

    /// Element slots reachable from the root,
    ///   in grammar order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .filter(|&id| matches!(self.kind(id), NodeKind::Element(_)))
            .collect()
    }

    /// Position of `id` within the grammar for use in diagnostics.
    ///
    /// The index of a child of a committed choice is the index of its
    ///   branch in the template rather than its position in the candidate
    ///   tree,
    ///     since the latter is always zero.
    pub fn path(&self, id: NodeId) -> GrammarPath
    where
        K: Display,
    {
        let mut steps = Vec::new();
        let mut cur = id;

        loop {
            let node = self.get(cur);
            let label = match &node.kind {
                NodeKind::Element(kind) => kind.to_string(),
                NodeKind::Sequence => "sequence".into(),
                NodeKind::Choice => "choice".into(),
                NodeKind::GroupReference(name) => format!("group({name})"),
            };

            match node.up {
                Some(parent) => {
                    let pnode = self.get(parent);
                    let index = match pnode.choice {
                        Some(branch) if pnode.children.len() == 1 => {
                            Some(branch)
                        }
                        _ => pnode.children.iter().position(|&c| c == cur),
                    };

                    steps.push(Step::new(label, index));
                    cur = parent;
                }

                None => {
                    steps.push(Step::new(label, None));
                    break;
                }
            }
        }

        steps.reverse();
        GrammarPath::new(steps)
    }
}

impl<K: Clone> From<Particle<K>> for Grammar<K> {
    fn from(particle: Particle<K>) -> Self {
        let (kind, occ, items) = particle.into_parts();
        let mut grammar = Grammar::new(kind, occ);
        let root = grammar.root;

        for item in items {
            grammar.add_particle(root, item);
        }

        grammar
    }
}

impl<K: Clone> Grammar<K> {
    /// Append the declaration `particle` beneath `parent`.
    pub fn add_particle(
        &mut self,
        parent: NodeId,
        particle: Particle<K>,
    ) -> NodeId {
        let (kind, occ, items) = particle.into_parts();
        let id = self.add_child(parent, kind, occ);

        for item in items {
            self.add_particle(id, item);
        }

        id
    }
}

/// Pre-order iterator over the nodes of a subtree.
///
/// See [`Grammar::preorder`].
pub struct Preorder<'g, K> {
    grammar: &'g Grammar<K>,
    stack: Vec<NodeId>,
}

impl<'g, K: Clone> Iterator for Preorder<'g, K> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.grammar.children(id).iter().rev().copied());

        Some(id)
    }
}
