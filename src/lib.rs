// DTD content-model matching library
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

//! Content-model validation and child assignment for DTD-style grammars.
//!
//! A content model is a [`Grammar`](grammar::Grammar) of element slots,
//!   sequences,
//!   choices,
//!   and references to named groups,
//!     each bounded by [occurrence](grammar::Occurrence) constraints.
//! Validating the children of an element against such a model proceeds in
//!   three stages:
//!
//!   1. [`inline`] replaces each group reference with the group's body,
//!        reconciling the bounds of the two;
//!   2. [`expand`] enumerates the _candidate trees_ of the grammar,
//!        each of which commits every choice to a single branch; and
//!   3. [`assign`] places the children into the slots of the first
//!        candidate that accepts them all,
//!          from which they can be
//!          [collected](assign::Assignment::collect_children)
//!          in canonical grammar order.
//!
//! Failures are reported as [`DtdError`](error::DtdError)s,
//!   which identify the offending child and the position within the
//!   grammar at which validation failed.
//! All errors and warnings can be rendered for humans using the
//!   [`diagnose`] module.
//!
//! Content models can be declared in Rust using
//!   [`Particle`](grammar::Particle)s,
//!   collected into a [`Schema`](schema::Schema),
//!   or read from an XML schema description
//!     (see [`schema::xml`]).
//! The `dtdmatch` binary validates XML documents against such a schema
//!   using [`validate`].

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod assign;
pub mod diagnose;
pub mod error;
pub mod expand;
pub mod fmt;
pub mod grammar;
pub mod inline;
pub mod schema;
pub mod tpwrap;
pub mod trace;
pub mod validate;
pub mod xml;
