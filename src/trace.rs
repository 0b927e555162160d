// Child assignment tracing
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

//! Tracing for child assignment.
//!
//! This provides human-readable traces on standard error each time a
//!   candidate tree is tried against a list of children.
//! These traces are provided automatically when `cfg(test)`,
//!   which means that they are automatically included in the output of any
//!   test failure.
//!
//! Outside of tests,
//!   this can be enabled at compile-time using the `match-trace-stderr`
//!   feature flag
//!     (`cargo build --features match-trace-stderr`).
//!
//! _These traces are not meant to be machine-readable!_
//! Do not try to use the human-readable traces in that way since the format
//!   is subject to change without notice.

use crate::{
    error::DtdError,
    grammar::{ChildKind, Grammar},
};

pub trait MatchTrace: Default {
    /// Output the upper portion of a candidate trace.
    ///
    /// This begins the trace with the candidate that is about to be tried
    ///   and the kinds of the children it will be offered.
    /// Post-assignment tracing is handled by
    ///   [`Self::trace_candidate_end`].
    ///
    /// There is no means to return an error and a failure to output the
    ///   trace should not interrupt processing.
    fn trace_candidate_begin<K: ChildKind>(
        &mut self,
        index: usize,
        candidate: &Grammar<K>,
        kinds: &[&K],
    );

    /// Output the lower portion of a candidate trace.
    ///
    /// `placed` is the number of children that the candidate accepted
    ///   before `result` was determined.
    fn trace_candidate_end<K: ChildKind>(
        &mut self,
        placed: usize,
        result: &Result<(), DtdError<K>>,
    );
}

/// Perform no tracing.
///
/// This should be used by default for non-test builds,
///   since tracing can incur a significant performance cost.
#[derive(Debug, PartialEq, Default)]
pub struct VoidTrace;

impl MatchTrace for VoidTrace {
    fn trace_candidate_begin<K: ChildKind>(
        &mut self,
        _index: usize,
        _candidate: &Grammar<K>,
        _kinds: &[&K],
    ) {
        // Do nothing at all.
    }

    fn trace_candidate_end<K: ChildKind>(
        &mut self,
        _placed: usize,
        _result: &Result<(), DtdError<K>>,
    ) {
        // Do nothing at all.
    }
}

/// Human-readable [`MatchTrace`].
///
/// Note: if one of these trace blocks does not fully output,
///   then you may have a `Display::fmt` or `Debug::fmt` panic in your
///   [`ChildKind`].
///
/// See [module-level](self) documentation for more information.
#[derive(Debug, PartialEq, Default)]
pub struct HumanReadableTrace;

impl MatchTrace for HumanReadableTrace {
    fn trace_candidate_begin<K: ChildKind>(
        &mut self,
        index: usize,
        candidate: &Grammar<K>,
        kinds: &[&K],
    ) {
        eprint!(
            "\
[assign] candidate #{index}
| ==> Leaves:\n",
        );

        for leaf in candidate.leaves() {
            eprint!(
                "|  |  {path} {occ}\n",
                path = candidate.path(leaf),
                occ = candidate.occurrence(leaf),
            );
        }

        eprint!("|\n| ==> Children:\n");

        for (i, kind) in kinds.iter().enumerate() {
            eprint!("|  |  {i}: {kind}\n");
        }

        eprint!("|\n");
    }

    fn trace_candidate_end<K: ChildKind>(
        &mut self,
        placed: usize,
        result: &Result<(), DtdError<K>>,
    ) {
        eprint!("| ==> Placed {placed} child(ren).\n");

        match result {
            Ok(()) => eprint!("| ==> Candidate accepted.\n"),
            Err(err) => eprint!(
                "\
| ==> !!! error: {err}.
|  |  {err:?}\n",
            ),
        }

        #[allow(unused_variables)]
        let cfg = ""; // so that this compiles without matching cfg
        #[cfg(feature = "match-trace-stderr")]
        #[allow(unused_variables)]
        let cfg = "feature = \"match-trace-stderr\"";
        #[cfg(test)] // takes precedence if both are set
        let cfg = "test";
        eprint!(
            "= note: this trace was output as a debugging aid \
                because `cfg({cfg})`.\n\n",
        );
    }
}

/// Trace used by [`crate::assign::assign`].
#[cfg(not(any(test, feature = "match-trace-stderr")))]
pub type DefaultTrace = VoidTrace;

/// Trace used by [`crate::assign::assign`].
#[cfg(any(test, feature = "match-trace-stderr"))]
pub type DefaultTrace = HumanReadableTrace;
