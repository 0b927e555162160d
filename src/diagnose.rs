// Diagnostic system
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

//! Diagnostic system for error reporting.
//!
//! This system is heavily motivated by Rust's.
//! While the data structures and organization may differ,
//!   the diagnostic output is visually similar.
//!
//! Where a compiler annotates spans of source code,
//!   content model diagnostics annotate [`GrammarPath`]s:
//!     the position within a grammar of the slot,
//!     choice,
//!     or group that is the subject of an error or warning.
//! An empty path annotates no particular position.

mod report;

pub use report::{Report, Reporter, VisualReporter};

use crate::grammar::GrammarPath;
use std::{
    borrow::Cow,
    error::Error,
    fmt::{self, Display},
};

/// Diagnostic report.
///
/// This describes an error condition or other special event using a series
///   of [`GrammarPath`]s to describe the source, cause, and circumstances
///   around an event.
pub trait Diagnostic: Error + Sized {
    /// Produce a series of [`AnnotatedPath`]s describing the source and
    ///   circumstances of the diagnostic event.
    fn describe(&self) -> Vec<AnnotatedPath>;
}

/// Diagnostic severity level.
///
/// Levels are used both for entire reports and for styling of individual
///   [`AnnotatedPath`]s.
///
/// Lower levels are more severe
///   (e.g. level 1 is the worst).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[repr(u8)]
pub enum Level {
    /// An error internal to the system that the user cannot resolve,
    ///   but may be able to work around.
    InternalError = 1,

    /// A user-resolvable error.
    #[default]
    Error,

    /// A condition that does not prevent validation but that the user
    ///   ought to be made aware of,
    ///     such as group bounds that were overridden during inlining.
    Warning,

    /// Useful information that supplements other messages.
    Note,

    /// Additional advice to the user that may help in debugging or fixing a
    ///   problem.
    Help,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::InternalError => write!(f, "internal error"),
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
            Level::Help => write!(f, "help"),
        }
    }
}

/// A label associated with a report or [`GrammarPath`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Label<'a>(Cow<'a, str>);

impl<'a> Display for Label<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<'a> From<String> for Label<'a> {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl<'a> From<&'a str> for Label<'a> {
    fn from(s: &'a str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

/// A grammar path with an associated severity level and optional label.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct AnnotatedPath<'l>(GrammarPath, Level, Option<Label<'l>>);

impl<'l> AnnotatedPath<'l> {
    pub fn path(&self) -> &GrammarPath {
        &self.0
    }

    pub fn level(&self) -> Level {
        self.1
    }

    pub fn label(&self) -> Option<&Label<'l>> {
        self.2.as_ref()
    }

    pub fn with_help<L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> [AnnotatedPath<'l>; 2] {
        let path = self.0.clone();
        [self, path.help(label)]
    }
}

impl<'l> From<AnnotatedPath<'l>> for Vec<AnnotatedPath<'l>> {
    fn from(x: AnnotatedPath<'l>) -> Self {
        vec![x]
    }
}

pub trait Annotate: Sized {
    /// Annotate a [`GrammarPath`] with a severity [`Level`] and an
    ///   optional [`Label`] to display alongside of it.
    ///
    /// You may wish to use one of the more specific methods that provide a
    ///   more pleasent interface.
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedPath;

    /// Annotate a path as an internal error that the user is not expected
    ///   to be able to resolve,
    ///     but may be able to work around.
    fn internal_error<'l, L: Into<Label<'l>>>(
        self,
        label: L,
    ) -> AnnotatedPath<'l> {
        self.annotate(Level::InternalError, Some(label.into()))
    }

    /// Annotate a path with a clarifying label styled as an error.
    ///
    /// If the label does not include additional _useful_ information over
    ///   the generic message,
    ///     then it may be omitted in favor of `Annotate::mark_error` to
    ///     simply mark the location of the error.
    fn error<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedPath<'l> {
        self.annotate(Level::Error, Some(label.into()))
    }

    /// Like [`Annotate::error`],
    ///   but only styles the path as a [`Level::Error`] without attaching
    ///   a label.
    fn mark_error(self) -> AnnotatedPath<'static> {
        self.annotate(Level::Error, None)
    }

    /// Annotate a path with a label styled as a warning.
    fn warning<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedPath<'l> {
        self.annotate(Level::Warning, Some(label.into()))
    }

    /// Supplemental annotated path providing additional context for another
    ///   path.
    fn note<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedPath<'l> {
        self.annotate(Level::Note, Some(label.into()))
    }

    /// Provide additional information that may be used to help the user in
    ///   debugging or fixing a diagnostic.
    fn help<'l, L: Into<Label<'l>>>(self, label: L) -> AnnotatedPath<'l> {
        self.annotate(Level::Help, Some(label.into()))
    }
}

impl Annotate for GrammarPath {
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedPath {
        AnnotatedPath(self, level, label)
    }
}

impl Annotate for &GrammarPath {
    fn annotate(self, level: Level, label: Option<Label>) -> AnnotatedPath {
        AnnotatedPath(self.clone(), level, label)
    }
}
