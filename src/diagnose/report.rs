// Diagnostic reports
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

//! Rendering of diagnostic information.

// NB: `write!` together with `\n` is preferred to `writeln!` so that there
//   is only a single sequence of characters to search for while tracking
//   down newlines,
//     rather than using both.

use super::{AnnotatedPath, Diagnostic, Label, Level};
use crate::grammar::GrammarPath;
use std::fmt::{self, Display};
use unicode_width::UnicodeWidthStr;

pub trait Reporter {
    /// Render diagnostic report.
    ///
    /// The provided [`Report`] implements [`Display`].
    ///
    /// Please be mindful of where this report is being rendered to
    ///   (via [`Display`]).
    /// If rendering to standard out,
    ///   it is a good idea to buffer the entire report before flushing,
    ///     otherwise the report may become interleaved with other
    ///     concurrent processes.
    ///
    /// This method _does not return [`Result`]_ and should never fail.
    fn render<'d, D: Diagnostic>(&mut self, diagnostic: &'d D)
        -> Report<'d, D>;

    /// Whether any reports of level [`Level::Error`] or worse have been
    ///   rendered.
    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of reports of level [`Level::Error`] or worse that have been
    ///   rendered.
    fn error_count(&self) -> usize;

    /// Number of reports of level [`Level::Warning`] that have been
    ///   rendered.
    fn warning_count(&self) -> usize;
}

/// Render diagnostic report in a highly visual way.
///
/// This report is modeled after Rust's default error reporting:
///   each grammar path is given a heading and reproduced with the node it
///   leads to underlined,
///     followed by labels that walk the user through understanding why
///     the error occurred and how to approach resolving it.
#[derive(Debug, Default)]
pub struct VisualReporter {
    errors: usize,
    warnings: usize,
}

impl VisualReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for VisualReporter {
    fn render<'d, D: Diagnostic>(
        &mut self,
        diagnostic: &'d D,
    ) -> Report<'d, D> {
        let mut report = Report::empty(diagnostic);
        report.extend(diagnostic.describe().into_iter().map(Section::from));

        match report.level {
            Level::InternalError | Level::Error => self.errors += 1,
            Level::Warning => self.warnings += 1,
            Level::Note | Level::Help => (),
        }

        report
    }

    fn error_count(&self) -> usize {
        self.errors
    }

    fn warning_count(&self) -> usize {
        self.warnings
    }
}

#[derive(Debug)]
pub struct Report<'d, D: Diagnostic> {
    msg: &'d D,
    secs: Vec<Section<'d>>,
    level: Level,
}

impl<'d, D: Diagnostic> Report<'d, D> {
    fn empty(msg: &'d D) -> Self {
        Self {
            msg,
            secs: Vec::new(),
            level: Level::default(),
        }
    }

    /// Severity of the report,
    ///   which is the most severe level among its labels.
    ///
    /// A report without labeled paths is an error.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl<'d, D: Diagnostic> Extend<Section<'d>> for Report<'d, D> {
    fn extend<T: IntoIterator<Item = Section<'d>>>(&mut self, secs: T) {
        for sec in secs {
            self.level = match self.secs.is_empty() {
                true => sec.level,
                false => self.level.min(sec.level),
            };

            // Add the section if it cannot be squashed into the previous.
            let remain = sec.maybe_squash_into(self.secs.last_mut());
            self.secs.extend(remain);
        }
    }
}

impl<'d, D: Diagnostic> Display for Report<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{level}: {msg}\n", level = self.level, msg = self.msg)?;
        self.secs.iter().try_for_each(|sec| sec.fmt(f))
    }
}

/// A section of a [`Report`] describing a [`GrammarPath`].
///
/// Adjacent sections describing the same path are squashed,
///   but not non-adjacent ones,
///     since reports ought to be able to revisit previous paths.
#[derive(Debug, PartialEq, Eq)]
struct Section<'d> {
    path: GrammarPath,
    labels: Vec<PathLabel<'d>>,
    level: Level,
}

impl<'d> Section<'d> {
    /// Squash self into the provided [`Section`] if they represent the same
    ///   [`GrammarPath`],
    ///     otherwise do nothing.
    ///
    /// If squashed,
    ///   [`None`] is returned.
    /// Otherwise [`Some`] is returned with `self`.
    fn maybe_squash_into(
        self,
        extend: Option<&mut Section<'d>>,
    ) -> Option<Self> {
        match extend {
            Some(extend_sec) if self.path == extend_sec.path => {
                extend_sec.labels.extend(self.labels);
                extend_sec.level = extend_sec.level.min(self.level);
                None
            }

            _ => Some(self),
        }
    }
}

impl<'d> From<AnnotatedPath<'d>> for Section<'d> {
    fn from(AnnotatedPath(path, level, olabel): AnnotatedPath<'d>) -> Self {
        let labels = olabel.map(|label| PathLabel(level, label));

        Section {
            path,
            labels: labels.into_iter().collect(),
            level,
        }
    }
}

impl<'d> Display for Section<'d> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = self.labels.iter();

        if let Some(last) = self.path.last() {
            let rendered = self.path.to_string();
            let width = last.to_string().width().max(1);
            let offset = rendered.width() - width.min(rendered.width());

            write!(f, "  --> {rendered}\n")?;
            write!(f, "   |\n")?;
            write!(f, "   | {rendered}\n")?;
            write!(f, "   | {:offset$}{:^<width$}", "", "")?;

            match labels.next() {
                Some(PathLabel(level, label)) => {
                    write!(f, " {level}: {label}\n")?
                }
                None => write!(f, "\n")?,
            }

            write!(f, "   |\n")?;
        }

        for label in labels {
            write!(f, "{label}\n")?;
        }

        Ok(())
    }
}

/// A label following the rendered path of a [`Section`].
#[derive(Debug, PartialEq, Eq)]
struct PathLabel<'l>(Level, Label<'l>);

impl<'l> Display for PathLabel<'l> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(level, label) = self;
        write!(f, "   = {level}: {label}")
    }
}
