// quick-xml adapter
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

//! Adapter for [`quick_xml`] errors.

use std::{error::Error, fmt::Display};

/// A [`quick_xml::Error`] that can be held by read errors deriving
///   [`PartialEq`].
///
/// [`quick_xml::Error`] wraps I/O errors and so cannot compare itself;
///   two wrapped errors are considered equal if they render the same
///   message.
#[derive(Debug)]
pub struct QuickXmlError(quick_xml::Error);

impl QuickXmlError {
    pub fn inner(&self) -> &quick_xml::Error {
        &self.0
    }
}

impl PartialEq for QuickXmlError {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_string() == other.0.to_string()
    }
}

impl From<quick_xml::Error> for QuickXmlError {
    fn from(e: quick_xml::Error) -> Self {
        Self(e)
    }
}

impl Display for QuickXmlError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for QuickXmlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}
