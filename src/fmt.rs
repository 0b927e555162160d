// Formatting utilities
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

//! Typed formatting helpers.
//!
//! These types create composable formatters for use with [`Display`].
//! Whereas [`Display`] operates on data owned by the type implementing it,
//!   these formatters compose into functions that operate on data provided
//!   _to_ it.
//!
//! There are two types of wrappers:
//!
//!   - [`DisplayWrapper`] formats objects as atoms; and
//!   - [`ListDisplayWrapper`] maps a [`DisplayWrapper`] to each of its
//!       items,
//!         joining them into an English list.
//!
//! For example:
//!
//! ```
//! # use dtdmatch::fmt::*;
//! assert_eq!(TtQuote::wrap("para").to_string(), "`para`");
//!
//! assert_eq!(
//!     OrConjList::<TtQuote>::wrap(&["b", "i", "em"]).to_string(),
//!     "`b`, `i`, or `em`",
//! );
//! ```
//!
//! Error messages throughout the system use these wrappers so that
//!   grammar node kinds and child kinds are rendered consistently.

use std::{
    fmt::{Display, Formatter, Result},
    marker::PhantomData,
};

/// Wrapper for a [`Display`]-able type.
///
/// See the [module-level documentation](self) for more information.
pub trait DisplayWrapper {
    /// Transform inner data and output using the provided [`Formatter`].
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result;

    /// Associate data with a [`DisplayWrapper`] for rendering using
    ///   [`Display`].
    fn wrap<T: Display>(inner: T) -> Wrap<Self, T> {
        Wrap {
            inner,
            _phantom: PhantomData,
        }
    }
}

/// Wrapper with associated data.
pub struct Wrap<W: DisplayWrapper + ?Sized, T: Display> {
    inner: T,
    _phantom: PhantomData<W>,
}

impl<W: DisplayWrapper + ?Sized, T: Display> Display for Wrap<W, T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(&self.inner, f)
    }
}

/// Echo data as-is without any wrapping.
pub struct Raw;

impl DisplayWrapper for Raw {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        inner.fmt(f)
    }
}

/// Denote text that would conventionally be delimited in a teletypewriter
///   font.
///
/// This produces a markdown-style quote using backticks.
///
/// NB: This does not defend against nested quotes.
pub struct TtQuote;

impl DisplayWrapper for TtQuote {
    fn fmt<T: Display>(inner: T, f: &mut Formatter) -> Result {
        f.write_str("`")?;
        inner.fmt(f)?;
        f.write_str("`")
    }
}

/// Wrapper for a list that maps each element to a [`DisplayWrapper`] and
///   joins them with a serial comma and a conjunctive term.
///
/// No formatting beyond the item wrapper is done to a single item,
///   and the serial comma is omitted for only two items.
pub trait ListDisplayWrapper {
    /// Wrapper applied to each item.
    type Item: DisplayWrapper;

    /// Conjunction placed before the final item.
    const CONJ: &'static str;

    /// Format a slice using the provided wrappers.
    fn fmt<T: Display>(list: &[T], f: &mut Formatter) -> Result {
        let maxi = list.len().saturating_sub(1);

        for (i, x) in list.iter().enumerate() {
            match i {
                0 => (),
                1 if maxi == 1 => write!(f, " {} ", Self::CONJ)?,
                _ if i == maxi => write!(f, ", {} ", Self::CONJ)?,
                _ => f.write_str(", ")?,
            }

            Self::Item::fmt(x, f)?;
        }

        Ok(())
    }

    /// Associate data with a [`ListDisplayWrapper`] for rendering using
    ///   [`Display`].
    fn wrap<T: Display>(list: &[T]) -> ListWrap<Self, T> {
        ListWrap {
            list,
            _phantom: PhantomData,
        }
    }
}

/// A list of values with a serial comma and the term "and" before the
///   final item.
pub struct AndConjList<W: DisplayWrapper>(PhantomData<W>);

impl<W: DisplayWrapper> ListDisplayWrapper for AndConjList<W> {
    type Item = W;
    const CONJ: &'static str = "and";
}

/// A list of values with a serial comma and the term "or" before the
///   final item.
pub struct OrConjList<W: DisplayWrapper>(PhantomData<W>);

impl<W: DisplayWrapper> ListDisplayWrapper for OrConjList<W> {
    type Item = W;
    const CONJ: &'static str = "or";
}

/// List wrapper with associated data.
pub struct ListWrap<'a, W: ListDisplayWrapper + ?Sized, T: Display> {
    list: &'a [T],
    _phantom: PhantomData<W>,
}

impl<'a, W: ListDisplayWrapper + ?Sized, T: Display> Display
    for ListWrap<'a, W, T>
{
    fn fmt(&self, f: &mut Formatter) -> Result {
        W::fmt(self.list, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tt_quote() {
        assert_eq!(TtQuote::wrap("foo").to_string(), "`foo`");
    }

    #[test]
    fn conj_list_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(AndConjList::<Raw>::wrap(&empty).to_string(), "");
    }

    #[test]
    fn conj_list_one() {
        assert_eq!(AndConjList::<TtQuote>::wrap(&["a"]).to_string(), "`a`");
    }

    #[test]
    fn conj_list_pair_has_no_serial_comma() {
        assert_eq!(
            AndConjList::<Raw>::wrap(&["toil", "trouble"]).to_string(),
            "toil and trouble",
        );
    }

    #[test]
    fn conj_list_many() {
        assert_eq!(
            OrConjList::<Raw>::wrap(&[1, 2, 3, 4]).to_string(),
            "1, 2, 3, or 4",
        );
    }
}
