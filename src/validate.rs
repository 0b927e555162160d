// Instance document validation
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

//! Validation of XML instance documents against a [`Schema`].
//!
//! Each element of the document that has a content model in the schema
//!   has its element children validated against that model.
//! The children are identified by their element names,
//!   which serve as their [`ChildKind`](crate::grammar::ChildKind),
//!   and by their ordinal position among their siblings.
//! Text and elements without a model are not validated.
//!
//! Models are inlined and expanded at most once per element name,
//!   so that a document with many elements of the same name pays the cost
//!   of expansion only once.
//! Validation continues after a failure so that every invalid element of
//!   the document is reported.

use crate::{
    assign::assign,
    diagnose::{AnnotatedPath, Diagnostic},
    error::DtdError,
    expand::{ExpandConfig, Expander},
    inline::InlineWarning,
    schema::{Schema, SchemaError},
    xml::{Tag, Token, XmlReadError, XmlTokens},
};
use fxhash::FxHashMap;
use std::{
    error::Error,
    fmt::{self, Display},
    io::BufRead,
};

/// Outcome of validating a document.
#[derive(Debug, Default, PartialEq)]
pub struct Validation {
    /// Elements whose children did not satisfy their content model,
    ///   in the order that the elements were closed.
    pub failures: Vec<Failure>,

    /// Warnings raised while inlining content models,
    ///   once per element name.
    pub warnings: Vec<ModelWarning>,

    /// Number of elements validated against a content model.
    pub validated: usize,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An element whose children did not satisfy its content model.
#[derive(Debug, PartialEq)]
pub struct Failure {
    pub element: String,

    /// Byte offset of the element's start tag.
    pub offset: usize,

    pub error: DtdError<String>,
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "element `{}` at byte {}: {}",
            self.element, self.offset, self.error
        )
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl Diagnostic for Failure {
    fn describe(&self) -> Vec<AnnotatedPath> {
        self.error.describe()
    }
}

/// A warning raised while inlining the content model of an element.
#[derive(Debug, PartialEq)]
pub struct ModelWarning {
    pub element: String,
    pub warning: InlineWarning,
}

impl Display for ModelWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "content model `{}`: {}", self.element, self.warning)
    }
}

impl Error for ModelWarning {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.warning)
    }
}

impl Diagnostic for ModelWarning {
    fn describe(&self) -> Vec<AnnotatedPath> {
        self.warning.describe()
    }
}

/// An element that has been opened but not yet closed.
struct Open {
    tag: Tag,
    children: Vec<(usize, String)>,
}

/// Validate every element of the document read from `src`.
///
/// Errors are returned only for documents that cannot be read or schemas
///   whose models cannot be resolved;
///     invalid elements are collected in [`Validation::failures`].
pub fn validate_document<B: BufRead>(
    schema: &Schema<String>,
    src: B,
    config: &ExpandConfig,
) -> Result<Validation, ValidateError> {
    let mut tokens = XmlTokens::new(src);
    let mut models = ModelCache::new(schema, config);
    let mut result = Validation::default();
    let mut stack: Vec<Open> = Vec::new();
    let mut seen_root = false;

    loop {
        match tokens.next_token()? {
            Token::Start(tag) => {
                add_child(&mut stack, &tag);
                seen_root = true;

                stack.push(Open {
                    tag,
                    children: Vec::new(),
                });
            }

            Token::Empty(tag) => {
                add_child(&mut stack, &tag);
                seen_root = true;

                let open = Open {
                    tag,
                    children: Vec::new(),
                };
                models.validate(open, &mut result)?;
            }

            Token::End(offset) => match stack.pop() {
                Some(open) => models.validate(open, &mut result)?,
                None => return Err(ValidateError::UnexpectedEnd(offset)),
            },

            Token::Text(_) => (),

            Token::Eof(offset) => {
                return match (stack.is_empty(), seen_root) {
                    (true, true) => Ok(result),
                    (true, false) => Err(ValidateError::MissingRoot(offset)),
                    (false, _) => Err(ValidateError::UnexpectedEof(offset)),
                };
            }
        }
    }
}

fn add_child(stack: &mut [Open], tag: &Tag) {
    if let Some(parent) = stack.last_mut() {
        let ordinal = parent.children.len();
        parent.children.push((ordinal, tag.name.clone()));
    }
}

/// Expanders by element name.
///
/// An element without a model is cached as [`None`].
struct ModelCache<'s> {
    schema: &'s Schema<String>,
    config: &'s ExpandConfig,
    expanders: FxHashMap<String, Option<Expander<String>>>,
}

impl<'s> ModelCache<'s> {
    fn new(schema: &'s Schema<String>, config: &'s ExpandConfig) -> Self {
        Self {
            schema,
            config,
            expanders: FxHashMap::default(),
        }
    }

    fn validate(
        &mut self,
        open: Open,
        result: &mut Validation,
    ) -> Result<(), ValidateError> {
        let Open { tag, children } = open;

        if !self.expanders.contains_key(&tag.name) {
            let expander = self
                .schema
                .grammar(&tag.name)?
                .map(|grammar| Expander::new(grammar, self.config));

            if let Some(expander) = &expander {
                result.warnings.extend(expander.warnings().iter().map(
                    |warning| ModelWarning {
                        element: tag.name.clone(),
                        warning: warning.clone(),
                    },
                ));
            }

            self.expanders.insert(tag.name.clone(), expander);
        }

        let expander = match self.expanders.get_mut(&tag.name) {
            Some(Some(expander)) => expander,
            _ => return Ok(()),
        };

        result.validated += 1;

        if let Err(error) = assign(expander, &children) {
            result.failures.push(Failure {
                element: tag.name,
                offset: tag.offset,
                error,
            });
        }

        Ok(())
    }
}

/// A document could not be validated at all.
#[derive(Debug, PartialEq)]
pub enum ValidateError {
    Xml(XmlReadError),
    Schema(SchemaError<String>),

    /// The document contains no elements.
    MissingRoot(usize),

    /// The document ended before all of its elements were closed.
    UnexpectedEof(usize),

    /// An end tag closed more elements than were opened.
    UnexpectedEnd(usize),
}

impl From<XmlReadError> for ValidateError {
    fn from(e: XmlReadError) -> Self {
        Self::Xml(e)
    }
}

impl From<SchemaError<String>> for ValidateError {
    fn from(e: SchemaError<String>) -> Self {
        Self::Schema(e)
    }
}

impl Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Xml(e) => Display::fmt(e, f),
            Self::Schema(e) => Display::fmt(e, f),
            Self::MissingRoot(offset) => {
                write!(f, "document has no root element (at byte {offset})")
            }
            Self::UnexpectedEof(offset) => {
                write!(f, "unexpected end of document at byte {offset}")
            }
            Self::UnexpectedEnd(offset) => {
                write!(f, "unexpected end tag at byte {offset}")
            }
        }
    }
}

impl Error for ValidateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl Diagnostic for ValidateError {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::Schema(e) => e.describe(),
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod test;
