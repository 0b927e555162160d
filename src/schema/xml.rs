// XML schema reader
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

//! XML description of a [`Schema`].
//!
//! ```xml
//! <schema>
//!   <group name="inline">
//!     <choice min="0" max="unbounded">
//!       <element type="b"/>
//!       <element type="i"/>
//!     </choice>
//!   </group>
//!
//!   <model for="para">
//!     <sequence>
//!       <element type="title" min="0"/>
//!       <group ref="inline"/>
//!     </sequence>
//!   </model>
//! </schema>
//! ```
//!
//! A `group` beneath `schema` defines a group;
//!   within a particle it references one.
//! Each definition holds exactly one particle.
//! The bounds `min` and `max` default to `1`,
//!   and `max="unbounded"` removes the upper bound.
//!
//! Every error carries the byte offset of the offending tag.

use super::{Schema, SchemaError};
use crate::{
    diagnose::{AnnotatedPath, Diagnostic},
    grammar::{Occurrence, Particle},
    xml::{Tag, Token, XmlReadError, XmlTokens},
};
use std::{error::Error, fmt::Display, io::BufRead};

/// Read a [`Schema`] from its XML description.
///
/// The schema is [checked](Schema::check) once read.
pub fn read_schema<B: BufRead>(
    src: B,
) -> Result<Schema<String>, SchemaReadError> {
    SchemaReader {
        tokens: XmlTokens::new(src),
    }
    .read()
}

struct SchemaReader<B: BufRead> {
    tokens: XmlTokens<B>,
}

impl<B: BufRead> SchemaReader<B> {
    fn read(mut self) -> Result<Schema<String>, SchemaReadError> {
        match self.tokens.next_token()? {
            Token::Start(tag) if tag.name == "schema" => {
                allow(&tag, &[])?;
                self.read_definitions()
            }
            Token::Empty(tag) if tag.name == "schema" => {
                allow(&tag, &[])?;
                Ok(Schema::new())
            }
            Token::Start(tag) | Token::Empty(tag) => {
                Err(SchemaReadError::UnexpectedElement {
                    name: tag.name,
                    parent: None,
                    offset: tag.offset,
                })
            }
            Token::Text(offset) | Token::End(offset) | Token::Eof(offset) => {
                Err(SchemaReadError::MissingRoot(offset))
            }
        }
    }

    fn read_definitions(&mut self) -> Result<Schema<String>, SchemaReadError> {
        let mut schema = Schema::new();

        loop {
            let (tag, nested) = match self.tokens.next_token()? {
                Token::End(_) => break,
                Token::Start(tag) => (tag, true),
                Token::Empty(tag) => (tag, false),
                Token::Text(offset) => {
                    return Err(SchemaReadError::UnexpectedText {
                        parent: "schema".into(),
                        offset,
                    })
                }
                Token::Eof(offset) => {
                    return Err(SchemaReadError::UnexpectedEof(offset))
                }
            };

            match tag.name.as_str() {
                "group" => {
                    allow(&tag, &["name"])?;
                    let name = require(&tag, "name")?;
                    let particle = self.read_body(&tag, nested)?;

                    schema.define_group(name, particle)?;
                }
                "model" => {
                    allow(&tag, &["for"])?;
                    let element = require(&tag, "for")?;
                    let particle = self.read_body(&tag, nested)?;

                    schema.define_model(element, particle)?;
                }
                _ => {
                    return Err(SchemaReadError::UnexpectedElement {
                        name: tag.name,
                        parent: Some("schema".into()),
                        offset: tag.offset,
                    })
                }
            }
        }

        schema.check()?;
        Ok(schema)
    }

    /// Read the single particle defined by `tag`.
    fn read_body(
        &mut self,
        tag: &Tag,
        nested: bool,
    ) -> Result<Particle<String>, SchemaReadError> {
        let mut particles = match nested {
            true => self.read_particles(tag)?,
            false => vec![],
        };

        match (particles.pop(), particles.is_empty()) {
            (Some(particle), true) => Ok(particle),
            (Some(_), false) => Err(SchemaReadError::MultipleParticles {
                element: tag.name.clone(),
                offset: tag.offset,
            }),
            (None, _) => Err(SchemaReadError::MissingParticle {
                element: tag.name.clone(),
                offset: tag.offset,
            }),
        }
    }

    /// Read particles until the end of `parent`.
    fn read_particles(
        &mut self,
        parent: &Tag,
    ) -> Result<Vec<Particle<String>>, SchemaReadError> {
        let mut particles = Vec::new();

        loop {
            match self.tokens.next_token()? {
                Token::End(_) => return Ok(particles),
                Token::Start(tag) => {
                    particles.push(self.read_particle(tag, true, parent)?)
                }
                Token::Empty(tag) => {
                    particles.push(self.read_particle(tag, false, parent)?)
                }
                Token::Text(offset) => {
                    return Err(SchemaReadError::UnexpectedText {
                        parent: parent.name.clone(),
                        offset,
                    })
                }
                Token::Eof(offset) => {
                    return Err(SchemaReadError::UnexpectedEof(offset))
                }
            }
        }
    }

    fn read_particle(
        &mut self,
        tag: Tag,
        nested: bool,
        parent: &Tag,
    ) -> Result<Particle<String>, SchemaReadError> {
        match tag.name.as_str() {
            "element" => {
                allow(&tag, &["type", "min", "max"])?;
                let kind = require(&tag, "type")?;
                let occ = occurrence(&tag)?;

                self.expect_empty(&tag, nested)?;
                Ok(Particle::Element(kind, occ))
            }
            "sequence" | "choice" => {
                allow(&tag, &["min", "max"])?;
                let occ = occurrence(&tag)?;

                let items = match nested {
                    true => self.read_particles(&tag)?,
                    false => vec![],
                };

                Ok(match tag.name.as_str() {
                    "sequence" => Particle::Sequence(items, occ),
                    _ => Particle::Choice(items, occ),
                })
            }
            "group" => {
                allow(&tag, &["ref", "min", "max"])?;
                let name = require(&tag, "ref")?;
                let occ = occurrence(&tag)?;

                self.expect_empty(&tag, nested)?;
                Ok(Particle::group_ref(name).with_occurrence(occ))
            }
            _ => Err(SchemaReadError::UnexpectedElement {
                name: tag.name,
                parent: Some(parent.name.clone()),
                offset: tag.offset,
            }),
        }
    }

    /// Require that `tag` has no content.
    fn expect_empty(
        &mut self,
        tag: &Tag,
        nested: bool,
    ) -> Result<(), SchemaReadError> {
        if !nested {
            return Ok(());
        }

        match self.tokens.next_token()? {
            Token::End(_) => Ok(()),
            Token::Start(child) | Token::Empty(child) => {
                Err(SchemaReadError::UnexpectedElement {
                    name: child.name,
                    parent: Some(tag.name.clone()),
                    offset: child.offset,
                })
            }
            Token::Text(offset) => Err(SchemaReadError::UnexpectedText {
                parent: tag.name.clone(),
                offset,
            }),
            Token::Eof(offset) => Err(SchemaReadError::UnexpectedEof(offset)),
        }
    }
}

/// Reject any attribute of `tag` not in `allowed`.
fn allow(tag: &Tag, allowed: &[&str]) -> Result<(), SchemaReadError> {
    match tag.attrs.iter().find(|(key, _)| !allowed.contains(&key.as_str())) {
        Some((key, _)) => Err(SchemaReadError::UnexpectedAttribute {
            name: key.clone(),
            element: tag.name.clone(),
            offset: tag.offset,
        }),
        None => Ok(()),
    }
}

fn require(tag: &Tag, name: &'static str) -> Result<String, SchemaReadError> {
    tag.attr(name).map(String::from).ok_or_else(|| {
        SchemaReadError::MissingAttribute {
            name,
            element: tag.name.clone(),
            offset: tag.offset,
        }
    })
}

/// Bounds given by the `min` and `max` attributes of `tag`.
fn occurrence(tag: &Tag) -> Result<Occurrence, SchemaReadError> {
    let count = |attr: &'static str, value: &str| {
        value
            .parse::<usize>()
            .map_err(|_| SchemaReadError::InvalidCount {
                attr,
                value: value.into(),
                offset: tag.offset,
            })
    };

    let min = match tag.attr("min") {
        Some(value) => count("min", value)?,
        None => 1,
    };

    let max = match tag.attr("max") {
        Some("unbounded") => None,
        Some(value) => Some(count("max", value)?),
        None => Some(1),
    };

    match max {
        Some(max) if min > max => Err(SchemaReadError::MinExceedsMax {
            min,
            max,
            offset: tag.offset,
        }),
        _ => Ok(Occurrence::new(min, max)),
    }
}

/// Error reading the XML description of a [`Schema`].
#[derive(Debug, PartialEq)]
pub enum SchemaReadError {
    Xml(XmlReadError),

    /// The document does not begin with a `schema` element.
    MissingRoot(usize),

    UnexpectedElement {
        name: String,
        parent: Option<String>,
        offset: usize,
    },

    UnexpectedText {
        parent: String,
        offset: usize,
    },

    UnexpectedAttribute {
        name: String,
        element: String,
        offset: usize,
    },

    MissingAttribute {
        name: &'static str,
        element: String,
        offset: usize,
    },

    /// A bound is neither a non-negative integer nor `unbounded`.
    InvalidCount {
        attr: &'static str,
        value: String,
        offset: usize,
    },

    MinExceedsMax {
        min: usize,
        max: usize,
        offset: usize,
    },

    /// A definition holds no particle.
    MissingParticle {
        element: String,
        offset: usize,
    },

    /// A definition holds more than one particle.
    MultipleParticles {
        element: String,
        offset: usize,
    },

    UnexpectedEof(usize),

    /// The schema was read but is not consistent.
    Schema(SchemaError<String>),
}

impl From<XmlReadError> for SchemaReadError {
    fn from(e: XmlReadError) -> Self {
        Self::Xml(e)
    }
}

impl From<SchemaError<String>> for SchemaReadError {
    fn from(e: SchemaError<String>) -> Self {
        Self::Schema(e)
    }
}

impl Display for SchemaReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Xml(e) => Display::fmt(e, f),
            Self::MissingRoot(offset) => {
                write!(f, "expected `schema` root element at byte {offset}")
            }
            Self::UnexpectedElement {
                name,
                parent: Some(parent),
                offset,
            } => write!(
                f,
                "unexpected element `{name}` within `{parent}` \
                    at byte {offset}"
            ),
            Self::UnexpectedElement {
                name,
                parent: None,
                offset,
            } => write!(f, "unexpected root element `{name}` at byte {offset}"),
            Self::UnexpectedText { parent, offset } => {
                write!(f, "unexpected text within `{parent}` at byte {offset}")
            }
            Self::UnexpectedAttribute {
                name,
                element,
                offset,
            } => write!(
                f,
                "unexpected attribute `{name}` on `{element}` at byte {offset}"
            ),
            Self::MissingAttribute {
                name,
                element,
                offset,
            } => write!(
                f,
                "missing attribute `{name}` on `{element}` at byte {offset}"
            ),
            Self::InvalidCount {
                attr,
                value,
                offset,
            } => write!(
                f,
                "invalid `{attr}` bound `{value}` at byte {offset}: \
                    expected a non-negative integer{}",
                if *attr == "max" { " or `unbounded`" } else { "" },
            ),
            Self::MinExceedsMax { min, max, offset } => write!(
                f,
                "minimum bound {min} exceeds maximum bound {max} \
                    at byte {offset}"
            ),
            Self::MissingParticle { element, offset } => write!(
                f,
                "`{element}` at byte {offset} must contain a particle"
            ),
            Self::MultipleParticles { element, offset } => write!(
                f,
                "`{element}` at byte {offset} must contain only one particle"
            ),
            Self::UnexpectedEof(offset) => {
                write!(f, "unexpected end of schema at byte {offset}")
            }
            Self::Schema(e) => Display::fmt(e, f),
        }
    }
}

impl Error for SchemaReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(e) => Some(e),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl Diagnostic for SchemaReadError {
    fn describe(&self) -> Vec<AnnotatedPath> {
        match self {
            Self::Schema(e) => e.describe(),
            _ => vec![],
        }
    }
}
