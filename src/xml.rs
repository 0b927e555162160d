// XML token stream
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

//! Owned token stream over `quick-xml` events.
//!
//! Both the [schema reader](crate::schema::xml) and the
//!   [instance validator](crate::validate) consume XML as a flat stream of
//!   start and end tags,
//!     each annotated with the byte offset at which it was read.
//! The events produced by [`quick_xml`] borrow from the read buffer;
//!   [`XmlTokens`] copies out only what those consumers need so that the
//!   buffer can be reused while they recurse.

use crate::tpwrap::quick_xml::QuickXmlError;
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use std::{error::Error, fmt::Display, io::BufRead, str};

/// Name and attributes of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,

    /// Byte offset at which the tag was read.
    pub offset: usize,
}

impl Tag {
    /// Value of the attribute `name`,
    ///   if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A start tag whose element may have content.
    Start(Tag),

    /// A self-closing tag.
    Empty(Tag),

    /// An end tag at the given byte offset.
    End(usize),

    /// Non-whitespace text at the given byte offset.
    Text(usize),

    /// End of input at the given byte offset.
    Eof(usize),
}

/// Reader producing [`Token`]s.
///
/// Comments,
///   processing instructions,
///   and declarations are skipped.
pub struct XmlTokens<B: BufRead> {
    reader: Reader<B>,
    buf: Vec<u8>,
}

impl<B: BufRead> XmlTokens<B> {
    pub fn new(src: B) -> Self {
        let mut reader = Reader::from_reader(src);
        reader.trim_text(true);

        Self {
            reader,
            buf: Vec::new(),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, XmlReadError> {
        loop {
            let offset = self.reader.buffer_position();

            let token = match self.reader.read_event(&mut self.buf) {
                Ok(Event::Start(e)) => Some(Token::Start(tag(&e, offset)?)),
                Ok(Event::Empty(e)) => Some(Token::Empty(tag(&e, offset)?)),
                Ok(Event::End(_)) => Some(Token::End(offset)),
                Ok(Event::Text(_) | Event::CData(_)) => {
                    Some(Token::Text(offset))
                }
                Ok(Event::Eof) => Some(Token::Eof(offset)),
                Ok(_) => None,
                Err(e) => return Err(XmlReadError::Xml(e.into(), offset)),
            };

            self.buf.clear();

            if let Some(token) = token {
                return Ok(token);
            }
        }
    }
}

fn tag(e: &BytesStart, offset: usize) -> Result<Tag, XmlReadError> {
    let mut attrs = Vec::new();

    for attr in e.attributes() {
        let attr = attr
            .map_err(quick_xml::Error::from)
            .map_err(|e| XmlReadError::Xml(e.into(), offset))?;

        attrs.push((utf8(attr.key, offset)?, utf8(&attr.value, offset)?));
    }

    Ok(Tag {
        name: utf8(e.name(), offset)?,
        attrs,
        offset,
    })
}

fn utf8(bytes: &[u8], offset: usize) -> Result<String, XmlReadError> {
    str::from_utf8(bytes)
        .map(String::from)
        .map_err(|_| XmlReadError::Utf8(offset))
}

/// Malformed XML input.
#[derive(Debug, PartialEq)]
pub enum XmlReadError {
    /// The input is not well-formed.
    Xml(QuickXmlError, usize),

    /// A name or attribute value is not valid UTF-8.
    Utf8(usize),
}

impl Display for XmlReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Xml(e, offset) => {
                write!(f, "malformed XML at byte {offset}: {e}")
            }
            Self::Utf8(offset) => write!(f, "invalid UTF-8 at byte {offset}"),
        }
    }
}

impl Error for XmlReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(e, _) => Some(e),
            Self::Utf8(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(src: &str) -> Vec<Token> {
        let mut sut = XmlTokens::new(src.as_bytes());
        let mut given = Vec::new();

        loop {
            match sut.next_token().unwrap() {
                Token::Eof(_) => break,
                token => given.push(token),
            }
        }

        given
    }

    #[test]
    fn start_empty_and_end_tags() {
        let given = tokens(r#"<a x="1"><b/></a>"#);

        assert_eq!(
            given,
            vec![
                Token::Start(Tag {
                    name: "a".into(),
                    attrs: vec![("x".into(), "1".into())],
                    offset: 0,
                }),
                Token::Empty(Tag {
                    name: "b".into(),
                    attrs: vec![],
                    offset: 9,
                }),
                Token::End(13),
            ]
        );
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let given = tokens("<?xml version=\"1.0\"?>\n<a>\n  <!-- c -->\n</a>");

        assert!(matches!(
            given.as_slice(),
            [Token::Start(Tag { name, .. }), Token::End(_)] if name == "a"
        ));
    }

    #[test]
    fn reports_text() {
        let given = tokens("<a>hello</a>");

        assert_eq!(given[1], Token::Text(3));
    }

    #[test]
    fn attr_lookup() {
        let tag = Tag {
            name: "a".into(),
            attrs: vec![("x".into(), "1".into()), ("y".into(), "2".into())],
            offset: 0,
        };

        assert_eq!(tag.attr("y"), Some("2"));
        assert_eq!(tag.attr("z"), None);
    }

    #[test]
    fn mismatched_end_tag_is_error() {
        let mut sut = XmlTokens::new("<a></b>".as_bytes());

        assert!(matches!(sut.next_token(), Ok(Token::Start(_))));
        assert!(matches!(sut.next_token(), Err(XmlReadError::Xml(_, 3))));
    }
}
