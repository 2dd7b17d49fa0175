use crate::error::PlatyError;
use std::io::Read;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

/// An opening element; names are local names, namespace prefixes dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl StartTag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(StartTag),
    End(String),
    Text(String),
    Eof,
}

/// Forward-only token stream over one XML document.
///
/// Every grammar function receives the reader positioned just after the start
/// tag of its element and must leave it just after the matching end tag.
pub struct TokenReader<R: Read> {
    events: EventReader<R>,
    finished: bool,
}

impl<R: Read> TokenReader<R> {
    pub fn new(source: R) -> Self {
        let events = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(true)
            .cdata_to_characters(true)
            .ignore_comments(true)
            .create_reader(source);

        TokenReader {
            events,
            finished: false,
        }
    }

    pub fn next_token(&mut self) -> anyhow::Result<Token> {
        if self.finished {
            return Ok(Token::Eof);
        }

        loop {
            let event = self.events.next().map_err(PlatyError::XmlError)?;
            return Ok(match event {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => Token::Start(StartTag {
                    name: name.local_name,
                    attributes: attributes
                        .into_iter()
                        .map(|a| (a.name.local_name, a.value))
                        .collect(),
                }),
                XmlEvent::EndElement { name } => Token::End(name.local_name),
                XmlEvent::Characters(text) | XmlEvent::CData(text) | XmlEvent::Whitespace(text) => {
                    Token::Text(text)
                }
                XmlEvent::EndDocument => {
                    self.finished = true;
                    Token::Eof
                }
                XmlEvent::StartDocument { .. }
                | XmlEvent::ProcessingInstruction { .. }
                | XmlEvent::Comment(_) => continue,
            });
        }
    }

    /// Consumes the document element, failing if there is none.
    pub fn read_root(&mut self) -> anyhow::Result<StartTag> {
        loop {
            match self.next_token() {
                Ok(Token::Start(tag)) => return Ok(tag),
                Ok(Token::Text(text)) if text.trim().is_empty() => continue,
                Ok(_) => {
                    return Err(PlatyError::StructuralParse(
                        "document has no root element".to_string(),
                    )
                    .into())
                }
                Err(e) => {
                    return Err(PlatyError::StructuralParse(format!(
                        "document has no root element: {}",
                        e
                    ))
                    .into())
                }
            }
        }
    }

    /// Advances to the next start tag called `name` at any depth.
    pub fn read_to_following(&mut self, name: &str) -> anyhow::Result<Option<StartTag>> {
        loop {
            match self.next_token()? {
                Token::Start(tag) if tag.name == name => return Ok(Some(tag)),
                Token::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Next direct child of the current element, or `None` once the current
    /// element's end tag has been consumed.
    pub fn next_child(&mut self) -> anyhow::Result<Option<StartTag>> {
        loop {
            match self.next_token()? {
                Token::Start(tag) => return Ok(Some(tag)),
                Token::End(_) => return Ok(None),
                Token::Text(_) => {}
                Token::Eof => {
                    return Err(PlatyError::StructuralParse(
                        "unexpected end of document".to_string(),
                    )
                    .into())
                }
            }
        }
    }

    /// Next direct child called `name`, skipping any other children.
    pub fn next_sibling(&mut self, name: &str) -> anyhow::Result<Option<StartTag>> {
        while let Some(child) = self.next_child()? {
            if child.name == name {
                return Ok(Some(child));
            }
            self.skip_element()?;
        }
        Ok(None)
    }

    /// Consumes the rest of the current element, including its end tag.
    pub fn skip_element(&mut self) -> anyhow::Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(_) => depth += 1,
                Token::End(_) if depth == 0 => return Ok(()),
                Token::End(_) => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => {
                    return Err(PlatyError::StructuralParse(
                        "unexpected end of document".to_string(),
                    )
                    .into())
                }
            }
        }
    }

    /// Text content of the current element (nested elements included),
    /// consuming its end tag.
    pub fn read_element_text(&mut self) -> anyhow::Result<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::Start(_) => depth += 1,
                Token::End(_) if depth == 0 => return Ok(text),
                Token::End(_) => depth -= 1,
                Token::Text(t) => text.push_str(&t),
                Token::Eof => {
                    return Err(PlatyError::StructuralParse(
                        "unexpected end of document".to_string(),
                    )
                    .into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<root xmlns:a="urn:a">
  <!-- comment -->
  <a:first attr="1">one <a:b>two</a:b> three</a:first>
  <a:second><a:deep><a:target/></a:deep></a:second>
  <a:third><![CDATA[x < y]]></a:third>
</root>"#;

    #[test]
    fn navigates_children_and_descendants() {
        let mut reader = TokenReader::new(DOC.as_bytes());
        let root = reader.read_root().unwrap();
        assert_eq!(root.name, "root");

        let first = reader.next_child().unwrap().unwrap();
        assert_eq!(first.name, "first");
        assert_eq!(first.attribute("ATTR"), Some("1"));
        assert_eq!(reader.read_element_text().unwrap(), "one two three");

        let target = reader.read_to_following("target").unwrap().unwrap();
        assert_eq!(target.name, "target");
        reader.skip_element().unwrap();
        // close deep and second
        assert_eq!(reader.next_child().unwrap(), None);
        assert_eq!(reader.next_child().unwrap(), None);

        let third = reader.next_sibling("third").unwrap().unwrap();
        assert_eq!(third.name, "third");
        assert_eq!(reader.read_element_text().unwrap(), "x < y");

        assert_eq!(reader.next_child().unwrap(), None);
        assert_eq!(reader.read_to_following("first").unwrap(), None);
        assert_eq!(reader.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn empty_document_has_no_root() {
        let mut reader = TokenReader::new("".as_bytes());
        let err = reader.read_root().unwrap_err();
        assert!(PlatyError::is_structural(&err));
    }
}
