// In-memory element tree built from quick-xml pull events.
//
// An element's `text` holds only the character data seen before its first
// child element; text following a child is not kept.
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[error("{0}")]
pub struct XmlTreeError(String);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart) -> Result<Self, XmlTreeError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlTreeError(format!("bad attribute in <{name}>: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlTreeError(format!("bad value for {key} in <{name}>: {e}")))?;
            attributes.push((key, value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    fn push_text(&mut self, text: &str) {
        if self.children.is_empty() {
            self.text.get_or_insert_with(String::new).push_str(text);
        }
    }

    /// Direct children with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Descendants reached by following a `/`-separated path of child tag
    /// names, e.g. `"Pricing/ServiceCharges"`.
    pub fn select<'a>(&'a self, path: &str) -> Vec<&'a XmlElement> {
        let mut current = vec![self];
        for step in path.split('/').filter(|step| !step.is_empty()) {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    /// True when any attribute of this element carries exactly `value`,
    /// whatever the attribute's name.
    pub fn has_attribute_value(&self, value: &str) -> bool {
        self.attributes.iter().any(|(_, v)| v == value)
    }
}

/// Parse a whole document and return its root element.
pub fn parse_document(xml: &str) -> Result<XmlElement, XmlTreeError> {
    let mut reader = Reader::from_str(xml);
    // trim_text stays off: whitespace-only text is meaningful for leg fields

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlTreeError("extra content after root element".to_string()));
                }
                stack.push(XmlElement::from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(e)) => {
                // the reader already rejects mismatched end tags
                let element = stack.pop().ok_or_else(|| {
                    XmlTreeError(format!(
                        "unexpected closing tag </{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .decode()
                    .map_err(|e| XmlTreeError(format!("cannot decode text: {e}")))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(e)) => {
                let text = e
                    .decode()
                    .map_err(|e| XmlTreeError(format!("cannot decode CDATA: {e}")))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::GeneralRef(e)) => {
                let text = resolve_reference(&e)?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XmlTreeError(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => (), // declaration, comments, processing instructions, doctype
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlTreeError(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| XmlTreeError("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlTreeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(XmlTreeError("extra content after root element".to_string()))
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<(), XmlTreeError> {
    match stack.last_mut() {
        Some(element) => element.push_text(text),
        None if text.trim().is_empty() => (),
        None => return Err(XmlTreeError("text outside root element".to_string())),
    }
    Ok(())
}

fn resolve_reference(reference: &BytesRef) -> Result<String, XmlTreeError> {
    let name = reference
        .decode()
        .map_err(|e| XmlTreeError(format!("cannot decode entity reference: {e}")))?;

    if reference.is_char_ref() {
        return match reference.resolve_char_ref() {
            Ok(Some(ch)) => Ok(ch.to_string()),
            _ => Err(XmlTreeError(format!("invalid character reference &{name};"))),
        };
    }

    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| XmlTreeError(format!("unknown entity &{name};")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_before_first_child_only() {
        let root = parse_document("<a>head<b>inner</b>tail</a>").unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.text.as_deref(), Some("head"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].text.as_deref(), Some("inner"));
    }

    #[test]
    fn test_empty_element_has_no_text() {
        let root = parse_document("<a><b/><c></c><d>  </d></a>").unwrap();
        let texts: Vec<_> = root.children.iter().map(|c| c.text.clone()).collect();
        assert_eq!(texts, vec![None, None, Some("  ".to_string())]);
    }

    #[test]
    fn test_entities_and_cdata_are_resolved() {
        let root = parse_document("<a>A &amp; B &#65;<![CDATA[<x>]]></a>").unwrap();
        assert_eq!(root.text.as_deref(), Some("A & B A<x>"));
    }

    #[test]
    fn test_select_follows_child_path_in_document_order() {
        let xml = r#"<?xml version="1.0"?>
            <!-- comment -->
            <r>
              <p><q>1</q><q>2</q></p>
              <x><q>skip</q></x>
              <p><q>3</q></p>
            </r>"#;
        let root = parse_document(xml).unwrap();
        let values: Vec<_> = root
            .select("p/q")
            .iter()
            .map(|q| q.text.clone().unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
        assert!(root.select("p/missing").is_empty());
    }

    #[test]
    fn test_children_named_skips_other_tags_and_grandchildren() {
        let root = parse_document("<r><p>1</p><q><p>nested</p></q><p>2</p></r>").unwrap();
        let values: Vec<_> = root
            .children_named("p")
            .map(|p| p.text.as_deref().unwrap())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_attribute_value_scan_ignores_name() {
        let root =
            parse_document(r#"<c type="SingleAdult" ChargeType="TotalAmount">1</c>"#).unwrap();
        assert!(root.has_attribute_value("TotalAmount"));
        assert!(!root.has_attribute_value("totalamount"));
        assert!(!root.has_attribute_value("ChargeType"));
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(parse_document("").is_err());
        assert!(parse_document("<a><b></a>").is_err());
        assert!(parse_document("<a>").is_err());
        assert!(parse_document("<a/><b/>").is_err());
        assert!(parse_document("<a>&bogus;</a>").is_err());
    }
}
