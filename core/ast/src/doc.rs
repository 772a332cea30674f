//! Documentation attributes and the reader that produces them from `/** */`
//! comment text.
//!
//! The semantic layer only ever sees [`DocAttribute`] lists; the reader here
//! stands in for an editor's documentation parser.

use serde::{Deserialize, Serialize};

use crate::nodes::Location;

/// One parsed documentation tag. Free text before the first tag is reported
/// with kind `description`.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DocAttribute {
    pub kind: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Default value written as `[name=value]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

impl DocAttribute {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DocComment {
    pub location: Location,
    pub attributes: Vec<DocAttribute>,
}

/// Tags whose first word after the optional `{type}` is a name.
const NAMED_TAGS: &[&str] = &[
    "param", "property", "getter", "setter", "augments", "alias", "class", "typedef",
];

/// Reads the attributes of a raw `/** ... */` comment.
#[must_use]
pub fn parse_doc_comment(text: &str) -> Vec<DocAttribute> {
    let body = text
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    let mut attributes = Vec::new();
    let mut description = String::new();
    let mut current: Option<String> = None;

    for line in body.lines() {
        let line = line.trim().trim_start_matches('*').trim();
        if line.starts_with('@') {
            if let Some(tag) = current.take() {
                attributes.push(parse_tag(&tag));
            }
            current = Some(line.to_string());
        } else if let Some(tag) = current.as_mut() {
            if !line.is_empty() {
                tag.push(' ');
                tag.push_str(line);
            }
        } else if !line.is_empty() {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(line);
        }
    }
    if let Some(tag) = current {
        attributes.push(parse_tag(&tag));
    }
    if !description.is_empty() {
        let mut attribute = DocAttribute::new("description");
        attribute.documentation = Some(description);
        attributes.insert(0, attribute);
    }
    attributes
}

fn parse_tag(text: &str) -> DocAttribute {
    let text = &text[1..];
    let (kind, mut rest) = split_word(text);
    let mut attribute = DocAttribute::new(kind);

    if let Some(stripped) = rest.strip_prefix('{') {
        if let Some(end) = stripped.find('}') {
            attribute.ty = Some(stripped[..end].trim().to_string());
            rest = stripped[end + 1..].trim_start();
        }
    }

    match kind {
        "link" | "see" => {
            let (link, tail) = split_word(rest);
            if !link.is_empty() {
                attribute.link = Some(link.to_string());
            }
            rest = tail;
        }
        _ if NAMED_TAGS.contains(&kind) => {
            let (name, tail) = split_word(rest);
            if let Some(optional) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
                match optional.split_once('=') {
                    Some((name, expected)) => {
                        attribute.name = Some(name.to_string());
                        attribute.expected = Some(expected.to_string());
                    }
                    None => attribute.name = Some(optional.to_string()),
                }
            } else if !name.is_empty() {
                attribute.name = Some(name.to_string());
            }
            rest = tail;
        }
        _ => {}
    }

    let rest = rest.trim_start_matches('-').trim();
    if !rest.is_empty() {
        attribute.documentation = Some(rest.to_string());
    }
    attribute
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}
