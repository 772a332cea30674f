//! Type Information
//!
//! Display-level types of the analysis. Squirrel is dynamically typed, so a
//! [`TypeLabel`] is what an editor shows for an expression, not a guarantee:
//! it comes from documentation annotations when there are any, and from the
//! shape of the resolved value otherwise.

use core::fmt;
use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum TypeLabel {
    Integer,
    Float,
    String,
    Bool,
    Null,
    Table,
    /// Element type when every element has the same shape.
    Array(Option<Box<TypeLabel>>),
    Function,
    /// A class, named by its alias or declared name.
    Class(String),
    /// A constructed instance of the named class.
    Instance(String),
    Enum(String),
    Any,
    /// A name taken from an annotation that is not a builtin type.
    Nominal(String),
}

impl TypeLabel {
    /// Reads the type written in a documentation tag.
    #[must_use]
    pub fn from_annotation(annotation: &str) -> Self {
        let annotation = annotation.trim();
        match annotation {
            "int" | "integer" => TypeLabel::Integer,
            "float" | "number" => TypeLabel::Float,
            "string" => TypeLabel::String,
            "bool" | "boolean" => TypeLabel::Bool,
            "null" => TypeLabel::Null,
            "table" => TypeLabel::Table,
            "array" => TypeLabel::Array(None),
            "function" => TypeLabel::Function,
            "any" => TypeLabel::Any,
            _ => match annotation
                .strip_prefix("array<")
                .and_then(|rest| rest.strip_suffix('>'))
            {
                Some(element) => {
                    TypeLabel::Array(Some(Box::new(TypeLabel::from_annotation(element))))
                }
                None => TypeLabel::Nominal(annotation.to_string()),
            },
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        !matches!(
            self,
            TypeLabel::Class(_) | TypeLabel::Instance(_) | TypeLabel::Enum(_) | TypeLabel::Nominal(_)
        )
    }
}

impl Display for TypeLabel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TypeLabel::Integer => write!(f, "integer"),
            TypeLabel::Float => write!(f, "float"),
            TypeLabel::String => write!(f, "string"),
            TypeLabel::Bool => write!(f, "bool"),
            TypeLabel::Null => write!(f, "null"),
            TypeLabel::Table => write!(f, "table"),
            TypeLabel::Array(None) => write!(f, "array"),
            TypeLabel::Array(Some(element)) => write!(f, "array<{element}>"),
            TypeLabel::Function => write!(f, "function"),
            TypeLabel::Instance(_) => write!(f, "instance"),
            TypeLabel::Any => write!(f, "any"),
            TypeLabel::Class(name) | TypeLabel::Enum(name) | TypeLabel::Nominal(name) => {
                write!(f, "{name}")
            }
        }
    }
}
