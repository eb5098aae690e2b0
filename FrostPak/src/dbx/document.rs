//! DBX document structures

use serde::{Deserialize, Serialize};

/// A DBX document: the top-level element records in file order.
///
/// Shipped files hold a single root container, but the record stream allows
/// any number of top-level elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbxDocument {
    /// Top-level elements.
    pub elements: Vec<DbxElement>,
}

/// An element record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbxElement {
    /// Element tag (e.g. `instance`, `field`, `item`).
    pub tag: String,
    /// Attributes as (key, value) pairs, in record order.
    pub attributes: Vec<(String, String)>,
    /// Content of the element.
    pub value: DbxValue,
}

/// Content of an element record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DbxValue {
    /// Kind `a`: nested elements.
    Container(Vec<DbxElement>),
    /// Kind `2`: index into the string table.
    String(String),
    /// Kind `7`: a vector of fixed-width numbers.
    Numbers(DbxNumbers),
    /// Kind `6`: a single byte (`1` true, `0` false, or a small integer).
    Flag(u8),
}

/// Number vector payload, by element width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DbxNumbers {
    /// Width 2: unsigned 16-bit values.
    Halves(Vec<u16>),
    /// Width 4: raw 32-bit words, rendered as int or float per value.
    Words(Vec<u32>),
    /// Width 8: 64-bit floats.
    Doubles(Vec<f64>),
}

impl DbxDocument {
    /// Creates a document with a single root element.
    #[must_use]
    pub fn new(root: DbxElement) -> Self {
        Self {
            elements: vec![root],
        }
    }

    /// Total number of elements, counting nested ones.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.iter().map(DbxElement::element_count).sum()
    }
}

impl DbxElement {
    /// Creates an element with no attributes.
    #[must_use]
    pub fn new(tag: impl Into<String>, value: DbxValue) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            value,
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Looks up an attribute value by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first attribute, which names the field for number records.
    #[must_use]
    pub fn field_name(&self) -> &str {
        self.attributes.first().map_or("", |(_, v)| v.as_str())
    }

    /// Child elements, empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[DbxElement] {
        match &self.value {
            DbxValue::Container(children) => children,
            _ => &[],
        }
    }

    /// Number of elements in this subtree, including this one.
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(DbxElement::element_count)
            .sum::<usize>()
    }
}

impl DbxNumbers {
    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Halves(values) => values.len(),
            Self::Words(values) => values.len(),
            Self::Doubles(values) => values.len(),
        }
    }

    /// Returns true if the vector holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Width of one value in bytes, as stored in the record.
    #[must_use]
    pub fn width(&self) -> u8 {
        match self {
            Self::Halves(_) => 2,
            Self::Words(_) => 4,
            Self::Doubles(_) => 8,
        }
    }
}
