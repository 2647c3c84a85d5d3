use serde::{Deserialize, Serialize};

use super::value::{Payload, Value};

/// Kind assigned to nodes whose payload carries no `kind` field.
pub const DEFAULT_KIND: &str = "Item";

/// One immutable version of a unit of content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub version: u64,
    pub parent_id: Option<String>,
    pub payload: Payload,
    pub deleted: bool,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        version: u64,
        parent_id: Option<String>,
        payload: Payload,
    ) -> Self {
        Node {
            id: id.into(),
            version,
            parent_id,
            payload,
            deleted: false,
        }
    }

    /// A tombstone version. It keeps the parent so history stays readable.
    pub fn tombstone(id: impl Into<String>, version: u64, parent_id: Option<String>) -> Self {
        Node {
            id: id.into(),
            version,
            parent_id,
            payload: Payload::new(),
            deleted: true,
        }
    }

    /// Child name used by path steps; falls back to the id.
    pub fn name(&self) -> &str {
        self.field_str("name").unwrap_or(&self.id)
    }

    pub fn kind(&self) -> &str {
        self.field_str("kind").unwrap_or(DEFAULT_KIND)
    }

    pub fn title(&self) -> Option<&str> {
        self.field_str("title")
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Lowercase a name and collapse every run of characters outside `[a-z0-9]`
/// into a single `-`.
pub fn make_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `"about-us"` -> `"About Us"`.
pub fn make_title(name: &str) -> String {
    name.replace('-', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
