//! Coding path tracking.
//!
//! The path is a breadcrumb trail of the fields visited while a value is
//! being encoded or decoded. It exists only for diagnostics: it never
//! influences the bytes on the wire.

use std::borrow::Cow;
use std::fmt;

/// Identifies one step of a [`CodingPath`]: a named field or an element index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name(Cow<'static, str>),
    Index(usize),
}

impl FieldKey {
    /// Returns the field name, if this is a named key.
    pub fn name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(name) => Some(name),
            FieldKey::Index(_) => None,
        }
    }

    /// Returns the element index, if this is an index key.
    pub fn index(&self) -> Option<usize> {
        match self {
            FieldKey::Name(_) => None,
            FieldKey::Index(index) => Some(*index),
        }
    }
}

impl From<&'static str> for FieldKey {
    fn from(name: &'static str) -> Self {
        FieldKey::Name(Cow::Borrowed(name))
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(Cow::Owned(name))
    }
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        FieldKey::Index(index)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Ordered sequence of [`FieldKey`]s leading to the value currently being coded.
///
/// Engines push a key before descending into a nested field and pop it on
/// every exit path, so the path mirrors the active call stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath(Vec<FieldKey>);

impl CodingPath {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, key: FieldKey) {
        self.0.push(key);
    }

    pub fn pop(&mut self) -> Option<FieldKey> {
        self.0.pop()
    }

    pub fn keys(&self) -> &[FieldKey] {
        &self.0
    }

    pub fn last(&self) -> Option<&FieldKey> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}
