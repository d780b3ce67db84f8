use crate::recognition::domain::face_encoding::FaceEncoding;

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceEntry {
    pub encoding: FaceEncoding,
    pub name: String,
}

/// Known faces to compare against, in insertion order.
///
/// Order matters: matching scans entries front to back and stops at the
/// first one within tolerance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, encoding: FaceEncoding, name: impl Into<String>) {
        self.entries.push(ReferenceEntry {
            encoding,
            name: name.into(),
        });
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    /// Encodings, parallel to [`ReferenceSet::names`].
    pub fn encodings(&self) -> impl Iterator<Item = &FaceEncoding> + '_ {
        self.entries.iter().map(|e| &e.encoding)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
