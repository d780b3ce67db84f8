use crate::recognition::domain::face_encoding::FaceEncoding;
use crate::recognition::domain::reference_set::ReferenceSet;
use crate::shared::constants::UNKNOWN_NAME;

/// Per-reference match flags: `true` where the distance is within `tolerance`.
pub fn compare_faces(
    references: &ReferenceSet,
    candidate: &FaceEncoding,
    tolerance: f64,
) -> Vec<bool> {
    references
        .encodings()
        .map(|known| known.distance(candidate) <= tolerance)
        .collect()
}

/// Names candidate faces against a fixed reference set.
///
/// Matching is first-match, not best-match: the earliest reference entry
/// within tolerance wins even when a later entry is closer. This keeps the
/// output reproducible for a given reference order.
#[derive(Clone, Debug)]
pub struct FaceMatcher {
    references: ReferenceSet,
    tolerance: f64,
}

impl FaceMatcher {
    pub fn new(references: ReferenceSet, tolerance: f64) -> Self {
        Self {
            references,
            tolerance,
        }
    }

    pub fn first_match(&self, candidate: &FaceEncoding) -> Option<&str> {
        compare_faces(&self.references, candidate, self.tolerance)
            .into_iter()
            .zip(self.references.names())
            .find_map(|(matched, name)| matched.then_some(name))
    }

    pub fn label_for(&self, candidate: &FaceEncoding) -> &str {
        self.first_match(candidate).unwrap_or(UNKNOWN_NAME)
    }
}
