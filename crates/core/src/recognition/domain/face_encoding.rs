/// Identity embedding of one face.
///
/// Values are L2-normalized on construction so that the dot product of two
/// encodings is their cosine similarity.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceEncoding {
    values: Vec<f32>,
}

impl FaceEncoding {
    pub fn new(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cosine distance in `[0, 2]`; smaller means more alike.
    ///
    /// Encodings of different lengths come from different models and are
    /// infinitely far apart.
    pub fn distance(&self, other: &FaceEncoding) -> f64 {
        if self.len() != other.len() {
            return f64::INFINITY;
        }
        1.0 - cosine_similarity(&self.values, &other.values)
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of L2-normalized vectors equals cosine similarity.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum()
}
