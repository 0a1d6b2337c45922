//! Cosine similarity over opinion vectors.

/// Cosine of the angle between `a` and `b`, clamped to [-1, 1].
///
/// Identical slices short-circuit to exactly 1.0 so that self-similarity and
/// exact vector duplicates are not subject to floating-point rounding; a
/// zero-magnitude vector is orthogonal to everything by convention.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a == b {
        return 1.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Similarity of `target` to every vector in `vectors`, in input order.
pub fn similarities_to(target: &[f32], vectors: &[Vec<f32>]) -> Vec<f32> {
    vectors.iter().map(|v| cosine(target, v)).collect()
}
