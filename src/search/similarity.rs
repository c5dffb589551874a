//! Scoring factors.
//!
//! Only the factors the evaluation core multiplies together live here; the
//! values are deliberately plain so tests can predict scores.

use std::fmt::Debug;

/// Supplies the factors used by weights and scorers.
pub trait Similarity: Send + Sync + Debug {
    /// Normalization of a field by its length in terms.
    fn length_norm(&self, field: &str, num_terms: i32) -> f32;

    /// Normalization applied to every weight of one search so scores are
    /// comparable across queries.
    fn query_norm(&self, sum_of_squared_weights: f32) -> f32;

    /// Contribution of a term (or span) frequency within a document.
    fn tf(&self, freq: f32) -> f32;

    /// Frequency contributed by a span match of the given width.
    fn sloppy_freq(&self, distance: i32) -> f32;

    /// Inverse document frequency.
    fn idf(&self, doc_freq: i32, num_docs: i32) -> f32;

    /// Reward for matching `overlap` of `max_overlap` optional clauses.
    fn coord(&self, overlap: usize, max_overlap: usize) -> f32;
}

/// The classic vector-space factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSimilarity;

impl Similarity for DefaultSimilarity {
    fn length_norm(&self, _field: &str, num_terms: i32) -> f32 {
        if num_terms <= 0 {
            return 1.0;
        }
        1.0 / (num_terms as f32).sqrt()
    }

    fn query_norm(&self, sum_of_squared_weights: f32) -> f32 {
        if sum_of_squared_weights <= 0.0 {
            return 1.0;
        }
        1.0 / sum_of_squared_weights.sqrt()
    }

    fn tf(&self, freq: f32) -> f32 {
        freq.sqrt()
    }

    fn sloppy_freq(&self, distance: i32) -> f32 {
        1.0 / (distance as f32 + 1.0)
    }

    fn idf(&self, doc_freq: i32, num_docs: i32) -> f32 {
        ((num_docs as f32) / (doc_freq as f32 + 1.0)).ln() + 1.0
    }

    fn coord(&self, overlap: usize, max_overlap: usize) -> f32 {
        if max_overlap == 0 {
            return 0.0;
        }
        overlap as f32 / max_overlap as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factors() {
        let sim = DefaultSimilarity;
        assert_eq!(sim.tf(4.0), 2.0);
        assert_eq!(sim.sloppy_freq(1), 0.5);
        assert_eq!(sim.query_norm(4.0), 0.5);
        assert_eq!(sim.query_norm(0.0), 1.0);
        assert_eq!(sim.length_norm("body", 4), 0.5);
        assert_eq!(sim.coord(1, 4), 0.25);
        assert_eq!(sim.coord(0, 0), 0.0);
    }

    #[test]
    fn test_idf_decreases_with_doc_freq() {
        let sim = DefaultSimilarity;
        assert!(sim.idf(1, 100) > sim.idf(10, 100));
        assert!((sim.idf(0, 1) - 1.0).abs() < 1e-6);
    }
}
