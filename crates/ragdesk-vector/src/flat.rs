//! Exact inner-product index over a contiguous row-major buffer.

use std::cmp::Ordering;

use ragdesk_core::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    data: Vec<f32>,
    dim: usize,
    rows: usize,
}

impl FlatIndex {
    /// Replace all content with `vectors`. Every row must share the first
    /// row's dimension.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = vectors.first() else { return Ok(Self::default()) };
        let dim = first.len();
        let mut data = Vec::with_capacity(dim * vectors.len());
        for v in &vectors {
            if v.len() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: v.len() });
            }
            data.extend_from_slice(v);
        }
        Ok(Self { data, dim, rows: vectors.len() })
    }

    pub fn len(&self) -> usize { self.rows }
    pub fn is_empty(&self) -> bool { self.rows == 0 }
    pub fn dim(&self) -> usize { self.dim }

    /// Top `k` rows by dot product with `query` as `(score, position)`.
    ///
    /// Scores descend; equal scores keep ascending position order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        if self.rows == 0 || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        let mut scored: Vec<(f32, usize)> = if self.dim == 0 {
            (0..self.rows).map(|i| (0.0, i)).collect()
        } else {
            self.data
                .chunks_exact(self.dim)
                .enumerate()
                .map(|(i, row)| (dot(row, query), i))
                .collect()
        };
        scored.sort_by(|a, b| match b.0.total_cmp(&a.0) {
            Ordering::Equal => a.1.cmp(&b.1),
            other => other,
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_insertion_order() {
        let index = FlatIndex::build(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.1).collect::<Vec<_>>(), vec![0, 2, 1]);
    }
}
