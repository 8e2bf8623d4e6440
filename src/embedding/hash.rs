//! Deterministic feature-hashing embedding provider.
//!
//! Maps each lowercased token to a dimension bucket and sign via FNV-1a, then
//! L2-normalizes the accumulated counts. Not a semantic model — texts sharing
//! vocabulary land near each other, which is enough for the engine's ranking,
//! tests, and local development without model weights.

use anyhow::Result;

use super::EmbeddingProvider;

pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimensions];

        for token in tokenize(text) {
            let h = fnv1a(token.as_bytes());
            let bucket = (h % self.dimensions as u64) as usize;
            // Second hash bit decides the sign, spreading mass across zero
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }

        l2_normalize(&mut v);
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Lowercased alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// 64-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn embedding_is_deterministic_and_normalized() {
        let provider = HashEmbeddingProvider::new(384);
        let a = provider.embed("the quick brown fox").unwrap();
        let b = provider.embed("the quick brown fox").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let provider = HashEmbeddingProvider::new(384);
        let query = provider.embed("neural network training").unwrap();
        let close = provider
            .embed("training a neural network on documents")
            .unwrap();
        let far = provider.embed("quarterly tax filing deadline").unwrap();

        assert!(cosine(&query, &close) > cosine(&query, &far));
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        let provider = HashEmbeddingProvider::new(384);
        let v = provider.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
