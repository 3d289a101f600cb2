use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;

use crate::chain::{softmax, Sampler, TokenLogit};

/// Distribution selector: converts the surviving candidates to a softmax
/// distribution and draws one token from it using the caller's RNG.
///
/// Reproducible: the same seeded RNG over the same candidates yields the
/// same draw sequence.
pub struct DistSampler;

impl Sampler for DistSampler {
    fn name(&self) -> &str {
        "dist"
    }

    fn apply(&self, candidates: &mut Vec<TokenLogit>, rng: &mut StdRng) {
        if candidates.len() <= 1 {
            return;
        }

        let probs = softmax(candidates);
        let dist = match WeightedIndex::new(&probs) {
            Ok(d) => d,
            Err(_) => {
                // Degenerate weights: fall back to the front candidate.
                candidates.truncate(1);
                return;
            }
        };

        let selected = candidates[dist.sample(rng)].clone();
        candidates.clear();
        candidates.push(selected);
    }
}
