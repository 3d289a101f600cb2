use rand::rngs::StdRng;

use crate::chain::{sort_by_logit, Sampler, TokenLogit};

/// Greedy selector: keeps the single token with the highest logit.
/// Deterministic for a fixed logits vector.
pub struct GreedySampler;

impl Sampler for GreedySampler {
    fn name(&self) -> &str {
        "greedy"
    }

    fn apply(&self, candidates: &mut Vec<TokenLogit>, _rng: &mut StdRng) {
        if candidates.is_empty() {
            return;
        }
        sort_by_logit(candidates);
        candidates.truncate(1);
    }
}
