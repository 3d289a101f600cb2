use rand::rngs::StdRng;

use crate::chain::{sort_by_logit, Sampler, TokenLogit};

/// Keeps only the top K tokens by logit value, discarding the rest.
pub struct TopKSampler {
    k: usize,
}

impl TopKSampler {
    pub fn new(k: usize) -> Self {
        TopKSampler { k }
    }
}

impl Sampler for TopKSampler {
    fn name(&self) -> &str {
        "top_k"
    }

    fn apply(&self, candidates: &mut Vec<TokenLogit>, _rng: &mut StdRng) {
        if self.k == 0 || self.k >= candidates.len() {
            return;
        }
        sort_by_logit(candidates);
        candidates.truncate(self.k);
    }
}
