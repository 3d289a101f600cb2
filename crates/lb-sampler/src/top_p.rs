use rand::rngs::StdRng;

use crate::chain::{softmax, sort_by_logit, Sampler, TokenLogit};

/// Nucleus sampling: keeps the smallest set of tokens whose cumulative
/// probability reaches the threshold `p`.
pub struct TopPSampler {
    p: f32,
}

impl TopPSampler {
    pub fn new(p: f32) -> Self {
        TopPSampler { p }
    }
}

impl Sampler for TopPSampler {
    fn name(&self) -> &str {
        "top_p"
    }

    fn apply(&self, candidates: &mut Vec<TokenLogit>, _rng: &mut StdRng) {
        if candidates.is_empty() || self.p >= 1.0 {
            return;
        }

        sort_by_logit(candidates);
        let probs = softmax(candidates);

        let mut cumulative = 0.0f32;
        let mut cutoff = candidates.len();
        for (i, &prob) in probs.iter().enumerate() {
            cumulative += prob;
            if cumulative >= self.p {
                cutoff = i + 1;
                break;
            }
        }

        // Always keep at least one token.
        candidates.truncate(cutoff.max(1));
    }
}
