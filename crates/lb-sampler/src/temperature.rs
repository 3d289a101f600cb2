use rand::rngs::StdRng;

use crate::chain::{Sampler, TokenLogit};

/// Scales all logits by dividing by a temperature value.
///
/// Higher temperatures flatten the distribution (more random), lower
/// temperatures sharpen it (more deterministic).
pub struct TemperatureSampler {
    temperature: f32,
}

impl TemperatureSampler {
    pub fn new(temperature: f32) -> Self {
        TemperatureSampler { temperature }
    }
}

impl Sampler for TemperatureSampler {
    fn name(&self) -> &str {
        "temperature"
    }

    fn apply(&self, candidates: &mut Vec<TokenLogit>, _rng: &mut StdRng) {
        // Clamp to a tiny positive value so division stays finite.
        let temp = if self.temperature <= 0.0 {
            1e-7
        } else {
            self.temperature
        };

        for token in candidates.iter_mut() {
            token.logit /= temp;
        }
    }
}
