use rand::rngs::StdRng;

/// A token ID paired with its logit value.
#[derive(Debug, Clone)]
pub struct TokenLogit {
    pub token_id: u32,
    pub logit: f32,
}

/// A stage in the sampling pipeline: either a filter that rescales or
/// discards candidates (temperature, top-k, top-p) or a selector that
/// narrows the candidate list to the chosen token (greedy, distribution).
///
/// Stochastic stages draw from the caller's RNG so the same seeded
/// generator reproduces the same token sequence.
pub trait Sampler: Send + Sync {
    /// Returns the name of this sampler.
    fn name(&self) -> &str;

    /// Modify the candidate list in place.
    fn apply(&self, candidates: &mut Vec<TokenLogit>, rng: &mut StdRng);
}

/// Composes samplers into a pipeline. The last stage should be a selector;
/// the surviving front candidate is the sampled token.
pub struct SamplerChain {
    stages: Vec<Box<dyn Sampler>>,
}

impl SamplerChain {
    pub fn new() -> Self {
        SamplerChain { stages: Vec::new() }
    }

    /// Append a stage. Builder-style.
    pub fn with(mut self, stage: Box<dyn Sampler>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Run all stages in order on raw logits and return the selected
    /// token ID (token_id == index into `logits`).
    pub fn sample(&self, logits: &[f32], rng: &mut StdRng) -> u32 {
        let mut candidates: Vec<TokenLogit> = logits
            .iter()
            .enumerate()
            .map(|(i, &logit)| TokenLogit {
                token_id: i as u32,
                logit,
            })
            .collect();

        for stage in &self.stages {
            stage.apply(&mut candidates, rng);
        }

        candidates.first().map(|t| t.token_id).unwrap_or(0)
    }
}

impl Default for SamplerChain {
    fn default() -> Self {
        SamplerChain::new()
    }
}

/// Sort candidates descending by logit value.
pub(crate) fn sort_by_logit(candidates: &mut [TokenLogit]) {
    candidates.sort_by(|a, b| b.logit.total_cmp(&a.logit));
}

/// Softmax probabilities for the candidate list, in candidate order.
pub(crate) fn softmax(candidates: &[TokenLogit]) -> Vec<f32> {
    let max_logit = candidates
        .iter()
        .map(|t| t.logit)
        .fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = candidates
        .iter()
        .map(|t| (t.logit - max_logit).exp())
        .collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
