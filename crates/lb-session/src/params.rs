use lb_sampler::{DistSampler, GreedySampler, SamplerChain, TemperatureSampler, TopKSampler, TopPSampler};

pub const DEFAULT_MAX_TOKENS: i32 = 256;
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TOP_K: i32 = 40;

/// Raw per-call generation parameters as received from the boundary.
///
/// Values that are non-positive, NaN, or out of range are replaced by the
/// engine defaults in [`GenerateParams::clamped`]. A temperature of
/// exactly zero is preserved: it selects greedy argmax decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateParams {
    pub max_tokens: i32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
}

impl Default for GenerateParams {
    fn default() -> Self {
        GenerateParams {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl GenerateParams {
    /// Parameters for deterministic greedy decoding.
    pub fn greedy() -> Self {
        GenerateParams {
            temperature: 0.0,
            ..GenerateParams::default()
        }
    }

    pub fn clamped(&self) -> ClampedParams {
        let max_tokens = if self.max_tokens <= 0 {
            DEFAULT_MAX_TOKENS as usize
        } else {
            self.max_tokens as usize
        };
        let temperature = if self.temperature.is_nan() || self.temperature < 0.0 {
            DEFAULT_TEMPERATURE
        } else {
            self.temperature
        };
        let top_p = if self.top_p.is_nan() || self.top_p <= 0.0 || self.top_p > 1.0 {
            DEFAULT_TOP_P
        } else {
            self.top_p
        };
        let top_k = if self.top_k <= 0 {
            DEFAULT_TOP_K as usize
        } else {
            self.top_k as usize
        };
        ClampedParams {
            max_tokens,
            temperature,
            top_p,
            top_k,
        }
    }
}

/// Validated parameters the pipeline actually runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampedParams {
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: usize,
}

impl ClampedParams {
    /// Build the sampling pipeline for these parameters.
    ///
    /// Zero temperature short-circuits to pure greedy selection; anything
    /// else applies temperature scaling, top-k, and nucleus filtering
    /// before drawing from the resulting distribution.
    pub fn sampler_chain(&self) -> SamplerChain {
        if self.temperature == 0.0 {
            return SamplerChain::new().with(Box::new(GreedySampler));
        }
        SamplerChain::new()
            .with(Box::new(TemperatureSampler::new(self.temperature)))
            .with(Box::new(TopKSampler::new(self.top_k)))
            .with(Box::new(TopPSampler::new(self.top_p)))
            .with(Box::new(DistSampler))
    }
}
