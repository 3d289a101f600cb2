use std::path::Path;

use crate::error::Result;
use crate::options::LoadOptions;

/// A token identifier in the engine's vocabulary.
pub type TokenId = u32;

/// A batch of tokens submitted to the engine's decode step.
///
/// Each token carries its absolute position in the sequence so the engine
/// can place it correctly in the KV cache. Logits are only requested for
/// the final position: earlier positions are never sampled from, so the
/// engine need not compute output probabilities for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeBatch {
    pub tokens: Vec<TokenId>,
    pub positions: Vec<usize>,
    /// Request logits for the last token in the batch.
    pub logits_for_last: bool,
}

impl DecodeBatch {
    /// Build a prefill batch: the whole prompt at positions `0..n`, with
    /// logits requested for the final prompt position only.
    pub fn prompt(tokens: &[TokenId]) -> Self {
        DecodeBatch {
            tokens: tokens.to_vec(),
            positions: (0..tokens.len()).collect(),
            logits_for_last: true,
        }
    }

    /// Build a single-token batch advancing the sequence to `pos`.
    pub fn single(token: TokenId, pos: usize) -> Self {
        DecodeBatch {
            tokens: vec![token],
            positions: vec![pos],
            logits_for_last: true,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Metadata describing a loaded model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelMetadata {
    /// Number of tokens in the vocabulary.
    pub vocab_size: usize,
    /// Context window size the model was loaded with.
    pub context_size: usize,
    /// Embedding dimension / hidden size.
    pub embedding_dim: usize,
    /// Human-readable architecture descriptor (e.g. "llama 7B Q4_K").
    pub architecture: String,
}

/// Capability interface over one loaded model and its decode context.
///
/// An implementation owns the model weights, the KV cache, and the
/// positional state of the sequence decoded so far. It is the external
/// inference engine as seen by the session layer; the engine internals
/// (tokenizer, forward pass, weight format) are assumed correct and are
/// not part of this crate.
pub trait ModelRuntime: Send {
    /// Convert prompt text to a token sequence.
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>>;

    /// Run the decode step for a batch of tokens, advancing the KV cache.
    fn decode(&mut self, batch: &DecodeBatch) -> Result<()>;

    /// Logits over the vocabulary for the most recently decoded position
    /// that requested them.
    fn last_logits(&self) -> Result<Vec<f32>>;

    /// The raw bytes of one token's text fragment.
    ///
    /// Returned as bytes rather than a `str`: a single token may be a
    /// partial UTF-8 sequence. There is no upper bound on the fragment
    /// length.
    fn token_text(&self, token: TokenId) -> Vec<u8>;

    /// Whether the engine designates this token as end-of-generation.
    fn is_end_of_generation(&self, token: TokenId) -> bool;

    /// Clear the KV cache and positional state, forgetting everything
    /// decoded so far.
    fn reset(&mut self);

    fn metadata(&self) -> ModelMetadata;

    /// Context window size. Shorthand for `metadata().context_size`.
    fn context_size(&self) -> usize {
        self.metadata().context_size
    }
}

/// Entry point into an inference engine: process-global setup plus model
/// loading. One loader instance serves the whole process.
pub trait RuntimeLoader: Send + Sync {
    /// One-time global setup of the engine (thread pools, kernels, ...).
    /// Called exactly once per process via [`crate::BackendInit`].
    fn init_backend(&self) -> Result<()>;

    /// Load a model from disk, returning the runtime that owns it.
    fn load(&self, path: &Path, opts: &LoadOptions) -> Result<Box<dyn ModelRuntime>>;
}
