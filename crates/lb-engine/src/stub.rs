//! A deterministic in-memory runtime for tests.
//!
//! The stub tokenizes at the byte level (token id == byte value) and
//! follows a fixed script of continuation tokens: after the prompt is
//! primed, the logits peak at the first scripted token, then the second,
//! and so on; once the script is exhausted the logits peak at the
//! end-of-generation token. Decode and tokenize failures can be injected
//! to exercise error paths.

use std::path::Path;

use crate::error::{EngineError, Result};
use crate::options::LoadOptions;
use crate::runtime::{DecodeBatch, ModelMetadata, ModelRuntime, RuntimeLoader, TokenId};

/// Token id the stub designates as end-of-generation (one past the byte
/// range, so it never collides with tokenized prompt bytes).
pub const EOG_TOKEN: TokenId = 256;

const STUB_VOCAB_SIZE: usize = 257;

/// Behavior knobs shared by a loader and the runtimes it produces.
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Continuation tokens emitted in order after the prompt.
    pub script: Vec<TokenId>,
    /// Make `tokenize` fail.
    pub fail_tokenize: bool,
    /// Make the n-th single-token decode since the last reset fail
    /// (1-based). Prefill is not counted.
    pub fail_decode_after: Option<usize>,
}

impl Default for StubConfig {
    fn default() -> Self {
        StubConfig {
            script: b"42".iter().map(|&b| b as TokenId).collect(),
            fail_tokenize: false,
            fail_decode_after: None,
        }
    }
}

/// Scriptable [`ModelRuntime`] implementation.
pub struct StubRuntime {
    config: StubConfig,
    context_size: usize,
    /// Tokens decoded since the last reset.
    seq_len: usize,
    /// Single-token decode calls since the last reset.
    generated: usize,
    /// Whether any batch has been decoded since the last reset.
    primed: bool,
}

impl StubRuntime {
    pub fn new(config: StubConfig, context_size: usize) -> Self {
        StubRuntime {
            config,
            context_size,
            seq_len: 0,
            generated: 0,
            primed: false,
        }
    }

    fn next_scripted(&self) -> TokenId {
        self.config
            .script
            .get(self.generated)
            .copied()
            .unwrap_or(EOG_TOKEN)
    }
}

impl ModelRuntime for StubRuntime {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>> {
        if self.config.fail_tokenize {
            return Err(EngineError::Tokenize("injected failure".into()));
        }
        Ok(text.bytes().map(|b| b as TokenId).collect())
    }

    fn decode(&mut self, batch: &DecodeBatch) -> Result<()> {
        if batch.is_empty() {
            return Err(EngineError::Decode("empty batch".into()));
        }
        if batch.len() == 1 && self.primed {
            let call = self.generated + 1;
            if self.config.fail_decode_after == Some(call) {
                return Err(EngineError::Decode("injected failure".into()));
            }
        }

        // Positions must continue the sequence exactly where it left off;
        // a gap or overlap means the caller forgot to reset.
        for (i, &pos) in batch.positions.iter().enumerate() {
            if pos != self.seq_len + i {
                return Err(EngineError::Decode(format!(
                    "position {} does not continue sequence of length {}",
                    pos, self.seq_len
                )));
            }
        }
        if self.seq_len + batch.len() > self.context_size {
            return Err(EngineError::Decode("context overflow".into()));
        }

        self.seq_len += batch.len();
        if batch.len() == 1 && self.primed {
            self.generated += 1;
        }
        self.primed = true;
        Ok(())
    }

    fn last_logits(&self) -> Result<Vec<f32>> {
        if !self.primed {
            return Err(EngineError::NoLogits);
        }
        let target = self.next_scripted() as usize;
        let mut logits = vec![0.0f32; STUB_VOCAB_SIZE];
        logits[target] = 12.0;
        Ok(logits)
    }

    fn token_text(&self, token: TokenId) -> Vec<u8> {
        if token < 256 {
            vec![token as u8]
        } else {
            Vec::new()
        }
    }

    fn is_end_of_generation(&self, token: TokenId) -> bool {
        token == EOG_TOKEN
    }

    fn reset(&mut self) {
        self.seq_len = 0;
        self.generated = 0;
        self.primed = false;
    }

    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            vocab_size: STUB_VOCAB_SIZE,
            context_size: self.context_size,
            embedding_dim: 64,
            architecture: "stub 1M F32".to_string(),
        }
    }
}

/// Loader producing [`StubRuntime`]s. The model path must name an existing
/// file, so missing-file load failures behave like a real engine's.
pub struct StubLoader {
    config: StubConfig,
}

impl StubLoader {
    pub fn new() -> Self {
        StubLoader {
            config: StubConfig::default(),
        }
    }

    /// Replace the continuation script.
    pub fn with_script(mut self, script: Vec<TokenId>) -> Self {
        self.config.script = script;
        self
    }

    /// Script that spells out `text` byte by byte.
    pub fn with_text_script(self, text: &str) -> Self {
        let script = text.bytes().map(|b| b as TokenId).collect();
        self.with_script(script)
    }

    pub fn fail_tokenize(mut self) -> Self {
        self.config.fail_tokenize = true;
        self
    }

    pub fn fail_decode_after(mut self, call: usize) -> Self {
        self.config.fail_decode_after = Some(call);
        self
    }
}

impl Default for StubLoader {
    fn default() -> Self {
        StubLoader::new()
    }
}

impl RuntimeLoader for StubLoader {
    fn init_backend(&self) -> Result<()> {
        Ok(())
    }

    fn load(&self, path: &Path, opts: &LoadOptions) -> Result<Box<dyn ModelRuntime>> {
        let meta = std::fs::metadata(path)
            .map_err(|e| EngineError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        if !meta.is_file() {
            return Err(EngineError::ModelLoad(format!(
                "{}: not a regular file",
                path.display()
            )));
        }
        Ok(Box::new(StubRuntime::new(
            self.config.clone(),
            opts.context_size,
        )))
    }
}
