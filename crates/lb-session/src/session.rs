use lb_engine::{DecodeBatch, ModelMetadata, ModelRuntime, TokenId};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Result, SessionError};
use crate::params::GenerateParams;

/// One loaded model plus its decode context and running token history.
///
/// The runtime (model + KV cache) is exclusively owned; dropping the
/// session releases it, whatever state the last call left it in. The RNG
/// is private to the session and seeded once at creation, so stochastic
/// sampling within one session is reproducible for a fixed seed.
pub struct Session {
    runtime: Box<dyn ModelRuntime>,
    history: Vec<TokenId>,
    rng: StdRng,
}

impl Session {
    pub fn new(runtime: Box<dyn ModelRuntime>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Session {
            runtime,
            history: Vec::new(),
            rng,
        }
    }

    pub fn metadata(&self) -> ModelMetadata {
        self.runtime.metadata()
    }

    /// Number of tokens decoded in the current generation (prompt plus
    /// generated continuation).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Run one full generation: reset, tokenize, prime, then the bounded
    /// autoregressive loop.
    ///
    /// Returns the generated text, which is empty when the very first
    /// sampled token ends the generation. A decode or logits failure
    /// inside the loop stops early and returns the text accumulated so
    /// far; only failures before the loop are reported as errors.
    pub fn generate(&mut self, prompt: &str, params: &GenerateParams) -> Result<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        let params = params.clamped();

        // Sessions are reused across independent generations; stale cache
        // entries from a previous prompt must never leak into this one.
        self.runtime.reset();
        self.history.clear();

        let context_size = self.runtime.context_size();
        let prompt_limit = context_size / 2;

        let tokens = self
            .runtime
            .tokenize(prompt)
            .map_err(SessionError::Tokenization)?;
        if tokens.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if tokens.len() > prompt_limit {
            return Err(SessionError::PromptTooLong {
                got: tokens.len(),
                limit: prompt_limit,
            });
        }

        // Prefill: the whole prompt in one batch, logits for the final
        // position only.
        self.runtime
            .decode(&DecodeBatch::prompt(&tokens))
            .map_err(SessionError::PromptDecode)?;
        self.history.extend_from_slice(&tokens);

        let budget = params.max_tokens.min(context_size - tokens.len());
        let chain = params.sampler_chain();
        tracing::debug!(
            prompt_tokens = tokens.len(),
            budget,
            "starting generation"
        );

        // Token fragments may split multi-byte sequences, so accumulate
        // raw bytes and convert once at the end.
        let mut output: Vec<u8> = Vec::new();

        for _ in 0..budget {
            let logits = match self.runtime.last_logits() {
                Ok(l) => l,
                Err(e) => {
                    tracing::warn!(error = %e, "logits unavailable, stopping early");
                    break;
                }
            };

            let token = chain.sample(&logits, &mut self.rng);
            if self.runtime.is_end_of_generation(token) {
                break;
            }

            output.extend_from_slice(&self.runtime.token_text(token));
            let pos = self.history.len();
            self.history.push(token);

            if let Err(e) = self.runtime.decode(&DecodeBatch::single(token, pos)) {
                // Keep what we have; generation is not all-or-nothing.
                tracing::warn!(error = %e, "decode failed, returning partial output");
                break;
            }
        }

        tracing::debug!(generated = self.history.len() - tokens.len(), "generation finished");
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb_engine::stub::{StubConfig, StubRuntime};
    use lb_engine::TokenId;

    fn script(text: &str) -> Vec<TokenId> {
        text.bytes().map(|b| b as TokenId).collect()
    }

    fn session_with(config: StubConfig, context_size: usize) -> Session {
        Session::new(Box::new(StubRuntime::new(config, context_size)), Some(0))
    }

    fn greedy() -> GenerateParams {
        GenerateParams::greedy()
    }

    #[test]
    fn test_generates_scripted_text() {
        let mut session = session_with(
            StubConfig {
                script: script(" world"),
                ..StubConfig::default()
            },
            128,
        );
        let out = session.generate("hello", &greedy()).unwrap();
        assert_eq!(out, " world");
        // History holds the prompt and everything generated.
        assert_eq!(session.history_len(), "hello".len() + " world".len());
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let mut session = session_with(StubConfig::default(), 128);
        assert!(matches!(
            session.generate("", &greedy()),
            Err(SessionError::EmptyPrompt)
        ));
        assert!(matches!(
            session.generate("   \n\t ", &greedy()),
            Err(SessionError::EmptyPrompt)
        ));
        assert_eq!(session.history_len(), 0);
    }

    #[test]
    fn test_prompt_length_capped_at_half_context() {
        let mut session = session_with(StubConfig::default(), 16);
        // 9 tokens > 16 / 2.
        let err = session.generate("abcdefghi", &greedy()).unwrap_err();
        assert!(matches!(err, SessionError::PromptTooLong { got: 9, limit: 8 }));
    }

    #[test]
    fn test_tokenize_failure_is_hard_error() {
        let mut session = session_with(
            StubConfig {
                fail_tokenize: true,
                ..StubConfig::default()
            },
            128,
        );
        assert!(matches!(
            session.generate("hi", &greedy()),
            Err(SessionError::Tokenization(_))
        ));
    }

    #[test]
    fn test_max_tokens_budget_respected() {
        let mut session = session_with(
            StubConfig {
                script: script("abcdefghij"),
                ..StubConfig::default()
            },
            128,
        );
        let params = GenerateParams {
            max_tokens: 4,
            ..GenerateParams::greedy()
        };
        let out = session.generate("xy", &params).unwrap();
        assert_eq!(out, "abcd");
    }

    #[test]
    fn test_budget_bounded_by_context_headroom() {
        // Context 16, prompt 8 tokens: at most 8 generated even though
        // max_tokens allows far more.
        let mut session = session_with(
            StubConfig {
                script: script("0123456789abcdef"),
                ..StubConfig::default()
            },
            16,
        );
        let params = GenerateParams {
            max_tokens: 100,
            ..GenerateParams::greedy()
        };
        let out = session.generate("12345678", &params).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(session.history_len(), 16);
    }

    #[test]
    fn test_stops_at_end_of_generation() {
        let mut session = session_with(
            StubConfig {
                script: script("ok"),
                ..StubConfig::default()
            },
            128,
        );
        let params = GenerateParams {
            max_tokens: 100,
            ..GenerateParams::greedy()
        };
        // Script exhausts after two tokens, then the stub emits EOG.
        let out = session.generate("q", &params).unwrap();
        assert_eq!(out, "ok");
    }

    #[test]
    fn test_mid_loop_decode_failure_returns_partial_output() {
        let mut session = session_with(
            StubConfig {
                script: script("abcdef"),
                fail_decode_after: Some(3),
                ..StubConfig::default()
            },
            128,
        );
        let out = session.generate("hi", &greedy()).unwrap();
        // Three tokens were sampled and appended before the failing decode.
        assert_eq!(out, "abc");
    }

    #[test]
    fn test_context_reset_between_generations() {
        let mut session = session_with(
            StubConfig {
                script: script("!!"),
                ..StubConfig::default()
            },
            128,
        );
        let first = session.generate("first prompt", &greedy()).unwrap();
        assert_eq!(first, "!!");

        // The stub rejects decode positions that do not restart at zero,
        // so a second successful call proves the reset happened.
        let second = session.generate("two", &greedy()).unwrap();
        assert_eq!(second, "!!");
        assert_eq!(session.history_len(), "two".len() + 2);
    }

    #[test]
    fn test_greedy_determinism_across_fresh_sessions() {
        let run = || {
            let mut session = session_with(
                StubConfig {
                    script: script("deterministic"),
                    ..StubConfig::default()
                },
                256,
            );
            session.generate("What is 2+2?", &greedy()).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_seeded_sampling_reproducible() {
        let run = |seed: u64| {
            let mut session = Session::new(
                Box::new(StubRuntime::new(
                    StubConfig {
                        script: script("stochastic"),
                        ..StubConfig::default()
                    },
                    256,
                )),
                Some(seed),
            );
            let params = GenerateParams {
                temperature: 1.0,
                ..GenerateParams::default()
            };
            session.generate("prompt", &params).unwrap()
        };
        assert_eq!(run(9), run(9));
    }
}
