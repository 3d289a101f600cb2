pub mod chain;
pub mod dist;
pub mod greedy;
pub mod temperature;
pub mod top_k;
pub mod top_p;

pub use chain::{Sampler, SamplerChain, TokenLogit};
pub use dist::DistSampler;
pub use greedy::GreedySampler;
pub use temperature::TemperatureSampler;
pub use top_k::TopKSampler;
pub use top_p::TopPSampler;
