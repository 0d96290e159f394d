//! Adapters: concrete signing, chain state and network implementations.

pub mod ed25519;
pub mod loopback;
pub mod memory_chain;

pub use ed25519::Ed25519Scheme;
pub use loopback::{LoopbackEndpoint, LoopbackNetwork};
pub use memory_chain::InMemoryChain;
