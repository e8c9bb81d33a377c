//! Provider implementations

mod groq;

pub use groq::{DEFAULT_MODEL, GroqConfig, GroqProvider};
