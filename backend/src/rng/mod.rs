//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module, and the
//! generator is always passed explicitly. There is no process-wide instance.

mod xorshift;

pub use xorshift::RngManager;
