//! # Classic Object-Oriented Patterns in Rust
//!
//! Three standalone patterns, each with its own runnable demo:
//!
//! ## Behavioral: Chain of Responsibility
//! - Handlers as trait objects with an owned successor link
//! - Shared forwarding behavior composed into every handler
//!
//! ## Creational: Singleton
//! - Process-wide registry keyed by `TypeId`
//! - Check-and-construct under a mutex
//!
//! ## Structural: Flyweight
//! - Order-independent key derived from intrinsic state
//! - Shared `Rc` handles, extrinsic state supplied per call
//!
//! Run the demos with:
//! ```bash
//! cargo run --bin chain_of_responsibility
//! cargo run --bin singleton
//! cargo run --bin flyweight
//! ```

pub mod behavioral;
pub mod config;
pub mod creational;
pub mod error;
pub mod structural;
pub mod telemetry;

pub use error::{PatternError, Result};
