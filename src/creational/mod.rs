//! Creational patterns: controlling how and how often objects get built.

pub mod singleton;
