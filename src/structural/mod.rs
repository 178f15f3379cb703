//! Structural patterns: sharing and composing objects.

pub mod flyweight;
