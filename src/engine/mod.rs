//! Decision engine.
//!
//! This module contains the rule corpus, the input normalizer and the
//! evaluator that turns a proposed action into a decision.

pub mod evaluator;
pub mod normalizer;
pub mod rules;
