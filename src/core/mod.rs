//! Core recovery engine
//!
//! This module contains the LaTeX recovery pipeline:
//! - Element discovery and dedup
//! - The structural probe and platform strategies
//! - Heuristic reconstruction from rendered text and layout
//! - Candidate normalization

pub mod discovery;
pub mod extract;
pub mod lookup;
pub mod normalize;
pub mod platform;
pub mod probe;
pub mod reconstruct;
pub mod rules;
pub mod symbols;
