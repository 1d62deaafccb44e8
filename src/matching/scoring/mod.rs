//! Match scoring.

pub mod match_scorer;

pub use match_scorer::{MatchScorer, ScoreBreakdown};
