//! Ranking catalog artworks against a room photo and/or a text query.

pub mod criteria;
pub mod ranking;
pub mod scorer;

pub use criteria::{MatchCriteria, RoomAnalysis, TextQueryCriteria};
pub use ranking::{rank, Candidate, MatchResult};
