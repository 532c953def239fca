use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total_questions: usize,
    /// Questions answered at least once.
    pub attempted: usize,
    /// Questions still owing work: an unrecovered miss or pending repeats.
    pub outstanding: usize,
    /// Total answers recorded so far.
    pub submissions: u64,
    pub is_complete: bool,
}
