// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use crate::scores::ScoreMatrix;

/// The scores of an election, one row per candidate and one column per ballot.
#[derive(PartialEq, Debug, Clone)]
pub enum Ballots {
    /// Scores already scaled to `[0, 1]`, with blanks filled by the candidate's mean.
    Real(ScoreMatrix<f64>),
    /// Integer scores in `[0, top_score]`. Anything above `top_score` is a blank.
    Integer {
        scores: ScoreMatrix<u8>,
        top_score: u32,
    },
}

impl Ballots {
    pub fn num_candidates(&self) -> usize {
        match self {
            Ballots::Real(s) => s.num_candidates(),
            Ballots::Integer { scores, .. } => scores.num_candidates(),
        }
    }

    pub fn num_ballots(&self) -> usize {
        match self {
            Ballots::Real(s) => s.num_ballots(),
            Ballots::Integer { scores, .. } => scores.num_ballots(),
        }
    }
}

// ******** Output data structures *********

/// Sum and count of the non-blank scores of one candidate.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct CandidateStats {
    pub sum_score: f64,
    pub non_blank_count: u32,
}

impl CandidateStats {
    /// None when the candidate was not scored on any ballot.
    pub fn average(&self) -> Option<f64> {
        if self.non_blank_count == 0 {
            None
        } else {
            Some(self.sum_score / self.non_blank_count as f64)
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SearchResult {
    /// Sum over the ballots of the per-ballot quality of the winner set.
    pub quality: f64,
    /// Indices of the winning candidates, sorted ascending.
    pub winners: Vec<u32>,
    pub subsets_searched: u64,
    /// One entry per candidate, in candidate order.
    pub candidate_stats: Vec<CandidateStats>,
}

/// Errors that prevent a search from running.
///
/// Misuse of the numerical routines (negative arguments, more winners than candidates,
/// totals overflowing the quality table) is not reported here: it panics.
#[derive(PartialEq, Debug, Clone)]
pub enum OptimizerErrors {
    EmptyElection,
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
    BallotLength {
        expected: usize,
        actual: usize,
    },
    ScoreOutOfRange {
        candidate: usize,
        value: f64,
    },
    NonIntegerScore {
        candidate: usize,
        value: f64,
    },
    InvalidTopScore(u32),
    /// The table search cannot handle blank scores. The statistics of the
    /// non-blank scores are still returned.
    BlankScores {
        stats: Vec<CandidateStats>,
    },
    TableNeedsIntegerScores,
    TableTooSmall {
        num_winners: u32,
        top_score: u32,
    },
}

impl Error for OptimizerErrors {}

impl Display for OptimizerErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizerErrors::EmptyElection => write!(f, "the election has no ballots or no candidates"),
            OptimizerErrors::DimensionMismatch { expected, actual } => write!(
                f,
                "score matrix expected {} entries but got {}",
                expected, actual
            ),
            OptimizerErrors::BallotLength { expected, actual } => write!(
                f,
                "ballot has {} scores but there are {} candidates",
                actual, expected
            ),
            OptimizerErrors::ScoreOutOfRange { candidate, value } => write!(
                f,
                "score {} for candidate {} is out of range",
                value, candidate
            ),
            OptimizerErrors::NonIntegerScore { candidate, value } => write!(
                f,
                "score {} for candidate {} is not an integer",
                value, candidate
            ),
            OptimizerErrors::InvalidTopScore(t) => write!(f, "invalid top score {}", t),
            OptimizerErrors::BlankScores { .. } => {
                write!(f, "the table search cannot handle blank scores")
            }
            OptimizerErrors::TableNeedsIntegerScores => {
                write!(f, "the table search requires integer scores")
            }
            OptimizerErrors::TableTooSmall {
                num_winners,
                top_score,
            } => write!(
                f,
                "{} winners with top score {} overflow the quality table",
                num_winners, top_score
            ),
        }
    }
}

// ********* Configuration **********

/// How a ballot's total score for a winner set is turned into quality.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum QualityRule {
    /// `[psi(x + 1/2) - psi(1/2)] / 2` of the total scaled by the top score.
    Fsimmons,
    /// The harmonic number of the total: proportional approval voting.
    Harmonic,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum SearchMode {
    /// Real-valued totals starting at `delta`, evaluated with the fast quality function.
    /// Integer ballots are scaled to `[0, 1]` first, blanks becoming candidate means.
    Offset { delta: f64 },
    /// Integer totals evaluated through a precomputed quality table.
    Table(QualityRule),
}

#[derive(PartialEq, Debug, Clone)]
pub struct SearchRules {
    pub num_winners: u32,
    pub mode: SearchMode,
}

impl SearchRules {
    /// Recommended offset for the real-valued search.
    pub const DEFAULT_DELTA: f64 = 0.5;

    pub const DEFAULT_RULES: SearchRules = SearchRules {
        num_winners: 1,
        mode: SearchMode::Table(QualityRule::Fsimmons),
    };
}
