use log::warn;

use crate::config::{CandidateStats, OptimizerErrors};

/// The score written for a candidate a ballot left blank.
pub const BLANK_SCORE: u8 = u8::MAX;

/// A `C x V` score matrix: one row per candidate, one column per ballot.
///
/// Rows are contiguous, so the optimizer can stream one candidate's scores across all
/// ballots.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreMatrix<S> {
    num_candidates: usize,
    num_ballots: usize,
    scores: Vec<S>,
}

impl<S: Copy> ScoreMatrix<S> {
    /// `scores[c * num_ballots + k]` is the score of candidate `c` on ballot `k`.
    pub fn new(
        num_candidates: usize,
        num_ballots: usize,
        scores: Vec<S>,
    ) -> Result<ScoreMatrix<S>, OptimizerErrors> {
        if num_candidates == 0 || num_ballots == 0 {
            return Err(OptimizerErrors::EmptyElection);
        }
        let expected = num_candidates
            .checked_mul(num_ballots)
            .ok_or(OptimizerErrors::DimensionMismatch {
                expected: usize::MAX,
                actual: scores.len(),
            })?;
        if scores.len() != expected {
            return Err(OptimizerErrors::DimensionMismatch {
                expected,
                actual: scores.len(),
            });
        }
        Ok(ScoreMatrix {
            num_candidates,
            num_ballots,
            scores,
        })
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    pub fn num_ballots(&self) -> usize {
        self.num_ballots
    }

    pub fn row(&self, candidate: usize) -> &[S] {
        let start = candidate * self.num_ballots;
        &self.scores[start..start + self.num_ballots]
    }

    pub fn get(&self, candidate: usize, ballot: usize) -> S {
        self.row(candidate)[ballot]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[S]> {
        self.scores.chunks(self.num_ballots)
    }
}

impl ScoreMatrix<f64> {
    pub fn candidate_stats(&self) -> Vec<CandidateStats> {
        self.rows()
            .map(|row| CandidateStats {
                sum_score: row.iter().sum(),
                non_blank_count: row.len() as u32,
            })
            .collect()
    }
}

impl ScoreMatrix<u8> {
    /// Per-candidate statistics over the scores in `[0, top_score]`, and whether any
    /// score was blank.
    pub fn candidate_stats(&self, top_score: u32) -> (Vec<CandidateStats>, bool) {
        let mut has_blank = false;
        let stats = self
            .rows()
            .map(|row| {
                let mut sum: u64 = 0;
                let mut count: u32 = 0;
                for &s in row {
                    if (s as u32) <= top_score {
                        sum += s as u64;
                        count += 1;
                    } else {
                        has_blank = true;
                    }
                }
                CandidateStats {
                    sum_score: sum as f64,
                    non_blank_count: count,
                }
            })
            .collect();
        (stats, has_blank)
    }

    /// Scales the scores to `[0, 1]`. A blank becomes the candidate's average
    /// scaled score, which leaves that average unchanged.
    pub fn normalized(&self, top_score: u32) -> ScoreMatrix<f64> {
        let (stats, _) = self.candidate_stats(top_score);
        let scale = 1.0 / top_score as f64;
        let mut scores: Vec<f64> = Vec::with_capacity(self.scores.len());
        for (candidate, (row, st)) in self.rows().zip(stats.iter()).enumerate() {
            let fill = match st.average() {
                Some(avg) => avg * scale,
                None => {
                    warn!(
                        "normalized: candidate {} has no score on any ballot, using 0",
                        candidate
                    );
                    0.0
                }
            };
            scores.extend(row.iter().map(|&s| {
                if (s as u32) <= top_score {
                    s as f64 * scale
                } else {
                    fill
                }
            }));
        }
        ScoreMatrix {
            num_candidates: self.num_candidates,
            num_ballots: self.num_ballots,
            scores,
        }
    }
}
