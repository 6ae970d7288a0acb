pub use crate::config::*;
use crate::scores::{ScoreMatrix, BLANK_SCORE};

/// A builder for adding scored ballots.
///
/// Ballots come in one row at a time; the optimizer wants one row per candidate, and the
/// builder does the transposition.
///
/// ```
/// use psi_voting::builder::ScoreBuilder;
/// # use psi_voting::OptimizerErrors;
///
/// let mut builder = ScoreBuilder::new(9)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_ballot(&[Some(9.0), None, Some(3.0)])?;
/// builder.add_ballots(&[Some(0.0), Some(7.0), Some(9.0)], 3)?;
///
/// let ballots = builder.to_integer_ballots()?;
/// assert_eq!(ballots.num_ballots(), 4);
/// # Ok::<(), OptimizerErrors>(())
/// ```
pub struct ScoreBuilder {
    pub(crate) _top_score: u32,
    pub(crate) _candidates: Vec<String>,
    // One column of scores per candidate, blanks as None.
    pub(crate) _columns: Vec<Vec<Option<f64>>>,
}

impl ScoreBuilder {
    pub fn new(top_score: u32) -> Result<ScoreBuilder, OptimizerErrors> {
        if top_score == 0 || top_score >= BLANK_SCORE as u32 {
            return Err(OptimizerErrors::InvalidTopScore(top_score));
        }
        Ok(ScoreBuilder {
            _top_score: top_score,
            _candidates: Vec::new(),
            _columns: Vec::new(),
        })
    }

    pub fn candidates(self, names: &[String]) -> Result<ScoreBuilder, OptimizerErrors> {
        if names.is_empty() {
            return Err(OptimizerErrors::EmptyElection);
        }
        Ok(ScoreBuilder {
            _top_score: self._top_score,
            _candidates: names.to_vec(),
            _columns: vec![Vec::new(); names.len()],
        })
    }

    pub fn num_ballots(&self) -> usize {
        self._columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Adds one ballot, with the scores given in candidate order. `None` is a blank.
    pub fn add_ballot(&mut self, scores: &[Option<f64>]) -> Result<(), OptimizerErrors> {
        self.add_ballots(scores, 1)
    }

    /// Adds `count` identical ballots.
    pub fn add_ballots(&mut self, scores: &[Option<f64>], count: u32) -> Result<(), OptimizerErrors> {
        if scores.len() != self._candidates.len() {
            return Err(OptimizerErrors::BallotLength {
                expected: self._candidates.len(),
                actual: scores.len(),
            });
        }
        for (candidate, s) in scores.iter().enumerate() {
            if let Some(value) = s {
                if !(0.0..=self._top_score as f64).contains(value) {
                    return Err(OptimizerErrors::ScoreOutOfRange {
                        candidate,
                        value: *value,
                    });
                }
            }
        }
        for _ in 0..count {
            for (column, s) in self._columns.iter_mut().zip(scores.iter()) {
                column.push(*s);
            }
        }
        Ok(())
    }

    /// The ballots for the table search. Every score must be an integer.
    pub fn to_integer_ballots(&self) -> Result<Ballots, OptimizerErrors> {
        let mut scores: Vec<u8> = Vec::with_capacity(self._candidates.len() * self.num_ballots());
        for (candidate, column) in self._columns.iter().enumerate() {
            for s in column.iter() {
                let score = match s {
                    None => BLANK_SCORE,
                    Some(value) if value.fract() == 0.0 => *value as u8,
                    Some(value) => {
                        return Err(OptimizerErrors::NonIntegerScore {
                            candidate,
                            value: *value,
                        })
                    }
                };
                scores.push(score);
            }
        }
        Ok(Ballots::Integer {
            scores: ScoreMatrix::new(self._candidates.len(), self.num_ballots(), scores)?,
            top_score: self._top_score,
        })
    }

    /// The ballots for the real-valued search: scores scaled to `[0, 1]`,
    /// blanks replaced by the candidate's average.
    pub fn to_real_ballots(&self) -> Result<Ballots, OptimizerErrors> {
        let scale = 1.0 / self._top_score as f64;
        let mut scores: Vec<f64> = Vec::with_capacity(self._candidates.len() * self.num_ballots());
        for column in self._columns.iter() {
            let (sum, count) = column
                .iter()
                .flatten()
                .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
            let fill = if count > 0 {
                sum / count as f64 * scale
            } else {
                0.0
            };
            scores.extend(column.iter().map(|s| s.map(|v| v * scale).unwrap_or(fill)));
        }
        Ok(Ballots::Real(ScoreMatrix::new(
            self._candidates.len(),
            self.num_ballots(),
            scores,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn transposes_ballots() {
        let mut b = ScoreBuilder::new(1).unwrap().candidates(&names(&["A", "B"])).unwrap();
        b.add_ballots(&[Some(1.0), Some(0.0)], 2).unwrap();
        b.add_ballot(&[None, Some(1.0)]).unwrap();
        match b.to_integer_ballots().unwrap() {
            Ballots::Integer { scores, top_score } => {
                assert_eq!(top_score, 1);
                assert_eq!(scores.row(0), &[1, 1, BLANK_SCORE]);
                assert_eq!(scores.row(1), &[0, 0, 1]);
            }
            x => panic!("unexpected {:?}", x),
        }
        match b.to_real_ballots().unwrap() {
            Ballots::Real(scores) => {
                assert_eq!(scores.row(0), &[1.0, 1.0, 1.0]);
                assert_eq!(scores.row(1), &[0.0, 0.0, 1.0]);
            }
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn rejects_bad_ballots() {
        let mut b = ScoreBuilder::new(9).unwrap().candidates(&names(&["A", "B"])).unwrap();
        assert_eq!(
            b.add_ballot(&[Some(1.0)]),
            Err(OptimizerErrors::BallotLength {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            b.add_ballot(&[Some(1.0), Some(10.0)]),
            Err(OptimizerErrors::ScoreOutOfRange {
                candidate: 1,
                value: 10.0
            })
        );
        b.add_ballot(&[Some(1.5), Some(2.0)]).unwrap();
        assert_eq!(
            b.to_integer_ballots(),
            Err(OptimizerErrors::NonIntegerScore {
                candidate: 0,
                value: 1.5
            })
        );
        assert!(b.to_real_ballots().is_ok());
    }

    #[test]
    fn rejects_bad_top_score() {
        assert!(ScoreBuilder::new(0).is_err());
        assert!(ScoreBuilder::new(255).is_err());
        assert!(ScoreBuilder::new(9).unwrap().candidates(&[]).is_err());
    }
}
