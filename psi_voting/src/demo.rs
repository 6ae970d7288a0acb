//! Reference elections with published outcomes.

use crate::builder::ScoreBuilder;
use crate::config::{Ballots, OptimizerErrors};
use crate::rand48::Rand48;
use crate::scores::ScoreMatrix;

/// Seed of the published random election.
pub const DEMO_SEED: i64 = 161_703_501_943;

/// An election of uniformly random integer scores in `[0, top_score]`.
///
/// Scores are drawn candidate by candidate, each candidate's scores for all ballots in a
/// row, as `floor((top_score + 1) * drand48())`. With [`DEMO_SEED`], 400 ballots, 29
/// candidates and a top score of 9, the best 8-winner set under the Fsimmons table has
/// quality 672.538969660059.
pub fn random_integer_election(
    rng: &mut Rand48,
    num_ballots: usize,
    num_candidates: usize,
    top_score: u32,
) -> Result<Ballots, OptimizerErrors> {
    let range = (top_score + 1) as f64;
    let scores: Vec<u8> = (0..num_ballots * num_candidates)
        .map(|_| (rng.next_f64() * range) as u8)
        .collect();
    Ok(Ballots::Integer {
        scores: ScoreMatrix::new(num_candidates, num_ballots, scores)?,
        top_score,
    })
}

/// The example of the Wikipedia article on proportional approval voting:
/// 5 ballots approve A and B, 17 approve A and C, 8 approve D.
///
/// With 2 winners and harmonic quality, {A, C} wins with quality 30.5.
pub fn pav_wikipedia_election() -> Result<(Vec<String>, Ballots), OptimizerErrors> {
    let names: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
    let mut builder = ScoreBuilder::new(1)?.candidates(&names)?;
    builder.add_ballots(&[Some(1.0), Some(1.0), Some(0.0), Some(0.0)], 5)?;
    builder.add_ballots(&[Some(1.0), Some(0.0), Some(1.0), Some(0.0)], 17)?;
    builder.add_ballots(&[Some(0.0), Some(0.0), Some(0.0), Some(1.0)], 8)?;
    Ok((names, builder.to_integer_ballots()?))
}
