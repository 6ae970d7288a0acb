/*!
Optimal proportional-representation elections with the digamma quality rule.

Given the scores that `V` ballots award to `C` candidates, `psi_voting` finds, among all
the winner sets of size `W`, the one maximizing

`Quality = SUM(ballots k) F(SUM(winners c) score[c][k])`

where `F` is either `F(x) = [psi(x + 1/2) - psi(1/2)] / 2` (psi being the digamma function)
or the harmonic numbers (proportional approval voting). The search is exhaustive: all
`binomial(C, W)` subsets are visited in revolving-door order, so that each step costs
`O(V)` instead of `O(W V)`.

```
use psi_voting::*;

let (names, ballots) = demo::pav_wikipedia_election()?;
let rules = SearchRules {
    num_winners: 2,
    mode: SearchMode::Table(QualityRule::Harmonic),
};
let result = optimize(&ballots, &rules)?;
assert_eq!(result.quality, 30.5);
assert_eq!(names[result.winners[1] as usize], "C");
# Ok::<(), OptimizerErrors>(())
```
*/

mod config;
mod scores;

pub mod builder;
pub mod demo;
pub mod manual;
pub mod optimizer;
pub mod psi;
pub mod quality;
pub mod rand48;
pub mod revolving_door;

use log::{info, warn};

pub use crate::config::*;
pub use crate::optimizer::{optimize_real, optimize_table};
pub use crate::psi::psi;
pub use crate::quality::{quality, QualityTable, TABLE_SIZE};
pub use crate::scores::{ScoreMatrix, BLANK_SCORE};

/// Runs the exhaustive search selected by `rules` on the given ballots.
///
/// Integer ballots can use either mode. With the offset mode they are scaled to `[0, 1]`
/// and blanks are replaced by the candidate's average, while the reported statistics stay
/// those of the given scores. Real ballots only support the offset mode.
///
/// Integer ballots need a top score in `[1, 254]`, so that [`BLANK_SCORE`] is never a valid
/// score: anything else is [`OptimizerErrors::InvalidTopScore`]. The table mode returns
/// [`OptimizerErrors::TableTooSmall`] when the winners' totals can overflow the table, and
/// [`OptimizerErrors::BlankScores`] when a score is blank. Falling back to the offset mode
/// is left to the caller.
pub fn optimize(ballots: &Ballots, rules: &SearchRules) -> Result<SearchResult, OptimizerErrors> {
    info!(
        "optimize: {} ballots, {} candidates, rules: {:?}",
        ballots.num_ballots(),
        ballots.num_candidates(),
        rules
    );
    check_dimensions(ballots, rules.num_winners);

    let res = match (ballots, rules.mode) {
        (Ballots::Real(scores), SearchMode::Offset { delta }) => {
            optimize_real(scores, rules.num_winners, delta)
        }
        (Ballots::Integer { top_score, .. }, _)
            if *top_score == 0 || *top_score >= BLANK_SCORE as u32 =>
        {
            // The blank sentinel must stay outside the valid scores.
            return Err(OptimizerErrors::InvalidTopScore(*top_score));
        }
        (Ballots::Integer { scores, top_score }, SearchMode::Offset { delta }) => {
            let mut res = optimize_real(&scores.normalized(*top_score), rules.num_winners, delta);
            // Statistics of the scores as given, blanks excluded.
            res.candidate_stats = scores.candidate_stats(*top_score).0;
            res
        }
        (Ballots::Integer { scores, top_score }, SearchMode::Table(rule)) => {
            let table = QualityTable::build(rule, *top_score);
            if !table.supports(rules.num_winners) {
                warn!(
                    "optimize: {} winners with top score {} do not fit in {} table entries",
                    rules.num_winners, top_score, TABLE_SIZE
                );
                return Err(OptimizerErrors::TableTooSmall {
                    num_winners: rules.num_winners,
                    top_score: *top_score,
                });
            }
            optimize_table(scores, rules.num_winners, &table)?
        }
        (Ballots::Real(_), SearchMode::Table(_)) => {
            return Err(OptimizerErrors::TableNeedsIntegerScores);
        }
    };
    info!(
        "optimize: winners {:?} with quality {} ({} subsets)",
        res.winners, res.quality, res.subsets_searched
    );
    Ok(res)
}

// The search requires 0 < W < C; anything else is a caller bug.
fn check_dimensions(ballots: &Ballots, num_winners: u32) {
    let num_candidates = ballots.num_candidates();
    assert!(
        num_winners > 0 && (num_winners as usize) < num_candidates,
        "optimize: need 0 < winners < candidates, got {} winners for {} candidates",
        num_winners,
        num_candidates
    );
    assert!(ballots.num_ballots() > 0, "optimize: no ballots");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand48::Rand48;

    #[test]
    fn pav_wikipedia_example() {
        let (_, ballots) = demo::pav_wikipedia_election().unwrap();
        let rules = SearchRules {
            num_winners: 2,
            mode: SearchMode::Table(QualityRule::Harmonic),
        };
        let res = optimize(&ballots, &rules).unwrap();
        assert_eq!(res.quality, 30.5);
        assert_eq!(res.winners, vec![0, 2]);
        assert_eq!(res.subsets_searched, 6);
    }

    #[test]
    fn published_random_election() {
        let _ = env_logger::try_init();
        let mut rng = Rand48::new(demo::DEMO_SEED);
        let ballots = demo::random_integer_election(&mut rng, 400, 29, 9).unwrap();
        let rules = SearchRules {
            num_winners: 8,
            mode: SearchMode::Table(QualityRule::Fsimmons),
        };
        let res = optimize(&ballots, &rules).unwrap();
        assert!((res.quality - 672.538969660059).abs() < 1e-9, "{}", res.quality);
        assert_eq!(res.winners, vec![1, 7, 12, 22, 23, 26, 27, 28]);
        assert_eq!(res.subsets_searched, 4_292_145);
    }

    #[test]
    fn blanks_are_reported_in_table_mode() {
        let _ = env_logger::try_init();
        let mut builder = builder::ScoreBuilder::new(9)
            .unwrap()
            .candidates(&["A".to_string(), "B".to_string(), "C".to_string()])
            .unwrap();
        builder.add_ballot(&[Some(9.0), None, Some(3.0)]).unwrap();
        builder.add_ballot(&[Some(1.0), Some(4.0), Some(3.0)]).unwrap();
        let ballots = builder.to_integer_ballots().unwrap();

        let table_rules = SearchRules {
            num_winners: 1,
            mode: SearchMode::Table(QualityRule::Fsimmons),
        };
        match optimize(&ballots, &table_rules) {
            Err(OptimizerErrors::BlankScores { stats }) => {
                assert_eq!(stats[1].non_blank_count, 1);
                assert_eq!(stats[1].average(), Some(4.0));
            }
            x => panic!("unexpected {:?}", x),
        }

        // The caller-side fallback: the offset mode fills the blank with the mean.
        let offset_rules = SearchRules {
            num_winners: 1,
            mode: SearchMode::Offset {
                delta: SearchRules::DEFAULT_DELTA,
            },
        };
        let res = optimize(&ballots, &offset_rules).unwrap();
        assert_eq!(res.winners, vec![0]);
        assert_eq!(res.candidate_stats[1].non_blank_count, 1);
        assert_eq!(res.candidate_stats[2].sum_score, 6.0);
    }

    #[test]
    fn real_ballots_cannot_use_the_table() {
        let ballots = Ballots::Real(ScoreMatrix::new(2, 1, vec![0.5, 1.0]).unwrap());
        let rules = SearchRules {
            num_winners: 1,
            mode: SearchMode::Table(QualityRule::Harmonic),
        };
        assert_eq!(
            optimize(&ballots, &rules),
            Err(OptimizerErrors::TableNeedsIntegerScores)
        );
    }

    #[test]
    fn table_too_small_is_reported() {
        let ballots = Ballots::Integer {
            scores: ScoreMatrix::new(4, 1, vec![0u8, 1, 2, 3]).unwrap(),
            top_score: 200,
        };
        // 2 * 200 fits in the table, 3 * 200 does not.
        let rules = SearchRules {
            num_winners: 2,
            ..SearchRules::DEFAULT_RULES
        };
        assert!(optimize(&ballots, &rules).is_ok());
        let rules = SearchRules {
            num_winners: 3,
            ..SearchRules::DEFAULT_RULES
        };
        assert_eq!(
            optimize(&ballots, &rules),
            Err(OptimizerErrors::TableTooSmall {
                num_winners: 3,
                top_score: 200
            })
        );
    }

    #[test]
    fn top_score_overlapping_the_blank_is_rejected() {
        // Candidate 1 has a blank on the first ballot.
        let ballots = Ballots::Integer {
            scores: ScoreMatrix::new(3, 2, vec![1u8, 1, BLANK_SCORE, 1, 1, 1]).unwrap(),
            top_score: 255,
        };
        let table_rules = SearchRules {
            num_winners: 1,
            mode: SearchMode::Table(QualityRule::Fsimmons),
        };
        assert_eq!(
            optimize(&ballots, &table_rules),
            Err(OptimizerErrors::InvalidTopScore(255))
        );
        let offset_rules = SearchRules {
            num_winners: 1,
            mode: SearchMode::Offset { delta: 0.5 },
        };
        assert_eq!(
            optimize(&ballots, &offset_rules),
            Err(OptimizerErrors::InvalidTopScore(255))
        );
        let zero_top = Ballots::Integer {
            scores: ScoreMatrix::new(2, 1, vec![0u8, 0]).unwrap(),
            top_score: 0,
        };
        assert_eq!(
            optimize(&zero_top, &table_rules),
            Err(OptimizerErrors::InvalidTopScore(0))
        );
    }

    #[test]
    #[should_panic]
    fn too_many_winners() {
        let (_, ballots) = demo::pav_wikipedia_election().unwrap();
        let rules = SearchRules {
            num_winners: 4,
            ..SearchRules::DEFAULT_RULES
        };
        let _ = optimize(&ballots, &rules);
    }
}
