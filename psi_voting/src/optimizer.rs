//! Exhaustive search for the winner set of maximum quality.
//!
//! The quality of a winner set is the sum over ballots of a per-ballot quality of the
//! ballot's total score for the winners. Subsets are visited in revolving-door order, so
//! each step updates every ballot total with one subtraction and one addition.

use log::{debug, info};

use crate::config::{CandidateStats, OptimizerErrors, SearchResult};
use crate::quality::{quality_fast, QualityTable, TABLE_SIZE};
use crate::revolving_door::{subsets_count, RevolvingDoor};
use crate::scores::ScoreMatrix;

/// How one ballot's running total is kept and scored.
pub trait BallotEvaluator {
    type Score: Copy;
    type Total: Copy;

    /// The total of a ballot for the empty winner set.
    fn offset(&self) -> Self::Total;
    fn add(&self, total: Self::Total, score: Self::Score) -> Self::Total;
    fn swap(&self, total: Self::Total, leaving: Self::Score, entering: Self::Score) -> Self::Total;
    fn quality(&self, total: Self::Total) -> f64;
}

/// Real totals starting at `delta`, scored with [`quality_fast`].
pub struct OffsetEvaluator {
    pub delta: f64,
}

impl BallotEvaluator for OffsetEvaluator {
    type Score = f64;
    type Total = f64;

    fn offset(&self) -> f64 {
        self.delta
    }

    #[inline]
    fn add(&self, total: f64, score: f64) -> f64 {
        total + score
    }

    #[inline]
    fn swap(&self, total: f64, leaving: f64, entering: f64) -> f64 {
        total + (entering - leaving)
    }

    #[inline]
    fn quality(&self, total: f64) -> f64 {
        quality_fast(total)
    }
}

/// Integer totals starting at 0, scored by table lookup.
pub struct TableEvaluator<'a> {
    pub table: &'a QualityTable,
}

impl<'a> BallotEvaluator for TableEvaluator<'a> {
    type Score = u8;
    type Total = i32;

    fn offset(&self) -> i32 {
        0
    }

    #[inline]
    fn add(&self, total: i32, score: u8) -> i32 {
        total + score as i32
    }

    #[inline]
    fn swap(&self, total: i32, leaving: u8, entering: u8) -> i32 {
        total + (entering as i32 - leaving as i32)
    }

    #[inline]
    fn quality(&self, total: i32) -> f64 {
        assert!(
            0 <= total && (total as usize) < TABLE_SIZE,
            "ballot total {} is outside the quality table",
            total
        );
        self.table.get(total as usize)
    }
}

/// The best subset of a search, before statistics are attached.
#[derive(PartialEq, Debug, Clone)]
pub struct Search {
    pub quality: f64,
    pub winners: Vec<u32>,
    pub subsets_searched: u64,
}

/// Visits every `num_winners`-subset of the candidates and returns the first one
/// reaching the maximum quality.
///
/// Requires `0 < num_winners < C` and at least one ballot.
pub fn search<E: BallotEvaluator>(
    scores: &ScoreMatrix<E::Score>,
    num_winners: u32,
    evaluator: &E,
) -> Search {
    let num_candidates = scores.num_candidates() as u32;
    let num_ballots = scores.num_ballots();
    assert!(num_ballots > 0, "search: no ballots");
    let mut door = RevolvingDoor::new(num_candidates, num_winners);
    info!(
        "search: {} ballots, {} candidates, {} winners: {} subsets to visit",
        num_ballots,
        num_candidates,
        num_winners,
        subsets_count(num_candidates, num_winners)
    );

    // Totals for the initial subset {0, ..., W-1}.
    let mut totals: Vec<E::Total> = vec![evaluator.offset(); num_ballots];
    for &c in door.current() {
        for (t, &s) in totals.iter_mut().zip(scores.row(c as usize)) {
            *t = evaluator.add(*t, s);
        }
    }

    let mut best_quality: f64 = totals.iter().map(|&t| evaluator.quality(t)).sum();
    let mut best: Vec<u32> = door.current().to_vec();
    let mut visited: u64 = 1;
    debug!("search: initial quality {:.8} for {:?}", best_quality, best);

    while let Some(swap) = door.next() {
        visited += 1;
        let leaving = scores.row(swap.leaving as usize);
        let entering = scores.row(swap.entering as usize);
        let mut q = 0.0;
        for ((t, &l), &e) in totals.iter_mut().zip(leaving).zip(entering) {
            *t = evaluator.swap(*t, l, e);
            q += evaluator.quality(*t);
        }
        if q > best_quality {
            best_quality = q;
            best.copy_from_slice(door.current());
            debug!("search: new record {:16.8}: {:?}", q, best);
        }
    }

    info!(
        "search: exhaustively searched {} subsets, best quality {}",
        visited, best_quality
    );
    Search {
        quality: best_quality,
        winners: best,
        subsets_searched: visited,
    }
}

/// Real-valued search: every ballot total starts at `delta` (in `(0, 2]`), scores must
/// lie in `[0, 1]` with blanks already filled in.
pub fn optimize_real(
    scores: &ScoreMatrix<f64>,
    num_winners: u32,
    delta: f64,
) -> SearchResult {
    assert!(0.0 < delta && delta <= 2.0, "optimize_real: delta {} outside (0, 2]", delta);
    for (candidate, row) in scores.rows().enumerate() {
        assert!(
            row.iter().all(|s| (0.0..=1.0).contains(s)),
            "optimize_real: candidate {} has a score outside [0, 1]",
            candidate
        );
    }
    let s = search(scores, num_winners, &OffsetEvaluator { delta });
    SearchResult {
        quality: s.quality,
        winners: s.winners,
        subsets_searched: s.subsets_searched,
        candidate_stats: scores.candidate_stats(),
    }
}

/// Integer search through a quality table. Fails with [`OptimizerErrors::BlankScores`]
/// as soon as one score is above the table's top score.
///
/// The table must support `num_winners` (see [`QualityTable::supports`]).
pub fn optimize_table(
    scores: &ScoreMatrix<u8>,
    num_winners: u32,
    table: &QualityTable,
) -> Result<SearchResult, OptimizerErrors> {
    let (stats, has_blank): (Vec<CandidateStats>, bool) = scores.candidate_stats(table.top_score());
    if has_blank {
        info!("optimize_table: blank scores detected, cannot run the table search");
        return Err(OptimizerErrors::BlankScores { stats });
    }
    assert!(
        table.supports(num_winners),
        "optimize_table: {} winners with top score {} overflow the table",
        num_winners,
        table.top_score()
    );
    let s = search(scores, num_winners, &TableEvaluator { table });
    Ok(SearchResult {
        quality: s.quality,
        winners: s.winners,
        subsets_searched: s.subsets_searched,
        candidate_stats: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityRule;
    use crate::quality::quality_accurate;
    use crate::scores::BLANK_SCORE;

    // Quality of one subset by summing every ballot from scratch.
    fn direct_quality(scores: &ScoreMatrix<u8>, subset: &[u32], top_score: u32) -> f64 {
        (0..scores.num_ballots())
            .map(|k| {
                let total: u32 = subset.iter().map(|&c| scores.get(c as usize, k) as u32).sum();
                quality_accurate(total as f64 / top_score as f64)
            })
            .sum()
    }

    fn small_election() -> ScoreMatrix<u8> {
        // 4 candidates, 5 ballots
        ScoreMatrix::new(
            4,
            5,
            vec![
                3, 0, 1, 2, 3, //
                0, 3, 3, 1, 0, //
                2, 2, 0, 0, 1, //
                1, 1, 2, 3, 3,
            ],
        )
        .unwrap()
    }

    #[test]
    fn incremental_totals_match_full_resum() {
        let scores = small_election();
        let evaluator = OffsetEvaluator { delta: 0.5 };
        let real = scores.normalized(3);
        let mut door = RevolvingDoor::new(4, 2);
        let mut totals: Vec<f64> = vec![0.5; 5];
        for &c in door.current() {
            for (t, &s) in totals.iter_mut().zip(real.row(c as usize)) {
                *t = evaluator.add(*t, s);
            }
        }
        while let Some(swap) = door.next() {
            for (k, t) in totals.iter_mut().enumerate() {
                *t = evaluator.swap(*t, real.get(swap.leaving as usize, k), real.get(swap.entering as usize, k));
            }
            for (k, t) in totals.iter().enumerate() {
                let full: f64 = 0.5 + door.current().iter().map(|&c| real.get(c as usize, k)).sum::<f64>();
                assert!((t - full).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn table_search_finds_the_best_subset() {
        let scores = small_election();
        let table = QualityTable::build(QualityRule::Fsimmons, 3);
        let res = optimize_table(&scores, 2, &table).unwrap();
        assert_eq!(res.subsets_searched, 6);

        let mut best = f64::NEG_INFINITY;
        for a in 0..4u32 {
            for b in (a + 1)..4 {
                best = best.max(direct_quality(&scores, &[a, b], 3));
            }
        }
        assert!((res.quality - best).abs() < 1e-12);
        assert!((direct_quality(&scores, &res.winners, 3) - best).abs() < 1e-12);
        assert_eq!(res.candidate_stats[0].sum_score, 9.0);
        assert_eq!(res.candidate_stats[3].non_blank_count, 5);
    }

    #[test]
    fn real_search_with_vanishing_offset_matches_table() {
        let scores = small_election();
        let table = QualityTable::build(QualityRule::Fsimmons, 3);
        let by_table = optimize_table(&scores, 2, &table).unwrap();
        let by_real = optimize_real(&scores.normalized(3), 2, 1e-12);
        assert_eq!(by_table.winners, vec![0, 3]);
        assert_eq!(by_table.winners, by_real.winners);
        assert!((by_table.quality - by_real.quality).abs() < 1e-9);
        assert_eq!(optimize_real(&scores.normalized(3), 2, 0.5).winners, vec![0, 3]);
    }

    #[test]
    fn blanks_abort_the_table_search() {
        let mut raw = vec![1u8; 12];
        raw[7] = BLANK_SCORE;
        let scores = ScoreMatrix::new(3, 4, raw).unwrap();
        let table = QualityTable::build(QualityRule::Harmonic, 1);
        match optimize_table(&scores, 1, &table) {
            Err(OptimizerErrors::BlankScores { stats }) => {
                assert_eq!(stats.len(), 3);
                assert_eq!(stats[1].non_blank_count, 3);
                assert_eq!(stats[0].non_blank_count, 4);
            }
            x => panic!("unexpected result {:?}", x),
        }
    }

    #[test]
    fn ties_keep_the_first_subset() {
        let scores = ScoreMatrix::new(3, 2, vec![1u8; 6]).unwrap();
        let table = QualityTable::build(QualityRule::Harmonic, 1);
        let res = optimize_table(&scores, 2, &table).unwrap();
        assert_eq!(res.winners, vec![0, 1]);
        assert_eq!(res.quality, 3.0);
    }

    #[test]
    #[should_panic]
    fn table_too_small() {
        let scores = ScoreMatrix::new(3, 1, vec![9u8, 9, 9]).unwrap();
        let table = QualityTable::build(QualityRule::Fsimmons, 300);
        let _ = optimize_table(&scores, 2, &table);
    }

    #[test]
    #[should_panic]
    fn real_scores_must_be_scaled() {
        let scores = ScoreMatrix::new(2, 1, vec![0.5, 1.5]).unwrap();
        optimize_real(&scores, 1, 0.5);
    }
}
