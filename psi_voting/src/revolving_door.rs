//! Revolving-door generation of all `W`-element subsets of `{0, ..., C-1}`.
//!
//! This is algorithm R of Knuth (TAOCP 4A, 7.2.1.3). Consecutive subsets differ by
//! exactly one element, so a caller maintaining per-ballot sums only has to remove one
//! candidate's scores and add another's at each step.

/// One step of the enumeration: `leaving` was replaced by `entering`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Swap {
    pub leaving: u32,
    pub entering: u32,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Step {
    Decrease,
    Increase,
}

/// Iterator over the transitions between consecutive subsets.
///
/// The first subset is `{0, ..., W-1}` and is available through [`RevolvingDoor::current`]
/// before the first call to `next`. Every `Some(swap)` leaves the new subset in `current`.
/// In total `binomial(C, W)` subsets are visited, hence `binomial(C, W) - 1` swaps.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RevolvingDoor {
    // Strictly increasing, with the sentinel x[W] = C.
    x: Vec<u32>,
    num_winners: usize,
    exhausted: bool,
}

impl RevolvingDoor {
    pub fn new(num_candidates: u32, num_winners: u32) -> RevolvingDoor {
        assert!(
            0 < num_winners && num_winners < num_candidates,
            "RevolvingDoor: need 0 < W < C, got W={} C={}",
            num_winners,
            num_candidates
        );
        let mut x: Vec<u32> = (0..num_winners).collect();
        x.push(num_candidates);
        RevolvingDoor {
            x,
            num_winners: num_winners as usize,
            exhausted: false,
        }
    }

    /// The current subset, sorted ascending.
    pub fn current(&self) -> &[u32] {
        &self.x[..self.num_winners]
    }

    fn advance(&mut self) -> Option<Swap> {
        let w = self.num_winners;
        let x = &mut self.x;

        // Easy case: move the smallest element.
        let mut step = if w % 2 == 1 {
            if x[0] + 1 < x[1] {
                let leaving = x[0];
                x[0] += 1;
                return Some(Swap {
                    leaving,
                    entering: x[0],
                });
            }
            Step::Decrease
        } else {
            if x[0] > 0 {
                let leaving = x[0];
                x[0] -= 1;
                return Some(Swap {
                    leaving,
                    entering: x[0],
                });
            }
            Step::Increase
        };

        let mut j = 1;
        while j < w {
            match step {
                Step::Decrease => {
                    if x[j] as usize > j {
                        let leaving = x[j];
                        x[j] = x[j - 1];
                        x[j - 1] = (j - 1) as u32;
                        return Some(Swap {
                            leaving,
                            entering: x[j - 1],
                        });
                    }
                    step = Step::Increase;
                }
                Step::Increase => {
                    if x[j] + 1 < x[j + 1] {
                        let leaving = x[j - 1];
                        x[j - 1] = x[j];
                        x[j] += 1;
                        return Some(Swap {
                            leaving,
                            entering: x[j],
                        });
                    }
                    step = Step::Decrease;
                }
            }
            j += 1;
        }
        None
    }
}

impl Iterator for RevolvingDoor {
    type Item = Swap;

    fn next(&mut self) -> Option<Swap> {
        if self.exhausted {
            return None;
        }
        let swap = self.advance();
        self.exhausted = swap.is_none();
        swap
    }
}

/// `binomial(n, k)`: the number of subsets a full enumeration visits.
pub fn subsets_count(num_candidates: u32, num_winners: u32) -> u64 {
    if num_winners > num_candidates {
        return 0;
    }
    let k = num_winners.min(num_candidates - num_winners) as u64;
    let n = num_candidates as u64;
    let mut res: u64 = 1;
    for i in 0..k {
        // Exact at every step: res * (n - i) is divisible by i + 1.
        res = res * (n - i) / (i + 1);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_subsets(c: u32, w: u32) -> Vec<Vec<u32>> {
        let mut door = RevolvingDoor::new(c, w);
        let mut res = vec![door.current().to_vec()];
        while let Some(swap) = door.next() {
            let prev: &Vec<u32> = res.last().unwrap();
            let cur = door.current().to_vec();
            assert!(prev.contains(&swap.leaving), "{:?} {:?}", prev, swap);
            assert!(!prev.contains(&swap.entering), "{:?} {:?}", prev, swap);
            let removed: Vec<u32> = prev.iter().filter(|c| !cur.contains(c)).cloned().collect();
            let added: Vec<u32> = cur.iter().filter(|c| !prev.contains(c)).cloned().collect();
            assert_eq!(removed, vec![swap.leaving]);
            assert_eq!(added, vec![swap.entering]);
            res.push(cur);
        }
        res
    }

    #[test]
    fn five_choose_three_order() {
        let expected: Vec<Vec<u32>> = vec![
            vec![0, 1, 2],
            vec![0, 2, 3],
            vec![1, 2, 3],
            vec![0, 1, 3],
            vec![0, 3, 4],
            vec![1, 3, 4],
            vec![2, 3, 4],
            vec![0, 2, 4],
            vec![1, 2, 4],
            vec![0, 1, 4],
        ];
        assert_eq!(all_subsets(5, 3), expected);
    }

    #[test]
    fn visits_every_subset_once() {
        for c in 2..11 {
            for w in 1..c {
                let subsets = all_subsets(c, w);
                assert_eq!(subsets.len() as u64, subsets_count(c, w), "C={} W={}", c, w);
                let distinct: HashSet<Vec<u32>> = subsets.iter().cloned().collect();
                assert_eq!(distinct.len(), subsets.len(), "C={} W={}", c, w);
                for s in subsets.iter() {
                    assert_eq!(s.len(), w as usize);
                    assert!(s.windows(2).all(|p| p[0] < p[1]), "{:?}", s);
                    assert!(s.iter().all(|&e| e < c));
                }
            }
        }
    }

    #[test]
    fn single_winner_walks_all_candidates() {
        let subsets = all_subsets(4, 1);
        assert_eq!(subsets, vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn stays_exhausted() {
        let mut door = RevolvingDoor::new(3, 2);
        assert_eq!(door.by_ref().count(), 2);
        assert_eq!(door.next(), None);
        assert_eq!(door.next(), None);
    }

    #[test]
    fn counts() {
        assert_eq!(subsets_count(29, 8), 4_292_145);
        assert_eq!(subsets_count(4, 2), 6);
        assert_eq!(subsets_count(10, 0), 1);
        assert_eq!(subsets_count(3, 4), 0);
    }

    #[test]
    #[should_panic]
    fn rejects_full_subset() {
        RevolvingDoor::new(3, 3);
    }
}
