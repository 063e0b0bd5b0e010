//! Exhaustive enumeration of small generation spaces.

use crate::candidate::Candidate;
use std::rc::Rc;

/// Re-startable enumeration; every call yields a fresh pass.
pub type Enumerate<I> = Rc<dyn Fn() -> Box<dyn Iterator<Item = I>>>;

/// A finite enumeration of every candidate a generator can produce.
///
/// `max_count` is an upper bound: filtering combinators keep the count of
/// the enumeration they filter.
pub struct Exhaustive<T> {
    max_count: u64,
    enumerate: Enumerate<Candidate<T>>,
}

impl<T> Clone for Exhaustive<T> {
    fn clone(&self) -> Self {
        Exhaustive {
            max_count: self.max_count,
            enumerate: Rc::clone(&self.enumerate),
        }
    }
}

impl<T: 'static> Exhaustive<T> {
    pub fn new<F>(max_count: u64, enumerate: F) -> Self
    where
        F: Fn() -> Box<dyn Iterator<Item = Candidate<T>>> + 'static,
    {
        Exhaustive {
            max_count,
            enumerate: Rc::new(enumerate),
        }
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Candidate<T>>> {
        (self.enumerate)()
    }

    /// Freshly built values of one complete pass.
    pub fn values(&self) -> Vec<T> {
        self.iter().map(|candidate| candidate.recreate()).collect()
    }

    pub fn map<U: 'static>(&self, f: Rc<dyn Fn(T) -> U>) -> Exhaustive<U> {
        let base = self.clone();
        Exhaustive::new(self.max_count, move || {
            let f = Rc::clone(&f);
            Box::new(base.iter().map(move |candidate| candidate.map_rc(Rc::clone(&f))))
        })
    }

    pub fn filter(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Exhaustive<T> {
        let base = self.clone();
        Exhaustive::new(self.max_count, move || {
            let predicate = Rc::clone(&predicate);
            Box::new(
                base.iter()
                    .filter_map(move |candidate| candidate.filter_rc(Rc::clone(&predicate))),
            )
        })
    }

    /// Keep the candidates `f` accepts, transforming them on the way.
    pub fn filter_map<U, F>(&self, f: F) -> Exhaustive<U>
    where
        F: Fn(Candidate<T>) -> Option<Candidate<U>> + 'static,
        U: 'static,
    {
        let base = self.clone();
        let f = Rc::new(f);
        Exhaustive::new(self.max_count, move || {
            let f = Rc::clone(&f);
            Box::new(base.iter().filter_map(move |candidate| f(candidate)))
        })
    }
}

/// `count` if it exists and does not exceed `max`.
pub(crate) fn within(count: Option<u64>, max: u64) -> Option<u64> {
    count.filter(|&count| count <= max)
}

/// Number of sequences of length `min..=max` over `choices` values.
pub(crate) fn sequence_count(choices: u64, min: usize, max: usize, limit: u64) -> Option<u64> {
    if choices == 0 {
        return if min == 0 { Some(1) } else { Some(0) };
    }
    let mut total: u64 = 0;
    let mut power: u64 = 1;
    for length in 0..=max {
        if length >= min {
            total = within(total.checked_add(power), limit)?;
        }
        if length == max {
            break;
        }
        power = power.checked_mul(choices)?;
        if length + 1 >= min && power > limit {
            return None;
        }
    }
    Some(total)
}

/// Number of subsets of size `min..=max` of `choices` distinct values.
pub(crate) fn subset_count(choices: u64, min: usize, max: usize, limit: u64) -> Option<u64> {
    let top = (max as u64).min(choices);
    let mut total: u64 = 0;
    let mut binomial: u128 = 1;
    for k in 0..=top {
        if k > 0 {
            binomial = binomial.checked_mul((choices - k + 1) as u128)? / k as u128;
        }
        if k >= min as u64 {
            let term = u64::try_from(binomial).ok()?;
            total = within(total.checked_add(term), limit)?;
        }
    }
    Some(total)
}

/// Mixed-radix counter over index tuples; the last position moves fastest.
pub(crate) struct Odometer {
    lengths: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl Odometer {
    pub(crate) fn new(lengths: &[usize]) -> Self {
        let current = if lengths.iter().any(|&len| len == 0) {
            None
        } else {
            Some(vec![0; lengths.len()])
        };
        Odometer {
            lengths: lengths.to_vec(),
            current,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let result = self.current.clone()?;
        let mut advanced = false;
        if let Some(current) = self.current.as_mut() {
            for position in (0..current.len()).rev() {
                current[position] += 1;
                if current[position] < self.lengths[position] {
                    advanced = true;
                    break;
                }
                current[position] = 0;
            }
        }
        if !advanced {
            self.current = None;
        }
        Some(result)
    }
}

/// Ascending `k`-combinations of `0..n`.
pub(crate) struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    pub(crate) fn new(n: usize, k: usize) -> Self {
        Combinations {
            n,
            current: if k <= n { Some((0..k).collect()) } else { None },
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let result = self.current.clone()?;
        let k = result.len();
        let mut advanced = false;
        if let Some(current) = self.current.as_mut() {
            for position in (0..k).rev() {
                if current[position] < self.n - k + position {
                    current[position] += 1;
                    for later in position + 1..k {
                        current[later] = current[later - 1] + 1;
                    }
                    advanced = true;
                    break;
                }
            }
        }
        if !advanced {
            self.current = None;
        }
        Some(result)
    }
}
