//! Multi-dimensional shrink distance used to rank candidates by simplicity.

use std::cmp::Ordering;
use std::fmt;

/// An ordered tuple of non-negative dimensions.
///
/// Distances compare lexicographically, with the shorter tuple padded with
/// zeros on the right. `MIN` sits below every tuple and `MAX` above every
/// tuple; arithmetic that overflows a dimension clamps to `MAX`.
#[derive(Clone)]
pub struct ShrinkDistance(Repr);

#[derive(Clone)]
enum Repr {
    Min,
    Dims(Vec<u64>),
    Max,
}

impl ShrinkDistance {
    pub const MIN: ShrinkDistance = ShrinkDistance(Repr::Min);
    pub const MAX: ShrinkDistance = ShrinkDistance(Repr::Max);

    pub fn of(dims: &[u64]) -> Self {
        ShrinkDistance(Repr::Dims(dims.to_vec()))
    }

    /// Single-dimension distance.
    pub fn single(dim: u64) -> Self {
        ShrinkDistance(Repr::Dims(vec![dim]))
    }

    /// The all-zero distance.
    pub fn zero() -> Self {
        ShrinkDistance(Repr::Dims(Vec::new()))
    }

    /// Dimensions of a finite distance; `None` for the sentinels.
    pub fn dims(&self) -> Option<&[u64]> {
        match &self.0 {
            Repr::Dims(dims) => Some(dims),
            _ => None,
        }
    }

    /// Whether nothing can be simpler than this distance.
    pub fn is_min(&self) -> bool {
        match &self.0 {
            Repr::Min => true,
            Repr::Dims(dims) => dims.iter().all(|&d| d == 0),
            Repr::Max => false,
        }
    }

    pub fn is_max(&self) -> bool {
        matches!(self.0, Repr::Max)
    }

    /// Dimension-wise sum of several distances.
    ///
    /// The result has as many dimensions as the longest input; `MIN` inputs
    /// contribute nothing and a `MAX` input makes the sum `MAX`.
    pub fn combine<'a, I>(distances: I) -> Self
    where
        I: IntoIterator<Item = &'a ShrinkDistance>,
    {
        let mut sum: Vec<u64> = Vec::new();
        for distance in distances {
            match &distance.0 {
                Repr::Min => {}
                Repr::Max => return ShrinkDistance::MAX,
                Repr::Dims(dims) => {
                    if dims.len() > sum.len() {
                        sum.resize(dims.len(), 0);
                    }
                    for (acc, &d) in sum.iter_mut().zip(dims) {
                        match acc.checked_add(d) {
                            Some(total) => *acc = total,
                            None => return ShrinkDistance::MAX,
                        }
                    }
                }
            }
        }
        ShrinkDistance(Repr::Dims(sum))
    }

    /// Tuple concatenation: this distance's dimensions followed by `other`'s.
    pub fn append(&self, other: &ShrinkDistance) -> Self {
        match (&self.0, &other.0) {
            (Repr::Max, _) | (_, Repr::Max) => ShrinkDistance::MAX,
            (Repr::Min, Repr::Min) => ShrinkDistance::MIN,
            (Repr::Min, Repr::Dims(right)) => ShrinkDistance(Repr::Dims(right.clone())),
            (Repr::Dims(left), Repr::Min) => ShrinkDistance(Repr::Dims(left.clone())),
            (Repr::Dims(left), Repr::Dims(right)) => {
                let mut dims = left.clone();
                dims.extend_from_slice(right);
                ShrinkDistance(Repr::Dims(dims))
            }
        }
    }

    /// Saturating dimension-wise addition.
    pub fn plus(&self, other: &ShrinkDistance) -> Self {
        ShrinkDistance::combine([self, other])
    }

    fn compare_dims(left: &[u64], right: &[u64]) -> Ordering {
        let len = left.len().max(right.len());
        for index in 0..len {
            let l = left.get(index).copied().unwrap_or(0);
            let r = right.get(index).copied().unwrap_or(0);
            match l.cmp(&r) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

impl Default for ShrinkDistance {
    fn default() -> Self {
        ShrinkDistance::zero()
    }
}

impl PartialEq for ShrinkDistance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ShrinkDistance {}

impl PartialOrd for ShrinkDistance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShrinkDistance {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Repr::Min, Repr::Min) | (Repr::Max, Repr::Max) => Ordering::Equal,
            (Repr::Min, _) | (_, Repr::Max) => Ordering::Less,
            (_, Repr::Min) | (Repr::Max, _) => Ordering::Greater,
            (Repr::Dims(left), Repr::Dims(right)) => Self::compare_dims(left, right),
        }
    }
}

impl fmt::Debug for ShrinkDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for ShrinkDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Min => write!(f, "MIN"),
            Repr::Max => write!(f, "MAX"),
            Repr::Dims(dims) => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}
