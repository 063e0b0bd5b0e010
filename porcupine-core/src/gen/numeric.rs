//! Integral, boolean and character generators.

use super::Gen;
use crate::candidate::{Candidate, Shrinks};
use crate::distance::ShrinkDistance;
use crate::edge_cases::EdgeCases;
use crate::error::{PorcupineError, Result};
use crate::exhaustive::{self, Exhaustive};
use std::fmt::Debug;
use std::hash::Hash;

/// Fixed-width integers usable with `Gen::between`.
pub trait Integral: Copy + Ord + Debug + Hash + 'static {
    const MIN: Self;
    const MAX: Self;

    fn to_i128(self) -> i128;

    /// Convert back; `value` is always within `MIN..=MAX`.
    fn from_i128(value: i128) -> Self;
}

macro_rules! impl_integral {
    ($($t:ty),*) => {
        $(
            impl Integral for $t {
                const MIN: Self = <$t>::MIN;
                const MAX: Self = <$t>::MAX;

                fn to_i128(self) -> i128 {
                    self as i128
                }

                fn from_i128(value: i128) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_integral!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Integral> Gen<T> {
    /// Integers in `min..=max`, shrinking toward zero or the bound nearest to it.
    pub fn between(min: T, max: T) -> Result<Gen<T>> {
        check_range(min, max)?;
        let target = 0i128.clamp(min.to_i128(), max.to_i128());
        Ok(Gen::integral(min.to_i128(), max.to_i128(), target, false))
    }

    /// Integers in `min..=max`, shrinking toward `target` clamped into the range.
    pub fn between_towards(min: T, max: T, target: T) -> Result<Gen<T>> {
        check_range(min, max)?;
        let target = target.to_i128().clamp(min.to_i128(), max.to_i128());
        Ok(Gen::integral(min.to_i128(), max.to_i128(), target, true))
    }

    /// Integers over the whole width of `T`.
    pub fn any_integral() -> Gen<T> {
        let target = 0i128.clamp(T::MIN.to_i128(), T::MAX.to_i128());
        Gen::integral(T::MIN.to_i128(), T::MAX.to_i128(), target, false)
    }

    /// Uniform integers; the range must already be valid.
    pub(crate) fn integral(min: i128, max: i128, target: i128, target_is_edge: bool) -> Gen<T> {
        Gen::new(move |_size, seed, _scope| {
            let width = (max - min) as u128 + 1;
            let (offset, _) = seed.next_bounded_u128(width);
            Ok(integral_candidate::<T>(min + offset as i128, target))
        })
        .with_edge_cases(move |_| {
            let mut values = vec![min, max];
            values.extend((-2..=2).filter(|v| (min..=max).contains(v)));
            if target_is_edge {
                values.push(target);
            }
            values.sort_unstable();
            values.dedup();
            EdgeCases::from_fns(
                values
                    .into_iter()
                    .map(|value| move || integral_candidate::<T>(value, target))
                    .collect(),
            )
        })
        .with_exhaustive(move |limit| {
            let count = u64::try_from(max - min).ok()?.checked_add(1);
            let count = exhaustive::within(count, limit)?;
            Some(Exhaustive::new(count, move || {
                Box::new((min..=max).map(move |value| integral_candidate::<T>(value, target)))
            }))
        })
    }
}

impl Gen<i32> {
    /// Shorthand for `Gen::<i32>::between`.
    pub fn int_range(min: i32, max: i32) -> Result<Gen<i32>> {
        Gen::between(min, max)
    }
}

fn check_range<T: Integral>(min: T, max: T) -> Result<()> {
    if min > max {
        return Err(PorcupineError::invalid_range(format!(
            "min {:?} is greater than max {:?}",
            min, max
        )));
    }
    Ok(())
}

/// An integer candidate shrinking toward `target`.
///
/// The distance is the absolute difference from the target. Shrinks try
/// the target itself, then halve the remaining difference:
/// `8` toward `0` offers `0, 4, 6, 7`.
pub(crate) fn integral_candidate<T: Integral>(value: i128, target: i128) -> Candidate<T> {
    let distance = distance_between(value, target);
    Candidate::new(
        move || T::from_i128(value),
        ShrinkDistance::single(distance),
        move || {
            Box::new(
                halvings(value, target).map(move |shrunk| integral_candidate::<T>(shrunk, target)),
            ) as Shrinks<T>
        },
    )
    .with_grower(move |before| {
        let before = before.dims()?.first().copied()?;
        let step = before.checked_sub(distance).filter(|&step| step > 0)?;
        let remaining = distance.saturating_sub(step);
        if remaining == distance {
            return None;
        }
        let grown = if value >= target {
            target + remaining as i128
        } else {
            target - remaining as i128
        };
        Some(integral_candidate::<T>(grown, target))
    })
}

fn distance_between(value: i128, target: i128) -> u64 {
    u64::try_from(value.abs_diff(target)).unwrap_or(u64::MAX)
}

fn halvings(value: i128, target: i128) -> impl Iterator<Item = i128> {
    let diff = value - target;
    let first = if diff == 0 { None } else { Some(target) };
    let halves = std::iter::successors(Some(diff / 2), |&half| {
        if half / 2 == 0 {
            None
        } else {
            Some(half / 2)
        }
    });
    first
        .into_iter()
        .chain(halves.filter(|&half| half != 0).map(move |half| value - half))
}

impl Gen<bool> {
    /// Random booleans; `true` shrinks to `false`.
    pub fn bool() -> Self {
        Gen::new(|_size, seed, _scope| {
            let (value, _) = seed.next_bool();
            Ok(bool_candidate(value))
        })
        .with_edge_cases(|_| {
            EdgeCases::from_fns(
                [false, true]
                    .into_iter()
                    .map(|value| move || bool_candidate(value))
                    .collect(),
            )
        })
        .with_exhaustive(|limit| {
            let count = exhaustive::within(Some(2), limit)?;
            Some(Exhaustive::new(count, || {
                Box::new([false, true].into_iter().map(bool_candidate))
            }))
        })
    }
}

fn bool_candidate(value: bool) -> Candidate<bool> {
    Candidate::new(move || value, ShrinkDistance::single(value as u64), move || {
        if value {
            Box::new(std::iter::once(bool_candidate(false))) as Shrinks<bool>
        } else {
            Box::new(std::iter::empty())
        }
    })
}

const SURROGATES: u32 = 0xE000 - 0xD800;

fn char_index(c: char) -> u32 {
    let code = c as u32;
    if code >= 0xE000 {
        code - SURROGATES
    } else {
        code
    }
}

fn index_char(index: u32) -> char {
    let code = if index >= 0xD800 {
        index + SURROGATES
    } else {
        index
    };
    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
}

const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl Gen<char> {
    /// Characters in `lo..=hi`, skipping surrogates and shrinking toward `lo`.
    pub fn char_range(lo: char, hi: char) -> Result<Gen<char>> {
        if lo > hi {
            return Err(PorcupineError::invalid_range(format!(
                "char range {:?}..={:?} is empty",
                lo, hi
            )));
        }
        let (lo, hi) = (char_index(lo) as i128, char_index(hi) as i128);
        Ok(chars_by_index(lo, hi, |index| index_char(index as u32)))
    }

    pub fn ascii_alpha() -> Gen<char> {
        chars_from_table(ALPHA)
    }

    pub fn ascii_alphanumeric() -> Gen<char> {
        chars_from_table(ALPHANUMERIC)
    }
}

fn chars_from_table(table: &'static [u8]) -> Gen<char> {
    chars_by_index(0, table.len() as i128 - 1, move |index| {
        table.get(index as usize).map(|&b| b as char).unwrap_or('a')
    })
}

/// Characters selected by index; edge cases are the two ends of the range.
fn chars_by_index<F>(lo: i128, hi: i128, to_char: F) -> Gen<char>
where
    F: Fn(i128) -> char + Copy + 'static,
{
    Gen::<u32>::integral(lo, hi, lo, false)
        .map(move |index| to_char(index as i128))
        .with_edge_cases(move |_| {
            EdgeCases::from_fns(
                [lo, hi]
                    .into_iter()
                    .map(|index| {
                        move || {
                            integral_candidate::<u32>(index, lo).map(move |i| to_char(i as i128))
                        }
                    })
                    .collect(),
            )
        })
}
