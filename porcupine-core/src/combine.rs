//! Parameter lists: several generators drawn together.
//!
//! A property's parameters are a `Generators` value: a single `Gen`, a
//! tuple of up to eight `Gen`s of different types, or a `Vec` of `Gen`s of
//! one type. Drawing from it yields a `Candidates` value holding one
//! candidate per parameter, which the shrinking search simplifies one
//! parameter at a time. Combinations in which two parameters hold the same
//! uniqueness key are never offered.

use crate::candidate::Candidate;
use crate::data::{Seed, Size};
use crate::distance::ShrinkDistance;
use crate::edge_cases::{EdgeCaseFactory, EdgeCases};
use crate::error::Result;
use crate::exhaustive::{self, Enumerate, Exhaustive, Odometer};
use crate::gen::Gen;
use crate::scope::{keys_distinct, Scope, UniqueKey};
use std::fmt::Debug;
use std::rc::Rc;

/// One candidate per parameter.
pub trait Candidates: Clone + 'static {
    type Values;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn distance_at(&self, index: usize) -> ShrinkDistance;

    fn distances(&self) -> Vec<ShrinkDistance> {
        (0..self.len()).map(|index| self.distance_at(index)).collect()
    }

    /// Uniqueness keys held by all parameters together.
    fn unique_keys(&self) -> Vec<UniqueKey>;

    /// Whether no two parameters hold colliding keys.
    fn keys_distinct(&self) -> bool {
        keys_distinct(&self.unique_keys())
    }

    /// Copies of `self` with the parameter at `index` replaced by each of its shrinks.
    fn shrink_at(&self, index: usize) -> Box<dyn Iterator<Item = Self>>;

    /// Repeat the step `before -> self` on the parameter at `index`.
    fn grow_at(&self, index: usize, before: &Self) -> Option<Self>;

    /// Freshly built parameter values.
    fn recreate(&self) -> Self::Values;

    /// The cached parameter values rendered with `Debug`.
    fn describe(&self) -> Vec<String>;
}

/// Factory of one combination of edge cases.
pub type CandidatesFactory<C> = Rc<dyn Fn() -> Option<C>>;

/// Generators drawn together into `Candidates`.
pub trait Generators: Clone + 'static {
    type Values;
    type Candidates: Candidates<Values = Self::Values>;

    /// Draw every parameter within one shared scope.
    fn generate_all(&self, size: Size, seed: Seed, scope: &Scope) -> Result<Self::Candidates>;

    /// The cartesian product of the parameters' edge cases, at most `max` of them.
    fn edge_case_factories(&self, max: usize) -> Vec<CandidatesFactory<Self::Candidates>>;

    /// The product of the parameters' enumerations, if it has at most `max` elements.
    fn exhaustive_all(&self, max: u64) -> Option<(u64, Enumerate<Self::Candidates>)>;
}

impl<T: Debug + 'static> Candidates for Candidate<T> {
    type Values = T;

    fn len(&self) -> usize {
        1
    }

    fn distance_at(&self, _index: usize) -> ShrinkDistance {
        self.distance().clone()
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        Candidate::unique_keys(self).to_vec()
    }

    fn shrink_at(&self, index: usize) -> Box<dyn Iterator<Item = Self>> {
        if index == 0 {
            self.shrinks()
        } else {
            Box::new(std::iter::empty())
        }
    }

    fn grow_at(&self, index: usize, before: &Self) -> Option<Self> {
        if index == 0 {
            self.grow(before)
        } else {
            None
        }
    }

    fn recreate(&self) -> T {
        Candidate::recreate(self)
    }

    fn describe(&self) -> Vec<String> {
        vec![format!("{:?}", self.value())]
    }
}

impl<T: Debug + 'static> Generators for Gen<T> {
    type Values = T;
    type Candidates = Candidate<T>;

    fn generate_all(&self, size: Size, seed: Seed, scope: &Scope) -> Result<Candidate<T>> {
        self.generate_in(size, seed, scope)
    }

    fn edge_case_factories(&self, max: usize) -> Vec<CandidatesFactory<Candidate<T>>> {
        self.raw_edge_cases(max).into_factories()
    }

    fn exhaustive_all(&self, max: u64) -> Option<(u64, Enumerate<Candidate<T>>)> {
        let exhaustive = self.exhaustive_limited(max)?;
        let count = exhaustive.max_count();
        let enumerate: Enumerate<Candidate<T>> = Rc::new(move || exhaustive.iter());
        Some((count, enumerate))
    }
}

impl<T: Debug + 'static> Candidates for Vec<Candidate<T>> {
    type Values = Vec<T>;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn distance_at(&self, index: usize) -> ShrinkDistance {
        self.get(index)
            .map(|candidate| candidate.distance().clone())
            .unwrap_or(ShrinkDistance::MIN)
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.iter()
            .flat_map(|candidate| candidate.unique_keys().iter().cloned())
            .collect()
    }

    fn shrink_at(&self, index: usize) -> Box<dyn Iterator<Item = Self>> {
        let Some(candidate) = self.get(index) else {
            return Box::new(std::iter::empty());
        };
        let this = self.clone();
        Box::new(
            candidate
                .shrinks()
                .map(move |shrunk| {
                    let mut next = this.clone();
                    next[index] = shrunk;
                    next
                })
                .filter(|next| next.keys_distinct()),
        )
    }

    fn grow_at(&self, index: usize, before: &Self) -> Option<Self> {
        let grown = self.get(index)?.grow(before.get(index)?)?;
        let mut next = self.clone();
        next[index] = grown;
        next.keys_distinct().then_some(next)
    }

    fn recreate(&self) -> Vec<T> {
        self.iter().map(|candidate| candidate.recreate()).collect()
    }

    fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|candidate| format!("{:?}", candidate.value()))
            .collect()
    }
}

impl<T: Debug + 'static> Generators for Vec<Gen<T>> {
    type Values = Vec<T>;
    type Candidates = Vec<Candidate<T>>;

    fn generate_all(&self, size: Size, seed: Seed, scope: &Scope) -> Result<Vec<Candidate<T>>> {
        self.iter()
            .zip(seed.split_n(self.len()))
            .map(|(gen, seed)| gen.generate_in(size, seed, scope))
            .collect()
    }

    fn edge_case_factories(&self, max: usize) -> Vec<CandidatesFactory<Vec<Candidate<T>>>> {
        let parts: Rc<Vec<Vec<EdgeCaseFactory<T>>>> = Rc::new(
            self.iter()
                .map(|gen| gen.raw_edge_cases(max).into_factories())
                .collect(),
        );
        let lengths: Vec<usize> = parts.iter().map(Vec::len).collect();
        Odometer::new(&lengths)
            .take(max)
            .map(|indices| {
                let parts = Rc::clone(&parts);
                Rc::new(move || {
                    indices
                        .iter()
                        .enumerate()
                        .map(|(position, &index)| parts[position][index]())
                        .collect::<Option<Vec<Candidate<T>>>>()
                        .filter(|combination| combination.keys_distinct())
                }) as CandidatesFactory<Vec<Candidate<T>>>
            })
            .collect()
    }

    fn exhaustive_all(&self, max: u64) -> Option<(u64, Enumerate<Vec<Candidate<T>>>)> {
        let parts: Vec<Exhaustive<T>> = self
            .iter()
            .map(|gen| gen.exhaustive_limited(max))
            .collect::<Option<_>>()?;
        let count = parts.iter().try_fold(1u64, |count, part| {
            exhaustive::within(count.checked_mul(part.max_count()), max)
        })?;
        let enumerate: Enumerate<Vec<Candidate<T>>> = Rc::new(move || {
            let materialized: Vec<Vec<Candidate<T>>> =
                parts.iter().map(|part| part.iter().collect()).collect();
            let lengths: Vec<usize> = materialized.iter().map(Vec::len).collect();
            Box::new(
                Odometer::new(&lengths)
                    .map(move |indices| {
                        indices
                            .iter()
                            .enumerate()
                            .map(|(position, &index)| materialized[position][index].clone())
                            .collect::<Vec<Candidate<T>>>()
                    })
                    .filter(|combination| combination.keys_distinct()),
            ) as Box<dyn Iterator<Item = Vec<Candidate<T>>>>
        });
        Some((count, enumerate))
    }
}

macro_rules! tuple_impls {
    ($( ($($name:ident : $idx:tt),+) )+) => {
        $(
            impl<$($name: Debug + 'static),+> Candidates for ($(Candidate<$name>,)+) {
                type Values = ($($name,)+);

                fn len(&self) -> usize {
                    [$($idx),+].len()
                }

                fn distance_at(&self, index: usize) -> ShrinkDistance {
                    match index {
                        $($idx => self.$idx.distance().clone(),)+
                        _ => ShrinkDistance::MIN,
                    }
                }

                fn unique_keys(&self) -> Vec<UniqueKey> {
                    let mut keys = Vec::new();
                    $(keys.extend_from_slice(self.$idx.unique_keys());)+
                    keys
                }

                fn shrink_at(&self, index: usize) -> Box<dyn Iterator<Item = Self>> {
                    match index {
                        $(
                            $idx => {
                                let this = self.clone();
                                Box::new(
                                    self.$idx
                                        .shrinks()
                                        .map(move |shrunk| {
                                            let mut next = this.clone();
                                            next.$idx = shrunk;
                                            next
                                        })
                                        .filter(|next| next.keys_distinct()),
                                )
                            }
                        )+
                        _ => Box::new(std::iter::empty()),
                    }
                }

                fn grow_at(&self, index: usize, before: &Self) -> Option<Self> {
                    match index {
                        $(
                            $idx => {
                                let grown = self.$idx.grow(&before.$idx)?;
                                let mut next = self.clone();
                                next.$idx = grown;
                                next.keys_distinct().then_some(next)
                            }
                        )+
                        _ => None,
                    }
                }

                fn recreate(&self) -> Self::Values {
                    ($(self.$idx.recreate(),)+)
                }

                fn describe(&self) -> Vec<String> {
                    vec![$(format!("{:?}", self.$idx.value())),+]
                }
            }

            impl<$($name: Debug + 'static),+> Generators for ($(Gen<$name>,)+) {
                type Values = ($($name,)+);
                type Candidates = ($(Candidate<$name>,)+);

                fn generate_all(
                    &self,
                    size: Size,
                    seed: Seed,
                    scope: &Scope,
                ) -> Result<Self::Candidates> {
                    let seeds = seed.split_n([$($idx),+].len());
                    Ok(($(self.$idx.generate_in(size, seeds[$idx], scope)?,)+))
                }

                fn edge_case_factories(
                    &self,
                    max: usize,
                ) -> Vec<CandidatesFactory<Self::Candidates>> {
                    let parts = Rc::new(($(self.$idx.raw_edge_cases(max).into_factories(),)+));
                    let lengths = [$(parts.$idx.len()),+];
                    Odometer::new(&lengths)
                        .take(max)
                        .map(|indices| {
                            let parts = Rc::clone(&parts);
                            Rc::new(move || {
                                let combination = ($((parts.$idx[indices[$idx]])()?,)+);
                                combination.keys_distinct().then_some(combination)
                            }) as CandidatesFactory<Self::Candidates>
                        })
                        .collect()
                }

                fn exhaustive_all(&self, max: u64) -> Option<(u64, Enumerate<Self::Candidates>)> {
                    let parts = ($(self.$idx.exhaustive_limited(max)?,)+);
                    let count = [$(parts.$idx.max_count()),+]
                        .iter()
                        .try_fold(1u64, |count, &part| {
                            exhaustive::within(count.checked_mul(part), max)
                        })?;
                    let enumerate: Enumerate<Self::Candidates> = Rc::new(move || {
                        let materialized =
                            ($(parts.$idx.iter().collect::<Vec<Candidate<$name>>>(),)+);
                        let lengths = [$(materialized.$idx.len()),+];
                        Box::new(
                            Odometer::new(&lengths)
                                .map(move |indices| ($(materialized.$idx[indices[$idx]].clone(),)+))
                                .filter(|combination| combination.keys_distinct()),
                        ) as Box<dyn Iterator<Item = Self::Candidates>>
                    });
                    Some((count, enumerate))
                }
            }
        )+
    };
}

tuple_impls! {
    (A: 0)
    (A: 0, B: 1)
    (A: 0, B: 1, C: 2)
    (A: 0, B: 1, C: 2, D: 3)
    (A: 0, B: 1, C: 2, D: 3, E: 4)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6)
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7)
}

impl<T: 'static> Gen<T> {
    /// Draw several generators together into one value.
    ///
    /// The distance is the sum of the parts' distances and shrinking
    /// simplifies one part at a time, left to right. Edge cases and the
    /// exhaustive enumeration are cartesian products of the parts'.
    ///
    /// ```ignore
    /// let sums = Gen::combine((Gen::int_range(0, 9)?, Gen::int_range(0, 9)?))
    ///     .map(|(a, b)| a + b);
    /// ```
    pub fn combine<G>(generators: G) -> Gen<T>
    where
        G: Generators<Values = T>,
    {
        let edge_generators = generators.clone();
        let exhaustive_generators = generators.clone();
        Gen::new(move |size, seed, scope| {
            Ok(combined_candidate(generators.generate_all(size, seed, scope)?))
        })
        .with_edge_cases(move |max| {
            EdgeCases::from_factories(
                edge_generators
                    .edge_case_factories(max)
                    .into_iter()
                    .map(|factory| {
                        Rc::new(move || factory().map(combined_candidate)) as EdgeCaseFactory<T>
                    })
                    .collect(),
            )
        })
        .with_exhaustive(move |max| {
            let (count, enumerate) = exhaustive_generators.exhaustive_all(max)?;
            Some(Exhaustive::new(count, move || {
                Box::new(enumerate().map(combined_candidate))
            }))
        })
    }
}

fn combined_candidate<C: Candidates>(parts: C) -> Candidate<C::Values>
where
    C::Values: 'static,
{
    let distance = ShrinkDistance::combine(&parts.distances());
    let keys = parts.unique_keys();
    let rebuilt_from = parts.clone();
    Candidate::new(move || rebuilt_from.recreate(), distance, move || {
        let parts = parts.clone();
        Box::new(
            (0..parts.len())
                .flat_map(move |index| parts.shrink_at(index))
                .map(combined_candidate),
        )
    })
    .with_keys(keys)
}
