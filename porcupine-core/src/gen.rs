//! Generator combinators for property-based testing.

use crate::candidate::{flat_mapped, Candidate, Shrinks};
use crate::data::*;
use crate::distance::ShrinkDistance;
use crate::edge_cases::{EdgeCaseFactory, EdgeCases};
use crate::error::{Failure, PorcupineError, Result};
use crate::exhaustive::{self, Exhaustive};
use crate::scope::{GenId, Scope};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

pub mod choice;
pub mod collections;
pub mod numeric;

type Generator<T> = Rc<dyn Fn(Size, Seed, &Scope) -> Result<Candidate<T>>>;
type EdgeCaseSource<T> = Rc<dyn Fn(usize) -> EdgeCases<T>>;
type ExhaustiveSource<T> = Rc<dyn Fn(u64) -> Option<Exhaustive<T>>>;
type Fallible<T, U> = Rc<dyn Fn(T) -> std::result::Result<U, Failure>>;

/// Size and seed used to draw a selected generator's candidates when an
/// edge case or an enumerated value is shrunk across a `flat_map`.
pub(crate) const DERIVED_SIZE: Size = Size(10);
pub(crate) const DERIVED_SEED: Seed = Seed(0x2545_f491_4f6c_dd1d, 0x9e37_79b9_7f4a_7c15);

/// A generator for test data of type `T`.
///
/// Generators are explicit, first-class values that can be composed
/// using combinator functions. A generator is a pure function of size and
/// seed; alongside it travel an optional edge-case supplier and an optional
/// exhaustive enumerator, both derived compositionally by the combinators.
pub struct Gen<T> {
    generator: Generator<T>,
    edge_cases: EdgeCaseSource<T>,
    exhaustive: ExhaustiveSource<T>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            generator: Rc::clone(&self.generator),
            edge_cases: Rc::clone(&self.edge_cases),
            exhaustive: Rc::clone(&self.exhaustive),
        }
    }
}

impl<T: 'static> Gen<T> {
    /// Create a new generator from a function; it has no edge cases and no
    /// exhaustive enumeration until they are attached.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Size, Seed, &Scope) -> Result<Candidate<T>> + 'static,
    {
        Gen {
            generator: Rc::new(f),
            edge_cases: Rc::new(|_| EdgeCases::none()),
            exhaustive: Rc::new(|_| None),
        }
    }

    /// Attach an edge-case supplier; it receives the maximum wanted.
    pub fn with_edge_cases<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> EdgeCases<T> + 'static,
    {
        self.edge_cases = Rc::new(f);
        self
    }

    /// Attach an exhaustive enumerator; it receives the largest acceptable count.
    pub fn with_exhaustive<F>(mut self, f: F) -> Self
    where
        F: Fn(u64) -> Option<Exhaustive<T>> + 'static,
    {
        self.exhaustive = Rc::new(f);
        self
    }

    pub fn without_edge_cases(self) -> Self {
        self.with_edge_cases(|_| EdgeCases::none())
    }

    /// Generate a candidate using the given size and seed in a fresh scope.
    pub fn generate(&self, size: Size, seed: Seed) -> Result<Candidate<T>> {
        self.generate_in(size, seed, &Scope::new())
    }

    /// Generate a candidate sharing uniqueness and history state with `scope`.
    pub fn generate_in(&self, size: Size, seed: Seed, scope: &Scope) -> Result<Candidate<T>> {
        (self.generator)(size, seed, scope)
    }

    /// Draw `count` independent values.
    pub fn sample(&self, count: usize, size: Size, seed: Seed) -> Result<Vec<T>> {
        seed.split_n(count)
            .into_iter()
            .map(|seed| self.generate(size, seed).map(|candidate| candidate.recreate()))
            .collect()
    }

    /// Distinct edge cases, at most `DEFAULT_MAX_EDGE_CASES` of them.
    pub fn edge_cases(&self) -> EdgeCases<T>
    where
        T: Debug,
    {
        self.edge_cases_limited(DEFAULT_MAX_EDGE_CASES)
    }

    pub fn edge_cases_limited(&self, max: usize) -> EdgeCases<T>
    where
        T: Debug,
    {
        (self.edge_cases)(max).dedup().limit(max)
    }

    pub(crate) fn raw_edge_cases(&self, max: usize) -> EdgeCases<T> {
        (self.edge_cases)(max).limit(max)
    }

    /// The complete enumeration, if the space is finite and no larger than
    /// `MAX_EXHAUSTIVE_COUNT`.
    pub fn exhaustive(&self) -> Option<Exhaustive<T>> {
        self.exhaustive_limited(MAX_EXHAUSTIVE_COUNT)
    }

    pub fn exhaustive_limited(&self, max: u64) -> Option<Exhaustive<T>> {
        (self.exhaustive)(max).filter(|exhaustive| exhaustive.max_count() <= max)
    }

    /// Create a generator that always produces the same value.
    pub fn constant(value: T) -> Self
    where
        T: Clone,
    {
        let edge_value = value.clone();
        let enumerated = value.clone();
        Gen::new(move |_size, _seed, _scope| Ok(Candidate::just(value.clone())))
            .with_edge_cases(move |_| {
                let value = edge_value.clone();
                EdgeCases::from_fns(vec![move || Candidate::just(value.clone())])
            })
            .with_exhaustive(move |_| {
                let value = enumerated.clone();
                Some(Exhaustive::new(1, move || {
                    Box::new(std::iter::once(Candidate::just(value.clone())))
                }))
            })
    }

    /// Build a generator whose three facets are derived from this one.
    fn derived<U, G, E, X>(&self, generate: G, edge_cases: E, exhaustive: X) -> Gen<U>
    where
        U: 'static,
        G: Fn(&Gen<T>, Size, Seed, &Scope) -> Result<Candidate<U>> + 'static,
        E: Fn(&Gen<T>, usize) -> EdgeCases<U> + 'static,
        X: Fn(&Gen<T>, u64) -> Option<Exhaustive<U>> + 'static,
    {
        let for_generate = self.clone();
        let for_edge_cases = self.clone();
        let for_exhaustive = self.clone();
        Gen::new(move |size, seed, scope| generate(&for_generate, size, seed, scope))
            .with_edge_cases(move |max| edge_cases(&for_edge_cases, max))
            .with_exhaustive(move |max| exhaustive(&for_exhaustive, max))
    }

    /// Map a function over the generated values.
    pub fn map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> U + 'static,
        U: 'static,
    {
        let f: Rc<dyn Fn(T) -> U> = Rc::new(f);
        let edge_f = Rc::clone(&f);
        let exhaustive_f = Rc::clone(&f);
        self.derived(
            move |base, size, seed, scope| {
                Ok(base.generate_in(size, seed, scope)?.map_rc(Rc::clone(&f)))
            },
            move |base, max| base.raw_edge_cases(max).map(Rc::clone(&edge_f)),
            move |base, max| Some(base.exhaustive_limited(max)?.map(Rc::clone(&exhaustive_f))),
        )
    }

    /// Keep only values satisfying `predicate`.
    ///
    /// Each rejected value costs one retry with a fresh seed; after
    /// `MAX_MISSES` consecutive rejections generation fails with
    /// `TooManyFilterMisses`. Shrinks of an accepted value also satisfy the
    /// predicate.
    pub fn filter<P>(self, predicate: P) -> Gen<T>
    where
        P: Fn(&T) -> bool + 'static,
    {
        let predicate: Rc<dyn Fn(&T) -> bool> = Rc::new(predicate);
        let edge_predicate = Rc::clone(&predicate);
        let exhaustive_predicate = Rc::clone(&predicate);
        self.derived(
            move |base, size, seed, scope| {
                let mut attempts = seed;
                for _ in 0..MAX_MISSES {
                    let (attempt, rest) = attempts.split();
                    attempts = rest;
                    let candidate = base.generate_in(size, attempt, scope)?;
                    if let Some(accepted) = candidate.filter_rc(Rc::clone(&predicate)) {
                        return Ok(accepted);
                    }
                }
                log::debug!("filter rejected {} values in a row", MAX_MISSES);
                Err(PorcupineError::TooManyFilterMisses { misses: MAX_MISSES })
            },
            move |base, max| base.raw_edge_cases(max).filter(Rc::clone(&edge_predicate)),
            move |base, max| {
                Some(
                    base.exhaustive_limited(max)?
                        .filter(Rc::clone(&exhaustive_predicate)),
                )
            },
        )
    }

    /// Map with a function that may fail.
    ///
    /// A failure while generating aborts generation with
    /// `PorcupineError::Generation` unless it is turned into a retry by
    /// `ignore_failures`. Shrinks whose mapping fails are skipped.
    pub fn try_map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(T) -> std::result::Result<U, Failure> + 'static,
        U: Clone + 'static,
    {
        let f: Fallible<T, U> = Rc::new(f);
        let edge_f = Rc::clone(&f);
        let exhaustive_f = Rc::clone(&f);
        self.derived(
            move |base, size, seed, scope| {
                let candidate = base.generate_in(size, seed, scope)?;
                try_mapped(candidate, Rc::clone(&f)).map_err(PorcupineError::Generation)
            },
            move |base, max| {
                let f = Rc::clone(&edge_f);
                base.raw_edge_cases(max)
                    .filter_map(move |candidate| try_mapped(candidate, Rc::clone(&f)).ok())
            },
            move |base, max| {
                let f = Rc::clone(&exhaustive_f);
                Some(
                    base.exhaustive_limited(max)?
                        .filter_map(move |candidate| try_mapped(candidate, Rc::clone(&f)).ok()),
                )
            },
        )
    }

    /// Retry generation when it fails with one of the named failure kinds.
    ///
    /// Retries are bounded by `MAX_MISSES` like filter misses.
    pub fn ignore_failures(self, names: &[&str]) -> Gen<T> {
        let names: Rc<Vec<String>> = Rc::new(names.iter().map(|name| name.to_string()).collect());
        self.derived(
            move |base, size, seed, scope| {
                let mut attempts = seed;
                let mut ignored = String::new();
                for _ in 0..MAX_MISSES {
                    let (attempt, rest) = attempts.split();
                    attempts = rest;
                    match base.generate_in(size, attempt, scope) {
                        Err(PorcupineError::Generation(failure))
                            if names.iter().any(|name| name == failure.name()) =>
                        {
                            ignored = failure.name().to_string();
                        }
                        other => return other,
                    }
                }
                Err(PorcupineError::TooManyIgnoredFailures {
                    name: ignored,
                    misses: MAX_MISSES,
                })
            },
            |base, max| base.raw_edge_cases(max),
            |base, max| base.exhaustive_limited(max),
        )
    }

    /// Dependent generation: use each value to pick the next generator.
    ///
    /// The result's distance is the outer distance followed by the inner
    /// one, so simplifying the choice always ranks before simplifying what
    /// was chosen.
    pub fn flat_map<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(&T) -> Gen<U> + 'static,
        U: 'static,
    {
        let f: Rc<dyn Fn(&T) -> Gen<U>> = Rc::new(f);
        let edge_f = Rc::clone(&f);
        let exhaustive_f = Rc::clone(&f);
        self.derived(
            move |base, size, seed, scope| {
                let (outer_seed, inner_seed) = seed.split();
                let outer = base.generate_in(size, outer_seed, scope)?;
                let inner = f(outer.value()).generate_in(size, inner_seed, scope)?;
                Ok(flat_mapped(outer, inner, Rc::clone(&f), size, inner_seed, true))
            },
            move |base, max| flat_mapped_edge_cases(base, Rc::clone(&edge_f), max),
            move |base, max| flat_mapped_exhaustive(base, Rc::clone(&exhaustive_f), max),
        )
    }

    /// Alias of `flat_map`.
    pub fn bind<U, F>(self, f: F) -> Gen<U>
    where
        F: Fn(&T) -> Gen<U> + 'static,
        U: 'static,
    {
        self.flat_map(f)
    }

    /// Values that were not generated before in the same scope.
    pub fn unique(self) -> Gen<T>
    where
        T: Clone + Hash + Eq,
    {
        self.unique_by(|value: &T| value.clone())
    }

    /// Values whose key was not generated before in the same scope.
    ///
    /// The scope is one property trial, or one embedded collection for
    /// element generators. Every candidate holds its key, so lists, tuples
    /// and flat maps drop shrinks, edge cases and enumerated values in which
    /// two keys of this generator collide. After `MAX_MISSES` consecutive
    /// duplicates generation fails with `TooManyUniqueMisses`.
    pub fn unique_by<K, F>(self, key: F) -> Gen<T>
    where
        K: Hash + Eq + 'static,
        F: Fn(&T) -> K + 'static,
    {
        let owner = GenId::fresh();
        let key: Rc<dyn Fn(&T) -> K> = Rc::new(key);
        let edge_key = Rc::clone(&key);
        let exhaustive_key = Rc::clone(&key);
        self.derived(
            move |base, size, seed, scope| {
                let mut attempts = seed;
                for _ in 0..MAX_MISSES {
                    let (attempt, rest) = attempts.split();
                    attempts = rest;
                    let candidate = base.generate_in(size, attempt, scope)?;
                    if scope.insert_key(owner, key(candidate.value())) {
                        return Ok(candidate.claim_key(owner, Rc::clone(&key)));
                    }
                }
                log::debug!("unique generator repeated itself {} times", MAX_MISSES);
                Err(PorcupineError::TooManyUniqueMisses { misses: MAX_MISSES })
            },
            move |base, max| {
                let key = Rc::clone(&edge_key);
                base.raw_edge_cases(max)
                    .filter_map(move |candidate| Some(candidate.claim_key(owner, Rc::clone(&key))))
            },
            move |base, max| {
                let all = base.exhaustive_limited(max)?;
                let key = Rc::clone(&exhaustive_key);
                Some(Exhaustive::new(all.max_count(), move || {
                    let key = Rc::clone(&key);
                    let mut seen = HashSet::new();
                    let claim = Rc::clone(&key);
                    Box::new(
                        all.iter()
                            .filter(move |candidate| seen.insert(key(candidate.value())))
                            .map(move |candidate| candidate.claim_key(owner, Rc::clone(&claim))),
                    )
                }))
            },
        )
    }

    /// Replace values with `None` with the given probability.
    ///
    /// `None` is the simplest value: every `Some` shrinks to `None` first.
    pub fn inject_null(self, probability: f64) -> Result<Gen<Option<T>>> {
        check_probability(probability)?;
        Ok(self.derived(
            move |base, size, seed, scope| {
                let (choice_seed, value_seed) = seed.split();
                let (roll, _) = choice_seed.next_unit();
                if roll < probability {
                    return Ok(none_candidate());
                }
                Ok(some_candidate(base.generate_in(size, value_seed, scope)?))
            },
            |base, max| {
                EdgeCases::from_fns(vec![none_candidate::<T>])
                    .concat(base.raw_edge_cases(max).filter_map(|c| Some(some_candidate(c))))
            },
            |base, max| {
                let inner = base.exhaustive_limited(max)?;
                let count = exhaustive::within(inner.max_count().checked_add(1), max)?;
                Some(Exhaustive::new(count, move || {
                    Box::new(
                        std::iter::once(none_candidate()).chain(inner.iter().map(some_candidate)),
                    )
                }))
            },
        ))
    }

    /// Repeat values generated earlier in the same scope with the given
    /// probability.
    ///
    /// A fresh value shrinks first to each earlier value, then through its
    /// own shrinks. A repeated value shrinks through the shrinks of the value
    /// it repeats.
    pub fn inject_duplicates(self, probability: f64) -> Result<Gen<T>> {
        check_probability(probability)?;
        let owner = GenId::fresh();
        Ok(self.derived(
            move |base, size, seed, scope| {
                let history = scope.history::<T>(owner);
                let (choice_seed, value_seed) = seed.split();
                let (roll, index_seed) = choice_seed.next_unit();
                if roll < probability && !history.is_empty() {
                    let (index, _) = index_seed.next_bounded(history.len() as u64);
                    if let Some(earlier) = history.get(index as usize) {
                        return Ok(duplicate_candidate(earlier.clone()));
                    }
                }
                let fresh = base.generate_in(size, value_seed, scope)?;
                scope.record(owner, fresh.clone());
                Ok(fresh_candidate(fresh, Rc::new(history)))
            },
            |base, max| base.raw_edge_cases(max),
            |base, max| base.exhaustive_limited(max),
        ))
    }
}

fn check_probability(probability: f64) -> Result<()> {
    if (0.0..=1.0).contains(&probability) {
        Ok(())
    } else {
        Err(PorcupineError::invalid_generator(format!(
            "probability {} is outside [0, 1]",
            probability
        )))
    }
}

fn try_mapped<T: 'static, U: Clone + 'static>(
    candidate: Candidate<T>,
    f: Fallible<T, U>,
) -> std::result::Result<Candidate<U>, Failure> {
    let value = f(candidate.recreate())?;
    let rebuilt_from = candidate.clone();
    let rebuild = Rc::clone(&f);
    let shrink_from = candidate.clone();
    Ok(Candidate::new(
        move || rebuild(rebuilt_from.recreate()).unwrap_or_else(|_| value.clone()),
        candidate.distance().clone(),
        move || {
            let f = Rc::clone(&f);
            Box::new(
                shrink_from
                    .shrinks()
                    .filter_map(move |shrunk| try_mapped(shrunk, Rc::clone(&f)).ok()),
            ) as Shrinks<U>
        },
    )
    .with_keys(candidate.unique_keys().to_vec()))
}

fn flat_mapped_edge_cases<T: 'static, U: 'static>(
    base: &Gen<T>,
    f: Rc<dyn Fn(&T) -> Gen<U>>,
    max: usize,
) -> EdgeCases<U> {
    let mut factories: Vec<EdgeCaseFactory<U>> = Vec::new();
    for outer in base.raw_edge_cases(max).iter() {
        for inner in f(outer.value()).raw_edge_cases(max).into_factories() {
            if factories.len() >= max {
                return EdgeCases::from_factories(factories);
            }
            let outer = outer.clone();
            let f = Rc::clone(&f);
            factories.push(Rc::new(move || {
                flat_mapped(
                    outer.clone(),
                    inner()?,
                    Rc::clone(&f),
                    DERIVED_SIZE,
                    DERIVED_SEED,
                    false,
                )
                .with_distinct_keys()
            }));
        }
    }
    EdgeCases::from_factories(factories)
}

fn flat_mapped_exhaustive<T: 'static, U: 'static>(
    base: &Gen<T>,
    f: Rc<dyn Fn(&T) -> Gen<U>>,
    max: u64,
) -> Option<Exhaustive<U>> {
    let outer = base.exhaustive_limited(max)?;
    let mut total: u64 = 0;
    for candidate in outer.iter() {
        let inner = f(candidate.value()).exhaustive_limited(max)?;
        total = exhaustive::within(total.checked_add(inner.max_count()), max)?;
    }
    Some(Exhaustive::new(total, move || {
        let f = Rc::clone(&f);
        Box::new(outer.iter().flat_map(move |outer_candidate| {
            let inner: Vec<Candidate<U>> = f(outer_candidate.value())
                .exhaustive_limited(max)
                .map(|enumeration| enumeration.iter().collect())
                .unwrap_or_default();
            let f = Rc::clone(&f);
            inner.into_iter().filter_map(move |inner_candidate| {
                flat_mapped(
                    outer_candidate.clone(),
                    inner_candidate,
                    Rc::clone(&f),
                    DERIVED_SIZE,
                    DERIVED_SEED,
                    false,
                )
                .with_distinct_keys()
            })
        }))
    }))
}

fn none_candidate<T: 'static>() -> Candidate<Option<T>> {
    Candidate::new(|| None, ShrinkDistance::zero(), || {
        Box::new(std::iter::empty())
    })
}

fn some_candidate<T: 'static>(candidate: Candidate<T>) -> Candidate<Option<T>> {
    let rebuilt_from = candidate.clone();
    let shrink_from = candidate.clone();
    Candidate::new(
        move || Some(rebuilt_from.recreate()),
        ShrinkDistance::single(1).append(candidate.distance()),
        move || {
            Box::new(
                std::iter::once(none_candidate())
                    .chain(shrink_from.shrinks().map(some_candidate)),
            )
        },
    )
    .with_keys(candidate.unique_keys().to_vec())
}

fn duplicate_candidate<T: 'static>(candidate: Candidate<T>) -> Candidate<T> {
    let rebuilt_from = candidate.clone();
    let shrink_from = candidate.clone();
    Candidate::new(
        move || rebuilt_from.recreate(),
        ShrinkDistance::single(0).append(candidate.distance()),
        move || Box::new(shrink_from.shrinks().map(duplicate_candidate)),
    )
    .with_keys(candidate.unique_keys().to_vec())
}

fn fresh_candidate<T: 'static>(
    candidate: Candidate<T>,
    earlier: Rc<Vec<Candidate<T>>>,
) -> Candidate<T> {
    let rebuilt_from = candidate.clone();
    let shrink_from = candidate.clone();
    Candidate::new(
        move || rebuilt_from.recreate(),
        ShrinkDistance::single(1).append(candidate.distance()),
        move || {
            let duplicates: Vec<Candidate<T>> =
                earlier.iter().cloned().map(duplicate_candidate).collect();
            let earlier = Rc::clone(&earlier);
            Box::new(duplicates.into_iter().chain(
                shrink_from
                    .shrinks()
                    .map(move |shrunk| fresh_candidate(shrunk, Rc::clone(&earlier))),
            ))
        },
    )
    .with_keys(candidate.unique_keys().to_vec())
}
