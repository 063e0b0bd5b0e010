//! Choice between generators, laziness and recursion.

use super::{Gen, DERIVED_SEED, DERIVED_SIZE};
use crate::candidate::{flat_mapped, Candidate};
use crate::distance::ShrinkDistance;
use crate::edge_cases::{EdgeCaseFactory, EdgeCases};
use crate::error::{PorcupineError, Result};
use crate::exhaustive::{self, Exhaustive};
use crate::gen::numeric::integral_candidate;
use std::rc::Rc;

/// A deferred generator, built anew on every use.
pub type Supplier<T> = Box<dyn Fn() -> Gen<T>>;

/// A generator with a relative weight, for `Gen::frequency`.
pub struct WeightedChoice<T> {
    pub weight: u64,
    pub gen: Gen<T>,
}

impl<T> WeightedChoice<T> {
    pub fn new(weight: u64, gen: Gen<T>) -> Self {
        WeightedChoice { weight, gen }
    }
}

type Select<T> = Rc<dyn Fn(&usize) -> Gen<T>>;

impl<T: 'static> Gen<T> {
    /// Pick one of `gens` uniformly.
    pub fn one_of(gens: Vec<Gen<T>>) -> Result<Gen<T>> {
        if gens.is_empty() {
            return Err(PorcupineError::invalid_generator("one_of needs at least one generator"));
        }
        Gen::frequency(gens.into_iter().map(|gen| WeightedChoice::new(1, gen)).collect())
    }

    /// Pick a generator with probability proportional to its weight.
    ///
    /// The chosen index leads the distance, so a value from an earlier
    /// choice is always simpler than one from a later choice; shrinking
    /// tries earlier choices before simplifying within the chosen one.
    /// Zero-weight choices are never picked. Edge cases are the union of
    /// the choices' edge cases.
    pub fn frequency(choices: Vec<WeightedChoice<T>>) -> Result<Gen<T>> {
        if choices.is_empty() {
            return Err(PorcupineError::invalid_generator("frequency needs at least one choice"));
        }
        let total = choices
            .iter()
            .try_fold(0u64, |total, choice| total.checked_add(choice.weight))
            .ok_or_else(|| PorcupineError::invalid_generator("frequency weights overflow"))?;
        if total == 0 {
            return Err(PorcupineError::invalid_generator("frequency weights are all zero"));
        }

        let weights: Vec<u64> = choices.iter().map(|choice| choice.weight).collect();
        let allowed: Rc<Vec<usize>> =
            Rc::new((0..weights.len()).filter(|&i| weights[i] > 0).collect());
        let gens: Rc<Vec<Gen<T>>> = Rc::new(choices.into_iter().map(|choice| choice.gen).collect());
        let select: Select<T> = {
            let gens = Rc::clone(&gens);
            Rc::new(move |index: &usize| gens[*index].clone())
        };

        let generate_allowed = Rc::clone(&allowed);
        let generate_select = Rc::clone(&select);
        let edge_allowed = Rc::clone(&allowed);
        let edge_select = Rc::clone(&select);
        let exhaustive_select = Rc::clone(&select);
        Ok(Gen::new(move |size, seed, scope| {
            let (choice_seed, value_seed) = seed.split();
            let (roll, _) = choice_seed.next_bounded(total);
            let index = pick(&weights, roll);
            let inner = generate_select(&index).generate_in(size, value_seed, scope)?;
            Ok(flat_mapped(
                choice_candidate(index, Rc::clone(&generate_allowed)),
                inner,
                Rc::clone(&generate_select),
                size,
                value_seed,
                true,
            ))
        })
        .with_edge_cases(move |max| {
            let mut factories: Vec<EdgeCaseFactory<T>> = Vec::new();
            for &index in edge_allowed.iter() {
                for inner in edge_select(&index).raw_edge_cases(max).into_factories() {
                    let allowed = Rc::clone(&edge_allowed);
                    let select = Rc::clone(&edge_select);
                    factories.push(Rc::new(move || {
                        Some(flat_mapped(
                            choice_candidate(index, Rc::clone(&allowed)),
                            inner()?,
                            Rc::clone(&select),
                            DERIVED_SIZE,
                            DERIVED_SEED,
                            false,
                        ))
                    }));
                }
            }
            EdgeCases::from_factories(factories).limit(max)
        })
        .with_exhaustive(move |max| {
            let mut total: u64 = 0;
            let mut branches = Vec::new();
            for &index in allowed.iter() {
                let branch = exhaustive_select(&index).exhaustive_limited(max)?;
                total = exhaustive::within(total.checked_add(branch.max_count()), max)?;
                branches.push((index, branch));
            }
            let branches = Rc::new(branches);
            let allowed = Rc::clone(&allowed);
            let select = Rc::clone(&exhaustive_select);
            Some(Exhaustive::new(total, move || {
                let branches = Rc::clone(&branches);
                let allowed = Rc::clone(&allowed);
                let select = Rc::clone(&select);
                Box::new((0..branches.len()).flat_map(move |position| {
                    let (index, branch) = &branches[position];
                    let index = *index;
                    let allowed = Rc::clone(&allowed);
                    let select = Rc::clone(&select);
                    branch.iter().map(move |inner| {
                        flat_mapped(
                            choice_candidate(index, Rc::clone(&allowed)),
                            inner,
                            Rc::clone(&select),
                            DERIVED_SIZE,
                            DERIVED_SEED,
                            false,
                        )
                    })
                }))
            }))
        }))
    }

    /// Pick one of `values`, shrinking toward the first. Edge cases are the
    /// first and the last value.
    pub fn elements(values: Vec<T>) -> Result<Gen<T>>
    where
        T: Clone,
    {
        if values.is_empty() {
            return Err(PorcupineError::invalid_generator("elements needs at least one value"));
        }
        let last = values.len() - 1;
        let values = Rc::new(values);
        let edge_values = Rc::clone(&values);
        Ok(Gen::<usize>::integral(0, last as i128, 0, false)
            .map(move |index| values[index].clone())
            .with_edge_cases(move |_| {
                EdgeCases::from_fns(
                    [0, last]
                        .into_iter()
                        .map(|index| {
                            let values = Rc::clone(&edge_values);
                            move || {
                                let values = Rc::clone(&values);
                                integral_candidate::<usize>(index as i128, 0)
                                    .map(move |i| values[i].clone())
                            }
                        })
                        .collect(),
                )
            }))
    }

    /// Defer building the generator until a value is needed.
    ///
    /// The supplier runs on every generation, so a generator may refer to
    /// itself through `lazy`. The nested generation gets a smaller size.
    /// Lazy generators have no edge cases and no exhaustive enumeration.
    pub fn lazy<F>(supplier: F) -> Gen<T>
    where
        F: Fn() -> Gen<T> + 'static,
    {
        Gen::new(move |size, seed, scope| supplier().generate_in(size.golden(), seed, scope))
    }

    /// Pick one of several deferred generators, for recursive structures.
    ///
    /// The nested level is generated with a smaller size, and at size zero
    /// the first alternative is always taken, so it must be the base case.
    /// Shrinking tries earlier alternatives first.
    pub fn lazy_of(alternatives: Vec<Supplier<T>>) -> Result<Gen<T>> {
        if alternatives.is_empty() {
            return Err(PorcupineError::invalid_generator("lazy_of needs at least one alternative"));
        }
        let count = alternatives.len();
        let alternatives = Rc::new(alternatives);
        let allowed: Rc<Vec<usize>> = Rc::new((0..count).collect());
        let select: Select<T> = Rc::new(move |index: &usize| (alternatives[*index])());
        Ok(Gen::new(move |size, seed, scope| {
            let nested = size.golden();
            let (choice_seed, value_seed) = seed.split();
            let index = if size.get() == 0 {
                0
            } else {
                choice_seed.next_bounded(count as u64).0 as usize
            };
            let inner = select(&index).generate_in(nested, value_seed, scope)?;
            Ok(flat_mapped(
                choice_candidate(index, Rc::clone(&allowed)),
                inner,
                Rc::clone(&select),
                nested,
                value_seed,
                true,
            ))
        }))
    }

    /// Apply `step` to a fresh `base()` between zero and `max_depth` times.
    ///
    /// The depth is chosen first and shrinks toward zero, so shrinking
    /// removes layers before it simplifies the base.
    pub fn recursive<B, S>(base: B, step: S, max_depth: usize) -> Gen<T>
    where
        B: Fn() -> Gen<T> + 'static,
        S: Fn(Gen<T>) -> Gen<T> + 'static,
    {
        Gen::<usize>::integral(0, max_depth as i128, 0, false).flat_map(move |&depth| {
            (0..depth).fold(base(), |gen, _| step(gen))
        })
    }
}

/// Index of the weighted choice that `roll` lands in.
fn pick(weights: &[u64], mut roll: u64) -> usize {
    for (index, &weight) in weights.iter().enumerate() {
        if roll < weight {
            return index;
        }
        roll -= weight;
    }
    weights.iter().rposition(|&weight| weight > 0).unwrap_or(0)
}

/// A choice index that shrinks to each earlier allowed index.
fn choice_candidate(index: usize, allowed: Rc<Vec<usize>>) -> Candidate<usize> {
    let shrink_to = Rc::clone(&allowed);
    Candidate::new(move || index, ShrinkDistance::single(index as u64), move || {
        let allowed = Rc::clone(&shrink_to);
        let earlier: Vec<usize> = shrink_to.iter().copied().filter(|&i| i < index).collect();
        Box::new(
            earlier
                .into_iter()
                .map(move |i| choice_candidate(i, Rc::clone(&allowed))),
        )
    })
}
