//! Collection generators: lists, unique lists, sets and strings.

use super::Gen;
use crate::candidate::{Candidate, Shrinks};
use crate::data::{Seed, Size, MAX_MISSES};
use crate::distance::ShrinkDistance;
use crate::edge_cases::{EdgeCaseFactory, EdgeCases};
use crate::error::{PorcupineError, Result};
use crate::exhaustive::{self, Combinations, Exhaustive, Odometer};
use crate::scope::{keys_distinct, Scope};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Whether two elements collide under a uniqueness key.
type SameKey<T> = Rc<dyn Fn(&T, &T) -> bool>;

impl<T: 'static> Gen<Vec<T>> {
    /// Lists of `min..=max` elements; the length is further bounded by the
    /// generation size (never below `min`).
    pub fn list_of(element: Gen<T>, min: usize, max: usize) -> Result<Gen<Vec<T>>> {
        check_sizes(min, max)?;
        Ok(list(element, min, max, None))
    }

    /// Lists whose length is bounded only by the generation size.
    pub fn vec_of(element: Gen<T>) -> Gen<Vec<T>> {
        list(element, 0, usize::MAX, None)
    }

    /// Lists whose elements have pairwise distinct keys.
    ///
    /// Shrinking keeps the keys distinct. If distinct elements run out
    /// before the drawn length is reached the list is cut short, as long as
    /// it still has `min` elements.
    pub fn list_unique_by<K, F>(
        element: Gen<T>,
        min: usize,
        max: usize,
        key: F,
    ) -> Result<Gen<Vec<T>>>
    where
        K: PartialEq + 'static,
        F: Fn(&T) -> K + 'static,
    {
        check_sizes(min, max)?;
        let same: SameKey<T> = Rc::new(move |a: &T, b: &T| key(a) == key(b));
        Ok(list(element, min, max, Some(same)))
    }
}

impl<T> Gen<BTreeSet<T>>
where
    T: Ord + 'static,
{
    /// Sets of `min..=max` elements.
    pub fn set_of(element: Gen<T>, min: usize, max: usize) -> Result<Gen<BTreeSet<T>>> {
        check_sizes(min, max)?;
        let same: SameKey<T> = Rc::new(|a: &T, b: &T| a == b);
        let enumerated = element.clone();
        let subsets_same = Rc::clone(&same);
        Ok(list(element, min, max, Some(same))
            .map(into_set)
            .with_exhaustive(move |limit| {
                subsets_exhaustive(&enumerated, min, max, Rc::clone(&subsets_same), limit)
            }))
    }
}

impl Gen<String> {
    /// Strings of `min..=max` characters drawn from `chars`.
    pub fn string_of(chars: Gen<char>, min: usize, max: usize) -> Result<Gen<String>> {
        Ok(Gen::list_of(chars, min, max)?.map(|chars| chars.into_iter().collect()))
    }
}

fn into_set<T: Ord>(values: Vec<T>) -> BTreeSet<T> {
    values.into_iter().collect()
}

fn check_sizes(min: usize, max: usize) -> Result<()> {
    if min > max {
        return Err(PorcupineError::invalid_range(format!(
            "minimum size {} is greater than maximum size {}",
            min, max
        )));
    }
    Ok(())
}

fn list<T: 'static>(
    element: Gen<T>,
    min: usize,
    max: usize,
    same: Option<SameKey<T>>,
) -> Gen<Vec<T>> {
    let edge_element = element.clone();
    let edge_same = same.clone();
    let exhaustive_element = element.clone();
    let exhaustive_same = same.clone();
    Gen::new(move |size, seed, _scope| {
        generate_list(&element, min, max, same.as_ref(), size, seed)
    })
    .with_edge_cases(move |limit| {
        list_edge_cases(&edge_element, min, max, edge_same.clone(), limit)
    })
    .with_exhaustive(move |limit| {
        lists_exhaustive(&exhaustive_element, min, max, exhaustive_same.clone(), limit)
    })
}

fn generate_list<T: 'static>(
    element: &Gen<T>,
    min: usize,
    max: usize,
    same: Option<&SameKey<T>>,
    size: Size,
    seed: Seed,
) -> Result<Candidate<Vec<T>>> {
    let upper = max.min(min.max(size.get()));
    let (length_seed, mut seeds) = seed.split();
    let (extra, _) = length_seed.next_bounded((upper - min) as u64 + 1);
    let length = min + extra as usize;

    // Element uniqueness and duplicate history are local to this list.
    let element_scope = Scope::new();
    let mut elements: Vec<Candidate<T>> = Vec::with_capacity(length);
    'elements: while elements.len() < length {
        let mut misses = 0;
        loop {
            let (element_seed, rest) = seeds.split();
            seeds = rest;
            let candidate = element.generate_in(size, element_seed, &element_scope)?;
            let collides = same.map_or(false, |same| {
                elements.iter().any(|e| same(e.value(), candidate.value()))
            });
            if !collides {
                elements.push(candidate);
                break;
            }
            misses += 1;
            if misses >= MAX_MISSES {
                if elements.len() >= min {
                    break 'elements;
                }
                return Err(PorcupineError::TooManyUniqueMisses { misses });
            }
        }
    }
    Ok(list_candidate(Rc::new(elements), min, same.cloned()))
}

/// A list candidate whose distance is its length followed by the sum of its
/// element distances.
///
/// Shrinks, simplest first: the `min`-element prefix, then removal of
/// ever smaller chunks, then one element at a time through its own shrinks.
fn list_candidate<T: 'static>(
    elements: Rc<Vec<Candidate<T>>>,
    min: usize,
    same: Option<SameKey<T>>,
) -> Candidate<Vec<T>> {
    let distance = ShrinkDistance::single(elements.len() as u64)
        .append(&ShrinkDistance::combine(elements.iter().map(|e| e.distance())));
    let rebuilt_from = Rc::clone(&elements);
    Candidate::new(
        move || rebuilt_from.iter().map(|e| e.recreate()).collect(),
        distance,
        move || list_shrinks(Rc::clone(&elements), min, same.clone()),
    )
}

fn list_shrinks<T: 'static>(
    elements: Rc<Vec<Candidate<T>>>,
    min: usize,
    same: Option<SameKey<T>>,
) -> Shrinks<Vec<T>> {
    let len = elements.len();
    let to_min = (len > min).then(|| elements[..min].to_vec());

    let mut removals: Vec<(usize, usize)> = Vec::new();
    let mut chunk = (len / 2).max(1);
    loop {
        if len >= chunk + min {
            removals.extend((0..=len - chunk).step_by(chunk).map(|start| (start, chunk)));
        }
        if chunk == 1 {
            break;
        }
        chunk /= 2;
    }
    let removed = {
        let elements = Rc::clone(&elements);
        removals.into_iter().map(move |(start, chunk)| {
            let mut kept = elements.to_vec();
            kept.drain(start..start + chunk);
            kept
        })
    };

    let element_wise = {
        let elements = Rc::clone(&elements);
        let same = same.clone();
        (0..len)
            .flat_map(move |index| {
                let shrinks = elements[index].shrinks();
                let elements = Rc::clone(&elements);
                shrinks.map(move |shrunk| {
                    let mut next = elements.to_vec();
                    next[index] = shrunk;
                    next
                })
            })
            .filter(move |next| all_distinct(next, same.as_ref()))
    };

    Box::new(
        to_min
            .into_iter()
            .chain(removed)
            .chain(element_wise)
            .map(move |next| list_candidate(Rc::new(next), min, same.clone())),
    )
}

/// Whether no two elements share a uniqueness key, nor collide under `same`.
fn all_distinct<T: 'static>(elements: &[Candidate<T>], same: Option<&SameKey<T>>) -> bool {
    if !keys_distinct(elements.iter().flat_map(|e| e.unique_keys())) {
        return false;
    }
    let Some(same) = same else {
        return true;
    };
    elements.iter().enumerate().all(|(i, a)| {
        elements[i + 1..]
            .iter()
            .all(|b| !same(a.value(), b.value()))
    })
}

fn list_edge_cases<T: 'static>(
    element: &Gen<T>,
    min: usize,
    max: usize,
    same: Option<SameKey<T>>,
    limit: usize,
) -> EdgeCases<Vec<T>> {
    let mut factories: Vec<EdgeCaseFactory<Vec<T>>> = Vec::new();
    if min == 0 {
        let same = same.clone();
        factories.push(Rc::new(move || Some(list_candidate(Rc::new(Vec::new()), 0, same.clone()))));
    }
    if max >= 1 {
        // Singletons, or `min` copies when the list cannot be shorter. Copies
        // of a unique element collide, leaving no edge case.
        let copies = min.max(1);
        for factory in element.raw_edge_cases(limit).into_factories() {
            let same = same.clone();
            factories.push(Rc::new(move || {
                let elements = (0..copies)
                    .map(|_| factory())
                    .collect::<Option<Vec<Candidate<T>>>>()?;
                if !all_distinct(&elements, same.as_ref()) {
                    return None;
                }
                Some(list_candidate(Rc::new(elements), min, same.clone()))
            }));
        }
    }
    EdgeCases::from_factories(factories).limit(limit)
}

fn lists_exhaustive<T: 'static>(
    element: &Gen<T>,
    min: usize,
    max: usize,
    same: Option<SameKey<T>>,
    limit: u64,
) -> Option<Exhaustive<Vec<T>>> {
    let elements = element.exhaustive_limited(limit)?;
    let count = exhaustive::sequence_count(elements.max_count(), min, max, limit)?;
    Some(Exhaustive::new(count, move || {
        let pool: Rc<Vec<Candidate<T>>> = Rc::new(elements.iter().collect());
        let top = if pool.is_empty() { 0 } else { max };
        let same = same.clone();
        Box::new((min..=top).flat_map(move |length| {
            let pool = Rc::clone(&pool);
            let same = same.clone();
            Odometer::new(&vec![pool.len(); length]).filter_map(move |indices| {
                let chosen: Vec<Candidate<T>> = indices.iter().map(|&i| pool[i].clone()).collect();
                if !all_distinct(&chosen, same.as_ref()) {
                    return None;
                }
                Some(list_candidate(Rc::new(chosen), min, same.clone()))
            })
        }))
    }))
}

fn subsets_exhaustive<T: Ord + 'static>(
    element: &Gen<T>,
    min: usize,
    max: usize,
    same: SameKey<T>,
    limit: u64,
) -> Option<Exhaustive<BTreeSet<T>>> {
    let elements = element.exhaustive_limited(limit)?;
    let count = exhaustive::subset_count(elements.max_count(), min, max, limit)?;
    Some(Exhaustive::new(count, move || {
        let pool: Rc<Vec<Candidate<T>>> = Rc::new(elements.iter().collect());
        let top = max.min(pool.len());
        let same = Rc::clone(&same);
        Box::new((min..=top).flat_map(move |size| {
            let pool = Rc::clone(&pool);
            let same = Rc::clone(&same);
            Combinations::new(pool.len(), size).filter_map(move |indices| {
                let chosen: Vec<Candidate<T>> = indices.iter().map(|&i| pool[i].clone()).collect();
                if !all_distinct(&chosen, Some(&same)) {
                    return None;
                }
                Some(list_candidate(Rc::new(chosen), min, Some(Rc::clone(&same))).map(into_set))
            })
        }))
    }))
}
