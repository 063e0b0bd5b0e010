//! Candidates: generated values paired with a shrink distance and a lazy
//! source of simpler candidates.

use crate::data::{Seed, Size};
use crate::distance::ShrinkDistance;
use crate::error::Result;
use crate::gen::Gen;
use crate::scope::{keys_distinct, GenId, UniqueKey};
use std::fmt;
use std::rc::Rc;

pub mod render;

/// A lazy, possibly infinite sequence of simpler candidates.
pub type Shrinks<T> = Box<dyn Iterator<Item = Candidate<T>>>;

type Recipe<T> = Rc<dyn Fn() -> T>;
type Shrinker<T> = Rc<dyn Fn() -> Shrinks<T>>;
type Grower<T> = Rc<dyn Fn(&ShrinkDistance) -> Option<Candidate<T>>>;

/// Nodes visited below rejected candidates in one filtered shrink sequence.
const FILTER_DESCENT_BUDGET: usize = 10_000;

/// A generated value, its distance, and the means to produce smaller candidates.
///
/// The cached value is built once at construction. `recreate` runs the
/// value's recipe again and hands out a fresh, never-shared instance; the
/// shrinking search only ever passes recreated values to properties.
pub struct Candidate<T> {
    value: Rc<T>,
    recipe: Recipe<T>,
    distance: ShrinkDistance,
    shrinker: Shrinker<T>,
    grower: Option<Grower<T>>,
    keys: Rc<Vec<UniqueKey>>,
}

impl<T> Clone for Candidate<T> {
    fn clone(&self) -> Self {
        Candidate {
            value: Rc::clone(&self.value),
            recipe: Rc::clone(&self.recipe),
            distance: self.distance.clone(),
            shrinker: Rc::clone(&self.shrinker),
            grower: self.grower.clone(),
            keys: Rc::clone(&self.keys),
        }
    }
}

impl<T: 'static> Candidate<T> {
    /// Create a candidate from a recipe; the cached value is the recipe's first result.
    pub fn new<R, S>(recipe: R, distance: ShrinkDistance, shrinker: S) -> Self
    where
        R: Fn() -> T + 'static,
        S: Fn() -> Shrinks<T> + 'static,
    {
        let value = recipe();
        Candidate {
            value: Rc::new(value),
            recipe: Rc::new(recipe),
            distance,
            shrinker: Rc::new(shrinker),
            grower: None,
            keys: Rc::new(Vec::new()),
        }
    }

    /// A candidate that cannot be shrunk any further.
    pub fn unshrinkable<R>(recipe: R) -> Self
    where
        R: Fn() -> T + 'static,
    {
        Candidate::new(recipe, ShrinkDistance::MIN, || Box::new(std::iter::empty()))
    }

    /// An unshrinkable candidate recreated by cloning `value`.
    pub fn just(value: T) -> Self
    where
        T: Clone,
    {
        Candidate::unshrinkable(move || value.clone())
    }

    /// Attach a way to continue a shrink step in the same direction.
    pub fn with_grower<G>(mut self, grower: G) -> Self
    where
        G: Fn(&ShrinkDistance) -> Option<Candidate<T>> + 'static,
    {
        self.grower = Some(Rc::new(grower));
        self
    }

    /// Replace the uniqueness keys this candidate holds.
    pub(crate) fn with_keys(mut self, keys: Vec<UniqueKey>) -> Self {
        self.keys = Rc::new(keys);
        self
    }

    /// Uniqueness keys held by this candidate and everything it was built from.
    pub fn unique_keys(&self) -> &[UniqueKey] {
        &self.keys
    }

    /// `None` when two of the held keys collide.
    pub(crate) fn with_distinct_keys(self) -> Option<Self> {
        keys_distinct(self.unique_keys()).then_some(self)
    }

    /// Hold the key `key` computes for `owner`, here and in every shrink and growth.
    pub(crate) fn claim_key<K>(&self, owner: GenId, key: Rc<dyn Fn(&T) -> K>) -> Candidate<T>
    where
        K: Eq + 'static,
    {
        let mut keys = self.keys.to_vec();
        keys.push(UniqueKey::new(owner, key(self.value())));
        let base = self.clone();
        let shrink_key = Rc::clone(&key);
        Candidate {
            value: Rc::clone(&self.value),
            recipe: Rc::clone(&self.recipe),
            distance: self.distance.clone(),
            shrinker: Rc::new(move || {
                let key = Rc::clone(&shrink_key);
                Box::new(base.shrinks().map(move |c| c.claim_key(owner, Rc::clone(&key))))
                    as Shrinks<T>
            }),
            grower: self.grower.clone().map(|grower| {
                Rc::new(move |before: &ShrinkDistance| {
                    grower(before).map(|grown| grown.claim_key(owner, Rc::clone(&key)))
                }) as Grower<T>
            }),
            keys: Rc::new(keys),
        }
    }

    /// The cached value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// A freshly rebuilt value, independent of any previously handed out.
    pub fn recreate(&self) -> T {
        (self.recipe)()
    }

    pub fn distance(&self) -> &ShrinkDistance {
        &self.distance
    }

    /// The lazy sequence of simpler candidates.
    pub fn shrinks(&self) -> Shrinks<T> {
        if self.distance.is_min() {
            return Box::new(std::iter::empty());
        }
        (self.shrinker)()
    }

    /// Whether any simpler candidate is offered.
    pub fn can_shrink(&self) -> bool {
        self.shrinks().next().is_some()
    }

    /// Continue the shrink step `before -> self` one more step.
    ///
    /// Returns `None` when the candidate has no notion of direction or the
    /// step cannot be repeated.
    pub fn grow(&self, before: &Candidate<T>) -> Option<Candidate<T>> {
        let grower = self.grower.as_ref()?;
        grower(&before.distance)
    }

    /// Map a function over the candidate; the distance is unchanged.
    pub fn map<U, F>(&self, f: F) -> Candidate<U>
    where
        F: Fn(T) -> U + 'static,
        U: 'static,
    {
        self.map_rc(Rc::new(f))
    }

    pub(crate) fn map_rc<U: 'static>(&self, f: Rc<dyn Fn(T) -> U>) -> Candidate<U> {
        let base = self.clone();
        let recipe_base = self.clone();
        let recipe_f = Rc::clone(&f);
        let mut mapped = Candidate::new(
            move || recipe_f(recipe_base.recreate()),
            self.distance.clone(),
            {
                let f = Rc::clone(&f);
                move || {
                    let f = Rc::clone(&f);
                    Box::new(base.shrinks().map(move |c| c.map_rc(Rc::clone(&f)))) as Shrinks<U>
                }
            },
        );
        mapped.keys = Rc::clone(&self.keys);
        if let Some(grower) = self.grower.clone() {
            mapped.grower = Some(Rc::new(move |before: &ShrinkDistance| {
                grower(before).map(|grown| grown.map_rc(Rc::clone(&f)))
            }));
        }
        mapped
    }

    /// Restrict the candidate and all of its shrinks to values satisfying `predicate`.
    ///
    /// Returns `None` when the candidate's own value is rejected. Shrinks
    /// that are rejected are not dropped outright: their own shrinks are
    /// searched for accepted values, so a filter never cuts off a path to a
    /// simpler valid value.
    pub fn filter<P>(&self, predicate: P) -> Option<Candidate<T>>
    where
        P: Fn(&T) -> bool + 'static,
    {
        self.filter_rc(Rc::new(predicate))
    }

    pub(crate) fn filter_rc(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Option<Candidate<T>> {
        if predicate(self.value()) {
            Some(self.filtered_unchecked(predicate))
        } else {
            None
        }
    }

    fn filtered_unchecked(&self, predicate: Rc<dyn Fn(&T) -> bool>) -> Candidate<T> {
        let base = self.clone();
        Candidate {
            value: Rc::clone(&self.value),
            recipe: Rc::clone(&self.recipe),
            distance: self.distance.clone(),
            shrinker: Rc::new(move || {
                Box::new(FilteredShrinks {
                    stack: vec![base.shrinks()],
                    predicate: Rc::clone(&predicate),
                    budget: FILTER_DESCENT_BUDGET,
                })
            }),
            grower: None,
            keys: Rc::clone(&self.keys),
        }
    }

    /// Select a generator from this candidate's value and generate from it.
    ///
    /// The distance is this candidate's distance followed by the inner
    /// candidate's. Shrinking first simplifies this candidate, drawing a
    /// fresh inner candidate from a fresh generator for every new value, and
    /// then simplifies the inner candidate.
    pub fn flat_map<U, F>(&self, f: F, size: Size, seed: Seed) -> Result<Candidate<U>>
    where
        F: Fn(&T) -> Gen<U> + 'static,
        U: 'static,
    {
        let f: Rc<dyn Fn(&T) -> Gen<U>> = Rc::new(f);
        let inner = f(self.value()).generate(size, seed)?;
        Ok(flat_mapped(self.clone(), inner, f, size, seed, true))
    }
}

/// Combine an outer candidate with the inner candidate its value selected.
///
/// With `regenerate` the inner candidate is the one `f`'s generator yields
/// for `size` and `seed`, and recreating runs `f` on a recreated outer
/// value and generates again. The inner candidate's own recipe is used
/// when it came from edge cases or an enumeration, when it is a shrink, or
/// when regeneration yields a different distance.
pub(crate) fn flat_mapped<T: 'static, U: 'static>(
    outer: Candidate<T>,
    inner: Candidate<U>,
    f: Rc<dyn Fn(&T) -> Gen<U>>,
    size: Size,
    seed: Seed,
    regenerate: bool,
) -> Candidate<U> {
    let distance = outer.distance().append(inner.distance());
    let keys: Vec<UniqueKey> = outer
        .unique_keys()
        .iter()
        .chain(inner.unique_keys())
        .cloned()
        .collect();

    let recipe: Recipe<U> = {
        let outer = outer.clone();
        let inner = inner.clone();
        let f = Rc::clone(&f);
        Rc::new(move || {
            if regenerate {
                let rebuilt = f(&outer.recreate()).generate(size, seed);
                if let Ok(rebuilt) = rebuilt {
                    if rebuilt.distance() == inner.distance() {
                        return rebuilt.recreate();
                    }
                }
            }
            inner.recreate()
        })
    };

    let shrinker = {
        let outer = outer.clone();
        let inner = inner.clone();
        let f = Rc::clone(&f);
        let limit = distance.clone();
        move || {
            let outer_side = {
                let f = Rc::clone(&f);
                outer.shrinks().filter_map(move |shrunk_outer| {
                    let regenerated = f(shrunk_outer.value()).generate(size, seed).ok()?;
                    Some(flat_mapped(
                        shrunk_outer,
                        regenerated,
                        Rc::clone(&f),
                        size,
                        seed,
                        true,
                    ))
                })
            };
            let inner_side = {
                let outer = outer.clone();
                let f = Rc::clone(&f);
                inner.shrinks().map(move |shrunk_inner| {
                    flat_mapped(outer.clone(), shrunk_inner, Rc::clone(&f), size, seed, false)
                })
            };
            let limit = limit.clone();
            Box::new(outer_side.chain(inner_side).filter(move |candidate| {
                candidate.distance() <= &limit && keys_distinct(candidate.unique_keys())
            })) as Shrinks<U>
        }
    };

    Candidate {
        value: Rc::clone(&inner.value),
        recipe,
        distance,
        shrinker: Rc::new(shrinker),
        grower: None,
        keys: Rc::new(keys),
    }
}

/// Depth-first search below rejected shrinks for accepted ones.
struct FilteredShrinks<T> {
    stack: Vec<Shrinks<T>>,
    predicate: Rc<dyn Fn(&T) -> bool>,
    budget: usize,
}

impl<T: 'static> Iterator for FilteredShrinks<T> {
    type Item = Candidate<T>;

    fn next(&mut self) -> Option<Candidate<T>> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(candidate) => {
                    if (self.predicate)(candidate.value()) {
                        return Some(candidate.filtered_unchecked(Rc::clone(&self.predicate)));
                    }
                    if self.budget == 0 {
                        return None;
                    }
                    self.budget -= 1;
                    self.stack.push(candidate.shrinks());
                }
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("value", &self.value)
            .field("distance", &self.distance)
            .finish()
    }
}
