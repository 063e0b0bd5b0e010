//! Combinator laws
//!
//! Mapping, dependent generation, uniqueness, failure handling and
//! duplicate injection behave the same whatever size and seed they are run
//! with.

use crate::{arbitrary_seed, arbitrary_size, assert_holds, fast_config, ints};
use porcupine::*;
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

/// Property: mapping twice is mapping once with the composition
pub fn test_map_composition() {
    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        |(size, seed): (Size, Seed)| {
            let f = |x: i32| x.wrapping_mul(3);
            let g = |x: i32| x - 7;
            let twice = ints(-1000, 1000).map(f).map(g).generate(size, seed).expect("generates");
            let once = ints(-1000, 1000)
                .map(move |x| g(f(x)))
                .generate(size, seed)
                .expect("generates");
            twice.recreate() == once.recreate() && twice.distance() == once.distance()
        },
    );
    assert_holds("Map composition", prop, &fast_config());
}

/// Property: a unique generator never repeats itself within one scope
pub fn test_unique_within_scope() {
    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        |(size, seed): (Size, Seed)| {
            let unique = ints(0, 30).unique();
            let scope = Scope::new();
            let values: Vec<i32> = vec![unique; 20]
                .generate_all(size, seed, &scope)
                .expect("generates")
                .recreate();
            values.iter().collect::<HashSet<_>>().len() == values.len()
        },
    );
    assert_holds("Unique within scope", prop, &fast_config());

    let exhausted =
        vec![ints(0, 2).unique(); 4].generate_all(Size::new(10), Seed::from_u64(1), &Scope::new());
    assert!(matches!(exhausted, Err(PorcupineError::TooManyUniqueMisses { .. })));
}

/// Ignored failures turn into retries, other failures surface
pub fn test_ignored_failures_are_retried() {
    let halves = ints(0, 100).try_map(|x| {
        if x % 2 == 1 {
            Err(Failure::new("odd", format!("{x} is odd")))
        } else {
            Ok(x / 2)
        }
    });
    let values = halves
        .clone()
        .ignore_failures(&["odd"])
        .sample(200, Size::new(10), Seed::from_u64(5))
        .expect("odd values are retried");
    assert!(values.iter().all(|x| (0..=50).contains(x)));

    let surfaced = halves
        .ignore_failures(&["even"])
        .sample(200, Size::new(10), Seed::from_u64(5));
    assert!(matches!(
        surfaced,
        Err(PorcupineError::Generation(failure)) if failure.name() == "odd"
    ));
}

/// A filter that rejects everything fails after exactly `MAX_MISSES` tries
pub fn test_filter_gives_up_after_max_misses() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let nothing = ints(0, 10).filter(move |_| {
        counter.set(counter.get() + 1);
        false
    });
    let result = nothing.generate(Size::new(10), Seed::from_u64(3));
    assert!(matches!(
        result,
        Err(PorcupineError::TooManyFilterMisses { misses }) if misses == MAX_MISSES
    ));
    assert_eq!(calls.get(), MAX_MISSES);
}

/// Property: injected duplicates always repeat a value drawn earlier in the scope
pub fn test_duplicates_repeat_earlier_values() {
    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        |(size, seed): (Size, Seed)| {
            let gen = ints(0, 1_000_000).inject_duplicates(0.5).expect("valid probability");
            let values = vec![gen; 30]
                .generate_all(size, seed, &Scope::new())
                .expect("generates")
                .recreate();
            let distinct = values.iter().collect::<HashSet<_>>().len();
            distinct < values.len()
        },
    );
    assert_holds("Duplicates repeat earlier values", prop, &fast_config());
}

/// Recreating a dependent value selects its generator again
pub fn test_flat_map_recreate_selects_again() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&calls);
    let gen = ints(0, 5).flat_map(move |&n| {
        counter.set(counter.get() + 1);
        Gen::<Vec<i32>>::list_of(ints(0, 50), n as usize, 5).expect("valid bounds")
    });
    let candidate = gen.generate(Size::new(10), Seed::from_u64(7)).expect("generates");
    assert_eq!(calls.get(), 1);
    let first = candidate.recreate();
    let second = candidate.recreate();
    assert_eq!(calls.get(), 3);
    assert_eq!(&first, candidate.value());
    assert_eq!(first, second);

    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        |(size, seed): (Size, Seed)| {
            let gen = ints(0, 5).flat_map(|&n| {
                Gen::<Vec<i32>>::list_of(ints(0, 50), n as usize, 5).expect("valid bounds")
            });
            let candidate = gen.generate(size, seed).expect("generates");
            candidate.recreate() == *candidate.value()
                && candidate.shrinks().take(20).all(|shrunk| shrunk.recreate() == *shrunk.value())
        },
    );
    assert_holds("Dependent values recreate what was cached", prop, &fast_config());
}
