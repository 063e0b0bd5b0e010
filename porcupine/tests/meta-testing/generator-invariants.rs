//! Generator invariants
//!
//! Generation is a pure function of size and seed, and every generator
//! stays within the bounds it was built with.

use crate::{arbitrary_seed, arbitrary_size, assert_holds, fast_config, ints};
use porcupine::*;
use std::collections::BTreeSet;

/// Property: the same size and seed always give the same candidate
pub fn test_same_seed_same_value() {
    let gen = Gen::<Vec<i32>>::list_of(ints(-1000, 1000), 0, 30).expect("valid bounds");
    let prop = for_all(
        (arbitrary_size(), arbitrary_seed()),
        move |(size, seed): (Size, Seed)| {
            let first = gen.generate(size, seed).expect("generates");
            let second = gen.generate(size, seed).expect("generates");
            first.recreate() == second.recreate() && first.distance() == second.distance()
        },
    );
    assert_holds("Same seed same value", prop, &fast_config());
}

/// Property: integers stay within their range
pub fn test_values_stay_in_range() {
    let prop = for_all(
        (ints(-1000, 1000), ints(0, 1000), arbitrary_seed()),
        |(lo, width, seed): (i32, i32, Seed)| {
            let hi = lo + width;
            Gen::<i32>::between(lo, hi)
                .expect("valid range")
                .sample(20, Size::new(10), seed)
                .expect("samples")
                .iter()
                .all(|value| (lo..=hi).contains(value))
        },
    );
    assert_holds("Values stay in range", prop, &fast_config());
}

/// Property: lists and sets respect their size bounds
pub fn test_collection_bounds() {
    let prop = for_all(
        (ints(0, 5), ints(0, 10), arbitrary_size(), arbitrary_seed()),
        |(min, extra, size, seed): (i32, i32, Size, Seed)| {
            let (min, max) = (min as usize, (min + extra) as usize);
            let lists = Gen::<Vec<bool>>::list_of(Gen::bool(), min, max)
                .expect("valid bounds")
                .sample(10, size, seed)
                .expect("samples");
            let sets = Gen::<BTreeSet<i32>>::set_of(ints(0, 20), 0, max)
                .expect("valid bounds")
                .sample(10, size, seed)
                .expect("samples");
            lists.iter().all(|list| (min..=max).contains(&list.len()))
                && sets.iter().all(|set| set.len() <= max)
        },
    );
    assert_holds("Collection bounds", prop, &fast_config());

    assert!(Gen::<Vec<bool>>::list_of(Gen::bool(), 3, 2).is_err());
}

/// Character ranges enumerate every scalar value except surrogates
pub fn test_chars_skip_surrogates() {
    let gen = Gen::char_range('\u{D7F0}', '\u{E010}').expect("valid range");
    let exhaustive = gen.exhaustive().expect("finite");
    assert_eq!(exhaustive.max_count(), 0x10 + 0x11);
    let values = exhaustive.values();
    assert_eq!(values.first(), Some(&'\u{D7F0}'));
    assert_eq!(values.last(), Some(&'\u{E010}'));
    assert_eq!(gen.edge_cases().values(), vec!['\u{D7F0}', '\u{E010}']);

    assert!(Gen::char_range('z', 'a').is_err());
}
