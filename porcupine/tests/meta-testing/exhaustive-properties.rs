//! Exhaustive enumeration properties
//!
//! Declared counts follow the combinatorial formulas and small parameter
//! spaces are checked value by value.

use crate::ints;
use porcupine::*;
use std::collections::{BTreeSet, HashSet};

/// One list of each length 1 to 3 over two values: 2 + 4 + 8
pub fn test_flat_map_count() {
    let gen = ints(1, 3).flat_map(|&length| {
        let length = length as usize;
        Gen::<Vec<i32>>::list_of(ints(1, 2), length, length).expect("valid bounds")
    });
    let exhaustive = gen.exhaustive().expect("finite");
    assert_eq!(exhaustive.max_count(), 14);

    let values = exhaustive.values();
    assert_eq!(values.len(), 14);
    assert_eq!(values.iter().collect::<HashSet<_>>().len(), 14);
    assert_eq!(values.first(), Some(&vec![1]));
}

pub fn test_counts_match_enumeration() {
    let lists = Gen::<Vec<bool>>::list_of(Gen::bool(), 0, 3).expect("valid bounds");
    assert_eq!(lists.exhaustive().map(|e| e.max_count()), Some(1 + 2 + 4 + 8));

    let sets = Gen::<BTreeSet<i32>>::set_of(ints(0, 4), 0, 2).expect("valid bounds");
    let sets = sets.exhaustive().expect("finite");
    assert_eq!(sets.max_count(), 1 + 5 + 10);
    assert_eq!(sets.values().len(), 16);

    let nullable = ints(0, 9).inject_null(0.1).expect("valid probability");
    assert_eq!(nullable.exhaustive().map(|e| e.max_count()), Some(11));

    let choice = Gen::one_of(vec![ints(0, 2), ints(10, 11)]).expect("non-empty");
    assert_eq!(choice.exhaustive().map(|e| e.values()), Some(vec![0, 1, 2, 10, 11]));

    let evens = ints(0, 9).filter(|x| x % 2 == 0).exhaustive().expect("finite");
    assert_eq!(evens.max_count(), 10);
    assert_eq!(evens.values(), vec![0, 2, 4, 6, 8]);

    assert!(ints(0, 1000).exhaustive().is_some());
    assert!(Gen::<i64>::any_integral().exhaustive().is_none());
    let long_lists = Gen::<Vec<i32>>::list_of(ints(0, 100), 0, 5).expect("valid bounds");
    assert!(long_lists.exhaustive().is_none());
}

/// Small spaces are enumerated instead of sampled
pub fn test_auto_mode_exhausts_small_spaces() {
    let prop = for_all((Gen::bool(), ints(0, 4)), |(flag, n): (bool, i32)| flag || n < 10);
    match prop.run(&Config::default()).expect("runs") {
        TestResult::Exhausted { tests_run } => assert_eq!(tests_run, 10),
        other => panic!("Expected exhaustion, got: {other:?}"),
    }

    let config = Config::default().with_tests(5);
    match prop.run(&config).expect("runs") {
        TestResult::Pass { tests_run, .. } => assert_eq!(tests_run, 5),
        other => panic!("Expected randomized pass, got: {other:?}"),
    }
}

/// Enumerations skip every combination that repeats a unique value
pub fn test_unique_enumerations_skip_collisions() {
    let flags = Gen::<Vec<bool>>::list_of(Gen::bool().unique(), 2, 2).expect("valid bounds");
    let flags = flags.exhaustive().expect("finite");
    assert_eq!(flags.max_count(), 4);
    assert_eq!(flags.values(), vec![vec![false, true], vec![true, false]]);

    let unique = ints(0, 2).unique();
    let pairs = Gen::combine((unique.clone(), unique.clone())).exhaustive().expect("finite");
    assert_eq!(pairs.values().len(), 6);
    assert!(pairs.values().iter().all(|(a, b)| a != b));

    let prop = for_all((unique.clone(), unique), |(a, b): (i32, i32)| a != b);
    match prop.run(&Config::default()).expect("runs") {
        TestResult::Exhausted { tests_run } => assert_eq!(tests_run, 6),
        other => panic!("Expected exhaustion, got: {other:?}"),
    }
}
