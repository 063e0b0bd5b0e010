//! Edge case properties
//!
//! Integer edge cases are the bounds, the small values around zero that
//! fall in range and an explicit target, and every pass over an edge-case
//! set starts from fresh values. Edge cases built from a unique generator
//! never repeat one of its values.

use crate::{assert_holds, fast_config, ints};
use porcupine::*;
use std::cell::RefCell;
use std::rc::Rc;

pub fn test_documented_integer_edge_cases() {
    assert_eq!(ints(-10, 10).edge_cases().values(), vec![-10, -2, -1, 0, 1, 2, 10]);
    assert_eq!(ints(5, 100).edge_cases().values(), vec![5, 100]);
    assert_eq!(
        Gen::<i64>::between_towards(20, 80, 50)
            .expect("valid range")
            .edge_cases()
            .values(),
        vec![20, 50, 80]
    );
    assert_eq!(Gen::<u8>::any_integral().edge_cases().values(), vec![0, 1, 2, 255]);
}

/// Property: edge cases of any range are its bounds plus the in-range values near zero
pub fn test_integer_edge_cases_for_any_range() {
    let prop = for_all((ints(-50, 50), ints(-50, 50)), |(a, b): (i32, i32)| {
        let (lo, hi) = (a.min(b), a.max(b));
        let mut expected: Vec<i32> = vec![lo, hi];
        expected.extend((-2..=2).filter(|v| (lo..=hi).contains(v)));
        expected.sort_unstable();
        expected.dedup();
        Gen::<i32>::between(lo, hi).expect("valid range").edge_cases().values() == expected
    });
    assert_holds("Integer edge cases", prop, &fast_config());
}

/// Mutating the values of one pass leaves the next pass untouched
pub fn test_edge_case_iteration_is_fresh() {
    let lists = Gen::<Vec<i32>>::list_of(ints(-3, 3), 0, 4)
        .expect("valid bounds")
        .map(|values| Rc::new(RefCell::new(values)));
    let edge_cases = lists.edge_cases();
    let before: Vec<Vec<i32>> = edge_cases
        .iter()
        .map(|candidate| candidate.value().borrow().clone())
        .collect();
    assert!(!before.is_empty());

    for candidate in edge_cases.iter() {
        candidate.value().borrow_mut().push(42);
    }
    let after: Vec<Vec<i32>> = edge_cases
        .iter()
        .map(|candidate| candidate.value().borrow().clone())
        .collect();
    assert_eq!(before, after);
}

/// Combinations that would repeat a unique generator's value are dropped
pub fn test_unique_edge_cases_never_collide() {
    let unique_digits = ints(0, 9).unique();
    let pairs = Gen::<Vec<i32>>::list_of(unique_digits.clone(), 2, 2).expect("valid bounds");
    assert!(pairs.edge_cases().values().is_empty());

    let short = Gen::<Vec<i32>>::list_of(unique_digits, 0, 2).expect("valid bounds");
    assert_eq!(
        short.edge_cases().values(),
        vec![vec![], vec![0], vec![1], vec![2], vec![9]]
    );

    let unique = ints(0, 2).unique();
    let combined = Gen::combine((unique.clone(), unique.clone()));
    assert_eq!(
        combined.edge_cases().values(),
        vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
    );

    let prop = for_all(vec![unique; 2], |values: Vec<i32>| values[0] != values[1]);
    let config = Config::default().with_generation(GenerationMode::EdgeCasesOnly);
    assert_holds("Unique edge cases stay distinct", prop, &config);
}
