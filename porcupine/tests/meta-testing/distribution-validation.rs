//! Distribution validation
//!
//! Weighted choices and injected nulls should show up about as often as
//! their weights and probabilities say.

use porcupine::*;

fn share<T>(values: &[T], predicate: impl Fn(&T) -> bool) -> f64 {
    values.iter().filter(|value| predicate(value)).count() as f64 / values.len() as f64
}

/// Frequency picks alternatives in proportion to their weights
pub fn test_frequency_weights() {
    let gen = Gen::frequency(vec![
        WeightedChoice::new(1, Gen::constant('a')),
        WeightedChoice::new(3, Gen::constant('b')),
        WeightedChoice::new(0, Gen::constant('z')),
    ])
    .expect("valid weights");
    let values = gen
        .sample(4000, Size::new(10), Seed::from_u64(17))
        .expect("samples");

    let b_share = share(&values, |&c| c == 'b');
    assert!((0.7..0.8).contains(&b_share), "share of 'b' was {b_share}");
    assert!(values.iter().all(|&c| c != 'z'));
}

/// Injected nulls appear with about the requested probability
pub fn test_inject_null_probability() {
    let gen = Gen::<i32>::between(0, 100)
        .expect("valid range")
        .inject_null(0.25)
        .expect("valid probability");
    let values = gen
        .sample(4000, Size::new(10), Seed::from_u64(23))
        .expect("samples");

    let none_share = share(&values, Option::is_none);
    assert!((0.2..0.3).contains(&none_share), "share of None was {none_share}");
    assert!(gen.edge_cases().values().first() == Some(&None));

    assert!(Gen::constant(1).inject_null(1.5).is_err());
}
