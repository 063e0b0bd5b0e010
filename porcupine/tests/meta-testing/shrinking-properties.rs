//! Shrinking correctness properties
//!
//! These properties ensure that shrinking behaves correctly - that it
//! never moves away from minimal, that it converges, and that it lands on
//! the simplest counterexample.

use crate::{arbitrary_seed, arbitrary_size, assert_holds, fast_config, ints};
use porcupine::*;
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

fn shrinks_never_grow<T: Debug + 'static>(gen: Gen<T>) -> impl Fn((Size, Seed)) -> bool {
    move |(size, seed)| {
        let candidate = gen.generate(size, seed).expect("generates");
        candidate.shrinks().take(100).all(|shrunk| {
            shrunk.distance() <= candidate.distance()
                && shrunk
                    .shrinks()
                    .take(20)
                    .all(|deeper| deeper.distance() <= shrunk.distance())
        })
    }
}

fn sized_seeds() -> (Gen<Size>, Gen<Seed>) {
    (arbitrary_size(), arbitrary_seed())
}

/// Property: no shrink is farther from minimal than what it shrinks
pub fn test_shrinks_never_grow() {
    let config = fast_config();
    assert_holds(
        "Integer shrinks never grow",
        for_all(sized_seeds(), shrinks_never_grow(ints(-10_000, 10_000))),
        &config,
    );
    assert_holds(
        "List shrinks never grow",
        for_all(
            sized_seeds(),
            shrinks_never_grow(Gen::<Vec<i32>>::vec_of(ints(-100, 100))),
        ),
        &config,
    );
    assert_holds(
        "String shrinks never grow",
        for_all(
            sized_seeds(),
            shrinks_never_grow(
                Gen::string_of(Gen::ascii_alphanumeric(), 0, 12).expect("valid bounds"),
            ),
        ),
        &config,
    );
    assert_holds(
        "Dependent shrinks never grow",
        for_all(
            sized_seeds(),
            shrinks_never_grow(ints(0, 5).flat_map(|&n| {
                Gen::<Vec<i32>>::list_of(ints(0, 50), n as usize, 5).expect("valid bounds")
            })),
        ),
        &config,
    );
    assert_holds(
        "Choice shrinks never grow",
        for_all(
            sized_seeds(),
            shrinks_never_grow(
                Gen::one_of(vec![ints(0, 10), ints(100, 200), ints(-50, -40)]).expect("non-empty"),
            ),
        ),
        &config,
    );
}

/// Property: shrinking an already minimal sample takes no further steps
pub fn test_shrinking_is_idempotent() {
    let gen = Gen::<Vec<i32>>::list_of(ints(0, 1000), 0, 30).expect("valid bounds");
    let prop = for_all(sized_seeds(), move |(size, seed): (Size, Seed)| {
        let property = |values: Vec<i32>| values.iter().sum::<i32>() < 200;
        let candidate = gen.generate(size, seed).expect("generates");
        if property(candidate.recreate()) {
            return TryResult::Invalid;
        }
        let first = shrink(
            FalsifiedSample::new(candidate, None),
            &property,
            ShrinkingMode::Full,
            |_| {},
        );
        let again = shrink(first.sample.clone(), &property, ShrinkingMode::Full, |_| {});
        TryResult::from(
            first.state == ShrinkingState::Converged
                && again.steps == 0
                && again.values() == first.values(),
        )
    });
    assert_holds("Shrinking is idempotent", prop, &fast_config());
}

/// A combination of ranges always falsified shrinks every part to zero
pub fn test_combined_sum_shrinks_to_zero() {
    let sums = Gen::combine((ints(-10, 10), ints(-100, 100))).map(|(a, b)| (a, b, a + b));
    let prop = for_all(sums, |_: (i32, i32, i32)| false);
    for seed in 0..5 {
        match prop.run(&Config::default().with_seed(seed)).expect("runs") {
            TestResult::Fail { minimal, .. } => assert_eq!(minimal, vec!["(0, 0, 0)".to_string()]),
            other => panic!("Expected failure, got: {other:?}"),
        }
    }
}

/// A filtered range always falsified shrinks to its simplest accepted value
pub fn test_filtered_evens_shrink_to_two() {
    let evens = ints(1, 10).filter(|x| x % 2 == 0);
    let prop = for_all(evens, |_: i32| false);
    for generation in [GenerationMode::Auto, GenerationMode::Randomized] {
        for seed in 0..5 {
            let config = Config::default().with_seed(seed).with_generation(generation);
            match prop.run(&config).expect("runs") {
                TestResult::Fail { minimal, shrink_steps, .. } => {
                    assert_eq!(minimal, vec!["2".to_string()]);
                    for step in shrink_steps {
                        let value: i32 = step.sample[0].parse().expect("integer");
                        assert_eq!(value % 2, 0);
                    }
                }
                other => panic!("Expected failure, got: {other:?}"),
            }
        }
    }
}

/// A property mutating its input never sees the mutation again
pub fn test_mutated_values_are_recreated() {
    let lists = Gen::<Vec<i32>>::list_of(ints(0, 100), 0, 10)
        .expect("valid bounds")
        .map(|values| Rc::new(RefCell::new(values)));
    let prop = for_all(lists, |shared: Rc<RefCell<Vec<i32>>>| {
        let long = shared.borrow().len() >= 3;
        shared.borrow_mut().push(-1);
        shared.borrow_mut().push(-1);
        !long
    });
    match prop.run(&Config::default().with_seed(11)).expect("runs") {
        TestResult::Fail { minimal, .. } => {
            assert_eq!(minimal, vec!["RefCell { value: [0, 0, 0] }".to_string()]);
        }
        other => panic!("Expected failure, got: {other:?}"),
    }
}

/// The reported cause belongs to the minimal sample, not the original one
pub fn test_cause_comes_from_minimal_sample() {
    let prop = for_all(ints(0, 1_000_000), |x: i32| -> std::result::Result<(), Failure> {
        if x >= 1000 {
            return Err(Failure::new("huge", format!("{x} is huge")));
        }
        if x >= 10 {
            return Err(Failure::new("large", format!("{x} is large")));
        }
        Ok(())
    });
    match prop.run(&Config::default().with_seed(2)).expect("runs") {
        TestResult::Fail { minimal, cause, .. } => {
            assert_eq!(minimal, vec!["10".to_string()]);
            let cause = cause.expect("a cause");
            assert_eq!(cause.name(), "large");
            assert_eq!(cause.message, "10 is large");
        }
        other => panic!("Expected failure, got: {other:?}"),
    }
}

/// A minimal sample that merely returns false reports no cause, even when
/// the samples shrunk away from panicked
pub fn test_cause_is_dropped_with_the_sample_that_raised_it() {
    let prop = for_all(ints(0, 1_000_000), |x: i32| {
        assert!(x < 1000, "huge {x}");
        x < 10
    });
    match prop.run(&Config::default().with_seed(2)).expect("runs") {
        TestResult::Fail { minimal, cause, .. } => {
            assert_eq!(minimal, vec!["10".to_string()]);
            assert!(cause.is_none(), "unexpected cause: {cause:?}");
        }
        other => panic!("Expected failure, got: {other:?}"),
    }
}

fn parse_list(rendered: &str) -> Vec<i32> {
    rendered
        .trim_matches(|c| c == '[' || c == ']')
        .split(", ")
        .map(|value| value.parse().expect("integer"))
        .collect()
}

/// Property: shrinking never makes two values of a unique generator equal
pub fn test_unique_values_stay_unique_while_shrinking() {
    let unique_lists = for_all(sized_seeds(), |(size, seed): (Size, Seed)| {
        let element = ints(0, 100).unique();
        let gen = Gen::<Vec<i32>>::list_of(element, 3, 3).expect("valid bounds");
        let candidate = gen.generate(size, seed).expect("generates");
        let outcome = shrink(
            FalsifiedSample::new(candidate, None),
            &|_: Vec<i32>| false,
            ShrinkingMode::Full,
            |_| {},
        );
        let mut minimal = outcome.values();
        minimal.sort_unstable();
        minimal == vec![0, 1, 2]
    });
    assert_holds("Unique list elements stay distinct", unique_lists, &fast_config());

    let element = ints(0, 100).unique();
    let prop = for_all(
        Gen::<Vec<i32>>::list_of(element, 3, 3).expect("valid bounds"),
        |_: Vec<i32>| false,
    );
    match prop.run(&Config::default().with_seed(1)).expect("runs") {
        TestResult::Fail { minimal, .. } => {
            let mut values = parse_list(&minimal[0]);
            values.sort_unstable();
            assert_eq!(values, vec![0, 1, 2]);
        }
        other => panic!("Expected failure, got: {other:?}"),
    }

    let unique = ints(0, 100).unique();
    let prop = for_all((unique.clone(), unique), |(a, b): (i32, i32)| a == b);
    for seed in 0..5 {
        match prop.run(&Config::default().with_seed(seed)).expect("runs") {
            TestResult::Fail { minimal, .. } => {
                let mut values: Vec<String> = minimal;
                values.sort();
                assert_eq!(values, vec!["0".to_string(), "1".to_string()]);
            }
            other => panic!("Expected failure, got: {other:?}"),
        }
    }
}
