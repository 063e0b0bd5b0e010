//! Meta testing - using Porcupine to test Porcupine itself
//!
//! This module contains properties that validate the correctness of
//! Porcupine's generators, edge cases, exhaustive enumeration, shrinking and
//! property runner.

use porcupine::*;

#[path = "meta-testing/generator-invariants.rs"]
mod generator_invariants;

#[path = "meta-testing/shrinking-properties.rs"]
mod shrinking_properties;

#[path = "meta-testing/distribution-validation.rs"]
mod distribution_validation;

#[path = "meta-testing/combinator-properties.rs"]
mod combinator_properties;

#[path = "meta-testing/edge-case-properties.rs"]
mod edge_case_properties;

#[path = "meta-testing/exhaustive-properties.rs"]
mod exhaustive_properties;

#[path = "meta-testing/composition-properties.rs"]
mod composition_properties;

/// Helper to generate sizes for meta testing
fn arbitrary_size() -> Gen<Size> {
    Gen::<usize>::between(0, 20).expect("valid range").map(Size::new)
}

/// Helper to generate seeds for meta testing
fn arbitrary_seed() -> Gen<Seed> {
    Gen::<u64>::between(0, 10_000).expect("valid range").map(Seed::from_u64)
}

fn ints(min: i32, max: i32) -> Gen<i32> {
    Gen::<i32>::between(min, max).expect("valid range")
}

/// Run a meta property and panic with its report unless it passed.
fn assert_holds<G: Generators>(name: &str, prop: Property<G>, config: &Config) {
    match prop.run(config) {
        Ok(result) if result.is_pass() => println!("✓ {name} passed"),
        Ok(result) => panic!("{name} failed:\n{result}"),
        Err(error) => panic!("{name} could not run: {error}"),
    }
}

fn fast_config() -> Config {
    Config::default().with_tests(40).with_seed(0x5eed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_test_generator_determinism() {
        generator_invariants::test_same_seed_same_value();
        generator_invariants::test_values_stay_in_range();
        generator_invariants::test_collection_bounds();
        generator_invariants::test_chars_skip_surrogates();
    }

    #[test]
    fn meta_test_monotonic_distance() {
        shrinking_properties::test_shrinks_never_grow();
    }

    #[test]
    fn meta_test_shrinking_idempotent() {
        shrinking_properties::test_shrinking_is_idempotent();
    }

    #[test]
    fn meta_test_shrinking_targets() {
        shrinking_properties::test_combined_sum_shrinks_to_zero();
        shrinking_properties::test_filtered_evens_shrink_to_two();
        shrinking_properties::test_mutated_values_are_recreated();
        shrinking_properties::test_cause_comes_from_minimal_sample();
        shrinking_properties::test_cause_is_dropped_with_the_sample_that_raised_it();
        shrinking_properties::test_unique_values_stay_unique_while_shrinking();
    }

    #[test]
    fn meta_test_distribution_accuracy() {
        distribution_validation::test_frequency_weights();
        distribution_validation::test_inject_null_probability();
    }

    #[test]
    fn meta_test_combinator_laws() {
        combinator_properties::test_map_composition();
        combinator_properties::test_unique_within_scope();
        combinator_properties::test_ignored_failures_are_retried();
        combinator_properties::test_filter_gives_up_after_max_misses();
        combinator_properties::test_duplicates_repeat_earlier_values();
        combinator_properties::test_flat_map_recreate_selects_again();
    }

    #[test]
    fn meta_test_edge_cases() {
        edge_case_properties::test_documented_integer_edge_cases();
        edge_case_properties::test_integer_edge_cases_for_any_range();
        edge_case_properties::test_edge_case_iteration_is_fresh();
        edge_case_properties::test_unique_edge_cases_never_collide();
    }

    #[test]
    fn meta_test_exhaustive_enumeration() {
        exhaustive_properties::test_flat_map_count();
        exhaustive_properties::test_counts_match_enumeration();
        exhaustive_properties::test_auto_mode_exhausts_small_spaces();
        exhaustive_properties::test_unique_enumerations_skip_collisions();
    }

    #[test]
    fn meta_test_composition_patterns() {
        composition_properties::test_recursive_depth_is_bounded();
        composition_properties::test_lazy_trees_terminate();
    }
}
