//! Property definitions and the trial runner.

use crate::combine::{Candidates, CandidatesFactory, Generators};
use crate::data::*;
use crate::error::*;
use crate::exhaustive::Enumerate;
use crate::falsifier::{execute_catching, Falsifier, TryResult};
use crate::scope::Scope;
use crate::shrinking::{shrink, FalsifiedSample};
use log::debug;

/// A property over the values drawn from a parameter list.
pub struct Property<G: Generators> {
    generators: G,
    falsifier: Box<dyn Falsifier<G::Values>>,
}

/// Trial counters of one run.
#[derive(Debug, Default)]
struct Tally {
    tests_run: usize,
    edge_cases_run: usize,
    discards: usize,
}

enum Trial {
    Continue,
    Done(TestResult),
}

impl<G: Generators> Property<G> {
    /// Create a property from a parameter list and the property under test.
    pub fn new<F>(generators: G, falsifier: F) -> Self
    where
        F: Falsifier<G::Values> + 'static,
    {
        Property {
            generators,
            falsifier: Box::new(falsifier),
        }
    }

    /// Run this property with the given configuration.
    ///
    /// Configuration errors, including generation failures that were not
    /// turned into retries, are returned as `Err`.
    pub fn run(&self, config: &Config) -> Result<TestResult> {
        let seed = config.seed.map(Seed::from_u64).unwrap_or_else(Seed::random);
        match config.generation {
            GenerationMode::Exhaustive => {
                let (count, enumerate) = self
                    .generators
                    .exhaustive_all(MAX_EXHAUSTIVE_COUNT)
                    .ok_or_else(|| {
                        PorcupineError::invalid_generator(
                            "parameters have no exhaustive enumeration within the limit",
                        )
                    })?;
                Ok(self.run_exhaustive(count, enumerate, config))
            }
            GenerationMode::Auto => match self.generators.exhaustive_all(config.test_limit as u64) {
                Some((count, enumerate)) => Ok(self.run_exhaustive(count, enumerate, config)),
                None => {
                    debug!(
                        "parameter space exceeds {} tests; generating randomly",
                        config.test_limit
                    );
                    self.run_randomized(seed, config)
                }
            },
            GenerationMode::Randomized => self.run_randomized(seed, config),
            GenerationMode::EdgeCasesOnly => Ok(self.run_edge_cases(config)),
        }
    }

    fn run_exhaustive(
        &self,
        count: u64,
        enumerate: Enumerate<G::Candidates>,
        config: &Config,
    ) -> TestResult {
        debug!("checking all {} values of the parameter space", count);
        let mut tally = Tally::default();
        for candidates in enumerate() {
            if let Trial::Done(result) = self.trial(candidates, None, &mut tally, config) {
                return result;
            }
        }
        TestResult::Exhausted {
            tests_run: tally.tests_run,
        }
    }

    fn run_edge_cases(&self, config: &Config) -> TestResult {
        let mut tally = Tally::default();
        for factory in self.generators.edge_case_factories(config.max_edge_cases) {
            if let Some(candidates) = factory() {
                tally.edge_cases_run += 1;
                if let Trial::Done(result) = self.trial(candidates, None, &mut tally, config) {
                    return result;
                }
            }
        }
        TestResult::Pass {
            tests_run: tally.tests_run,
            edge_cases_run: tally.edge_cases_run,
        }
    }

    fn run_randomized(&self, seed: Seed, config: &Config) -> Result<TestResult> {
        debug!("running {} tests with {}", config.test_limit, seed);
        let edge_cases: Vec<CandidatesFactory<G::Candidates>> = match config.edge_cases {
            EdgeCasesMode::None => Vec::new(),
            EdgeCasesMode::First | EdgeCasesMode::Mixin => {
                self.generators.edge_case_factories(config.max_edge_cases)
            }
        };
        let stride = match config.edge_cases {
            EdgeCasesMode::Mixin => (config.test_limit / (edge_cases.len() + 1)).max(1),
            _ => 1,
        };
        let mut edge_cases = edge_cases.into_iter();
        let mut tally = Tally::default();
        let mut next_seed = seed;

        while tally.tests_run < config.test_limit {
            let edge_turn = (tally.tests_run + 1) % stride == 0;
            let edge_case = if edge_turn { edge_cases.next() } else { None };
            let candidates = match edge_case {
                Some(factory) => match factory() {
                    Some(candidates) => {
                        tally.edge_cases_run += 1;
                        candidates
                    }
                    None => continue,
                },
                None => {
                    let size = Size::new(tally.tests_run * config.size_limit / config.test_limit);
                    let (trial_seed, rest) = next_seed.split();
                    next_seed = rest;
                    self.generators.generate_all(size, trial_seed, &Scope::new())?
                }
            };
            if let Trial::Done(result) = self.trial(candidates, Some(seed), &mut tally, config) {
                return Ok(result);
            }
        }

        Ok(TestResult::Pass {
            tests_run: tally.tests_run,
            edge_cases_run: tally.edge_cases_run,
        })
    }

    fn trial(
        &self,
        candidates: G::Candidates,
        seed: Option<Seed>,
        tally: &mut Tally,
        config: &Config,
    ) -> Trial {
        match execute_catching(self.falsifier.as_ref(), candidates.recreate()) {
            TryResult::Satisfied => {
                tally.tests_run += 1;
                Trial::Continue
            }
            TryResult::Invalid => {
                tally.discards += 1;
                if tally.discards > config.discard_limit {
                    Trial::Done(TestResult::Discard {
                        limit: config.discard_limit,
                        tests_run: tally.tests_run,
                    })
                } else {
                    Trial::Continue
                }
            }
            TryResult::Falsified(cause) => {
                tally.tests_run += 1;
                Trial::Done(self.minimize(candidates, cause, seed, tally.tests_run, config))
            }
        }
    }

    fn minimize(
        &self,
        candidates: G::Candidates,
        cause: Option<Failure>,
        seed: Option<Seed>,
        tests_run: usize,
        config: &Config,
    ) -> TestResult {
        let sample = FalsifiedSample::new(candidates, cause);
        let original = sample.describe();
        let outcome = shrink(sample, self.falsifier.as_ref(), config.shrinking, |_| {});
        TestResult::Fail {
            original,
            minimal: outcome.minimal(),
            cause: outcome.sample.cause.clone(),
            seed,
            tests_run,
            shrinks_performed: outcome.steps,
            shrinking: outcome.state,
            shrink_steps: outcome.history,
        }
    }
}

/// Create a property checking `falsifier` against values drawn from `generators`.
pub fn for_all<G, F>(generators: G, falsifier: F) -> Property<G>
where
    G: Generators,
    F: Falsifier<G::Values> + 'static,
{
    Property::new(generators, falsifier)
}
