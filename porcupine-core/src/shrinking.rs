//! The shrinking search.
//!
//! Starting from a falsified sample, each parameter in turn is replaced by
//! the first of its shrinks that still falsifies the property and is
//! strictly closer to minimal. After an accepted step the same step is
//! repeated through `grow_at` as long as that keeps falsifying. A full
//! pass over every parameter without an accepted step means the search has
//! converged.
//!
//! Values are always rebuilt from their recipes before they reach the
//! falsifier, so a property that mutates its inputs never affects later
//! attempts.

use crate::combine::Candidates;
use crate::data::ShrinkingMode;
use crate::error::{Failure, ShrinkStep};
use crate::falsifier::{execute_catching, Falsifier, TryResult};
use log::{debug, trace, warn};
use std::time::Instant;

/// Progress of a shrinking search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkingState {
    /// No shrink step has been taken; also the final state when shrinking is off.
    Started,
    Shrinking,
    /// No parameter has a smaller falsifying shrink.
    Converged,
    /// The time bound ran out; the best sample so far is reported.
    BoundedCutoff,
}

/// Parameter candidates that falsify a property, with the cause reported.
#[derive(Clone)]
pub struct FalsifiedSample<C> {
    pub candidates: C,
    pub cause: Option<Failure>,
}

impl<C: Candidates> FalsifiedSample<C> {
    pub fn new(candidates: C, cause: Option<Failure>) -> Self {
        FalsifiedSample { candidates, cause }
    }

    /// The parameter values rendered with `Debug`.
    pub fn describe(&self) -> Vec<String> {
        self.candidates.describe()
    }

    /// Freshly rebuilt parameter values.
    pub fn values(&self) -> C::Values {
        self.candidates.recreate()
    }
}

/// Result of a shrinking search.
pub struct ShrinkOutcome<C> {
    /// The smallest falsifying sample found.
    pub sample: FalsifiedSample<C>,
    /// Number of accepted steps.
    pub steps: usize,
    pub state: ShrinkingState,
    /// Number of shrinks handed to the falsifier.
    pub attempts: usize,
    pub invalid: usize,
    pub satisfied: usize,
    /// The original sample followed by every accepted improvement.
    pub history: Vec<ShrinkStep>,
}

impl<C: Candidates> ShrinkOutcome<C> {
    pub fn minimal(&self) -> Vec<String> {
        self.sample.describe()
    }

    pub fn values(&self) -> C::Values {
        self.sample.values()
    }

    pub fn cause(&self) -> Option<&Failure> {
        self.sample.cause.as_ref()
    }
}

struct Search<'a, C, F: ?Sized> {
    falsifier: &'a F,
    deadline: Option<Instant>,
    current: FalsifiedSample<C>,
    steps: usize,
    attempts: usize,
    invalid: usize,
    satisfied: usize,
    history: Vec<ShrinkStep>,
}

enum Attempt<C> {
    Accepted(FalsifiedSample<C>),
    Rejected,
    CutOff,
}

impl<'a, C, F> Search<'a, C, F>
where
    C: Candidates,
    F: Falsifier<C::Values> + ?Sized,
{
    fn timed_out(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    /// Try `next` as a replacement for the parameter at `index`.
    fn attempt(&mut self, index: usize, next: C) -> Option<FalsifiedSample<C>> {
        if next.distance_at(index) >= self.current.candidates.distance_at(index) {
            return None;
        }
        self.attempts += 1;
        match execute_catching(self.falsifier, next.recreate()) {
            TryResult::Falsified(cause) => Some(FalsifiedSample::new(next, cause)),
            TryResult::Invalid => {
                trace!("shrink attempt on parameter {} was invalid", index);
                self.invalid += 1;
                None
            }
            TryResult::Satisfied => {
                trace!("shrink attempt on parameter {} was satisfied", index);
                self.satisfied += 1;
                None
            }
        }
    }

    fn first_falsifying_shrink(&mut self, index: usize) -> Attempt<C> {
        for next in self.current.candidates.shrink_at(index) {
            if self.timed_out() {
                return Attempt::CutOff;
            }
            if let Some(sample) = self.attempt(index, next) {
                return Attempt::Accepted(sample);
            }
        }
        Attempt::Rejected
    }

    fn accept<R>(&mut self, sample: FalsifiedSample<C>, reporter: &mut R)
    where
        R: FnMut(&FalsifiedSample<C>),
    {
        self.steps += 1;
        let described = sample.describe();
        debug!("shrink step {}: [{}]", self.steps, described.join(", "));
        self.history.push(ShrinkStep {
            step: self.steps,
            sample: described,
        });
        reporter(&sample);
        self.current = sample;
    }

    /// Keep repeating the step that led from `before` to the current sample.
    fn follow_momentum<R>(&mut self, index: usize, mut before: C, reporter: &mut R)
    where
        R: FnMut(&FalsifiedSample<C>),
    {
        while let Some(grown) = self.current.candidates.grow_at(index, &before) {
            if self.timed_out() {
                return;
            }
            match self.attempt(index, grown) {
                Some(sample) => {
                    before = self.current.candidates.clone();
                    self.accept(sample, reporter);
                }
                None => return,
            }
        }
    }

    /// Shrink one parameter as far as it goes; `None` when cut off.
    fn shrink_parameter<R>(&mut self, index: usize, reporter: &mut R) -> Option<bool>
    where
        R: FnMut(&FalsifiedSample<C>),
    {
        let mut improved = false;
        loop {
            match self.first_falsifying_shrink(index) {
                Attempt::Accepted(sample) => {
                    let before = self.current.candidates.clone();
                    self.accept(sample, reporter);
                    self.follow_momentum(index, before, reporter);
                    improved = true;
                }
                Attempt::Rejected => return Some(improved),
                Attempt::CutOff => return None,
            }
        }
    }
}

/// Minimize a falsified sample.
///
/// `reporter` sees every accepted improvement as it happens. An equally
/// distant falsifying shrink never replaces the current sample, so the
/// first sample found at a distance is the one reported. Every accepted
/// sample carries the cause its own execution reported, which is `None`
/// when the property simply returned false. On a time cutoff the best
/// sample so far is returned.
pub fn shrink<C, F, R>(
    sample: FalsifiedSample<C>,
    falsifier: &F,
    mode: ShrinkingMode,
    mut reporter: R,
) -> ShrinkOutcome<C>
where
    C: Candidates,
    F: Falsifier<C::Values> + ?Sized,
    R: FnMut(&FalsifiedSample<C>),
{
    let history = vec![ShrinkStep {
        step: 0,
        sample: sample.describe(),
    }];
    let deadline = match mode {
        ShrinkingMode::Off => {
            return ShrinkOutcome {
                sample,
                steps: 0,
                state: ShrinkingState::Started,
                attempts: 0,
                invalid: 0,
                satisfied: 0,
                history,
            };
        }
        ShrinkingMode::Bounded(duration) => Some(Instant::now() + duration),
        ShrinkingMode::Full => None,
    };

    debug!("shrinking started from [{}]", history[0].sample.join(", "));
    let mut search = Search {
        falsifier,
        deadline,
        current: sample,
        steps: 0,
        attempts: 0,
        invalid: 0,
        satisfied: 0,
        history,
    };

    let state = 'search: loop {
        let mut improved = false;
        for index in 0..search.current.candidates.len() {
            match search.shrink_parameter(index, &mut reporter) {
                Some(progress) => improved |= progress,
                None => {
                    warn!(
                        "shrinking cut off after {} steps and {} attempts",
                        search.steps, search.attempts
                    );
                    break 'search ShrinkingState::BoundedCutoff;
                }
            }
        }
        if !improved {
            break ShrinkingState::Converged;
        }
    };

    debug!(
        "shrinking finished ({:?}) after {} steps and {} attempts",
        state, search.steps, search.attempts
    );
    ShrinkOutcome {
        sample: search.current,
        steps: search.steps,
        state,
        attempts: search.attempts,
        invalid: search.invalid,
        satisfied: search.satisfied,
        history: search.history,
    }
}
