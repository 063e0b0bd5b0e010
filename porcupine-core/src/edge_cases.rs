//! Edge cases: finite, repeatable sets of boundary candidates.

use crate::candidate::Candidate;
use std::collections::HashSet;
use std::fmt::Debug;
use std::rc::Rc;

/// Builds one edge-case candidate. `None` when the edge case does not exist
/// after all, e.g. because a fallible mapping rejects it.
pub type EdgeCaseFactory<T> = Rc<dyn Fn() -> Option<Candidate<T>>>;

/// A finite bag of candidate factories.
///
/// Every iteration calls the factories again, so each pass hands out fresh
/// candidates with freshly built values; nothing a consumer does to one
/// pass's values is visible in the next.
pub struct EdgeCases<T> {
    factories: Vec<EdgeCaseFactory<T>>,
}

impl<T> Clone for EdgeCases<T> {
    fn clone(&self) -> Self {
        EdgeCases {
            factories: self.factories.clone(),
        }
    }
}

impl<T: 'static> EdgeCases<T> {
    pub fn none() -> Self {
        EdgeCases {
            factories: Vec::new(),
        }
    }

    pub fn from_factories(factories: Vec<EdgeCaseFactory<T>>) -> Self {
        EdgeCases { factories }
    }

    /// Edge cases built by infallible candidate constructors.
    pub fn from_fns<F>(builders: Vec<F>) -> Self
    where
        F: Fn() -> Candidate<T> + 'static,
    {
        EdgeCases {
            factories: builders
                .into_iter()
                .map(|build| Rc::new(move || Some(build())) as EdgeCaseFactory<T>)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Fresh candidates for every edge case.
    pub fn iter(&self) -> impl Iterator<Item = Candidate<T>> + '_ {
        self.factories.iter().filter_map(|factory| factory())
    }

    /// Freshly built values for every edge case.
    pub fn values(&self) -> Vec<T> {
        self.iter().map(|candidate| candidate.recreate()).collect()
    }

    pub fn into_factories(self) -> Vec<EdgeCaseFactory<T>> {
        self.factories
    }

    pub fn map<U: 'static>(self, f: Rc<dyn Fn(T) -> U>) -> EdgeCases<U> {
        EdgeCases {
            factories: self
                .factories
                .into_iter()
                .map(|factory| {
                    let f = Rc::clone(&f);
                    Rc::new(move || factory().map(|candidate| candidate.map_rc(Rc::clone(&f))))
                        as EdgeCaseFactory<U>
                })
                .collect(),
        }
    }

    /// Transform every edge-case candidate, dropping those `f` rejects.
    pub fn filter_map<U, F>(self, f: F) -> EdgeCases<U>
    where
        F: Fn(Candidate<T>) -> Option<Candidate<U>> + 'static,
        U: 'static,
    {
        let f = Rc::new(f);
        EdgeCases {
            factories: self
                .factories
                .into_iter()
                .map(|factory| {
                    let f = Rc::clone(&f);
                    Rc::new(move || f(factory()?)) as EdgeCaseFactory<U>
                })
                .collect(),
        }
    }

    /// Keep edge cases whose value satisfies `predicate`.
    pub fn filter(self, predicate: Rc<dyn Fn(&T) -> bool>) -> EdgeCases<T> {
        EdgeCases {
            factories: self
                .factories
                .into_iter()
                .filter(|factory| {
                    factory()
                        .map(|candidate| predicate(candidate.value()))
                        .unwrap_or(false)
                })
                .map(|factory| {
                    let predicate = Rc::clone(&predicate);
                    Rc::new(move || factory()?.filter_rc(Rc::clone(&predicate)))
                        as EdgeCaseFactory<T>
                })
                .collect(),
        }
    }

    /// Union of two edge-case sets, `self` first.
    pub fn concat(mut self, other: EdgeCases<T>) -> EdgeCases<T> {
        self.factories.extend(other.factories);
        self
    }

    pub fn limit(mut self, max: usize) -> EdgeCases<T> {
        self.factories.truncate(max);
        self
    }

    /// Drop edge cases whose `Debug` rendering repeats an earlier one.
    pub fn dedup(self) -> EdgeCases<T>
    where
        T: Debug,
    {
        let mut seen = HashSet::new();
        EdgeCases {
            factories: self
                .factories
                .into_iter()
                .filter(|factory| match factory() {
                    Some(candidate) => seen.insert(format!("{:?}", candidate.value())),
                    None => false,
                })
                .collect(),
        }
    }
}
