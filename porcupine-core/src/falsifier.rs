//! The property under test and its three-way outcome.

use crate::error::Failure;
use log::trace;
use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    /// Set while this thread runs a property under `execute_catching`.
    static CATCHING: Cell<bool> = Cell::new(false);
}

static QUIET_HOOK: Once = Once::new();

/// Outcome of trying one sample against a property.
#[derive(Debug, Clone, PartialEq)]
pub enum TryResult {
    Satisfied,
    /// The sample is a counterexample, optionally with its cause.
    Falsified(Option<Failure>),
    /// A precondition did not hold; the sample is neither a success nor a failure.
    Invalid,
}

impl TryResult {
    /// `Satisfied` when `condition` holds, `Invalid` otherwise.
    pub fn assume(condition: bool) -> TryResult {
        if condition {
            TryResult::Satisfied
        } else {
            TryResult::Invalid
        }
    }

    /// A counterexample with a cause located at the caller.
    #[track_caller]
    pub fn fail(message: impl Into<String>) -> TryResult {
        TryResult::Falsified(Some(Failure::new("assertion", message)))
    }

    pub fn is_falsified(&self) -> bool {
        matches!(self, TryResult::Falsified(_))
    }
}

impl From<bool> for TryResult {
    fn from(holds: bool) -> Self {
        if holds {
            TryResult::Satisfied
        } else {
            TryResult::Falsified(None)
        }
    }
}

impl From<()> for TryResult {
    fn from(_: ()) -> Self {
        TryResult::Satisfied
    }
}

impl From<Result<(), Failure>> for TryResult {
    fn from(result: Result<(), Failure>) -> Self {
        match result {
            Ok(()) => TryResult::Satisfied,
            Err(failure) => TryResult::Falsified(Some(failure)),
        }
    }
}

/// A property over parameter values of type `V`.
///
/// Any `Fn(V) -> R` is a falsifier when `R` converts into a `TryResult`:
/// `bool`, `()`, `Result<(), Failure>` or `TryResult` itself.
pub trait Falsifier<V> {
    fn execute(&self, values: V) -> TryResult;
}

impl<V, F, R> Falsifier<V> for F
where
    F: Fn(V) -> R,
    R: Into<TryResult>,
{
    fn execute(&self, values: V) -> TryResult {
        self(values).into()
    }
}

/// A falsifier that reports `Invalid` for values failing `precondition`
/// without running `falsifier` on them.
pub fn filtered<V, F, P>(falsifier: F, precondition: P) -> impl Fn(V) -> TryResult
where
    F: Falsifier<V>,
    P: Fn(&V) -> bool,
{
    move |values: V| {
        if precondition(&values) {
            falsifier.execute(values)
        } else {
            TryResult::Invalid
        }
    }
}

/// Run `falsifier`, turning a panic into a falsification of kind `"panic"`.
///
/// Panics caught here are not printed by the panic hook; their message
/// travels in the failure instead. Panics on other threads, or outside a
/// property, still reach the previously installed hook.
pub fn execute_catching<V, F>(falsifier: &F, values: V) -> TryResult
where
    F: Falsifier<V> + ?Sized,
{
    install_quiet_hook();
    let outer = CATCHING.with(|catching| catching.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| falsifier.execute(values)));
    CATCHING.with(|catching| catching.set(outer));
    match outcome {
        Ok(result) => result,
        Err(payload) => TryResult::Falsified(Some(Failure::unlocated(
            "panic",
            panic_message(payload.as_ref()),
        ))),
    }
}

/// Wrap the current panic hook once so that it skips caught property panics.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CATCHING.with(Cell::get) {
                trace!("property panicked: {}", info);
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("Box<dyn Any>")
    }
}
