//! Generation scopes: uniqueness and duplicate-injection state for one
//! property trial or one embedded collection.

use crate::candidate::Candidate;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a stateful generator, shared by its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenId(usize);

impl GenId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        GenId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A uniqueness key a candidate holds for the generator that produced it.
///
/// Keys travel with candidates through mapping, combination and shrinking,
/// so values assembled from one scope can be checked for collisions long
/// after the scope itself is gone.
#[derive(Clone)]
pub struct UniqueKey {
    owner: GenId,
    key: Rc<dyn Any>,
    same: fn(&dyn Any, &dyn Any) -> bool,
}

impl UniqueKey {
    pub(crate) fn new<K: Eq + 'static>(owner: GenId, key: K) -> Self {
        UniqueKey {
            owner,
            key: Rc::new(key),
            same: same_key::<K>,
        }
    }

    /// Whether both keys belong to the same generator and are equal.
    pub(crate) fn collides(&self, other: &UniqueKey) -> bool {
        self.owner == other.owner && (self.same)(self.key.as_ref(), other.key.as_ref())
    }
}

impl fmt::Debug for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueKey").field("owner", &self.owner).finish()
    }
}

fn same_key<K: Eq + 'static>(a: &dyn Any, b: &dyn Any) -> bool {
    match (a.downcast_ref::<K>(), b.downcast_ref::<K>()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Whether no two of `keys` collide.
pub(crate) fn keys_distinct<'a, I>(keys: I) -> bool
where
    I: IntoIterator<Item = &'a UniqueKey>,
{
    let keys: Vec<&UniqueKey> = keys.into_iter().collect();
    keys.iter()
        .enumerate()
        .all(|(i, a)| keys[i + 1..].iter().all(|b| !a.collides(b)))
}

/// State that lives exactly as long as one generation pass.
///
/// A scope is created at the start of a trial (or of an embedded
/// collection) and dropped with it; nothing in it is shared across trials.
#[derive(Default)]
pub struct Scope {
    seen: RefCell<HashMap<GenId, Box<dyn Any>>>,
    histories: RefCell<HashMap<GenId, Box<dyn Any>>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Record `key` for `owner`; returns `false` if it was already seen.
    pub(crate) fn insert_key<K>(&self, owner: GenId, key: K) -> bool
    where
        K: Hash + Eq + 'static,
    {
        let mut seen = self.seen.borrow_mut();
        let entry = seen
            .entry(owner)
            .or_insert_with(|| Box::new(HashSet::<K>::new()));
        match entry.downcast_mut::<HashSet<K>>() {
            Some(keys) => keys.insert(key),
            // An owner always uses one key type.
            None => true,
        }
    }

    /// Candidates previously generated by `owner` in this scope, oldest first.
    pub(crate) fn history<T: 'static>(&self, owner: GenId) -> Vec<Candidate<T>> {
        self.histories
            .borrow()
            .get(&owner)
            .and_then(|history| history.downcast_ref::<Vec<Candidate<T>>>())
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn record<T: 'static>(&self, owner: GenId, candidate: Candidate<T>) {
        let mut histories = self.histories.borrow_mut();
        let entry = histories
            .entry(owner)
            .or_insert_with(|| Box::new(Vec::<Candidate<T>>::new()));
        if let Some(history) = entry.downcast_mut::<Vec<Candidate<T>>>() {
            history.push(candidate);
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("unique_owners", &self.seen.borrow().len())
            .field("history_owners", &self.histories.borrow().len())
            .finish()
    }
}
