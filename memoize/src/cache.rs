use crate::config::Concurrency;
use crate::key::ArgumentKey;
use crate::outcome::Outcome;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

type Entries<T, P> = HashMap<ArgumentKey, Arc<Outcome<T, P>>>;

/// In-flight or finished outcome of one key. Callers of a key that is being produced block
/// on the cell; the map lock is only held to look the slot up.
struct Slot<T, P> {
    cell: OnceCell<Arc<Outcome<T, P>>>,
    producer: Mutex<Option<ThreadId>>,
}

impl<T, P> Slot<T, P> {
    fn new() -> Self {
        Slot { cell: OnceCell::new(), producer: Mutex::new(None) }
    }

    fn produced_by_current_thread(&self) -> bool {
        *self.producer.lock() == Some(thread::current().id())
    }
}

/// Clears the producer mark even when the miss callback unwinds.
struct Producing<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> Producing<'a> {
    fn start(producer: &'a Mutex<Option<ThreadId>>) -> Self {
        *producer.lock() = Some(thread::current().id());
        Producing(producer)
    }
}

impl Drop for Producing<'_> {
    fn drop(&mut self) {
        *self.0.lock() = None;
    }
}

enum Store<T, P> {
    Exclusive(Mutex<HashMap<ArgumentKey, Arc<Slot<T, P>>>>),
    Relaxed(RwLock<Entries<T, P>>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Outcomes of one wrapper, keyed by argument key. Grows monotonically.
pub struct OutcomeCache<T, P> {
    store: Store<T, P>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T, P> OutcomeCache<T, P> {
    pub fn new(concurrency: Concurrency, capacity: usize) -> Self {
        let store = match concurrency {
            Concurrency::Exclusive => Store::Exclusive(Mutex::new(HashMap::with_capacity(capacity))),
            Concurrency::Relaxed => Store::Relaxed(RwLock::new(HashMap::with_capacity(capacity))),
        };
        OutcomeCache { store, hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub fn concurrency(&self) -> Concurrency {
        match self.store {
            Store::Exclusive(_) => Concurrency::Exclusive,
            Store::Relaxed(_) => Concurrency::Relaxed,
        }
    }

    /// Returns the outcome stored for `key`, running `miss` to produce it when the key has
    /// not been seen. The returned flag is true on a cache hit.
    ///
    /// With [`Concurrency::Exclusive`] the producer of a key runs at most once; other threads
    /// asking for that key wait for it while every other key stays available. A producer that
    /// asks for its own key again on the same thread gets a fresh, unstored outcome.
    ///
    /// With [`Concurrency::Relaxed`] racing producers all run and only the first stored outcome
    /// is kept; every caller receives it.
    pub fn resolve<F>(&self, key: ArgumentKey, miss: F) -> (Arc<Outcome<T, P>>, bool)
    where
        F: FnOnce() -> Outcome<T, P>,
    {
        match &self.store {
            Store::Exclusive(slots) => {
                let slot = slots.lock().entry(key).or_insert_with(|| Arc::new(Slot::new())).clone();
                if let Some(outcome) = slot.cell.get() {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return (outcome.clone(), true);
                }
                if slot.produced_by_current_thread() {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return (Arc::new(miss()), false);
                }
                let mut produced = false;
                let outcome = slot
                    .cell
                    .get_or_init(|| {
                        let _producing = Producing::start(&slot.producer);
                        produced = true;
                        self.misses.fetch_add(1, Ordering::Relaxed);
                        Arc::new(miss())
                    })
                    .clone();
                if !produced {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                }
                (outcome, !produced)
            }
            Store::Relaxed(lock) => {
                let cached = lock.read().get(&key).cloned();
                if let Some(outcome) = cached {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return (outcome, true);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                let produced = Arc::new(miss());
                let stored = lock.write().entry(key).or_insert(produced).clone();
                (stored, false)
            }
        }
    }

    pub fn get(&self, key: &ArgumentKey) -> Option<Arc<Outcome<T, P>>> {
        match &self.store {
            Store::Exclusive(slots) => slots.lock().get(key).and_then(|slot| slot.cell.get().cloned()),
            Store::Relaxed(lock) => lock.read().get(key).cloned(),
        }
    }

    pub fn len(&self) -> usize {
        match &self.store {
            Store::Exclusive(slots) => slots.lock().values().filter(|slot| slot.cell.get().is_some()).count(),
            Store::Relaxed(lock) => lock.read().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
