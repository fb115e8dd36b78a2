//! Bookkeeping for mutations that are still on the wire.

use std::collections::{BTreeMap, HashMap};

use todo_core::TodoId;

/// Ids with at least one unsettled mutation request.
///
/// Counts requests per id, so an id issued twice stays pending until both
/// requests settle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingIds {
    in_flight: BTreeMap<TodoId, usize>,
}

impl PendingIds {
    pub fn insert(&mut self, id: TodoId) {
        *self.in_flight.entry(id).or_insert(0) += 1;
    }

    /// Settle one request for `id`. Returns `true` if the id is no longer pending.
    pub fn release(&mut self, id: TodoId) -> bool {
        match self.in_flight.get_mut(&id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                self.in_flight.remove(&id);
                true
            }
            None => true,
        }
    }

    /// Drop `id` regardless of how many requests are outstanding.
    pub fn remove(&mut self, id: TodoId) {
        self.in_flight.remove(&id);
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.in_flight.contains_key(&id)
    }

    /// Number of unsettled requests for `id`.
    pub fn in_flight(&self, id: TodoId) -> usize {
        self.in_flight.get(&id).copied().unwrap_or(0)
    }

    /// Pending ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TodoId> + '_ {
        self.in_flight.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

impl FromIterator<TodoId> for PendingIds {
    fn from_iter<I: IntoIterator<Item = TodoId>>(iter: I) -> Self {
        let mut pending = Self::default();
        for id in iter {
            pending.insert(id);
        }
        pending
    }
}

/// Latest request generation issued per todo id.
///
/// A response may only touch the collection if its generation is still the
/// latest one for that id. Generations come from one counter shared by all
/// ids and are never reused, so a forgotten id cannot be matched by a stale
/// response later on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Generations {
    issued: u64,
    latest: HashMap<TodoId, u64>,
}

impl Generations {
    pub(crate) fn next(&mut self, id: TodoId) -> u64 {
        self.issued += 1;
        self.latest.insert(id, self.issued);
        self.issued
    }

    pub(crate) fn is_latest(&self, id: TodoId, generation: u64) -> bool {
        self.latest.get(&id) == Some(&generation)
    }

    /// Forget `id` once its newest request has settled.
    pub(crate) fn forget(&mut self, id: TodoId) {
        self.latest.remove(&id);
    }
}
