// In-memory stores for provisioned instances and bindings
//
// Not durable and not synchronized: the engine owns both stores and callers
// serialize access to the engine (see `SharedBroker`).

use std::collections::HashMap;

use super::types::{BindDetails, ProvisionDetails};

/// Result of comparing incoming details with what is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existing {
    Absent,
    Identical,
    Different,
}

/// Detail records keyed by caller-supplied identifier
#[derive(Debug, Clone)]
pub struct DetailStore<T> {
    records: HashMap<String, T>,
}

impl<T> Default for DetailStore<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<T: PartialEq> DetailStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.get(id)
    }

    /// Classify `details` against the record stored under `id`
    pub fn compare(&self, id: &str, details: &T) -> Existing {
        match self.records.get(id) {
            None => Existing::Absent,
            Some(stored) if stored == details => Existing::Identical,
            Some(_) => Existing::Different,
        }
    }

    /// Store `details`, replacing any previous record. Returns the replaced record.
    pub fn insert(&mut self, id: &str, details: T) -> Option<T> {
        self.records.insert(id.to_string(), details)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

pub type InstanceStore = DetailStore<ProvisionDetails>;
pub type BindingStore = DetailStore<BindDetails>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_classifies_records() {
        let mut store = InstanceStore::new();
        let p1 = ProvisionDetails::new("svc", "p1");
        let p2 = ProvisionDetails::new("svc", "p2");

        assert_eq!(store.compare("i1", &p1), Existing::Absent);
        assert!(store.insert("i1", p1.clone()).is_none());

        assert_eq!(store.compare("i1", &p1), Existing::Identical);
        assert_eq!(store.compare("i1", &p2), Existing::Different);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_replaces_previous_record() {
        let mut store = BindingStore::new();
        let first = BindDetails::new("svc", "p1").with_parameters(json!({ "a": 1 }));
        let second = BindDetails::new("svc", "p1").with_parameters(json!({ "a": 2 }));

        store.insert("b1", first.clone());
        let replaced = store.insert("b1", second.clone());

        assert_eq!(replaced, Some(first));
        assert_eq!(store.get("b1"), Some(&second));
        assert_eq!(store.ids().collect::<Vec<_>>(), vec!["b1"]);
    }
}
