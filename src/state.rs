use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) type SegmentValues = HashMap<String, Value>;
type PartitionMap = HashMap<String, SegmentValues>;

/// The three logical partitions of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Partition {
    Data,
    FlashNow,
    FlashNext,
}

/// The owned, in-memory session store: three partitions, each keyed by
/// segment name and then by value key.
///
/// `data` persists across requests. `flash_now` holds flash values visible
/// for the current request; `flash_next` holds flash values staged for the
/// next request. The surrounding session manager is expected to call
/// [`rotate_flash`](Self::rotate_flash) (directly or through
/// [`Session::rotate_flash`](crate::Session::rotate_flash)) once per request,
/// before handlers run.
///
/// Serializes to a stable JSON shape; absent partitions decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    data: PartitionMap,
    #[serde(default)]
    flash_now: PartitionMap,
    #[serde(default)]
    flash_next: PartitionMap,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no segment has stored anything in any partition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let no_values = |partition: &PartitionMap| partition.values().all(HashMap::is_empty);
        no_values(&self.data) && no_values(&self.flash_now) && no_values(&self.flash_next)
    }

    /// Promote staged flash values: `flash_now` becomes the previous
    /// request's `flash_next`, and `flash_next` starts empty. `data` is
    /// untouched.
    pub fn rotate_flash(&mut self) {
        self.flash_now = std::mem::take(&mut self.flash_next);
    }

    fn partition(&self, partition: Partition) -> &PartitionMap {
        match partition {
            Partition::Data => &self.data,
            Partition::FlashNow => &self.flash_now,
            Partition::FlashNext => &self.flash_next,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut PartitionMap {
        match partition {
            Partition::Data => &mut self.data,
            Partition::FlashNow => &mut self.flash_now,
            Partition::FlashNext => &mut self.flash_next,
        }
    }

    // Ensure all three partitions exist for `name`. Single call site per
    // segment load keeps the all-or-nothing invariant.
    pub(crate) fn materialize(&mut self, name: &str) {
        for partition in [Partition::Data, Partition::FlashNow, Partition::FlashNext] {
            self.partition_mut(partition).entry(name.to_owned()).or_default();
        }
    }

    pub(crate) fn values(&self, partition: Partition, name: &str) -> Option<&SegmentValues> {
        self.partition(partition).get(name)
    }

    pub(crate) fn values_mut(&mut self, partition: Partition, name: &str) -> &mut SegmentValues {
        self.partition_mut(partition).entry(name.to_owned()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rotate_flash_promotes_staged_values() {
        let mut state = SessionState::new();
        state
            .values_mut(Partition::FlashNext, "messages")
            .insert("notice".to_owned(), json!("saved"));
        state
            .values_mut(Partition::FlashNow, "messages")
            .insert("stale".to_owned(), json!("old"));
        state
            .values_mut(Partition::Data, "messages")
            .insert("kept".to_owned(), json!(1));

        state.rotate_flash();

        let now = state
            .values(Partition::FlashNow, "messages")
            .expect("flash_now partition exists");
        assert_eq!(now.get("notice"), Some(&json!("saved")));
        assert!(!now.contains_key("stale"));
        assert!(
            state
                .values(Partition::FlashNext, "messages")
                .is_none_or(HashMap::is_empty)
        );
        assert_eq!(
            state
                .values(Partition::Data, "messages")
                .and_then(|values| values.get("kept")),
            Some(&json!(1))
        );
    }

    #[test]
    fn materialize_creates_all_partitions() {
        let mut state = SessionState::new();
        state.materialize("cart");

        for partition in [Partition::Data, Partition::FlashNow, Partition::FlashNext] {
            assert!(state.values(partition, "cart").is_some());
        }
    }

    #[test]
    fn is_empty_ignores_materialized_but_unused_segments() {
        let mut state = SessionState::new();
        assert!(state.is_empty());

        state.materialize("cart");
        assert!(state.is_empty());

        state
            .values_mut(Partition::Data, "cart")
            .insert("qty".to_owned(), json!(3));
        assert!(!state.is_empty());
    }

    #[test]
    fn missing_partitions_decode_as_empty() {
        let state: SessionState =
            serde_json::from_str(r#"{"data":{"cart":{"qty":3}}}"#).expect("state decodes");

        assert_eq!(
            state
                .values(Partition::Data, "cart")
                .and_then(|values| values.get("qty")),
            Some(&json!(3))
        );
        assert!(state.values(Partition::FlashNow, "cart").is_none());
    }
}
