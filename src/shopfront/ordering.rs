//! # Ordered Sibling Sets
//!
//! Collections, the products inside a collection, the products inside an offer and the
//! homepage articles all share one ordering rule: every member carries a 1-based `index`,
//! and between operations the indexes of a set are exactly `1..=N` with no gaps and no
//! duplicates. Screens sort by `index` and then use it as an array offset, so a gap or a
//! duplicate shows up as a missing or doubled row.
//!
//! [`SiblingSet`] is the single implementation of that rule. It is pure and in-memory:
//! adapters in `commands/` load a set from the store, apply exactly one operation, and
//! persist the result.
//!
//! ## Operations
//!
//! - [`SiblingSet::insert_at_front`]: new members always land at index 1, everyone else
//!   moves down by one.
//! - [`SiblingSet::remove_by_id`]: drops a member and re-ranks the rest to `1..=N-1` in
//!   their previous index order.
//! - [`SiblingSet::swap_by_target_index`]: exchanges the indexes of the source and of the
//!   member currently sitting at the target index. Exactly two members change.
//! - [`SiblingSet::materialize`]: the members sorted by index, for display.
//!
//! ## Persisted order vs. display order
//!
//! The set keeps members in their persisted (array) order. Insert places the new member
//! first in that order too, so an array-backed set written straight back to the store
//! reads naturally. Display order is always derived by sorting on `index`.
//!
//! ## Swap with itself
//!
//! Asking to move a member to the index it already has is rejected as
//! [`OrderError::NoSwapPartner`]: there is no *other* member at that index to trade
//! places with.

use thiserror::Error;

/// A member of an ordered set.
pub trait Sibling {
    fn id(&self) -> &str;
    fn index(&self) -> u32;
    fn set_index(&mut self, index: u32);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Item '{0}' not found")]
    NotFound(String),

    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    #[error("No item occupies index {0}")]
    NoSwapPartner(u32),
}

/// The requested position for a reposition, as the UI sent it.
///
/// Input that is not an integer is kept as such rather than rejected at parse time, so
/// that [`SiblingSet::swap_by_target_index`] can report a missing source before a bad
/// target. Range checking needs the set size and happens there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetIndex(Option<i64>);

impl TargetIndex {
    pub fn new(value: i64) -> Self {
        Self(Some(value))
    }

    /// `None` when the raw input was not an integer.
    pub fn value(&self) -> Option<i64> {
        self.0
    }
}

impl From<u32> for TargetIndex {
    fn from(value: u32) -> Self {
        Self(Some(i64::from(value)))
    }
}

impl From<&str> for TargetIndex {
    fn from(raw: &str) -> Self {
        Self(raw.trim().parse::<i64>().ok())
    }
}

impl std::fmt::Display for TargetIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "(not an integer)"),
        }
    }
}

/// The two members touched by a swap, with their new indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swap {
    pub source_id: String,
    pub source_index: u32,
    pub occupant_id: String,
    pub occupant_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiblingSet<T> {
    items: Vec<T>,
}

impl<T> Default for SiblingSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Sibling> SiblingSet<T> {
    /// Wraps members exactly as persisted. No renumbering happens here; use
    /// [`SiblingSet::normalize`] to repair a set loaded in a bad state.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Members in persisted order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Places `item` at index 1 and shifts every existing member down by one.
    ///
    /// Callers are responsible for rejecting duplicates before calling this.
    pub fn insert_at_front(&mut self, mut item: T) {
        for existing in &mut self.items {
            existing.set_index(existing.index() + 1);
        }
        item.set_index(1);
        self.items.insert(0, item);
    }

    /// Removes the member with `id` and closes the gap it leaves.
    pub fn remove_by_id(&mut self, id: &str) -> Result<T, OrderError> {
        let pos = self
            .position(id)
            .ok_or_else(|| OrderError::NotFound(id.to_string()))?;
        let removed = self.items.remove(pos);
        self.renumber();
        Ok(removed)
    }

    /// Exchanges the index of `source_id` with the member currently at `target`.
    ///
    /// Validation order: the source must exist, the target must lie in `1..=N`, and some
    /// other member must currently hold the target index. On any error the set is left
    /// untouched.
    pub fn swap_by_target_index(
        &mut self,
        source_id: &str,
        target: TargetIndex,
    ) -> Result<Swap, OrderError> {
        let source_pos = self
            .position(source_id)
            .ok_or_else(|| OrderError::NotFound(source_id.to_string()))?;

        let size = self.items.len();
        let target = match target.value() {
            None => {
                return Err(OrderError::InvalidIndex(
                    "target index must be an integer".to_string(),
                ))
            }
            Some(value) if value < 1 || value > size as i64 => {
                return Err(OrderError::InvalidIndex(format!(
                    "{} is outside 1..={}",
                    value, size
                )))
            }
            Some(value) => value as u32,
        };

        let occupant_pos = self
            .items
            .iter()
            .enumerate()
            .find(|(pos, item)| *pos != source_pos && item.index() == target)
            .map(|(pos, _)| pos)
            .ok_or(OrderError::NoSwapPartner(target))?;

        let source_index = self.items[source_pos].index();
        self.items[source_pos].set_index(target);
        self.items[occupant_pos].set_index(source_index);

        Ok(Swap {
            source_id: self.items[source_pos].id().to_string(),
            source_index: target,
            occupant_id: self.items[occupant_pos].id().to_string(),
            occupant_index: source_index,
        })
    }

    /// Members sorted ascending by index. Ties keep persisted order.
    pub fn materialize(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.index());
        sorted
    }

    /// Owned variant of [`SiblingSet::materialize`].
    pub fn into_materialized(self) -> Vec<T> {
        let mut sorted = self.items;
        sorted.sort_by_key(|item| item.index());
        sorted
    }

    /// Members in persisted order, for writing back to an array field.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// True when the indexes are exactly a permutation of `1..=N`.
    pub fn is_contiguous(&self) -> bool {
        let mut indexes: Vec<u32> = self.items.iter().map(|item| item.index()).collect();
        indexes.sort_unstable();
        indexes
            .iter()
            .enumerate()
            .all(|(rank, index)| *index as usize == rank + 1)
    }

    /// Re-ranks members to `1..=N` by current index (persisted order breaks ties).
    /// Returns how many members changed index.
    pub fn normalize(&mut self) -> usize {
        self.renumber()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn renumber(&mut self) -> usize {
        let mut ranked: Vec<usize> = (0..self.items.len()).collect();
        ranked.sort_by_key(|&pos| self.items[pos].index());

        let mut changed = 0;
        for (rank, pos) in ranked.into_iter().enumerate() {
            let index = rank as u32 + 1;
            if self.items[pos].index() != index {
                self.items[pos].set_index(index);
                changed += 1;
            }
        }
        changed
    }
}

impl<T> IntoIterator for SiblingSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        index: u32,
    }

    impl Sibling for Item {
        fn id(&self) -> &str {
            &self.id
        }
        fn index(&self) -> u32 {
            self.index
        }
        fn set_index(&mut self, index: u32) {
            self.index = index;
        }
    }

    fn item(id: &str, index: u32) -> Item {
        Item {
            id: id.to_string(),
            index,
        }
    }

    fn set(pairs: &[(&str, u32)]) -> SiblingSet<Item> {
        SiblingSet::new(pairs.iter().map(|(id, idx)| item(id, *idx)).collect())
    }

    fn index_of(set: &SiblingSet<Item>, id: &str) -> u32 {
        set.get(id).unwrap().index
    }

    fn order(set: &SiblingSet<Item>) -> Vec<(String, u32)> {
        set.materialize()
            .into_iter()
            .map(|i| (i.id.clone(), i.index))
            .collect()
    }

    #[test]
    fn insert_shifts_existing_and_takes_first_slot() {
        let mut s = set(&[("A", 1), ("B", 2)]);
        s.insert_at_front(item("C", 0));

        assert_eq!(index_of(&s, "C"), 1);
        assert_eq!(index_of(&s, "A"), 2);
        assert_eq!(index_of(&s, "B"), 3);
        assert_eq!(s.iter().next().unwrap().id, "C");
    }

    #[test]
    fn insert_into_empty_set() {
        let mut s = SiblingSet::default();
        s.insert_at_front(item("A", 7));
        assert_eq!(order(&s), vec![("A".to_string(), 1)]);
    }

    #[test]
    fn remove_compacts_remaining_indexes() {
        let mut s = set(&[("A", 1), ("B", 2), ("C", 3)]);
        let removed = s.remove_by_id("B").unwrap();

        assert_eq!(removed.id, "B");
        assert_eq!(index_of(&s, "A"), 1);
        assert_eq!(index_of(&s, "C"), 2);
        assert!(s.is_contiguous());
    }

    #[test]
    fn remove_ranks_by_index_not_array_position() {
        // Persisted order differs from index order after swaps.
        let mut s = set(&[("C", 3), ("A", 1), ("D", 4), ("B", 2)]);
        s.remove_by_id("A").unwrap();

        assert_eq!(
            order(&s),
            vec![
                ("B".to_string(), 1),
                ("C".to_string(), 2),
                ("D".to_string(), 3)
            ]
        );
    }

    #[test]
    fn remove_unknown_id_is_not_found() {
        let mut s = set(&[("A", 1)]);
        assert_eq!(
            s.remove_by_id("Z"),
            Err(OrderError::NotFound("Z".to_string()))
        );
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn swap_exchanges_exactly_two() {
        let mut s = set(&[("A", 1), ("B", 2), ("C", 3)]);
        let swap = s.swap_by_target_index("A", TargetIndex::new(3)).unwrap();

        assert_eq!(swap.occupant_id, "C");
        assert_eq!(swap.source_index, 3);
        assert_eq!(swap.occupant_index, 1);
        assert_eq!(index_of(&s, "A"), 3);
        assert_eq!(index_of(&s, "B"), 2);
        assert_eq!(index_of(&s, "C"), 1);

        let ids: Vec<_> = s.materialize().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec!["C", "B", "A"]);
    }

    #[test]
    fn swap_with_own_index_has_no_partner() {
        let mut s = set(&[("A", 1)]);
        let before = s.clone();
        assert_eq!(
            s.swap_by_target_index("A", TargetIndex::new(1)),
            Err(OrderError::NoSwapPartner(1))
        );
        assert_eq!(s, before);
    }

    #[test]
    fn swap_out_of_range_is_invalid_index() {
        let mut s = set(&[("A", 1), ("B", 2)]);
        let before = s.clone();

        for target in [0, -1, 3, 5] {
            let err = s
                .swap_by_target_index("A", TargetIndex::new(target))
                .unwrap_err();
            assert!(matches!(err, OrderError::InvalidIndex(_)), "{}", target);
        }
        assert_eq!(s, before);
    }

    #[test]
    fn swap_checks_source_before_index() {
        let mut s = set(&[("A", 1)]);
        assert_eq!(
            s.swap_by_target_index("Z", TargetIndex::new(99)),
            Err(OrderError::NotFound("Z".to_string()))
        );
    }

    #[test]
    fn swap_with_gap_reports_missing_partner() {
        // A corrupted set: nobody sits at 2.
        let mut s = set(&[("A", 1), ("B", 3)]);
        assert_eq!(
            s.swap_by_target_index("A", TargetIndex::new(2)),
            Err(OrderError::NoSwapPartner(2))
        );
    }

    #[test]
    fn target_index_parsing() {
        assert_eq!(TargetIndex::from("3").value(), Some(3));
        assert_eq!(TargetIndex::from(" 2 ").value(), Some(2));
        assert_eq!(TargetIndex::from("two").value(), None);
        assert_eq!(TargetIndex::from("1.5").value(), None);
    }

    #[test]
    fn non_integer_target_is_invalid_index() {
        let mut s = set(&[("A", 1), ("B", 2)]);
        assert!(matches!(
            s.swap_by_target_index("A", TargetIndex::from("two")),
            Err(OrderError::InvalidIndex(_))
        ));
        assert_eq!(
            s.swap_by_target_index("Z", TargetIndex::from("two")),
            Err(OrderError::NotFound("Z".to_string()))
        );
    }

    #[test]
    fn materialize_is_stable_without_mutation() {
        let s = set(&[("B", 2), ("C", 3), ("A", 1)]);
        assert_eq!(order(&s), order(&s));
        assert_eq!(
            s.clone().into_materialized(),
            vec![item("A", 1), item("B", 2), item("C", 3)]
        );
    }

    #[test]
    fn normalize_repairs_gaps_and_duplicates() {
        let mut s = set(&[("A", 4), ("B", 4), ("C", 9)]);
        assert!(!s.is_contiguous());

        let changed = s.normalize();
        assert_eq!(changed, 3);
        assert!(s.is_contiguous());
        assert_eq!(
            order(&s),
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 2),
                ("C".to_string(), 3)
            ]
        );
        assert_eq!(s.normalize(), 0);
    }

    #[test]
    fn random_operation_sequences_stay_contiguous() {
        // Small LCG so the sequence is reproducible.
        let mut seed: u64 = 0x5eed;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound.max(1)
        };

        let mut s: SiblingSet<Item> = SiblingSet::default();
        let mut counter = 0;
        for _ in 0..500 {
            match next(3) {
                0 => {
                    counter += 1;
                    s.insert_at_front(item(&format!("i{}", counter), 0));
                }
                1 if !s.is_empty() => {
                    let pos = next(s.len() as u64) as usize;
                    let id = s.iter().nth(pos).unwrap().id.clone();
                    s.remove_by_id(&id).unwrap();
                }
                _ if !s.is_empty() => {
                    let pos = next(s.len() as u64) as usize;
                    let id = s.iter().nth(pos).unwrap().id.clone();
                    let target = next(s.len() as u64 + 2) as i64;
                    let _ = s.swap_by_target_index(&id, TargetIndex::new(target));
                }
                _ => {}
            }
            assert!(s.is_contiguous(), "set lost contiguity: {:?}", order(&s));
        }
    }
}
