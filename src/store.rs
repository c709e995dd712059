//! In-memory record stores, one per screen of the console.
//!
//! A store owns its records in display order and mints their ids from a
//! monotonic sequence, so an id is never handed out twice in a session.

use std::fmt;

use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Where a freshly created record lands in its store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Newest first
    Prepend,
    /// Newest last
    Append,
}

/// An id built from a per-store sequence number.
pub trait RecordId: Copy + Eq + fmt::Display + fmt::Debug {
    /// Sequence number carried by this id
    fn sequence(&self) -> u32;

    /// Builds the id for a given sequence number
    fn from_sequence(sequence: u32) -> Self;
}

/// The staged, id-less form of a record, as filled in by a form.
pub trait Draft: Default + Clone + fmt::Debug + Validate {
    /// Rewrites fields that depend on other fields before validation.
    fn normalize(&mut self) {}
}

/// A record managed by a [`Store`].
pub trait Record: Clone + fmt::Debug + Serialize {
    type Id: RecordId;
    type Draft: Draft;
    type Status: Copy + Eq + fmt::Display;

    /// Human name of the record kind, used in errors and logs
    const KIND: &'static str;
    const INSERTION: Insertion;

    fn id(&self) -> Self::Id;

    fn status(&self) -> Self::Status;

    fn from_draft(id: Self::Id, draft: Self::Draft) -> Self;

    fn to_draft(&self) -> Self::Draft;

    /// Builds the replacement of `self` for an edit. The id is always kept.
    fn replaced_by(&self, draft: Self::Draft) -> Self {
        Self::from_draft(self.id(), draft)
    }

    /// Values matched by free-text search
    fn search_fields(&self) -> Vec<String>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} does not exist")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid form: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No {kind} id left to hand out")]
    Exhausted { kind: &'static str },
}

impl StoreError {
    fn not_found<R: Record>(id: R::Id) -> Self {
        StoreError::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store<R: Record> {
    records: Vec<R>,
    /// `None` once the last sequence number has been handed out
    next_sequence: Option<u32>,
}

impl<R: Record> Default for Store<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R: Record> Store<R> {
    /// Builds a store from seed records, kept in the given order.
    pub fn new(records: Vec<R>) -> Self {
        let next_sequence = records
            .iter()
            .map(|record| record.id().sequence())
            .max()
            .map_or(Some(1), |max| max.checked_add(1));

        Self {
            records,
            next_sequence,
        }
    }

    pub fn list(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: R::Id) -> Result<&R, StoreError> {
        self.records
            .iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found::<R>(id))
    }

    pub(crate) fn get_mut(&mut self, id: R::Id) -> Result<&mut R, StoreError> {
        self.records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found::<R>(id))
    }

    fn position(&self, id: R::Id) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| StoreError::not_found::<R>(id))
    }

    /// Validates a draft, mints a fresh id for it and stores the new record.
    pub fn add(&mut self, draft: R::Draft) -> Result<R::Id, StoreError> {
        let draft = admit::<R>(draft)?;

        let sequence = self.next_sequence.ok_or_else(|| {
            warn!("Out of {} ids", R::KIND);
            StoreError::Exhausted { kind: R::KIND }
        })?;
        let id = R::Id::from_sequence(sequence);
        self.next_sequence = sequence.checked_add(1);

        let record = R::from_draft(id, draft);
        info!("{}", json!({ "op": "add", "kind": R::KIND, "record": &record }));

        match R::INSERTION {
            Insertion::Prepend => self.records.insert(0, record),
            Insertion::Append => self.records.push(record),
        }
        Ok(id)
    }

    /// Replaces the record `id` by the draft, in place.
    pub fn update(&mut self, id: R::Id, draft: R::Draft) -> Result<(), StoreError> {
        let index = self.position(id).inspect_err(|_| {
            warn!("Update of unknown {} {id}", R::KIND);
        })?;
        let draft = admit::<R>(draft)?;

        let record = self.records[index].replaced_by(draft);
        info!("{}", json!({ "op": "update", "kind": R::KIND, "record": &record }));
        self.records[index] = record;
        Ok(())
    }

    /// Removes the record `id`, handing it back.
    pub fn remove(&mut self, id: R::Id) -> Result<R, StoreError> {
        let index = self.position(id).inspect_err(|_| {
            warn!("Removal of unknown {} {id}", R::KIND);
        })?;

        info!("{}", json!({ "op": "remove", "kind": R::KIND, "id": id.to_string() }));
        Ok(self.records.remove(index))
    }
}

/// Normalizes then validates a draft at the store boundary
fn admit<R: Record>(mut draft: R::Draft) -> Result<R::Draft, StoreError> {
    draft.normalize();
    if let Err(errors) = draft.validate() {
        warn!("Rejected {} form: {errors}", R::KIND);
        return Err(errors.into());
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonorDraft, DonorId, UserDraft, UserId};
    use crate::seed;

    fn donor_draft(name: &str) -> DonorDraft {
        DonorDraft {
            name: name.to_owned(),
            age: 30,
            contact: "+1 555-0199".to_owned(),
            ..DonorDraft::default()
        }
    }

    #[test]
    fn test_sequence_starts_after_seed() {
        let mut store = Store::new(seed::initial_donors());
        let id = store.add(donor_draft("Maria Garcia")).unwrap();
        assert_eq!(id, DonorId::from_sequence(4));
        assert_eq!(id.to_string(), "D-004");
    }

    #[test]
    fn test_empty_store_starts_at_one() {
        let mut store = Store::<crate::models::AppUser>::default();
        let draft = UserDraft {
            full_name: "Test User".to_owned(),
            email: "test.user@hemolife.org".to_owned(),
            phone: "+1 555-0100".to_owned(),
            address: "1 Main Street".to_owned(),
            ..UserDraft::default()
        };
        assert_eq!(store.add(draft).unwrap(), UserId::from_sequence(1));
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let mut store = Store::new(seed::initial_donors());
        let id = store.add(donor_draft("Maria Garcia")).unwrap();
        assert_eq!(store.list()[0].id(), id);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut store = Store::new(seed::initial_donors());
        let first = store.add(donor_draft("Maria Garcia")).unwrap();
        store.remove(first).unwrap();
        let second = store.add(donor_draft("Maria Garcia")).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_last_sequence_handed_out_once() {
        let mut last = seed::initial_donors().remove(0);
        last.id = DonorId::from_sequence(u32::MAX - 1);
        let mut store = Store::new(vec![last]);

        let id = store.add(donor_draft("Maria Garcia")).unwrap();
        assert_eq!(id.sequence(), u32::MAX);

        let err = store.add(donor_draft("Maria Garcia")).unwrap_err();
        assert!(matches!(err, StoreError::Exhausted { kind: "donor" }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.list().iter().filter(|d| d.id == id).count(), 1);
    }

    #[test]
    fn test_seed_at_last_sequence_is_exhausted() {
        let mut last = seed::initial_donors().remove(0);
        last.id = DonorId::from_sequence(u32::MAX);
        let mut store = Store::new(vec![last]);

        assert!(matches!(
            store.add(donor_draft("Maria Garcia")),
            Err(StoreError::Exhausted { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_position_and_id() {
        let mut store = Store::new(seed::initial_donors());
        let target = store.list()[1].id();
        store.update(target, donor_draft("Jane Doe")).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.list()[1].id(), target);
        assert_eq!(store.list()[1].name, "Jane Doe");
    }

    #[test]
    fn test_unknown_id_leaves_store_unchanged() {
        let mut store = Store::new(seed::initial_donors());
        let missing = DonorId::from_sequence(999);

        assert!(matches!(store.remove(missing), Err(StoreError::NotFound { .. })));
        assert!(matches!(
            store.update(missing, donor_draft("Nobody")),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.len(), 3);
        assert!(store.list().iter().all(|d| d.name != "Nobody"));
    }

    #[test]
    fn test_invalid_draft_rejected() {
        let mut store = Store::new(seed::initial_donors());
        let err = store.add(donor_draft("   ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_not_found_message() {
        let store = Store::new(seed::initial_donors());
        let err = store.get(DonorId::from_sequence(42)).unwrap_err();
        assert_eq!(err.to_string(), "donor D-042 does not exist");
    }
}
