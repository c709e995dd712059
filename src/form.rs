//! Editing surface shared by every screen.
//!
//! A [`FormModal`] is either closed, or open on a draft that is being created
//! or edited. Nothing reaches the store until [`FormModal::submit`].

use log::info;
use thiserror::Error;

use crate::store::{Record, Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("No form is open")]
    NotOpen,

    #[error("A form is already open")]
    AlreadyOpen,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub enum FormModal<R: Record> {
    Closed,
    Open {
        mode: FormMode<R::Id>,
        draft: R::Draft,
    },
}

impl<R: Record> Default for FormModal<R> {
    fn default() -> Self {
        FormModal::Closed
    }
}

impl<R: Record> FormModal<R> {
    pub fn is_open(&self) -> bool {
        matches!(self, FormModal::Open { .. })
    }

    pub fn mode(&self) -> Option<FormMode<R::Id>> {
        match self {
            FormModal::Closed => None,
            FormModal::Open { mode, .. } => Some(*mode),
        }
    }

    pub fn draft(&self) -> Option<&R::Draft> {
        match self {
            FormModal::Closed => None,
            FormModal::Open { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        match self {
            FormModal::Closed => None,
            FormModal::Open { draft, .. } => Some(draft),
        }
    }

    /// "Add": opens on a blank draft.
    pub fn open_create(&mut self) -> Result<(), FormError> {
        self.open(FormMode::Create, R::Draft::default())
    }

    /// "Edit": opens on a copy of the stored record `id`.
    pub fn open_edit(&mut self, store: &Store<R>, id: R::Id) -> Result<(), FormError> {
        if self.is_open() {
            return Err(FormError::AlreadyOpen);
        }
        let draft = store.get(id)?.to_draft();
        self.open(FormMode::Edit(id), draft)
    }

    fn open(&mut self, mode: FormMode<R::Id>, draft: R::Draft) -> Result<(), FormError> {
        if self.is_open() {
            return Err(FormError::AlreadyOpen);
        }
        *self = FormModal::Open { mode, draft };
        Ok(())
    }

    /// Closes the form, dropping the draft.
    pub fn cancel(&mut self) {
        if self.is_open() {
            info!("{} form cancelled", R::KIND);
        }
        *self = FormModal::Closed;
    }

    /// Sends the draft to the store and closes the form.
    ///
    /// When the store refuses the draft the form stays open with the draft
    /// untouched, ready to be corrected.
    pub fn submit(&mut self, store: &mut Store<R>) -> Result<R::Id, FormError> {
        self.submit_with(|mode, draft| {
            Ok(match mode {
                FormMode::Create => store.add(draft)?,
                FormMode::Edit(id) => {
                    store.update(id, draft)?;
                    id
                }
            })
        })
    }

    /// Like [`FormModal::submit`], with `save` writing the draft wherever it
    /// belongs. The form closes only when `save` succeeds.
    pub fn submit_with<E, F>(&mut self, save: F) -> Result<R::Id, E>
    where
        E: From<FormError>,
        F: FnOnce(FormMode<R::Id>, R::Draft) -> Result<R::Id, E>,
    {
        let FormModal::Open { mode, draft } = self else {
            return Err(FormError::NotOpen.into());
        };

        let id = save(*mode, draft.clone())?;
        *self = FormModal::Closed;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloodUnit, Donor, DonorId, UnitDraft};
    use crate::seed;
    use crate::store::RecordId;

    #[test]
    fn test_create_then_submit() {
        let mut store = Store::new(seed::initial_units());
        let mut modal = FormModal::<BloodUnit>::default();

        modal.open_create().unwrap();
        assert_eq!(modal.mode(), Some(FormMode::Create));
        assert_eq!(modal.draft(), Some(&UnitDraft::default()));

        modal.draft_mut().unwrap().volume = 300;
        let id = modal.submit(&mut store).unwrap();

        assert!(!modal.is_open());
        assert_eq!(store.len(), 12);
        assert_eq!(store.get(id).unwrap().volume, 300);
    }

    #[test]
    fn test_edit_prefills_draft() {
        let store = Store::new(seed::initial_donors());
        let jane = DonorId::from_sequence(2);
        let mut modal = FormModal::<Donor>::default();

        modal.open_edit(&store, jane).unwrap();
        assert_eq!(modal.mode(), Some(FormMode::Edit(jane)));
        assert_eq!(modal.draft().unwrap().name, "Jane Smith");
    }

    #[test]
    fn test_edit_submit_updates_target_only() {
        let mut store = Store::new(seed::initial_donors());
        let before = store.list().to_vec();
        let jane = DonorId::from_sequence(2);
        let mut modal = FormModal::<Donor>::default();

        modal.open_edit(&store, jane).unwrap();
        modal.draft_mut().unwrap().age = 29;
        assert_eq!(modal.submit(&mut store).unwrap(), jane);

        assert_eq!(store.len(), before.len());
        for (old, new) in before.iter().zip(store.list()) {
            if new.id == jane {
                assert_eq!(new.age, 29);
                assert_eq!(new.name, old.name);
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn test_edit_unknown_record_stays_closed() {
        let store = Store::new(seed::initial_donors());
        let mut modal = FormModal::<Donor>::default();

        let err = modal.open_edit(&store, DonorId::from_sequence(404)).unwrap_err();
        assert!(matches!(err, FormError::Store(StoreError::NotFound { .. })));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut store = Store::new(seed::initial_donors());
        let mut modal = FormModal::<Donor>::default();

        modal.open_create().unwrap();
        modal.draft_mut().unwrap().name = "Someone".to_owned();
        modal.cancel();

        assert!(!modal.is_open());
        assert!(matches!(modal.submit(&mut store), Err(FormError::NotOpen)));
        assert_eq!(store.len(), 3);

        modal.open_create().unwrap();
        assert!(modal.draft().unwrap().name.is_empty());
    }

    #[test]
    fn test_reopen_rejected() {
        let store = Store::new(seed::initial_donors());
        let mut modal = FormModal::<Donor>::default();

        modal.open_create().unwrap();
        modal.draft_mut().unwrap().name = "Kept".to_owned();

        assert!(matches!(modal.open_create(), Err(FormError::AlreadyOpen)));
        assert!(matches!(
            modal.open_edit(&store, DonorId::from_sequence(1)),
            Err(FormError::AlreadyOpen)
        ));
        assert_eq!(modal.draft().unwrap().name, "Kept");
    }

    #[test]
    fn test_invalid_submit_keeps_form_open() {
        let mut store = Store::new(seed::initial_donors());
        let mut modal = FormModal::<Donor>::default();

        modal.open_create().unwrap();
        modal.draft_mut().unwrap().name = "Maria Garcia".to_owned();
        // contact left blank

        let err = modal.submit(&mut store).unwrap_err();
        assert!(matches!(err, FormError::Store(StoreError::Validation(_))));
        assert!(modal.is_open());
        assert_eq!(modal.draft().unwrap().name, "Maria Garcia");
        assert_eq!(store.len(), 3);

        modal.draft_mut().unwrap().contact = "+1 555-0150".to_owned();
        modal.submit(&mut store).unwrap();
        assert!(!modal.is_open());
        assert_eq!(store.len(), 4);
    }
}
