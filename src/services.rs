//! Application state, and the single entry point for every mutation.

use derive_more::Display;
use log::{info, warn};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};
use thiserror::Error;

use crate::form::{FormError, FormMode, FormModal};
use crate::models::*;
use crate::seed;
use crate::store::{Record, Store, StoreError};

/// The screens of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum View {
    #[default]
    Dashboard,
    Inventory,
    Collection,
    #[display("Issue Blood")]
    Issue,
    Donors,
    Users,
    Assistant,
}

impl View {
    /// Unknown names fall back to the dashboard.
    pub fn parse(name: &str) -> View {
        name.trim().parse().unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("Request {id} is {from}, it cannot become {to}")]
    InvalidTransition {
        id: String,
        from: RequestStatus,
        to: RequestStatus,
    },
}

pub struct BloodBank {
    view: View,
    units: Store<BloodUnit>,
    donors: Store<Donor>,
    collections: Store<Collection>,
    requests: Store<BloodRequest>,
    users: Store<AppUser>,
}

impl Default for BloodBank {
    fn default() -> Self {
        Self::seeded()
    }
}

impl BloodBank {
    pub fn new(
        units: Vec<BloodUnit>,
        donors: Vec<Donor>,
        collections: Vec<Collection>,
        requests: Vec<BloodRequest>,
        users: Vec<AppUser>,
    ) -> Self {
        Self {
            view: View::default(),
            units: Store::new(units),
            donors: Store::new(donors),
            collections: Store::new(collections),
            requests: Store::new(requests),
            users: Store::new(users),
        }
    }

    /// A bank holding the start-up records
    pub fn seeded() -> Self {
        Self::new(
            seed::initial_units(),
            seed::initial_donors(),
            seed::initial_collections(),
            seed::initial_requests(),
            seed::initial_users(),
        )
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn select_view(&mut self, view: View) {
        info!("Switching to {view}");
        self.view = view;
    }

    pub fn units(&self) -> &Store<BloodUnit> {
        &self.units
    }

    pub fn donors(&self) -> &Store<Donor> {
        &self.donors
    }

    pub fn collections(&self) -> &Store<Collection> {
        &self.collections
    }

    pub fn requests(&self) -> &Store<BloodRequest> {
        &self.requests
    }

    pub fn users(&self) -> &Store<AppUser> {
        &self.users
    }

    pub fn add_unit(&mut self, draft: UnitDraft) -> Result<UnitId, ServiceError> {
        Ok(self.units.add(draft)?)
    }

    pub fn update_unit(&mut self, id: UnitId, draft: UnitDraft) -> Result<(), ServiceError> {
        Ok(self.units.update(id, draft)?)
    }

    pub fn delete_unit(&mut self, id: UnitId) -> Result<(), ServiceError> {
        self.units.remove(id)?;
        Ok(())
    }

    pub fn add_donor(&mut self, draft: DonorDraft) -> Result<DonorId, ServiceError> {
        Ok(self.donors.add(draft)?)
    }

    pub fn update_donor(&mut self, id: DonorId, draft: DonorDraft) -> Result<(), ServiceError> {
        Ok(self.donors.update(id, draft)?)
    }

    pub fn delete_donor(&mut self, id: DonorId) -> Result<(), ServiceError> {
        self.donors.remove(id)?;
        Ok(())
    }

    pub fn add_collection(&mut self, draft: CollectionDraft) -> Result<CollectionId, ServiceError> {
        Ok(self.collections.add(draft)?)
    }

    pub fn update_collection(
        &mut self,
        id: CollectionId,
        draft: CollectionDraft,
    ) -> Result<(), ServiceError> {
        Ok(self.collections.update(id, draft)?)
    }

    pub fn delete_collection(&mut self, id: CollectionId) -> Result<(), ServiceError> {
        self.collections.remove(id)?;
        Ok(())
    }

    pub fn add_request(&mut self, draft: RequestDraft) -> Result<RequestId, ServiceError> {
        Ok(self.requests.add(draft)?)
    }

    pub fn update_request(&mut self, id: RequestId, draft: RequestDraft) -> Result<(), ServiceError> {
        Ok(self.requests.update(id, draft)?)
    }

    pub fn delete_request(&mut self, id: RequestId) -> Result<(), ServiceError> {
        self.requests.remove(id)?;
        Ok(())
    }

    /// Saves the draft of an open form through the matching `add_*` or
    /// `update_*` entry point, then closes the form.
    pub fn submit<R: BankRecord>(&mut self, modal: &mut FormModal<R>) -> Result<R::Id, ServiceError> {
        modal.submit_with(|mode, draft| R::save(self, mode, draft))
    }

    pub fn delete<R: BankRecord>(&mut self, id: R::Id) -> Result<(), ServiceError> {
        R::delete(self, id)
    }

    /// Pending → Approved
    pub fn approve_request(&mut self, id: RequestId) -> Result<(), ServiceError> {
        self.advance_request(id, RequestStatus::Pending, RequestStatus::Approved)
    }

    /// Approved → Dispatched
    pub fn dispatch_request(&mut self, id: RequestId) -> Result<(), ServiceError> {
        self.advance_request(id, RequestStatus::Approved, RequestStatus::Dispatched)
    }

    fn advance_request(
        &mut self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<(), ServiceError> {
        let request = self.requests.get_mut(id)?;

        if request.status != expected {
            warn!("Request {id} is {}, refusing {next}", request.status);
            return Err(ServiceError::InvalidTransition {
                id: id.to_string(),
                from: request.status,
                to: next,
            });
        }

        request.status = next;
        info!("Request {id} is now {next}");
        Ok(())
    }

    /// Requests in the given workflow status, in list order
    pub fn requests_in(&self, status: RequestStatus) -> Vec<&BloodRequest> {
        self.requests
            .list()
            .iter()
            .filter(|request| request.status == status)
            .collect()
    }

    /// Requests still to be served, most urgent first
    pub fn dispatch_queue(&self) -> Vec<&BloodRequest> {
        let mut queue: Vec<&BloodRequest> = self
            .requests
            .list()
            .iter()
            .filter(|request| request.status != RequestStatus::Dispatched)
            .collect();
        queue.sort_by_key(|request| request.urgency);
        queue
    }

    pub fn add_user(&mut self, draft: UserDraft) -> Result<UserId, ServiceError> {
        Ok(self.users.add(draft)?)
    }

    pub fn update_user(&mut self, id: UserId, draft: UserDraft) -> Result<(), ServiceError> {
        Ok(self.users.update(id, draft)?)
    }

    pub fn delete_user(&mut self, id: UserId) -> Result<(), ServiceError> {
        self.users.remove(id)?;
        Ok(())
    }

    /// Available units per blood group, in canonical group order
    pub fn stock_by_group(&self) -> Vec<(BloodGroup, usize)> {
        BloodGroup::iter()
            .map(|group| {
                let count = self
                    .units
                    .list()
                    .iter()
                    .filter(|unit| unit.blood_group == group && unit.status == UnitStatus::Available)
                    .count();
                (group, count)
            })
            .collect()
    }

    pub fn available_units(&self) -> usize {
        self.units
            .list()
            .iter()
            .filter(|unit| unit.status == UnitStatus::Available)
            .count()
    }

    /// Blood groups with fewer than `threshold` available units
    pub fn low_stock(&self, threshold: usize) -> Vec<BloodGroup> {
        self.stock_by_group()
            .into_iter()
            .filter(|(_, count)| *count < threshold)
            .map(|(group, _)| group)
            .collect()
    }

    /// Collections per lab status
    pub fn collection_summary(&self) -> Vec<(CollectionStatus, usize)> {
        CollectionStatus::iter()
            .map(|status| {
                let count = self
                    .collections
                    .list()
                    .iter()
                    .filter(|collection| collection.status == status)
                    .count();
                (status, count)
            })
            .collect()
    }
}

/// A record kind held by the bank, with its entry points
pub trait BankRecord: Record {
    fn store(bank: &BloodBank) -> &Store<Self>;

    fn save(
        bank: &mut BloodBank,
        mode: FormMode<Self::Id>,
        draft: Self::Draft,
    ) -> Result<Self::Id, ServiceError>;

    fn delete(bank: &mut BloodBank, id: Self::Id) -> Result<(), ServiceError>;
}

macro_rules! bank_record {
    ($record:ty, $store:ident, $add:ident, $update:ident, $delete:ident) => {
        impl BankRecord for $record {
            fn store(bank: &BloodBank) -> &Store<Self> {
                bank.$store()
            }

            fn save(
                bank: &mut BloodBank,
                mode: FormMode<Self::Id>,
                draft: Self::Draft,
            ) -> Result<Self::Id, ServiceError> {
                match mode {
                    FormMode::Create => bank.$add(draft),
                    FormMode::Edit(id) => bank.$update(id, draft).map(|()| id),
                }
            }

            fn delete(bank: &mut BloodBank, id: Self::Id) -> Result<(), ServiceError> {
                bank.$delete(id)
            }
        }
    };
}

bank_record!(BloodUnit, units, add_unit, update_unit, delete_unit);
bank_record!(Donor, donors, add_donor, update_donor, delete_donor);
bank_record!(Collection, collections, add_collection, update_collection, delete_collection);
bank_record!(BloodRequest, requests, add_request, update_request, delete_request);
bank_record!(AppUser, users, add_user, update_user, delete_user);
