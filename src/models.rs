//! Data model of the blood bank

use chrono::{Datelike, Days, Local, NaiveDate};
use derive_more::Display;
use serde::{Serialize, Serializer};
use strum_macros::EnumIter;
use validator::{Validate, ValidationError};

use crate::policy::{self, UserType};
use crate::store::{Draft, Insertion, Record, RecordId};
use crate::utils::input_validation::{validate_amount, validate_contact, validate_not_blank};

/// Shelf life of a whole-blood unit, in days
pub const SHELF_LIFE_DAYS: u64 = 42;

/// Volume of a standard whole-blood bag
pub const STANDARD_VOLUME_ML: u32 = 450;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// A blood group in the ABO/Rh system
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum BloodGroup {
    #[default]
    #[serde(rename = "A+")]
    #[display("A+")]
    APos,
    #[serde(rename = "A-")]
    #[display("A-")]
    ANeg,
    #[serde(rename = "B+")]
    #[display("B+")]
    BPos,
    #[serde(rename = "B-")]
    #[display("B-")]
    BNeg,
    #[serde(rename = "AB+")]
    #[display("AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    #[display("AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    #[display("O+")]
    OPos,
    #[serde(rename = "O-")]
    #[display("O-")]
    ONeg,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum UnitStatus {
    #[default]
    Available,
    Reserved,
    Expired,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum DonorStatus {
    #[default]
    Active,
    Deferred,
}

/// Priority of a blood request. Declaration order is dispatch order.
#[derive(
    Debug, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Display, Default,
)]
pub enum Urgency {
    Critical,
    High,
    #[default]
    Normal,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Dispatched,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// Blood product obtained from a donation
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum ProductType {
    #[default]
    #[display("Whole Blood")]
    WholeBlood,
    Platelets,
    Plasma,
}

/// Lab processing state of a collection
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Default)]
pub enum CollectionStatus {
    Processed,
    #[default]
    Testing,
    Rejected,
}

// Prefixed ids are logged the way they are displayed
macro_rules! serialize_as_display {
    ($($id:ty),*) => {
        $(
            impl Serialize for $id {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.collect_str(self)
                }
            }
        )*
    };
}

/// Id of a blood unit, such as `BU-1001`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display)]
#[display("BU-{_0}")]
pub struct UnitId(u32);

/// Id of a donor, such as `D-001`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display)]
#[display("D-{_0:03}")]
pub struct DonorId(u32);

/// Id of a collection, such as `COL-8821`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display)]
#[display("COL-{_0}")]
pub struct CollectionId(u32);

/// Id of a blood request, such as `REQ-2023-001`.
///
/// The year is informative only: the sequence alone identifies the request.
#[derive(Debug, Clone, Copy, Display)]
#[display("REQ-{year}-{sequence:03}")]
pub struct RequestId {
    year: i32,
    sequence: u32,
}

/// Id of an application user
#[derive(Debug, Serialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display)]
pub struct UserId(u32);

serialize_as_display!(UnitId, DonorId, CollectionId, RequestId);

impl RecordId for UnitId {
    fn sequence(&self) -> u32 {
        self.0
    }

    fn from_sequence(sequence: u32) -> Self {
        Self(sequence)
    }
}

impl RecordId for DonorId {
    fn sequence(&self) -> u32 {
        self.0
    }

    fn from_sequence(sequence: u32) -> Self {
        Self(sequence)
    }
}

impl RecordId for CollectionId {
    fn sequence(&self) -> u32 {
        self.0
    }

    fn from_sequence(sequence: u32) -> Self {
        Self(sequence)
    }
}

impl RequestId {
    pub fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for RequestId {}

impl RecordId for RequestId {
    fn sequence(&self) -> u32 {
        self.sequence
    }

    /// New requests are stamped with the current year
    fn from_sequence(sequence: u32) -> Self {
        Self::new(today().year(), sequence)
    }
}

impl RecordId for UserId {
    fn sequence(&self) -> u32 {
        self.0
    }

    fn from_sequence(sequence: u32) -> Self {
        Self(sequence)
    }
}

/// A bag of blood in the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[display("{id}  {blood_group}  {volume} ml  collected {collection_date}  expires {expiry_date}  [{status}]")]
#[serde(rename_all = "camelCase")]
pub struct BloodUnit {
    pub id: UnitId,
    pub blood_group: BloodGroup,
    pub collection_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub volume: u32,
    pub status: UnitStatus,
}

#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "validate_unit_dates"))]
pub struct UnitDraft {
    pub blood_group: BloodGroup,
    pub collection_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[validate(range(min = 1, max = 1000))]
    pub volume: u32,
    pub status: UnitStatus,
}

impl Default for UnitDraft {
    /// A standard bag collected today
    fn default() -> Self {
        let collection_date = today();
        Self {
            blood_group: BloodGroup::default(),
            collection_date,
            expiry_date: collection_date
                .checked_add_days(Days::new(SHELF_LIFE_DAYS))
                .unwrap_or(collection_date),
            volume: STANDARD_VOLUME_ML,
            status: UnitStatus::default(),
        }
    }
}

fn validate_unit_dates(draft: &UnitDraft) -> Result<(), ValidationError> {
    if draft.expiry_date < draft.collection_date {
        return Err(ValidationError::new("dates")
            .with_message("expiry date is before collection date".into()));
    }
    Ok(())
}

impl Draft for UnitDraft {}

impl Record for BloodUnit {
    type Id = UnitId;
    type Draft = UnitDraft;
    type Status = UnitStatus;

    const KIND: &'static str = "blood unit";
    const INSERTION: Insertion = Insertion::Prepend;

    fn id(&self) -> UnitId {
        self.id
    }

    fn status(&self) -> UnitStatus {
        self.status
    }

    fn from_draft(id: UnitId, draft: UnitDraft) -> Self {
        let UnitDraft {
            blood_group,
            collection_date,
            expiry_date,
            volume,
            status,
        } = draft;
        Self {
            id,
            blood_group,
            collection_date,
            expiry_date,
            volume,
            status,
        }
    }

    fn to_draft(&self) -> UnitDraft {
        UnitDraft {
            blood_group: self.blood_group,
            collection_date: self.collection_date,
            expiry_date: self.expiry_date,
            volume: self.volume,
            status: self.status,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.blood_group.to_string(),
            self.status.to_string(),
        ]
    }
}

/// A registered blood donor
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[display("{id}  {name} ({age})  {blood_group}  {contact}  last donation {last_donation_date}  [{status}]")]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    pub age: u32,
    pub blood_group: BloodGroup,
    pub contact: String,
    pub last_donation_date: NaiveDate,
    pub status: DonorStatus,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct DonorDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    pub age: u32,
    pub blood_group: BloodGroup,
    #[validate(custom(function = "validate_contact"))]
    pub contact: String,
    pub last_donation_date: NaiveDate,
    pub status: DonorStatus,
}

impl Default for DonorDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 0,
            blood_group: BloodGroup::default(),
            contact: String::new(),
            last_donation_date: today(),
            status: DonorStatus::default(),
        }
    }
}

impl Draft for DonorDraft {}

impl Record for Donor {
    type Id = DonorId;
    type Draft = DonorDraft;
    type Status = DonorStatus;

    const KIND: &'static str = "donor";
    const INSERTION: Insertion = Insertion::Prepend;

    fn id(&self) -> DonorId {
        self.id
    }

    fn status(&self) -> DonorStatus {
        self.status
    }

    fn from_draft(id: DonorId, draft: DonorDraft) -> Self {
        let DonorDraft {
            name,
            age,
            blood_group,
            contact,
            last_donation_date,
            status,
        } = draft;
        Self {
            id,
            name: name.trim().to_owned(),
            age,
            blood_group,
            contact: contact.trim().to_owned(),
            last_donation_date,
            status,
        }
    }

    fn to_draft(&self) -> DonorDraft {
        DonorDraft {
            name: self.name.clone(),
            age: self.age,
            blood_group: self.blood_group,
            contact: self.contact.clone(),
            last_donation_date: self.last_donation_date,
            status: self.status,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.blood_group.to_string(),
            self.contact.clone(),
        ]
    }
}

/// A donation going through the lab
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[display("{id}  {donor}  {product}  {amount} ml  {date}  [{status}]")]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub donor: String,
    pub product: ProductType,
    pub amount: u32,
    pub date: NaiveDate,
    pub status: CollectionStatus,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CollectionDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub donor: String,
    pub product: ProductType,
    #[validate(range(min = 1, max = 1000))]
    pub amount: u32,
    pub date: NaiveDate,
    pub status: CollectionStatus,
}

impl Default for CollectionDraft {
    fn default() -> Self {
        Self {
            donor: String::new(),
            product: ProductType::default(),
            amount: STANDARD_VOLUME_ML,
            date: today(),
            status: CollectionStatus::default(),
        }
    }
}

impl Draft for CollectionDraft {}

impl Record for Collection {
    type Id = CollectionId;
    type Draft = CollectionDraft;
    type Status = CollectionStatus;

    const KIND: &'static str = "collection";
    const INSERTION: Insertion = Insertion::Prepend;

    fn id(&self) -> CollectionId {
        self.id
    }

    fn status(&self) -> CollectionStatus {
        self.status
    }

    fn from_draft(id: CollectionId, draft: CollectionDraft) -> Self {
        Self {
            id,
            donor: draft.donor.trim().to_owned(),
            product: draft.product,
            amount: draft.amount,
            date: draft.date,
            status: draft.status,
        }
    }

    fn to_draft(&self) -> CollectionDraft {
        CollectionDraft {
            donor: self.donor.clone(),
            product: self.product,
            amount: self.amount,
            date: self.date,
            status: self.status,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.donor.clone(),
            self.product.to_string(),
        ]
    }
}

/// A request for blood, from a hospital or a walk-in donor
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[display("{id}  {hospital}  {patient}  {blood_group} x{quantity}  {urgency}  [{status}]")]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    pub id: RequestId,
    pub hospital: String,
    pub patient: String,
    pub email: String,
    pub blood_group: BloodGroup,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub quantity: u32,
    pub purpose: String,
    pub referred_by: String,
    pub user_type: UserType,
    pub amount: f64,
}

/// Issue-blood form. The fields governed by [`policy`] depend on `user_type`,
/// which is changed through [`RequestDraft::set_user_type`].
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct RequestDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub hospital: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub patient: String,
    #[validate(email)]
    pub email: String,
    pub blood_group: BloodGroup,
    pub urgency: Urgency,
    #[validate(range(min = 1, max = 10))]
    pub quantity: u32,
    #[validate(custom(function = "validate_not_blank"))]
    pub purpose: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub referred_by: String,
    user_type: UserType,
    #[validate(custom(function = "validate_amount"))]
    pub amount: f64,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            hospital: String::new(),
            patient: String::new(),
            email: String::new(),
            blood_group: BloodGroup::default(),
            urgency: Urgency::default(),
            quantity: 1,
            purpose: String::new(),
            referred_by: String::new(),
            user_type: UserType::Receiver,
            amount: 0.0,
        }
    }
}

impl RequestDraft {
    /// A blank form for the given kind of requester
    pub fn for_user_type(user_type: UserType) -> Self {
        let mut draft = Self::default();
        draft.set_user_type(user_type);
        draft
    }

    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    /// Switches the discriminator. Every governed field is reset so nothing
    /// typed under the previous requester kind survives the switch.
    pub fn set_user_type(&mut self, user_type: UserType) {
        if self.user_type != user_type {
            policy::reset_governed(self);
            self.user_type = user_type;
        }
        policy::apply(user_type, self);
    }
}

impl Draft for RequestDraft {
    fn normalize(&mut self) {
        policy::apply(self.user_type, self);
    }
}

impl Record for BloodRequest {
    type Id = RequestId;
    type Draft = RequestDraft;
    type Status = RequestStatus;

    const KIND: &'static str = "request";
    const INSERTION: Insertion = Insertion::Prepend;

    fn id(&self) -> RequestId {
        self.id
    }

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn from_draft(id: RequestId, draft: RequestDraft) -> Self {
        Self {
            id,
            hospital: draft.hospital.trim().to_owned(),
            patient: draft.patient.trim().to_owned(),
            email: draft.email.trim().to_lowercase(),
            blood_group: draft.blood_group,
            urgency: draft.urgency,
            status: RequestStatus::Pending,
            quantity: draft.quantity,
            purpose: draft.purpose.trim().to_owned(),
            referred_by: draft.referred_by.trim().to_owned(),
            user_type: draft.user_type,
            amount: draft.amount,
        }
    }

    fn to_draft(&self) -> RequestDraft {
        RequestDraft {
            hospital: self.hospital.clone(),
            patient: self.patient.clone(),
            email: self.email.clone(),
            blood_group: self.blood_group,
            urgency: self.urgency,
            quantity: self.quantity,
            purpose: self.purpose.clone(),
            referred_by: self.referred_by.clone(),
            user_type: self.user_type,
            amount: self.amount,
        }
    }

    /// Status only moves through the approval workflow, never through the form
    fn replaced_by(&self, draft: RequestDraft) -> Self {
        Self {
            status: self.status,
            ..Self::from_draft(self.id, draft)
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.hospital.clone(),
            self.patient.clone(),
        ]
    }
}

/// A staff member with access to the console
#[derive(Debug, Clone, PartialEq, Serialize, Display)]
#[display("#{id}  {full_name}  {role}  {email}  {phone}  [{status}]")]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub id: UserId,
    pub full_name: String,
    pub age: u32,
    pub sex: Sex,
    pub blood_group: BloodGroup,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: String,
    pub status: UserStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Validate)]
pub struct UserDraft {
    #[validate(custom(function = "validate_not_blank"))]
    pub full_name: String,
    pub age: u32,
    pub sex: Sex,
    pub blood_group: BloodGroup,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_contact"))]
    pub phone: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub address: String,
    pub role: String,
    pub status: UserStatus,
}

impl Draft for UserDraft {}

impl Record for AppUser {
    type Id = UserId;
    type Draft = UserDraft;
    type Status = UserStatus;

    const KIND: &'static str = "user";
    const INSERTION: Insertion = Insertion::Append;

    fn id(&self) -> UserId {
        self.id
    }

    fn status(&self) -> UserStatus {
        self.status
    }

    fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            full_name: draft.full_name.trim().to_owned(),
            age: draft.age,
            sex: draft.sex,
            blood_group: draft.blood_group,
            email: draft.email.trim().to_lowercase(),
            phone: draft.phone.trim().to_owned(),
            address: draft.address.trim().to_owned(),
            role: draft.role.trim().to_owned(),
            status: draft.status,
        }
    }

    fn to_draft(&self) -> UserDraft {
        UserDraft {
            full_name: self.full_name.clone(),
            age: self.age,
            sex: self.sex,
            blood_group: self.blood_group,
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            role: self.role.clone(),
            status: self.status,
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.full_name.clone(),
            self.email.clone(),
            self.role.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_blood_groups_are_the_eight_abo_rh_values() {
        let groups: Vec<String> = BloodGroup::iter().map(|g| g.to_string()).collect();
        assert_eq!(groups, ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"]);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UnitId::from_sequence(1001).to_string(), "BU-1001");
        assert_eq!(DonorId::from_sequence(2).to_string(), "D-002");
        assert_eq!(CollectionId::from_sequence(8821).to_string(), "COL-8821");
        assert_eq!(RequestId::new(2023, 4).to_string(), "REQ-2023-004");
        assert_eq!(UserId::from_sequence(7).to_string(), "7");
    }

    #[test]
    fn test_request_ids_compare_by_sequence() {
        assert_eq!(RequestId::new(2023, 4), RequestId::new(2026, 4));
        assert_ne!(RequestId::new(2023, 4), RequestId::new(2023, 5));
    }

    #[test]
    fn test_urgency_orders_critical_first() {
        let mut tiers = vec![Urgency::Normal, Urgency::Critical, Urgency::High];
        tiers.sort();
        assert_eq!(tiers, [Urgency::Critical, Urgency::High, Urgency::Normal]);
    }

    #[test]
    fn test_unit_draft_defaults_to_standard_bag() {
        let draft = UnitDraft::default();
        assert_eq!(draft.volume, STANDARD_VOLUME_ML);
        assert_eq!((draft.expiry_date - draft.collection_date).num_days(), 42);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_unit_expiring_before_collection_is_invalid() {
        let mut draft = UnitDraft::default();
        draft.expiry_date = draft.collection_date.pred_opt().unwrap();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        let cases = vec![(0, false), (1, true), (10, true), (11, false)];

        for (quantity, expected_valid) in cases {
            let mut draft = RequestDraft::for_user_type(UserType::Receiver);
            draft.hospital = "City General Hospital".to_owned();
            draft.patient = "Alice Williams".to_owned();
            draft.email = "alice@example.com".to_owned();
            draft.purpose = "Surgery".to_owned();
            draft.referred_by = "Dr. House".to_owned();
            draft.quantity = quantity;
            assert_eq!(draft.validate().is_ok(), expected_valid,
                       "Quantity {} validation result was unexpected", quantity);
        }
    }

    #[test]
    fn test_user_email_must_be_valid() {
        let draft = UserDraft {
            full_name: "Test User".to_owned(),
            email: "not-an-email".to_owned(),
            phone: "+1 555-0100".to_owned(),
            address: "1 Main Street".to_owned(),
            ..UserDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_request_edit_keeps_status() {
        let request = BloodRequest::from_draft(
            RequestId::new(2023, 1),
            RequestDraft::for_user_type(UserType::Donor),
        );
        let approved = BloodRequest {
            status: RequestStatus::Approved,
            ..request
        };
        let edited = approved.replaced_by(approved.to_draft());
        assert_eq!(edited.status, RequestStatus::Approved);
        assert_eq!(edited.id, approved.id);
    }
}
