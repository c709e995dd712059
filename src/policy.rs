//! Which issue-blood form fields a requester fills in.
//!
//! The requester kind ([`UserType`]) selects, through a static table, whether
//! each governed field is asked for or suppressed and filled with a fixed
//! value. Suppressed fields are overwritten every time the policy runs, so
//! whatever was typed into them never reaches a stored request.

use derive_more::Display;
use serde::Serialize;
use strum_macros::EnumIter;

use crate::models::{RequestDraft, Urgency};

/// Facility credited when a donor walks in
pub const DONATION_FACILITY: &str = "HemoLife Central Blood Bank";
pub const DONATION_PURPOSE: &str = "Blood Donation";
pub const SELF_REFERRAL: &str = "Self";

/// Who is filling in the issue-blood form
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum UserType {
    Donor,
    Receiver,
}

/// Form fields whose presence depends on the [`UserType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum GovernedField {
    Hospital,
    Urgency,
    Purpose,
    #[display("Referred by")]
    ReferredBy,
    Amount,
}

/// Value given to a suppressed field. Each variant names the field it fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Hospital(&'static str),
    Urgency(Urgency),
    Purpose(&'static str),
    ReferredBy(&'static str),
    Amount(f64),
}

impl FieldDefault {
    pub fn field(&self) -> GovernedField {
        match self {
            FieldDefault::Hospital(_) => GovernedField::Hospital,
            FieldDefault::Urgency(_) => GovernedField::Urgency,
            FieldDefault::Purpose(_) => GovernedField::Purpose,
            FieldDefault::ReferredBy(_) => GovernedField::ReferredBy,
            FieldDefault::Amount(_) => GovernedField::Amount,
        }
    }

    fn fill(&self, draft: &mut RequestDraft) {
        match *self {
            FieldDefault::Hospital(text) => draft.hospital = text.to_owned(),
            FieldDefault::Urgency(urgency) => draft.urgency = urgency,
            FieldDefault::Purpose(text) => draft.purpose = text.to_owned(),
            FieldDefault::ReferredBy(text) => draft.referred_by = text.to_owned(),
            FieldDefault::Amount(amount) => draft.amount = amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Shown, and must be filled in
    Required(GovernedField),
    /// Hidden, and forced to the given value
    Suppressed(FieldDefault),
}

impl FieldRule {
    pub fn field(&self) -> GovernedField {
        match self {
            FieldRule::Required(field) => *field,
            FieldRule::Suppressed(default) => default.field(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldRule::Required(_))
    }
}

type RuleTable = [FieldRule; 5];

const DONOR_RULES: RuleTable = [
    FieldRule::Suppressed(FieldDefault::Hospital(DONATION_FACILITY)),
    FieldRule::Suppressed(FieldDefault::Urgency(Urgency::Normal)),
    FieldRule::Suppressed(FieldDefault::Purpose(DONATION_PURPOSE)),
    FieldRule::Suppressed(FieldDefault::ReferredBy(SELF_REFERRAL)),
    FieldRule::Suppressed(FieldDefault::Amount(0.0)),
];

const RECEIVER_RULES: RuleTable = [
    FieldRule::Required(GovernedField::Hospital),
    FieldRule::Required(GovernedField::Urgency),
    FieldRule::Required(GovernedField::Purpose),
    FieldRule::Required(GovernedField::ReferredBy),
    FieldRule::Required(GovernedField::Amount),
];

pub fn rules(user_type: UserType) -> &'static RuleTable {
    match user_type {
        UserType::Donor => &DONOR_RULES,
        UserType::Receiver => &RECEIVER_RULES,
    }
}

pub fn rule(user_type: UserType, field: GovernedField) -> FieldRule {
    rules(user_type)
        .iter()
        .find(|rule| rule.field() == field)
        .copied()
        .unwrap_or(FieldRule::Required(field))
}

pub fn is_visible(user_type: UserType, field: GovernedField) -> bool {
    rule(user_type, field).is_required()
}

/// Visible fields are exactly the required ones
pub fn is_required(user_type: UserType, field: GovernedField) -> bool {
    is_visible(user_type, field)
}

pub fn visible_fields(user_type: UserType) -> Vec<GovernedField> {
    rules(user_type)
        .iter()
        .filter(|rule| rule.is_required())
        .map(FieldRule::field)
        .collect()
}

/// Forces every suppressed field of the draft to its default.
pub fn apply(user_type: UserType, draft: &mut RequestDraft) {
    for rule in rules(user_type) {
        if let FieldRule::Suppressed(default) = rule {
            default.fill(draft);
        }
    }
}

/// Blanks every governed field, as on a freshly opened form
pub fn reset_governed(draft: &mut RequestDraft) {
    let blank = RequestDraft::default();
    draft.hospital = blank.hospital;
    draft.urgency = blank.urgency;
    draft.purpose = blank.purpose;
    draft.referred_by = blank.referred_by;
    draft.amount = blank.amount;
}
