//! Terminal forms: one prompt per draft field, pre-filled with the draft.

use std::fmt::Display;

use chrono::NaiveDate;
use inquire::validator::Validation;
use inquire::{CustomType, DateSelect, InquireError, Select, Text};
use strum::IntoEnumIterator;

use hemolife::models::*;
use hemolife::policy::{self, GovernedField, UserType};
use hemolife::utils::input_validation::{is_valid_amount, is_valid_contact};

type PromptResult<T> = Result<T, InquireError>;

/// A draft that can be filled in from the terminal
pub trait FillDraft {
    fn fill(&mut self) -> PromptResult<()>;
}

fn text(message: &str, current: &str) -> PromptResult<String> {
    Text::new(message).with_initial_value(current).prompt()
}

fn contact(message: &str, current: &str) -> PromptResult<String> {
    Text::new(message)
        .with_initial_value(current)
        .with_validator(|input: &str| {
            Ok(if is_valid_contact(input) {
                Validation::Valid
            } else {
                Validation::Invalid("Expected a phone number such as +1 555-0123".into())
            })
        })
        .prompt()
}

fn number(message: &str, current: u32) -> PromptResult<u32> {
    CustomType::<u32>::new(message)
        .with_default(current)
        .with_error_message("Please type a whole number")
        .prompt()
}

fn date(message: &str, current: NaiveDate) -> PromptResult<NaiveDate> {
    DateSelect::new(message).with_default(current).prompt()
}

/// Picks a variant, starting on the current one
pub fn choose<E>(message: &str, current: E) -> PromptResult<E>
where
    E: IntoEnumIterator + Display + PartialEq + Copy,
{
    let options: Vec<E> = E::iter().collect();
    let cursor = options.iter().position(|option| *option == current).unwrap_or(0);
    Select::new(message, options).with_starting_cursor(cursor).prompt()
}

impl FillDraft for UnitDraft {
    fn fill(&mut self) -> PromptResult<()> {
        self.blood_group = choose("Blood group:", self.blood_group)?;
        self.collection_date = date("Collection date:", self.collection_date)?;
        self.expiry_date = date("Expiry date:", self.expiry_date)?;
        self.volume = number("Volume (ml):", self.volume)?;
        self.status = choose("Status:", self.status)?;
        Ok(())
    }
}

impl FillDraft for DonorDraft {
    fn fill(&mut self) -> PromptResult<()> {
        self.name = text("Full name:", &self.name)?;
        self.age = number("Age:", self.age)?;
        self.blood_group = choose("Blood group:", self.blood_group)?;
        self.contact = contact("Contact number:", &self.contact)?;
        self.last_donation_date = date("Last donation:", self.last_donation_date)?;
        self.status = choose("Status:", self.status)?;
        Ok(())
    }
}

impl FillDraft for CollectionDraft {
    fn fill(&mut self) -> PromptResult<()> {
        self.donor = text("Donor:", &self.donor)?;
        self.product = choose("Product:", self.product)?;
        self.amount = number("Amount (ml):", self.amount)?;
        self.date = date("Collection date:", self.date)?;
        self.status = choose("Lab status:", self.status)?;
        Ok(())
    }
}

impl FillDraft for RequestDraft {
    /// The requester kind comes first: it decides which fields are asked.
    fn fill(&mut self) -> PromptResult<()> {
        let user_type = choose("Requester:", self.user_type())?;
        self.set_user_type(user_type);

        self.patient = text("Patient name:", &self.patient)?;
        self.email = text("Email:", &self.email)?;
        self.blood_group = choose("Blood group:", self.blood_group)?;
        self.quantity = CustomType::<u32>::new("Quantity (units):")
            .with_default(self.quantity)
            .with_validator(|quantity: &u32| {
                Ok(if (1..=10).contains(quantity) {
                    Validation::Valid
                } else {
                    Validation::Invalid("Between 1 and 10 units".into())
                })
            })
            .prompt()?;

        for field in policy::visible_fields(user_type) {
            match field {
                GovernedField::Hospital => self.hospital = text("Hospital:", &self.hospital)?,
                GovernedField::Urgency => self.urgency = choose("Urgency:", self.urgency)?,
                GovernedField::Purpose => self.purpose = text("Purpose:", &self.purpose)?,
                GovernedField::ReferredBy => {
                    self.referred_by = text("Referred by:", &self.referred_by)?
                }
                GovernedField::Amount => {
                    self.amount = CustomType::<f64>::new("Amount:")
                        .with_default(self.amount)
                        .with_error_message("Please type an amount")
                        .with_validator(|amount: &f64| {
                            Ok(if is_valid_amount(*amount) {
                                Validation::Valid
                            } else {
                                Validation::Invalid("A finite amount of at least 0".into())
                            })
                        })
                        .prompt()?
                }
            }
        }

        if user_type == UserType::Donor {
            println!("[*] Donation: hospital, urgency, purpose, referral and amount are set automatically");
        }
        Ok(())
    }
}

impl FillDraft for UserDraft {
    fn fill(&mut self) -> PromptResult<()> {
        self.full_name = text("Full name:", &self.full_name)?;
        self.age = number("Age:", self.age)?;
        self.sex = choose("Sex:", self.sex)?;
        self.blood_group = choose("Blood group:", self.blood_group)?;
        self.email = text("Email:", &self.email)?;
        self.phone = contact("Phone:", &self.phone)?;
        self.address = text("Address:", &self.address)?;
        self.role = text("Role:", &self.role)?;
        self.status = choose("Status:", self.status)?;
        Ok(())
    }
}
