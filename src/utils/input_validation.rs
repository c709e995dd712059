use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

// Phone numbers as typed at the front desk: "+1 555-0123", "022 345 67 89"
static CONTACT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9(][0-9 ().-]{5,19}$").expect("Failed to compile contact regex")
});

/// Checks that a contact or phone field looks like a phone number
pub fn is_valid_contact(contact: &str) -> bool {
    let contact = contact.trim();
    let digits = contact.chars().filter(|c| c.is_ascii_digit()).count();

    CONTACT_REGEX.is_match(contact) && digits >= 6
}

/// `validator` hook for contact and phone fields
pub fn validate_contact(contact: &str) -> Result<(), ValidationError> {
    if is_valid_contact(contact) {
        Ok(())
    } else {
        Err(ValidationError::new("contact")
            .with_message(Cow::Borrowed("must be a phone number such as +1 555-0123")))
    }
}

/// `validator` hook for required text fields. Whitespace alone counts as blank.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("required").with_message(Cow::Borrowed("cannot be blank")))
    } else {
        Ok(())
    }
}

/// Checks that an amount is a finite, non-negative number
pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

/// `validator` hook for amounts. `range` alone lets NaN through.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if is_valid_amount(amount) {
        Ok(())
    } else {
        Err(ValidationError::new("amount")
            .with_message(Cow::Borrowed("must be a finite amount of at least 0")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod contact_tests {
        use super::*;

        #[test]
        fn test_valid_contact() {
            let valid_cases = vec![
                "+1 555-0123",
                "+1 555-0124",
                "022 345 67 89",
                "(555) 010-2030",
                "5550123",
            ];

            for contact in valid_cases {
                assert!(is_valid_contact(contact),
                        "Valid contact {} was rejected !", contact);
                assert!(validate_contact(contact).is_ok());
            }
        }

        #[test]
        fn test_invalid_contact() {
            let invalid_cases = vec![
                "",
                "   ",
                "john@example.com",
                "call me",
                "12345",
                "+1 555-0123 ext. 4",
                "+++555",
            ];

            for contact in invalid_cases {
                assert!(!is_valid_contact(contact),
                        "Invalid contact {} was accepted !", contact);
                assert!(validate_contact(contact).is_err());
            }
        }

        #[test]
        fn test_contact_is_trimmed() {
            assert!(is_valid_contact("  +1 555-0123  "));
        }
    }

    mod blank_tests {
        use super::*;

        #[test]
        fn test_blank_values_rejected() {
            for value in ["", " ", "\t\n"] {
                let err = validate_not_blank(value).unwrap_err();
                assert_eq!(err.code, "required");
            }
        }

        #[test]
        fn test_text_accepted() {
            assert!(validate_not_blank("City General Hospital").is_ok());
            assert!(validate_not_blank(" Self ").is_ok());
        }
    }

    mod amount_tests {
        use super::*;

        #[test]
        fn test_amount_cases() {
            let cases = vec![
                (0.0, true),
                (150.0, true),
                (-1.0, false),
                (f64::NAN, false),
                (f64::INFINITY, false),
                (f64::NEG_INFINITY, false),
            ];

            for (amount, expected) in cases {
                assert_eq!(is_valid_amount(amount), expected, "Failed for amount: {}", amount);
                assert_eq!(validate_amount(amount).is_ok(), expected);
            }
        }

        #[test]
        fn test_nan_parsed_from_text_rejected() {
            let amount: f64 = "NaN".parse().unwrap();
            let err = validate_amount(amount).unwrap_err();
            assert_eq!(err.code, "amount");
        }
    }
}
