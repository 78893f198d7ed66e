//! Syntactic validation of checkout form input.
//!
//! Each validator runs its checks in a fixed order and reports the first
//! failure. The `Display` text of a [`ValidationError`] is the message shown
//! next to the form.

use thiserror::Error;

use crate::address::{Address, AddressForm, City};
use crate::card::{CardDetails, CardForm, Pin};

/// A form field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill all address fields")]
    MissingAddressFields,

    #[error("Please enter a valid 10-digit mobile number")]
    InvalidPhone,

    #[error("Please enter a valid 6-digit PIN code")]
    InvalidPincode,

    #[error("Please select a city we deliver to")]
    UnsupportedCity,

    #[error("Please fill all card fields")]
    MissingCardFields,

    #[error("Card number must be 16 digits")]
    InvalidCardNumber,

    #[error("Expiry must be MM/YY")]
    InvalidExpiryFormat,

    #[error("Expiry month must be between 01 and 12")]
    InvalidExpiryMonth,

    #[error("CVV must be 3 digits")]
    InvalidCvv,

    #[error("Please enter a valid 6-digit PIN")]
    InvalidPin,
}

impl ValidationError {
    /// The form field the error belongs to, or `None` for whole-form errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingAddressFields | ValidationError::MissingCardFields => None,
            ValidationError::InvalidPhone => Some("phone"),
            ValidationError::InvalidPincode => Some("pincode"),
            ValidationError::UnsupportedCity => Some("city"),
            ValidationError::InvalidCardNumber => Some("number"),
            ValidationError::InvalidExpiryFormat | ValidationError::InvalidExpiryMonth => {
                Some("expiry")
            }
            ValidationError::InvalidCvv => Some("cvv"),
            ValidationError::InvalidPin => Some("pin"),
        }
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validates a delivery address.
pub fn validate_address(form: &AddressForm) -> Result<Address, ValidationError> {
    let name = form.name.trim();
    let phone = form.phone.trim();
    let house_number = form.house_number.trim();
    let city = form.city.trim();
    let pincode = form.pincode.trim();

    if [name, phone, house_number, city, pincode]
        .iter()
        .any(|field| field.is_empty())
    {
        return Err(ValidationError::MissingAddressFields);
    }
    if !is_digits(phone, 10) {
        return Err(ValidationError::InvalidPhone);
    }
    if !is_digits(pincode, 6) {
        return Err(ValidationError::InvalidPincode);
    }
    let city = City::parse(city).ok_or(ValidationError::UnsupportedCity)?;

    Ok(Address {
        name: name.to_string(),
        phone: phone.to_string(),
        house_number: house_number.to_string(),
        city,
        pincode: pincode.to_string(),
    })
}

/// Validates card details. Spaces and hyphens in the number are ignored.
///
/// No Luhn or issuer check is made, and the expiry is not compared with today.
pub fn validate_card(form: &CardForm) -> Result<CardDetails, ValidationError> {
    let number: String = form
        .number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let expiry = form.expiry.trim();
    let cvv = form.cvv.trim();

    if number.is_empty() || expiry.is_empty() || cvv.is_empty() {
        return Err(ValidationError::MissingCardFields);
    }
    if !is_digits(&number, 16) {
        return Err(ValidationError::InvalidCardNumber);
    }

    let (month, year) = parse_expiry(expiry).ok_or(ValidationError::InvalidExpiryFormat)?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidExpiryMonth);
    }
    if !is_digits(cvv, 3) {
        return Err(ValidationError::InvalidCvv);
    }

    Ok(CardDetails {
        number,
        expiry_month: month,
        expiry_year: year,
        cvv: cvv.to_string(),
    })
}

/// Splits `MM/YY` into month and year.
fn parse_expiry(expiry: &str) -> Option<(u8, u8)> {
    let (month, year) = expiry.split_once('/')?;
    if !is_digits(month, 2) || !is_digits(year, 2) {
        return None;
    }
    Some((month.parse().ok()?, year.parse().ok()?))
}

/// Validates the six-digit payment PIN.
pub fn validate_pin(pin: &str) -> Result<Pin, ValidationError> {
    let pin = pin.trim();
    if !is_digits(pin, 6) {
        return Err(ValidationError::InvalidPin);
    }
    Ok(Pin(pin.to_string()))
}
