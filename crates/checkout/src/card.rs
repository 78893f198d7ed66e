//! Card details, payment PIN and the input normalizers used by the card form.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Card fields exactly as the shopper typed them.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardForm {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl std::fmt::Debug for CardForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardForm")
            .field("number", &"<redacted>")
            .field("expiry", &self.expiry)
            .field("cvv", &"<redacted>")
            .finish()
    }
}

/// Card details that passed validation.
///
/// The number is kept unmasked for the lifetime of the checkout attempt but
/// never leaves the process that way: `Debug` and `Serialize` only expose the
/// masked number and the expiry. The CVV is never exposed.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub(crate) number: String,
    pub(crate) expiry_month: u8,
    pub(crate) expiry_year: u8,
    pub(crate) cvv: String,
}

impl CardDetails {
    /// `**** **** **** 3456`
    pub fn masked(&self) -> String {
        format!("**** **** **** {}", self.last_four())
    }

    /// `1234 5678 9012 3456`
    pub fn grouped(&self) -> String {
        group_card_number(&self.number)
    }

    pub fn last_four(&self) -> &str {
        &self.number[self.number.len().saturating_sub(4)..]
    }

    /// Expiry as `MM/YY`.
    pub fn expiry(&self) -> String {
        format!("{:02}/{:02}", self.expiry_month, self.expiry_year)
    }

    pub fn expiry_month(&self) -> u8 {
        self.expiry_month
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &self.masked())
            .field("expiry", &self.expiry())
            .finish_non_exhaustive()
    }
}

impl Serialize for CardDetails {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut card = serializer.serialize_struct("CardDetails", 2)?;
        card.serialize_field("number", &self.masked())?;
        card.serialize_field("expiry", &self.expiry())?;
        card.end()
    }
}

/// A six-digit payment PIN that passed validation.
///
/// Only used to gate the move into payment processing; it is not stored.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(pub(crate) String);

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pin(******)")
    }
}

// -- Input normalizers --

/// Keeps only ASCII digits, truncated to `max` characters.
pub fn digits_only(input: &str, max: usize) -> String {
    input.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Formats raw expiry keystrokes as `MM/YY`, e.g. `"1225"` becomes `"12/25"`.
///
/// Partial input is left partial: `"1"` stays `"1"`, `"123"` becomes `"12/3"`.
pub fn format_expiry_input(input: &str) -> String {
    let digits = digits_only(input, 4);
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Groups up to 16 card digits in blocks of four separated by spaces.
pub fn group_card_number(input: &str) -> String {
    let digits = digits_only(input, 16);
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
