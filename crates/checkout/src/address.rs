//! Delivery address types.

use serde::{Deserialize, Serialize};

/// Cities the storefront delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    Delhi,
    Mumbai,
    Bangalore,
    Chennai,
    Kolkata,
    Hyderabad,
    Pune,
    Jaipur,
}

impl City {
    /// Every deliverable city, in the order the address form lists them.
    pub const ALL: [City; 8] = [
        City::Delhi,
        City::Mumbai,
        City::Bangalore,
        City::Chennai,
        City::Kolkata,
        City::Hyderabad,
        City::Pune,
        City::Jaipur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Delhi => "Delhi",
            City::Mumbai => "Mumbai",
            City::Bangalore => "Bangalore",
            City::Chennai => "Chennai",
            City::Kolkata => "Kolkata",
            City::Hyderabad => "Hyderabad",
            City::Pune => "Pune",
            City::Jaipur => "Jaipur",
        }
    }

    /// Looks up a city by name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<City> {
        let name = name.trim();
        City::ALL
            .into_iter()
            .find(|city| city.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Address fields exactly as the shopper typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddressForm {
    pub name: String,
    pub phone: String,
    #[serde(alias = "house")]
    pub house_number: String,
    pub city: String,
    pub pincode: String,
}

/// A delivery address that passed validation.
///
/// Only [`crate::validate_address`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) house_number: String,
    pub(crate) city: City,
    pub(crate) pincode: String,
}

impl Address {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ten-digit mobile number (shown with a `+91` prefix).
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn house_number(&self) -> &str {
        &self.house_number
    }

    pub fn city(&self) -> City {
        self.city
    }

    pub fn pincode(&self) -> &str {
        &self.pincode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_parse_is_case_insensitive() {
        assert_eq!(City::parse("Mumbai"), Some(City::Mumbai));
        assert_eq!(City::parse("  bangalore "), Some(City::Bangalore));
        assert_eq!(City::parse("Lucknow"), None);
        assert_eq!(City::parse(""), None);
    }

    #[test]
    fn test_every_city_round_trips_through_its_name() {
        for city in City::ALL {
            assert_eq!(City::parse(city.as_str()), Some(city));
        }
    }

    #[test]
    fn test_address_form_accepts_house_alias() {
        let form: AddressForm = serde_json::from_value(serde_json::json!({
            "name": "Asha",
            "phone": "9876543210",
            "house": "12B",
            "city": "Pune",
            "pincode": "411001"
        }))
        .unwrap();
        assert_eq!(form.house_number, "12B");
    }
}
