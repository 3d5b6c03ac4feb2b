use serde::{Deserialize, Serialize};

/// The filter fields of the public listing search.
///
/// Values are kept exactly as the user typed them: two criteria are the same
/// search (and the same cache entry) only when every field matches. Parsing and
/// trimming happen in [`compose`](crate::filter::compose).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free text matched against title or location.
    pub term: Option<String>,
    /// A property type name, or `any` / `all` for no restriction.
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn min_price(mut self, min_price: impl Into<String>) -> Self {
        self.min_price = Some(min_price.into());
        self
    }

    pub fn max_price(mut self, max_price: impl Into<String>) -> Self {
        self.max_price = Some(max_price.into());
        self
    }

    /// True in the "clear filters" state, when no field is set at all.
    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }
}
