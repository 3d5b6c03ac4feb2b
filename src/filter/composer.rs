//! Turns filter fields into the predicates of a listing query.

use crate::filter::FilterCriteria;
use crate::model::{PropertyId, PropertyStatus, PropertyType, UserId};
use record_store::{OrderBy, Predicate, Query};
use tracing::debug;

/// Values of `property_type` that mean "no restriction".
const ANY_TYPE: [&str; 2] = ["any", "all"];

/// The conjoined conditions, ordering and limit of one listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateSet {
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl PredicateSet {
    fn newest_first(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            order: Some(OrderBy::desc("created_at")),
            limit: None,
        }
    }

    /// Listings owned by `owner`, any status, newest first.
    pub fn owned_by(owner: &UserId) -> Self {
        Self::newest_first(vec![Predicate::eq("owner_id", owner.0.clone())])
    }

    /// Listings whose id is in `ids`. No ordering is promised.
    pub fn member_of(ids: &[PropertyId]) -> Self {
        Self {
            predicates: vec![Predicate::one_of("id", ids.iter().map(|id| id.0.clone()))],
            order: None,
            limit: None,
        }
    }

    /// The landing-page strip: any `limit` available listings.
    pub fn featured(limit: usize) -> Self {
        Self {
            predicates: vec![available()],
            order: None,
            limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn into_query(self, table: &str) -> Query {
        let query = Query::table(table)
            .filters(self.predicates)
            .order(self.order);
        match self.limit {
            Some(limit) => query.limit(limit),
            None => query,
        }
    }
}

fn available() -> Predicate {
    Predicate::eq("status", PropertyStatus::Available.as_str())
}

/// Builds the public listing query for the given criteria.
///
/// Always contains `status == available`, then one predicate per usable field:
/// the search term (title OR location), the property type, the city, and the
/// price bounds. Unusable fields are dropped without error: blank text, the
/// `any`/`all` type sentinel, and prices that are not finite non-negative numbers.
/// Bounds are not cross-checked, so `min > max` simply matches nothing.
pub fn compose(criteria: &FilterCriteria) -> PredicateSet {
    let mut predicates = vec![available()];

    if let Some(term) = non_blank(&criteria.term) {
        predicates.push(Predicate::any_of([
            Predicate::ilike("title", term),
            Predicate::ilike("location", term),
        ]));
    }

    if let Some(property_type) = non_blank(&criteria.property_type) {
        if !ANY_TYPE
            .iter()
            .any(|sentinel| property_type.eq_ignore_ascii_case(sentinel))
        {
            // Unknown names still restrict: they match no listing.
            let value = property_type
                .parse::<PropertyType>()
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|_| property_type.to_lowercase());
            predicates.push(Predicate::eq("property_type", value));
        }
    }

    if let Some(city) = non_blank(&criteria.city) {
        predicates.push(Predicate::ilike("city", city));
    }

    if let Some(min) = parse_price(&criteria.min_price) {
        predicates.push(Predicate::gte("price", min));
    }
    if let Some(max) = parse_price(&criteria.max_price) {
        predicates.push(Predicate::lte("price", max));
    }

    debug!(?criteria, predicates = predicates.len(), "Composed listing filter");
    PredicateSet::newest_first(predicates)
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &Option<String>) -> Option<f64> {
    let raw = non_blank(field)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            debug!(raw, "Ignoring price filter");
            None
        }
    }
}
