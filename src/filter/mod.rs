//! # Filter Composer
//!
//! Pure translation from the search form to store predicates. Nothing here talks
//! to the store; [`compose`] is a function of its input alone.
//!
//! ```rust
//! use estate_discovery::filter::{compose, FilterCriteria};
//!
//! let criteria = FilterCriteria::new().term("villa").city("Pune").min_price("2000000");
//! let set = compose(&criteria);
//!
//! // availability + term + city + minimum price
//! assert_eq!(set.len(), 4);
//! ```

pub mod composer;
pub mod criteria;

pub use composer::*;
pub use criteria::*;
