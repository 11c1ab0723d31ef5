//! Validation engine
//!
//! Coerces caller input through the data type registry, applies defaults,
//! runs named predicates and enforces property `writers`. Also checks asset
//! type definitions before they are admitted into the catalog.

mod engine;
mod predicates;
mod value;

pub use engine::ValidationEngine;
pub use predicates::{Predicate, PredicateRegistry};
pub use value::{
    check_bool, check_list, check_object, check_string, check_value, is_empty_value, require_string,
    ValueKind,
};
