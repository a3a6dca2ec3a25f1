//! Unification, deduplication and validation of extracted rows.

pub mod dedup;
pub mod unifier;
pub mod validate;

pub use dedup::{deduplicate, identity_key, merge_into};
pub use unifier::Unifier;
pub use validate::Validator;

use crate::models::{RawRow, SourceKind, UnifiedProduct, ValidationError};

/// Valid products and rejected ones after the merge.
#[derive(Debug, Clone, Default)]
pub struct Unification {
    pub products: Vec<UnifiedProduct>,
    pub errors: Vec<ValidationError>,
}

/// Unify, deduplicate and validate source collections, in the order given.
pub fn unify_collections<I>(collections: I, validator: &Validator) -> Unification
where
    I: IntoIterator<Item = (SourceKind, Vec<RawRow>)>,
{
    let unified = Unifier::new().unify(collections);
    let (products, errors) = validator.validate(deduplicate(unified));
    Unification { products, errors }
}
