//! Identifiers of ontology terms and sets of them
//!
//! A [`TermId`] identifies a single ontology node, e.g. `HP:0001250`.
//! A [`TermSet`] is a sorted collection of unique [`TermId`]s and is used
//! for the phenotypes of a patient as well as for ancestor closures.

mod set;
mod termid;

pub use set::{TermIds, TermSet};
pub use termid::TermId;
