//! Access to the ancestors of ontology terms
//!
//! The comparison engine does not parse or represent an ontology itself.
//! Instead, everything it needs is expressed by the [`AncestorProvider`]
//! trait. It is implemented for [`hpo::Ontology`], which loads the
//! Human Phenotype Ontology from the JAX master data, and for
//! [`TermGraph`], a small in-memory DAG that is built by hand.

use crate::{PhenoError, PhenoResult, TermId, TermSet};

mod termgraph;
pub use termgraph::TermGraph;

/// Ancestor lookups in a directed acyclic graph of terms
///
/// The ontology is only ever read. It is created once and then
/// passed by reference to every component that needs it.
pub trait AncestorProvider {
    /// Returns all ancestors of `term`, including `term` itself
    ///
    /// # Errors
    ///
    /// [`PhenoError::UnknownTerm`] if the term is not part of the ontology,
    /// e.g. because it is obsolete or was renamed.
    fn ancestors(&self, term: &TermId) -> PhenoResult<TermSet>;

    /// Returns the name of the term, if it is present in the ontology
    fn term_name(&self, term: &TermId) -> Option<String>;
}

fn hpo_term_id(term: &TermId) -> PhenoResult<hpo::HpoTermId> {
    if !term.is_hpo() {
        return Err(PhenoError::UnknownTerm(term.clone()));
    }
    let id: u32 = term
        .local_id()
        .parse()
        .map_err(|_| PhenoError::UnknownTerm(term.clone()))?;
    Ok(hpo::HpoTermId::from(id))
}

/// Loads the Human Phenotype Ontology from disk
///
/// `path` is either a folder with the JAX master data
/// (`hp.obo` and the annotation files) or a binary ontology file.
///
/// # Errors
///
/// [`PhenoError::Ontology`] if the data cannot be loaded
pub fn load_hpo<P: AsRef<std::path::Path>>(path: P) -> PhenoResult<hpo::Ontology> {
    let path = path.as_ref();
    let ontology = if path.is_dir() {
        let folder = path
            .to_str()
            .ok_or_else(|| PhenoError::Ontology(format!("invalid path {}", path.display())))?;
        hpo::Ontology::from_standard(folder)
    } else {
        hpo::Ontology::from_binary(path)
    };
    ontology.map_err(|err| PhenoError::Ontology(format!("{}: {err}", path.display())))
}

impl AncestorProvider for hpo::Ontology {
    fn ancestors(&self, term: &TermId) -> PhenoResult<TermSet> {
        let id = hpo_term_id(term)?;
        let hpo_term = self
            .hpo(id)
            .ok_or_else(|| PhenoError::UnknownTerm(term.clone()))?;
        let parents = hpo_term.all_parent_ids();
        let mut closure = TermSet::with_capacity(parents.len() + 1);
        closure.insert(TermId::from(id));
        closure.extend(parents.iter().map(TermId::from));
        Ok(closure)
    }

    fn term_name(&self, term: &TermId) -> Option<String> {
        let id = hpo_term_id(term).ok()?;
        self.hpo(id).map(|hpo_term| hpo_term.name().to_string())
    }
}
