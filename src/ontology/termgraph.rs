use std::collections::HashMap;
use std::fmt::Debug;

use crate::ontology::AncestorProvider;
use crate::{PhenoError, PhenoResult, TermId, TermSet};

#[derive(Debug, Default)]
struct TermNode {
    name: String,
    parents: TermSet,
    children: TermSet,
}

/// An in-memory ontology that is built term by term
///
/// `TermGraph` is useful for small, hand-curated ontologies and for
/// ontologies that do not use the `HP` prefix.
///
/// # Examples
///
/// ```
/// use phenocompare::{AncestorProvider, TermGraph, TermId};
///
/// let mut graph = TermGraph::default();
/// graph.insert_term("All".into(), 1u32);
/// graph.insert_term("Phenotypic abnormality".into(), 118u32);
/// graph.insert_term("Seizure".into(), 1250u32);
///
/// graph.add_parent(1u32, 118u32).unwrap();
/// graph.add_parent(118u32, 1250u32).unwrap();
///
/// let ancestors = graph.ancestors(&1250u32.into()).unwrap();
/// assert_eq!(ancestors.len(), 3);
/// assert!(ancestors.contains(&TermId::from(1u32)));
/// ```
#[derive(Default)]
pub struct TermGraph {
    terms: HashMap<TermId, TermNode>,
}

impl Debug for TermGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermGraph with {} terms", self.terms.len())
    }
}

impl TermGraph {
    /// Returns the number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the graph does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Creates and inserts a new term without any parents
    ///
    /// Inserting an existing term renames it and keeps its connections.
    pub fn insert_term<I: Into<TermId>>(&mut self, name: String, id: I) {
        self.terms.entry(id.into()).or_default().name = name;
    }

    /// Add an `is-a` connection from `child_id` to `parent_id`
    ///
    /// # Errors
    ///
    /// - [`PhenoError::UnknownTerm`] if one of the terms was not inserted before
    /// - [`PhenoError::Ontology`] if the connection would create a cycle
    pub fn add_parent<I: Into<TermId>, J: Into<TermId>>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> PhenoResult<()> {
        let parent_id = parent_id.into();
        let child_id = child_id.into();
        for id in [&parent_id, &child_id] {
            if !self.terms.contains_key(id) {
                return Err(PhenoError::UnknownTerm(id.clone()));
            }
        }
        if self.ancestors(&parent_id)?.contains(&child_id) {
            return Err(PhenoError::Ontology(format!(
                "{parent_id} is a descendant of {child_id}"
            )));
        }

        if let Some(parent) = self.terms.get_mut(&parent_id) {
            parent.children.insert(child_id.clone());
        }
        if let Some(child) = self.terms.get_mut(&child_id) {
            child.parents.insert(parent_id);
        }
        Ok(())
    }

    /// Returns the direct parents of a term
    pub fn parents(&self, id: &TermId) -> Option<&TermSet> {
        self.terms.get(id).map(|node| &node.parents)
    }

    /// Returns the direct children of a term
    pub fn children(&self, id: &TermId) -> Option<&TermSet> {
        self.terms.get(id).map(|node| &node.children)
    }
}

impl AncestorProvider for TermGraph {
    fn ancestors(&self, term: &TermId) -> PhenoResult<TermSet> {
        let node = self
            .terms
            .get(term)
            .ok_or_else(|| PhenoError::UnknownTerm(term.clone()))?;

        let mut closure = TermSet::new();
        closure.insert(term.clone());
        let mut queue: Vec<&TermId> = node.parents.iter().collect();
        while let Some(id) = queue.pop() {
            if !closure.insert(id.clone()) {
                continue;
            }
            if let Some(parent) = self.terms.get(id) {
                queue.extend(parent.parents.iter());
            }
        }
        Ok(closure)
    }

    fn term_name(&self, term: &TermId) -> Option<String> {
        self.terms.get(term).map(|node| node.name.clone())
    }
}
