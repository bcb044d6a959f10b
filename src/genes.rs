//! Groups of genes that define the patient cohorts
//!
//! The gene file contains one group per line. Gene symbols are separated
//! by whitespace. Lines starting with `#` and blank lines are ignored.
//!
//! ```text
//! # early
//! PIGA    PIGC PIGH PIGM
//! # late
//! PIGG PIGK PIGS
//! ```
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::{PhenoError, PhenoResult};

/// A set of gene symbols
///
/// Patients with a mutation in one of the genes belong to the
/// corresponding patient group.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneGroup {
    genes: BTreeSet<String>,
}

impl GeneGroup {
    /// Constructs a new, empty [`GeneGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a gene symbol to the group
    ///
    /// Returns whether the gene was newly inserted
    pub fn insert<S: Into<String>>(&mut self, gene: S) -> bool {
        self.genes.insert(gene.into())
    }

    /// Returns `true` if the gene is part of this group
    pub fn contains(&self, gene: &str) -> bool {
        self.genes.contains(gene)
    }

    /// Returns the number of genes in the group
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Returns `true` if the group does not contain any genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Iterates the gene symbols in alphabetical order
    pub fn iter(&self) -> std::collections::btree_set::Iter<'_, String> {
        self.genes.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for GeneGroup {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut group = GeneGroup::new();
        for gene in iter {
            group.insert(gene);
        }
        group
    }
}

impl Display for GeneGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let genes: Vec<&str> = self.genes.iter().map(String::as_str).collect();
        write!(f, "{}", genes.join(", "))
    }
}

/// All gene groups of an analysis, in the order of the gene file
///
/// # Examples
///
/// ```
/// use phenocompare::GeneGroups;
///
/// let data = "# early\nPIGA PIGM\n\n# late\nPIGG\tPIGK\n";
/// let groups = GeneGroups::from_reader(data.as_bytes(), "inline").unwrap();
///
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups.which_group("PIGM"), Some(0));
/// assert_eq!(groups.which_group("PIGK"), Some(1));
/// assert_eq!(groups.which_group("BRCA2"), None);
/// ```
#[derive(Debug, Clone)]
pub struct GeneGroups {
    groups: Vec<GeneGroup>,
}

impl GeneGroups {
    /// Constructs [`GeneGroups`] from already created [`GeneGroup`]s
    ///
    /// # Errors
    ///
    /// [`PhenoError::NoGeneGroups`] if `groups` is empty
    pub fn new(groups: Vec<GeneGroup>) -> PhenoResult<Self> {
        if groups.is_empty() {
            return Err(PhenoError::NoGeneGroups("empty list of gene groups".to_string()));
        }
        let gene_groups = Self { groups };
        gene_groups.warn_about_duplicates();
        Ok(gene_groups)
    }

    /// Reads the gene groups from a file
    ///
    /// # Errors
    ///
    /// - [`PhenoError::CannotOpenFile`] if the file does not exist or cannot be read
    /// - [`PhenoError::NoGeneGroups`] if the file does not contain any gene group
    pub fn from_file<P: AsRef<Path>>(path: P) -> PhenoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| PhenoError::CannotOpenFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Reads the gene groups from any buffered reader
    ///
    /// `source` is only used in error messages.
    ///
    /// # Errors
    ///
    /// - [`PhenoError::CannotReadFile`] if reading fails or the input is not valid UTF-8
    /// - [`PhenoError::NoGeneGroups`] if the input does not contain any gene group
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> PhenoResult<Self> {
        let mut groups = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| PhenoError::CannotReadFile {
                path: source.to_string(),
                reason: format!("line {}: {err}", idx + 1),
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            groups.push(line.split_whitespace().collect::<GeneGroup>());
        }

        if groups.is_empty() {
            return Err(PhenoError::NoGeneGroups(source.to_string()));
        }
        debug!("Read {} gene groups from {}", groups.len(), source);
        Self::new(groups)
    }

    /// Returns the number of gene groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always `false`, [`GeneGroups`] contain at least one group
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the [`GeneGroup`] at `index`, if present
    pub fn get(&self, index: usize) -> Option<&GeneGroup> {
        self.groups.get(index)
    }

    /// Returns the index of the first group that contains the gene
    pub fn which_group(&self, gene: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.contains(gene))
    }

    /// Iterates all gene groups in order
    pub fn iter(&self) -> std::slice::Iter<'_, GeneGroup> {
        self.groups.iter()
    }

    fn warn_about_duplicates(&self) {
        for (idx, group) in self.groups.iter().enumerate() {
            for gene in group.iter() {
                if let Some(first) = self.which_group(gene) {
                    if first < idx {
                        warn!(
                            "Gene {} is listed in group {} and {}, using group {}",
                            gene,
                            first + 1,
                            idx + 1,
                            first + 1
                        );
                    }
                }
            }
        }
    }
}

impl<'a> IntoIterator for &'a GeneGroups {
    type Item = &'a GeneGroup;
    type IntoIter = std::slice::Iter<'a, GeneGroup>;
    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_groups() {
        let data = "#early\nPIGA PIGC\tPIGO\n#mid\nPIGB PIGV\n#late\nPIGG\n";
        let groups = GeneGroups::from_reader(data.as_bytes(), "test").unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups.get(0).unwrap().len(), 3);
        assert!(groups.get(0).unwrap().contains("PIGO"));
        assert!(!groups.get(0).unwrap().contains("PIGV"));
        assert!(groups.get(2).unwrap().contains("PIGG"));
        assert!(groups.get(3).is_none());
    }

    #[test]
    fn only_comments() {
        let data = "# nothing here\n\n   \n# still nothing\n";
        let err = GeneGroups::from_reader(data.as_bytes(), "comments.txt").unwrap_err();
        assert!(matches!(err, PhenoError::NoGeneGroups(ref src) if src == "comments.txt"));
    }

    #[test]
    fn duplicate_gene_first_group_wins() {
        let data = "PIGA PIGB\nPIGB PIGC\n";
        let groups = GeneGroups::from_reader(data.as_bytes(), "test").unwrap();
        assert_eq!(groups.which_group("PIGB"), Some(0));
        assert_eq!(groups.which_group("PIGC"), Some(1));
    }

    #[test]
    fn duplicate_gene_within_line() {
        let group: GeneGroup = ["PIGA", "PIGA", "PIGB"].into_iter().collect();
        assert_eq!(group.len(), 2);
        assert_eq!(group.to_string(), "PIGA, PIGB");
    }

    #[test]
    fn new_requires_groups() {
        assert!(GeneGroups::new(Vec::new()).is_err());
        let groups = GeneGroups::new(vec![["PIGA"].into_iter().collect()]).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn unreadable_input_names_source() {
        let data: &[u8] = b"PIGA PIGB\nPIG\xe9\n";
        let err = GeneGroups::from_reader(data, "genes.txt").unwrap_err();
        assert!(matches!(err, PhenoError::CannotReadFile { .. }));
        assert!(err.to_string().starts_with("cannot read genes.txt: line 2:"));
    }

    #[test]
    fn missing_file() {
        let err = GeneGroups::from_file("tests/data/does_not_exist.txt").unwrap_err();
        assert!(matches!(err, PhenoError::CannotOpenFile { .. }));
        assert!(err.to_string().contains("does_not_exist.txt"));
    }
}
