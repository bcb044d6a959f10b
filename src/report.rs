//! Tab-separated output files of an [`Analysis`]
//!
//! All results are written into one directory:
//!
//! ```text
//! results/
//! ├── chiSquared.tsv          significant terms with counts and p-values
//! ├── dissim.tsv              pairwise dissimilarity of all patients
//! └── terms/
//!     ├── HP_0001250.tsv      patients carrying one significant term
//!     └── ...
//! ```
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::propagation::subtypes;
use crate::{Analysis, AncestorProvider, PhenoError, PhenoResult, TermId, TermSet};

/// File name of the chi-squared results
pub const CHI_SQUARED_FILE: &str = "chiSquared.tsv";
/// File name of the dissimilarity matrix
pub const DISSIMILARITY_FILE: &str = "dissim.tsv";
/// Folder for the per-term detail files
pub const TERMS_DIR: &str = "terms";

/// Writes all significant terms with their per-group counts
///
/// ```text
/// #HPO TermId  Term Name  Group1  Group2  ChiSq  Uncorr p Value  Corr p Value
/// HP:0001250   Seizure       18/20     2/20  25.600  0.00000  0.00001
/// ```
///
/// # Errors
///
/// [`PhenoError::Io`] if writing fails
pub fn write_chi_squared<W: Write, A: AncestorProvider>(
    writer: &mut W,
    analysis: &Analysis,
    ontology: &A,
) -> PhenoResult<()> {
    let group_sizes = analysis.cohorts().group_sizes();

    write!(writer, "#HPO TermId\tTerm Name\t")?;
    for group in 1..=group_sizes.len() {
        write!(writer, "Group{group}\t")?;
    }
    writeln!(writer, "ChiSq\tUncorr p Value\tCorr p Value")?;

    for result in analysis.comparison() {
        let term = result.term();
        let name = ontology.term_name(term).unwrap_or_default();
        write!(writer, "{term}\t{name}")?;
        let counts = analysis.table().counts(term);
        for (count, size) in counts.iter().zip(&group_sizes) {
            write!(writer, "\t{count:5}/{size}")?;
        }
        writeln!(
            writer,
            "\t{:7.3}\t{:9.5}\t{:9.5}",
            result.chi_square(),
            result.p_value(),
            result.corrected_p_value().unwrap_or(1.0)
        )?;
    }
    Ok(())
}

/// Writes the dissimilarity (`1 - similarity`) of all patients
///
/// The first line contains the patient ids, starting with an empty cell.
/// Every following line starts with the patient id and contains
/// the dissimilarity to every other patient.
///
/// # Errors
///
/// [`PhenoError::Io`] if writing fails
pub fn write_dissimilarity<W: Write>(writer: &mut W, analysis: &Analysis) -> PhenoResult<()> {
    let ids: Vec<&str> = analysis.cohorts().patients().map(|p| p.id()).collect();
    for id in &ids {
        write!(writer, "\t{id}")?;
    }
    writeln!(writer)?;

    for (id, row) in ids.iter().zip(analysis.similarity().rows()) {
        write!(writer, "{id}")?;
        for similarity in row {
            write!(writer, "\t{:4.2}", 1.0 - similarity)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Writes all patients that carry `term`
///
/// Each line lists the 1-based group number, patient id, gene and the
/// annotated terms of the patient that are `term` or one of its subtypes.
///
/// # Errors
///
/// [`PhenoError::Io`] if writing fails
pub fn write_term_details<W: Write, A: AncestorProvider>(
    writer: &mut W,
    analysis: &Analysis,
    term: &TermId,
    ontology: &A,
) -> PhenoResult<()> {
    writeln!(writer, "#Group\tPatient\tGene\tSubtypes of {term}")?;
    let Some(subgroups) = analysis.table().get(term) else {
        return Ok(());
    };
    for (group_idx, group) in analysis.cohorts().groups().enumerate() {
        for patient in subgroups
            .members(group_idx)
            .iter()
            .filter_map(|idx| group.get(*idx))
        {
            let subtypes = subtypes(patient.terms(), term, ontology);
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                group_idx + 1,
                patient.id(),
                patient.gene(),
                join_terms(&subtypes)
            )?;
        }
    }
    Ok(())
}

fn join_terms(terms: &TermSet) -> String {
    terms
        .iter()
        .map(TermId::as_str)
        .collect::<Vec<&str>>()
        .join(",")
}

fn create_file(path: &Path) -> PhenoResult<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| PhenoError::CannotOpenFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}

/// Deletes the `.tsv` detail files of a previous run
fn remove_term_files(terms_dir: &Path) -> PhenoResult<()> {
    let cannot_clear = |err: std::io::Error| PhenoError::CannotOpenFile {
        path: terms_dir.to_path_buf(),
        reason: err.to_string(),
    };
    for entry in fs::read_dir(terms_dir).map_err(cannot_clear)? {
        let path = entry.map_err(cannot_clear)?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "tsv") {
            debug!("Removing outdated {}", path.display());
            fs::remove_file(&path).map_err(cannot_clear)?;
        }
    }
    Ok(())
}

/// Writes all result files into `dir`
///
/// The directory is created if it does not exist. Existing result files
/// are overwritten and detail files of terms that are no longer
/// significant are removed from the `terms` folder.
///
/// # Errors
///
/// - [`PhenoError::CannotOpenFile`] if a file or folder cannot be created or cleared
/// - [`PhenoError::Io`] if writing fails
pub fn write_results<P: AsRef<Path>, A: AncestorProvider>(
    dir: P,
    analysis: &Analysis,
    ontology: &A,
) -> PhenoResult<()> {
    let dir = dir.as_ref();
    let terms_dir = dir.join(TERMS_DIR);
    fs::create_dir_all(&terms_dir).map_err(|err| PhenoError::CannotOpenFile {
        path: terms_dir.clone(),
        reason: err.to_string(),
    })?;
    remove_term_files(&terms_dir)?;

    let mut writer = create_file(&dir.join(CHI_SQUARED_FILE))?;
    write_chi_squared(&mut writer, analysis, ontology)?;
    writer.flush()?;

    let mut writer = create_file(&dir.join(DISSIMILARITY_FILE))?;
    write_dissimilarity(&mut writer, analysis)?;
    writer.flush()?;

    for result in analysis.comparison() {
        let path = term_file(&terms_dir, result.term());
        debug!("Writing details of {} to {}", result.term(), path.display());
        let mut writer = create_file(&path)?;
        write_term_details(&mut writer, analysis, result.term(), ontology)?;
        writer.flush()?;
    }

    info!("Results written to {}", dir.display());
    Ok(())
}

/// Path of the detail file of `term`, e.g. `terms/HP_0001250.tsv`
pub fn term_file(terms_dir: &Path, term: &TermId) -> PathBuf {
    terms_dir.join(format!("{}.tsv", term.file_stem()))
}
