//! Assignment of patients to the cohorts defined by [`GeneGroups`]
//!
//! Invalid patient records and patients whose gene is not part of any
//! gene group are skipped. Every skipped record is logged and kept as a
//! [`RecordWarning`], so that callers can report them.
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::{GeneGroups, Patient, PhenoError, PhenoResult};

/// The patients of one cohort
#[derive(Debug, Default, Clone)]
pub struct PatientGroup {
    patients: Vec<Patient>,
}

impl PatientGroup {
    /// Constructs a new, empty [`PatientGroup`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a patient to the group
    pub fn push(&mut self, patient: Patient) {
        self.patients.push(patient);
    }

    /// Returns the number of patients in the group
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    /// Returns `true` if the group does not contain any patient
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Returns the patient at `index`
    pub fn get(&self, index: usize) -> Option<&Patient> {
        self.patients.get(index)
    }

    /// Returns `true` if the group contains an equal patient
    pub fn contains(&self, patient: &Patient) -> bool {
        self.patients.contains(patient)
    }

    /// Iterates the patients in the order they were added
    pub fn iter(&self) -> std::slice::Iter<'_, Patient> {
        self.patients.iter()
    }
}

impl<'a> IntoIterator for &'a PatientGroup {
    type Item = &'a Patient;
    type IntoIter = std::slice::Iter<'a, Patient>;
    fn into_iter(self) -> Self::IntoIter {
        self.patients.iter()
    }
}

/// A patient record that was skipped
#[derive(Debug)]
pub struct RecordWarning {
    line: Option<usize>,
    error: PhenoError,
}

impl RecordWarning {
    /// The 1-based line number of the record, if it was read from a file
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// The reason why the record was skipped
    pub fn error(&self) -> &PhenoError {
        &self.error
    }
}

impl Display for RecordWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Patients, split into one [`PatientGroup`] per gene group
///
/// # Examples
///
/// ```
/// use phenocompare::{Cohorts, GeneGroups};
///
/// let genes = GeneGroups::from_reader("PIGA PIGM\nPIGV\n".as_bytes(), "genes").unwrap();
/// let patients = "\
/// P1\tPIGA\t\t\t\tHP:0001250
/// P2\tPIGV\t\t\t\tHP:0001252;HP:0001250
/// P3\tBRCA2\t\t\t\tHP:0001250
/// ";
/// let cohorts = Cohorts::from_reader(patients.as_bytes(), &genes, "patients").unwrap();
///
/// assert_eq!(cohorts.group_sizes(), vec![1, 1]);
/// // BRCA2 is not part of any gene group
/// assert_eq!(cohorts.warnings().len(), 1);
/// ```
#[derive(Debug)]
pub struct Cohorts {
    groups: Vec<PatientGroup>,
    warnings: Vec<RecordWarning>,
}

impl Cohorts {
    /// Assigns every patient to the group of its gene
    ///
    /// Patients with an unknown gene are skipped with a warning.
    pub fn classify<I: IntoIterator<Item = Patient>>(gene_groups: &GeneGroups, patients: I) -> Self {
        let mut cohorts = Self::empty(gene_groups.len());
        for patient in patients {
            cohorts.assign(gene_groups, patient, None);
        }
        cohorts.log_summary();
        cohorts
    }

    /// Reads and classifies all patients of a patient file
    ///
    /// # Errors
    ///
    /// - [`PhenoError::CannotOpenFile`] if the file does not exist or cannot be read
    /// - [`PhenoError::CannotReadFile`] if reading a line fails
    ///
    /// Invalid records do not cause an error, they are recorded as [`RecordWarning`]s.
    pub fn from_file<P: AsRef<Path>>(path: P, gene_groups: &GeneGroups) -> PhenoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| PhenoError::CannotOpenFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_reader(
            BufReader::new(file),
            gene_groups,
            &path.display().to_string(),
        )
    }

    /// Reads and classifies all patients from a buffered reader
    ///
    /// `source` is only used in log and error messages. Records that are not
    /// valid UTF-8 are skipped like any other invalid record.
    ///
    /// # Errors
    ///
    /// [`PhenoError::CannotReadFile`] if reading from `reader` fails
    pub fn from_reader<R: BufRead>(
        reader: R,
        gene_groups: &GeneGroups,
        source: &str,
    ) -> PhenoResult<Self> {
        let mut cohorts = Self::empty(gene_groups.len());
        for (idx, bytes) in reader.split(b'\n').enumerate() {
            let bytes = bytes.map_err(|err| PhenoError::CannotReadFile {
                path: source.to_string(),
                reason: format!("line {}: {err}", idx + 1),
            })?;
            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(err) => {
                    cohorts.skip(Some(idx + 1), PhenoError::InvalidRecord(err.to_string()));
                    continue;
                }
            };
            let line = line.strip_suffix('\r').unwrap_or(line.as_str());
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match Patient::from_record(line) {
                Ok(patient) => cohorts.assign(gene_groups, patient, Some(idx + 1)),
                Err(err) => cohorts.skip(Some(idx + 1), err),
            }
        }
        debug!("Finished reading patients from {}", source);
        cohorts.log_summary();
        Ok(cohorts)
    }

    fn empty(num_groups: usize) -> Self {
        Self {
            groups: vec![PatientGroup::new(); num_groups],
            warnings: Vec::new(),
        }
    }

    fn assign(&mut self, gene_groups: &GeneGroups, patient: Patient, line: Option<usize>) {
        match gene_groups.which_group(patient.gene()) {
            Some(idx) => self.groups[idx].push(patient),
            None => self.skip(line, PhenoError::UnknownGene(patient.gene().to_string())),
        }
    }

    fn skip(&mut self, line: Option<usize>, error: PhenoError) {
        let warning = RecordWarning { line, error };
        warn!("Skipping patient record, {}", warning);
        self.warnings.push(warning);
    }

    fn log_summary(&self) {
        info!(
            "Assigned {} patients to {} groups {:?}, skipped {} records",
            self.total_patients(),
            self.groups.len(),
            self.group_sizes(),
            self.warnings.len()
        );
    }

    /// Ensures that every group contains at least one patient
    ///
    /// # Errors
    ///
    /// [`PhenoError::EmptyGroup`] with the 1-based number of the first empty group
    pub fn check_not_empty(&self) -> PhenoResult<()> {
        match self.groups.iter().position(PatientGroup::is_empty) {
            Some(idx) => Err(PhenoError::EmptyGroup(idx + 1)),
            None => Ok(()),
        }
    }

    /// Returns the number of groups
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Returns the group at `index`
    pub fn group(&self, index: usize) -> Option<&PatientGroup> {
        self.groups.get(index)
    }

    /// Iterates all groups in order
    pub fn groups(&self) -> std::slice::Iter<'_, PatientGroup> {
        self.groups.iter()
    }

    /// The number of patients in each group
    pub fn group_sizes(&self) -> Vec<u64> {
        self.groups
            .iter()
            .map(|group| group.len() as u64)
            .collect()
    }

    /// The number of patients in all groups
    pub fn total_patients(&self) -> usize {
        self.groups.iter().map(PatientGroup::len).sum()
    }

    /// Iterates all patients: all of group 0, then group 1 and so on
    ///
    /// This ordering is used for the rows and columns of the similarity matrix.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.groups.iter().flat_map(PatientGroup::iter)
    }

    /// The records that were skipped while loading
    pub fn warnings(&self) -> &[RecordWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TermId, TermSet};

    fn genes() -> GeneGroups {
        GeneGroups::from_reader("PIGA PIGM PIGO\nPIGB PIGV\nPIGG PIGK\n".as_bytes(), "test")
            .unwrap()
    }

    fn patient(id: &str, gene: &str) -> Patient {
        Patient::new(id, gene, TermSet::from_iter([TermId::from(1250u32)])).unwrap()
    }

    #[test]
    fn classify_patients() {
        let patients = vec![
            patient("1", "PIGA"),
            patient("2", "PIGV"),
            patient("3", "PIGK"),
            patient("4", "PIGO"),
        ];
        let cohorts = Cohorts::classify(&genes(), patients);
        assert_eq!(cohorts.group_sizes(), vec![2, 1, 1]);
        assert_eq!(cohorts.total_patients(), 4);
        assert!(cohorts.warnings().is_empty());
        assert!(cohorts.check_not_empty().is_ok());
        assert!(cohorts.group(1).unwrap().contains(&patient("2", "PIGV")));
    }

    #[test]
    fn unknown_gene_is_skipped() {
        let patients = vec![patient("1", "PIGA"), patient("2", "BRCA2")];
        let cohorts = Cohorts::classify(&genes(), patients);
        assert_eq!(cohorts.total_patients(), 1);
        assert_eq!(cohorts.warnings().len(), 1);
        assert!(matches!(
            cohorts.warnings()[0].error(),
            PhenoError::UnknownGene(gene) if gene == "BRCA2"
        ));
    }

    #[test]
    fn empty_group() {
        let cohorts = Cohorts::classify(&genes(), vec![patient("1", "PIGA"), patient("2", "PIGG")]);
        assert!(matches!(
            cohorts.check_not_empty(),
            Err(PhenoError::EmptyGroup(2))
        ));
    }

    #[test]
    fn patient_order_follows_groups() {
        let patients = vec![
            patient("late", "PIGG"),
            patient("early", "PIGA"),
            patient("mid", "PIGB"),
            patient("early2", "PIGM"),
        ];
        let cohorts = Cohorts::classify(&genes(), patients);
        let ids: Vec<&str> = cohorts.patients().map(Patient::id).collect();
        assert_eq!(ids, ["early", "early2", "mid", "late"]);
    }

    #[test]
    fn read_with_invalid_records() {
        let data = "\
# comment line
1\tPIGA\t\t\t\tHP:0001250

2\tPIGV\t\t\t\t
3\tPIGG\t\t\t\tHP:0001250;HP:0001252
4\tPIGK
";
        let cohorts = Cohorts::from_reader(data.as_bytes(), &genes(), "test").unwrap();
        assert_eq!(cohorts.group_sizes(), vec![1, 0, 1]);
        let lines: Vec<Option<usize>> = cohorts.warnings().iter().map(RecordWarning::line).collect();
        assert_eq!(lines, [Some(4), Some(6)]);
        assert!(cohorts.warnings()[0].to_string().starts_with("line 4:"));
    }

    #[test]
    fn record_with_invalid_utf8_is_skipped() {
        let data: &[u8] = b"1\tPIGA\t\t\t\tHP:0001250\n\
2\tPIGV\t\tcaf\xe9 au lait\t\tHP:0001250\n\
3\tPIGG\t\t\t\tHP:0001250\r\n";
        let cohorts = Cohorts::from_reader(data, &genes(), "test").unwrap();
        assert_eq!(cohorts.group_sizes(), vec![1, 0, 1]);
        assert_eq!(cohorts.warnings().len(), 1);
        assert_eq!(cohorts.warnings()[0].line(), Some(2));
        assert!(matches!(
            cohorts.warnings()[0].error(),
            PhenoError::InvalidRecord(_)
        ));
        assert_eq!(cohorts.group(2).unwrap().get(0).unwrap().id(), "3");
    }

    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn read_error_names_source() {
        let reader = BufReader::new(FailingReader);
        let err = Cohorts::from_reader(reader, &genes(), "patients.tsv").unwrap_err();
        assert!(matches!(err, PhenoError::CannotReadFile { .. }));
        assert_eq!(
            err.to_string(),
            "cannot read patients.tsv: line 1: disk on fire"
        );
    }

    #[test]
    fn missing_patient_file() {
        let err = Cohorts::from_file("tests/data/missing.tsv", &genes()).unwrap_err();
        assert!(matches!(err, PhenoError::CannotOpenFile { .. }));
    }
}
