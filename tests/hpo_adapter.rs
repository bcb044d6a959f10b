use hpo::Ontology;

use phenocompare::ontology::load_hpo;
use phenocompare::similarity::{Overlap, PatientSimilarity};
use phenocompare::{
    AncestorClosure, AncestorProvider, Cohorts, GeneGroups, PhenoError, SubgroupTable, TermId,
    TermSet,
};

/// ```text
/// 1 - 118 - 707 - 1250
///        \- 152 -/
/// ```
fn ontology() -> Ontology {
    let mut ontology = Ontology::default();
    ontology.insert_term("All".into(), 1u32);
    ontology.insert_term("Phenotypic abnormality".into(), 118u32);
    ontology.insert_term("Abnormality of the nervous system".into(), 707u32);
    ontology.insert_term("Abnormality of head or neck".into(), 152u32);
    ontology.insert_term("Seizure".into(), 1250u32);

    ontology.add_parent(1u32, 118u32);
    ontology.add_parent(118u32, 707u32);
    ontology.add_parent(118u32, 152u32);
    ontology.add_parent(707u32, 1250u32);
    ontology.add_parent(152u32, 1250u32);
    ontology.create_cache();
    ontology
}

#[test]
fn ancestors_of_hpo_term() {
    let ontology = ontology();
    let ancestors = ontology.ancestors(&TermId::from(1250u32)).unwrap();
    let expected: TermSet = [1u32, 118, 707, 152, 1250]
        .into_iter()
        .map(TermId::from)
        .collect();
    assert_eq!(ancestors, expected);
}

#[test]
fn root_only_contains_itself() {
    let ontology = ontology();
    let ancestors = ontology.ancestors(&TermId::from(1u32)).unwrap();
    assert_eq!(ancestors.len(), 1);
}

#[test]
fn term_names() {
    let ontology = ontology();
    assert_eq!(
        ontology.term_name(&TermId::from(1250u32)).as_deref(),
        Some("Seizure")
    );
    assert!(ontology.term_name(&TermId::from(9999999u32)).is_none());
}

#[test]
fn unknown_and_foreign_terms() {
    let ontology = ontology();
    assert!(matches!(
        ontology.ancestors(&TermId::from(9999999u32)),
        Err(PhenoError::UnknownTerm(_))
    ));
    let mouse = TermId::try_from("MP:0001250").unwrap();
    assert!(matches!(
        ontology.ancestors(&mouse),
        Err(PhenoError::UnknownTerm(_))
    ));
}

#[test]
fn closure_with_hpo_ontology() {
    let ontology = ontology();
    let terms = TermSet::from_iter([TermId::from(707u32), TermId::from(152u32)]);
    let closure = AncestorClosure::new(&terms, &ontology);
    assert_eq!(closure.terms().len(), 4);
    assert!(closure.unresolved().is_empty());
}

#[test]
fn short_and_padded_ids_count_together() {
    let ontology = ontology();
    let genes = GeneGroups::from_reader("PIGA\nPIGV\n".as_bytes(), "genes").unwrap();
    let patients = "\
P1\tPIGA\t\t\t\tHP:1250
P2\tPIGA\t\t\t\tHP:0001250
P3\tPIGV\t\t\t\tHP:0000152
";
    let cohorts = Cohorts::from_reader(patients.as_bytes(), &genes, "patients").unwrap();
    let table = SubgroupTable::aggregate(&cohorts, &ontology);

    assert_eq!(table.counts(&TermId::from(1250u32)), vec![2, 0]);
    assert_eq!(table.counts(&TermId::from(118u32)), vec![2, 1]);
    assert!(table.iter().all(|(term, _)| term.local_id().len() == 7));
    assert!(table.unresolved().is_empty());

    let p1 = cohorts.group(0).unwrap().get(0).unwrap();
    let p2 = cohorts.group(0).unwrap().get(1).unwrap();
    assert!((Overlap.calculate(p1, p2) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn missing_ontology() {
    let err = load_hpo("tests/data/no_such_ontology.hpo").unwrap_err();
    assert!(matches!(err, PhenoError::Ontology(_)));
}
