use phenocompare::{Cohorts, GeneGroups, Patient, TermGraph, TermId, TermSet};

pub const GENES: &str = "PIGA PIGC PIGH PIGM PIGO\nPIGB PIGF PIGN PIGV PIGW\nPIGG PIGK PIGS PIGT PIGU\n";

/// A tree with `depth` levels below the root and `width` children per term
pub fn ontology(depth: u32, width: u32) -> (TermGraph, Vec<TermId>) {
    let mut graph = TermGraph::default();
    graph.insert_term("All".into(), 1u32);
    let mut level = vec![1u32];
    let mut all = Vec::new();
    let mut next_id = 2u32;
    for _ in 0..depth {
        let mut children = Vec::with_capacity(level.len() * width as usize);
        for parent in &level {
            for _ in 0..width {
                graph.insert_term(format!("Term {next_id}"), next_id);
                graph
                    .add_parent(*parent, next_id)
                    .expect("parent is inserted before the child");
                children.push(next_id);
                next_id += 1;
            }
        }
        all.extend(children.iter().map(|id| TermId::from(*id)));
        level = children;
    }
    (graph, all)
}

/// Patients with 5 to 15 terms, picked by a linear congruential generator
pub fn cohorts(terms: &[TermId], num_patients: usize) -> Cohorts {
    let genes = GeneGroups::from_reader(GENES.as_bytes(), "benchmark").expect("valid gene groups");
    let gene_names: Vec<&str> = GENES.split_whitespace().collect();
    let mut state: u64 = 42;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        (state >> 33) as usize
    };

    let patients = (0..num_patients).map(|idx| {
        let num_terms = 5 + next() % 11;
        let annotations: TermSet = (0..num_terms)
            .map(|_| terms[next() % terms.len()].clone())
            .collect();
        let gene = gene_names[idx % gene_names.len()];
        Patient::new(format!("P{idx}"), gene, annotations).expect("patient has terms")
    });
    Cohorts::classify(&genes, patients)
}
