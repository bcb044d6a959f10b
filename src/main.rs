use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;

use phenocompare::ontology::load_hpo;
use phenocompare::report::write_results;
use phenocompare::similarity::{Jaccard, Overlap, PatientSimilarity};
use phenocompare::{Analysis, Cohorts, GeneGroups, PhenoResult};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SimilarityCli {
    /// Fraction of shared annotated terms
    Overlap,
    /// Jaccard index of the ancestor closures
    Jaccard,
}

/// Compare the phenotypes of patient cohorts defined by gene groups
#[derive(Debug, Parser)]
#[command(name = "phenocompare", version, about, long_about = None)]
struct Cli {
    /// Folder with the JAX HPO master data or a binary ontology file
    #[arg(long, value_name = "PATH")]
    hpo: PathBuf,

    /// File with one gene group per line
    #[arg(long, value_name = "FILE")]
    genes: PathBuf,

    /// Tab separated file with one patient per line
    #[arg(long, value_name = "FILE")]
    patients: PathBuf,

    /// Output folder, created if it does not exist
    #[arg(long, value_name = "DIR", default_value = "results")]
    results: PathBuf,

    /// Method for the pairwise patient similarity
    #[arg(long, value_enum, default_value_t = SimilarityCli::Overlap)]
    similarity: SimilarityCli,

    /// Increase logging output (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli) -> PhenoResult<()> {
    let gene_groups = GeneGroups::from_file(&cli.genes)?;
    info!("Loaded {} gene groups", gene_groups.len());

    let ontology = load_hpo(&cli.hpo)?;
    info!("Loaded ontology from {}", cli.hpo.display());

    // skipped records are logged while reading
    let cohorts = Cohorts::from_file(&cli.patients, &gene_groups)?;

    let jaccard = Jaccard::new(&ontology);
    let similarity: &dyn PatientSimilarity = match cli.similarity {
        SimilarityCli::Overlap => &Overlap,
        SimilarityCli::Jaccard => &jaccard,
    };

    let analysis = Analysis::run(cohorts, &ontology, similarity)?;
    for term in analysis.table().unresolved() {
        warn!("{} is not part of the ontology", term);
    }

    write_results(&cli.results, &analysis, &ontology)?;
    println!(
        "{} significant of {} tested terms, results in {}",
        analysis.comparison().significant().len(),
        analysis.comparison().tested(),
        cli.results.display()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = SimpleLogger::new()
        .with_level(log_level(cli.verbose))
        .init()
    {
        eprintln!("Unable to initialize logging: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{}", err);
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
