#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # scolar
//!
//! Command-line front end to the grading engine: computes the notes
//! table of a semester from a JSON dataset, prints bulletins, and checks
//! datasets for pending grades and diagnostics.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use scolar::{
    Bulletin, Dataset, NotesTable, Options,
    model::{FormSemestre, SemestreId, StudentId},
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Print the sorted recap table of a semester
    Table(PathBuf, u32),
    /// Print one student's bulletin as JSON
    Bulletin(PathBuf, u32, u32),
    /// Compute every semester and report diagnostics
    Check(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the dataset path
    fn d() -> impl Parser<PathBuf> {
        positional("DATASET").help("Path to the dataset JSON file")
    }

    /// parses a semester id
    fn s() -> impl Parser<u32> {
        positional("SEMESTRE").help("Semester id within the dataset")
    }

    /// parses a student id
    fn e() -> impl Parser<u32> {
        positional("STUDENT").help("Student id within the semester")
    }

    let table = construct!(Cmd::Table(d(), s()))
        .to_options()
        .command("table")
        .help("Compute and print the sorted notes table of a semester");

    let bulletin = construct!(Cmd::Bulletin(d(), s(), e()))
        .to_options()
        .command("bulletin")
        .help("Print a student's bulletin as JSON");

    let check = construct!(Cmd::Check(d()))
        .to_options()
        .command("check")
        .help("Compute every semester and report pending modules and diagnostics");

    let cmd = construct!([table, bulletin, check]);

    cmd.to_options().descr("Grade aggregation engine").run()
}

/// Loads a dataset and resolves one of its semesters.
fn load_semestre(path: &PathBuf, id: u32) -> Result<FormSemestre> {
    let dataset = Dataset::load(path)?;
    let id = SemestreId(id);
    dataset
        .semestres
        .into_iter()
        .find(|s| s.id == id)
        .with_context(|| format!("No semester {id} in {}", path.display()))
}

fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let cmd = options();

    match cmd {
        Cmd::Table(path, id) => {
            let semestre = load_semestre(&path, id)?;
            let table = NotesTable::compute(&semestre, &Options::default()).with_context(|| {
                format!("Failed to compute notes table for semester {}", semestre.id)
            })?;
            println!("{}", table.recap(&semestre));
        }
        Cmd::Bulletin(path, id, student) => {
            let semestre = load_semestre(&path, id)?;
            let table = NotesTable::compute(&semestre, &Options::default()).with_context(|| {
                format!("Failed to compute notes table for semester {}", semestre.id)
            })?;
            let bulletin = Bulletin::build(&semestre, &table, StudentId(student))?;
            println!("{}", serde_json::to_string_pretty(&bulletin)?);
        }
        Cmd::Check(path) => {
            let dataset = Dataset::load(&path)?;
            for semestre in &dataset.semestres {
                match NotesTable::compute(semestre, &Options::default()) {
                    Ok(table) => {
                        for diagnostic in &table.diagnostics {
                            eprintln!(
                                "semester {}: module {}: {}",
                                semestre.id, diagnostic.module_id, diagnostic.message
                            );
                        }
                        for module_id in &table.modules_pending {
                            eprintln!(
                                "semester {}: module {} has grades pending",
                                semestre.id, module_id
                            );
                        }
                        println!(
                            "semester {}: {} students, class mean {}",
                            semestre.id,
                            table.cohort,
                            scolar::model::note::fmt_average(table.general_stats.mean)
                        );
                    }
                    Err(e) => eprintln!("semester {}: {e}", semestre.id),
                }
            }
        }
    };

    Ok(())
}
