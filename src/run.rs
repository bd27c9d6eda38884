//! Orchestration: load both exams, join subject metadata, pick the
//! comparison mode, print the per-measure summary.

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{Cli, Language};
use crate::compare::{aggregate_diff, column_means, paired_diff};
use crate::data::loader::{load_results, load_subject_info};

/// LCA measures compared across languages, where only aggregate
/// statistics are meaningful.
pub const SELECTED_MEASURES: [&str; 6] = ["ld", "ls2", "vs2", "ndwesz", "cttr", "svv1"];

/// Run one comparison described by the parsed CLI arguments.
pub fn run(cli: &Cli) -> Result<()> {
    let lca_results_dir = cli.results_dir.join(cli.truncation.subdir());

    let exam1 = load_results(&lca_results_dir, &cli.exam1)?;
    let exam2 = load_results(&lca_results_dir, &cli.exam2)?;

    let lang1 = resolve_language(cli.lang1, &cli.exam1)?;
    let lang2 = resolve_language(cli.lang2, &cli.exam2)?;
    log::debug!("nationality filter requested: {:?} (not applied)", cli.nationality);

    // The full measure list is the first exam's columns, captured before
    // the subject-info join adds metadata columns.
    let all_measures = exam1.columns.clone();

    let subject_info = load_subject_info(&cli.data_dir, &cli.subject_info)?;
    let (data1, data2) = match &subject_info {
        Some(info) => (exam1.join(info), exam2.join(info)),
        None => (exam1, exam2),
    };

    println!("Calculating: {} minus {}\n", stem(&cli.exam2), stem(&cli.exam1));

    if lang1 == lang2 {
        let diff = paired_diff(&data1, &data2, &all_measures)?;
        if diff.is_empty() {
            log::warn!("The two exams share no subject codes");
        }
        let means = column_means(&diff, &all_measures)?;
        print_measure_vector(&means);
    } else {
        let selected: Vec<String> = SELECTED_MEASURES.iter().map(|m| m.to_string()).collect();
        let diff_means = aggregate_diff(&data1, &data2, &selected)?;
        print_measure_vector(&diff_means);
    }

    Ok(())
}

/// Explicit flag wins; otherwise fall back to filename inference.
fn resolve_language(explicit: Option<Language>, filename: &str) -> Result<Language> {
    match explicit {
        Some(lang) => Ok(lang),
        None => Language::detect(filename)
            .with_context(|| format!("resolving the source language of '{filename}'")),
    }
}

/// Exam name without its extension, as shown in the output banner.
fn stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// One aligned `measure  value` line per entry.
fn print_measure_vector(entries: &[(String, f64)]) {
    let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in entries {
        println!("{name:<width$}    {value:>12.6}");
    }
}
