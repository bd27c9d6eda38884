//! CLI argument parsing for lexdiff.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

/// Whether the LCA was computed on length-truncated writing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Truncation {
    /// Samples truncated at the same length
    Yes,
    /// Untruncated samples
    No,
}

impl Truncation {
    /// Results subdirectory holding the matching LCA output.
    pub fn subdir(self) -> &'static str {
        match self {
            Truncation::Yes => "lca_truncated",
            Truncation::No => "lca_untruncated",
        }
    }
}

/// Nationality of the exam-takers to analyse.
///
/// Accepted and validated, not yet applied to the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Nationality {
    #[value(name = "DU")]
    Du,
    #[value(name = "NL")]
    Nl,
}

/// Source language an exam was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Language {
    #[value(name = "EN")]
    En,
    #[value(name = "NL")]
    Nl,
}

#[derive(Debug, Error, PartialEq)]
#[error("cannot determine the exam language from '{0}': expected 'EN' or 'NL' in the filename (or pass --lang1/--lang2)")]
pub struct UnknownLanguage(pub String);

impl Language {
    /// Infer the language tag from an exam filename.  `EN` is checked
    /// before `NL`; a miss is an error rather than an undefined tag.
    pub fn detect(filename: &str) -> Result<Language, UnknownLanguage> {
        if filename.contains("EN") {
            Ok(Language::En)
        } else if filename.contains("NL") {
            Ok(Language::Nl)
        } else {
            Err(UnknownLanguage(filename.to_string()))
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lexdiff")]
#[command(version)]
#[command(about = "Compare lexical-complexity (LCA) measures between two exams", long_about = None)]
pub struct Cli {
    /// Filename of the first exam in the comparison (e.g. AIP_A_EN.csv)
    pub exam1: String,

    /// Filename of the second exam in the comparison
    pub exam2: String,

    /// Should the comparison use LCA results computed on samples that
    /// were truncated at the same length?
    #[arg(long, value_enum, default_value = "yes")]
    pub truncation: Truncation,

    /// Nationality to analyse (accepted for future filtering, currently unused)
    #[arg(long, value_enum, default_value = "NL")]
    pub nationality: Nationality,

    /// Source language of the first exam (inferred from the filename when omitted)
    #[arg(long, value_enum)]
    pub lang1: Option<Language>,

    /// Source language of the second exam (inferred from the filename when omitted)
    #[arg(long, value_enum)]
    pub lang2: Option<Language>,

    /// Root directory containing the per-truncation LCA result subdirectories
    #[arg(long, value_name = "DIR", default_value = "results")]
    pub results_dir: PathBuf,

    /// Directory containing the subject metadata
    #[arg(long, value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Subject metadata CSV inside the data directory
    #[arg(long, value_name = "FILE", default_value = "subject_info.csv")]
    pub subject_info: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["lexdiff", "a_EN.csv", "b_EN.csv"]);
        assert_eq!(cli.exam1, "a_EN.csv");
        assert_eq!(cli.exam2, "b_EN.csv");
        assert_eq!(cli.truncation, Truncation::Yes);
        assert_eq!(cli.nationality, Nationality::Nl);
        assert!(cli.lang1.is_none());
        assert!(cli.lang2.is_none());
        assert_eq!(cli.results_dir, PathBuf::from("results"));
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.subject_info, PathBuf::from("subject_info.csv"));
    }

    #[test]
    fn test_cli_truncation_no() {
        let cli = Cli::parse_from(["lexdiff", "a.csv", "b.csv", "--truncation", "no"]);
        assert_eq!(cli.truncation, Truncation::No);
        assert_eq!(cli.truncation.subdir(), "lca_untruncated");
    }

    #[test]
    fn test_cli_rejects_invalid_truncation() {
        let result = Cli::try_parse_from(["lexdiff", "a.csv", "b.csv", "--truncation", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_nationality_values() {
        let cli = Cli::parse_from(["lexdiff", "a.csv", "b.csv", "--nationality", "DU"]);
        assert_eq!(cli.nationality, Nationality::Du);

        let result = Cli::try_parse_from(["lexdiff", "a.csv", "b.csv", "--nationality", "XX"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_explicit_languages() {
        let cli = Cli::parse_from([
            "lexdiff", "a.csv", "b.csv", "--lang1", "EN", "--lang2", "NL",
        ]);
        assert_eq!(cli.lang1, Some(Language::En));
        assert_eq!(cli.lang2, Some(Language::Nl));
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::detect("AIP_A_EN.csv"), Ok(Language::En));
        assert_eq!(Language::detect("STAT_C_NL.csv"), Ok(Language::Nl));
    }

    #[test]
    fn test_language_detection_checks_en_first() {
        assert_eq!(Language::detect("EN_vs_NL.csv"), Ok(Language::En));
    }

    #[test]
    fn test_language_detection_fails_fast() {
        let err = Language::detect("exam_a.csv").unwrap_err();
        assert_eq!(err, UnknownLanguage("exam_a.csv".to_string()));
        assert!(err.to_string().contains("exam_a.csv"));
    }
}
