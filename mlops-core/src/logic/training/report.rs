//! Text reports written next to the model
//!
//! - `model_params.txt` - hyperparameters
//! - `metrics.txt` - `key: value` scores plus the classification report
//! - `evaluation_results.txt` - scores, report, confusion matrix, ROC data

use std::fmt::Write as _;
use std::path::Path;

use super::evaluation::Evaluation;
use super::{TrainingError, TrainingResult};
use crate::logic::model::ForestParams;

pub const PARAMS_FILE_NAME: &str = "model_params.txt";
pub const METRICS_FILE_NAME: &str = "metrics.txt";
pub const RESULTS_FILE_NAME: &str = "evaluation_results.txt";

fn rule() -> String {
    "=".repeat(50)
}

pub fn render_params(params: &ForestParams) -> String {
    let mut out = format!("MODEL PARAMETERS\n{}\n\n", rule());
    for (key, value) in params.to_pairs() {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    out
}

/// Parsed back by `artifacts::evaluate_saved`
pub fn render_metrics(eval: &Evaluation) -> String {
    let mut out = format!("MODEL METRICS\n{}\n\n", rule());
    for (key, value) in eval.scores.to_pairs() {
        let _ = writeln!(out, "{}: {}", key, value);
    }
    let _ = write!(
        out,
        "\n{rule}\nCLASSIFICATION REPORT\n{rule}\n{}",
        eval.report,
        rule = rule()
    );
    out
}

pub fn render_results(eval: &Evaluation) -> String {
    let s = &eval.scores;
    let mut out = format!("MODEL EVALUATION RESULTS\n{}\n\n", rule());
    let _ = writeln!(out, "Accuracy: {}", s.accuracy);
    let _ = writeln!(out, "Precision: {}", s.precision);
    let _ = writeln!(out, "Recall: {}", s.recall);
    let _ = writeln!(out, "F1 Score: {}", s.f1_score);
    let _ = writeln!(out, "ROC AUC: {}", s.roc_auc);

    let section = |out: &mut String, title: &str, body: &str| {
        let _ = write!(out, "\n{rule}\n{}\n{rule}\n{}", title, body, rule = rule());
    };
    section(&mut out, "CLASSIFICATION REPORT", &eval.report);
    section(&mut out, "Confusion Matrix", &eval.confusion.to_string());

    let mut roc = String::from("fpr, tpr, threshold\n");
    for ((fpr, tpr), threshold) in eval
        .roc
        .fpr
        .iter()
        .zip(&eval.roc.tpr)
        .zip(&eval.roc.thresholds)
    {
        let _ = writeln!(roc, "{:.6}, {:.6}, {}", fpr, tpr, threshold);
    }
    section(&mut out, "ROC Curve Data (fpr, tpr, thresholds)", &roc);
    let _ = writeln!(out, "\n{}", rule());
    out
}

/// Write `contents` to `dir/name`, creating `dir`
pub fn write_report(dir: &Path, name: &str, contents: &str) -> TrainingResult<std::path::PathBuf> {
    let path = dir.join(name);
    std::fs::create_dir_all(dir).map_err(|source| TrainingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, contents).map_err(|source| TrainingError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation() -> Evaluation {
        let names = vec!["malignant".to_string(), "benign".to_string()];
        Evaluation::new(&[0, 1, 1, 0], &[0, 1, 0, 0], &[0.2, 0.9, 0.4, 0.1], &names)
    }

    #[test]
    fn test_params_report_lists_every_param() {
        let text = render_params(&ForestParams::default());
        assert!(text.starts_with("MODEL PARAMETERS"));
        assert!(text.contains("n_estimators: 100"));
        assert!(text.contains("max_depth: None"));
        assert!(text.contains("max_features: sqrt"));
    }

    #[test]
    fn test_metrics_report_has_key_value_lines() {
        let text = render_metrics(&evaluation());
        assert!(text.contains("accuracy: 0.75\n"));
        assert!(text.contains("precision: 1\n"));
        assert!(text.contains("recall: 0.5\n"));
        assert!(text.contains("CLASSIFICATION REPORT"));
    }

    #[test]
    fn test_results_report_sections() {
        let text = render_results(&evaluation());
        assert!(text.contains("ROC AUC: 1"));
        assert!(text.contains("Confusion Matrix\n"));
        assert!(text.contains("[[2 0]\n [1 1]]"));
        assert!(text.contains("fpr, tpr, threshold"));
        assert!(text.contains("inf"));
    }

    #[test]
    fn test_write_report_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");
        let path = write_report(&target, METRICS_FILE_NAME, "accuracy: 1\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "accuracy: 1\n");
    }
}
