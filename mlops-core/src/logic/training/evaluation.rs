//! Evaluation Metrics
//!
//! Binary classification metrics. Class 1 is the positive class and an
//! undefined ratio (0/0) counts as 0.

use serde::{Deserialize, Serialize};

/// Headline scores on the held-out set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub roc_auc: f64,
}

impl Scores {
    /// `name -> value` in report order
    pub fn to_pairs(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("accuracy", self.accuracy),
            ("precision", self.precision),
            ("recall", self.recall),
            ("f1_score", self.f1_score),
            ("roc_auc", self.roc_auc),
        ]
    }
}

/// `matrix[true][predicted]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub matrix: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Self {
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t < n_classes && p < n_classes {
                matrix[t][p] += 1;
            }
        }
        Self { matrix }
    }

    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Samples predicted as `class`
    pub fn predicted(&self, class: usize) -> usize {
        self.matrix.iter().map(|row| row[class]).sum()
    }

    /// Samples whose true label is `class`
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.predicted(class))
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.support(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes()).map(|c| self.true_positives(c)).sum();
        ratio(correct, self.total())
    }
}

impl std::fmt::Display for ConfusionMatrix {
    /// numpy-style `[[a b]\n [c d]]`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .matrix
            .iter()
            .flatten()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);

        write!(f, "[")?;
        for (i, row) in self.matrix.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            let cells: Vec<String> = row.iter().map(|v| format!("{:>width$}", v)).collect();
            write!(f, "[{}]", cells.join(" "))?;
        }
        write!(f, "]")
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

// ============================================================================
// ROC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Decreasing; the first entry is +inf so the curve starts at (0, 0)
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// `y_score` is the predicted probability of class 1
    pub fn new(y_true: &[usize], y_score: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..y_true.len().min(y_score.len())).collect();
        order.sort_by(|&a, &b| y_score[b].total_cmp(&y_score[a]));

        let mut tps = vec![0usize];
        let mut fps = vec![0usize];
        let mut thresholds = vec![f64::INFINITY];
        let (mut tp, mut fp) = (0usize, 0usize);

        for (pos, &i) in order.iter().enumerate() {
            if y_true[i] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_value = order
                .get(pos + 1)
                .map_or(true, |&next| y_score[next] != y_score[i]);
            if last_of_value {
                tps.push(tp);
                fps.push(fp);
                thresholds.push(y_score[i]);
            }
        }

        Self {
            fpr: fps.iter().map(|&v| ratio(v, fp)).collect(),
            tpr: tps.iter().map(|&v| ratio(v, tp)).collect(),
            thresholds,
        }
    }

    /// Trapezoidal area under the curve
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
            .sum()
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Everything training reports about the test set
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub scores: Scores,
    pub confusion: ConfusionMatrix,
    pub roc: RocCurve,
    pub report: String,
}

impl Evaluation {
    pub fn new(y_true: &[usize], y_pred: &[usize], y_score: &[f64], target_names: &[String]) -> Self {
        let confusion = ConfusionMatrix::new(y_true, y_pred, target_names.len().max(2));
        let roc = RocCurve::new(y_true, y_score);

        let has_both = y_true.contains(&0) && y_true.contains(&1);
        let roc_auc = if has_both {
            roc.auc()
        } else {
            log::warn!("ROC AUC undefined: test set holds a single class");
            0.0
        };

        let scores = Scores {
            accuracy: confusion.accuracy(),
            precision: confusion.precision(1),
            recall: confusion.recall(1),
            f1_score: confusion.f1(1),
            roc_auc,
        };
        let report = classification_report(&confusion, target_names);

        Self {
            scores,
            confusion,
            roc,
            report,
        }
    }
}

/// Per-class precision/recall/F1 text table
pub fn classification_report(confusion: &ConfusionMatrix, target_names: &[String]) -> String {
    let n_classes = confusion.n_classes();
    let names: Vec<String> = (0..n_classes)
        .map(|c| target_names.get(c).cloned().unwrap_or_else(|| c.to_string()))
        .collect();
    let width = names
        .iter()
        .map(|n| n.len())
        .chain(std::iter::once("weighted avg".len()))
        .max()
        .unwrap_or(12);

    let mut out = format!(
        "{:>width$} {:>9} {:>9} {:>9} {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    );

    for (class, name) in names.iter().enumerate() {
        out.push_str(&format!(
            "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
            name,
            confusion.precision(class),
            confusion.recall(class),
            confusion.f1(class),
            confusion.support(class)
        ));
    }

    let total = confusion.total();
    out.push('\n');
    out.push_str(&format!(
        "{:>width$} {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy",
        "",
        "",
        confusion.accuracy(),
        total
    ));

    let macro_avg = |f: &dyn Fn(usize) -> f64| (0..n_classes).map(f).sum::<f64>() / n_classes as f64;
    let weighted_avg = |f: &dyn Fn(usize) -> f64| {
        (0..n_classes)
            .map(|c| f(c) * confusion.support(c) as f64)
            .sum::<f64>()
            / total.max(1) as f64
    };

    let p = |c| confusion.precision(c);
    let r = |c| confusion.recall(c);
    let f1 = |c| confusion.f1(c);

    out.push_str(&format!(
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        "macro avg",
        macro_avg(&p),
        macro_avg(&r),
        macro_avg(&f1),
        total
    ));
    out.push_str(&format!(
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
        "weighted avg",
        weighted_avg(&p),
        weighted_avg(&r),
        weighted_avg(&f1),
        total
    ));

    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["malignant".to_string(), "benign".to_string()]
    }

    #[test]
    fn test_confusion_and_scores() {
        let y_true = [0, 0, 1, 1, 1, 1];
        let y_pred = [0, 1, 1, 1, 1, 0];
        let cm = ConfusionMatrix::new(&y_true, &y_pred, 2);

        assert_eq!(cm.matrix, vec![vec![1, 1], vec![1, 3]]);
        assert!((cm.accuracy() - 4.0 / 6.0).abs() < 1e-12);
        assert!((cm.precision(1) - 0.75).abs() < 1e-12);
        assert!((cm.recall(1) - 0.75).abs() < 1e-12);
        assert!((cm.f1(1) - 0.75).abs() < 1e-12);
        assert_eq!(cm.to_string(), "[[1 1]\n [1 3]]");
    }

    #[test]
    fn test_zero_division_is_zero() {
        let cm = ConfusionMatrix::new(&[0, 0], &[0, 0], 2);
        assert_eq!(cm.precision(1), 0.0);
        assert_eq!(cm.recall(1), 0.0);
        assert_eq!(cm.f1(1), 0.0);
    }

    #[test]
    fn test_roc_perfect_and_inverted() {
        let y_true = [0, 0, 1, 1];
        let perfect = RocCurve::new(&y_true, &[0.1, 0.2, 0.8, 0.9]);
        assert!((perfect.auc() - 1.0).abs() < 1e-12);
        assert_eq!(perfect.thresholds[0], f64::INFINITY);
        assert_eq!(perfect.fpr.first(), Some(&0.0));
        assert_eq!(perfect.tpr.last(), Some(&1.0));

        let inverted = RocCurve::new(&y_true, &[0.9, 0.8, 0.2, 0.1]);
        assert!(inverted.auc().abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_with_one_swapped_pair() {
        let roc = RocCurve::new(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]);
        assert!((roc.auc() - 0.75).abs() < 1e-12);
        assert_eq!(roc.thresholds.len(), 5);
    }

    #[test]
    fn test_roc_ties_share_a_point() {
        let roc = RocCurve::new(&[0, 1, 1], &[0.5, 0.5, 0.9]);
        assert_eq!(roc.thresholds.len(), 3);
        assert!((roc.auc() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_evaluation_bundles_everything() {
        let y_true = [0, 0, 1, 1];
        let y_pred = [0, 0, 1, 1];
        let eval = Evaluation::new(&y_true, &y_pred, &[0.0, 0.1, 0.9, 1.0], &names());

        assert_eq!(eval.scores.accuracy, 1.0);
        assert_eq!(eval.scores.roc_auc, 1.0);
        assert!(eval.report.contains("malignant"));
        assert!(eval.report.contains("weighted avg"));
        assert!(eval.report.contains("accuracy"));
    }

    #[test]
    fn test_single_class_auc_is_zero() {
        let eval = Evaluation::new(&[1, 1], &[1, 1], &[0.7, 0.8], &names());
        assert_eq!(eval.scores.roc_auc, 0.0);
        assert_eq!(eval.scores.recall, 1.0);
    }

    #[test]
    fn test_report_layout() {
        let cm = ConfusionMatrix::new(&[0, 1, 1, 1], &[0, 1, 1, 0], 2);
        let report = classification_report(&cm, &names());
        let lines: Vec<&str> = report.lines().collect();

        assert!(lines[0].ends_with("precision    recall  f1-score   support"));
        assert!(lines[2].trim_start().starts_with("malignant"));
        assert!(lines[2].ends_with("1"));
        assert!(lines[3].ends_with("3"));
    }
}
