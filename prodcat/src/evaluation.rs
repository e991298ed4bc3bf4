//! Accuracy and per-category scores on labeled data.

use core::fmt;

use tracing::debug;

use crate::corpus::Corpus;
use crate::errors::Result;
use crate::predictor::Predictor;
use crate::utils::Indexer;

/// Scores of a single category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryScores {
    pub category: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,

    /// Number of reference rows of the category.
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Evaluation result.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationReport {
    n_examples: usize,
    n_correct: usize,
    categories: Vec<CategoryScores>,
}

impl EvaluationReport {
    pub fn n_examples(&self) -> usize {
        self.n_examples
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.n_correct, self.n_examples)
    }

    pub fn categories(&self) -> &[CategoryScores] {
        &self.categories
    }

    /// Unweighted mean of precision, recall and F1 over categories with a reference row.
    pub fn macro_average(&self) -> (f64, f64, f64) {
        let supported: Vec<_> = self.categories.iter().filter(|c| c.support != 0).collect();
        if supported.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let n = supported.len() as f64;
        let sum = supported.iter().fold((0.0, 0.0, 0.0), |acc, c| {
            (acc.0 + c.precision, acc.1 + c.recall, acc.2 + c.f1)
        });
        (sum.0 / n, sum.1 / n, sum.2 / n)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .categories
            .iter()
            .map(|c| c.category.len())
            .chain([12])
            .max()
            .unwrap_or(12);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.categories {
            writeln!(
                f,
                "{:>width$} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                c.category, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.4} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy(),
            self.n_examples
        )?;
        let (p, r, f1) = self.macro_average();
        write!(
            f,
            "{:>width$} {:>9.4} {:>9.4} {:>9.4} {:>9}",
            "macro avg", p, r, f1, self.n_examples
        )
    }
}

/// Accumulates reference/hypothesis pairs.
#[derive(Default)]
pub struct Evaluator {
    categories: Indexer<String>,
    n_tp: Vec<usize>,
    n_fp: Vec<usize>,
    n_fn: Vec<usize>,
    n_examples: usize,
    n_correct: usize,
}

impl Evaluator {
    /// Creates an evaluator. `categories` fixes the order of the first rows of the report;
    /// categories seen later are appended.
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut evaluator = Self::default();
        for category in categories {
            evaluator.category_id(category.as_ref());
        }
        evaluator
    }

    fn category_id(&mut self, category: &str) -> usize {
        let id = self.categories.get_id(category);
        if id == self.n_tp.len() {
            self.n_tp.push(0);
            self.n_fp.push(0);
            self.n_fn.push(0);
        }
        id
    }

    /// Adds one prediction.
    pub fn push(&mut self, reference: &str, hypothesis: &str) {
        let r = self.category_id(reference);
        let h = self.category_id(hypothesis);
        self.n_examples += 1;
        if r == h {
            self.n_correct += 1;
            self.n_tp[r] += 1;
        } else {
            self.n_fn[r] += 1;
            self.n_fp[h] += 1;
        }
    }

    /// Predicts every row of a corpus and adds the result.
    ///
    /// # Errors
    ///
    /// Prediction errors are returned as is.
    pub fn push_corpus(&mut self, predictor: &Predictor, corpus: &Corpus) -> Result<()> {
        for record in corpus.records() {
            let features = predictor.features().build_normalized(record.title.clone());
            let hypothesis = predictor.classifier().predict(&features)?;
            if hypothesis != record.label {
                debug!(title = %record.title, reference = %record.label, hypothesis, "miss");
            }
            self.push(&record.label, hypothesis);
        }
        Ok(())
    }

    pub fn report(&self) -> EvaluationReport {
        let categories = self
            .categories
            .keys()
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let precision = ratio(self.n_tp[i], self.n_tp[i] + self.n_fp[i]);
                let recall = ratio(self.n_tp[i], self.n_tp[i] + self.n_fn[i]);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                CategoryScores {
                    category: category.clone(),
                    precision,
                    recall,
                    f1,
                    support: self.n_tp[i] + self.n_fn[i],
                }
            })
            .collect();
        EvaluationReport {
            n_examples: self.n_examples,
            n_correct: self.n_correct,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_report() {
        let mut evaluator = Evaluator::new(["tvs", "cpus"]);
        evaluator.push("tvs", "tvs");
        evaluator.push("tvs", "cpus");
        evaluator.push("cpus", "cpus");
        evaluator.push("microwaves", "tvs");
        let report = evaluator.report();

        assert_eq!(4, report.n_examples());
        assert!((report.accuracy() - 0.5).abs() < EPSILON);

        let names: Vec<_> = report.categories().iter().map(|c| c.category.as_str()).collect();
        assert_eq!(vec!["tvs", "cpus", "microwaves"], names);

        let tvs = &report.categories()[0];
        assert!((tvs.precision - 0.5).abs() < EPSILON);
        assert!((tvs.recall - 0.5).abs() < EPSILON);
        assert!((tvs.f1 - 0.5).abs() < EPSILON);
        assert_eq!(2, tvs.support);

        let cpus = &report.categories()[1];
        assert!((cpus.precision - 0.5).abs() < EPSILON);
        assert!((cpus.recall - 1.0).abs() < EPSILON);
        assert!((cpus.f1 - 2.0 / 3.0).abs() < EPSILON);
        assert_eq!(1, cpus.support);

        let microwaves = &report.categories()[2];
        assert_eq!(0.0, microwaves.precision);
        assert_eq!(0.0, microwaves.f1);
        assert_eq!(1, microwaves.support);

        let (p, r, f1) = report.macro_average();
        assert!((p - 1.0 / 3.0).abs() < EPSILON);
        assert!((r - 0.5).abs() < EPSILON);
        assert!((f1 - (0.5 + 2.0 / 3.0) / 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_macro_average_skips_unsupported() {
        let mut evaluator = Evaluator::new(["tvs", "cpus"]);
        evaluator.push("tvs", "tvs");
        let (p, r, f1) = evaluator.report().macro_average();

        assert_eq!((1.0, 1.0, 1.0), (p, r, f1));
    }

    #[test]
    fn test_empty_report() {
        let report = Evaluator::new(["tvs"]).report();

        assert_eq!(0.0, report.accuracy());
        assert_eq!((0.0, 0.0, 0.0), report.macro_average());
    }

    #[test]
    fn test_display() {
        let mut evaluator = Evaluator::new(["tvs"]);
        evaluator.push("tvs", "tvs");
        let text = evaluator.report().to_string();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(6, lines.len());
        assert!(lines[2].trim_start().starts_with("tvs"));
        assert!(lines[4].trim_start().starts_with("accuracy"));
        assert!(lines[5].trim_start().starts_with("macro avg"));
    }
}
