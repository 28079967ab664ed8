//! Trainable statistical text classification
//!
//! TF-IDF features over transaction descriptions feeding a multinomial
//! Naive Bayes model with Laplace smoothing. Training requires a minimum
//! labeled set and fits the text representation over all of it before
//! the seeded 80/20 split; model parameters come from the train
//! partition, and held-out accuracy is reported for observability only.
//! The trained model lives in a
//! single-writer/multi-reader slot and is replaced wholesale on each
//! successful training call; inference on the untrained slot (or any
//! internal prediction failure) yields `None` so the orchestrator can
//! resolve it to the rule classifier.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Minimum labeled rows before training is attempted
const MIN_TRAINING_ROWS: usize = 20;
/// Vocabulary cap for the TF-IDF representation
const MAX_FEATURES: usize = 1000;
/// Fraction of labeled rows held out for accuracy measurement
const HOLDOUT_FRACTION: f64 = 0.2;
/// Fixed shuffle seed so the split is reproducible
const SPLIT_SEED: u64 = 42;
/// Laplace smoothing strength
const SMOOTHING: f64 = 1.0;

/// Common English stop words excluded from the vocabulary
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "below", "between", "both", "but", "by", "can", "did",
    "do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into", "is",
    "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "out", "over", "own", "same", "she", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "while", "who", "why", "will", "with", "you", "your",
];

/// Result of a training call. Refusal is a value, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingOutcome {
    Trained {
        /// Accuracy on the held-out partition (observability only)
        accuracy: f64,
        train_rows: usize,
        holdout_rows: usize,
    },
    Refused {
        rows: usize,
        required: usize,
    },
}

impl TrainingOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Trained { .. })
    }
}

/// The opaque trained artifact: fitted vectorizer + learned parameters
struct TrainedModel {
    vectorizer: TfIdfVectorizer,
    model: NaiveBayes,
}

/// Statistical classifier with an atomically replaced model slot
pub struct StatisticalClassifier {
    model: RwLock<Option<TrainedModel>>,
}

impl Default for StatisticalClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticalClassifier {
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
        }
    }

    /// Train on labeled transactions, replacing any previous model on
    /// success. Fewer than the minimum rows refuses and leaves the slot
    /// untouched.
    pub fn train(&self, rows: &[Transaction]) -> Result<TrainingOutcome> {
        if rows.len() < MIN_TRAINING_ROWS {
            warn!(
                rows = rows.len(),
                required = MIN_TRAINING_ROWS,
                "Training refused: labeled set too small"
            );
            return Ok(TrainingOutcome::Refused {
                rows: rows.len(),
                required: MIN_TRAINING_ROWS,
            });
        }

        // The text representation sees every labeled row; only the model
        // parameters below come from the train partition
        let documents: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
        let vectorizer = TfIdfVectorizer::fit(&documents, MAX_FEATURES);

        // Deterministic 80/20 shuffle split
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        indices.shuffle(&mut rng);
        let holdout_size = (rows.len() as f64 * HOLDOUT_FRACTION).ceil() as usize;
        let (holdout_idx, train_idx) = indices.split_at(holdout_size);

        let features: Vec<Vec<f64>> = train_idx
            .iter()
            .map(|&i| vectorizer.transform(&rows[i].description))
            .collect();
        let labels: Vec<&str> = train_idx
            .iter()
            .map(|&i| rows[i].category.as_str())
            .collect();
        let model = NaiveBayes::fit(&features, &labels, vectorizer.len());

        // Held-out accuracy, reported but never gating
        let mut correct = 0;
        for &i in holdout_idx {
            let predicted = model
                .predict(&vectorizer.transform(&rows[i].description))
                .and_then(|c| model.class(c));
            if predicted == Some(rows[i].category.as_str()) {
                correct += 1;
            }
        }
        let accuracy = correct as f64 / holdout_idx.len() as f64;

        info!(
            accuracy,
            train_rows = train_idx.len(),
            holdout_rows = holdout_idx.len(),
            vocabulary = vectorizer.len(),
            classes = model.class_count(),
            "Trained statistical classifier"
        );

        let mut slot = self
            .model
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire model slot lock".into()))?;
        *slot = Some(TrainedModel { vectorizer, model });

        Ok(TrainingOutcome::Trained {
            accuracy,
            train_rows: train_idx.len(),
            holdout_rows: holdout_idx.len(),
        })
    }

    /// Predict a category for a description. `None` when untrained or
    /// when prediction fails internally; never raises.
    pub fn classify(&self, description: &str) -> Option<String> {
        let slot = self.model.read().ok()?;
        let trained = slot.as_ref()?;

        let features = trained.vectorizer.transform(description);
        let class = trained.model.predict(&features)?;
        let category = trained.model.class(class)?;
        debug!(category, "Statistical prediction");
        Some(category.to_string())
    }

    pub fn is_trained(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }
}

/// Lowercase alphanumeric tokens, two characters or longer, stop words
/// removed
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2 && !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

/// Sparse-text TF-IDF with a frequency-capped vocabulary
struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Build the vocabulary and idf table from the corpus, keeping the
    /// `max_features` most frequent terms
    fn fit(documents: &[&str], max_features: usize) -> Self {
        let mut corpus_count: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc);
            for token in &tokens {
                *corpus_count.entry(token.clone()).or_insert(0) += 1;
            }
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *document_frequency.entry(token.clone()).or_insert(0) += 1;
            }
        }

        // Most frequent terms win the cap; alphabetical order breaks ties
        // and fixes index assignment.
        let mut terms: Vec<(String, usize)> = corpus_count.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(max_features);
        let mut selected: Vec<String> = terms.into_iter().map(|(t, _)| t).collect();
        selected.sort();

        let n_documents = documents.len();
        let mut vocabulary = HashMap::with_capacity(selected.len());
        let mut idf = Vec::with_capacity(selected.len());
        for (idx, term) in selected.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0);
            idf.push(((n_documents + 1) as f64 / (df + 1) as f64).ln() + 1.0);
            vocabulary.insert(term, idx);
        }

        Self { vocabulary, idf }
    }

    /// Dense tf-idf weights for one document
    fn transform(&self, text: &str) -> Vec<f64> {
        let mut weights = vec![0.0; self.vocabulary.len()];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return weights;
        }

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in &tokens {
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0) += 1;
            }
        }

        let total = tokens.len() as f64;
        for (idx, count) in counts {
            weights[idx] = (count as f64 / total) * self.idf[idx];
        }
        weights
    }

    fn len(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Multinomial Naive Bayes over tf-idf weights
struct NaiveBayes {
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl NaiveBayes {
    /// Fit class priors and smoothed feature likelihoods. Classes keep
    /// first-seen order, which makes argmax tie-breaks deterministic.
    fn fit(features: &[Vec<f64>], labels: &[&str], n_features: usize) -> Self {
        let mut classes: Vec<String> = Vec::new();
        let mut class_index: HashMap<&str, usize> = HashMap::new();
        let mut assignments = Vec::with_capacity(labels.len());
        for label in labels {
            let idx = *class_index.entry(label).or_insert_with(|| {
                classes.push(label.to_string());
                classes.len() - 1
            });
            assignments.push(idx);
        }

        let n_classes = classes.len();
        let mut class_count = vec![0usize; n_classes];
        let mut feature_sum = vec![vec![0.0; n_features]; n_classes];
        for (row, &class) in features.iter().zip(&assignments) {
            class_count[class] += 1;
            for (i, value) in row.iter().enumerate() {
                feature_sum[class][i] += value;
            }
        }

        let n_rows = labels.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&c| (c as f64 / n_rows).ln())
            .collect();

        let feature_log_prob = feature_sum
            .iter()
            .map(|sums| {
                let class_total: f64 = sums.iter().sum();
                let denominator = class_total + SMOOTHING * n_features as f64;
                sums.iter()
                    .map(|&s| ((s + SMOOTHING) / denominator).ln())
                    .collect()
            })
            .collect();

        Self {
            classes,
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Argmax joint log-likelihood; first class wins exact ties
    fn predict(&self, features: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for class in 0..self.classes.len() {
            let mut score = self.class_log_prior[class];
            for (i, &value) in features.iter().enumerate() {
                if value != 0.0 {
                    score += value * self.feature_log_prob[class][i];
                }
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((class, score));
            }
        }
        best.map(|(class, _)| class)
    }

    fn class(&self, idx: usize) -> Option<&str> {
        self.classes.get(idx).map(|c| c.as_str())
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn labeled(description: &str, category: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description,
            10.0,
            category,
        )
    }

    /// 24 rows with disjoint vocabularies so any split separates cleanly
    fn separable_rows() -> Vec<Transaction> {
        let mut rows = Vec::new();
        for _ in 0..12 {
            rows.push(labeled("burger shack meal", "Food"));
            rows.push(labeled("city taxi ride", "Transport"));
        }
        rows
    }

    #[test]
    fn test_train_refuses_below_minimum() {
        let classifier = StatisticalClassifier::new();
        let rows: Vec<Transaction> = (0..19).map(|_| labeled("coffee", "Food")).collect();

        let outcome = classifier.train(&rows).unwrap();
        assert_eq!(
            outcome,
            TrainingOutcome::Refused {
                rows: 19,
                required: 20
            }
        );
        assert!(!outcome.succeeded());
        assert!(!classifier.is_trained());
        assert_eq!(classifier.classify("coffee"), None);
    }

    #[test]
    fn test_train_and_classify() {
        let classifier = StatisticalClassifier::new();
        let outcome = classifier.train(&separable_rows()).unwrap();

        match outcome {
            TrainingOutcome::Trained {
                accuracy,
                train_rows,
                holdout_rows,
            } => {
                assert_eq!(accuracy, 1.0);
                assert_eq!(holdout_rows, 5);
                assert_eq!(train_rows, 19);
            }
            other => panic!("Expected trained outcome, got {:?}", other),
        }

        assert!(classifier.is_trained());
        assert_eq!(
            classifier.classify("late night burger").as_deref(),
            Some("Food")
        );
        assert_eq!(
            classifier.classify("taxi to the airport").as_deref(),
            Some("Transport")
        );
    }

    #[test]
    fn test_refusal_preserves_existing_model() {
        let classifier = StatisticalClassifier::new();
        let first = classifier.train(&separable_rows()).unwrap();
        assert!(first.succeeded());

        let tiny: Vec<Transaction> = (0..3).map(|_| labeled("noise", "Others")).collect();
        let second = classifier.train(&tiny).unwrap();
        assert!(!second.succeeded());

        assert!(classifier.is_trained());
        assert_eq!(
            classifier.classify("burger run").as_deref(),
            Some("Food")
        );
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = StatisticalClassifier::new();
        let b = StatisticalClassifier::new();
        let rows = separable_rows();
        assert_eq!(a.train(&rows).unwrap(), b.train(&rows).unwrap());
    }

    #[test]
    fn test_vocabulary_covers_every_labeled_row() {
        let classifier = StatisticalClassifier::new();
        // One token unique to each row; any split strands five of them
        // in the held-out partition
        let mut rows = Vec::new();
        for i in 0..12 {
            rows.push(labeled(&format!("burger shack meal extra{:02}", i), "Food"));
            rows.push(labeled(
                &format!("city taxi ride extra{:02}", i + 12),
                "Transport",
            ));
        }
        classifier.train(&rows).unwrap();

        let slot = classifier.model.read().unwrap();
        let trained = slot.as_ref().unwrap();
        for i in 0..24 {
            let token = format!("extra{:02}", i);
            assert!(trained.vectorizer.vocabulary.contains_key(&token));
        }
    }

    #[test]
    fn test_unseen_tokens_fall_to_prior() {
        let classifier = StatisticalClassifier::new();
        let mut rows = separable_rows();
        // Skew the class balance so the prior prefers Food under any split
        for _ in 0..12 {
            rows.push(labeled("burger shack meal", "Food"));
        }
        classifier.train(&rows).unwrap();

        // No trained vocabulary matches, so the majority prior decides
        assert_eq!(
            classifier.classify("zzz unseen tokens").as_deref(),
            Some("Food")
        );
    }

    #[test]
    fn test_tokenize_filters_stop_words_and_short_tokens() {
        let tokens = tokenize("The quick stop AT a McDonald's #42");
        assert!(tokens.contains(&"quick".to_string()));
        assert!(tokens.contains(&"mcdonald".to_string()));
        assert!(tokens.contains(&"42".to_string()));
        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"at".to_string()));
        assert!(!tokens.contains(&"a".to_string()));
    }

    #[test]
    fn test_vectorizer_vocabulary_cap() {
        let docs = [
            "alpha alpha alpha beta beta gamma",
            "alpha beta gamma delta",
        ];
        let vectorizer = TfIdfVectorizer::fit(&docs, 2);

        // Cap keeps the two most frequent terms
        assert_eq!(vectorizer.len(), 2);
        assert!(vectorizer.vocabulary.contains_key("alpha"));
        assert!(vectorizer.vocabulary.contains_key("beta"));
        assert!(!vectorizer.vocabulary.contains_key("delta"));
    }

    #[test]
    fn test_vectorizer_weights() {
        let docs = ["netflix subscription", "netflix movie", "grocery run"];
        let vectorizer = TfIdfVectorizer::fit(&docs, 1000);

        let weights = vectorizer.transform("netflix night");
        let netflix_idx = vectorizer.vocabulary["netflix"];
        assert!(weights[netflix_idx] > 0.0);

        // Terms in rarer documents carry more idf weight
        let grocery_idx = vectorizer.vocabulary["grocery"];
        assert!(vectorizer.idf[grocery_idx] > vectorizer.idf[netflix_idx]);

        // Unknown text maps to the zero vector
        assert!(vectorizer
            .transform("unrelated words")
            .iter()
            .all(|&w| w == 0.0));
    }

    #[test]
    fn test_naive_bayes_separates_classes() {
        let features = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
        ];
        let labels = vec!["Food", "Food", "Transport", "Transport"];
        let model = NaiveBayes::fit(&features, &labels, 2);

        assert_eq!(model.predict(&[1.0, 0.0]).and_then(|c| model.class(c)), Some("Food"));
        assert_eq!(
            model.predict(&[0.0, 1.0]).and_then(|c| model.class(c)),
            Some("Transport")
        );
    }
}
