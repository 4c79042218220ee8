//! Domain gating: restrict answers to the configured subject domain.
//!
//! The gate is a static keyword allowlist checked against the lowercased
//! query. It is deliberately permissive (generic interrogatives are on the
//! list), so it errs toward answering; out-of-domain queries that slip
//! through are still caught by the refusal instruction in the system prompt.

/// The fixed refusal sentence for out-of-domain queries.
///
/// Callers and tests match this literally; a refused request yields exactly
/// this sentence with nothing appended.
pub const REFUSAL_SENTENCE: &str = "Sorry, I am built to answer only data science questions.";

/// Keywords marking a query as in-domain for the data science assistant.
const DATA_SCIENCE_KEYWORDS: &[&str] = &[
    "data", "dataset", "pandas", "numpy", "scikit", "sklearn", "matplotlib", "seaborn",
    "plot", "visualization", "statistic", "stats", "probability", "regression",
    "classification", "clustering", "kmeans", "k-means", "svm", "random forest",
    "xgboost", "neural", "deep learning", "tensorflow", "keras", "pytorch",
    "nlp", "tokenization", "transformer", "llm", "model", "training", "validation",
    "cross-validation", "feature engineering", "feature selection", "eda", "etl",
    "pipeline", "mlops", "spark", "hadoop", "big data", "sql", "exploratory",
    "hypothesis", "a/b test", "bayesian", "time series", "arima", "forecast",
    "anomaly", "roc", "auc", "precision", "recall", "f1", "confusion matrix",
    "gradient descent", "optimizer", "loss function", "hyperparameter", "grid search",
    "overfitting", "underfitting", "bias", "variance", "machine learning",
    "artificial intelligence", "reinforcement learning", "supervised", "unsupervised",
    "algorithm", "computer vision", "generative", "gan", "autoencoder", "rnn", "cnn",
    "lstm", "bert", "gpt", "large language model", "embedding", "vector", "tensor",
    "prediction", "predict", "inference", "notebook", "jupyter", "kaggle",
    // Generic interrogatives: intentionally broad, see module docs.
    "what", "how", "why", "when", "where", "which", "can", "could", "would", "should",
    "is", "are", "do", "does", "explain", "help",
];

/// A keyword-allowlist domain classifier.
///
/// `allows` is a cheap lexical check run before any provider spend; an
/// empty or whitespace-only query is always out of domain. Single-word
/// keywords match whole tokens only, so "do" does not fire inside
/// "sourdough"; multi-word keywords match as phrases.
#[derive(Debug, Clone)]
pub struct KeywordDomainGate {
    keywords: Vec<String>,
}

impl Default for KeywordDomainGate {
    fn default() -> Self {
        Self { keywords: DATA_SCIENCE_KEYWORDS.iter().map(|k| k.to_string()).collect() }
    }
}

impl KeywordDomainGate {
    /// Create a gate with the default data-science keyword set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate with a custom keyword set (compared lowercased).
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self { keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect() }
    }

    /// True if the query is judged in-domain.
    pub fn allows(&self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }
        let lowered = query.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '-' && c != '/')
            .filter(|t| !t.is_empty())
            .collect();
        self.keywords.iter().any(|k| {
            if k.contains(' ') {
                lowered.contains(k.as_str())
            } else {
                tokens.iter().any(|t| *t == k.as_str())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_out_of_domain() {
        let gate = KeywordDomainGate::new();
        assert!(!gate.allows(""));
        assert!(!gate.allows("   "));
    }

    #[test]
    fn data_science_terms_pass() {
        let gate = KeywordDomainGate::new();
        assert!(gate.allows("Explain gradient descent"));
        assert!(gate.allows("PANDAS dataframe merge"));
    }

    #[test]
    fn keyword_free_queries_are_refused() {
        let gate = KeywordDomainGate::new();
        assert!(!gate.allows("bake me a sourdough loaf"));
    }

    #[test]
    fn custom_keyword_set_is_lowercased() {
        let gate = KeywordDomainGate::with_keywords(vec!["Astronomy".into()]);
        assert!(gate.allows("latest astronomy news"));
        assert!(!gate.allows("what about geology"));
    }
}
