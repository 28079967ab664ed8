//! The shared category taxonomy
//!
//! A `CategorySet` is the single source of truth for the label space:
//! the ordered list of named categories, each with its keyword patterns,
//! plus the catch-all label. It is built once and shared by `Arc` so the
//! rule, statistical, and semantic classifiers all agree on the labels.

use std::sync::Arc;

/// One named category and the lowercase substring patterns that map to it
#[derive(Debug, Clone)]
pub struct CategoryGroup {
    name: String,
    patterns: Vec<String>,
}

impl CategoryGroup {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Ordered, immutable category taxonomy
///
/// Category order matters: the rule classifier returns the first group
/// whose pattern matches, so earlier groups win ties.
#[derive(Debug, Clone)]
pub struct CategorySet {
    groups: Vec<CategoryGroup>,
    fallback: String,
}

impl CategorySet {
    /// Build a custom set. The fallback label is the catch-all returned
    /// when nothing matches; it is not part of the ordered groups.
    pub fn new(groups: Vec<CategoryGroup>, fallback: &str) -> Self {
        Self {
            groups,
            fallback: fallback.to_string(),
        }
    }

    /// The standard expense taxonomy
    pub fn standard() -> Self {
        Self::new(
            vec![
                CategoryGroup::new(
                    "Food",
                    &[
                        "restaurant",
                        "food",
                        "cafe",
                        "starbucks",
                        "mcdonald",
                        "pizza",
                        "grocery",
                        "supermarket",
                    ],
                ),
                CategoryGroup::new(
                    "Transport",
                    &[
                        "uber", "taxi", "gas", "fuel", "parking", "metro", "bus", "train",
                    ],
                ),
                CategoryGroup::new(
                    "Entertainment",
                    &[
                        "netflix", "spotify", "movie", "cinema", "game", "concert", "theater",
                    ],
                ),
                CategoryGroup::new(
                    "Shopping",
                    &[
                        "amazon", "mall", "store", "shop", "purchase", "buy", "clothes",
                    ],
                ),
                CategoryGroup::new(
                    "Utilities",
                    &["electric", "water", "internet", "phone", "rent", "bill"],
                ),
                CategoryGroup::new(
                    "Healthcare",
                    &[
                        "hospital", "doctor", "pharmacy", "medical", "dental", "health",
                    ],
                ),
                CategoryGroup::new(
                    "Education",
                    &["school", "college", "course", "book", "education", "tuition"],
                ),
            ],
            "Others",
        )
    }

    /// Wrap for sharing across classifiers
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// The catch-all label
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Named category labels, in order, without the fallback
    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Comma-separated label list for remote model prompts, fallback
    /// included
    pub fn prompt_list(&self) -> String {
        let mut names = self.names();
        names.push(self.fallback.as_str());
        names.join(", ")
    }

    /// Resolve a raw label to its canonical form, case-insensitively.
    /// The fallback label resolves to itself; unknown labels are None.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        let trimmed = label.trim();
        if trimmed.eq_ignore_ascii_case(&self.fallback) {
            return Some(&self.fallback);
        }
        self.groups
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(trimmed))
            .map(|g| g.name.as_str())
    }

    /// Resolve a raw label, coercing anything unknown to the fallback
    pub fn resolve_or_fallback(&self, label: &str) -> &str {
        self.resolve(label).unwrap_or(&self.fallback)
    }

    /// Whether a label (canonical or not) belongs to the set
    pub fn contains(&self, label: &str) -> bool {
        self.resolve(label).is_some()
    }
}
