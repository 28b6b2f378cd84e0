use serde::{Deserialize, Serialize};

/// An item (e.g. a thesis) to be judged by one committee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub name: String,
    pub group: String,
    /// Used only to partition the exported output.
    pub category: String,
    /// Evaluators who may not judge this case.
    pub sponsors: Vec<String>,
}

impl Case {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        group: impl Into<String>,
        category: impl Into<String>,
        sponsors: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group: group.into(),
            category: category.into(),
            sponsors,
        }
    }

    pub fn is_sponsored_by(&self, evaluator: &str) -> bool {
        self.sponsors.iter().any(|sponsor| sponsor == evaluator)
    }
}
