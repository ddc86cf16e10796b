use serde::{Deserialize, Serialize};

/// A roster entry. Supplied to a grading session, never modified by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub middle_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        middle_name: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            middle_name: middle_name.into(),
            first_name: first_name.into(),
            full_name: None,
        }
    }

    /// Full name if the API supplied one, otherwise "middle first".
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return full.to_string();
        }
        [self.middle_name.trim(), self.first_name.trim()]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
