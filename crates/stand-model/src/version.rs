use serde::{Deserialize, Serialize};

/// Application version information extracted from a diagnostic archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Revision of the core platform.
    pub core_revision: String,
    /// Revision of the customer project.
    pub customer_revision: String,
    /// Customer (project) name as reported, or its canonical alias.
    pub customer_name: String,
    /// Version of the companion factor build.
    pub factor_version: String,
}

impl VersionInfo {
    /// Copy of this value with a different customer name.
    pub fn with_customer_name(&self, name: impl Into<String>) -> Self {
        Self {
            customer_name: name.into(),
            ..self.clone()
        }
    }

    /// Human-readable form: `demo-21.19 (01fbd6f4, core 2c980808)`.
    pub fn display_string(&self) -> String {
        format!(
            "{}-{} ({}, core {})",
            self.customer_name, self.factor_version, self.customer_revision, self.core_revision
        )
    }
}
