use serde::{Deserialize, Serialize};

/// Pointer to an uploaded diagnostic archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactReference {
    /// File name as uploaded; the extension is checked against this.
    pub file_name: String,
    /// Where the archive can be fetched from (usually a URL).
    pub location: String,
}

impl ArtifactReference {
    pub fn new(file_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            location: location.into(),
        }
    }

    /// Case-insensitive suffix check, e.g. `has_extension(".zip")`.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.file_name
            .to_ascii_lowercase()
            .ends_with(&ext.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check() {
        assert!(ArtifactReference::new("diag.zip", "u").has_extension(".zip"));
        assert!(ArtifactReference::new("DIAG.ZIP", "u").has_extension(".zip"));
        assert!(!ArtifactReference::new("diag.tar.gz", "u").has_extension(".zip"));
        assert!(!ArtifactReference::new("zip", "u").has_extension(".zip"));
    }
}
