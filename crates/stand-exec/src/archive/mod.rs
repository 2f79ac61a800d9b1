//! Diagnostic archive download and inspection.
//!
//! An archive is usable only if it holds both the lifecycle log (the version
//! manifest) and the party data file (the payload). The payload is extracted
//! into the directory that is bind-mounted into the launched container.

mod lifecycle;
pub use lifecycle::last_started_version;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stand_core::{ArtifactError, ArtifactSource, FetchedArtifact};
use stand_model::{ArtifactReference, VersionInfo};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::cmd;

/// Archive entry holding the start history of the application.
pub const MANIFEST_ENTRY: &str = "cdi.logs/cdi-lifecycle.log";
/// Archive entry holding the diagnostic data to import.
pub const PAYLOAD_ENTRY: &str = "sql.party.xls";

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Where downloaded archives are stored.
    pub download_dir: PathBuf,
    /// Where the payload is extracted; mounted into the container.
    pub payload_dir: PathBuf,
    pub max_bytes: u64,
    pub unzip_program: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("/var/lib/stand/downloads"),
            payload_dir: PathBuf::from("/var/lib/stand/diag"),
            max_bytes: 20 * 1024 * 1024,
            unzip_program: "unzip".to_string(),
        }
    }
}

pub struct DiagnosticArchiveSource {
    client: reqwest::Client,
    settings: ArchiveSettings,
}

impl DiagnosticArchiveSource {
    pub fn new(client: reqwest::Client, settings: ArchiveSettings) -> Self {
        Self { client, settings }
    }

    fn payload_path(&self) -> PathBuf {
        self.settings.payload_dir.join(PAYLOAD_ENTRY)
    }

    async fn unzip(&self, args: Vec<String>) -> Result<String, ArtifactError> {
        Ok(cmd::run(&self.settings.unzip_program, &args).await?.stdout)
    }

    async fn list_entries(&self, archive: &Path) -> Result<Vec<String>, ArtifactError> {
        let listing = self
            .unzip(vec!["-Z1".to_string(), archive.display().to_string()])
            .await?;
        Ok(listing.lines().map(|l| l.trim().to_string()).collect())
    }

    /// Drop a payload left by an earlier archive so it cannot be imported by mistake.
    async fn discard_payload(&self) {
        let path = self.payload_path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "stale payload removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "cannot remove stale payload"),
        }
    }
}

#[async_trait]
impl ArtifactSource for DiagnosticArchiveSource {
    async fn fetch(&self, reference: &ArtifactReference) -> Result<FetchedArtifact, ArtifactError> {
        let limit = self.settings.max_bytes;
        tokio::fs::create_dir_all(&self.settings.download_dir).await?;

        let mut resp = self
            .client
            .get(&reference.location)
            .send()
            .await
            .map_err(|e| ArtifactError::Transfer(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ArtifactError::Transfer(format!("server answered {}", resp.status())));
        }
        if resp.content_length().is_some_and(|len| len > limit) {
            return Err(ArtifactError::TooLarge { limit });
        }

        let path = self.settings.download_dir.join(local_name(&reference.file_name));
        let mut file = tokio::fs::File::create(&path).await?;
        let mut size_bytes: u64 = 0;

        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| ArtifactError::Transfer(e.to_string()))?
        {
            size_bytes += chunk.len() as u64;
            if size_bytes > limit {
                drop(file);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "cannot remove oversized download");
                }
                return Err(ArtifactError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        info!(path = %path.display(), size_bytes, "archive downloaded");
        Ok(FetchedArtifact { path, size_bytes })
    }

    async fn parse(&self, path: &Path) -> Result<VersionInfo, ArtifactError> {
        let entries = self.list_entries(path).await?;
        let has_manifest = entries.iter().any(|e| e == MANIFEST_ENTRY);
        let has_payload = entries.iter().any(|e| e == PAYLOAD_ENTRY);
        debug!(has_manifest, has_payload, entries = entries.len(), "archive listed");

        if !has_manifest {
            self.discard_payload().await;
            return Err(ArtifactError::MissingManifest);
        }
        if !has_payload {
            return Err(ArtifactError::MissingPayload);
        }

        let log = self
            .unzip(vec![
                "-p".to_string(),
                path.display().to_string(),
                MANIFEST_ENTRY.to_string(),
            ])
            .await?;
        let Some(version) = last_started_version(&log) else {
            self.discard_payload().await;
            return Err(ArtifactError::MissingManifest);
        };

        tokio::fs::create_dir_all(&self.settings.payload_dir).await?;
        self.unzip(vec![
            "-o".to_string(),
            "-j".to_string(),
            path.display().to_string(),
            PAYLOAD_ENTRY.to_string(),
            "-d".to_string(),
            self.settings.payload_dir.display().to_string(),
        ])
        .await?;

        info!(version = %version.display_string(), "archive parsed");
        Ok(version)
    }
}

/// Unique on-disk name keeping only the last path component of the upload name.
fn local_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|b| !b.is_empty() && *b != "..")
        .unwrap_or("archive.zip");
    format!("{}-{base}", uuid::Uuid::new_v4())
}
