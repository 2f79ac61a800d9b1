use std::{
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use stand_core::StandConfig;
use stand_exec::ArchiveSettings;
use stand_observe::LoggerConfig;
use stand_taskws::TaskWsSettings;

/// Environment variable naming the configuration file when no argument is given.
pub const CONFIG_ENV: &str = "STAND_CONFIG";

/// Everything `standd` reads at startup.
///
/// A `stand` section in the file replaces the stock one as a whole; fields
/// missing inside it take their plain defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    pub logger: LoggerConfig,
    pub stand: StandConfig,
    pub task_ws: TaskWsSettings,
    pub archive: ArchiveSection,
    /// Chat bridge receiving notifications; logged only when absent.
    pub webhook_url: Option<String>,
    pub docker_program: String,
    pub probe_timeout_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8090)),
            logger: LoggerConfig::default(),
            stand: StandConfig::standard(),
            task_ws: TaskWsSettings::default(),
            archive: ArchiveSection::default(),
            webhook_url: None,
            docker_program: "docker".to_string(),
            probe_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveSection {
    pub download_dir: PathBuf,
    pub payload_dir: PathBuf,
    pub unzip_program: String,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        let stock = ArchiveSettings::default();
        Self {
            download_dir: stock.download_dir,
            payload_dir: stock.payload_dir,
            unzip_program: stock.unzip_program,
        }
    }
}

impl DaemonConfig {
    /// Read the file named by the first argument or [`CONFIG_ENV`]; defaults otherwise.
    pub fn load() -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
            .map(PathBuf::from);
        match path {
            Some(path) => Ok((Self::from_path(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Archive handling with the size ceiling taken from the stand limits.
    pub fn archive_settings(&self) -> ArchiveSettings {
        ArchiveSettings {
            download_dir: self.archive.download_dir.clone(),
            payload_dir: self.archive.payload_dir.clone(),
            max_bytes: self.stand.limits.max_archive_bytes,
            unzip_program: self.archive.unzip_program.clone(),
        }
    }
}
