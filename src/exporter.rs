// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Running DiscordChatExporter in a Docker container.
//!
//! The exporter writes one JSON file per run into a host directory mounted
//! at `/out` inside the container. [`latest_export`] then picks the newest
//! file from that directory for parsing.

use snafu::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// Container image used when none is configured.
pub const DEFAULT_IMAGE: &str = "tyrrrz/discordchatexporter:stable";

/// Error type for export failures.
#[derive(Debug, Snafu)]
pub enum ExportError {
    /// `docker info` could not be run or reported a failure.
    #[snafu(display("Docker is not installed or not running"))]
    DockerUnavailable,

    /// The docker binary could not be started.
    #[snafu(display("failed to run docker: {source}"))]
    SpawnDocker {
        /// The underlying process error.
        source: std::io::Error,
    },

    /// The exporter exited unsuccessfully.
    #[snafu(display("failed to export channel {channel_id}: {stderr}"))]
    ExportFailed {
        /// The channel that was being exported.
        channel_id: String,
        /// Trimmed standard error of the exporter.
        stderr: String,
    },

    /// The export directory could not be scanned.
    #[snafu(display("failed to scan {}: {source}", path.display()))]
    ScanDir {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying walk error.
        source: walkdir::Error,
    },
}

/// Everything needed to export one channel.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Discord channel identifier.
    pub channel_id: String,
    /// Discord token passed to the exporter.
    pub token: String,
    /// Host directory that receives the export.
    pub output_dir: PathBuf,
    /// Exporter container image.
    pub image: String,
}

impl ExportConfig {
    /// Creates a configuration using [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn new(
        channel_id: impl Into<String>,
        token: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            token: token.into(),
            output_dir: output_dir.into(),
            image: DEFAULT_IMAGE.to_owned(),
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("channel_id", &self.channel_id)
            .field("token", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("image", &self.image)
            .finish()
    }
}

/// Builds the `docker` arguments for an export run.
#[must_use]
pub fn docker_args(config: &ExportConfig) -> Vec<String> {
    vec![
        "run".into(),
        "--rm".into(),
        "-v".into(),
        format!("{}:/out", config.output_dir.display()),
        "--env".into(),
        format!("DISCORD_TOKEN={}", config.token),
        config.image.clone(),
        "export".into(),
        "-f".into(),
        "Json".into(),
        "-c".into(),
        config.channel_id.clone(),
        "-t".into(),
        config.token.clone(),
    ]
}

/// Checks that Docker is installed and the daemon answers.
///
/// # Errors
///
/// Returns [`ExportError::DockerUnavailable`] if `docker info` cannot be run
/// or exits unsuccessfully.
pub fn check_docker() -> Result<(), ExportError> {
    let output = Command::new("docker")
        .arg("info")
        .output()
        .map_err(|_| ExportError::DockerUnavailable)?;
    ensure!(output.status.success(), DockerUnavailableSnafu);
    Ok(())
}

/// Exports a channel by running the exporter container to completion.
///
/// # Errors
///
/// Returns an error if docker cannot be started or the export fails.
pub fn export_channel(config: &ExportConfig) -> Result<(), ExportError> {
    debug!(?config, "running exporter container");

    let output = Command::new("docker")
        .args(docker_args(config))
        .output()
        .context(SpawnDockerSnafu)?;

    ensure!(
        output.status.success(),
        ExportFailedSnafu {
            channel_id: config.channel_id.clone(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        }
    );
    Ok(())
}

/// Returns the most recently modified `.json` file directly inside `dir`.
///
/// Subdirectories are not searched. Files with the same modification time
/// are ordered by name, the greatest name winning. Returns `None` if there is
/// no export.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn latest_export(dir: &Path) -> Result<Option<PathBuf>, ExportError> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.context(ScanDirSnafu { path: dir })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }

        let modified = entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|m| m.modified());
        let modified = match modified {
            Ok(modified) => modified,
            Err(error) => {
                debug!(
                    path = %path.display(),
                    %error,
                    "no modification time, ranking export as oldest"
                );
                SystemTime::UNIX_EPOCH
            }
        };
        debug!(path = %path.display(), "found export candidate");

        // Equal times fall back to the file name so the pick does not depend on walk order.
        let candidate = (modified, path.to_path_buf());
        if latest.as_ref().is_none_or(|newest| candidate > *newest) {
            latest = Some(candidate);
        }
    }

    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;

    fn touch(path: &Path, secs: u64) {
        fs::write(path, "{}").unwrap();
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn builds_docker_arguments() {
        let config = ExportConfig::new("123", "secret", "/tmp/out");
        let args = docker_args(&config);

        assert_eq!(
            args,
            [
                "run",
                "--rm",
                "-v",
                "/tmp/out:/out",
                "--env",
                "DISCORD_TOKEN=secret",
                DEFAULT_IMAGE,
                "export",
                "-f",
                "Json",
                "-c",
                "123",
                "-t",
                "secret",
            ]
        );
    }

    #[test]
    fn uses_configured_image() {
        let config = ExportConfig {
            image: "example/exporter:1".into(),
            ..ExportConfig::new("1", "t", "/out")
        };
        assert!(docker_args(&config).contains(&"example/exporter:1".to_owned()));
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = ExportConfig::new("1", "very-secret-token", "/out");
        let debug = format!("{config:?}");

        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn finds_newest_export() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.json"), 1_000);
        touch(&dir.path().join("new.json"), 2_000);
        touch(&dir.path().join("middle.json"), 1_500);

        let latest = latest_export(dir.path()).unwrap();
        assert_eq!(latest, Some(dir.path().join("new.json")));
    }

    #[test]
    fn ignores_other_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("export.json"), 1_000);
        touch(&dir.path().join("notes.txt"), 5_000);
        fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("nested").join("deep.json"), 9_000);

        let latest = latest_export(dir.path()).unwrap();
        assert_eq!(latest, Some(dir.path().join("export.json")));
    }

    #[test]
    fn breaks_modification_time_ties_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.json"), 3_000);
        touch(&dir.path().join("c.json"), 3_000);
        touch(&dir.path().join("a.json"), 3_000);

        let latest = latest_export(dir.path()).unwrap();
        assert_eq!(latest, Some(dir.path().join("c.json")));
    }

    #[test]
    fn returns_none_for_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(latest_export(dir.path()).unwrap(), None);
    }

    #[test]
    fn returns_error_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = latest_export(&dir.path().join("missing"));
        assert!(matches!(result, Err(ExportError::ScanDir { .. })));
    }
}
