//! Maven wrapper strategy.
use async_trait::async_trait;
use color_eyre::eyre::{WrapErr, eyre};
use log::*;
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path, sync::LazyLock};

use crate::{
    exec::{CommandRunner, ProcessRunner},
    result::Result,
    strategy::{BuildToolStrategy, VersionInfo},
    version::VersionNumber,
};

const MAVEN_METADATA_URL: &str =
    "https://repo1.maven.org/maven2/org/apache/maven/apache-maven/maven-metadata.xml";

const WRAPPER_PROPERTIES: &str = ".mvn/wrapper/maven-wrapper.properties";

static DISTRIBUTION_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"apache-maven-(.+)-bin\.zip").unwrap()
});

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    versioning: Versioning,
}

#[derive(Debug, Deserialize)]
struct Versioning {
    versions: Versions,
}

#[derive(Debug, Deserialize)]
struct Versions {
    version: Vec<String>,
}

pub struct MavenStrategy {
    runner: Box<dyn CommandRunner>,
}

impl MavenStrategy {
    pub fn new() -> Self {
        Self {
            runner: Box::new(ProcessRunner),
        }
    }

    #[cfg(test)]
    fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

fn extract_distribution_version(properties: &str) -> Result<VersionInfo> {
    for line in properties.lines() {
        if line.trim_start().starts_with("distributionUrl")
            && let Some(caps) = DISTRIBUTION_URL_REGEX.captures(line)
        {
            return Ok(VersionInfo {
                version: caps[1].to_string(),
            });
        }
    }

    Err(eyre!(
        "no distributionUrl entry found in maven-wrapper.properties"
    ))
}

/// Pick the newest version from Maven Central metadata. Qualified
/// versions (alpha, beta, rc) only count when pre-releases are allowed.
fn select_latest(
    metadata: &str,
    allow_pre_release: bool,
) -> Result<VersionInfo> {
    let metadata: MavenMetadata = quick_xml::de::from_str(metadata)
        .wrap_err("failed to parse maven-metadata.xml")?;

    let version = metadata
        .versioning
        .versions
        .version
        .into_iter()
        .filter(|v| allow_pre_release || !v.contains('-'))
        .max_by_key(|v| VersionNumber::parse(v))
        .ok_or_else(|| eyre!("no usable version in maven metadata"))?;

    Ok(VersionInfo { version })
}

#[async_trait]
impl BuildToolStrategy for MavenStrategy {
    fn build_tool_name(&self) -> String {
        "Maven".to_string()
    }

    fn extract_current_version(
        &self,
        root_project_dir: &Path,
    ) -> Result<VersionInfo> {
        let properties = root_project_dir.join(WRAPPER_PROPERTIES);
        let content =
            fs::read_to_string(&properties).wrap_err_with(|| {
                format!("failed to read {}", properties.display())
            })?;

        extract_distribution_version(&content)
    }

    async fn lookup_latest_version(
        &self,
        allow_pre_release: bool,
    ) -> Result<VersionInfo> {
        let metadata = reqwest::get(MAVEN_METADATA_URL)
            .await?
            .error_for_status()?
            .text()
            .await
            .wrap_err("failed to fetch maven metadata")?;

        select_latest(&metadata, allow_pre_release)
    }

    fn run_wrapper(
        &self,
        root_project_dir: &Path,
        version: &VersionInfo,
    ) -> Result<()> {
        debug!("running maven wrapper goal for {}", version.version);

        self.runner.run(
            root_project_dir,
            "./mvnw",
            &[
                "wrapper:wrapper".to_string(),
                format!("-Dmaven={}", version.version),
            ],
        )?;

        Ok(())
    }

    fn wrapper_files(&self, _root_project_dir: &Path) -> Vec<String> {
        vec![
            "mvnw".to_string(),
            "mvnw.cmd".to_string(),
            ".mvn/wrapper".to_string(),
        ]
    }

    fn release_notes_link(&self, version: &str) -> String {
        format!("https://maven.apache.org/docs/{version}/release-notes.html")
    }
}
