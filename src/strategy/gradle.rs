//! Gradle wrapper strategy.
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
};

const VERSIONS_CURRENT_URL: &str =
    "https://services.gradle.org/versions/current";
const VERSIONS_ALL_URL: &str = "https://services.gradle.org/versions/all";

const WRAPPER_PROPERTIES: &str = "gradle/wrapper/gradle-wrapper.properties";

static DISTRIBUTION_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"gradle-(.+)-(?:bin|all)\.zip").unwrap()
});

/// Entry in the Gradle version service feed, newest first.
#[derive(Debug, Deserialize)]
struct GradleVersion {
    version: String,
    #[serde(default)]
    snapshot: bool,
    #[serde(default)]
    broken: bool,
}

pub struct GradleStrategy {
    runner: Box<dyn CommandRunner>,
}

impl GradleStrategy {
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

/// Pull the pinned version out of the `distributionUrl` entry of
/// `gradle-wrapper.properties`.
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
        "no distributionUrl entry found in gradle-wrapper.properties"
    ))
}

/// Pick the newest usable entry from the version feed (newest first):
/// the first one that is neither a snapshot nor marked broken. Release
/// candidates count; nightlies do not.
fn select_latest(versions: Vec<GradleVersion>) -> Result<VersionInfo> {
    versions
        .into_iter()
        .find(|v| !v.snapshot && !v.broken)
        .map(|v| VersionInfo { version: v.version })
        .ok_or_else(|| eyre!("no usable version in gradle version feed"))
}

#[async_trait]
impl BuildToolStrategy for GradleStrategy {
    fn build_tool_name(&self) -> String {
        "Gradle".to_string()
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
        if allow_pre_release {
            let versions: Vec<GradleVersion> =
                reqwest::get(VERSIONS_ALL_URL)
                    .await?
                    .error_for_status()?
                    .json()
                    .await
                    .wrap_err("failed to fetch gradle version feed")?;

            return select_latest(versions);
        }

        let current: GradleVersion = reqwest::get(VERSIONS_CURRENT_URL)
            .await?
            .error_for_status()?
            .json()
            .await
            .wrap_err("failed to fetch current gradle version")?;

        Ok(VersionInfo {
            version: current.version,
        })
    }

    fn run_wrapper(
        &self,
        root_project_dir: &Path,
        version: &VersionInfo,
    ) -> Result<()> {
        debug!("running gradle wrapper task for {}", version.version);

        self.runner.run(
            root_project_dir,
            "./gradlew",
            &[
                "wrapper".to_string(),
                "--gradle-version".to_string(),
                version.version.clone(),
            ],
        )?;

        Ok(())
    }

    fn wrapper_files(&self, _root_project_dir: &Path) -> Vec<String> {
        vec![
            "gradlew".to_string(),
            "gradlew.bat".to_string(),
            "gradle/wrapper/gradle-wrapper.jar".to_string(),
            "gradle/wrapper/gradle-wrapper.properties".to_string(),
        ]
    }

    fn release_notes_link(&self, version: &str) -> String {
        format!("https://docs.gradle.org/{version}/release-notes.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::MockCommandRunner;
    use std::io::Write;

    #[test]
    fn extracts_version_from_distribution_url() {
        let properties = r"distributionBase=GRADLE_USER_HOME
distributionPath=wrapper/dists
distributionUrl=https\://services.gradle.org/distributions/gradle-8.5-bin.zip
zipStoreBase=GRADLE_USER_HOME
";

        let version = extract_distribution_version(properties).unwrap();
        assert_eq!(version.version, "8.5");
    }

    #[test]
    fn extracts_pre_release_version_from_all_distribution() {
        let properties = r"distributionUrl=https\://services.gradle.org/distributions/gradle-8.0-rc-1-all.zip";

        let version = extract_distribution_version(properties).unwrap();
        assert_eq!(version.version, "8.0-rc-1");
    }

    fn feed_entry(
        version: &str,
        snapshot: bool,
        broken: bool,
    ) -> GradleVersion {
        GradleVersion {
            version: version.to_string(),
            snapshot,
            broken,
        }
    }

    #[test]
    fn selects_first_non_snapshot_non_broken_feed_entry() {
        let versions = vec![
            feed_entry("9.1-20250820000000+0000", true, false),
            feed_entry("9.0.1", false, true),
            feed_entry("9.0-rc-2", false, false),
            feed_entry("8.14.3", false, false),
        ];

        let latest = select_latest(versions).unwrap();
        assert_eq!(latest.version, "9.0-rc-2");
    }

    #[test]
    fn feed_with_only_snapshots_is_an_error() {
        let versions = vec![
            feed_entry("9.1-20250820000000+0000", true, false),
            feed_entry("9.1-20250819000000+0000", true, false),
        ];

        assert!(select_latest(versions).is_err());
    }

    #[test]
    fn missing_distribution_url_is_an_error() {
        assert!(
            extract_distribution_version("distributionBase=GRADLE_USER_HOME")
                .is_err()
        );
    }

    #[test]
    fn reads_version_from_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper_dir = dir.path().join("gradle/wrapper");
        fs::create_dir_all(&wrapper_dir).unwrap();

        let mut file = fs::File::create(
            wrapper_dir.join("gradle-wrapper.properties"),
        )
        .unwrap();
        writeln!(
            file,
            r"distributionUrl=https\://services.gradle.org/distributions/gradle-7.6.4-bin.zip"
        )
        .unwrap();

        let strategy = GradleStrategy::new();
        let version = strategy.extract_current_version(dir.path()).unwrap();
        assert_eq!(version.version, "7.6.4");
    }

    #[test]
    fn runs_gradlew_wrapper_task() {
        let mut mock = MockCommandRunner::new();
        mock.expect_run()
            .withf(|_, program, args| {
                program == "./gradlew"
                    && args.len() == 3
                    && args[0] == "wrapper"
                    && args[1] == "--gradle-version"
                    && args[2] == "8.5"
            })
            .times(1)
            .returning(|_, _, _| Ok(String::new()));

        let strategy = GradleStrategy::with_runner(Box::new(mock));
        strategy
            .run_wrapper(
                Path::new("checkout"),
                &VersionInfo {
                    version: "8.5".to_string(),
                },
            )
            .unwrap();
    }

    #[test]
    fn declares_the_wrapper_file_set() {
        let strategy = GradleStrategy::new();
        let files = strategy.wrapper_files(Path::new("."));
        assert!(files.contains(&"gradlew".to_string()));
        assert!(
            files.contains(
                &"gradle/wrapper/gradle-wrapper.properties".to_string()
            )
        );
    }

    #[test]
    fn links_to_versioned_release_notes() {
        let strategy = GradleStrategy::new();
        assert_eq!(
            strategy.release_notes_link("8.5"),
            "https://docs.gradle.org/8.5/release-notes.html"
        );
    }
}
