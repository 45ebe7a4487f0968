use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::ParserError;

#[cfg(windows)]
const GRADLE_WRAPPER: &str = "gradlew.bat";
#[cfg(not(windows))]
const GRADLE_WRAPPER: &str = "gradlew";

const SWIFT_MANIFEST: &str = "Package.swift";

/// Filesystem and toolchain lookups that parser commands depend on.
///
/// Implementations fail with [`ParserError::Toolchain`] when a required tool
/// can't be located.
pub trait Toolchain: Send + Sync {
    /// Directory containing the gradle wrapper script.
    fn gradle_wrapper_dir(
        &self,
        cwd: &Path,
        configured: Option<&Path>,
    ) -> impl Future<Output = Result<PathBuf, ParserError>> + Send;

    /// How to invoke the wrapper living in `wrapper_dir`.
    fn gradle_wrapper_executable(&self, wrapper_dir: &Path) -> PathBuf {
        wrapper_dir.join(GRADLE_WRAPPER)
    }

    /// Directory of the swift package that builds the parser.
    fn swift_parser_dir(
        &self,
        cwd: &Path,
        xcodeproj: Option<&Path>,
    ) -> impl Future<Output = Result<PathBuf, ParserError>> + Send;

    /// Absolute form of `cwd`, used as the root for a custom swift parser binary.
    fn absolute_dir(&self, cwd: &Path) -> impl Future<Output = Result<PathBuf, ParserError>> + Send;
}

/// Looks things up on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsToolchain;

impl Toolchain for FsToolchain {
    async fn gradle_wrapper_dir(
        &self,
        cwd: &Path,
        configured: Option<&Path>,
    ) -> Result<PathBuf, ParserError> {
        let dir = match configured {
            Some(p) => cwd.join(p),
            None => cwd.to_path_buf(),
        };
        if !is_file(&dir.join(GRADLE_WRAPPER)).await {
            return Err(ParserError::Toolchain(format!(
                "no {GRADLE_WRAPPER} found in {}. Set gradle_wrapper_path to the directory containing it",
                dir.display()
            )));
        }
        Ok(dir)
    }

    async fn swift_parser_dir(
        &self,
        cwd: &Path,
        xcodeproj: Option<&Path>,
    ) -> Result<PathBuf, ParserError> {
        let dir = match xcodeproj {
            Some(p) => {
                let project = cwd.join(p);
                project
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.to_path_buf())
            }
            None => cwd.to_path_buf(),
        };
        if !is_file(&dir.join(SWIFT_MANIFEST)).await {
            return Err(ParserError::Toolchain(format!(
                "no {SWIFT_MANIFEST} found in {}. Set xcodeproj_path or run from the package root",
                dir.display()
            )));
        }
        Ok(dir)
    }

    async fn absolute_dir(&self, cwd: &Path) -> Result<PathBuf, ParserError> {
        tokio::fs::canonicalize(cwd).await.map_err(|e| {
            ParserError::Toolchain(format!("cannot resolve {}: {e}", cwd.display()))
        })
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "parsehost-toolchain-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn gradle_wrapper_in_configured_dir() {
        let cwd = scratch("gradle-configured");
        std::fs::create_dir_all(cwd.join("android")).unwrap();
        std::fs::write(cwd.join("android").join(GRADLE_WRAPPER), "").unwrap();

        let dir = FsToolchain
            .gradle_wrapper_dir(&cwd, Some(Path::new("android")))
            .await
            .unwrap();
        assert_eq!(dir, cwd.join("android"));
        assert_eq!(
            FsToolchain.gradle_wrapper_executable(&dir),
            cwd.join("android").join(GRADLE_WRAPPER)
        );
    }

    #[tokio::test]
    async fn missing_gradle_wrapper_is_toolchain_error() {
        let cwd = scratch("gradle-missing");
        let err = FsToolchain.gradle_wrapper_dir(&cwd, None).await.unwrap_err();
        assert!(matches!(err, ParserError::Toolchain(_)));
        assert!(err.to_string().contains(GRADLE_WRAPPER));
    }

    #[tokio::test]
    async fn swift_dir_from_xcodeproj_parent() {
        let cwd = scratch("swift-xcodeproj");
        std::fs::create_dir_all(cwd.join("App")).unwrap();
        std::fs::write(cwd.join("App").join(SWIFT_MANIFEST), "").unwrap();

        let dir = FsToolchain
            .swift_parser_dir(&cwd, Some(Path::new("App/App.xcodeproj")))
            .await
            .unwrap();
        assert_eq!(dir, cwd.join("App"));

        let err = FsToolchain.swift_parser_dir(&cwd, None).await.unwrap_err();
        assert!(err.to_string().contains(SWIFT_MANIFEST));
    }
}
