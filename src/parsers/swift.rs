use std::path::Path;

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::toolchain::Toolchain;

/// Swift parser command.
///
/// A configured `custom_swift_cli_path` is run directly (resolved against the
/// absolute working directory). Otherwise the parser is built and run from
/// its swift package with `swift run`.
pub async fn command<T: Toolchain>(
    cwd: &Path,
    config: &ParserConfig,
    toolchain: &T,
) -> Result<String, ParserError> {
    if let Some(custom) = &config.custom_swift_cli_path {
        let root = toolchain.absolute_dir(cwd).await?;
        return Ok(root.join(custom).display().to_string());
    }

    let package_dir = toolchain
        .swift_parser_dir(cwd, config.xcodeproj_path.as_deref())
        .await?;
    Ok(format!(
        "swift run --package-path {} figma-swift",
        package_dir.display()
    ))
}
