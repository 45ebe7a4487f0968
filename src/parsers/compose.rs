use std::path::Path;

use crate::config::ParserConfig;
use crate::error::ParserError;
use crate::payload::Mode;
use crate::toolchain::Toolchain;

/// Gradle can't take the request on stdin, so it goes through this file,
/// relative to the working directory of the run.
pub const TEMPORARY_INPUT_FILE: &str = "tmp/figma-code-connect-parser-input.json.tmp";

pub async fn command<T: Toolchain>(
    cwd: &Path,
    config: &ParserConfig,
    mode: Mode,
    toolchain: &T,
) -> Result<String, ParserError> {
    let wrapper_dir = toolchain
        .gradle_wrapper_dir(cwd, config.gradle_wrapper_path.as_deref())
        .await?;
    let wrapper = toolchain.gradle_wrapper_executable(&wrapper_dir);
    let task = match mode {
        Mode::Create => "createCodeConnect",
        Mode::Parse => "parseCodeConnect",
    };
    Ok(format!(
        "{} -p {} {task} -PfilePath={TEMPORARY_INPUT_FILE} -q",
        wrapper.display(),
        wrapper_dir.display()
    ))
}

/// A stderr classifier rule: every needle must appear (case-insensitively).
struct Rule {
    needles: &'static [&'static str],
    suggestion: &'static str,
}

// Gradle exits with the same code for all of these; first match wins.
const RULES: &[Rule] = &[
    Rule {
        needles: &["task", "not found"],
        suggestion: "The Code Connect Gradle task could not be found. Make sure the Code Connect \
                     Gradle plugin is applied to the module containing your components.",
    },
    Rule {
        needles: &["could not find or load main class org.gradle.wrapper.gradlewrappermain"],
        suggestion: "The Gradle wrapper is incomplete. Regenerate it with `gradle wrapper` so \
                     gradle/wrapper/gradle-wrapper.jar exists.",
    },
    Rule {
        needles: &["gradle-wrapper.jar"],
        suggestion: "The Gradle wrapper is incomplete. Regenerate it with `gradle wrapper` so \
                     gradle/wrapper/gradle-wrapper.jar exists.",
    },
    Rule {
        needles: &["java_home"],
        suggestion: "No usable Java installation was found. Install a JDK and set JAVA_HOME.",
    },
    Rule {
        needles: &["no java runtime"],
        suggestion: "No usable Java installation was found. Install a JDK and set JAVA_HOME.",
    },
    Rule {
        needles: &["unsupported class file major version"],
        suggestion: "The JDK running Gradle is not compatible with this project. Point JAVA_HOME \
                     at the JDK version your Android build uses.",
    },
    Rule {
        needles: &["sdk location not found"],
        suggestion: "The Android SDK could not be located. Set ANDROID_HOME or add sdk.dir to \
                     local.properties.",
    },
    Rule {
        needles: &["could not resolve", "codeconnect"],
        suggestion: "The Code Connect plugin could not be downloaded. Check that your Gradle \
                     plugin repositories include mavenCentral().",
    },
];

pub fn error_suggestion(stderr: &str) -> Option<&'static str> {
    let haystack = stderr.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.needles.iter().all(|n| haystack.contains(n)))
        .map(|rule| rule.suggestion)
}
