//! Throwaway Firefox profile.
//!
//! Each launch gets a fresh directory holding only a `user.js`. Session
//! state lives in the session store, not the profile, so nothing here
//! outlives the [`Profile`].

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

use super::options::LaunchOptions;

// ============================================================================
// Constants
// ============================================================================

/// Header comment for `user.js`.
const USER_JS_HEADER: &str = "// tweetfree user.js\n\n";

// ============================================================================
// PreferenceValue
// ============================================================================

/// A `user.js` preference value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// String value, escaped on output.
    String(String),
}

impl PreferenceValue {
    /// Formats the value as a JavaScript literal.
    fn to_js(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::String(s) => format!("\"{}\"", escape_js_string(s)),
        }
    }
}

impl From<bool> for PreferenceValue {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PreferenceValue {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PreferenceValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

// ============================================================================
// Preference
// ============================================================================

/// One `user_pref(...)` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    /// Preference name.
    pub key: String,
    /// Preference value.
    pub value: PreferenceValue,
}

impl Preference {
    /// Creates a preference.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<PreferenceValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Renders `user_pref("key", value);`.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("user_pref(\"{}\", {});", self.key, self.value.to_js())
    }
}

/// Escapes special characters for JavaScript strings.
fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

// ============================================================================
// Profile
// ============================================================================

/// A temporary profile directory, deleted on drop.
pub struct Profile {
    dir: TempDir,
}

impl Profile {
    /// Creates an empty profile in the system temp directory.
    ///
    /// # Errors
    ///
    /// [`Error::Profile`] if the directory cannot be created.
    pub fn new_temp() -> Result<Self> {
        let dir = TempDir::with_prefix("tweetfree-")
            .map_err(|e| Error::profile(format!("Failed to create temp profile: {e}")))?;

        debug!(path = %dir.path().display(), "Created temporary profile");
        Ok(Self { dir })
    }

    /// Returns the profile directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `prefs` to `user.js`, replacing any previous file.
    ///
    /// # Errors
    ///
    /// [`Error::Profile`] if the file cannot be written.
    pub fn write_prefs(&self, prefs: &[Preference]) -> Result<()> {
        let file_path = self.path().join("user.js");

        let mut content = String::from(USER_JS_HEADER);
        for pref in prefs {
            content.push_str(&pref.to_line());
            content.push('\n');
        }

        fs::write(&file_path, content).map_err(|e| {
            Error::profile(format!(
                "Failed to write user.js at {}: {e}",
                file_path.display()
            ))
        })?;

        debug!(pref_count = prefs.len(), "Wrote preferences to user.js");
        Ok(())
    }

    /// Preferences for an unattended session launched with `options`.
    #[must_use]
    pub fn prefs_for(options: &LaunchOptions) -> Vec<Preference> {
        let mut prefs = vec![
            // Startup: blank page, no prompts
            Preference::new("browser.startup.page", 0),
            Preference::new("browser.startup.homepage_override.mstone", "ignore"),
            Preference::new("browser.shell.checkDefaultBrowser", false),
            Preference::new("browser.sessionstore.resume_from_crash", false),
            Preference::new("browser.warnOnQuit", false),
            Preference::new("browser.aboutwelcome.enabled", false),
            Preference::new("startup.homepage_welcome_url", ""),
            // Telemetry and background services
            Preference::new("toolkit.telemetry.enabled", false),
            Preference::new("toolkit.telemetry.unified", false),
            Preference::new("toolkit.telemetry.reportingpolicy.firstRun", false),
            Preference::new("datareporting.policy.dataSubmissionEnabled", false),
            Preference::new("datareporting.healthreport.uploadEnabled", false),
            Preference::new("app.normandy.enabled", false),
            Preference::new("app.update.service.enabled", false),
            Preference::new("extensions.update.enabled", false),
            Preference::new("browser.search.update", false),
            // Remote agent: BiDi only
            Preference::new("remote.active-protocols", 1),
            Preference::new("dom.disable_beforeunload", true),
        ];

        if let Some(user_agent) = &options.user_agent {
            prefs.push(Preference::new(
                "general.useragent.override",
                user_agent.as_str(),
            ));
        }

        prefs
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("path", &self.path())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pref_lines() {
        assert_eq!(
            Preference::new("browser.startup.page", 0).to_line(),
            "user_pref(\"browser.startup.page\", 0);"
        );
        assert_eq!(
            Preference::new("a.b", false).to_line(),
            "user_pref(\"a.b\", false);"
        );
        assert_eq!(
            Preference::new("ua", "say \"hi\"\\").to_line(),
            "user_pref(\"ua\", \"say \\\"hi\\\"\\\\\");"
        );
    }

    #[test]
    fn test_prefs_include_user_agent() {
        let options = LaunchOptions::default().with_user_agent("TestAgent/1.0");
        let prefs = Profile::prefs_for(&options);

        assert!(prefs.contains(&Preference::new(
            "general.useragent.override",
            "TestAgent/1.0"
        )));
    }

    #[test]
    fn test_prefs_without_user_agent() {
        let options = LaunchOptions::default().without_user_agent();
        let prefs = Profile::prefs_for(&options);

        assert!(prefs.iter().all(|p| p.key != "general.useragent.override"));
    }

    #[test]
    fn test_write_prefs() {
        let profile = Profile::new_temp().expect("temp profile");
        profile
            .write_prefs(&Profile::prefs_for(&LaunchOptions::default()))
            .expect("write");

        let content = fs::read_to_string(profile.path().join("user.js")).expect("read");
        assert!(content.starts_with(USER_JS_HEADER));
        assert!(content.contains("user_pref(\"toolkit.telemetry.enabled\", false);"));
        assert!(content.contains("general.useragent.override"));
    }

    #[test]
    fn test_temp_profile_removed_on_drop() {
        let profile = Profile::new_temp().expect("temp profile");
        let path = profile.path().to_path_buf();
        assert!(path.exists());

        drop(profile);
        assert!(!path.exists());
    }
}
