//! Keyring credential loading
//!
//! API keys live in a plain text keyring file with one `name: value`
//! entry per line, e.g.:
//!
//! ```text
//! chatgpt: sk-...
//! gemini: AIza...
//! ```
//!
//! [`fetch_key`] reads a single named secret; [`load_into_env`] maps the
//! well-known entries onto the environment variables the LLM providers
//! read (`OPENAI_API_KEY`, `GEMINI_API_KEY`).

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Keyring entry name for the OpenAI secret
pub const OPENAI_KEY_NAME: &str = "chatgpt";
/// Keyring entry name for the Gemini secret
pub const GEMINI_KEY_NAME: &str = "gemini";

/// Errors that can occur while loading keyring entries
#[derive(Error, Debug)]
pub enum KeyringError {
    /// The keyring file could not be read
    #[error("Cannot read keyring file '{path}': {source}")]
    ReadFailed {
        /// Path that was attempted
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No entry with the requested name exists
    #[error("Key '{name}' not found in keyring file '{path}'")]
    KeyNotFound {
        /// The requested entry name
        name: String,
        /// The keyring file searched
        path: String,
    },

    /// The entry exists but its value is empty
    #[error("Key '{name}' in keyring file '{path}' has an empty value")]
    EmptyValue {
        /// The entry name
        name: String,
        /// The keyring file
        path: String,
    },
}

/// Fetch a named secret from a keyring file
///
/// Lines are `name: value`; whitespace around both parts is ignored and
/// lines without a colon are skipped.
pub fn fetch_key(path: impl AsRef<Path>, name: &str) -> Result<String, KeyringError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|source| KeyringError::ReadFailed {
        path: display.clone(),
        source,
    })?;

    for line in contents.lines() {
        let Some((entry, value)) = line.split_once(':') else {
            continue;
        };
        if entry.trim() != name {
            continue;
        }

        let value = value.trim();
        if value.is_empty() {
            return Err(KeyringError::EmptyValue {
                name: name.to_string(),
                path: display,
            });
        }

        debug!(name = %name, "Keyring entry loaded");
        return Ok(value.to_string());
    }

    Err(KeyringError::KeyNotFound {
        name: name.to_string(),
        path: display,
    })
}

/// Load the provider secrets into the process environment
///
/// Reads the `chatgpt` and `gemini` entries and exports them as
/// `OPENAI_API_KEY` and `GEMINI_API_KEY`.
pub fn load_into_env(path: impl AsRef<Path>) -> Result<(), KeyringError> {
    let path = path.as_ref();

    let openai = fetch_key(path, OPENAI_KEY_NAME)?;
    let gemini = fetch_key(path, GEMINI_KEY_NAME)?;

    // set_var is unsafe in edition 2024: callers must not race other
    // threads reading the environment. This runs during startup, before
    // the runtime spawns anything.
    #[allow(unsafe_code)]
    unsafe {
        std::env::set_var("OPENAI_API_KEY", openai);
        std::env::set_var("GEMINI_API_KEY", gemini);
    }

    info!(path = %path.display(), "Provider credentials loaded from keyring");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn keyring_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_fetch_key_well_formed() {
        let file = keyring_file("chatgpt: sk-test-123\ngemini: AIza-test\n");

        assert_eq!(fetch_key(file.path(), "chatgpt").unwrap(), "sk-test-123");
        assert_eq!(fetch_key(file.path(), "gemini").unwrap(), "AIza-test");
    }

    #[test]
    fn test_fetch_key_trims_whitespace() {
        let file = keyring_file("  chatgpt  :   sk-padded   \n");
        assert_eq!(fetch_key(file.path(), "chatgpt").unwrap(), "sk-padded");
    }

    #[test]
    fn test_missing_file() {
        let result = fetch_key("/nonexistent/keyring.txt", "chatgpt");
        assert!(matches!(result, Err(KeyringError::ReadFailed { .. })));
    }

    #[test]
    fn test_key_not_found() {
        let file = keyring_file("chatgpt: sk-test\n");
        let result = fetch_key(file.path(), "gemini");
        assert!(matches!(
            result,
            Err(KeyringError::KeyNotFound { name, .. }) if name == "gemini"
        ));
    }

    #[test]
    fn test_empty_value_rejected() {
        let file = keyring_file("chatgpt:   \ngemini: AIza\n");
        let result = fetch_key(file.path(), "chatgpt");
        assert!(matches!(result, Err(KeyringError::EmptyValue { .. })));
    }

    #[test]
    fn test_lines_without_colon_skipped() {
        let file = keyring_file("# comment line\nchatgpt: sk-test\n");
        assert_eq!(fetch_key(file.path(), "chatgpt").unwrap(), "sk-test");
    }
}
