//! In-place updates of a `.env` file.

use std::io;
use std::path::Path;

use regex::{NoExpand, Regex};
use tracing::debug;

/// Sets `key=value` in a `.env` file.
///
/// An existing `key=` line is replaced in place; otherwise the pair is
/// appended on a new line. A missing file is created.
pub fn upsert_env_var(path: &Path, key: &str, value: &str) -> io::Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let updated = upsert_in(&content, key, value);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, updated)?;
    debug!(key = %key, path = %path.display(), "Updated env file");
    Ok(())
}

fn upsert_in(content: &str, key: &str, value: &str) -> String {
    let line = format!("{}={}", key, value);
    let pattern = format!(r"(?m)^{}=.*$", regex::escape(key));
    // The pattern is built from an escaped literal, so it always compiles
    match Regex::new(&pattern) {
        Ok(re) if re.is_match(content) => re.replace(content, NoExpand(&line)).into_owned(),
        _ => format!("{}\n{}", content, line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replaces_existing_key() {
        let content = "PORT=3000\nTELEGRAM_BOT_TOKEN=old\nOLLAMA_MODEL=x";
        let updated = upsert_in(content, "TELEGRAM_BOT_TOKEN", "new");
        assert_eq!(updated, "PORT=3000\nTELEGRAM_BOT_TOKEN=new\nOLLAMA_MODEL=x");
    }

    #[test]
    fn test_appends_missing_key() {
        let updated = upsert_in("PORT=3000", "TELEGRAM_BOT_TOKEN", "abc");
        assert_eq!(updated, "PORT=3000\nTELEGRAM_BOT_TOKEN=abc");
    }

    #[test]
    fn test_does_not_match_key_prefix() {
        let content = "TELEGRAM_BOT_TOKEN_OLD=keep";
        let updated = upsert_in(content, "TELEGRAM_BOT_TOKEN", "abc");
        assert_eq!(updated, "TELEGRAM_BOT_TOKEN_OLD=keep\nTELEGRAM_BOT_TOKEN=abc");
    }

    #[test]
    fn test_value_with_dollar_is_literal() {
        let updated = upsert_in("SECRET=x", "SECRET", "a$1b");
        assert_eq!(updated, "SECRET=a$1b");
    }

    #[test]
    fn test_clearing_a_value() {
        let updated = upsert_in("TELEGRAM_BOT_TOKEN=abc\n", "TELEGRAM_BOT_TOKEN", "");
        assert_eq!(updated, "TELEGRAM_BOT_TOKEN=\n");
    }

    #[test]
    fn test_upsert_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");

        upsert_env_var(&path, "TELEGRAM_BOT_TOKEN", "1:x").unwrap();
        upsert_env_var(&path, "TELEGRAM_BOT_TOKEN", "2:y").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "\nTELEGRAM_BOT_TOKEN=2:y");
    }
}
