//! Small text and filesystem helpers.
//!
//! - Log-friendly truncation of long payloads
//! - Markup stripping for search snippets
//! - Output directory validation

use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Truncate a string for logging purposes.
///
/// Keeps at most `max` bytes, cut back to a character boundary, and appends
/// an ellipsis with the number of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Remove HTML tags and decode the handful of entities the search API emits.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(strip_markup("<b>삼성전자</b> &quot;급등&quot;"), "삼성전자 \"급등\"");
/// ```
pub fn strip_markup(text: &str) -> String {
    let without_tags = TAG.replace_all(text, "");
    without_tags
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Name of the marker written by [`ensure_writable_dir`].
const WRITE_CHECK_FILE: &str = ".papernews-write-check";

/// Create `dir` if needed and confirm files can be written into it.
///
/// A marker file is written and removed again; failing to remove it is an
/// error too, so a directory that accepts writes but not deletes is not
/// reported as usable.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub async fn ensure_writable_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir).await?;
    let marker = dir.join(WRITE_CHECK_FILE);
    fs::write(&marker, b"").await?;
    fs::remove_file(&marker).await?;
    debug!("Output directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        // Each syllable is 3 bytes; a cut at byte 4 must back off to 3.
        let result = truncate_for_log("가나다라", 4);
        assert_eq!(result, "가…(+9 bytes)");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<b>삼성전자</b>, &quot;신고가&quot; 경신"),
            "삼성전자, \"신고가\" 경신"
        );
        assert_eq!(strip_markup("R&amp;D 투자 &lt;확대&gt;"), "R&D 투자 <확대>");
        assert_eq!(strip_markup(""), "");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_directory() {
        let dir = std::env::temp_dir()
            .join(format!("papernews-out-{}", std::process::id()))
            .join("2025-05-28");
        ensure_writable_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join(WRITE_CHECK_FILE).exists());
        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_rejects_file_path() {
        let file = std::env::temp_dir().join(format!("papernews-not-a-dir-{}", std::process::id()));
        std::fs::write(&file, "x").unwrap();
        let err = ensure_writable_dir(&file).await.unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);
        let _ = std::fs::remove_file(&file);
    }
}
