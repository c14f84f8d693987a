use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Writes raw fetch payloads to a debug directory for offline inspection.
/// Disabled instances are inert; every write failure is logged and
/// swallowed so diagnostics never affect the fetch path.
pub struct DebugSink {
    dir: PathBuf,
    enabled: bool,
}

impl DebugSink {
    pub fn new(dir: impl AsRef<Path>, enabled: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new("debug", false)
    }

    /// Dump a payload under `<dir>/<slug>.<ext>`. The slug is the URL
    /// reduced to filename-safe characters, truncated to keep paths
    /// portable. One file pair per URL: the `.html` and `.md` of a fetch
    /// share the slug, and a re-fetch overwrites the previous pair.
    pub fn dump(&self, url: &str, ext: &str, payload: &str) {
        if !self.enabled {
            return;
        }
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(?err, dir = %self.dir.display(), "failed to create debug dir");
            return;
        }
        let path = self.dir.join(format!("{}.{ext}", slugify(url)));
        match fs::write(&path, payload) {
            Ok(()) => debug!(path = %path.display(), "wrote debug payload"),
            Err(err) => warn!(?err, path = %path.display(), "failed to write debug payload"),
        }
    }
}

fn slugify(url: &str) -> String {
    let slug: String = url
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    slug.chars().take(100).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_filename_safe_and_bounded() {
        let slug = slugify("https://example.com/path?q=1&r=2");
        assert_eq!(slug, "example_com_path_q_1_r_2");
        let long = slugify(&format!("https://example.com/{}", "a".repeat(200)));
        assert_eq!(long.len(), 100);
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::new(dir.path().join("debug"), false);
        sink.dump("https://example.com", "html", "<html></html>");
        assert!(!dir.path().join("debug").exists());
    }

    #[test]
    fn one_fetch_produces_a_matching_file_pair() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::new(dir.path(), true);
        sink.dump("https://example.com/a", "html", "<html></html>");
        sink.dump("https://example.com/a", "md", "# a");
        assert!(dir.path().join("example_com_a.html").exists());
        assert!(dir.path().join("example_com_a.md").exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn refetching_a_url_overwrites_instead_of_accumulating() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::new(dir.path(), true);
        sink.dump("https://example.com/a", "html", "first");
        sink.dump("https://example.com/a", "html", "second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("example_com_a.html")).unwrap(),
            "second"
        );
    }
}
