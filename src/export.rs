use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

pub fn resolve_target(raw: &str, cwd: &Path) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.ends_with(std::path::is_separator) {
        return None;
    }

    let mut path = PathBuf::from(trimmed);
    if !matches!(path.components().next_back(), Some(Component::Normal(_))) {
        return None;
    }
    if path.is_relative() {
        path = cwd.join(path);
    }
    if path.extension().is_none() {
        path.set_extension("txt");
    }
    Some(path)
}

pub fn save_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn adds_txt_extension_when_missing() {
        let cwd = Path::new("/work");
        assert_eq!(
            resolve_target("notes", cwd),
            Some(PathBuf::from("/work/notes.txt"))
        );
        assert_eq!(
            resolve_target(" out.log ", cwd),
            Some(PathBuf::from("/work/out.log"))
        );
        assert_eq!(resolve_target("   ", cwd), None);
    }

    #[test]
    fn rejects_directory_like_targets() {
        let cwd = Path::new("/work/sub");
        assert_eq!(resolve_target(".", cwd), None);
        assert_eq!(resolve_target("..", cwd), None);
        assert_eq!(resolve_target("reports/", cwd), None);
        assert_eq!(resolve_target("reports/..", cwd), None);
        assert_eq!(resolve_target("/", cwd), None);
        assert_eq!(
            resolve_target("reports/today", cwd),
            Some(PathBuf::from("/work/sub/reports/today.txt"))
        );
    }

    #[test]
    fn saved_text_round_trips_non_ascii() {
        let root = make_temp_dir();
        let path = root.join("details.txt");
        let text = "Command: ls\n[★] This command is in your favorites";

        save_text(&path, text).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);

        save_text(&path, "short").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short");

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reports_unwritable_target() {
        let root = make_temp_dir();
        let path = root.join("missing-dir").join("out.txt");
        let err = save_text(&path, "text").unwrap_err();
        assert!(format!("{err:#}").contains("failed to write"));

        let _ = fs::remove_dir_all(root);
    }

    fn make_temp_dir() -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("cmdref-export-test-{nonce}"));
        fs::create_dir_all(&path).unwrap();
        path
    }
}
