//! Conflict avoidance: `name.mp3`, `name (1).mp3`, `name (2).mp3`, ...

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const MAX_ATTEMPTS: u32 = 10_000;

fn candidate(path: &Path, n: u32) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    };
    path.with_file_name(name)
}

/// Creates a new file at `path`, or at the first free renamed variant.
///
/// Uses `create_new`, so two concurrent callers never get the same file.
pub fn create_unique(path: &Path) -> Result<(File, PathBuf)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    for n in 0..MAX_ATTEMPTS {
        let p = candidate(path, n);
        match OpenOptions::new().write(true).create_new(true).open(&p) {
            Ok(f) => return Ok((f, p)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e).with_context(|| format!("create file: {}", p.display())),
        }
    }
    anyhow::bail!("no free filename for {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_names() {
        let p = Path::new("/d/dictor/0001_dictor.mp3");
        assert_eq!(candidate(p, 0), p);
        assert_eq!(candidate(p, 2), Path::new("/d/dictor/0001_dictor (2).mp3"));
        assert_eq!(candidate(Path::new("/d/x"), 1), Path::new("/d/x (1)"));
    }

    #[test]
    fn renames_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("anna").join("0001_anna.mp3");
        let (_f1, p1) = create_unique(&target).unwrap();
        let (_f2, p2) = create_unique(&target).unwrap();
        let (_f3, p3) = create_unique(&target).unwrap();
        assert_eq!(p1, target);
        assert_eq!(p2, dir.path().join("anna").join("0001_anna (1).mp3"));
        assert_eq!(p3, dir.path().join("anna").join("0001_anna (2).mp3"));
    }
}
