use std::{
    collections::VecDeque,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

/// Digests are computed with a fixed buffer so maps are never fully loaded in memory.
pub const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

pub fn is_file(path: impl AsRef<Path>) -> std::io::Result<bool> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => return Ok(false),
            _ => return Err(e),
        },
    };
    Ok(metadata.is_file())
}

pub fn is_directory(path: impl AsRef<Path>) -> std::io::Result<bool> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => return Ok(false),
            _ => return Err(e),
        },
    };
    Ok(metadata.is_dir())
}

/// Returns the paths of all the files in `dir`, including files in subdirectories, sorted.
/// Fails if dir isnt a directory or if there is some other io error.
///
/// Symbolic links are followed. Broken links and links back to a directory being walked
/// are skipped with a warning.
pub fn collect_files_in_dir_recursive(dir: impl Into<PathBuf>) -> std::io::Result<Vec<PathBuf>> {
    let dir = dir.into();
    let mut paths = Vec::new();
    let mut dirs = VecDeque::new();
    // every queued directory carries the canonical paths of itself and its ancestors
    let ancestors = vec![dir.canonicalize()?];
    dirs.push_back((dir, ancestors));

    while let Some((dir, ancestors)) = dirs.pop_front() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let filetype = entry.file_type()?;
            let is_dir = if filetype.is_symlink() {
                match std::fs::metadata(&path) {
                    Ok(metadata) => metadata.is_dir(),
                    Err(e) => {
                        log::warn!("Skipping broken link {} : {e}", path.display());
                        continue;
                    }
                }
            } else {
                filetype.is_dir()
            };

            if !is_dir {
                paths.push(path);
                continue;
            }
            let canonical = path.canonicalize()?;
            if ancestors.contains(&canonical) {
                log::warn!(
                    "Skipping {}, it links back to {}",
                    path.display(),
                    canonical.display()
                );
                continue;
            }
            let mut ancestors = ancestors.clone();
            ancestors.push(canonical);
            dirs.push_back((path, ancestors));
        }
    }

    paths.sort();
    Ok(paths)
}

/// Hex encoded SHA-256 digest of the file at `path`.
pub fn file_digest(path: impl AsRef<Path>) -> std::io::Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    let digest = hex::encode(hasher.finalize());
    log::trace!("sha256 {} = {}", path.display(), digest);
    Ok(digest)
}

/// Returns true if both files exist and have the same content.
pub fn same_content(a: impl AsRef<Path>, b: impl AsRef<Path>) -> std::io::Result<bool> {
    let (a, b) = (a.as_ref(), b.as_ref());
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }
    Ok(file_digest(a)? == file_digest(b)?)
}

/// Whether the last component of `path` is `name`, ignoring ASCII case.
pub fn has_name(path: &Path, name: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
        .unwrap_or(false)
}

/// Canonical form of `path`, or the path itself if it cannot be canonicalized.
pub fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

pub fn home_directory() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Drive roots (`C:\`, `D:\` ...) present on this machine.
#[cfg(windows)]
pub fn windows_drives() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|drive| drive.is_dir())
        .collect()
}

#[cfg(not(windows))]
pub fn windows_drives() -> Vec<PathBuf> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_digest(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn same_content_compares_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let c = dir.path().join("c");
        std::fs::write(&a, "map").unwrap();
        std::fs::write(&b, "map").unwrap();
        std::fs::write(&c, "mop").unwrap();
        assert!(same_content(&a, &b).unwrap());
        assert!(!same_content(&a, &c).unwrap());
    }

    #[test]
    fn collect_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("maps/sub")).unwrap();
        std::fs::write(dir.path().join("maps/de_a.bsp"), "").unwrap();
        std::fs::write(dir.path().join("maps/sub/de_b.bsp"), "").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "").unwrap();

        let files = collect_files_in_dir_recursive(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.contains(&dir.path().join("maps/sub/de_b.bsp")));
    }

    #[test]
    fn missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(!is_directory(&missing).unwrap());
        assert!(!is_file(&missing).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn collect_files_follows_links() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("maps")).unwrap();
        std::fs::write(dir.path().join("maps/de_a.bsp"), "").unwrap();
        std::fs::write(dir.path().join("de_a.txt"), "").unwrap();
        std::os::unix::fs::symlink(dir.path().join("maps"), dir.path().join("extra")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("de_a.txt"), dir.path().join("readme.txt"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("maps/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("broken")).unwrap();

        let files = collect_files_in_dir_recursive(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("de_a.txt"),
                dir.path().join("extra/de_a.bsp"),
                dir.path().join("maps/de_a.bsp"),
                dir.path().join("readme.txt"),
            ]
        );
    }
}
