use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Source file missing: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("Failed to move {} to {}: {source}", .src.display(), .dest.display())]
    Io {
        src: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Where a file called `filename` should be moved to inside `quarantine_dir`.
///
/// The file keeps its name unless a file of that name is already quarantined. In that case
/// `_<timestamp>` is appended to the file stem, and if that is taken as well, a further
/// `_1`, `_2`, ... counter.
pub fn quarantine_destination(quarantine_dir: &Path, filename: &OsStr, timestamp: u64) -> PathBuf {
    let dest = quarantine_dir.join(filename);
    if !dest.exists() {
        return dest;
    }

    let filename = Path::new(filename);
    let stem = filename.file_stem().unwrap_or(filename.as_os_str());
    let extension = filename.extension();

    let with_suffix = |suffix: &str| {
        let mut new_name = stem.to_os_string();
        new_name.push(suffix);
        if let Some(extension) = extension {
            new_name.push(".");
            new_name.push(extension);
        }
        quarantine_dir.join(new_name)
    };

    let mut candidate = with_suffix(&format!("_{timestamp}"));
    let mut counter = 1u64;
    while candidate.exists() {
        candidate = with_suffix(&format!("_{timestamp}_{counter}"));
        counter += 1;
    }

    candidate
}

/// Move the file at `src` into `quarantine_dir`, returning its new path.
pub fn move_to_quarantine(src: &Path, quarantine_dir: &Path) -> Result<PathBuf, MoveError> {
    if !src.exists() {
        return Err(MoveError::SourceMissing(src.to_path_buf()));
    }

    let filename = src
        .file_name()
        .ok_or_else(|| MoveError::NoFileName(src.to_path_buf()))?;

    let dest = quarantine_destination(quarantine_dir, filename, unix_now());
    move_path(src, &dest)?;

    Ok(dest)
}

fn move_path(src: &Path, dest: &Path) -> Result<(), MoveError> {
    debug!("      Moving {} ------> {}", src.display(), dest.display());

    let io_error = |source| MoveError::Io {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    };

    let Err(rename_error) = fs::rename(src, dest) else {
        return Ok(());
    };

    // rename cannot cross filesystems. Fall back to copy and delete.
    debug!("    Unable to rename ({rename_error}). Performing copy and delete instead.");
    if fs::copy(src, dest).is_err() {
        return Err(io_error(rename_error));
    }

    if let Err(e) = fs::remove_file(src) {
        // do not leave a second copy behind
        let _ = fs::remove_file(dest);
        return Err(io_error(e));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_move_keeps_name_when_free() {
        let dir = tempfile::tempdir().unwrap();
        let quarantine = dir.path().join("Delete duplicate");
        fs::create_dir(&quarantine).unwrap();
        let src = dir.path().join("clip.mp4");
        fs::write(&src, b"clip").unwrap();

        let dest = move_to_quarantine(&src, &quarantine).unwrap();

        assert_eq!(dest, quarantine.join("clip.mp4"));
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"clip");
    }

    #[test]
    fn test_move_appends_timestamp_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        let quarantine = dir.path().join("Delete duplicate");
        fs::create_dir(&quarantine).unwrap();
        fs::write(quarantine.join("clip.mp4"), b"older").unwrap();
        let src = dir.path().join("clip.mp4");
        fs::write(&src, b"newer").unwrap();

        let before = unix_now();
        let dest = move_to_quarantine(&src, &quarantine).unwrap();
        let after = unix_now();

        assert!(!src.exists());
        assert_eq!(fs::read(quarantine.join("clip.mp4")).unwrap(), b"older");
        assert_eq!(fs::read(&dest).unwrap(), b"newer");

        let name = dest.file_name().unwrap().to_str().unwrap();
        let stamp = name
            .strip_prefix("clip_")
            .and_then(|rest| rest.strip_suffix(".mp4"))
            .unwrap()
            .parse::<u64>()
            .unwrap();
        assert!((before..=after).contains(&stamp));
    }

    #[test]
    fn test_destination_counts_up_when_timestamp_taken() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("clip.mp4"), b"").unwrap();
        fs::write(dir.path().join("clip_42.mp4"), b"").unwrap();
        fs::write(dir.path().join("clip_42_1.mp4"), b"").unwrap();

        let dest = quarantine_destination(dir.path(), OsStr::new("clip.mp4"), 42);
        assert_eq!(dest, dir.path().join("clip_42_2.mp4"));
    }

    #[test]
    fn test_destination_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("clip"), b"").unwrap();

        let dest = quarantine_destination(dir.path(), OsStr::new("clip"), 42);
        assert_eq!(dest, dir.path().join("clip_42"));
    }

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let res = move_to_quarantine(&dir.path().join("gone.mp4"), dir.path());
        assert!(matches!(res, Err(MoveError::SourceMissing(_))));
    }

    #[test]
    fn test_missing_quarantine_dir_leaves_source_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("clip.mp4");
        fs::write(&src, b"clip").unwrap();

        let res = move_to_quarantine(&src, &dir.path().join("not here"));

        assert!(matches!(res, Err(MoveError::Io { .. })));
        assert!(src.exists());
    }
}
