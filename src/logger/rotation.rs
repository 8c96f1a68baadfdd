//! Rollover of the active log file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use flate2::Compression;
use flate2::write::GzEncoder;

use crate::logger::config::{RotationConfig, RotationStrategy};
use crate::logger::error::LoggerError;

pub struct RotationManager {
    config: RotationConfig,
    opened_on: NaiveDate,
}

impl RotationManager {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            opened_on: Local::now().date_naive(),
        }
    }

    pub fn should_rotate(&self, current_size: u64) -> bool {
        self.should_rotate_at(current_size, Local::now().date_naive())
    }

    fn should_rotate_at(&self, current_size: u64, today: NaiveDate) -> bool {
        let size_hit = current_size >= self.config.max_size;
        let day_changed = today != self.opened_on;
        match self.config.strategy {
            RotationStrategy::Size => size_hit,
            RotationStrategy::Daily => day_changed,
            RotationStrategy::SizeOrDaily => size_hit || day_changed,
            RotationStrategy::Never => false,
        }
    }

    /// Renames the active file, compresses it when configured, then prunes
    /// rotated files beyond `max_files`.
    pub fn rotate(&mut self, current_path: &Path) -> Result<(), LoggerError> {
        if current_path.exists() {
            let stamp = Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
            let rotated = rotated_path(current_path, &stamp);
            fs::rename(current_path, &rotated)?;
            if self.config.compress {
                compress_file(&rotated)?;
            }
        }
        self.opened_on = Local::now().date_naive();
        cleanup_rotated(current_path, self.config.max_files)
    }
}

/// `logs/app.log` + `20260101_120000` -> `logs/app.20260101_120000.log`
fn rotated_path(base: &Path, stamp: &str) -> PathBuf {
    let stem = base.file_stem().unwrap_or_default().to_string_lossy();
    let ext = base.extension().unwrap_or_default().to_string_lossy();
    let name = if ext.is_empty() {
        format!("{}.{}", stem, stamp)
    } else {
        format!("{}.{}.{}", stem, stamp, ext)
    };
    base.with_file_name(name)
}

/// Replaces `path` with a gzip-compressed `path.gz`.
fn compress_file(path: &Path) -> Result<PathBuf, LoggerError> {
    let input = fs::read(path)?;
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let mut encoder = GzEncoder::new(File::create(&gz_path)?, Compression::default());
    encoder.write_all(&input)?;
    encoder.finish()?;
    fs::remove_file(path)?;
    Ok(gz_path)
}

fn cleanup_rotated(base: &Path, max_files: usize) -> Result<(), LoggerError> {
    let parent = match base.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = format!("{}.", base.file_stem().unwrap_or_default().to_string_lossy());

    let mut rotated: Vec<PathBuf> = fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path != base
                && path
                    .file_name()
                    .map(|n| n.to_string_lossy().starts_with(&stem))
                    .unwrap_or(false)
        })
        .collect();

    if rotated.len() <= max_files {
        return Ok(());
    }

    // Timestamped names sort chronologically.
    rotated.sort();
    let excess = rotated.len() - max_files;
    for path in rotated.into_iter().take(excess) {
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    fn config(strategy: RotationStrategy, max_size: u64, max_files: usize, compress: bool) -> RotationConfig {
        RotationConfig {
            strategy,
            max_size,
            max_files,
            compress,
        }
    }

    #[test]
    fn test_size_strategy_threshold() {
        let manager = RotationManager::new(config(RotationStrategy::Size, 100, 3, false));
        assert!(!manager.should_rotate(99));
        assert!(manager.should_rotate(100));
    }

    #[test]
    fn test_daily_strategy_ignores_size() {
        let manager = RotationManager::new(config(RotationStrategy::Daily, 1, 3, false));
        let today = manager.opened_on;
        assert!(!manager.should_rotate_at(10_000, today));
        assert!(manager.should_rotate_at(0, today.succ_opt().unwrap()));
    }

    #[test]
    fn test_never_strategy() {
        let manager = RotationManager::new(config(RotationStrategy::Never, 1, 0, false));
        let tomorrow = manager.opened_on.succ_opt().unwrap();
        assert!(!manager.should_rotate_at(u64::MAX, tomorrow));
    }

    #[test]
    fn test_rotated_path_keeps_extension() {
        let path = rotated_path(Path::new("logs/app.log"), "20260101_000000");
        assert_eq!(path, PathBuf::from("logs/app.20260101_000000.log"));

        let bare = rotated_path(Path::new("logs/app"), "20260101_000000");
        assert_eq!(bare, PathBuf::from("logs/app.20260101_000000"));
    }

    #[test]
    fn test_rotate_renames_and_compresses() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "first line\n").unwrap();

        let mut manager = RotationManager::new(config(RotationStrategy::Size, 1, 3, true));
        manager.rotate(&log).unwrap();

        assert!(!log.exists());
        let gz: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map(|e| e == "gz").unwrap_or(false))
            .collect();
        assert_eq!(gz.len(), 1);

        let mut decoded = String::new();
        GzDecoder::new(File::open(&gz[0]).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "first line\n");
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("app.log");
        for stamp in ["20260101_000000", "20260102_000000", "20260103_000000"] {
            fs::write(rotated_path(&log, stamp), "x").unwrap();
        }
        fs::write(dir.path().join("other.log"), "x").unwrap();

        cleanup_rotated(&log, 2).unwrap();

        assert!(!rotated_path(&log, "20260101_000000").exists());
        assert!(rotated_path(&log, "20260102_000000").exists());
        assert!(rotated_path(&log, "20260103_000000").exists());
        assert!(dir.path().join("other.log").exists());
    }
}
