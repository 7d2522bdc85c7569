//! Per-day frontier files
//!
//! The frontier of a (date, prefix, region) run is a plain file with one URL
//! per line. The live file holds the URLs still to be processed; the `_all`
//! sibling keeps the full enumeration as it was first saved. Keys carry the
//! calendar date, so a new day always starts from a fresh enumeration.

use crate::{Result, SweepError};
use chrono::{Local, NaiveDate};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identifies one frontier file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    /// Calendar date the frontier belongs to
    pub date: NaiveDate,

    /// Listing family, e.g. `ershoufang` or `xiaoqu`
    pub prefix: String,

    /// Region token, or `detail` for the detail crawl
    pub region: String,
}

impl RunKey {
    /// Creates a key for an explicit date
    pub fn new(date: NaiveDate, prefix: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            date,
            prefix: prefix.into(),
            region: region.into(),
        }
    }

    /// Creates a key for the local calendar date
    pub fn today(prefix: impl Into<String>, region: impl Into<String>) -> Self {
        Self::new(Local::now().date_naive(), prefix, region)
    }

    /// File name of the live frontier
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use listing_sweep::cache::RunKey;
    ///
    /// let key = RunKey::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "ershoufang", "pudong");
    /// assert_eq!(key.file_name(), "2024-03-01_ershoufang_url_candidates_pudong");
    /// ```
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_url_candidates_{}",
            self.date.format("%Y-%m-%d"),
            self.prefix,
            self.region
        )
    }

    /// File name of the archived full enumeration
    pub fn archive_file_name(&self) -> String {
        format!("{}_all", self.file_name())
    }
}

/// Frontier files kept in one directory
#[derive(Debug, Clone)]
pub struct FrontierCache {
    dir: PathBuf,
}

impl FrontierCache {
    /// Creates a cache rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the frontier files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the live frontier for `key`
    pub fn live_path(&self, key: &RunKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Path of the archived enumeration for `key`
    pub fn archive_path(&self, key: &RunKey) -> PathBuf {
        self.dir.join(key.archive_file_name())
    }

    /// Loads the live frontier of `key`
    ///
    /// Lines are trimmed and blank lines dropped, so an empty file is an empty
    /// frontier. A missing file yields `None`; so does an unreadable one, which
    /// is logged and otherwise treated like a cache miss.
    pub fn load(&self, key: &RunKey) -> Option<Vec<String>> {
        let path = self.live_path(key);

        match fs::read_to_string(&path) {
            Ok(content) => {
                let frontier: Vec<String> = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect();
                debug!("Loaded {} cached URLs from {}", frontier.len(), path.display());
                Some(frontier)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Ignoring unreadable frontier {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Persists the remaining frontier of `key`
    ///
    /// The first save over an existing live file copies it to the `_all`
    /// archive. The live file is written to a temporary sibling and renamed
    /// into place.
    pub fn save(&self, key: &RunKey, frontier: &[String]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| cache_error(&self.dir, e))?;

        let live = self.live_path(key);
        let archive = self.archive_path(key);
        if live.exists() && !archive.exists() {
            fs::copy(&live, &archive).map_err(|e| cache_error(&archive, e))?;
            debug!("Archived frontier to {}", archive.display());
        }

        let tmp = self.dir.join(format!("{}.tmp", key.file_name()));
        fs::write(&tmp, frontier.join("\n")).map_err(|e| cache_error(&tmp, e))?;
        fs::rename(&tmp, &live).map_err(|e| cache_error(&live, e))?;

        Ok(())
    }

    /// Removes the live frontier and the archive of `key`
    pub fn clear(&self, key: &RunKey) -> Result<()> {
        for path in [self.live_path(key), self.archive_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(cache_error(&path, e)),
            }
        }
        Ok(())
    }
}

fn cache_error(path: &Path, source: std::io::Error) -> SweepError {
    SweepError::Cache {
        path: path.display().to_string(),
        source,
    }
}
