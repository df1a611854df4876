//! Read-or-compute-then-persist store for vertical profiles.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::profile::Profile;
use crate::record;
use crate::run::Run;
use crate::source::ProfileSource;

/// Snapshot of the store's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub computations: u64,
    pub writes: u64,
}

impl StoreStats {
    /// Percentage of lookups answered from a cache record.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
    writes: AtomicU64,
}

/// Provides profiles for (run, variable) pairs.
///
/// Profiles are computed from the source once, written to a cache record, and
/// read back from that record on every later request until a recompute is
/// forced. Records are never invalidated automatically.
///
/// Each pair maps to its own record file, so different pairs may be handled
/// concurrently. Concurrent requests for the *same* pair are not supported.
pub struct ExtractAndCacheStore<S> {
    config: StoreConfig,
    source: S,
    counters: Counters,
}

impl<S: ProfileSource> ExtractAndCacheStore<S> {
    pub fn new(config: StoreConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            counters: Counters::default(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache_path(&self, run: &Run, variable: &str) -> PathBuf {
        self.config.cache_path(run, variable)
    }

    pub fn source_path(&self, run: &Run) -> PathBuf {
        self.config.source_path(run)
    }

    /// Compute the profile from source data, ignoring any cache record.
    pub fn compute(&self, run: &Run, variable: &str) -> Result<Profile> {
        let spec = self.config.variable(variable)?;
        let mean = self.source.vertical_mean(run, spec.index)?;
        self.counters.computations.fetch_add(1, Ordering::Relaxed);

        if mean.heights.len() != mean.means.len() {
            return Err(StoreError::data_access(
                run,
                format!(
                    "{} heights but {} mean values",
                    mean.heights.len(),
                    mean.means.len()
                ),
            ));
        }

        let values: Vec<f64> = mean.means.iter().map(|m| m * spec.factor).collect();
        let profile = Profile::from_columns(
            self.config.coordinate_label.as_str(),
            spec.name.as_str(),
            &mean.heights,
            &values,
        )
        .map_err(|e| StoreError::data_access(run, format!("bad height axis: {}", e)))?;

        info!(
            run = %run,
            variable = %variable,
            index = spec.index,
            factor = spec.factor,
            levels = profile.len(),
            "Computed profile"
        );
        Ok(profile)
    }

    /// Write `profile` as the cache record of (run, variable), replacing any
    /// existing record.
    ///
    /// The record is written to a temporary file next to its destination and
    /// renamed into place, so readers see either the old or the new record.
    pub fn persist(&self, run: &Run, variable: &str, profile: &Profile) -> Result<()> {
        self.config.variable(variable)?;
        let path = self.cache_path(run, variable);
        let text = record::encode(&profile.relabeled(&self.config.coordinate_label, variable));

        let dir = self.config.cache_dir();
        fs::create_dir_all(dir).map_err(|e| StoreError::write(&path, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::write(&path, e))?;
        tmp.write_all(text.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(|e| StoreError::write(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| StoreError::write(&path, e.error))?;

        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        info!(run = %run, variable = %variable, path = %path.display(), "Wrote cache record");
        Ok(())
    }

    /// Read the cache record of (run, variable).
    pub fn load(&self, run: &Run, variable: &str) -> Result<Profile> {
        let path = self.cache_path(run, variable);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::CacheMiss { path });
            }
            Err(e) => return Err(StoreError::parse(&path, 0, e.to_string())),
        };
        record::decode(&path, &text, &self.config.coordinate_label, variable)
    }

    /// The profile for (run, variable), from its cache record when one exists.
    ///
    /// Only a missing record is recovered from, by computing and persisting.
    /// With `force_recompute` the record is ignored and overwritten.
    pub fn get_profile(&self, run: &Run, variable: &str, force_recompute: bool) -> Result<Profile> {
        self.config.variable(variable)?;

        if !force_recompute {
            match self.load(run, variable) {
                Ok(profile) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(run = %run, variable = %variable, "Cache hit");
                    return Ok(profile);
                }
                Err(e) if e.is_cache_miss() => {
                    self.counters.misses.fetch_add(1, Ordering::Relaxed);
                    debug!(run = %run, variable = %variable, "Cache miss, computing");
                }
                Err(e) => return Err(e),
            }
        } else {
            debug!(run = %run, variable = %variable, "Forced recompute");
        }

        let profile = self.compute(run, variable)?;
        self.persist(run, variable, &profile)?;
        Ok(profile)
    }

    /// [`get_profile`](Self::get_profile) for several runs in parallel.
    ///
    /// Results come back in input order, one per run; a failing run does not
    /// stop the others. A run listed twice is served once and its repeats then
    /// read the record written for it.
    pub fn get_profiles(
        &self,
        runs: &[Run],
        variable: &str,
        force_recompute: bool,
    ) -> Vec<Result<Profile>> {
        let mut seen = HashSet::new();
        let (first, repeats): (Vec<usize>, Vec<usize>) =
            (0..runs.len()).partition(|&i| seen.insert(&runs[i]));

        let mut results: Vec<Option<Result<Profile>>> = (0..runs.len()).map(|_| None).collect();

        let computed: Vec<(usize, Result<Profile>)> = first
            .par_iter()
            .map(|&i| (i, self.get_profile(&runs[i], variable, force_recompute)))
            .collect();
        for (i, result) in computed {
            results[i] = Some(result);
        }
        for i in repeats {
            results[i] = Some(self.get_profile(&runs[i], variable, false));
        }

        for (run, result) in runs.iter().zip(&results) {
            if let Some(Err(e)) = result {
                warn!(run = %run, variable = %variable, error = %e, "Profile unavailable");
            }
        }

        results.into_iter().flatten().collect()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            computations: self.counters.computations.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }
}
