//! Count rescale service
//!
//! Loads a loot file, rescales it in memory and writes it back in one go.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::loot_xml::{rescale_loot_xml, InvalidCountPolicy, RescaleStats};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Multiplier;
use crate::infrastructure::traits::FileSystem;

/// Parameters of a single rescale run.
#[derive(Debug, Clone)]
pub struct RescaleRequest {
    pub path: PathBuf,
    pub multiplier: Multiplier,
    pub policy: InvalidCountPolicy,
    /// Report only, leave the file as it is
    pub dry_run: bool,
}

/// Result of a completed rescale run.
#[derive(Debug, Clone)]
pub struct RescaleReport {
    pub path: PathBuf,
    pub multiplier: Multiplier,
    pub stats: RescaleStats,
    /// Whether the file on disk was overwritten
    pub written: bool,
}

/// Outcome of a rescale run. A missing file is reported, not raised.
#[derive(Debug, Clone)]
pub enum RescaleOutcome {
    FileMissing { path: PathBuf },
    Rescaled(RescaleReport),
}

/// Service that rescales `count` attributes of a loot file in place.
pub struct RescaleService {
    fs: Arc<dyn FileSystem>,
}

impl RescaleService {
    /// Create a new rescale service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Rescale the file named by `request`.
    ///
    /// The file is written only after the whole document was processed, so a
    /// parse error or an aborted invalid count leaves it untouched.
    #[instrument(skip(self), fields(path = %request.path.display()))]
    pub fn rescale(&self, request: &RescaleRequest) -> ApplicationResult<RescaleOutcome> {
        let path = request.path.as_path();
        if !self.fs.exists(path) {
            debug!("loot file not found");
            return Ok(RescaleOutcome::FileMissing {
                path: path.to_path_buf(),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read loot file", path)?;
        let document = rescale_loot_xml(&content, path, request.multiplier, request.policy)?;

        let written = self.persist(path, &document.xml, request.dry_run)?;
        Ok(RescaleOutcome::Rescaled(RescaleReport {
            path: path.to_path_buf(),
            multiplier: request.multiplier,
            stats: document.stats,
            written,
        }))
    }

    fn persist(&self, path: &Path, xml: &str, dry_run: bool) -> ApplicationResult<bool> {
        if dry_run {
            debug!("dry run, not writing {}", path.display());
            return Ok(false);
        }
        self.fs
            .write(path, xml)
            .with_path_context("write loot file", path)?;
        info!("wrote {}", path.display());
        Ok(true)
    }
}
