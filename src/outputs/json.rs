//! JSON digest file.
//!
//! The digest is written to `{output_dir}/digest.json` as a pretty-printed
//! array in digest order. The new contents go to a sibling temporary file
//! first and are renamed over the old digest, so readers see either the
//! previous digest or the new one, never a partial write.

use crate::error::Result;
use crate::models::AnalyzedArticle;
use crate::pipeline::DigestStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the published digest inside the output directory.
pub const DIGEST_FILE: &str = "digest.json";

/// [`DigestStore`] backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    output_dir: PathBuf,
}

impl FileStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Full path of the digest file.
    pub fn digest_path(&self) -> PathBuf {
        self.output_dir.join(DIGEST_FILE)
    }
}

impl DigestStore for FileStore {
    #[instrument(level = "info", skip_all, fields(output_dir = %self.output_dir.display(), count = digest.len()))]
    async fn persist(&self, digest: &[AnalyzedArticle]) -> Result<()> {
        let json = serde_json::to_string_pretty(digest)?;

        if let Err(e) = fs::create_dir_all(&self.output_dir).await {
            error!(error = %e, "Failed to create output directory");
            return Err(e.into());
        }

        let path = self.digest_path();
        let tmp_path = self.output_dir.join(format!(".{}.tmp", DIGEST_FILE));
        write_replacing(&tmp_path, &path, json.as_bytes()).await?;
        info!(path = %path.display(), "Wrote digest JSON");
        Ok(())
    }
}

async fn write_replacing(tmp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    if let Err(e) = fs::write(tmp_path, contents).await {
        let _ = fs::remove_file(tmp_path).await;
        return Err(e.into());
    }
    fs::rename(tmp_path, path).await?;
    Ok(())
}
