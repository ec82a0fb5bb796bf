use std::path::{Path, PathBuf};

/// "Run now" markers: `run_now_<job_id>.flag` files dropped into the config
/// directory by the settings UI.
#[derive(Debug, Clone)]
pub struct TriggerFlags {
    dir: PathBuf,
}

impl TriggerFlags {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path(&self, job_id: &str) -> PathBuf {
        self.dir.join(format!("run_now_{}.flag", job_id))
    }

    pub async fn is_set(&self, job_id: &str) -> bool {
        tokio::fs::try_exists(self.path(job_id))
            .await
            .unwrap_or(false)
    }

    /// Request an out-of-schedule run of `job_id`.
    pub async fn set(&self, job_id: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path(job_id), b"").await
    }

    /// Remove the marker. Failures are logged, never returned.
    pub async fn clear(&self, job_id: &str) {
        let path = self.path(job_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(job_id, "Cleared run-now flag"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to clear {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_clear() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());

        assert!(!flags.is_set("movies").await);
        flags.set("movies").await.expect("set");
        assert!(flags.is_set("movies").await);
        assert!(tmp.path().join("run_now_movies.flag").exists());

        flags.clear("movies").await;
        assert!(!flags.is_set("movies").await);
    }

    #[tokio::test]
    async fn test_clear_missing_flag_is_noop() {
        let tmp = TempDir::new().expect("create temp dir");
        let flags = TriggerFlags::new(tmp.path());
        flags.clear("never-set").await;
        assert!(!flags.is_set("never-set").await);
    }
}
