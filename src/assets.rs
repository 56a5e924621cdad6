// Static asset tier: the compiled front-end bundle, if one exists on disk.

use std::path::{Path, PathBuf};

use tower_http::services::{ServeDir, ServeFile};

/// Document answered for any path that doesn't name a real file, so
/// client-side routes survive full-page loads.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Dev server to use when no production build is present.
const DEV_SERVER_URL: &str = "http://localhost:5173/";

/// A build output directory that was found on disk at startup.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    /// Check once whether `dir` exists and is a directory.
    ///
    /// Any failure (missing path, permission error, not a directory) is
    /// logged and turned into `None`: the caller keeps serving the API only.
    pub async fn probe(dir: impl Into<PathBuf>) -> Option<Self> {
        let root = dir.into();
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {
                tracing::info!("Serving static build from: {}", root.display());
                Some(Self { root })
            }
            Ok(_) => {
                tracing::warn!(
                    "Static build path {} is not a directory, serving API only",
                    root.display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("No production build found at {} ({e})", root.display());
                tracing::info!("In development use the Vite dev server at {DEV_SERVER_URL}");
                None
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entry_document(&self) -> PathBuf {
        self.root.join(ENTRY_DOCUMENT)
    }

    /// Literal files first, then the entry document at 200 for everything else.
    pub fn service(&self) -> ServeDir<ServeFile> {
        ServeDir::new(&self.root).fallback(ServeFile::new(self.entry_document()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let assets = StaticAssets::probe(dir.path()).await.expect("build dir");
        assert_eq!(assets.root(), dir.path());
        assert_eq!(assets.entry_document(), dir.path().join("index.html"));
    }

    #[tokio::test]
    async fn test_probe_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dist").join("public");
        assert!(StaticAssets::probe(missing).await.is_none());
    }

    #[tokio::test]
    async fn test_probe_rejects_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<html></html>").unwrap();
        assert!(StaticAssets::probe(file).await.is_none());
    }
}
