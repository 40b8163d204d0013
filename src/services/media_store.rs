use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Extensions of the derived preview assets stored next to each video.
const DERIVED_EXTENSIONS: [&str; 2] = ["png", "gif"];

const PRIMARY_EXTENSION: &str = "mp4";
const CLIPS_DIR: &str = "clips";

/// On-disk media under `<media_root>/videos/`. Database rows only store the
/// location relative to this directory.
#[derive(Debug, Clone)]
pub struct MediaStore {
    videos_root: PathBuf,
}

impl MediaStore {
    pub fn new(videos_root: impl Into<PathBuf>) -> Self {
        Self {
            videos_root: videos_root.into(),
        }
    }

    pub fn videos_root(&self) -> &Path {
        &self.videos_root
    }

    /// Absolute path of a stored location. Empty, absolute, or parent-escaping
    /// locations resolve to nothing.
    pub fn resolve(&self, location: Option<&str>) -> Option<PathBuf> {
        let location = location.map(str::trim).filter(|l| !l.is_empty())?;
        let relative = Path::new(location);

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            tracing::warn!("Refusing media location outside videos root: {}", location);
            return None;
        }

        Some(self.videos_root.join(relative))
    }

    /// Thumbnail and gif paths derived from the primary asset path.
    pub fn derived_paths(primary: &Path) -> Vec<PathBuf> {
        DERIVED_EXTENSIONS
            .iter()
            .map(|ext| primary.with_extension(ext))
            .collect()
    }

    /// Fresh location for a recorded video: `<channelLoc>/<uuid>.mp4`.
    pub fn new_video_location(channel_loc: &str) -> String {
        format!(
            "{}/{}.{}",
            channel_loc,
            Uuid::new_v4().simple(),
            PRIMARY_EXTENSION
        )
    }

    /// Fresh location for a clip: `<channelLoc>/clips/<uuid>.mp4`.
    pub fn new_clip_location(channel_loc: &str) -> String {
        format!(
            "{}/{}/{}.{}",
            channel_loc,
            CLIPS_DIR,
            Uuid::new_v4().simple(),
            PRIMARY_EXTENSION
        )
    }

    /// Stored location of a derived asset, e.g. `chan/abc.mp4` -> `chan/abc.png`.
    pub fn derived_location(location: &str, extension: &str) -> String {
        Path::new(location)
            .with_extension(extension)
            .to_string_lossy()
            .into_owned()
    }

    pub async fn video_exists(&self, location: Option<&str>) -> bool {
        match self.resolve(location) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Deletes the primary asset, then its thumbnail/gif. Previews are only
    /// touched once the primary is gone; a missing primary removes nothing.
    /// Failures are logged and skipped. Returns what was removed.
    pub async fn remove_media(&self, location: Option<&str>) -> Vec<PathBuf> {
        let Some(primary) = self.resolve(location) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        if !Self::remove_file(&primary).await {
            return removed;
        }
        removed.push(primary.clone());

        for path in Self::derived_paths(&primary) {
            if Self::remove_file(&path).await {
                removed.push(path);
            }
        }

        removed
    }

    async fn remove_file(path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!("🗑️  Removed media file {}", path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                tracing::warn!("Failed to remove media file {}: {}", path.display(), e);
                false
            }
        }
    }
}
