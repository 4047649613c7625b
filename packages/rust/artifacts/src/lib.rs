//! Flat-file JSON store for the three pipeline artifacts.
//!
//! Layout of an output directory:
//! ```text
//! <output_dir>/
//! ├── idea_generated.json
//! ├── research_summary.json
//! └── article_output.json
//! ```
//!
//! Every write fully replaces the target file. There is no locking, no
//! versioning and no atomic rename: concurrent runs against one directory
//! race and the last writer wins.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use inkflow_shared::{Article, IdeaSet, InkflowError, ResearchSummary, Result};

/// File name of the idea set artifact.
pub const IDEAS_FILE: &str = "idea_generated.json";
/// File name of the research summary artifact.
pub const SUMMARY_FILE: &str = "research_summary.json";
/// File name of the article artifact.
pub const ARTICLE_FILE: &str = "article_output.json";

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The three documents a pipeline run can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Ideas,
    Summary,
    Article,
}

impl ArtifactKind {
    /// All kinds, in pipeline order.
    pub const ALL: [ArtifactKind; 3] = [Self::Ideas, Self::Summary, Self::Article];

    /// On-disk file name.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Ideas => IDEAS_FILE,
            Self::Summary => SUMMARY_FILE,
            Self::Article => ARTICLE_FILE,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Metadata for a single written artifact file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
}

// ---------------------------------------------------------------------------
// Path-level operations
// ---------------------------------------------------------------------------

/// Serialize `data` as 4-space pretty JSON and overwrite `path` with it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_artifact<T: Serialize>(path: &Path, data: &T) -> Result<ArtifactMeta> {
    let bytes = to_pretty_json(data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| InkflowError::io(parent, e))?;
    }
    std::fs::write(path, &bytes).map_err(|e| InkflowError::io(path, e))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    debug!(size = bytes.len(), "wrote artifact");

    Ok(ArtifactMeta {
        path: path.to_path_buf(),
        sha256,
        size_bytes: bytes.len(),
    })
}

/// Read and deserialize an artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| InkflowError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        InkflowError::validation(format!("invalid artifact {}: {e}", path.display()))
    })
}

/// Persist an idea set to `path`.
pub fn save_ideas(path: &Path, ideas: &IdeaSet) -> Result<ArtifactMeta> {
    write_artifact(path, ideas)
}

/// Persist a research summary to `path`.
pub fn save_summary(path: &Path, summary: &ResearchSummary) -> Result<ArtifactMeta> {
    write_artifact(path, summary)
}

/// Persist an article to `path`.
pub fn save_article(path: &Path, article: &Article) -> Result<ArtifactMeta> {
    write_artifact(path, article)
}

fn to_pretty_json<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser)
        .map_err(|e| InkflowError::validation(format!("JSON serialization failed: {e}")))?;
    buf.write_all(b"\n")
        .map_err(|e| InkflowError::validation(format!("JSON serialization failed: {e}")))?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// ArtifactStore
// ---------------------------------------------------------------------------

/// The artifact files of one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| InkflowError::io(&self.dir, e))
    }

    /// Full path of an artifact in this directory.
    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Whether an artifact has been written yet.
    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path(kind).is_file()
    }

    /// Raw file contents, for previews and exports.
    pub fn read_raw(&self, kind: ArtifactKind) -> Result<String> {
        let path = self.path(kind);
        std::fs::read_to_string(&path).map_err(|e| InkflowError::io(path, e))
    }

    pub fn write_ideas(&self, ideas: &IdeaSet) -> Result<ArtifactMeta> {
        save_ideas(&self.path(ArtifactKind::Ideas), ideas)
    }

    pub fn read_ideas(&self) -> Result<IdeaSet> {
        read_artifact(&self.path(ArtifactKind::Ideas))
    }

    pub fn write_summary(&self, summary: &ResearchSummary) -> Result<ArtifactMeta> {
        save_summary(&self.path(ArtifactKind::Summary), summary)
    }

    pub fn read_summary(&self) -> Result<ResearchSummary> {
        read_artifact(&self.path(ArtifactKind::Summary))
    }

    pub fn write_article(&self, article: &Article) -> Result<ArtifactMeta> {
        save_article(&self.path(ArtifactKind::Article), article)
    }

    pub fn read_article(&self) -> Result<Article> {
        read_artifact(&self.path(ArtifactKind::Article))
    }

    /// Copy an artifact into `dest_dir`, keeping its file name.
    pub fn export(&self, kind: ArtifactKind, dest_dir: &Path) -> Result<PathBuf> {
        let source = self.path(kind);
        let target = dest_dir.join(kind.file_name());
        // Copying a file onto itself would truncate it.
        if let (Ok(a), Ok(b)) = (source.canonicalize(), target.canonicalize()) {
            if a == b {
                return Ok(target);
            }
        }
        std::fs::copy(&source, &target).map_err(|e| InkflowError::io(&source, e))?;
        debug!(from = %source.display(), to = %target.display(), "exported artifact");
        Ok(target)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
