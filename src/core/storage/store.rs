//! Per-(project, language) index persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

use super::atomic::{atomic_write, TEMP_PREFIX};
use crate::core::error::{DoctreeError, Result};
use crate::core::schema::{Index, Language, MIN_SCHEMA_VERSION, SCHEMA_VERSION};

const RECORD_EXT: &str = "json";

/// Storage key: one record per project and language
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexKey {
    pub project: String,
    pub language: Language,
}

impl IndexKey {
    pub fn new(project: impl Into<String>, language: Language) -> Self {
        Self {
            project: project.into(),
            language,
        }
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.language)
    }
}

/// Header-level facts about a stored record
#[derive(Debug, Clone, Serialize)]
pub struct IndexSummary {
    pub key: IndexKey,
    pub schema_version: u32,
    pub compatible: bool,
    pub num_files: u64,
    pub num_bytes: u64,
    pub record_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Modification stamp of one record, for cache invalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStamp {
    pub key: IndexKey,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// Fields read before committing to a full deserialization
#[derive(Debug, Deserialize)]
struct RecordHeader {
    schema_version: u32,
    #[serde(default)]
    num_files: u64,
    #[serde(default)]
    num_bytes: u64,
}

/// Durable store of one [`Index`] per (project, language)
///
/// # Layout
///
/// ```text
/// {root}/
/// ├── {encoded project}/
/// │   ├── python.json
/// │   └── markdown.json
/// ```
///
/// Project names are percent-encoded so any name maps to a single
/// directory. Each record is the JSON form of an [`Index`], which
/// carries its own `schema_version`.
#[derive(Debug)]
pub struct IndexStore {
    root: PathBuf,
    generation: AtomicU64,
}

impl IndexStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bumped on every successful write or delete through this handle
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn project_dir(&self, project: &str) -> Result<PathBuf> {
        Ok(self.root.join(encode_project(project)?))
    }

    fn record_path(&self, project: &str, language: &Language) -> Result<PathBuf> {
        if !Language::is_valid(language.as_str()) {
            return Err(DoctreeError::InvalidLanguage(language.to_string()));
        }
        Ok(self
            .project_dir(project)?
            .join(format!("{}.{RECORD_EXT}", language.as_str())))
    }

    /// Store `index` under (project, language), replacing any previous record
    pub fn put(
        &self,
        cancel: &CancellationToken,
        project: &str,
        language: &Language,
        index: &Index,
    ) -> Result<()> {
        let path = self.record_path(project, language)?;

        if index.language != *language {
            return Err(DoctreeError::InvalidIndex(format!(
                "index language '{}' does not match key language '{}'",
                index.language, language
            )));
        }
        if !(MIN_SCHEMA_VERSION..=SCHEMA_VERSION).contains(&index.schema_version) {
            return Err(DoctreeError::IncompatibleSchema {
                project: project.to_string(),
                language: language.to_string(),
                found: index.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        index.validate()?;

        if cancel.is_cancelled() {
            return Err(DoctreeError::Cancelled);
        }

        let json = serde_json::to_vec_pretty(index).map_err(|e| DoctreeError::Serialization {
            path: path.clone(),
            source: e,
        })?;
        atomic_write(cancel, &path, &json)?;
        self.generation.fetch_add(1, Ordering::AcqRel);

        tracing::info!(
            "Stored index {}/{} ({} pages, {} bytes)",
            project,
            language,
            index.page_count(),
            json.len()
        );
        Ok(())
    }

    /// Most recently stored index for (project, language)
    ///
    /// Fails with [`DoctreeError::IndexNotFound`] when absent and with
    /// [`DoctreeError::IncompatibleSchema`] when the record's version is
    /// outside what this build reads.
    pub fn get(&self, cancel: &CancellationToken, project: &str, language: &Language) -> Result<Index> {
        let path = self.record_path(project, language)?;

        if cancel.is_cancelled() {
            return Err(DoctreeError::Cancelled);
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DoctreeError::IndexNotFound {
                    project: project.to_string(),
                    language: language.to_string(),
                })
            }
            Err(e) => return Err(DoctreeError::io(&path, e)),
        };

        let header: RecordHeader =
            serde_json::from_slice(&bytes).map_err(|e| DoctreeError::Serialization {
                path: path.clone(),
                source: e,
            })?;
        check_version(project, language, header.schema_version)?;

        let index: Index =
            serde_json::from_slice(&bytes).map_err(|e| DoctreeError::Serialization {
                path: path.clone(),
                source: e,
            })?;

        if index.language != *language {
            return Err(DoctreeError::InvalidIndex(format!(
                "record {} holds language '{}'",
                path.display(),
                index.language
            )));
        }

        tracing::debug!("Loaded index {}/{} from {:?}", project, language, path);
        Ok(index)
    }

    /// Like [`get`](Self::get), with absence reported as `Ok(None)`
    pub fn try_get(
        &self,
        cancel: &CancellationToken,
        project: &str,
        language: &Language,
    ) -> Result<Option<Index>> {
        match self.get(cancel, project, language) {
            Ok(index) => Ok(Some(index)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All stored keys, sorted by project then language
    pub fn list(&self) -> Result<Vec<IndexKey>> {
        let mut keys = Vec::new();

        for (project, dir) in self.project_dirs()? {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                // Removed between the two reads
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(DoctreeError::io(&dir, e)),
            };

            for entry in entries {
                let entry = entry.map_err(|e| DoctreeError::io(&dir, e))?;
                let path = entry.path();
                if let Some(language) = record_language(&path) {
                    keys.push(IndexKey::new(project.clone(), language));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Distinct project names, sorted
    pub fn list_projects(&self) -> Result<Vec<String>> {
        let mut projects: Vec<String> = self.list()?.into_iter().map(|k| k.project).collect();
        projects.dedup();
        Ok(projects)
    }

    /// Stored keys belonging to `project`
    pub fn languages_for(&self, project: &str) -> Result<Vec<Language>> {
        let dir = self.project_dir(project)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DoctreeError::io(&dir, e)),
        };

        let mut languages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DoctreeError::io(&dir, e))?;
            if let Some(language) = record_language(&entry.path()) {
                languages.push(language);
            }
        }
        languages.sort();
        Ok(languages)
    }

    /// Remove one record. Returns false if it did not exist.
    pub fn delete(&self, project: &str, language: &Language) -> Result<bool> {
        let path = self.record_path(project, language)?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(DoctreeError::io(&path, e)),
        }
        self.generation.fetch_add(1, Ordering::AcqRel);

        // Drop the project directory once its last record is gone
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir(dir);
        }

        tracing::info!("Deleted index {}/{}", project, language);
        Ok(true)
    }

    /// Remove every record of `project`. Returns how many were removed.
    pub fn delete_project(&self, project: &str) -> Result<usize> {
        let languages = self.languages_for(project)?;
        if languages.is_empty() {
            return Ok(0);
        }

        let dir = self.project_dir(project)?;
        fs::remove_dir_all(&dir).map_err(|e| DoctreeError::io(&dir, e))?;
        self.generation.fetch_add(1, Ordering::AcqRel);

        tracing::info!("Deleted project {} ({} indexes)", project, languages.len());
        Ok(languages.len())
    }

    /// Header facts for every stored record
    ///
    /// Records written by an unsupported schema are reported with
    /// `compatible: false` rather than failing the listing.
    pub fn summaries(&self, cancel: &CancellationToken) -> Result<Vec<IndexSummary>> {
        let mut summaries = Vec::new();

        for key in self.list()? {
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }

            let path = self.record_path(&key.project, &key.language)?;
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(DoctreeError::io(&path, e)),
            };
            let header: RecordHeader =
                serde_json::from_slice(&bytes).map_err(|e| DoctreeError::Serialization {
                    path: path.clone(),
                    source: e,
                })?;
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);

            summaries.push(IndexSummary {
                compatible: check_version(&key.project, &key.language, header.schema_version)
                    .is_ok(),
                key,
                schema_version: header.schema_version,
                num_files: header.num_files,
                num_bytes: header.num_bytes,
                record_bytes: bytes.len() as u64,
                modified,
            });
        }

        Ok(summaries)
    }

    /// Cheap snapshot of every record's mtime and length
    ///
    /// Two equal fingerprints mean no record was added, removed or
    /// rewritten in between, whichever process did the writing.
    pub fn fingerprint(&self) -> Result<Vec<RecordStamp>> {
        let mut stamps = Vec::new();
        for key in self.list()? {
            let path = self.record_path(&key.project, &key.language)?;
            match fs::metadata(&path) {
                Ok(meta) => stamps.push(RecordStamp {
                    key,
                    modified: meta.modified().ok(),
                    len: meta.len(),
                }),
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(DoctreeError::io(&path, e)),
            }
        }
        Ok(stamps)
    }

    fn project_dirs(&self) -> Result<Vec<(String, PathBuf)>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DoctreeError::io(&self.root, e)),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DoctreeError::io(&self.root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            match decode_project(name) {
                Some(project) => dirs.push((project, path)),
                None => tracing::warn!("Ignoring unrecognised directory in store: {:?}", path),
            }
        }
        Ok(dirs)
    }
}

fn check_version(project: &str, language: &Language, found: u32) -> Result<()> {
    if (MIN_SCHEMA_VERSION..=SCHEMA_VERSION).contains(&found) {
        Ok(())
    } else {
        Err(DoctreeError::IncompatibleSchema {
            project: project.to_string(),
            language: language.to_string(),
            found,
            supported: SCHEMA_VERSION,
        })
    }
}

/// Language of a record file, or None for temp files and strays
fn record_language(path: &Path) -> Option<Language> {
    let name = path.file_name()?.to_str()?;
    if name.starts_with(TEMP_PREFIX) || name.starts_with('.') {
        return None;
    }
    let stem = name.strip_suffix(&format!(".{RECORD_EXT}"))?;
    if !path.is_file() {
        return None;
    }
    Language::new(stem).ok()
}

/// Percent-encode a project name into one safe path component
///
/// ASCII alphanumerics, `-`, `_` and non-leading `.` pass through.
pub fn encode_project(project: &str) -> Result<String> {
    if project.is_empty() || project == "." || project == ".." {
        return Err(DoctreeError::InvalidProjectName(format!("'{project}'")));
    }

    let mut encoded = String::with_capacity(project.len());
    for (i, byte) in project.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || (byte == b'.' && i > 0);
        if keep {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    Ok(encoded)
}

/// Inverse of [`encode_project`]
pub fn decode_project(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
