//! Documentation tree shared by every language front-end.
//!
//! An [`Index`] is the output of one extractor run over one
//! directory: a list of [`Library`] values, each holding [`Page`]s,
//! each holding a recursive tree of [`Section`]s. The tree is owned
//! (no shared nodes), so it cannot contain cycles.
//!
//! The serialized form embeds [`SCHEMA_VERSION`]. Readers reject
//! any record outside `MIN_SCHEMA_VERSION..=SCHEMA_VERSION`.

use crate::core::error::{DoctreeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Schema version written into every new [`Index`]
pub const SCHEMA_VERSION: u32 = 1;

/// Oldest schema version this build can still read
pub const MIN_SCHEMA_VERSION: u32 = 1;

/// Deepest section nesting accepted by [`Index::validate`]
pub const MAX_SECTION_DEPTH: usize = 64;

/// Language tag, e.g. `python`. Also used as a storage file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub const PYTHON: &'static str = "python";
    pub const MARKDOWN: &'static str = "markdown";

    /// Create a validated language tag (`[a-z0-9_+-]+`)
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if Self::is_valid(&tag) {
            Ok(Self(tag))
        } else {
            Err(DoctreeError::InvalidLanguage(tag))
        }
    }

    pub fn python() -> Self {
        Self(Self::PYTHON.to_string())
    }

    pub fn markdown() -> Self {
        Self(Self::MARKDOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(tag: &str) -> bool {
        !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_+-".contains(c))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Markdown-flavored free text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markdown(String);

impl Markdown {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Markdown {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<String> for Markdown {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for Markdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered path tokens describing where an entity lives
///
/// Concatenating a page key with the keys of the sections on the
/// way down to a node gives that node's canonical path. Token order
/// is preserved through storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchKey(Vec<String>);

impl SearchKey {
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append `child` to this path.
    ///
    /// A child key that already starts with the full parent path is
    /// taken as absolute and returned unchanged, so relative keys
    /// (`[".", "run"]`) and absolute keys (`["pkg", ".", "run"]`)
    /// under a `["pkg"]` page resolve to the same canonical path.
    pub fn join(&self, child: &SearchKey) -> SearchKey {
        if !self.is_empty() && child.0.starts_with(&self.0) {
            return child.clone();
        }
        let mut tokens = Vec::with_capacity(self.0.len() + child.0.len());
        tokens.extend(self.0.iter().cloned());
        tokens.extend(child.0.iter().cloned());
        SearchKey(tokens)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for SearchKey {
    fn from(tokens: [S; N]) -> Self {
        Self(tokens.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<&str>> for SearchKey {
    fn from(tokens: Vec<&str>) -> Self {
        Self(tokens.into_iter().map(str::to_string).collect())
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// Role of a section in the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// A real symbol: function, type, constant, heading
    #[default]
    Symbol,
    /// Display-only grouping such as "Functions"
    Category,
}

/// One node of a page's documentation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub short_label: String,
    pub label: String,
    #[serde(default)]
    pub detail: Markdown,
    #[serde(default)]
    pub search_key: SearchKey,
    #[serde(default)]
    pub kind: SectionKind,
    #[serde(default)]
    pub children: Vec<Section>,
}

impl Section {
    /// Create a symbol section
    pub fn symbol(
        id: impl Into<String>,
        short_label: impl Into<String>,
        label: impl Into<String>,
        search_key: SearchKey,
    ) -> Self {
        Self {
            id: id.into(),
            short_label: short_label.into(),
            label: label.into(),
            detail: Markdown::default(),
            search_key,
            kind: SectionKind::Symbol,
            children: Vec::new(),
        }
    }

    /// Create a grouping section with an empty search key
    pub fn category(
        id: impl Into<String>,
        short_label: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            short_label: short_label.into(),
            label: label.into(),
            detail: Markdown::default(),
            search_key: SearchKey::empty(),
            kind: SectionKind::Category,
            children: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Markdown>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = children;
        self
    }

    pub fn is_category(&self) -> bool {
        self.kind == SectionKind::Category
    }

    /// Number of symbol sections in this subtree, self included
    pub fn symbol_count(&self) -> usize {
        let own = match self.kind {
            SectionKind::Symbol => 1,
            SectionKind::Category => 0,
        };
        own + self.children.iter().map(Section::symbol_count).sum::<usize>()
    }
}

/// Documentation for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub path: String,
    pub title: String,
    #[serde(default)]
    pub detail: Markdown,
    #[serde(default)]
    pub search_key: SearchKey,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Page {
    pub fn new(path: impl Into<String>, title: impl Into<String>, search_key: SearchKey) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            detail: Markdown::default(),
            search_key,
            sections: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Markdown>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }
}

/// A named group of pages (the project itself or a dependency)
///
/// Identity fields other than `id` are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub repository: String,
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub version_type: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Library {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }
}

/// Root artifact of one extractor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub schema_version: u32,
    pub language: Language,
    #[serde(default)]
    pub num_files: u64,
    #[serde(default)]
    pub num_bytes: u64,
    #[serde(default)]
    pub libraries: Vec<Library>,
}

impl Index {
    /// Create an empty index at the current schema version
    pub fn new(language: Language) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            language,
            num_files: 0,
            num_bytes: 0,
            libraries: Vec::new(),
        }
    }

    pub fn with_libraries(mut self, libraries: Vec<Library>) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn page_count(&self) -> usize {
        self.libraries.iter().map(|lib| lib.pages.len()).sum()
    }

    /// Number of symbol sections across all pages
    pub fn section_count(&self) -> usize {
        self.libraries
            .iter()
            .flat_map(|lib| &lib.pages)
            .flat_map(|page| &page.sections)
            .map(Section::symbol_count)
            .sum()
    }

    /// Check the structural invariants of the tree
    pub fn validate(&self) -> Result<()> {
        if !Language::is_valid(self.language.as_str()) {
            return Err(DoctreeError::InvalidLanguage(self.language.to_string()));
        }

        let mut library_ids = HashSet::new();
        for library in &self.libraries {
            if !library_ids.insert(library.id.as_str()) {
                return Err(DoctreeError::InvalidIndex(format!(
                    "duplicate library id '{}'",
                    library.id
                )));
            }

            let mut page_paths = HashSet::new();
            for page in &library.pages {
                if !page_paths.insert(page.path.as_str()) {
                    return Err(DoctreeError::InvalidIndex(format!(
                        "duplicate page path '{}' in library '{}'",
                        page.path, library.id
                    )));
                }
                validate_siblings(&page.sections, &page.path, 1)?;
            }
        }

        Ok(())
    }
}

fn validate_siblings(sections: &[Section], page: &str, depth: usize) -> Result<()> {
    if depth > MAX_SECTION_DEPTH {
        return Err(DoctreeError::InvalidIndex(format!(
            "sections nested deeper than {MAX_SECTION_DEPTH} in page '{page}'"
        )));
    }

    let mut ids = HashSet::new();
    for section in sections {
        if !ids.insert(section.id.as_str()) {
            return Err(DoctreeError::InvalidIndex(format!(
                "duplicate section id '{}' in page '{page}'",
                section.id
            )));
        }
        validate_siblings(&section.children, page, depth + 1)?;
    }
    Ok(())
}
