// Integration tests for the Markdown extractor

use crate::common::TestRepo;
use doctree::core::config::IndexingConfig;
use doctree::core::extractor::{LanguageExtractor, MarkdownExtractor};
use doctree::core::schema::SearchKey;
use tokio_util::sync::CancellationToken;

#[test]
fn test_index_acme_docs() {
    let repo = TestRepo::acme();
    let index = MarkdownExtractor::new(&IndexingConfig::default())
        .unwrap()
        .index_dir(&CancellationToken::new(), repo.path())
        .unwrap();

    assert_eq!(index.num_files, 2);
    let pages = &index.libraries[0].pages;
    let paths: Vec<&str> = pages.iter().map(|p| p.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md", "docs/guide.md"]);

    let readme = &pages[0];
    assert_eq!(readme.title, "README");
    assert_eq!(readme.detail.as_str(), "Acme readme without a heading.");

    let guide = &pages[1];
    assert_eq!(guide.title, "Guide");
    assert_eq!(guide.detail.as_str(), "Using acme.");
    assert_eq!(guide.search_key, SearchKey::from(["docs", "/", "guide"]));

    let top: Vec<&str> = guide.sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(top, vec!["install", "usage"]);
    assert_eq!(guide.sections[0].children[0].id, "from-source");
    assert_eq!(guide.sections[0].children[0].detail.as_str(), "Clone it.");
}

#[test]
fn test_hidden_and_excluded_dirs_skipped() {
    let repo = TestRepo::with_files(&[
        ("docs/a.md", "# A\n"),
        (".github/b.md", "# B\n"),
        ("node_modules/pkg/c.md", "# C\n"),
    ]);
    let index = MarkdownExtractor::new(&IndexingConfig::default())
        .unwrap()
        .index_dir(&CancellationToken::new(), repo.path())
        .unwrap();

    let paths: Vec<&str> = index.libraries[0]
        .pages
        .iter()
        .map(|p| p.path.as_str())
        .collect();
    assert_eq!(paths, vec!["docs/a.md"]);
}

#[test]
fn test_heading_colliding_with_generated_slug_is_storable() {
    let repo = TestRepo::with_files(&[("a.md", "## Usage\n\n## Usage\n\n## Usage 1\n")]);
    let cancel = CancellationToken::new();
    let index = MarkdownExtractor::new(&IndexingConfig::default())
        .unwrap()
        .index_dir(&cancel, repo.path())
        .unwrap();

    let ids: Vec<&str> = index.libraries[0].pages[0]
        .sections
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["usage", "usage-1", "usage-1-1"]);

    let data = tempfile::TempDir::new().unwrap();
    let store = doctree::core::storage::IndexStore::new(data.path());
    store
        .put(&cancel, "acme", &index.language, &index)
        .unwrap();
}
