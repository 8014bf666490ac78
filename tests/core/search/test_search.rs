// Integration tests for search over stored indexes

use crate::common::{acme_index, create_test_services, index_test_repository, TestRepo};
use doctree::core::config::SearchConfig;
use doctree::core::schema::{Index, Language, Library, Page, SearchKey, Section};
use doctree::core::search::{search, SearchService};
use doctree::core::storage::IndexStore;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[test]
fn test_scenario_run_query() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    let hits = search(&cancel, temp.path(), "run", None).unwrap();
    assert!(!hits.is_empty());

    let top = &hits[0];
    assert_eq!(top.project, "acme");
    assert_eq!(top.language, Language::python());
    assert_eq!(top.library, "acme");
    assert_eq!(top.page_path, "pkg/__init__.py");
    assert_eq!(top.section_path, vec!["func", "run"]);
    assert_eq!(top.path, "pkg.run");
    assert_eq!(top.label, "def run()");
    assert_eq!(top.detail, "Run the thing.");
    assert!(top.score > 0.0);

    // Anything ranked after it must be an entry without "run" in its path
    assert!(hits.iter().skip(1).all(|h| !h.path.contains("run")));

    let other = search(&cancel, temp.path(), "run", Some("other")).unwrap();
    assert!(other.is_empty());
}

#[test]
fn test_empty_store_is_empty_result() {
    let temp = TempDir::new().unwrap();
    let hits = search(&CancellationToken::new(), temp.path(), "anything", None).unwrap();
    assert!(hits.is_empty());

    let missing = temp.path().join("never-created");
    let hits = search(&CancellationToken::new(), &missing, "anything", None).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn test_category_not_returned() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    for query in ["func", "pkg", "run"] {
        let hits = search(&cancel, temp.path(), query, None).unwrap();
        assert!(
            hits.iter().all(|h| h.label != "Functions"),
            "category surfaced for '{query}'"
        );
    }
}

#[test]
fn test_results_are_deterministic() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let cancel = CancellationToken::new();
    for project in ["zeta", "acme", "mid"] {
        store.put(&cancel, project, &Language::python(), &acme_index()).unwrap();
    }

    let first = search(&cancel, temp.path(), "pkg run", None).unwrap();
    for _ in 0..5 {
        assert_eq!(search(&cancel, temp.path(), "pkg run", None).unwrap(), first);
    }

    // Equal scores fall back to path then project
    let projects: Vec<&str> = first
        .iter()
        .filter(|h| h.path == "pkg.run")
        .map(|h| h.project.as_str())
        .collect();
    assert_eq!(projects, vec!["acme", "mid", "zeta"]);
}

#[test]
fn test_incompatible_record_aborts_search() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    let record = temp.path().join("acme").join("python.json");
    let text = std::fs::read_to_string(&record).unwrap();
    std::fs::write(&record, text.replacen("\"schema_version\": 1", "\"schema_version\": 7", 1))
        .unwrap();

    let err = search(&cancel, temp.path(), "run", None).unwrap_err();
    assert!(err.is_incompatible_schema());
}

#[test]
fn test_scoped_search_ignores_other_projects_records() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(IndexStore::new(temp.path()));
    let cancel = CancellationToken::new();
    store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    store.put(&cancel, "legacy", &Language::python(), &acme_index()).unwrap();

    let record = temp.path().join("legacy").join("python.json");
    let text = std::fs::read_to_string(&record).unwrap();
    std::fs::write(&record, text.replacen("\"schema_version\": 1", "\"schema_version\": 7", 1))
        .unwrap();

    for cache in [true, false] {
        let service = SearchService::new(
            Arc::clone(&store),
            SearchConfig {
                cache,
                ..SearchConfig::default()
            },
        );

        let response = service.search(&cancel, "run", Some("acme"), None).unwrap();
        assert_eq!(response.count, 1, "cache = {cache}");
        assert_eq!(response.results[0].project, "acme");

        let err = service.search(&cancel, "run", None, None).unwrap_err();
        assert!(err.is_incompatible_schema(), "cache = {cache}");

        // The scoped corpus stays usable after an unscoped failure
        assert_eq!(service.search(&cancel, "run", Some("acme"), None).unwrap().count, 1);
    }
}

#[test]
fn test_project_filter_applies_before_truncation() {
    let temp = TempDir::new().unwrap();
    let store = IndexStore::new(temp.path());
    let cancel = CancellationToken::new();

    // "strong" has many exact hits that would fill the top k on their own
    let strong_pages: Vec<Page> = (0..30)
        .map(|i| {
            let run = Section::symbol("run", "run", "def run()", SearchKey::from([".", "run"]));
            Page::new(format!("m{i}.py"), format!("Module m{i}"), SearchKey::from([format!("m{i}")]))
                .with_sections(vec![run])
        })
        .collect();
    let strong = Index::new(Language::python())
        .with_libraries(vec![Library::new("strong", "strong").with_pages(strong_pages)]);
    store.put(&cancel, "strong", &Language::python(), &strong).unwrap();

    // "weak" only has a substring hit
    let weak = Index::new(Language::python()).with_libraries(vec![Library::new("weak", "weak")
        .with_pages(vec![Page::new("w.py", "Module w", SearchKey::from(["w"]))
            .with_sections(vec![Section::symbol(
                "rerun",
                "rerun",
                "def rerun()",
                SearchKey::from([".", "rerun"]),
            )])])]);
    store.put(&cancel, "weak", &Language::python(), &weak).unwrap();

    let hits = search(&cancel, temp.path(), "run", Some("weak")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "w.rerun");
}

#[tokio::test]
async fn test_search_indexed_project() {
    let repo = TestRepo::acme();
    let services = create_test_services();
    index_test_repository(&services, repo.path(), "acme").await;

    let cancel = CancellationToken::new();
    let response = services
        .search
        .search(&cancel, "runner start", None, None)
        .unwrap();
    assert_eq!(response.results[0].path, "acme.runner.Runner.start");
    assert_eq!(
        response.results[0].section_path,
        vec!["class", "Runner", "start"]
    );

    let docs = services
        .search
        .search(&cancel, "guide install", Some("acme"), None)
        .unwrap();
    assert_eq!(docs.results[0].path, "docs/guide#install");
    assert_eq!(docs.results[0].language, Language::markdown());

    // Private and test symbols never make it into the store
    let private = services.search.search(&cancel, "_helper", None, None).unwrap();
    assert!(private.results.iter().all(|h| !h.path.ends_with("_helper")));
    let tests = services.search.search(&cancel, "test_run", None, None).unwrap();
    assert!(tests.results.is_empty());
}
