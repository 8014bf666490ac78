// Ranking behavior of the search service

use crate::common::helpers::create_test_services_with;
use crate::common::{acme_index, create_test_services};
use doctree::core::schema::{Index, Language, Library, Page, SearchKey, Section};
use tokio_util::sync::CancellationToken;

fn module(path: &str, module: &str, sections: Vec<Section>) -> Page {
    Page::new(path, format!("Module {module}"), SearchKey::from([module])).with_sections(sections)
}

fn symbol(name: &str) -> Section {
    Section::symbol(name, name, format!("def {name}()"), SearchKey::from([".", name]))
}

fn python(library: &str, pages: Vec<Page>) -> Index {
    Index::new(Language::python())
        .with_libraries(vec![Library::new(library, library).with_pages(pages)])
}

#[test]
fn test_exact_token_outranks_substring() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    let index = python(
        "lib",
        vec![module("jobs.py", "jobs", vec![symbol("rerun"), symbol("run")])],
    );
    services.store.put(&cancel, "lib", &Language::python(), &index).unwrap();

    let response = services.search.search(&cancel, "run", None, None).unwrap();
    let paths: Vec<&str> = response.results.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["jobs.run", "jobs.rerun"]);
}

#[test]
fn test_shallow_symbol_outranks_nested() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    let nested = symbol("Outer").with_children(vec![symbol("close")]);
    let index = python(
        "lib",
        vec![
            module("a.py", "a", vec![nested]),
            module("b.py", "b", vec![symbol("close")]),
        ],
    );
    services.store.put(&cancel, "lib", &Language::python(), &index).unwrap();

    let response = services.search.search(&cancel, "close", None, None).unwrap();
    assert_eq!(response.results[0].path, "b.close");
    assert_eq!(response.results[1].path, "a.Outer.close");
}

#[test]
fn test_naming_the_project_boosts_it() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    services.store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    services.store.put(&cancel, "zeta", &Language::python(), &acme_index()).unwrap();

    let plain = services.search.search(&cancel, "run", None, None).unwrap();
    assert_eq!(plain.results[0].project, "acme");

    let named = services.search.search(&cancel, "zeta run", None, None).unwrap();
    assert_eq!(named.results[0].project, "zeta");
    assert_eq!(named.results[0].path, "pkg.run");
}

#[test]
fn test_k_is_clamped() {
    let services = create_test_services_with(|c| c.search.max_k = 3);
    let cancel = CancellationToken::new();
    let pages = (0..10)
        .map(|i| module(&format!("m{i}.py"), &format!("m{i}"), vec![symbol("go")]))
        .collect();
    services
        .store
        .put(&cancel, "lib", &Language::python(), &python("lib", pages))
        .unwrap();

    let response = services.search.search(&cancel, "go", None, Some(50)).unwrap();
    assert_eq!(response.count, 3);
    assert_eq!(response.total_matches, 10);

    let response = services.search.search(&cancel, "go", None, Some(0)).unwrap();
    assert_eq!(response.count, 1);
}

#[test]
fn test_categories_searchable_when_enabled() {
    let services = create_test_services_with(|c| c.search.include_categories = true);
    let cancel = CancellationToken::new();
    services.store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    let response = services.search.search(&cancel, "functions", None, None).unwrap();
    assert_eq!(response.results[0].label, "Functions");
    assert_eq!(response.results[0].section_path, vec!["func"]);
}

#[test]
fn test_uncached_service_sees_writes() {
    let services = create_test_services_with(|c| c.search.cache = false);
    let cancel = CancellationToken::new();
    assert_eq!(services.search.search(&cancel, "run", None, None).unwrap().count, 0);

    services.store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    assert_eq!(services.search.search(&cancel, "run", None, None).unwrap().count, 1);
}

#[test]
fn test_cache_sees_writes_from_another_handle() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    assert_eq!(services.search.search(&cancel, "run", None, None).unwrap().count, 0);

    // A second handle on the same directory does not share the generation counter
    let other = doctree::core::storage::IndexStore::new(services.data_dir.path());
    other.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();

    assert_eq!(services.search.search(&cancel, "run", None, None).unwrap().count, 1);
}
