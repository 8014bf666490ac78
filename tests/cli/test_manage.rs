// Tests for the list, delete and languages commands

use crate::common::{acme_index, create_test_services};
use doctree::cli::commands::delete::{self, DeleteArgs};
use doctree::cli::commands::languages;
use doctree::cli::commands::list::{self, ListArgs};
use doctree::cli::OutputFormat;
use doctree::core::schema::{Index, Language};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_list_empty_store() {
    let services = create_test_services();
    let (response, _) = list::list(&ListArgs { project: None }, &services, &CancellationToken::new())
        .unwrap();
    assert_eq!(response.count, 0);

    let result = list::execute(
        ListArgs { project: None },
        &services,
        OutputFormat::Human,
        &CancellationToken::new(),
    )
    .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_list_filters_by_project() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    services.store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    services.store.put(&cancel, "zeta", &Language::python(), &acme_index()).unwrap();

    let (all, _) = list::list(&ListArgs { project: None }, &services, &cancel).unwrap();
    assert_eq!(all.count, 2);
    assert!(all.indexes.iter().all(|i| i.compatible && i.modified.is_some()));

    let (one, _) = list::list(
        &ListArgs {
            project: Some("zeta".to_string()),
        },
        &services,
        &cancel,
    )
    .unwrap();
    assert_eq!(one.count, 1);
    assert_eq!(one.indexes[0].project, "zeta");
    assert_eq!(one.indexes[0].language, "python");
}

#[tokio::test]
async fn test_delete_one_language() {
    let services = create_test_services();
    let cancel = CancellationToken::new();
    services.store.put(&cancel, "acme", &Language::python(), &acme_index()).unwrap();
    services
        .store
        .put(&cancel, "acme", &Language::markdown(), &Index::new(Language::markdown()))
        .unwrap();

    let response = delete::delete(
        &DeleteArgs {
            project: "acme".to_string(),
            language: Some("python".to_string()),
        },
        &services,
    )
    .unwrap();
    assert_eq!(response.deleted, 1);
    assert_eq!(
        services.store.languages_for("acme").unwrap(),
        vec![Language::markdown()]
    );
}

#[tokio::test]
async fn test_delete_missing_project_is_not_found() {
    let services = create_test_services();
    let err = delete::delete(
        &DeleteArgs {
            project: "ghost".to_string(),
            language: None,
        },
        &services,
    )
    .unwrap_err();

    let core = err.downcast_ref::<doctree::DoctreeError>().unwrap();
    assert!(core.is_not_found());
}

#[test]
fn test_languages_lists_builtins() {
    let services = create_test_services();
    let infos = languages::languages(&services);

    let names: Vec<&str> = infos.iter().map(|i| i.language.as_str()).collect();
    assert_eq!(names, vec!["markdown", "python"]);
    assert!(infos[1].extensions.contains(&"py".to_string()));
}
