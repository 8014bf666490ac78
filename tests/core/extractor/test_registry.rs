// Integration tests for extractor registry dispatch

use crate::common::TestRepo;
use doctree::core::config::IndexingConfig;
use doctree::core::extractor::{
    ExtractorRegistry, LanguageExtractor, MarkdownExtractor, PythonExtractor,
};
use doctree::core::schema::Language;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[test]
fn test_dispatch_finds_both_languages() {
    let repo = TestRepo::acme();
    let registry = ExtractorRegistry::with_defaults(&IndexingConfig::default()).unwrap();

    let found: Vec<Language> = registry
        .dispatch(&CancellationToken::new(), repo.path())
        .unwrap()
        .iter()
        .map(|e| e.language())
        .collect();
    assert_eq!(found, vec![Language::markdown(), Language::python()]);
}

#[test]
fn test_dispatch_only_markdown() {
    let repo = TestRepo::with_files(&[("docs/intro.md", "# Intro\n"), ("data.csv", "a,b\n")]);
    let registry = ExtractorRegistry::with_defaults(&IndexingConfig::default()).unwrap();

    let found = registry
        .dispatch(&CancellationToken::new(), repo.path())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].language(), Language::markdown());
}

#[test]
fn test_dispatch_root_under_build_directory() {
    let repo = TestRepo::with_files(&[
        ("build/acme/app.py", "def main():\n    pass\n"),
        ("build/acme/target/out.py", "def gen():\n    pass\n"),
    ]);
    let registry = ExtractorRegistry::with_defaults(&IndexingConfig::default()).unwrap();
    let root = repo.path().join("build").join("acme");
    let cancel = CancellationToken::new();

    let found = registry.dispatch(&cancel, &root).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].language(), Language::python());

    // Excludes still apply inside the root
    let index = found[0].index_dir(&cancel, &root).unwrap();
    assert_eq!(index.num_files, 1);
}

#[test]
fn test_duplicate_language_rejected() {
    let config = IndexingConfig::default();
    let extractors: Vec<Arc<dyn LanguageExtractor>> = vec![
        Arc::new(PythonExtractor::new(&config).unwrap()),
        Arc::new(MarkdownExtractor::new(&config).unwrap()),
        Arc::new(PythonExtractor::new(&config).unwrap()),
    ];

    let err = ExtractorRegistry::new(extractors, &config).unwrap_err();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("python"));
}

#[test]
fn test_registry_shared_across_threads() {
    let repo = TestRepo::acme();
    let registry =
        Arc::new(ExtractorRegistry::with_defaults(&IndexingConfig::default()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let root = repo.path().to_path_buf();
            std::thread::spawn(move || {
                registry
                    .dispatch(&CancellationToken::new(), &root)
                    .unwrap()
                    .len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
