// Test fixtures for integration testing

use doctree::core::schema::{Index, Language, Library, Page, SearchKey, Section};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository fixture for creating synthetic source trees
#[allow(dead_code)]
pub struct TestRepo {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

impl TestRepo {
    /// A small mixed Python + Markdown project
    #[allow(dead_code)]
    pub fn acme() -> Self {
        Self::with_files(&[
            ("acme/__init__.py", "\"\"\"Acme toolkit.\"\"\"\n"),
            (
                "acme/runner.py",
                r#""""Task running."""

import asyncio


def run(task, retries=3) -> bool:
    """Run a task."""
    return True


async def run_async(task):
    return await asyncio.sleep(0)


def _helper():
    pass


class Runner(Base):
    """Drives tasks."""

    def __init__(self):
        self.tasks = []

    def start(self):
        pass

    def _reset(self):
        pass

    @property
    def size(self) -> int:
        return len(self.tasks)


class _Hidden:
    pass
"#,
            ),
            (
                "acme/tests/test_runner.py",
                "def test_run():\n    assert True\n",
            ),
            (
                "docs/guide.md",
                "# Guide\n\nUsing acme.\n\n## Install\n\nRun pip.\n\n### From source\n\nClone it.\n\n## Usage\n\nCall run.\n",
            ),
            ("README.md", "Acme readme without a heading.\n"),
            ("notes.txt", "not indexed"),
        ])
    }

    /// `count` Python modules with a few functions each
    #[allow(dead_code)]
    pub fn many_modules(count: usize) -> Self {
        let files: Vec<(String, String)> = (0..count)
            .map(|i| {
                (
                    format!("pkg/module_{i}.py"),
                    format!(
                        "def func_{i}():\n    pass\n\n\nclass Widget{i}:\n    def render(self):\n        pass\n"
                    ),
                )
            })
            .collect();
        let specs: Vec<(&str, &str)> = files
            .iter()
            .map(|(f, c)| (f.as_str(), c.as_str()))
            .collect();
        Self::with_files(&specs)
    }

    /// Create with custom files
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();

        for (path, content) in files {
            let full_path = dir.path().join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full_path, content).unwrap();
            paths.push(full_path);
        }

        Self { dir, files: paths }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Hand-built python index: page `pkg` with `pkg.run` under a Functions category
#[allow(dead_code)]
pub fn acme_index() -> Index {
    let run = Section::symbol("run", "run", "def run()", SearchKey::from(["pkg", ".", "run"]))
        .with_detail("Run the thing.");
    let functions = Section::category("func", "func", "Functions").with_children(vec![run]);
    let page = Page::new("pkg/__init__.py", "Module pkg", SearchKey::from(["pkg"]))
        .with_detail("The pkg package.")
        .with_sections(vec![functions]);

    Index::new(Language::python())
        .with_libraries(vec![Library::new("acme", "acme").with_pages(vec![page])])
}
