//! Python front-end backed by tree-sitter.
//!
//! One page per module. Top-level functions are grouped under a
//! "Functions" category and classes under "Classes"; methods hang
//! off their class. Names starting with `_` that do not also end
//! with `_` are private by convention and left out, so `_helper`
//! is dropped while `__init__` is kept.
//!
//! Error policy: abort. An unreadable or non UTF-8 file fails the
//! whole run with the offending path.

use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tree_sitter::{Node, Parser};

use super::{directory_library, LanguageExtractor};
use crate::core::config::IndexingConfig;
use crate::core::error::{DoctreeError, Result};
use crate::core::indexer::walker::{SourceFile, SourceWalker};
use crate::core::schema::{Index, Language, Page, SearchKey, Section};

const EXTENSIONS: &[&str] = &["py", "py3"];

/// Extractor for `.py` / `.py3` sources
#[derive(Debug, Clone)]
pub struct PythonExtractor {
    walker: SourceWalker,
    skip_test_files: bool,
}

impl PythonExtractor {
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        Ok(Self {
            walker: SourceWalker::from_config(EXTENSIONS, config)?,
            skip_test_files: config.skip_test_files,
        })
    }

    fn index_file(&self, parser: &mut Parser, file: &SourceFile, source: &str) -> Result<Page> {
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| DoctreeError::parse(&file.path, "parser produced no syntax tree"))?;
        let root = tree.root_node();

        if root.has_error() {
            tracing::warn!("Syntax errors in {:?}; indexing what parsed", file.path);
        }

        let module = module_name(&file.relative);
        let docs = leading_docstring(root, source).unwrap_or_default();

        let mut functions = Vec::new();
        let mut classes = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let Some(def) = unwrap_decorated(child) else {
                continue;
            };
            match def.kind() {
                "function_definition" => {
                    if let Some(section) = function_section(def, source) {
                        push_unique(&mut functions, section);
                    }
                }
                "class_definition" => {
                    if let Some(section) = class_section(def, source) {
                        push_unique(&mut classes, section);
                    }
                }
                _ => {}
            }
        }

        let mut sections = Vec::new();
        if !functions.is_empty() {
            sections.push(Section::category("func", "func", "Functions").with_children(functions));
        }
        if !classes.is_empty() {
            sections.push(Section::category("class", "class", "Classes").with_children(classes));
        }

        Ok(Page::new(
            file.relative.clone(),
            format!("Module {module}"),
            SearchKey::from([module]),
        )
        .with_detail(docs)
        .with_sections(sections))
    }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::python()
    }

    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn index_dir(&self, cancel: &CancellationToken, dir: &Path) -> Result<Index> {
        let files = self.walker.collect_files(cancel, dir)?;

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| DoctreeError::parse(dir, format!("failed to load Python grammar: {e}")))?;

        let mut index = Index::new(self.language());
        let mut pages = Vec::new();

        for file in &files {
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }

            if self.skip_test_files && is_test_file(&file.relative) {
                tracing::debug!("Skipping test file: {}", file.relative);
                continue;
            }

            let bytes = fs::read(&file.path).map_err(|e| DoctreeError::io(&file.path, e))?;
            let source = String::from_utf8(bytes)
                .map_err(|_| DoctreeError::parse(&file.path, "file is not valid UTF-8"))?;

            index.num_files += 1;
            index.num_bytes += source.len() as u64;
            pages.push(self.index_file(&mut parser, file, &source)?);
        }

        tracing::info!(
            "Indexed {} Python files ({} bytes) under {:?}",
            index.num_files,
            index.num_bytes,
            dir
        );

        Ok(index.with_libraries(vec![directory_library(dir).with_pages(pages)]))
    }
}

/// Conventional test-file heuristic
pub fn is_test_file(relative: &str) -> bool {
    relative.contains("test_") || relative.contains("_test") || relative.contains("tests")
}

/// `pkg/sub/mod.py` -> `pkg.sub.mod`; `pkg/__init__.py` -> `pkg`
pub fn module_name(relative: &str) -> String {
    let stem = match relative.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => relative,
    };
    let dotted = stem.replace('/', ".");
    match dotted.strip_suffix(".__init__") {
        Some(package) if !package.is_empty() => package.to_string(),
        _ => dotted,
    }
}

/// False for `_private` names; dunders and plain names pass
pub fn is_public(name: &str) -> bool {
    !(name.starts_with('_') && !name.ends_with('_'))
}

fn text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

fn field_text<'a>(node: Node, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| text(n, source))
}

fn unwrap_decorated(node: Node) -> Option<Node> {
    match node.kind() {
        "decorated_definition" => node.child_by_field_name("definition"),
        "function_definition" | "class_definition" => Some(node),
        _ => None,
    }
}

/// Later definitions of the same name replace earlier ones
fn push_unique(sections: &mut Vec<Section>, section: Section) {
    match sections.iter_mut().find(|s| s.id == section.id) {
        Some(existing) => *existing = section,
        None => sections.push(section),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn function_section(def: Node, source: &str) -> Option<Section> {
    let name = field_text(def, "name", source)?;
    if !is_public(name) {
        return None;
    }

    let params = field_text(def, "parameters", source)
        .map(collapse_whitespace)
        .unwrap_or_else(|| "()".to_string());
    let is_async = def.child(0).map(|c| c.kind() == "async").unwrap_or(false);

    let mut label = format!(
        "{}def {name}{params}",
        if is_async { "async " } else { "" }
    );
    if let Some(ret) = field_text(def, "return_type", source) {
        label.push_str(" -> ");
        label.push_str(&collapse_whitespace(ret));
    }

    let docs = def
        .child_by_field_name("body")
        .and_then(|body| leading_docstring(body, source))
        .unwrap_or_default();

    Some(Section::symbol(name, name, label, SearchKey::from([".", name])).with_detail(docs))
}

fn class_section(def: Node, source: &str) -> Option<Section> {
    let name = field_text(def, "name", source)?;
    if !is_public(name) {
        return None;
    }

    let label = match field_text(def, "superclasses", source) {
        Some(bases) => format!("class {name}{}", collapse_whitespace(bases)),
        None => format!("class {name}"),
    };

    let mut members = Vec::new();
    let mut docs = String::new();
    if let Some(body) = def.child_by_field_name("body") {
        docs = leading_docstring(body, source).unwrap_or_default();
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            let Some(member) = unwrap_decorated(child) else {
                continue;
            };
            let section = match member.kind() {
                "function_definition" => function_section(member, source),
                "class_definition" => class_section(member, source),
                _ => None,
            };
            if let Some(section) = section {
                push_unique(&mut members, section);
            }
        }
    }

    Some(
        Section::symbol(name, name, label, SearchKey::from([".", name]))
            .with_detail(docs)
            .with_children(members),
    )
}

/// Docstring of a module or block: its first statement, if a string
fn leading_docstring(block: Node, source: &str) -> Option<String> {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    Some(sanitize_docstring(text(string, source)))
}

/// Strip prefixes and quotes, then dedent like `inspect.cleandoc`
pub fn sanitize_docstring(raw: &str) -> String {
    let unprefixed = raw.trim_start_matches(|c: char| "rRuUbBfF".contains(c));
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| {
            unprefixed
                .strip_prefix(q)
                .and_then(|s| s.strip_suffix(q).or(Some(s)))
        })
        .unwrap_or(unprefixed);

    let lines: Vec<&str> = inner.lines().collect();
    let Some((first, rest)) = lines.split_first() else {
        return String::new();
    };

    let indent = rest
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = vec![first.trim().to_string()];
    for line in rest {
        out.push(line.get(indent..).unwrap_or("").trim_end().to_string());
    }

    while out.first().is_some_and(|l| l.is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
