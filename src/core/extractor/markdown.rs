//! Markdown front-end backed by pulldown-cmark.
//!
//! Each file becomes a page and each heading a section, nested by
//! heading level. A leading level-1 heading names the page instead
//! of producing a section. Error policy: abort, as for Python.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{directory_library, LanguageExtractor};
use crate::core::config::IndexingConfig;
use crate::core::error::{DoctreeError, Result};
use crate::core::indexer::walker::{SourceFile, SourceWalker};
use crate::core::schema::{Index, Language, Page, SearchKey, Section};

const EXTENSIONS: &[&str] = &["md", "markdown"];

/// Extractor for `.md` / `.markdown` documents
#[derive(Debug, Clone)]
pub struct MarkdownExtractor {
    walker: SourceWalker,
}

struct Heading {
    level: usize,
    text: String,
    start: usize,
    end: usize,
    body: String,
}

impl MarkdownExtractor {
    pub fn new(config: &IndexingConfig) -> Result<Self> {
        Ok(Self {
            walker: SourceWalker::from_config(EXTENSIONS, config)?,
        })
    }

    fn index_file(&self, file: &SourceFile, source: &str) -> Page {
        let mut headings = collect_headings(source);

        let stem = match file.relative.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => file.relative.as_str(),
        };
        let mut key = Vec::new();
        for (i, part) in stem.split('/').enumerate() {
            if i > 0 {
                key.push("/".to_string());
            }
            key.push(part.to_string());
        }

        let preamble = headings
            .first()
            .map(|h| source.get(..h.start).unwrap_or(""))
            .unwrap_or(source)
            .trim()
            .to_string();

        let (title, detail) = match headings.first() {
            Some(h) if h.level == 1 => {
                let title_heading = headings.remove(0);
                let detail = [preamble.as_str(), title_heading.body.as_str()]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join("\n\n");
                (title_heading.text, detail)
            }
            _ => (
                Path::new(stem)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(stem)
                    .to_string(),
                preamble,
            ),
        };

        let mut slugs = HashSet::new();
        let mut pos = 0;
        let sections = build_tree(&headings, &mut pos, 0, &mut slugs);

        Page::new(file.relative.clone(), title, SearchKey::new(key))
            .with_detail(detail)
            .with_sections(sections)
    }
}

impl LanguageExtractor for MarkdownExtractor {
    fn language(&self) -> Language {
        Language::markdown()
    }

    fn extensions(&self) -> &[&'static str] {
        EXTENSIONS
    }

    fn index_dir(&self, cancel: &CancellationToken, dir: &Path) -> Result<Index> {
        let files = self.walker.collect_files(cancel, dir)?;

        let mut index = Index::new(self.language());
        let mut pages = Vec::with_capacity(files.len());

        for file in &files {
            if cancel.is_cancelled() {
                return Err(DoctreeError::Cancelled);
            }

            let bytes = fs::read(&file.path).map_err(|e| DoctreeError::io(&file.path, e))?;
            let source = String::from_utf8(bytes)
                .map_err(|_| DoctreeError::parse(&file.path, "file is not valid UTF-8"))?;

            index.num_files += 1;
            index.num_bytes += source.len() as u64;
            pages.push(self.index_file(file, &source));
        }

        tracing::info!(
            "Indexed {} Markdown files ({} bytes) under {:?}",
            index.num_files,
            index.num_bytes,
            dir
        );

        Ok(index.with_libraries(vec![directory_library(dir).with_pages(pages)]))
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Headings in document order, each with the markdown up to the next one
fn collect_headings(source: &str) -> Vec<Heading> {
    let mut headings: Vec<Heading> = Vec::new();
    let mut open: Option<Heading> = None;

    for (event, range) in Parser::new_ext(source, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                open = Some(Heading {
                    level: heading_depth(level),
                    text: String::new(),
                    start: range.start,
                    end: range.end,
                    body: String::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = open.take() {
                    heading.text = heading.text.trim().to_string();
                    heading.end = range.end;
                    headings.push(heading);
                }
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = open.as_mut() {
                    heading.text.push_str(&text);
                }
            }
            _ => {}
        }
    }

    let starts: Vec<usize> = headings.iter().map(|h| h.start).collect();
    for (i, heading) in headings.iter_mut().enumerate() {
        let stop = starts.get(i + 1).copied().unwrap_or(source.len());
        heading.body = source
            .get(heading.end..stop)
            .unwrap_or("")
            .trim()
            .to_string();
    }

    headings
}

fn build_tree(
    headings: &[Heading],
    pos: &mut usize,
    parent_level: usize,
    slugs: &mut HashSet<String>,
) -> Vec<Section> {
    let mut sections = Vec::new();
    while let Some(heading) = headings.get(*pos) {
        if heading.level <= parent_level {
            break;
        }
        *pos += 1;

        let slug = unique_slug(&heading.text, slugs);
        let children = build_tree(headings, pos, heading.level, slugs);
        sections.push(
            Section::symbol(
                slug.clone(),
                heading.text.clone(),
                heading.text.clone(),
                SearchKey::from(["#".to_string(), slug]),
            )
            .with_detail(heading.body.clone())
            .with_children(children),
        );
    }
    sections
}

/// GitHub-style anchor: lowercase, spaces to dashes, punctuation dropped
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' {
            slug.extend(c.to_lowercase());
        } else if (c == ' ' || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// Slug not yet emitted on this page; repeats get `-1`, `-2`, ...
fn unique_slug(text: &str, seen: &mut HashSet<String>) -> String {
    let base = slugify(text);
    let mut slug = base.clone();
    let mut n = 0;
    while seen.contains(&slug) {
        n += 1;
        slug = format!("{base}-{n}");
    }
    seen.insert(slug.clone());
    slug
}
