//! Local reference lookup for citations.
//!
//! A small knowledge file on disk replaces any external search: chunks
//! are scored by term overlap with the query. Citations are only ever
//! built from lookup results, never from model text.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::models::Citation;

const MAX_QUERIES: usize = 3;
const MAX_CITATIONS: usize = 15;
const QUOTE_MAX_CHARS: usize = 500;
const DEDUP_PREFIX_CHARS: usize = 80;

/// One retrievable chunk of reference material.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReferenceChunk {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Reference lookup backend.
pub trait CitationLookup: Send + Sync {
    /// Return up to `k` chunks relevant to the query, best first.
    fn lookup(&self, query: &str, k: usize) -> Vec<ReferenceChunk>;
}

// ── File-backed index ───────────────────────────────────────

/// Lookup over a JSON array of chunks loaded at startup.
///
/// A missing or unreadable file degrades to an empty index; the
/// pipeline then simply produces no citations.
pub struct FileIndex {
    chunks: Vec<ReferenceChunk>,
}

impl FileIndex {
    pub fn open(path: &Path) -> Self {
        let chunks = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<ReferenceChunk>>(&raw) {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!(event = "knowledge_file_invalid", path = %path.display(), error = %e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(event = "knowledge_file_missing", path = %path.display(), error = %e);
                Vec::new()
            }
        };
        Self { chunks }
    }

    pub fn empty() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(|t| t.to_string())
        .collect()
}

impl CitationLookup for FileIndex {
    fn lookup(&self, query: &str, k: usize) -> Vec<ReferenceChunk> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, &ReferenceChunk)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let haystack = format!("{} {}", chunk.title, chunk.content).to_lowercase();
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score > 0).then_some((score, chunk))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().take(k).map(|(_, c)| c.clone()).collect()
    }
}

// ── Static lookup for tests ─────────────────────────────────

/// Lookup that always returns the same fixed chunks.
pub struct StaticLookup {
    chunks: Vec<ReferenceChunk>,
}

impl StaticLookup {
    pub fn empty() -> Self {
        Self { chunks: Vec::new() }
    }

    pub fn with_chunk(source: &str, url: &str, title: &str, content: &str) -> Self {
        Self {
            chunks: vec![ReferenceChunk {
                source: source.to_string(),
                title: title.to_string(),
                url: url.to_string(),
                content: content.to_string(),
            }],
        }
    }

    pub fn with_chunks(chunks: Vec<ReferenceChunk>) -> Self {
        Self { chunks }
    }
}

impl CitationLookup for StaticLookup {
    fn lookup(&self, _query: &str, k: usize) -> Vec<ReferenceChunk> {
        self.chunks.iter().take(k).cloned().collect()
    }
}

// ── Citation gathering ──────────────────────────────────────

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Turn model-suggested queries into deduplicated citations.
///
/// Only the first three queries run; duplicates are dropped by
/// (source, url, content prefix); gathering stops early at twice the
/// per-query depth and the result is capped at fifteen citations.
pub fn gather_citations(
    queries: &[String],
    lookup: &dyn CitationLookup,
    top_k: usize,
) -> Vec<Citation> {
    if queries.is_empty() {
        return Vec::new();
    }
    let mut seen: HashSet<(String, String, String)> = HashSet::new();
    let mut citations = Vec::new();
    for query in queries.iter().take(MAX_QUERIES) {
        for chunk in lookup.lookup(query, top_k) {
            let key = (
                chunk.source.clone(),
                chunk.url.clone(),
                truncate_chars(&chunk.content, DEDUP_PREFIX_CHARS),
            );
            if !seen.insert(key) {
                continue;
            }
            citations.push(Citation {
                source: chunk.source,
                url: chunk.url,
                quote: truncate_chars(&chunk.content, QUOTE_MAX_CHARS),
            });
        }
        if citations.len() >= top_k * 2 {
            break;
        }
    }
    citations.truncate(MAX_CITATIONS);
    citations
}
