//! Terminal rendering of command results
//!
//! Logs go to stderr through tracing; everything here goes to the writer the
//! reporter was built with (stdout in the binary, a buffer in tests).

use std::io::{self, Stdout, Write};

use domain_vector::{QueryMatch, StoredDocument};

/// Maximum number of characters of document text shown by `list`
pub const TEXT_PREVIEW_CHARS: usize = 100;

/// Shorten `text` to its first `TEXT_PREVIEW_CHARS` characters, marking the cut
pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(TEXT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// One page of `list` output followed by the collection total.
    /// An empty page prints only the not-found line.
    pub fn documents(
        &mut self,
        offset: u32,
        documents: &[StoredDocument],
        total: u64,
    ) -> io::Result<()> {
        if documents.is_empty() {
            writeln!(self.out, "No documents found.")?;
            return self.out.flush();
        }

        writeln!(
            self.out,
            "=== Documents (showing {}, offset {}) ===",
            documents.len(),
            offset
        )?;
        for (i, doc) in documents.iter().enumerate() {
            writeln!(self.out, "\n[{}] ID: {}", i + 1, doc.id)?;
            if let Some(text) = &doc.text {
                writeln!(self.out, "    Text: {}", truncate_text(text))?;
            }
            for (key, value) in &doc.metadata {
                writeln!(self.out, "    {}: {}", key, value)?;
            }
        }

        writeln!(self.out, "\nTotal documents in collection: {}", total)?;
        self.out.flush()
    }

    /// Nearest-neighbour matches, one group per query text
    pub fn query_results(
        &mut self,
        queries: &[String],
        groups: &[Vec<QueryMatch>],
    ) -> io::Result<()> {
        writeln!(self.out, "\n=== Query Results ===")?;

        let labelled = queries.len() > 1;
        for (query, matches) in queries.iter().zip(groups) {
            if labelled {
                writeln!(self.out, "Query: {}", query)?;
            }
            for (rank, hit) in matches.iter().enumerate() {
                writeln!(
                    self.out,
                    "  [{}] ID: {}, Distance: {:.4}\n      Document: {}",
                    rank + 1,
                    hit.id,
                    hit.distance,
                    hit.text.as_deref().unwrap_or_default()
                )?;
            }
        }

        self.out.flush()
    }
}
