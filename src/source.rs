//! Editable views over module source text.
//!
//! A [`SourceSpan`] is a byte range of a module's source plus a list of
//! pending edits, all in the coordinates of the original text. Nothing is
//! rewritten until the span is rendered, so a span can be cloned and edited
//! per output without disturbing the module it came from.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: u32,
    end: u32,
    content: String,
}

#[derive(Debug, Clone)]
pub struct SourceSpan {
    source: Arc<str>,
    start: u32,
    end: u32,
    edits: Vec<Edit>,
}

impl SourceSpan {
    /// The whole of `source`.
    pub fn new(source: Arc<str>) -> Self {
        let end = source.len() as u32;
        Self {
            source,
            start: 0,
            end,
            edits: Vec::new(),
        }
    }

    /// An independent span covering `start..end` of the same source.
    pub fn snip(&self, start: u32, end: u32) -> SourceSpan {
        let start = start.clamp(self.start, self.end);
        let end = end.clamp(start, self.end);
        SourceSpan {
            source: Arc::clone(&self.source),
            start,
            end,
            edits: self
                .edits
                .iter()
                .filter(|edit| edit.start >= start && edit.end <= end)
                .cloned()
                .collect(),
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// The unedited text of this span.
    pub fn original(&self) -> &str {
        &self.source[self.start as usize..self.end as usize]
    }

    pub fn remove(&mut self, start: u32, end: u32) -> &mut Self {
        self.overwrite(start, end, "")
    }

    /// Replaces `start..end` (original coordinates) with `content`. An edit
    /// that overlaps earlier edits supersedes them. Ranges outside the span
    /// are clipped.
    pub fn overwrite(&mut self, start: u32, end: u32, content: &str) -> &mut Self {
        let start = start.clamp(self.start, self.end);
        let end = end.clamp(start, self.end);
        self.edits.retain(|edit| edit.end <= start || edit.start >= end);
        self.edits.push(Edit {
            start,
            end,
            content: content.to_string(),
        });
        self
    }

    pub fn is_edited(&self) -> bool {
        !self.edits.is_empty()
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|edit| (edit.start, edit.end));

        let mut cursor = self.start;
        for edit in edits {
            f.write_str(&self.source[cursor as usize..edit.start as usize])?;
            f.write_str(&edit.content)?;
            cursor = edit.end;
        }
        f.write_str(&self.source[cursor as usize..self.end as usize])
    }
}

/// Ordered concatenation of spans. Each span's separator is written before
/// it, except for the first.
#[derive(Debug, Default)]
pub struct SourceBundle {
    sources: Vec<(SourceSpan, String)>,
}

impl SourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, content: SourceSpan, separator: &str) -> &mut Self {
        self.sources.push((content, separator.to_string()));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Display for SourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (content, separator)) in self.sources.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{}", content)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str) -> SourceSpan {
        SourceSpan::new(Arc::from(text))
    }

    #[test]
    fn test_snip_uses_original_coordinates() {
        let module = span("var a = 1;\nfoo(a);");
        let mut stmt = module.snip(11, 18);
        assert_eq!(stmt.original(), "foo(a);");

        stmt.overwrite(15, 16, "a$1");
        assert_eq!(stmt.to_string(), "foo(a$1);");
    }

    #[test]
    fn test_clone_edits_are_independent() {
        let module = span("export var age = 1;");
        let stmt = module.snip(0, 19);
        let mut edited = stmt.clone();
        edited.remove(0, 7).overwrite(11, 14, "age$1");

        assert_eq!(edited.to_string(), "var age$1 = 1;");
        assert_eq!(stmt.to_string(), "export var age = 1;");
        assert!(!stmt.is_edited());
    }

    #[test]
    fn test_overlapping_overwrite_supersedes_earlier_edit() {
        let mut s = span("({ age })");
        s.overwrite(3, 6, "age$1");
        s.overwrite(3, 6, "age: age$1");
        assert_eq!(s.to_string(), "({ age: age$1 })");
    }

    #[test]
    fn test_bundle_joins_with_separators() {
        let module = span("a();b();c();");
        let mut bundle = SourceBundle::new();
        bundle
            .add_source(module.snip(0, 4), "\n")
            .add_source(module.snip(4, 8), "\n")
            .add_source(module.snip(8, 12), "\n\n");
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.to_string(), "a();\nb();\n\nc();");
    }
}
