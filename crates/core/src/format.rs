use std::fmt;
use std::ops::Range;

use crate::config::PathEncoding;
use crate::util::hash_text;

/// Renders tokenized paths as `left,path,right` triplets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathFormatter {
    encoding: PathEncoding,
}

impl PathFormatter {
    pub fn new(encoding: PathEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> PathEncoding {
        self.encoding
    }

    /// Concatenated ids, or their hash when compacting.
    pub fn structural_path<S: AsRef<str>>(&self, ids: &[S]) -> String {
        let joined = ids.iter().fold(String::new(), |mut acc, id| {
            acc.push_str(id.as_ref());
            acc
        });
        match self.encoding {
            PathEncoding::Ids => joined,
            PathEncoding::Hashed => hash_text(&joined).to_string(),
        }
    }

    /// Context between two terminals. `up` holds the ids from just above the
    /// left terminal to the common ancestor, `down` the ids below the ancestor
    /// down to just above the right terminal.
    pub fn render<S: AsRef<str>>(&self, left: &str, up: &[S], down: &[S], right: &str) -> String {
        let ids: Vec<&str> = up.iter().chain(down).map(|id| id.as_ref()).collect();
        format!("{left},{},{right}", self.structural_path(ids.as_slice()))
    }

    /// Context for a root-to-terminal branch: `root,ids_hash,terminal`, where
    /// `ids` are the internal nodes below the root and `hash` identifies the
    /// terminal text in the vocabulary.
    pub fn render_branch<S: AsRef<str>>(
        &self,
        root: &str,
        inner: &[S],
        terminal_hash: u64,
        terminal: &str,
    ) -> String {
        format!(
            "{root},{}_{terminal_hash},{terminal}",
            self.structural_path(inner)
        )
    }
}

/// Splits an id-encoded structural path back into grammar ids. Returns `None`
/// for hashed or malformed input.
pub fn decode_ids(path: &str) -> Option<Vec<u16>> {
    if path.len() % 3 != 0 || !path.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    path.as_bytes()
        .chunks(3)
        .map(|chunk| std::str::from_utf8(chunk).ok()?.parse().ok())
        .collect()
}

/// One rendered context together with the byte spans of its two endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub text: String,
    pub left_span: Range<usize>,
    pub right_span: Range<usize>,
}

impl PathContext {
    /// `start|end|start|end` of the left and right terminals.
    pub fn span_prefix(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.left_span.start, self.left_span.end, self.right_span.start, self.right_span.end
        )
    }

    /// The three comma-separated fields.
    pub fn fields(&self) -> Option<(&str, &str, &str)> {
        let mut parts = self.text.splitn(3, ',');
        Some((parts.next()?, parts.next()?, parts.next()?))
    }
}

impl fmt::Display for PathContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_concatenate_and_decode() {
        let formatter = PathFormatter::new(PathEncoding::Ids);
        let ctx = formatter.render("x", &["230"], &["014"], "1");
        assert_eq!(ctx, "x,230014,1");
        assert_eq!(decode_ids("230014"), Some(vec![230, 14]));
    }

    #[test]
    fn hashed_path_is_one_token() {
        let formatter = PathFormatter::new(PathEncoding::Hashed);
        let ctx = formatter.render("x", &["230", "014"], &[], "1");
        assert_eq!(ctx, format!("x,{},1", hash_text("230014")));
        assert_ne!(formatter.structural_path(&["230014"]), "230014");
    }

    #[test]
    fn branch_rendering_appends_terminal_hash() {
        let formatter = PathFormatter::new(PathEncoding::Ids);
        let ctx = formatter.render_branch("198", &["230", "014"], 77, "identifier");
        assert_eq!(ctx, "198,230014_77,identifier");
    }

    #[test]
    fn decode_rejects_malformed_paths() {
        assert_eq!(decode_ids("12"), None);
        assert_eq!(decode_ids("12a"), None);
        assert_eq!(decode_ids(""), Some(vec![]));
    }

    #[test]
    fn context_exposes_spans_and_fields() {
        let ctx = PathContext {
            text: "x,230,1".to_string(),
            left_span: 4..5,
            right_span: 8..9,
        };
        assert_eq!(ctx.span_prefix(), "4|5|8|9");
        assert_eq!(ctx.fields(), Some(("x", "230", "1")));
        assert_eq!(ctx.to_string(), "x,230,1");
    }
}
