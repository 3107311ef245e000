//! Field splitting for separator-delimited lines.

/// How a line is split into fields.
///
/// Consecutive separators collapse and leading/trailing separators produce no empty fields, so
/// `"  a   b "` splits into `["a", "b"]` with [`Separator::Whitespace`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Separator {
    /// Any Unicode whitespace.
    #[default]
    Whitespace,
    /// Any of the given characters.
    AnyOf(Vec<char>),
}

impl Separator {
    /// Build a separator from a user-supplied set of characters; empty means whitespace.
    pub fn from_chars(set: &str) -> Self {
        if set.is_empty() {
            Self::Whitespace
        } else {
            Self::AnyOf(set.chars().collect())
        }
    }

    /// Whether `c` separates fields.
    pub fn is_separator(&self, c: char) -> bool {
        match self {
            Self::Whitespace => c.is_whitespace(),
            Self::AnyOf(set) => set.contains(&c),
        }
    }

    /// Split `line` into non-empty fields.
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.split(|c| self.is_separator(c))
            .filter(|f| !f.is_empty())
            .collect()
    }
}
