//! I define the identifier service minting opaque resource
//! path fragments.
//!

use uuid::Uuid;

/// A generator of opaque identifiers: an optional prefix, an
/// optional hierarchy of short hash segments, and a unique
/// token.
///
/// With `hierarchy = 2` and `length = 2`, generated values look
/// like `ab/cd/<uuid>`.
#[derive(Debug, Clone)]
pub struct IdentifierGenerator {
    prefix: String,
    hierarchy: usize,
    length: usize,
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            hierarchy: 0,
            length: 0,
        }
    }
}

impl IdentifierGenerator {
    /// Create a generator with given prefix, hierarchy level
    /// count, and segment length.
    pub fn new(prefix: impl Into<String>, hierarchy: usize, length: usize) -> Self {
        Self {
            prefix: prefix.into(),
            hierarchy,
            length,
        }
    }

    /// Resolve whether the configuration is satisfiable: the
    /// hierarchy segments must be carved from a 32 character
    /// token.
    pub fn is_satisfiable(&self) -> bool {
        self.hierarchy * self.length <= 32
    }

    /// Mint a new identifier fragment.
    pub fn generate(&self) -> String {
        let token = Uuid::new_v4();
        let compact = token.simple().to_string();

        let mut out = String::new();
        if !self.prefix.is_empty() {
            out.push_str(self.prefix.trim_end_matches('/'));
            out.push('/');
        }
        for level in 0..self.hierarchy {
            let start = level * self.length;
            out.push_str(&compact[start..start + self.length]);
            out.push('/');
        }
        out.push_str(&token.to_string());
        out
    }
}
