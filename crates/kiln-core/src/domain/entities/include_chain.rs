use std::fmt;

use crate::domain::error::DomainError;

/// The path of template names taken to reach the template being resolved.
///
/// Used only for cycle detection; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeChain(Vec<String>);

impl IncludeChain {
    /// Single-element chain for the requested root template.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// The template this chain points at.
    pub fn current(&self) -> &str {
        // Chains are only built by `root` and `extend`, never empty.
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Chain for one declared include of [`current`](Self::current).
    ///
    /// Fails with [`DomainError::CircularInclude`] if `name` is already on
    /// the chain; the error carries the chain with `name` appended.
    pub fn extend(&self, name: &str) -> Result<Self, DomainError> {
        let mut names = self.0.clone();
        names.push(name.to_owned());
        if self.contains(name) {
            return Err(DomainError::CircularInclude { chain: names });
        }
        Ok(Self(names))
    }
}

impl fmt::Display for IncludeChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}
