//! Glob-based ignore rules shared by snapshot walks and the watcher.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Compiled set of ignore globs (`**/.git`, `**/*.swp`, ...)
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl IgnoreMatcher {
    pub fn new(patterns: &[String]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(&pattern.replace('\\', "/"))?);
        }
        Ok(Self {
            set: builder.build()?,
            patterns: patterns.to_vec(),
        })
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        !self.patterns.is_empty() && self.set.is_match(path)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self::empty()
    }
}
