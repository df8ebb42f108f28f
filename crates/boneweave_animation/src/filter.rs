//! Bone predicates.
//!
//! A [`BoneFilter`] selects a subset of a model's bones. Filters are evaluated
//! against the live bone list every time a request is applied; nothing about
//! the selection is memoized on the filter itself.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

/// Predicate over bone names.
#[derive(Clone, Default)]
pub enum BoneFilter {
    /// Every bone of the model.
    #[default]
    All,
    /// Exactly the listed bones.
    Names(FxHashSet<Box<str>>),
    /// Bones carrying a name tag, e.g. `p` matches `p_seat`.
    Tagged(String),
    /// Arbitrary caller-provided predicate.
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl BoneFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::All
    }

    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Names(
            names
                .into_iter()
                .map(|name| Box::from(name.as_ref()))
                .collect(),
        )
    }

    pub fn tagged(tag: impl Into<String>) -> Self {
        Self::Tagged(tag.into())
    }

    pub fn custom(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Returns `true` if the bone is selected.
    #[must_use]
    pub fn matches(&self, bone: &str) -> bool {
        match self {
            Self::All => true,
            Self::Names(names) => names.contains(bone),
            Self::Tagged(tag) => bone
                .strip_prefix(tag.as_str())
                .is_some_and(|rest| rest.starts_with('_')),
            Self::Custom(predicate) => predicate(bone),
        }
    }

    /// Evaluates the filter against a live bone list.
    ///
    /// Only names from `bones` are returned, so a name listed in the filter
    /// but absent from the model never leaves the filter.
    pub fn select<'a, I>(&self, bones: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selected: Vec<_> = bones
            .into_iter()
            .filter(|bone| self.matches(bone))
            .collect();
        selected.sort_unstable();
        selected.dedup();
        selected
    }
}

impl fmt::Debug for BoneFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Names(names) => f
                .debug_set()
                .entries(names.iter())
                .finish(),
            Self::Tagged(tag) => f.debug_tuple("Tagged").field(tag).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
