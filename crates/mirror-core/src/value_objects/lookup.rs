//! Memoised lazy relation lookup

/// Result of a lazily resolved relation
///
/// Distinguishes "never looked up" from "looked up and not there", which a
/// plain `Option` cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup<T> {
    /// No lookup has happened yet
    #[default]
    Unresolved,
    /// A lookup happened and found nothing
    ConfirmedAbsent,
    /// A lookup happened and found a value
    Resolved(T),
}

impl<T> Lookup<T> {
    /// Build from the outcome of a lookup
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Resolved(v),
            None => Self::ConfirmedAbsent,
        }
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// The resolved value, or `None` for both other states
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Unresolved | Self::ConfirmedAbsent => None,
        }
    }

    /// Resolve with `resolver` on first use and memoise the outcome
    ///
    /// Once resolved (present or absent) the resolver is not called again
    /// until [`invalidate`](Self::invalidate).
    pub fn get_or_resolve<F>(&mut self, resolver: F) -> Option<&T>
    where
        F: FnOnce() -> Option<T>,
    {
        if let Self::Unresolved = self {
            *self = Self::from_option(resolver());
        }
        self.as_option()
    }

    /// Forget the memoised outcome
    pub fn invalidate(&mut self) {
        *self = Self::Unresolved;
    }
}
