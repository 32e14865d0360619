//! The seam to the package lookup collaborator.

/// Lookup-by-name over the known package universe (installed distributions
/// plus the remote name index).
///
/// Implementations must be cheap and synchronous: finder predicates call
/// `is_known` once per package node during a traversal. Network refresh and
/// on-demand fetching live behind the implementation, not this trait.
pub trait PackageLookup: Send + Sync {
    /// Whether `name` is a known package.
    fn is_known(&self, name: &str) -> bool;

    /// Rendered documentation for `name`, or `None` when nothing is known
    /// beyond the bare name.
    fn documentation(&self, name: &str) -> Option<String>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PackageLookup;
    use std::collections::HashSet;

    /// Fixed-set lookup for unit tests.
    pub(crate) struct StaticLookup {
        names: HashSet<String>,
    }

    impl StaticLookup {
        pub(crate) fn new<I: IntoIterator<Item = &'static str>>(names: I) -> Self {
            Self {
                names: names.into_iter().map(str::to_string).collect(),
            }
        }
    }

    impl PackageLookup for StaticLookup {
        fn is_known(&self, name: &str) -> bool {
            self.names.contains(name)
        }

        fn documentation(&self, name: &str) -> Option<String> {
            self.names.get(name).map(|n| format!("# {n}"))
        }
    }
}
