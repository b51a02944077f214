//! Directory pager.
//!
//! Turns an ordered result stream into a bounded [`Directory`]. The stream
//! is consumed lazily: only `offset + max_to_return + 1` items are pulled,
//! the extra one deciding between COMPLETE and PARTIAL.

use cts2_model::{CompleteDirectory, Directory, MaxToReturn, QueryParams};

use crate::config::QueryConfig;

/// A page window over an ordered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    max_to_return: MaxToReturn,
    page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(MaxToReturn::default(), 0)
    }
}

impl Pager {
    /// Creates a pager for page `page` (zero-based) of size `max_to_return`.
    pub fn new(max_to_return: MaxToReturn, page: usize) -> Self {
        Self { max_to_return, page }
    }

    /// Creates a pager from request parameters, falling back to the
    /// configured default page size.
    pub fn from_params(params: &QueryParams, config: &QueryConfig) -> Self {
        Self::new(
            params.max_to_return.unwrap_or(config.default_max_to_return),
            params.page,
        )
    }

    /// Index of the first item of the window.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.max_to_return.get())
    }

    /// Builds the directory for this window.
    pub fn page<T, I>(&self, items: I) -> Directory<T>
    where
        I: IntoIterator<Item = T>,
    {
        let limit = self.max_to_return.get();
        let mut rest = items.into_iter().skip(self.offset());
        let entries: Vec<T> = rest.by_ref().take(limit).collect();
        let complete = if rest.next().is_some() {
            CompleteDirectory::Partial
        } else {
            CompleteDirectory::Complete
        };
        log::trace!(
            "paged {} entries at offset {} ({:?})",
            entries.len(),
            self.offset(),
            complete
        );
        Directory::new(entries, complete)
    }
}
