/// Skip/limit bookkeeping behind "load more".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    skip: u64,
    limit: u64,
    has_more: bool,
    is_loading: bool,
}

impl Cursor {
    pub fn new(limit: u64) -> Self {
        Self {
            skip: 0,
            limit,
            has_more: true,
            is_loading: false,
        }
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Claim the next window. `None` while a request is out or the list is
    /// exhausted.
    pub fn begin(&mut self) -> Option<(u64, u64)> {
        if self.is_loading || !self.has_more {
            return None;
        }
        self.is_loading = true;
        Some((self.skip, self.limit))
    }

    /// A page starting at `page_skip` was merged.
    pub fn merged(&mut self, page_skip: u64, has_more: bool) {
        self.skip = page_skip + self.limit;
        self.has_more = has_more;
        self.is_loading = false;
    }

    /// The request failed; the same window will be asked for again.
    pub fn failed(&mut self) {
        self.is_loading = false;
    }

    pub fn reset(&mut self) {
        self.skip = 0;
        self.has_more = true;
        self.is_loading = false;
    }
}
