/// Outcome definitions for product candidates
///
/// Every candidate URL handed to the pipeline ends in exactly one of these.
use std::fmt;

/// What happened to one product candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskOutcome {
    // ===== Store Writes =====
    /// No product with this name existed; a new row was inserted
    Inserted,

    /// The stored product was stale and has been overwritten
    Updated,

    /// The stored product is still fresh; nothing was written
    Skipped,

    // ===== Rejected Pages =====
    /// The page has no breadcrumb into a known department (soft 404)
    NotProduct,

    /// The page is missing its name or price
    NoRecord,

    // ===== Failures =====
    /// A recognised property could not be parsed; the record was discarded
    ExtractFailed,

    /// The page could not be fetched
    FetchFailed,

    /// The product store rejected the read or write
    StoreFailed,

    /// The candidate's task panicked or was cancelled before reporting
    Aborted,

    /// No fetch slot was free and the task was dropped
    Dropped,
}

impl TaskOutcome {
    /// All outcomes, in display order
    pub const ALL: [TaskOutcome; 10] = [
        Self::Inserted,
        Self::Updated,
        Self::Skipped,
        Self::NotProduct,
        Self::NoRecord,
        Self::ExtractFailed,
        Self::FetchFailed,
        Self::StoreFailed,
        Self::Aborted,
        Self::Dropped,
    ];

    /// Returns true if the product store was written
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }

    /// Returns true if the candidate failed for an I/O or data reason
    ///
    /// Dropped tasks are counted separately.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ExtractFailed | Self::FetchFailed | Self::StoreFailed | Self::Aborted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::NotProduct => "not_product",
            Self::NoRecord => "no_record",
            Self::ExtractFailed => "extract_failed",
            Self::FetchFailed => "fetch_failed",
            Self::StoreFailed => "store_failed",
            Self::Aborted => "aborted",
            Self::Dropped => "dropped",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
