pub mod error;
pub mod extract;
pub mod models;
pub mod notify;
pub mod traits;
pub mod transition;
pub mod watch;

#[cfg(test)]
mod testutil;

pub use error::AppError;
pub use extract::{AvailabilityExtractor, KeywordRule};
pub use models::{
    Alert, Assessment, Availability, Evidence, PageContent, Polarity, StatusRecord,
};
pub use notify::{DispatchSummary, NotifierSet};
pub use traits::{Fetcher, Notifier, PageParser, StatusStore};
pub use transition::should_notify;
pub use watch::{
    RunOutcome, Stage, TracingWatchReporter, WatchEvent, WatchReport, WatchReporter, WatchService,
};
