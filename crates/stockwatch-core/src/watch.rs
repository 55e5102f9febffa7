use std::fmt;

use crate::error::AppError;
use crate::extract::AvailabilityExtractor;
use crate::models::{Alert, Assessment, Availability, PageContent, StatusRecord};
use crate::notify::{DispatchSummary, NotifierSet};
use crate::traits::{Fetcher, PageParser, StatusStore};
use crate::transition::should_notify;

/// Stages of a single run. A run only ever moves forward through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Fetching,
    Extracting,
    Evaluating,
    Notifying,
    Persisting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Evaluating => "evaluating",
            Stage::Notifying => "notifying",
            Stage::Persisting => "persisting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of a run, as seen by the scheduler invoking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Available,
    OutOfStock,
    Unknown,
    FetchFailed,
}

impl RunOutcome {
    pub fn from_availability(availability: Availability) -> Self {
        match availability {
            Availability::InStock => RunOutcome::Available,
            Availability::OutOfStock => RunOutcome::OutOfStock,
            Availability::Unknown => RunOutcome::Unknown,
        }
    }

    pub fn from_result(result: &Result<WatchReport, AppError>) -> Self {
        match result {
            Ok(report) => report.outcome(),
            Err(_) => RunOutcome::FetchFailed,
        }
    }

    /// Process exit code: 0 available or unknown, 1 out of stock, 2 fetch error.
    ///
    /// Unknown is deliberately 0 so schedulers do not alarm on ambiguity.
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Available | RunOutcome::Unknown => 0,
            RunOutcome::OutOfStock => 1,
            RunOutcome::FetchFailed => 2,
        }
    }
}

/// Events emitted during a run for monitoring/logging.
#[derive(Debug, Clone)]
pub enum WatchEvent<'a> {
    Fetching {
        url: &'a str,
    },
    Fetched {
        bytes: usize,
    },
    FetchFailed {
        error: &'a AppError,
    },
    ParseFailed {
        error: &'a AppError,
    },
    Assessed {
        assessment: &'a Assessment,
    },
    /// The previous record could not be used; the run continues as if
    /// there were none.
    PreviousUnavailable {
        reason: String,
    },
    Evaluated {
        previous: Option<Availability>,
        current: Availability,
        notify: bool,
    },
    NoChannels,
    Dispatched {
        summary: &'a DispatchSummary,
    },
    Persisted {
        record: &'a StatusRecord,
    },
    PersistFailed {
        error: &'a AppError,
    },
    Done {
        outcome: RunOutcome,
    },
}

impl WatchEvent<'_> {
    pub fn stage(&self) -> Stage {
        match self {
            WatchEvent::Fetching { .. } | WatchEvent::Fetched { .. } => Stage::Fetching,
            WatchEvent::ParseFailed { .. } | WatchEvent::Assessed { .. } => Stage::Extracting,
            WatchEvent::PreviousUnavailable { .. } | WatchEvent::Evaluated { .. } => {
                Stage::Evaluating
            }
            WatchEvent::NoChannels | WatchEvent::Dispatched { .. } => Stage::Notifying,
            WatchEvent::Persisted { .. } | WatchEvent::PersistFailed { .. } => Stage::Persisting,
            WatchEvent::FetchFailed { .. } | WatchEvent::Done { .. } => Stage::Done,
        }
    }
}

/// Trait for receiving run events (decoupled logging).
pub trait WatchReporter: Send + Sync {
    fn report(&self, event: WatchEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWatchReporter;

impl WatchReporter for TracingWatchReporter {
    fn report(&self, event: WatchEvent<'_>) {
        match event {
            WatchEvent::Fetching { url } => {
                tracing::info!(%url, "Checking");
            }
            WatchEvent::Fetched { bytes } => {
                tracing::debug!(%bytes, "Fetched page");
            }
            WatchEvent::FetchFailed { error } => {
                tracing::error!(%error, "Failed to fetch page");
            }
            WatchEvent::ParseFailed { error } => {
                tracing::warn!(%error, "Failed to parse page, status unknown");
            }
            WatchEvent::Assessed { assessment } => {
                tracing::info!(
                    status = %assessment.availability,
                    evidence = %assessment.evidence,
                    product = ?assessment.product_name,
                    "Page assessed"
                );
            }
            WatchEvent::PreviousUnavailable { reason } => {
                tracing::warn!(%reason, "Ignoring previous status");
            }
            WatchEvent::Evaluated {
                previous,
                current,
                notify,
            } => {
                let previous = previous.map_or("none", |p| p.as_str());
                tracing::info!(%previous, %current, %notify, "Status evaluated");
                match current {
                    Availability::OutOfStock => tracing::info!("Product unavailable"),
                    Availability::Unknown => tracing::info!("Status ambiguous"),
                    Availability::InStock => {}
                }
            }
            WatchEvent::NoChannels => {
                tracing::info!("Product became available but no notification channel is configured");
            }
            WatchEvent::Dispatched { summary } => {
                tracing::info!(
                    delivered = ?summary.delivered,
                    failed = summary.failed.len(),
                    "Notifications dispatched"
                );
            }
            WatchEvent::Persisted { record } => {
                tracing::debug!(status = %record.status, checked_at = %record.checked_at, "Status saved");
            }
            WatchEvent::PersistFailed { error } => {
                tracing::error!(%error, "Failed to save status, the next run may notify again");
            }
            WatchEvent::Done { outcome } => {
                tracing::debug!(?outcome, exit_code = outcome.exit_code(), "Run finished");
            }
        }
    }
}

/// Everything a completed run decided and did.
#[derive(Debug, Clone)]
pub struct WatchReport {
    pub assessment: Assessment,
    /// Previous record as used for the decision (`None` if absent or unusable).
    pub previous: Option<StatusRecord>,
    /// Whether this run was a transition into stock.
    pub notified: bool,
    /// Present when notification channels were invoked.
    pub dispatch: Option<DispatchSummary>,
    pub record: StatusRecord,
    /// Set when the new record could not be written.
    pub persist_error: Option<String>,
}

impl WatchReport {
    pub fn availability(&self) -> Availability {
        self.assessment.availability
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::from_availability(self.availability())
    }
}

/// Runs one check: fetch → extract → evaluate → notify → persist.
///
/// Generic over all external dependencies via traits, enabling dependency
/// injection and testability without real HTTP, SMTP or disk access.
pub struct WatchService<F, P, S>
where
    F: Fetcher,
    P: PageParser,
    S: StatusStore,
{
    fetcher: F,
    parser: P,
    store: S,
    extractor: AvailabilityExtractor,
    notifiers: NotifierSet,
}

impl<F, P, S> WatchService<F, P, S>
where
    F: Fetcher,
    P: PageParser,
    S: StatusStore,
{
    /// Create a service with the default phrase rules and no channels.
    pub fn new(fetcher: F, parser: P, store: S) -> Self {
        Self {
            fetcher,
            parser,
            store,
            extractor: AvailabilityExtractor::default(),
            notifiers: NotifierSet::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: AvailabilityExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_notifiers(mut self, notifiers: NotifierSet) -> Self {
        self.notifiers = notifiers;
        self
    }

    /// Run one check of `url`.
    ///
    /// Only a fetch failure returns `Err`; in that case nothing is written.
    /// Every other fault is absorbed (unknown status, skipped channel,
    /// reported write failure) so the run always reaches a decision.
    pub async fn check<R: WatchReporter>(
        &self,
        url: &str,
        reporter: &R,
    ) -> Result<WatchReport, AppError> {
        // Fetch
        reporter.report(WatchEvent::Fetching { url });
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                reporter.report(WatchEvent::FetchFailed { error: &e });
                reporter.report(WatchEvent::Done {
                    outcome: RunOutcome::FetchFailed,
                });
                return Err(e);
            }
        };
        reporter.report(WatchEvent::Fetched { bytes: html.len() });

        // Extract
        let page = self.parser.parse(&html).unwrap_or_else(|e| {
            reporter.report(WatchEvent::ParseFailed { error: &e });
            PageContent::default()
        });
        let assessment = self.extractor.assess(&page);
        reporter.report(WatchEvent::Assessed {
            assessment: &assessment,
        });

        // Evaluate
        let previous = self.load_previous(url, reporter).await;
        let notify = should_notify(previous.as_ref(), assessment.availability);
        reporter.report(WatchEvent::Evaluated {
            previous: previous.as_ref().map(|r| r.status),
            current: assessment.availability,
            notify,
        });

        // Notify
        let dispatch = if !notify {
            None
        } else if self.notifiers.is_empty() {
            reporter.report(WatchEvent::NoChannels);
            None
        } else {
            let alert = Alert::new(url, &assessment);
            let summary = self.notifiers.dispatch(&alert).await;
            reporter.report(WatchEvent::Dispatched { summary: &summary });
            Some(summary)
        };

        // Persist
        let record = StatusRecord::new(url, assessment.availability);
        let persist_error = match self.store.save(&record).await {
            Ok(()) => {
                reporter.report(WatchEvent::Persisted { record: &record });
                None
            }
            Err(e) => {
                reporter.report(WatchEvent::PersistFailed { error: &e });
                Some(e.to_string())
            }
        };

        let report = WatchReport {
            assessment,
            previous,
            notified: notify,
            dispatch,
            record,
            persist_error,
        };
        reporter.report(WatchEvent::Done {
            outcome: report.outcome(),
        });
        Ok(report)
    }

    async fn load_previous<R: WatchReporter>(
        &self,
        url: &str,
        reporter: &R,
    ) -> Option<StatusRecord> {
        match self.store.load().await {
            Ok(Some(record)) if record.is_for(url) => Some(record),
            Ok(Some(record)) => {
                reporter.report(WatchEvent::PreviousUnavailable {
                    reason: format!("record is for a different URL ({})", record.url),
                });
                None
            }
            Ok(None) => None,
            Err(e) => {
                reporter.report(WatchEvent::PreviousUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}
