use crate::models::Alert;
use crate::traits::Notifier;

/// Outcome of one dispatch across all channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Channels that accepted the alert.
    pub delivered: Vec<String>,
    /// (channel, error message) for channels that failed.
    pub failed: Vec<(String, String)>,
}

impl DispatchSummary {
    pub fn all_failed(&self) -> bool {
        self.delivered.is_empty() && !self.failed.is_empty()
    }
}

/// Independently configured notification channels.
///
/// Every channel is attempted; one failing does not stop the rest.
#[derive(Default)]
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.push(notifier);
        self
    }

    pub fn push(&mut self, notifier: impl Notifier + 'static) {
        self.notifiers.push(Box::new(notifier));
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn channels(&self) -> Vec<&str> {
        self.notifiers.iter().map(|n| n.channel()).collect()
    }

    pub async fn dispatch(&self, alert: &Alert) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for notifier in &self.notifiers {
            let channel = notifier.channel().to_string();
            match notifier.notify(alert).await {
                Ok(()) => {
                    tracing::info!(%channel, "Notification sent");
                    summary.delivered.push(channel);
                }
                Err(e) => {
                    tracing::warn!(%channel, error = %e, "Notification failed");
                    summary.failed.push((channel, e.to_string()));
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for NotifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierSet")
            .field("channels", &self.channels())
            .finish()
    }
}
