//! Curator (§4.8): drains the shared investigator queue and fans every
//! malicious-activity report out to every shipper, with backpressure.

use warden_queue::{Receiver, Sender};
use warden_shipper::ShipperEntry;

use crate::entry::InvestigatorEntry;

pub struct Curator {
    receiver: Receiver<InvestigatorEntry>,
    shippers: Vec<(String, Sender<ShipperEntry>)>,
}

impl Curator {
    pub fn new(receiver: Receiver<InvestigatorEntry>, shippers: Vec<(String, Sender<ShipperEntry>)>) -> Self {
        Self { receiver, shippers }
    }

    /// Runs until every one of `investigator_count` investigators has sent
    /// its shutdown entry, then drains whatever is left in the queue and
    /// blips each shipper so it can exit its own drain loop.
    pub async fn run(mut self, investigator_count: usize) {
        let mut remaining = investigator_count;
        while remaining > 0 {
            match self.receiver.recv().await {
                Some(InvestigatorEntry::MaliciousActivity {
                    investigation,
                    anomalies,
                }) => {
                    self.ship(investigation, anomalies).await;
                }
                Some(InvestigatorEntry::Shutdown { profile }) => {
                    tracing::info!(profile, "investigator shut down");
                    remaining = remaining.saturating_sub(1);
                }
                None => break,
            }
        }

        while let Some(entry) = self.receiver.try_recv() {
            if let InvestigatorEntry::MaliciousActivity {
                investigation,
                anomalies,
            } = entry
            {
                self.ship(investigation, anomalies).await;
            }
        }

        for (name, sender) in &self.shippers {
            if sender.send(ShipperEntry::Blip).await.is_err() {
                tracing::warn!(shipper = name, "shipper queue already closed");
            }
        }
    }

    async fn ship(
        &self,
        investigation: warden_store::models::Investigation,
        anomalies: Vec<warden_store::models::AnomalyEventRow>,
    ) {
        for (name, sender) in &self.shippers {
            let result = sender
                .send_with_backoff(ShipperEntry::Report {
                    investigation: investigation.clone(),
                    anomalies: anomalies.clone(),
                })
                .await;
            if let Err(error) = result {
                tracing::warn!(shipper = name, error = %error, "failed to hand report to shipper");
            }
        }
    }
}
