use tokio::sync::watch;

use warden_queue::Receiver;

use crate::entry::ShipperEntry;
use crate::shipper::Shipper;

/// Drives one shipper: ships every `Report` that arrives, and on shutdown
/// drains whatever is still queued before exiting, mirroring the original's
/// `Shipper.run`'s `while not queue.empty(): self._pull_entry()` tail (the
/// curator cascades a final `Blip` after it flips the shutdown flag, so a
/// shipper blocked on an empty queue always wakes up to check it).
pub async fn run_shipper(
    mut shipper: Box<dyn Shipper>,
    mut receiver: Receiver<ShipperEntry>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = shipper.name().to_string();
    loop {
        tokio::select! {
            entry = receiver.recv() => {
                match entry {
                    Some(entry) => dispatch(&name, &mut *shipper, entry).await,
                    None => break,
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    while let Some(entry) = receiver.try_recv() {
        dispatch(&name, &mut *shipper, entry).await;
    }
}

async fn dispatch(name: &str, shipper: &mut dyn Shipper, entry: ShipperEntry) {
    let (investigation, anomalies) = match entry {
        ShipperEntry::Report {
            investigation,
            anomalies,
        } => (investigation, anomalies),
        ShipperEntry::Blip => return,
    };

    if let Err(err) = shipper.ship(&investigation, &anomalies).await {
        tracing::warn!(shipper = name, error = %err, "shipper failed to ship report");
    }
}
