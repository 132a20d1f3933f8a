//! Top-level orchestration for the investigation process (§5): one
//! investigator task per configured profile, a curator fanning their output
//! to every configured shipper.

use sqlx::PgPool;
use tokio::sync::watch;

use warden_core::config::Config;
use warden_queue::bounded;
use warden_shipper::{build_shipper, run_shipper, ShipperEntry};
use warden_store::ProfileStore;

use crate::curator::Curator;
use crate::entry::InvestigatorEntry;
use crate::error::InvestigateError;
use crate::investigator::Investigator;
use crate::registry::{build_analyzer, build_collector};

/// Default size of the queue shared by every investigator feeding the
/// curator (§4.8).
const CURATOR_QUEUE_SIZE: usize = 10;

pub async fn start(
    pool: PgPool,
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Result<(), InvestigateError> {
    let (curator_sender, curator_receiver) = bounded::<InvestigatorEntry>(CURATOR_QUEUE_SIZE);

    let mut handles = Vec::new();
    let mut investigator_count = 0;
    for (name, entry) in &config.profiles {
        let profile = ProfileStore::get_or_create(&pool, name).await?;
        let collector = build_collector(entry.collector.as_ref())?;
        let analyzer = build_analyzer(entry.analyzer.as_ref())?;

        let investigator = Investigator::new(
            pool.clone(),
            profile.id,
            name.clone(),
            collector,
            analyzer,
            curator_sender.clone(),
        );
        investigator_count += 1;
        handles.push(tokio::spawn(investigator.run(shutdown.clone())));
    }
    drop(curator_sender);

    let mut shipper_senders = Vec::new();
    for (name, raw) in &config.shippers {
        let shipper = build_shipper(name, raw)?;
        let capacity = raw.limit.unwrap_or(10);
        let (sender, receiver) = bounded::<ShipperEntry>(capacity);
        shipper_senders.push((name.clone(), sender));
        handles.push(tokio::spawn(run_shipper(shipper, receiver, shutdown.clone())));
    }

    let curator = Curator::new(curator_receiver, shipper_senders);
    curator.run(investigator_count).await;

    for handle in handles {
        let _ = handle.await;
    }
    Ok(())
}
