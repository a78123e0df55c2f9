//! Periodic eviction of expired offers and presentation requests.

use std::time::Duration;

use tokio::task::JoinHandle;

use credex_core::Timestamp;

use crate::{ExchangeStore, OfferStore};

/// Entries removed by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Offers past their credential expiration date.
    pub offers: usize,
    /// Presentation requests past their retention.
    pub requests: usize,
}

/// Evict everything expired at `now` from both stores.
pub fn sweep_once(offers: &OfferStore, requests: &ExchangeStore, now: Timestamp) -> SweepReport {
    SweepReport {
        offers: offers.evict_expired(now),
        requests: requests.evict_expired(now),
    }
}

/// Sweep both stores every `period` until the runtime shuts down.
pub fn spawn_sweeper(offers: OfferStore, requests: ExchangeStore, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let report = sweep_once(&offers, &requests, Timestamp::now());
            if report == SweepReport::default() {
                tracing::trace!("eviction sweep found nothing to remove");
            } else {
                tracing::info!(
                    offers = report.offers,
                    requests = report.requests,
                    "evicted expired entries"
                );
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration as ChronoDuration;
    use credex_core::Did;
    use credex_state::MemoryRegistry;
    use credex_vc::{CredentialOffer, PresentationRequest};

    fn stores() -> (OfferStore, ExchangeStore) {
        (Arc::new(MemoryRegistry::new()), Arc::new(MemoryRegistry::new()))
    }

    fn offer(id: &str, now: Timestamp) -> CredentialOffer {
        let issuer = Did::new("did:key:uissuer").unwrap();
        CredentialOffer::new(id, &issuer, now, ChronoDuration::minutes(15), "x").unwrap()
    }

    #[test]
    fn sweep_removes_only_expired() {
        let (offers, requests) = stores();
        let now = Timestamp::parse("2024-01-01T00:00:00Z").unwrap();
        for (id, ttl) in [("old", 1), ("new", 30)] {
            offers.put(id.into(), offer(id, now), now.plus(ChronoDuration::minutes(ttl)).unwrap());
        }
        let request = PresentationRequest::sign_in("d");
        requests.put(
            request.challenge.as_str().into(),
            request,
            now.plus(ChronoDuration::minutes(1)).unwrap(),
        );

        let report = sweep_once(&offers, &requests, now.plus(ChronoDuration::minutes(5)).unwrap());
        assert_eq!(report, SweepReport { offers: 1, requests: 1 });
        assert_eq!(offers.len(), 1);
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn sweeper_runs_periodically() {
        let (offers, requests) = stores();
        let past = Timestamp::parse("2000-01-01T00:00:00Z").unwrap();
        offers.put("stale".into(), offer("stale", past), past);

        let handle = spawn_sweeper(offers.clone(), requests.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(offers.is_empty());

        handle.abort();
    }
}
