//! Current/previous snapshot pair and derived rates.

use std::sync::Arc;
use std::time::Instant;

use crate::types::{Counter, NodeInfo, Proxy, Service, ServiceId};

/// One complete capture of `show info` + `show stat`. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: Instant,
    pub node: NodeInfo,
    pub proxies: Vec<Proxy>,
}

impl Snapshot {
    pub fn new(node: NodeInfo, proxies: Vec<Proxy>, captured_at: Instant) -> Self {
        Self {
            captured_at,
            node,
            proxies,
        }
    }

    /// All services, proxy by proxy, in feed order.
    pub fn services(&self) -> impl Iterator<Item = &Service> + '_ {
        self.proxies.iter().flat_map(|p| p.services.iter())
    }

    pub fn service_count(&self) -> usize {
        self.proxies.iter().map(|p| p.services.len()).sum()
    }

    pub fn find(&self, id: &ServiceId) -> Option<&Service> {
        self.proxies
            .iter()
            .find(|p| p.name == id.proxy)
            .and_then(|p| p.service(&id.service))
    }

    pub fn position(&self, id: &ServiceId) -> Option<usize> {
        self.services()
            .position(|s| s.proxy == id.proxy && s.name == id.service)
    }

    pub fn nth(&self, index: usize) -> Option<&Service> {
        self.services().nth(index)
    }
}

/// Owns the snapshot pair. Replacing a snapshot is a single `Arc` swap, so
/// readers see either the old pair or the new pair, never a mix.
#[derive(Debug, Default)]
pub struct Store {
    current: Option<Arc<Snapshot>>,
    previous: Option<Arc<Snapshot>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, node: NodeInfo, proxies: Vec<Proxy>) {
        self.update_at(node, proxies, Instant::now());
    }

    pub fn update_at(&mut self, node: NodeInfo, proxies: Vec<Proxy>, at: Instant) {
        let next = Arc::new(Snapshot::new(node, proxies, at));
        self.previous = self.current.replace(next);
    }

    pub fn current(&self) -> Option<&Arc<Snapshot>> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Arc<Snapshot>> {
        self.previous.as_ref()
    }

    /// Increase of `counter` per second between the two snapshots.
    ///
    /// Zero when either snapshot lacks the identity, when the interval is
    /// not positive, or when the counter went backwards (peer restart: the
    /// current value becomes the new baseline).
    pub fn rate_of(&self, counter: Counter, id: &ServiceId) -> f64 {
        let (Some(cur), Some(prev)) = (&self.current, &self.previous) else {
            return 0.0;
        };
        let (Some(now), Some(before)) = (cur.find(id), prev.find(id)) else {
            return 0.0;
        };
        let dt = cur
            .captured_at
            .checked_duration_since(prev.captured_at)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if dt <= 0.0 {
            return 0.0;
        }
        let delta = now.counter(counter).saturating_sub(before.counter(counter));
        delta as f64 / dt
    }

    /// True when the service exists in both snapshots with a different status.
    pub fn status_changed(&self, id: &ServiceId) -> bool {
        let (Some(cur), Some(prev)) = (&self.current, &self.previous) else {
            return false;
        };
        match (cur.find(id), prev.find(id)) {
            (Some(a), Some(b)) => a.status != b.status,
            _ => false,
        }
    }
}
