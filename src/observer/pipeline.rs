// Observer pipeline: runs registered observers ring by ring for one write

use std::collections::BTreeMap;
use std::time::Instant;

use tokio::time::timeout;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, ObserverRing};

pub struct ObserverPipeline {
    // Observer registry by ring, kept sorted by priority
    observers: BTreeMap<ObserverRing, Vec<Box<dyn Observer>>>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self { observers: BTreeMap::new() }
    }

    /// Pipeline with every record observer registered
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        crate::observer::implementations::register_all_observers(&mut pipeline);
        pipeline
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) {
        let ring = observer.ring();
        let name = observer.name();
        let observers = self.observers.entry(ring).or_default();
        observers.push(observer);
        observers.sort_by_key(|o| o.priority());

        tracing::debug!("Registered observer '{}' for ring {:?}", name, ring);
    }

    pub fn observer_names(&self, ring: ObserverRing) -> Vec<&'static str> {
        self.observers
            .get(&ring)
            .map(|observers| observers.iter().map(|o| o.name()).collect())
            .unwrap_or_default()
    }

    /// Run every applicable observer. The first failure in a synchronous ring aborts
    /// the write; failures in the audit ring are logged and swallowed.
    pub async fn execute(&self, mut ctx: ObserverContext) -> Result<ObserverContext, ObserverError> {
        tracing::debug!(
            "Observer pipeline starting: operation={:?}, collection={}, id={}",
            ctx.operation,
            ctx.collection,
            ctx.id
        );

        for &ring in ObserverRing::ORDERED {
            ctx.current_ring = Some(ring);
            if ring.is_synchronous() {
                self.execute_ring(ring, &mut ctx).await?;
            } else if let Err(error) = self.execute_ring(ring, &mut ctx).await {
                tracing::error!(
                    "Ring {:?} failed after {} {} was committed: {}",
                    ring,
                    ctx.collection,
                    ctx.id,
                    error
                );
            }
        }

        tracing::debug!(
            "Observer pipeline finished: collection={}, id={} in {:?}",
            ctx.collection,
            ctx.id,
            ctx.execution_time()
        );
        Ok(ctx)
    }

    async fn execute_ring(&self, ring: ObserverRing, ctx: &mut ObserverContext) -> Result<(), ObserverError> {
        let Some(observers) = self.observers.get(&ring) else {
            return Ok(());
        };

        for observer in observers {
            if !observer.applies_to_operation(ctx.operation) || !observer.applies_to_collection(ctx.collection) {
                tracing::trace!("Observer {} skipped for {:?} {}", observer.name(), ctx.operation, ctx.collection);
                continue;
            }

            let observer_start = Instant::now();
            match timeout(observer.timeout(), observer.execute(ctx)).await {
                Ok(Ok(())) => {
                    tracing::debug!("Observer: {} completed in {:?}", observer.name(), observer_start.elapsed());
                }
                Ok(Err(error)) => {
                    tracing::warn!("Observer: {} rejected {} {}: {}", observer.name(), ctx.collection, ctx.id, error);
                    return Err(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    return Err(ObserverError::Timeout(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessScope;
    use crate::database::MemoryStore;
    use crate::types::{Collection, Operation};
    use async_trait::async_trait;
    use serde_json::Map;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    struct Recorder {
        name: &'static str,
        ring: ObserverRing,
        priority: u8,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Observer for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }
        fn ring(&self) -> ObserverRing {
            self.ring
        }
        fn priority(&self) -> u8 {
            self.priority
        }
        async fn execute(&self, _ctx: &mut ObserverContext) -> Result<(), ObserverError> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(ObserverError::validation(self.name));
            }
            Ok(())
        }
    }

    fn ctx() -> ObserverContext {
        ObserverContext::new(
            Operation::Create,
            Collection::Histories,
            Arc::new(MemoryStore::new()),
            Uuid::new_v4(),
            Map::new(),
            AccessScope::Unrestricted,
            None,
        )
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, ring: ObserverRing, priority: u8, fail: bool) -> Box<dyn Observer> {
        Box::new(Recorder { name, ring, priority, fail, log: log.clone() })
    }

    #[tokio::test]
    async fn runs_rings_in_order_and_priority_within_ring() {
        let log = Arc::new(Mutex::new(vec![]));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(recorder(&log, "audit", ObserverRing::Audit, 50, false));
        pipeline.register_observer(recorder(&log, "late", ObserverRing::Enrichment, 90, false));
        pipeline.register_observer(recorder(&log, "early", ObserverRing::Enrichment, 10, false));
        pipeline.register_observer(recorder(&log, "prepare", ObserverRing::DataPreparation, 50, false));

        pipeline.execute(ctx()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["prepare", "early", "late", "audit"]);
    }

    #[tokio::test]
    async fn synchronous_failure_stops_later_rings() {
        let log = Arc::new(Mutex::new(vec![]));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(recorder(&log, "business", ObserverRing::Business, 50, true));
        pipeline.register_observer(recorder(&log, "persist", ObserverRing::Database, 50, false));

        assert!(pipeline.execute(ctx()).await.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["business"]);
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_the_write() {
        let log = Arc::new(Mutex::new(vec![]));
        let mut pipeline = ObserverPipeline::new();
        pipeline.register_observer(recorder(&log, "persist", ObserverRing::Database, 50, false));
        pipeline.register_observer(recorder(&log, "audit", ObserverRing::Audit, 50, true));

        assert!(pipeline.execute(ctx()).await.is_ok());
        assert_eq!(*log.lock().unwrap(), vec!["persist", "audit"]);
    }
}
