use std::time::Instant;

use tokio::sync::Mutex;
use ulid::Ulid;

use crate::config::Config;
use crate::engine::{Engine, EngineError};
use crate::model::*;
use crate::observability::{self, OPERATIONS_TOTAL, OPERATION_DURATION_SECONDS};
use crate::pricing::{Charges, Tariff};

/// Hosts one `Engine` for concurrent callers.
///
/// Zones, queues, requests and the operation log are guarded by a single
/// mutex, so each call observes and leaves the engine between operations.
pub struct ParkingService {
    engine: Mutex<Engine>,
    /// Copy of the engine's tariff for lock-free price previews.
    tariff: Tariff,
}

impl ParkingService {
    pub fn new(engine: Engine) -> Self {
        observability::publish_availability(&engine);
        let tariff = engine.tariff();
        Self {
            engine: Mutex::new(engine),
            tariff,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(Engine::from_config(config))
    }

    /// Run one mutating operation under the lock and record its outcome.
    async fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Engine) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let start = Instant::now();
        let mut engine = self.engine.lock().await;
        let result = f(&mut *engine);
        if result.is_ok() {
            observability::publish_availability(&engine);
        }
        drop(engine);

        let status = match &result {
            Ok(_) => "ok",
            Err(e) => e.label(),
        };
        metrics::counter!(OPERATIONS_TOTAL, "op" => op, "status" => status).increment(1);
        metrics::histogram!(OPERATION_DURATION_SECONDS, "op" => op)
            .record(start.elapsed().as_secs_f64());
        result
    }

    pub async fn allocate(
        &self,
        zone_id: &str,
        plate: &str,
        duration_hours: u32,
    ) -> Result<Request, EngineError> {
        self.mutate("allocate", |e| e.allocate(zone_id, plate, duration_hours))
            .await
    }

    pub async fn release(&self, id: Ulid) -> Result<Request, EngineError> {
        self.mutate("release", |e| e.release(id)).await
    }

    pub async fn cancel(&self, id: Ulid) -> Result<Request, EngineError> {
        self.mutate("cancel", |e| e.cancel(id)).await
    }

    pub async fn occupy(&self, id: Ulid) -> Result<Request, EngineError> {
        self.mutate("occupy", |e| e.occupy(id)).await
    }

    pub async fn rollback(&self, count: usize) -> Result<usize, EngineError> {
        self.mutate("rollback", |e| e.rollback(count)).await
    }

    pub fn compute_charges(&self, duration_hours: u32) -> Charges {
        self.tariff.compute_charges(duration_hours)
    }

    pub async fn snapshot(&self) -> Analytics {
        self.engine.lock().await.snapshot()
    }

    pub async fn list_zones(&self) -> Vec<Zone> {
        self.engine.lock().await.list_zones().to_vec()
    }

    pub async fn list_active_requests(&self) -> Vec<Request> {
        self.engine.lock().await.list_active_requests()
    }

    pub async fn list_history_requests(&self) -> Vec<Request> {
        self.engine.lock().await.list_history_requests()
    }

    pub async fn get_request(&self, id: Ulid) -> Option<Request> {
        self.engine.lock().await.get_request(&id).cloned()
    }

    pub async fn operations(&self) -> Vec<Operation> {
        self.engine.lock().await.operations().to_vec()
    }

    /// Zones, requests and analytics under one lock acquisition.
    pub async fn view(&self) -> SystemView {
        let engine = self.engine.lock().await;
        SystemView {
            zones: engine.list_zones().to_vec(),
            active: engine.list_active_requests(),
            history: engine.list_history_requests(),
            analytics: engine.snapshot(),
        }
    }

    pub async fn verify_invariants(&self) -> Result<(), EngineError> {
        self.engine.lock().await.verify_invariants()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn service() -> ParkingService {
        ParkingService::from_config(&Config::default())
    }

    #[tokio::test]
    async fn allocate_then_view() {
        let svc = service();
        let request = assert_ok!(svc.allocate("zone-1", "ab 12", 2).await);
        assert_eq!(request.plate, "AB12");

        let view = svc.view().await;
        assert_eq!(view.active.len(), 1);
        assert!(view.history.is_empty());
        assert_eq!(view.analytics.available_slots, 99);
        assert_eq!(view.zones[0].available_slots, 19);
    }

    #[tokio::test]
    async fn release_moves_request_to_history() {
        let svc = service();
        let request = assert_ok!(svc.allocate("zone-2", "XY99", 1).await);
        assert_ok!(svc.release(request.id).await);
        assert_err!(svc.release(request.id).await);

        assert!(svc.list_active_requests().await.is_empty());
        let history = svc.list_history_requests().await;
        assert_eq!(history[0].status, RequestStatus::Released);
        assert_eq!(svc.snapshot().await.total_revenue, 7.0);
    }

    #[tokio::test]
    async fn rollback_through_service() {
        let svc = service();
        let request = assert_ok!(svc.allocate("zone-1", "AB12", 1).await);
        assert_eq!(svc.operations().await.len(), 1);
        assert_eq!(assert_ok!(svc.rollback(1).await), 1);
        assert!(svc.get_request(request.id).await.is_none());
        assert!(svc.operations().await.is_empty());
    }

    #[tokio::test]
    async fn quote_needs_no_lock() {
        let svc = service();
        let _guard = svc.engine.lock().await;
        assert_eq!(svc.compute_charges(3).total, 17.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_conserve_slots() {
        let svc = Arc::new(service());
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let zone = format!("zone-{}", i % 5 + 1);
                for _ in 0..20 {
                    if let Ok(r) = svc.allocate(&zone, "LOAD1", 1).await {
                        if i % 2 == 0 {
                            svc.release(r.id).await.unwrap();
                        } else {
                            svc.cancel(r.id).await.unwrap();
                        }
                    }
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_ok!(svc.verify_invariants().await);
        let stats = svc.snapshot().await;
        assert_eq!(stats.available_slots, 100);
        assert_eq!(stats.active_requests, 0);
        assert_eq!(stats.completed_sessions + stats.cancelled_sessions, 640);
        assert_eq!(svc.operations().await.len(), 1280);
    }

    #[tokio::test]
    async fn exhaustion_reported_as_error() {
        let svc = ParkingService::new(Engine::new(
            crate::engine::initialize(&["Solo"], 1, 1),
            Tariff::default(),
        ));
        assert_ok!(svc.allocate("zone-1", "AB12", 1).await);
        let err = assert_err!(svc.allocate("zone-1", "AB13", 1).await);
        assert_eq!(err, EngineError::NoSlotAvailable);
    }
}
