//! Integration tests for the read-through and write-invalidation wrappers.
//!
//! A small in-memory backend stands in for the REST API so the tests can
//! count how many reads actually reach it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use medportal_cache::{ApiCache, CacheConfig, ManualClock, ResourceClass, ResourceTtls, cache_key};
use serde_json::{Value, json};

#[derive(Debug, PartialEq, Eq)]
struct BackendError(&'static str);

#[derive(Default)]
struct FakeBackend {
    reads: AtomicUsize,
    medicines: std::sync::Mutex<Vec<Value>>,
}

impl FakeBackend {
    async fn list_medicines(&self) -> Result<Value, BackendError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Value::Array(self.medicines.lock().unwrap().clone()))
    }

    async fn add_medicine(&self, medicine: Value) -> Result<Value, BackendError> {
        self.medicines.lock().unwrap().push(medicine.clone());
        Ok(medicine)
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Service wrapper in the shape the portal uses: reads go through the cache,
/// writes invalidate the resource's endpoint once they succeed.
struct MedicineService {
    cache: Arc<ApiCache>,
    backend: Arc<FakeBackend>,
    ttls: ResourceTtls,
}

impl MedicineService {
    async fn list(&self, params: Option<&Value>) -> Result<Arc<Value>, BackendError> {
        let class = ResourceClass::Medicines;
        let key = cache_key(class.endpoint(), params);
        self.cache
            .get_or_fetch(&key, Some(self.ttls.ttl_for(class)), || {
                self.backend.list_medicines()
            })
            .await
    }

    async fn create(&self, medicine: Value) -> Result<Value, BackendError> {
        self.cache
            .invalidate_after(
                ResourceClass::Medicines.endpoint(),
                self.backend.add_medicine(medicine),
            )
            .await
    }
}

fn service() -> (MedicineService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = ApiCache::from_config(&CacheConfig::default()).with_clock(clock.clone());
    let service = MedicineService {
        cache: Arc::new(cache),
        backend: Arc::new(FakeBackend::default()),
        ttls: ResourceTtls::default(),
    };
    (service, clock)
}

#[tokio::test]
async fn repeated_reads_hit_the_backend_once() {
    let (service, _) = service();

    let first = service.list(None).await.unwrap();
    let second = service.list(None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(service.backend.reads(), 1);
    assert_eq!(service.cache.stats().hits, 1);
}

#[tokio::test]
async fn reads_refetch_after_resource_ttl() {
    let (service, clock) = service();

    service.list(None).await.unwrap();
    clock.advance(Duration::from_secs(120));
    service.list(None).await.unwrap();
    assert_eq!(service.backend.reads(), 1);

    clock.advance(Duration::from_millis(1));
    service.list(None).await.unwrap();
    assert_eq!(service.backend.reads(), 2);
}

#[tokio::test]
async fn write_invalidates_every_variant_of_the_endpoint() {
    let (service, _) = service();

    service.list(None).await.unwrap();
    service.list(Some(&json!({"search": "amox"}))).await.unwrap();
    service.cache.set("/staff", json!([]), None);
    assert_eq!(service.backend.reads(), 2);
    assert_eq!(service.cache.len(), 3);

    service.create(json!({"name": "Amoxicillin"})).await.unwrap();
    assert_eq!(service.cache.len(), 1, "only the unrelated /staff entry remains");

    let list = service.list(None).await.unwrap();
    assert_eq!(*list, json!([{"name": "Amoxicillin"}]));
    assert_eq!(service.backend.reads(), 3);
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let cache = ApiCache::default();
    let calls = AtomicUsize::new(0);

    let result = cache
        .get_or_fetch("/bills", None, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<Value, _>(BackendError("502"))
        })
        .await;
    assert_eq!(result, Err(BackendError("502")));
    assert!(cache.is_empty());

    let result = cache
        .get_or_fetch("/bills", None, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BackendError>(json!([{"id": "b-1"}]))
        })
        .await
        .unwrap();
    assert_eq!(*result, json!([{"id": "b-1"}]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_write_keeps_cache_intact() {
    let cache = ApiCache::default();
    cache.set("/appointments", json!([]), None);

    let result = cache
        .invalidate_after("/appointments", async { Err::<(), _>(BackendError("409")) })
        .await;

    assert_eq!(result, Err(BackendError("409")));
    assert!(cache.has("/appointments"));
}

#[tokio::test]
async fn disabled_cache_always_fetches() {
    let cache = ApiCache::disabled();
    let calls = AtomicUsize::new(0);

    for _ in 0..3 {
        cache
            .get_or_fetch("/staff", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, BackendError>(json!([]))
            })
            .await
            .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(cache.is_empty());
}

#[test]
fn shared_across_threads() {
    let cache = Arc::new(ApiCache::default());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for j in 0..50 {
                    let key = cache_key("/patients", Some(&json!({"page": j, "worker": i})));
                    cache.set(key.clone(), json!(j), None);
                    assert_eq!(cache.get(&key).as_deref(), Some(&json!(j)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 400);
    assert_eq!(cache.invalidate(Some("/patients")), 400);
}
