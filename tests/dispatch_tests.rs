//! Dispatcher Property Tests
//!
//! Every dispatched operation resolves exactly once, success or failure,
//! under a native core mocked to succeed, fail, hang past the timeout, or be
//! torn down mid-flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use analytics_client::{
    AnalyticsClient, AnalyticsClientBuilder, ClientError, Command, DispatchOptions,
    ManagementOperation, NativeError, NativeTransport, OperationArgs,
};

enum Behavior {
    Succeed(Value),
    Fail(NativeError),
    Hang,
    Delay(Duration, Value),
}

struct MockCore {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockCore {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NativeTransport for MockCore {
    async fn execute(&self, _command: Command) -> Result<Value, NativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed(value) => Ok(value.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Hang => std::future::pending().await,
            Behavior::Delay(duration, value) => {
                tokio::time::sleep(*duration).await;
                Ok(value.clone())
            }
        }
    }
}

fn client_over(core: Arc<MockCore>) -> AnalyticsClient {
    AnalyticsClientBuilder::new(core)
        .management_timeout(Duration::from_millis(200))
        .build()
}

fn create_dataverse_args() -> OperationArgs {
    OperationArgs::new().with("dataverse_name", "sales")
}

#[tokio::test]
async fn successful_dispatch_resolves_once_with_the_payload() {
    let core = MockCore::new(Behavior::Succeed(json!({"ok": true})));
    let client = client_over(Arc::clone(&core));

    let handle = client
        .dispatch(
            ManagementOperation::CreateDataverse,
            &create_dataverse_args(),
            DispatchOptions::default(),
        )
        .unwrap();

    let payload = tokio_test::assert_ok!(handle.await);
    assert_eq!(payload, json!({"ok": true}));
    assert_eq!(core.calls(), 1);
}

#[tokio::test]
async fn native_failure_passes_through_code_and_message() {
    let core = MockCore::new(Behavior::Fail(NativeError::new(24040, "dataset not found")));
    let client = client_over(Arc::clone(&core));

    let handle = client
        .dispatch(
            ManagementOperation::DropDataset,
            &OperationArgs::new().with("dataset_name", "reviews"),
            DispatchOptions::default(),
        )
        .unwrap();

    match handle.await.unwrap_err() {
        ClientError::Native(native) => {
            assert_eq!(native.code, 24040);
            assert_eq!(native.message, "dataset not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(core.calls(), 1);
}

#[tokio::test]
async fn withheld_completion_times_out_exactly_once() {
    let core = MockCore::new(Behavior::Hang);
    let client = client_over(Arc::clone(&core));

    let timeout = Duration::from_millis(50);
    let handle = client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions {
                timeout: Some(timeout),
            },
        )
        .unwrap();

    assert_eq!(handle.await.unwrap_err(), ClientError::Timeout(timeout));
    assert_eq!(core.calls(), 1);
}

#[tokio::test]
async fn unknown_sentinel_never_reaches_the_native_core() {
    let core = MockCore::new(Behavior::Succeed(json!({})));
    let client = client_over(Arc::clone(&core));

    let err = client
        .dispatch(
            ManagementOperation::Unknown,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(core.calls(), 0);
}

#[tokio::test]
async fn missing_required_field_fails_synchronously() {
    let core = MockCore::new(Behavior::Succeed(json!({})));
    let client = client_over(Arc::clone(&core));

    let err = client
        .dispatch(
            ManagementOperation::CreateDataset,
            &OperationArgs::new().with("bucket_name", "beer-sample"),
            DispatchOptions::default(),
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Validation error: create_dataset requires field 'dataset_name'"
    );
    assert_eq!(core.calls(), 0);
}

#[tokio::test]
async fn dispatch_on_a_closed_connection_is_rejected_synchronously() {
    let core = MockCore::new(Behavior::Succeed(json!({})));
    let client = client_over(Arc::clone(&core));

    client.connection().close();
    assert!(!client.connection().is_open());

    let err = client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap_err();

    assert_eq!(err, ClientError::ConnectionClosed);
    assert_eq!(core.calls(), 0);
}

#[tokio::test]
async fn teardown_resolves_every_in_flight_operation() {
    let core = MockCore::new(Behavior::Hang);
    let client = client_over(Arc::clone(&core));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            client
                .dispatch(
                    ManagementOperation::GetAllIndexes,
                    &OperationArgs::new(),
                    DispatchOptions::default(),
                )
                .unwrap()
        })
        .collect();

    // Let all three reach the native core before tearing down.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(core.calls(), 3);
    client.connection().close();

    for handle in handles {
        let resolved = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("operation left pending after teardown");
        assert_eq!(resolved.unwrap_err(), ClientError::ConnectionClosed);
    }
}

#[tokio::test]
async fn closing_twice_is_idempotent() {
    let core = MockCore::new(Behavior::Succeed(json!({})));
    let client = client_over(core);

    client.connection().close();
    client.connection().close();
    assert!(!client.connection().is_open());
}

#[tokio::test]
async fn concurrent_dispatches_resolve_independently() {
    let slow = MockCore::new(Behavior::Delay(Duration::from_millis(40), json!("slow")));
    let fast = MockCore::new(Behavior::Succeed(json!("fast")));

    let slow_client = client_over(slow);
    let fast_client = client_over(fast);

    let slow_handle = slow_client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap();
    let fast_handle = fast_client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap();

    let (slow_result, fast_result) = tokio::join!(slow_handle, fast_handle);
    assert_eq!(slow_result.unwrap(), json!("slow"));
    assert_eq!(fast_result.unwrap(), json!("fast"));
}

#[tokio::test]
async fn handles_carry_distinct_operation_ids() {
    let core = MockCore::new(Behavior::Succeed(json!({})));
    let client = client_over(core);

    let a = client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap();
    let b = client
        .dispatch(
            ManagementOperation::GetAllDatasets,
            &OperationArgs::new(),
            DispatchOptions::default(),
        )
        .unwrap();

    assert_ne!(a.id(), b.id());
    tokio_test::assert_ok!(a.await);
    tokio_test::assert_ok!(b.await);
}
