//! Supervisor behaviour against scripted connectors, on a paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainrelay_bootstrap::{
    BootstrapConfig, BootstrapError, ConnectionPhase, ConnectionSupervisor, IdentitySource,
    Secret, Shutdown,
};
use chainrelay_rpc::{Connector, JsonRpcRequest, JsonRpcResponse, RpcTransport, TransportError};
use chainrelay_types::darwinia;
use serde_json::json;
use subxt_signer::sr25519;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// ─── Fakes ────────────────────────────────────────────────────────────────────

const GOOD_METADATA: &str = "0x6d6574610c00";

struct FakeNode {
    metadata: &'static str,
}

#[async_trait]
impl RpcTransport for FakeNode {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let id = req.id.as_u64().unwrap();
        let result = match req.method.as_str() {
            "system_chain" => json!("Crab"),
            "state_getRuntimeVersion" => {
                json!({"specName": "Crab", "implName": "Crab", "specVersion": 23, "implVersion": 0})
            }
            "chain_getBlockHash" => json!(format!("0x{}", "11".repeat(32))),
            "state_getMetadata" => json!(self.metadata),
            _ => return Ok(JsonRpcResponse::failure(id, -32601, "Method not found")),
        };
        Ok(JsonRpcResponse::success(id, result))
    }

    fn url(&self) -> &str {
        "mock://crab"
    }
}

#[derive(Default)]
struct Counters {
    opens: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Refuses the first `fail_first` opens, then hands out a [`FakeNode`].
struct Flaky {
    fail_first: usize,
    metadata: &'static str,
    counters: Arc<Counters>,
}

impl Flaky {
    fn new(fail_first: usize) -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let flaky = Self {
            fail_first,
            metadata: GOOD_METADATA,
            counters: counters.clone(),
        };
        (flaky, counters)
    }
}

#[async_trait]
impl Connector for Flaky {
    async fn open(&self, url: &str) -> Result<Arc<dyn RpcTransport>, TransportError> {
        let c = &self.counters;
        let n = c.opens.fetch_add(1, Ordering::SeqCst) + 1;
        let now = c.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        c.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        c.in_flight.fetch_sub(1, Ordering::SeqCst);

        if n <= self.fail_first {
            return Err(TransportError::Connect {
                url: url.to_string(),
                reason: "connection refused".into(),
            });
        }
        Ok(Arc::new(FakeNode {
            metadata: self.metadata,
        }))
    }
}

/// Never finishes opening.
struct Stalled;

#[async_trait]
impl Connector for Stalled {
    async fn open(&self, _url: &str) -> Result<Arc<dyn RpcTransport>, TransportError> {
        std::future::pending().await
    }
}

fn supervisor<C: Connector>(config: BootstrapConfig, connector: C) -> ConnectionSupervisor<C> {
    let registry = Arc::new(darwinia::registry().unwrap());
    ConnectionSupervisor::new(config, registry, connector)
}

// ─── Retry loop ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn retries_with_fixed_delay_until_ready() {
    let (flaky, counters) = Flaky::new(3);
    let sup = supervisor(BootstrapConfig::default(), flaky);
    let handle = sup.handle();
    assert_eq!(handle.phase(), ConnectionPhase::Disconnected);

    let started = Instant::now();
    let ready = sup.run(CancellationToken::new()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(counters.opens.load(Ordering::SeqCst), 4);
    assert!(
        elapsed >= Duration::from_secs(60) && elapsed < Duration::from_secs(61),
        "three 20s delays expected, took {elapsed:?}"
    );
    assert_eq!(counters.max_in_flight.load(Ordering::SeqCst), 1);

    assert_eq!(handle.phase(), ConnectionPhase::Ready);
    assert!(Arc::ptr_eq(&handle.ready().unwrap(), &ready));
    assert_eq!(ready.client.chain(), "Crab");
}

#[tokio::test(start_paused = true)]
async fn first_attempt_success_has_no_delay() {
    let (flaky, counters) = Flaky::new(0);
    let sup = supervisor(BootstrapConfig::default(), flaky);

    let started = Instant::now();
    sup.run(CancellationToken::new()).await.unwrap();

    assert_eq!(counters.opens.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_delay_returns_shutdown() {
    let (flaky, counters) = Flaky::new(usize::MAX);
    let sup = Arc::new(supervisor(BootstrapConfig::default(), flaky));
    let handle = sup.handle();
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let sup = sup.clone();
        let cancel = cancel.clone();
        async move { sup.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(handle.phase(), ConnectionPhase::Failed);
    cancel.cancel();

    assert_eq!(task.await.unwrap().unwrap_err(), Shutdown);
    assert_eq!(counters.opens.load(Ordering::SeqCst), 2);
    assert_eq!(handle.phase(), ConnectionPhase::Disconnected);
    assert!(handle.ready().is_none());
}

#[tokio::test(start_paused = true)]
async fn wait_ready_observes_publication() {
    let (flaky, _) = Flaky::new(1);
    let sup = Arc::new(supervisor(BootstrapConfig::default(), flaky));
    let handle = sup.handle();

    let task = tokio::spawn({
        let sup = sup.clone();
        async move { sup.run(CancellationToken::new()).await }
    });

    let seen = handle.wait_ready().await.unwrap();
    let returned = task.await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&seen, &returned));
}

// ─── Single attempts ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_attempts_never_publish_ready() {
    let (mut flaky, _) = Flaky::new(0);
    flaky.metadata = "0x00000000";
    let sup = supervisor(BootstrapConfig::default(), flaky);
    let handle = sup.handle();

    for _ in 0..3 {
        let err = sup.connect_once().await.unwrap_err();
        assert!(matches!(err, BootstrapError::SchemaMismatch { .. }), "{err}");
        assert_eq!(err.phase(), ConnectionPhase::Registering);
        assert!(handle.ready().is_none());
        assert_ne!(handle.phase(), ConnectionPhase::Ready);
    }
}

#[tokio::test(start_paused = true)]
async fn unreachable_node_is_a_transport_error() {
    let (flaky, _) = Flaky::new(1);
    let sup = supervisor(BootstrapConfig::default(), flaky);

    let err = sup.connect_once().await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Transport {
            phase: ConnectionPhase::Connecting,
            ..
        }
    ));
    assert!(sup.connect_once().await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn stalled_connect_times_out() {
    let config = BootstrapConfig {
        handshake_timeout_secs: 30,
        ..Default::default()
    };
    let sup = supervisor(config, Stalled);

    let started = Instant::now();
    let err = sup.connect_once().await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Timeout {
            phase: ConnectionPhase::Connecting,
            ..
        }
    ));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
}

#[tokio::test(start_paused = true)]
async fn unexpected_spec_name_is_a_schema_mismatch() {
    let (flaky, _) = Flaky::new(0);
    let config = BootstrapConfig {
        expected_spec_name: Some("Darwinia".into()),
        ..Default::default()
    };
    let err = supervisor(config, flaky).connect_once().await.unwrap_err();
    assert!(matches!(err, BootstrapError::SchemaMismatch { .. }));
}

// ─── Identities ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn empty_keyring_uses_alice_with_bob_secondary() {
    let (flaky, _) = Flaky::new(0);
    let ready = supervisor(BootstrapConfig::default(), flaky)
        .connect_once()
        .await
        .unwrap();

    assert_eq!(ready.identity.source(), IdentitySource::DevAlice);
    assert_eq!(ready.identity.public_key(), sr25519::dev::alice().public_key().0);
    assert_eq!(ready.secondary_identity.source(), IdentitySource::DevBob);
    assert_eq!(
        ready.secondary_identity.public_key(),
        sr25519::dev::bob().public_key().0
    );
}

#[tokio::test(start_paused = true)]
async fn configured_keyring_is_primary_and_bob_stays_secondary() {
    let (flaky, _) = Flaky::new(0);
    let config = BootstrapConfig {
        keyring: Secret::new("//Charlie"),
        ..Default::default()
    };
    let ready = supervisor(config, flaky).connect_once().await.unwrap();

    assert_eq!(ready.identity.source(), IdentitySource::Keyring);
    assert_eq!(ready.identity.public_key(), sr25519::dev::charlie().public_key().0);
    assert_eq!(
        ready.secondary_identity.public_key(),
        sr25519::dev::bob().public_key().0
    );
}

#[tokio::test(start_paused = true)]
async fn malformed_keyring_fails_in_identity_phase() {
    let (flaky, _) = Flaky::new(0);
    let config = BootstrapConfig {
        keyring: Secret::new("definitely not a mnemonic"),
        ..Default::default()
    };
    let sup = supervisor(config, flaky);
    let err = sup.connect_once().await.unwrap_err();

    assert!(matches!(err, BootstrapError::Identity(_)), "{err}");
    assert_eq!(err.phase(), ConnectionPhase::DerivingIdentity);
    assert!(sup.handle().ready().is_none());
}
