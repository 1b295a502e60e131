//! Integration tests for the client proxy against an in-process dispatcher.
//!
//! These tests drive the full protocol path (proxy, envelope, dispatcher,
//! registry, interpreter) without a network hop. A counting transport
//! records how many round trips each scenario costs.

use async_trait::async_trait;
use microrpc::{
    BoundCall, DispatchRegistry, Dispatcher, Failure, Function, Kwargs, RemoteProxy, Request,
    Response, Signature, Transport, Unit, UnitCatalog,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Transport that forwards to a dispatcher and counts round trips.
struct CountingTransport {
    dispatcher: Dispatcher,
    round_trips: AtomicUsize,
}

impl CountingTransport {
    fn count(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn round_trip(&self, request: &Request) -> microrpc::Result<Response> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
        // Go through the byte-level path like a real server would.
        let body = serde_json::to_vec(request)?;
        Ok(self.dispatcher.handle_bytes(&body).await)
    }
}

fn add(a: i64, b: i64) -> i64 {
    a + b
}

fn catalog() -> UnitCatalog {
    UnitCatalog::new().with("ns", || {
        Unit::new("ns")
            .with_doc("Test namespace.")
            .function(
                Function::new("add", Signature::positional(&["a", "b"]), |args| {
                    Ok(json!(add(args.i64("a")?, args.i64("b")?)))
                })
                .with_doc("Return a + b."),
            )
            .function(Function::new(
                "greet",
                Signature::new()
                    .param("name")
                    .param_with_default("greeting", "Hello"),
                |args| Ok(json!(format!("{}, {}!", args.str("greeting")?, args.str("name")?))),
            ))
            .function(Function::new("lookup", Signature::positional(&["key"]), |args| {
                Err(Failure::new("KeyError", format!("'{}'", args.str("key")?)))
            }))
            .function(
                Function::new("old_add", Signature::positional(&["a", "b"]), |args| {
                    Ok(json!(add(args.i64("a")?, args.i64("b")?)))
                })
                .deprecated("old_add is deprecated, use add"),
            )
            .constant("LIMIT", 10)
    })
}

struct Harness {
    registry: Arc<DispatchRegistry>,
    transport: Arc<CountingTransport>,
}

impl Harness {
    fn new() -> Self {
        let registry = Arc::new(DispatchRegistry::new(catalog()));
        registry.register("ns").unwrap();
        let transport = Arc::new(CountingTransport {
            dispatcher: Dispatcher::new(registry.clone()),
            round_trips: AtomicUsize::new(0),
        });
        Self {
            registry,
            transport,
        }
    }

    fn proxy(&self, namespace: &str) -> RemoteProxy {
        RemoteProxy::with_transport(namespace, "http://localhost", 8000, self.transport.clone())
    }
}

fn kwargs(pairs: &[(&str, Value)]) -> Kwargs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn test_add_returns_same_as_local_call() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    for (a, b) in [(2, 3), (-7, 7), (1 << 40, 1)] {
        let value = ns.call("add", vec![json!(a), json!(b)], Kwargs::new()).await.unwrap();
        assert_eq!(value, json!(add(a, b)));
    }
}

#[tokio::test]
async fn test_keyword_arguments_and_defaults() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let value = ns
        .call("greet", vec![json!("Ada")], Kwargs::new())
        .await
        .unwrap();
    assert_eq!(value, json!("Hello, Ada!"));

    let value = ns
        .call(
            "greet",
            vec![],
            kwargs(&[("name", json!("Ada")), ("greeting", json!("Hi"))]),
        )
        .await
        .unwrap();
    assert_eq!(value, json!("Hi, Ada!"));
}

#[tokio::test]
async fn test_dir_is_cached_after_first_round_trip() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let attrs = ns.attributes().await.unwrap();
    assert_eq!(attrs, vec!["add", "greet", "lookup", "old_add"]);
    assert_eq!(harness.transport.count(), 1);

    // Server gains a new attribute; the proxy does not notice.
    harness.registry.register_unit(
        Unit::new("ns")
            .function(Function::new("add", Signature::positional(&["a", "b"]), |_| Ok(json!(0))))
            .function(Function::new("fresh", Signature::new(), |_| Ok(json!(true)))),
    );

    assert_eq!(ns.attributes().await.unwrap(), attrs);
    assert_eq!(harness.transport.count(), 1);

    let err = ns.attr("fresh").await.unwrap_err();
    assert_eq!(err.kind_name(), "AttributeNotFound");
    assert_eq!(harness.transport.count(), 1);

    // An explicit reset picks up the new registration.
    ns.clear_cache().await;
    assert_eq!(ns.attributes().await.unwrap(), vec!["add", "fresh"]);
    assert_eq!(harness.transport.count(), 2);
}

#[tokio::test]
async fn test_attribute_lookup_triggers_discovery_once() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let call = ns.attr("add").await.unwrap();
    assert_eq!(call.attr(), "add");
    assert_eq!(harness.transport.count(), 1);

    assert_eq!(call.call(vec![json!(1), json!(1)], Kwargs::new()).await.unwrap(), json!(2));
    ns.attr("greet").await.unwrap();
    assert_eq!(harness.transport.count(), 2);
}

#[tokio::test]
async fn test_missing_attribute_from_server() {
    let harness = Harness::new();
    let call = BoundCall::new("ns", "missing", "localhost", 8000, harness.transport.clone());

    let err = call.call(vec![], Kwargs::new()).await.unwrap_err();
    assert!(err.is_remote());
    assert_eq!(err.kind_name(), "AttributeNotFound");
    assert_eq!(err.message(), "Module ns has no attribute 'missing'");
}

#[tokio::test]
async fn test_remote_failure_keeps_kind_and_message() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let err = ns
        .call("lookup", vec![json!("absent")], Kwargs::new())
        .await
        .unwrap_err();
    assert!(err.is_kind("KeyError"));
    assert_eq!(err.message(), "'absent'");
}

#[tokio::test]
async fn test_deprecated_call_warns_and_returns() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let reply = ns
        .attr("old_add")
        .await
        .unwrap()
        .call_with_reply(vec![json!(2), json!(2)], Kwargs::new())
        .await
        .unwrap();
    assert_eq!(reply.data, json!(4));
    assert_eq!(reply.deprecation.as_deref(), Some("old_add is deprecated, use add"));

    let value = ns.call("old_add", vec![json!(1), json!(2)], Kwargs::new()).await.unwrap();
    assert_eq!(value, json!(3));
}

#[tokio::test]
async fn test_unregistered_namespace() {
    let harness = Harness::new();
    let ghost = harness.proxy("ghost");

    let err = ghost.attributes().await.unwrap_err();
    assert_eq!(err.kind_name(), "NamespaceNotFound");
    assert_eq!(err.message(), "No module named 'ghost'");

    let err = ghost.help().await.unwrap_err();
    assert_eq!(err.kind_name(), "NamespaceNotFound");

    let call = BoundCall::new("ghost", "add", "localhost", 8000, harness.transport.clone());
    let err = call.call(vec![], Kwargs::new()).await.unwrap_err();
    assert_eq!(err.kind_name(), "NamespaceNotFound");
}

#[tokio::test]
async fn test_help_round_trips() {
    let harness = Harness::new();
    let ns = harness.proxy("ns");

    let text = ns.help().await.unwrap();
    assert!(text.starts_with("Help on module ns:"));
    assert!(text.contains("LIMIT = 10"));

    let text = ns.help_on("add").await.unwrap();
    assert!(text.contains("add(a, b)"));
    assert!(text.contains("Return a + b."));

    let call = BoundCall::new("ns", "nothing", "localhost", 8000, harness.transport.clone());
    let err = call.help().await.unwrap_err();
    assert_eq!(err.kind_name(), "AttributeNotFound");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_during_reregistration() {
    let harness = Harness::new();
    let ns = Arc::new(harness.proxy("ns"));

    let calls = (0..32).map(|i| {
        let ns = ns.clone();
        async move { ns.call("add", vec![json!(i), json!(1)], Kwargs::new()).await }
    });
    let refresh = async {
        for _ in 0..8 {
            harness.registry.register("ns").unwrap();
            tokio::task::yield_now().await;
        }
    };

    let (results, ()) = tokio::join!(futures::future::join_all(calls), refresh);
    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), json!(i as i64 + 1));
    }
}
