use attestation_core::{
    Attestor, BigUint, ComparisonResult, SourceError, TransactionSource, TxHash,
};
use attestation_rpc::JsonRpcSource;
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, method},
    Mock, MockServer, ResponseTemplate,
};

const HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

fn node_transaction(nonce: &str) -> Value {
    json!({
        "blockHash": "0x4e3a3754410177e6937ef1f84bba68ea139e8d1a2258c5f85db9f1cd715a1bdd",
        "blockNumber": "0xb443",
        "from": "0xa1e4380a3b1f749673e270229993ee55f35663b4",
        "gas": "0x5208",
        "gasPrice": "0x2d79883d2000",
        "hash": HASH,
        "input": "0x",
        "nonce": nonce,
        "r": "0x88ff6cf0fefd94db46111149ae4bfc179e9b94721fffd821d38d16464b3f71d0",
        "s": "0x45e0aff800961cfce805daef7016b9b675c137a6a41a548f7b60a3484c06a33a",
        "to": "0x5df9b87991262f6ba471f09758cde1c0fc1de734",
        "transactionIndex": "0x0",
        "type": "0x0",
        "v": "0x1c",
        "value": "0x7a69"
    })
}

/// Answer every call of `rpc_method` with `response`.
async fn mount(server: &MockServer, rpc_method: &str, response: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(server)
        .await;
}

async fn node(chain_id: &str, tx: Value) -> MockServer {
    let server = MockServer::start().await;
    // Chain id is requested first (id 1), then the transaction (id 2).
    mount(&server, "eth_chainId", json!({"jsonrpc": "2.0", "id": 1, "result": chain_id})).await;
    mount(
        &server,
        "eth_getTransactionByHash",
        json!({"jsonrpc": "2.0", "id": 2, "result": tx}),
    )
    .await;
    server
}

#[tokio::test]
async fn test_chain_id() {
    let server = node("0xa", Value::Null).await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    assert_eq!(source.chain_id().await, Ok(10));
}

#[tokio::test]
async fn test_get_transaction_object() {
    let server = MockServer::start().await;
    mount(
        &server,
        "eth_getTransactionByHash",
        json!({"jsonrpc": "2.0", "id": 1, "result": node_transaction("0x5")}),
    )
    .await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    let raw = source
        .get_transaction(&TxHash::parse(HASH).unwrap())
        .await
        .unwrap()
        .expect("transaction present");

    let tx = attestation_core::canonicalize(&raw).unwrap();
    assert_eq!(tx.nonce, BigUint::from(5u32));
    assert_eq!(tx.value, BigUint::from(31337u32));
    assert_eq!(tx.hash.as_deref(), Some(HASH));
    assert_eq!(tx.max_fee_per_gas, None);
}

#[tokio::test]
async fn test_get_transaction_null_is_none() {
    let server = MockServer::start().await;
    mount(
        &server,
        "eth_getTransactionByHash",
        json!({"jsonrpc": "2.0", "id": 1, "result": null}),
    )
    .await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    let result = source.get_transaction(&TxHash::parse(HASH).unwrap()).await;
    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn test_rpc_error_object() {
    let server = MockServer::start().await;
    mount(
        &server,
        "eth_chainId",
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32601, "message": "method not found"}
        }),
    )
    .await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    assert_eq!(
        source.chain_id().await,
        Err(SourceError::Rpc {
            code: -32601,
            message: "method not found".to_string()
        })
    );
}

#[tokio::test]
async fn test_http_failure_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    match source.chain_id().await {
        Err(SourceError::Transport(message)) => {
            assert_eq!(message, "http status 503 Service Unavailable")
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;
    let source = JsonRpcSource::new(&server.uri()).unwrap();

    assert!(matches!(
        source.chain_id().await,
        Err(SourceError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_attest_two_nodes_disagree_on_nonce() {
    let node_a = node("0x1", node_transaction("0x5")).await;
    let node_b = node("0x1", node_transaction("0x6")).await;
    let source_a = JsonRpcSource::new(&node_a.uri()).unwrap();
    let source_b = JsonRpcSource::new(&node_b.uri()).unwrap();

    let attestation = Attestor::default().attest(HASH, &source_a, &source_b).await.unwrap();

    let ComparisonResult::Mismatch { field_diffs, root_a, root_b } = attestation.result else {
        panic!("expected mismatch");
    };
    assert_ne!(root_a, root_b);
    assert_eq!(field_diffs.keys().collect::<Vec<_>>(), vec!["nonce"]);
}

#[tokio::test]
async fn test_attest_two_nodes_agree() {
    let node_a = node("0x1", node_transaction("0x5")).await;
    let node_b = node("0x1", node_transaction("0x5")).await;
    let source_a = JsonRpcSource::new(&node_a.uri()).unwrap();
    let source_b = JsonRpcSource::new(&node_b.uri()).unwrap();

    let attestation = Attestor::default().attest(HASH, &source_a, &source_b).await.unwrap();

    assert!(attestation.result.is_match());
    assert_eq!(attestation.chain_id, 1);
}
