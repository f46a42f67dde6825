//! Example: attesting a transaction across two in-memory providers
//!
//! Run with: cargo run -p attestation-core --example attest_fixture

use attestation_core::{
    canonicalize, serialization::to_canonical_json, Attestor, ComparisonResult, RawTransaction,
    StaticSource, TxHash,
};

const TX: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// The transaction as a JSON-RPC node returns it: everything hex text.
fn node_view(nonce: &str) -> RawTransaction {
    RawTransaction::new()
        .with("hash", TX)
        .with("nonce", nonce)
        .with("from", "0xa1e4380a3b1f749673e270229993ee55f35663b4")
        .with("to", "0x5df9b87991262f6ba471f09758cde1c0fc1de734")
        .with("value", "0x7a69")
        .with("gas", "0x5208")
        .with("gasPrice", "0x2d79883d2000")
        .with("input", "0x")
        .with("v", "0x1c")
        .with("blockNumber", "0xb443")
        .with("transactionIndex", "0x0")
}

/// The same transaction as a client library decodes it: native ints, hash as bytes.
fn library_view() -> RawTransaction {
    RawTransaction::new()
        .with("hash", hex::decode(&TX[2..]).unwrap())
        .with("nonce", 5u64)
        .with("from", "0xa1e4380a3b1f749673e270229993ee55f35663b4")
        .with("to", "0x5df9b87991262f6ba471f09758cde1c0fc1de734")
        .with("value", 31337u64)
        .with("gas", 21000u64)
        .with("gasPrice", 50_000_000_000_000u64)
        .with("input", "0x")
        .with("v", 28u64)
        .with("blockNumber", 46147u64)
        .with("transactionIndex", 0u64)
}

#[tokio::main]
async fn main() {
    println!("🔗 Transaction View Attestation - Example Usage\n");
    println!("==============================================\n");

    let tx_hash = TxHash::parse(TX).unwrap();

    // Step 1: Canonicalize both provider shapes
    println!("1️⃣  Canonicalizing two provider shapes...");
    let a = canonicalize(&node_view("0x5")).unwrap();
    let b = canonicalize(&library_view()).unwrap();
    println!("   ✓ Canonical JSON: {}", to_canonical_json(&a));
    println!("   ✓ Shapes converge: {}\n", a == b);

    // Step 2: Honest providers
    println!("2️⃣  Attesting against two agreeing providers...");
    let honest_a = StaticSource::new("node", 1).with_transaction(tx_hash.clone(), node_view("0x5"));
    let honest_b =
        StaticSource::new("library", 1).with_transaction(tx_hash.clone(), library_view());

    let attestor = Attestor::default();
    let attestation = attestor.attest(TX, &honest_a, &honest_b).await.unwrap();
    if let ComparisonResult::Match { root } = &attestation.result {
        println!("   ✅ Views match, root {root}\n");
    }

    // Step 3: A provider that rewrote the nonce
    println!("3️⃣  Attesting against a tampering provider...");
    let tampered =
        StaticSource::new("tampered", 1).with_transaction(tx_hash.clone(), node_view("0x6"));
    let attestation = attestor.attest(TX, &honest_a, &tampered).await.unwrap();
    println!(
        "   ❌ {}\n",
        serde_json::to_string_pretty(&attestation.result).unwrap()
    );

    // Step 4: A provider on another chain
    println!("4️⃣  Attesting across chains...");
    let other_chain = StaticSource::new("optimism", 10).with_transaction(tx_hash, node_view("0x5"));
    match attestor.attest(TX, &honest_a, &other_chain).await {
        Err(e) => println!("   ✓ Refused: {e}\n"),
        Ok(_) => println!("   ⚠️ Unexpectedly compared across chains\n"),
    }

    println!("==============================================");
    println!("✅ Attestation workflow complete!");
}
