//! Console rendering of attestation outcomes.

use attestation_core::{AttestError, Attestation, ComparisonResult};

pub const EXIT_OK: u8 = 0;
pub const EXIT_USAGE: u8 = 1;
pub const EXIT_BAD_HASH: u8 = 2;
pub const EXIT_CHAIN_MISMATCH: u8 = 3;

/// Exit code for an attestation that was refused before comparison.
pub fn exit_code(err: &AttestError) -> u8 {
    match err {
        AttestError::InvalidHash(_) => EXIT_BAD_HASH,
        AttestError::ChainMismatch { .. } => EXIT_CHAIN_MISMATCH,
        AttestError::SourceUnavailable { .. } => EXIT_USAGE,
    }
}

/// Human-readable summary. Non-matching outcomes include the JSON payload.
pub fn render(
    attestation: &Attestation,
    rpc_a: &str,
    rpc_b: &str,
) -> Result<String, serde_json::Error> {
    let chain_id = attestation.chain_id;
    let mut lines = vec![
        format!("🌐 RPC A: {rpc_a} (chainId={chain_id})"),
        format!("🌐 RPC B: {rpc_b} (chainId={chain_id})"),
        format!("🔍 Transaction {}", attestation.tx_hash),
    ];

    match &attestation.result {
        ComparisonResult::Match { root } => {
            lines.push("✅ Transaction views match across both providers.".to_string());
            lines.push(format!("🔏 Canonical tx root ({}): {root}", attestation.hash_algorithm));
        }
        ComparisonResult::Mismatch { .. } => {
            lines.push("❌ Transaction views differ.".to_string());
            lines.push(serde_json::to_string_pretty(&attestation.result)?);
        }
        ComparisonResult::FetchFailure { .. } => {
            lines.push("❌ Could not fetch the transaction from both providers.".to_string());
            lines.push(serde_json::to_string_pretty(&attestation.result)?);
        }
    }

    lines.push(format!("⏱️ Elapsed: {:.2}s", attestation.elapsed.as_secs_f64()));
    Ok(lines.join("\n"))
}
