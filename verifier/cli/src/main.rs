//! `attest <txHash> [rpcA] [rpcB]`
//!
//! Exit codes:
//! - 0: comparison completed and was reported (match, mismatch, or a per-source fetch failure)
//! - 1: usage error, or a source unreachable during the chain-id pre-flight
//! - 2: malformed transaction hash
//! - 3: the two sources report different chain ids

mod cli;
mod report;

use crate::cli::Args;
use crate::report::{exit_code, render, EXIT_BAD_HASH, EXIT_OK, EXIT_USAGE};
use anyhow::{Context, Result};
use attestation_core::{AttestError, Attestor, AttestorConfig, TxHash};
use attestation_rpc::{endpoint_warnings, JsonRpcSource, RpcConfig};
use clap::{error::ErrorKind, Parser};
use std::process::ExitCode;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(args.log_json);

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("❌ {err:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: Args) -> Result<u8> {
    let tx_hash = match parse_tx_hash(&args.tx_hash) {
        Ok(hash) => hash,
        Err(code) => return Ok(code),
    };

    for finding in endpoint_findings(&args.rpc_a, &args.rpc_b) {
        warn!("{finding}");
    }

    let timeout = Duration::from_secs(args.timeout_secs);
    let rpc_config = RpcConfig {
        request_timeout: timeout,
    };
    let source_a = JsonRpcSource::with_config(&args.rpc_a, rpc_config.clone())
        .with_context(|| format!("invalid RPC A endpoint `{}`", args.rpc_a))?;
    let source_b = JsonRpcSource::with_config(&args.rpc_b, rpc_config)
        .with_context(|| format!("invalid RPC B endpoint `{}`", args.rpc_b))?;

    let attestor = Attestor::new(AttestorConfig {
        fetch_timeout: timeout,
        hash_algorithm: args.hash_algorithm,
    });

    let attestation = match attestor.attest_hash(&tx_hash, &source_a, &source_b).await {
        Ok(attestation) => attestation,
        Err(err) => {
            match &err {
                AttestError::ChainMismatch { a, b } => {
                    println!("🌐 RPC A: {} (chainId={a})", args.rpc_a);
                    println!("🌐 RPC B: {} (chainId={b})", args.rpc_b);
                    eprintln!("❌ chainId mismatch between RPC A and B; views are not comparable.");
                }
                other => eprintln!("❌ {other}"),
            }
            return Ok(exit_code(&err));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&attestation)?);
    } else {
        println!("{}", render(&attestation, &args.rpc_a, &args.rpc_b)?);
    }

    Ok(EXIT_OK)
}

/// Validate the hash before any endpoint is touched; a bad hash maps to its exit code.
fn parse_tx_hash(raw: &str) -> Result<TxHash, u8> {
    TxHash::parse(raw).map_err(|err| {
        eprintln!("❌ Invalid transaction hash; expected 0x + 64 hex chars ({err}).");
        EXIT_BAD_HASH
    })
}

/// Endpoint hygiene findings. They are logged and never abort the run.
fn endpoint_findings(rpc_a: &str, rpc_b: &str) -> Vec<String> {
    let mut findings = Vec::new();
    if rpc_a == rpc_b {
        findings.push("RPC A and RPC B are identical; the comparison will be trivial".to_string());
    }

    for (label, url) in [("A", rpc_a), ("B", rpc_b)] {
        for finding in endpoint_warnings(url) {
            findings.push(format!("RPC {label} ({url}): {finding}"));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

    #[test]
    fn test_bad_hash_exits_with_code_2() {
        assert_eq!(parse_tx_hash("0x1234").unwrap_err(), EXIT_BAD_HASH);
        assert_eq!(parse_tx_hash(&HASH[2..]).unwrap_err(), EXIT_BAD_HASH);
        assert_eq!(EXIT_BAD_HASH, 2);
    }

    #[test]
    fn test_valid_hash_passes_gate() {
        let hash = parse_tx_hash(&HASH.to_ascii_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert_eq!(hash.as_str(), HASH);
    }

    #[tokio::test]
    async fn test_bad_hash_short_circuits_run() {
        let args = Args::try_parse_from(["attest", "0xnothex", "http://a:8545", "http://b:8545"])
            .unwrap();
        assert_eq!(run(args).await.unwrap(), EXIT_BAD_HASH);
    }

    #[test]
    fn test_identical_endpoints_flagged() {
        let findings = endpoint_findings("http://node:8545", "http://node:8545");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("identical"));
    }

    #[test]
    fn test_distinct_clean_endpoints_have_no_findings() {
        assert!(endpoint_findings("http://a:8545", "http://b:8545").is_empty());
    }

    #[test]
    fn test_placeholder_key_attributed_to_endpoint() {
        let findings = endpoint_findings(
            "https://mainnet.infura.io/v3/your_api_key",
            "https://eth.llamarpc.com",
        );
        assert_eq!(findings.len(), 1);
        assert!(findings[0].starts_with("RPC A (https://mainnet.infura.io/v3/your_api_key)"));
    }
}
