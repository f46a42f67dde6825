//! Command-line configuration for the `attest` binary.

use attestation_core::HashAlgorithm;
use clap::Parser;

pub const DEFAULT_RPC_A: &str = "https://mainnet.infura.io/v3/your_api_key";
pub const DEFAULT_RPC_B: &str = "https://eth.llamarpc.com";

/// Attest that two RPC providers report the same view of a transaction.
///
/// Every parameter can also be supplied through an environment variable, so
/// endpoints can live in deployment config rather than shell history.
#[derive(Parser, Debug)]
#[command(name = "attest", author, version, about, long_about = None)]
pub struct Args {
    /// Transaction hash (0x + 64 hex characters)
    pub tx_hash: String,

    /// First RPC endpoint
    #[arg(env = "RPC_A", default_value = DEFAULT_RPC_A)]
    pub rpc_a: String,

    /// Second RPC endpoint
    #[arg(env = "RPC_B", default_value = DEFAULT_RPC_B)]
    pub rpc_b: String,

    /// Timeout for each chain-id query and transaction fetch, in seconds
    #[arg(long, env = "ATTEST_TIMEOUT_SECS", default_value_t = 20)]
    pub timeout_secs: u64,

    /// Hash function for content roots (sha256 or blake3)
    #[arg(long, env = "ATTEST_HASH_ALGORITHM", default_value = "sha256")]
    pub hash_algorithm: HashAlgorithm,

    /// Print the full attestation as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "ATTEST_LOG_JSON")]
    pub log_json: bool,
}
