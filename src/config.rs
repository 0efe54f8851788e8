//! Benchmark configuration.
//!
//! Everything the harness touches is fixed here: the input files, the
//! algorithm list and the locations of the external tools. The CLI only
//! adjusts ambient behavior (logging, failure policy, progress display).

use clap::ValueEnum;
use std::path::PathBuf;

/// Input files, hashed in this order.
pub const FILE_LIST: [&str; 3] = ["2GB", "4GB", "6GB"];

/// Nominal combined size of `FILE_LIST` in gigabytes (2 + 4 + 6).
/// Must be updated together with the file list; it is not measured.
pub const DATASET_SIZE_GB: f64 = 12.0;

pub const OPENSSL_PATH: &str = "/usr/bin/openssl";
pub const CRCTK_PATH: &str = "/usr/bin/crctk";

pub const DEFAULT_LOG_PATH: &str = "hashbench.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha3_256,
    Sha256,
    Ripemd,
    Whirlpool,
    Blake2s256,
}

impl HashAlgorithm {
    /// Every algorithm run through the primary tool, in report order.
    pub const ALL: [HashAlgorithm; 8] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha3_256,
        HashAlgorithm::Sha256,
        HashAlgorithm::Ripemd,
        HashAlgorithm::Whirlpool,
        HashAlgorithm::Blake2s256,
    ];

    /// Flag passed to `openssl dgst`.
    pub fn openssl_flag(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "-md5",
            HashAlgorithm::Sha1 => "-sha1",
            HashAlgorithm::Sha224 => "-sha224",
            HashAlgorithm::Sha3_256 => "-sha3-256",
            HashAlgorithm::Sha256 => "-sha-256",
            HashAlgorithm::Ripemd => "-ripemd",
            HashAlgorithm::Whirlpool => "-whirlpool",
            HashAlgorithm::Blake2s256 => "-blake2s256",
        }
    }

    /// Name shown in the report: the flag upper-cased with dashes removed.
    pub fn label(&self) -> String {
        self.openssl_flag().to_uppercase().replace('-', "")
    }
}

/// What the driver does with a sample whose tool exited non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Keep the sample in the total but mark it unreliable
    #[default]
    Flag,
    /// Leave the sample out of the total
    Exclude,
    /// Stop the benchmark
    Abort,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub files: Vec<PathBuf>,
    pub algorithms: Vec<HashAlgorithm>,
    pub primary_tool: PathBuf,
    pub checksum_tool: PathBuf,
    pub dataset_size_gb: f64,
    pub failure_policy: FailurePolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            files: FILE_LIST.iter().map(PathBuf::from).collect(),
            algorithms: HashAlgorithm::ALL.to_vec(),
            primary_tool: PathBuf::from(OPENSSL_PATH),
            checksum_tool: PathBuf::from(CRCTK_PATH),
            dataset_size_gb: DATASET_SIZE_GB,
            failure_policy: FailurePolicy::default(),
        }
    }
}
