// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod error;

use sha2::{Digest, Sha256};

pub use config::{
    find_config_file, resolve_cache_dir, resolve_config_path, ConfigPathScope, MgvConfig,
    ENV_MGV_CACHE_DB_NAME, ENV_MGV_CACHE_DIR, ENV_MGV_CONTIG_MAX_GAP, ENV_MGV_FEATURE_SIZE_LIMIT,
    ENV_MGV_HTTP_MAX_ATTEMPTS, ENV_MGV_HTTP_TIMEOUT_MS, ENV_MGV_LOG_JSON, ENV_MGV_LOG_LEVEL,
    ENV_MGV_PACKER_GAP, ENV_MGV_PACKER_RESET_SPAN, ENV_MGV_ROOT,
};
pub use error::{Error, ErrorCode, Result};

pub const CRATE_NAME: &str = "mgv-core";

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
