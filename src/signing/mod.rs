//! GalaChain payload signing.
//!
//! Payloads are canonicalized to compact JSON with sorted keys (with the
//! transient `signature` and `trace` fields stripped), digested with
//! keccak256, and signed with secp256k1. The resulting signature is the
//! 65-byte `r || s || v` form, hex encoded.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::RwLock;

use alloy::primitives::keccak256;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::debug;

use crate::error::ExecutionError;
use crate::metrics;

/// Cache of signers keyed by private key hash, to avoid re-deriving the
/// secp256k1 keypair on every hop.
static SIGNER_CACHE: Lazy<RwLock<HashMap<u64, PrivateKeySigner>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn key_hash(private_key: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    private_key.hash(&mut hasher);
    hasher.finish()
}

/// Build a signer from a hex private key (with or without `0x` prefix).
pub fn create_signer(private_key: &str) -> Result<PrivateKeySigner, ExecutionError> {
    let hex_key = private_key.strip_prefix("0x").unwrap_or(private_key);

    let bytes = hex::decode(hex_key)
        .map_err(|e| ExecutionError::Signing(format!("invalid hex in private key: {e}")))?;

    if bytes.len() != 32 {
        return Err(ExecutionError::Signing(format!(
            "private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }

    PrivateKeySigner::from_slice(&bytes)
        .map_err(|e| ExecutionError::Signing(format!("invalid private key: {e}")))
}

/// Fetch a cached signer, creating and caching one on first use.
pub fn get_or_create_signer(private_key: &str) -> Result<PrivateKeySigner, ExecutionError> {
    let hash = key_hash(private_key);

    if let Ok(cache) = SIGNER_CACHE.read() {
        if let Some(signer) = cache.get(&hash) {
            return Ok(signer.clone());
        }
    }

    let signer = create_signer(private_key)?;
    if let Ok(mut cache) = SIGNER_CACHE.write() {
        cache.insert(hash, signer.clone());
        debug!("signer cached");
    }
    Ok(signer)
}

/// Drop all cached signers.
pub fn clear_signer_cache() {
    if let Ok(mut cache) = SIGNER_CACHE.write() {
        cache.clear();
    }
}

/// GalaChain address for a private key, in `eth|0x...` form.
pub fn address_from_private_key(private_key: &str) -> Result<String, ExecutionError> {
    let signer = get_or_create_signer(private_key)?;
    Ok(format!("eth|{:?}", signer.address()))
}

/// Serialize a payload to its canonical signed form: compact JSON, keys
/// sorted, `signature` and `trace` removed.
pub fn canonical_payload_bytes<T: Serialize>(payload: &T) -> Result<Vec<u8>, ExecutionError> {
    let mut value = serde_json::to_value(payload)
        .map_err(|e| ExecutionError::Signing(format!("payload not serializable: {e}")))?;

    if let Some(object) = value.as_object_mut() {
        object.remove("signature");
        object.remove("trace");
    }

    // serde_json's Map is a BTreeMap, so serialization is already key-sorted.
    let canonical = serde_json::to_string(&value)
        .map_err(|e| ExecutionError::Signing(format!("canonicalization failed: {e}")))?;

    Ok(canonical.into_bytes())
}

/// Sign a payload for bundle submission. Returns the hex-encoded 65-byte
/// signature.
pub fn sign_payload<T: Serialize>(
    payload: &T,
    private_key: &str,
) -> Result<String, ExecutionError> {
    let timer = metrics::timer_signing();

    let bytes = canonical_payload_bytes(payload)?;
    let digest = keccak256(&bytes);

    let signer = get_or_create_signer(private_key)?;
    let signature = signer
        .sign_hash_sync(&digest)
        .map_err(|e| ExecutionError::Signing(format!("signing failed: {e}")))?;

    drop(timer);
    Ok(hex::encode(signature.as_bytes()))
}
