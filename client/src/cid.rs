//! IPFS CIDv0 to bytes32 evidence encoding.
//!
//! Milestone evidence lives on IPFS and is referenced on chain as a bare
//! 32-byte sha2-256 digest. A CIDv0 base58-encodes the 34-byte multihash
//! (0x12 0x20 prefix + digest), so the conversion strips the prefix on the
//! way in and restores it on the way out.

use crate::error::{ClientError, Result};

/// Multihash prefix of a CIDv0: sha2-256, 32-byte digest
const CIDV0_PREFIX: [u8; 2] = [0x12, 0x20];

/// Length of a decoded CIDv0 multihash
const CIDV0_LEN: usize = 34;

/// Decode an IPFS CIDv0 into the bare digest stored on chain.
///
/// Accepts the CID with or without an `ipfs://` prefix. Anything that is
/// not a base58-encoded 34-byte sha2-256 multihash is rejected.
pub fn cid_to_bytes32(cid: &str) -> Result<[u8; 32]> {
    let raw = cid.strip_prefix("ipfs://").unwrap_or(cid);

    let decoded = bs58::decode(raw)
        .into_vec()
        .map_err(|err| ClientError::InvalidCid(format!("{}: {}", raw, err)))?;

    if decoded.len() != CIDV0_LEN {
        return Err(ClientError::InvalidCid(format!(
            "{}: decoded to {} bytes, expected {}",
            raw,
            decoded.len(),
            CIDV0_LEN
        )));
    }
    if decoded[..2] != CIDV0_PREFIX {
        return Err(ClientError::InvalidCid(format!(
            "{}: not a sha2-256 multihash",
            raw
        )));
    }

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&decoded[2..]);
    Ok(digest)
}

/// Re-encode an on-chain digest as the CIDv0 it came from.
pub fn bytes32_to_cid(digest: &[u8; 32]) -> String {
    let mut multihash = Vec::with_capacity(CIDV0_LEN);
    multihash.extend_from_slice(&CIDV0_PREFIX);
    multihash.extend_from_slice(digest);
    bs58::encode(multihash).into_string()
}

/// Hex rendering of a digest for logs and receipts
pub fn digest_hex(digest: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(digest))
}
