use serde_bencode::value::Value;
use sha1::{Digest, Sha1};

use super::ResolveError;

/// Decode a `.torrent` file and return its `info` dictionary.
fn decode_info(torrent_bytes: &[u8]) -> Result<Value, ResolveError> {
    let value: Value = serde_bencode::from_bytes(torrent_bytes)
        .map_err(|e| ResolveError::Decode(e.to_string()))?;

    let Value::Dict(mut dict) = value else {
        return Err(ResolveError::Decode(
            "torrent is not a dictionary".to_string(),
        ));
    };

    dict.remove(&b"info"[..])
        .ok_or_else(|| ResolveError::Decode("missing info dictionary".to_string()))
}

/// SHA-1 of the canonical bencoding of `info`.
fn hash_info(info: &Value) -> Result<[u8; 20], ResolveError> {
    // serde_bencode writes dictionary keys sorted, which is the canonical form
    let encoded =
        serde_bencode::to_bytes(info).map_err(|e| ResolveError::Decode(e.to_string()))?;
    let digest = Sha1::digest(&encoded);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&digest);
    Ok(hash)
}

/// The BitTorrent v1 info-hash of a `.torrent` file.
pub fn info_hash(torrent_bytes: &[u8]) -> Result<[u8; 20], ResolveError> {
    let info = decode_info(torrent_bytes)?;
    hash_info(&info)
}

/// Build `magnet:?xt=urn:btih:<hex>[&dn=<name>]` from `.torrent` bytes.
pub fn magnet_from_torrent(torrent_bytes: &[u8]) -> Result<String, ResolveError> {
    let info = decode_info(torrent_bytes)?;
    let hash = hash_info(&info)?;

    let hex: String = hash.iter().map(|b| format!("{:02x}", b)).collect();
    let mut magnet = format!("magnet:?xt=urn:btih:{}", hex);

    if let Value::Dict(fields) = &info {
        if let Some(Value::Bytes(name)) = fields.get(&b"name"[..]) {
            let name = String::from_utf8_lossy(name);
            magnet.push_str("&dn=");
            magnet.push_str(&urlencoding::encode(&name));
        }
    }

    Ok(magnet)
}
