use std::io::Read;
use std::time::Duration;

use flate2::read::MultiGzDecoder;
use tracing::debug;

pub mod atlas;
pub mod xmltv;

pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
}

/// Gunzips `raw`, including concatenated gzip members, or returns it
/// unchanged when it is not gzip data.
pub fn decode_payload(raw: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::new();
    match MultiGzDecoder::new(raw).read_to_end(&mut decoded) {
        Ok(_) => decoded,
        Err(err) => {
            debug!(error = %err, bytes = raw.len(), "payload is not gzip, using raw bytes");
            raw.to_vec()
        }
    }
}
