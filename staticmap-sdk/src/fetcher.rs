// ABOUTME: Chunked download of a response body of unknown length
// ABOUTME: Reads fixed-size chunks in order into one growable payload buffer

use crate::constants::transfer::READ_CHUNK_SIZE;
use crate::error::FetchError;
use crate::request::redact_key;
use crate::transport::Transport;
use std::io::{self, Read};

/// Download `url` through `transport` and return the whole body.
///
/// An empty body is returned as an empty payload, not an error.
pub fn fetch<T>(transport: &T, url: &str) -> Result<Vec<u8>, FetchError>
where
    T: Transport + ?Sized,
{
    log::debug!("Fetching {}", redact_key(url));
    let body = transport.open(url)?;
    read_chunked(body)
}

/// Drain `reader` in `READ_CHUNK_SIZE` reads, appending each chunk in receipt order.
pub fn read_chunked<R: Read>(mut reader: R) -> Result<Vec<u8>, FetchError> {
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut payload = Vec::new();
    let mut chunks = 0usize;

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(FetchError::RequestFailed(Some(format!(
                    "Failed to read response body after {} bytes: {}",
                    payload.len(),
                    redact_key(&e.to_string())
                ))));
            }
        };

        payload
            .try_reserve(read)
            .map_err(|_| FetchError::OutOfMemory)?;
        payload.extend_from_slice(&chunk[..read]);
        chunks += 1;
    }

    log::debug!("Received {} bytes in {} chunks", payload.len(), chunks);
    Ok(payload)
}
