// Content fingerprinting module
// Change detection is by content digest only, never by timestamp or size

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute the content fingerprint of a file as a lowercase hex string.
///
/// The file is streamed through BLAKE3 in fixed-size chunks, so memory usage
/// is bounded regardless of file size. Identical byte streams always yield
/// identical digests. Errors carry the affected path and propagate to the
/// caller; a failed read aborts the current pass.
pub fn fingerprint(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open {} for hashing", path.display()))?;

    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; BUF_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .with_context(|| format!("failed to read {} while hashing", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
