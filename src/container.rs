//! File-level multi-block container.
//!
//! A compressed stream is a vbyte-coded block size followed by framed
//! blocks, each a vbyte-coded encoded length and the block bytes. Every
//! block decodes to at most `block_size` bytes, so the decoder can size
//! its scratch from the leading field alone and stream blocks out
//! without any global index.

use crate::block;
use crate::vlc;
use crate::{SalzError, SalzResult};

/// Default block size for [`compress`], 64 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 16;

fn push_vbyte(out: &mut Vec<u8>, val: u32) {
    let (buf, len) = vlc::encode_vbyte(val);
    out.extend_from_slice(&buf[..len]);
}

/// Compress `input` into a self-contained stream, splitting it into
/// independently coded blocks of `block_size` bytes.
///
/// `block_size` must be in `[1, MAX_PAYLOAD]`; sizes below 1 KiB are
/// legal but compress poorly. Chunks shorter than the 9-byte encoder
/// minimum (at most the final chunk) are framed as PLAIN blocks.
pub fn compress(input: &[u8], block_size: usize) -> SalzResult<Vec<u8>> {
    if block_size == 0 || block_size > block::MAX_PAYLOAD {
        return Err(SalzError::InputTooLarge);
    }

    let mut out = Vec::with_capacity(input.len() / 2 + 16);
    push_vbyte(&mut out, block_size as u32);

    let mut scratch = vec![0u8; block::encoded_len_max(block_size)];
    for chunk in input.chunks(block_size) {
        let written = if chunk.len() < 9 {
            block::write_plain(chunk, &mut scratch)?
        } else {
            block::encode_block(chunk, &mut scratch)?
        };
        push_vbyte(&mut out, written as u32);
        out.extend_from_slice(&scratch[..written]);
    }

    log::debug!(
        "compressed {} bytes into {} bytes ({} blocks of {})",
        input.len(),
        out.len(),
        input.len().div_ceil(block_size.max(1)),
        block_size
    );
    Ok(out)
}

/// Decompress a stream produced by [`compress`].
pub fn decompress(input: &[u8]) -> SalzResult<Vec<u8>> {
    let (block_size, mut pos) = vlc::decode_vbyte(input).ok_or(SalzError::Malformed)?;
    let block_size = block_size as usize;
    if block_size == 0 || block_size > block::MAX_PAYLOAD {
        return Err(SalzError::Malformed);
    }

    let mut out = Vec::new();
    let mut scratch = vec![0u8; block_size];
    while pos < input.len() {
        let (encoded_len, used) = vlc::decode_vbyte(&input[pos..]).ok_or(SalzError::Malformed)?;
        pos += used;
        let encoded = input
            .get(pos..pos + encoded_len as usize)
            .ok_or(SalzError::Malformed)?;
        pos += encoded_len as usize;

        let written = block::decode_block(encoded, &mut scratch)?;
        out.extend_from_slice(&scratch[..written]);
    }
    Ok(out)
}
