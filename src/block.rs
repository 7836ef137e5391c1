//! Per-block encode and decode.
//!
//! A block is a 4-byte header followed by a payload. The header packs a
//! type byte and a 24-bit payload length, big-endian. PLAIN payloads are
//! the input verbatim (the incompressibility fallback); SALZ payloads
//! are a token bitstream: one flag bit per token, `0` followed by a raw
//! literal byte, `1` followed by the factor offset (vnibble high bits
//! plus one raw low byte, biased by one) and the Golomb-Rice coded
//! factor length (biased by three).
//!
//! The last eight bytes of every block are excluded from factorization
//! and emitted as literals. Factors therefore never reach into them,
//! which keeps the 8-byte-at-a-time reads of the LCP scan in bounds and
//! gives the decoder's bulk copies the same guarantee.

use std::time::{Duration, Instant};

use crate::bitstream::{BitReader, BitWriter};
use crate::factor::{self, MIN_FACTOR_LEN};
use crate::optimal;
use crate::suffix_array::sort_suffixes;
use crate::{SalzError, SalzResult};

/// Bytes of block header: type byte plus 24-bit payload length.
pub const HEADER_SIZE: usize = 4;

/// Largest payload the 24-bit header length field can describe.
pub const MAX_PAYLOAD: usize = 0xff_ffff;

/// Trailing bytes of every block that are always emitted as literals.
const TAIL_LEN: usize = 8;

/// Block payload kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum BlockType {
    /// Input stored verbatim.
    Plain = 0,
    /// SALZ token bitstream.
    Salz = 1,
}

impl TryFrom<u8> for BlockType {
    type Error = SalzError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Plain),
            1 => Ok(Self::Salz),
            _ => Err(SalzError::Malformed),
        }
    }
}

/// Worst-case encoded size of a block: header, plain fallback, and one
/// 8-byte bit slot per 64 literal flags.
pub fn encoded_len_max(plain_len: usize) -> usize {
    HEADER_SIZE + plain_len + plain_len.div_ceil(64) * 8
}

/// Per-phase wall-clock timings of one block encode.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodeStats {
    pub sort: Duration,
    pub neighbors: Duration,
    pub factorize: Duration,
    pub optimize: Duration,
    pub emit: Duration,
}

/// Encode one block of `src` into `dst`; returns the encoded length.
///
/// `src` must be 9 bytes or longer (`InputTooSmall`) and no longer than
/// [`MAX_PAYLOAD`] (`InputTooLarge`). `dst` must hold the committed
/// block, which is never longer than `src.len() + 4`; sizing it with
/// [`encoded_len_max`] is always sufficient.
pub fn encode_block(src: &[u8], dst: &mut [u8]) -> SalzResult<usize> {
    encode_block_inner(src, dst, None)
}

/// Like [`encode_block`], additionally reporting per-phase timings.
pub fn encode_block_with_stats(
    src: &[u8],
    dst: &mut [u8],
    stats: &mut EncodeStats,
) -> SalzResult<usize> {
    encode_block_inner(src, dst, Some(stats))
}

/// Internal capacity for the token stream. A parse can beat the
/// all-literal stream in bits yet exceed it in bytes (extra bit slots),
/// so the bound charges every possible bit to a slot: total bits never
/// exceed 9 per input byte, and raw bytes never exceed one per token.
fn stream_capacity(src_len: usize) -> usize {
    src_len + (9 * src_len).div_ceil(64) * 8 + 8
}

fn encode_block_inner(
    src: &[u8],
    dst: &mut [u8],
    stats: Option<&mut EncodeStats>,
) -> SalzResult<usize> {
    if src.len() < TAIL_LEN + 1 {
        return Err(SalzError::InputTooSmall);
    }
    if src.len() > MAX_PAYLOAD {
        return Err(SalzError::InputTooLarge);
    }
    let n = src.len() - TAIL_LEN;

    let t0 = Instant::now();
    let mut sa = vec![0i32; n + 2];
    sort_suffixes(&src[..n], &mut sa[1..=n])?;
    sa[0] = -1;
    sa[n + 1] = -1;

    let t1 = Instant::now();
    let neighbors = factor::psv_nsv(&sa);

    let t2 = Instant::now();
    let candidates = factor::factorize(src, n, &neighbors);

    let t3 = Instant::now();
    let (decisions, _cost) = optimal::optimize(&candidates, n);

    let t4 = Instant::now();
    let mut writer = BitWriter::with_capacity(stream_capacity(src.len()))?;
    let mut i = 0;
    while i < n {
        let d = decisions[i];
        if d.length == 1 {
            writer.write_bit(false)?;
            writer.write_byte(src[i])?;
            i += 1;
        } else {
            let dist = d.offset - 1;
            writer.write_bit(true)?;
            writer.write_vnibble(dist >> 8)?;
            writer.write_byte((dist & 0xff) as u8)?;
            writer.write_gr3(d.length - MIN_FACTOR_LEN)?;
            i += d.length as usize;
        }
    }
    for &byte in &src[n..] {
        writer.write_bit(false)?;
        writer.write_byte(byte)?;
    }
    let stream = writer.finish();

    let t5 = Instant::now();
    if let Some(stats) = stats {
        stats.sort = t1 - t0;
        stats.neighbors = t2 - t1;
        stats.factorize = t3 - t2;
        stats.optimize = t4 - t3;
        stats.emit = t5 - t4;
    }

    if stream.len() >= n + 9 {
        log::debug!(
            "block of {} bytes is incompressible, storing plain",
            src.len()
        );
        return commit(BlockType::Plain, src, dst);
    }
    commit(BlockType::Salz, &stream, dst)
}

/// Write `src` as a PLAIN block. Used directly for inputs below the
/// 9-byte encoder minimum.
pub(crate) fn write_plain(src: &[u8], dst: &mut [u8]) -> SalzResult<usize> {
    if src.len() > MAX_PAYLOAD {
        return Err(SalzError::InputTooLarge);
    }
    commit(BlockType::Plain, src, dst)
}

fn commit(kind: BlockType, payload: &[u8], dst: &mut [u8]) -> SalzResult<usize> {
    debug_assert!(payload.len() <= MAX_PAYLOAD);
    let total = HEADER_SIZE + payload.len();
    if dst.len() < total {
        return Err(SalzError::OutputTooSmall);
    }
    let header = ((kind as u32) << 24) | payload.len() as u32;
    dst[..HEADER_SIZE].copy_from_slice(&header.to_be_bytes());
    dst[HEADER_SIZE..total].copy_from_slice(payload);
    Ok(total)
}

/// Decode one block of `src` into `dst`; returns the decoded length.
///
/// Bytes beyond the header-declared payload length are left untouched.
pub fn decode_block(src: &[u8], dst: &mut [u8]) -> SalzResult<usize> {
    if src.len() < HEADER_SIZE {
        return Err(SalzError::Malformed);
    }
    let header = u32::from_be_bytes(src[..HEADER_SIZE].try_into().unwrap());
    let kind = BlockType::try_from((header >> 24) as u8)?;
    let payload_len = (header & MAX_PAYLOAD as u32) as usize;
    let payload = src
        .get(HEADER_SIZE..HEADER_SIZE + payload_len)
        .ok_or(SalzError::Malformed)?;

    match kind {
        BlockType::Plain => {
            if dst.len() < payload_len {
                return Err(SalzError::OutputTooSmall);
            }
            dst[..payload_len].copy_from_slice(payload);
            Ok(payload_len)
        }
        BlockType::Salz => decode_stream(payload, dst),
    }
}

fn decode_stream(payload: &[u8], dst: &mut [u8]) -> SalzResult<usize> {
    let mut reader = BitReader::new(payload)?;
    let mut pos = 0usize;

    while !reader.is_empty() {
        if reader.read_bit()? {
            let high = reader.read_vnibble()? as u64;
            let low = reader.read_byte()? as u64;
            let offset = (high << 8 | low) + 1;
            let length = reader.read_gr3()? as usize + MIN_FACTOR_LEN as usize;

            if offset > pos as u64 {
                return Err(SalzError::Malformed);
            }
            if length > dst.len() - pos {
                return Err(SalzError::OutputTooSmall);
            }
            let offset = offset as usize;
            let start = pos - offset;
            if offset >= length {
                dst.copy_within(start..start + length, pos);
            } else {
                // Overlapped copy replicates just-written bytes, so it
                // must stay byte-oriented.
                for j in 0..length {
                    dst[pos + j] = dst[start + j];
                }
            }
            pos += length;
        } else {
            if pos >= dst.len() {
                return Err(SalzError::OutputTooSmall);
            }
            dst[pos] = reader.read_byte()?;
            pos += 1;
        }
    }

    Ok(pos)
}
