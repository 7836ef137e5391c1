//! Bit/byte interleaved stream I/O.
//!
//! The stream is a byte buffer partitioned on demand into 8-byte bit
//! slots and raw bytes. Bits are packed MSB-first into a 64-bit register;
//! when the register fills, it is stored little-endian into the slot
//! reserved for it and a fresh slot is reserved at the current end of the
//! buffer. Raw bytes append past the reserved slot. Because both sides
//! reserve the first slot up front and flush/load lazily afterwards, the
//! writer and reader stay in lockstep without any explicit lengths: the
//! interleaving is self-synchronizing.
//!
//! Every reader access is bounds-checked; an over-read surfaces as
//! [`SalzError::Malformed`]. The writer enforces a hard capacity and
//! fails with [`SalzError::OutputTooSmall`].

use crate::vlc;
use crate::{SalzError, SalzResult};

const SLOT_BYTES: usize = std::mem::size_of::<u64>();

/// Sequential bit and byte writer.
pub struct BitWriter {
    buf: Vec<u8>,
    cap: usize,
    /// Byte offset of the 8-byte slot the register will be stored to.
    bits_pos: usize,
    register: u64,
    /// Bits still free in the register, in [0, 64].
    bits_avail: u32,
}

impl BitWriter {
    /// Create a writer with a hard capacity of `cap` bytes and reserve
    /// the first bit slot.
    pub fn with_capacity(cap: usize) -> SalzResult<Self> {
        if cap < SLOT_BYTES {
            return Err(SalzError::OutputTooSmall);
        }
        let mut buf = Vec::with_capacity(cap);
        buf.resize(SLOT_BYTES, 0);
        Ok(BitWriter {
            buf,
            cap,
            bits_pos: 0,
            register: 0,
            bits_avail: u64::BITS,
        })
    }

    /// Store the full register into its slot and reserve the next slot.
    fn flush(&mut self) -> SalzResult<()> {
        if self.buf.len() + SLOT_BYTES > self.cap {
            return Err(SalzError::OutputTooSmall);
        }
        self.buf[self.bits_pos..self.bits_pos + SLOT_BYTES]
            .copy_from_slice(&self.register.to_le_bytes());
        self.bits_pos = self.buf.len();
        self.buf.resize(self.buf.len() + SLOT_BYTES, 0);
        self.register = 0;
        self.bits_avail = u64::BITS;
        Ok(())
    }

    /// Write the low `n` bits of `val`, most significant first.
    pub fn write_bits(&mut self, val: u64, n: u32) -> SalzResult<()> {
        debug_assert!((1..=64).contains(&n));
        let mut n = n;
        let mut val = if n == 64 { val } else { val & ((1u64 << n) - 1) };
        while n > 0 {
            if self.bits_avail == 0 {
                self.flush()?;
            }
            let take = n.min(self.bits_avail);
            let chunk = if take == n { val } else { val >> (n - take) };
            self.bits_avail -= take;
            self.register |= chunk << self.bits_avail;
            n -= take;
            if n > 0 {
                val &= (1u64 << n) - 1;
            }
        }
        Ok(())
    }

    pub fn write_bit(&mut self, bit: bool) -> SalzResult<()> {
        self.write_bits(bit as u64, 1)
    }

    /// Append one raw byte past the reserved slot.
    pub fn write_byte(&mut self, byte: u8) -> SalzResult<()> {
        if self.buf.len() + 1 > self.cap {
            return Err(SalzError::OutputTooSmall);
        }
        self.buf.push(byte);
        Ok(())
    }

    /// Write `val` zero bits followed by a one bit.
    pub fn write_unary(&mut self, mut val: u32) -> SalzResult<()> {
        while val >= 32 {
            self.write_bits(0, 32)?;
            val -= 32;
        }
        // The low `val + 1` bits of 1 are `val` zeros then a one.
        self.write_bits(1, val + 1)
    }

    /// Write the Golomb-Rice k=3 codeword for `val`.
    pub fn write_gr3(&mut self, val: u32) -> SalzResult<()> {
        self.write_unary(val >> 3)?;
        self.write_bits((val & 0x7) as u64, 3)
    }

    /// Write the vnibble codeword for `val`.
    pub fn write_vnibble(&mut self, val: u32) -> SalzResult<()> {
        let (code, nibbles) = vlc::encode_vnibble(val);
        self.write_bits(code, 4 * nibbles)
    }

    /// Bytes committed so far, including the pending slot.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Store the final partial register and return the stream bytes.
    ///
    /// Written bits already sit in the register's most significant end,
    /// so the store needs no shifting; unused low bits stay zero.
    pub fn finish(mut self) -> Vec<u8> {
        self.buf[self.bits_pos..self.bits_pos + SLOT_BYTES]
            .copy_from_slice(&self.register.to_le_bytes());
        self.buf
    }
}

/// Sequential bit and byte reader over an encoded stream.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    register: u64,
    bits_left: u32,
}

impl<'a> BitReader<'a> {
    /// Create a reader and load the first bit slot.
    pub fn new(data: &'a [u8]) -> SalzResult<Self> {
        let mut reader = BitReader {
            data,
            pos: 0,
            register: 0,
            bits_left: 0,
        };
        reader.load_slot()?;
        Ok(reader)
    }

    fn load_slot(&mut self) -> SalzResult<()> {
        let end = self.pos + SLOT_BYTES;
        if end > self.data.len() {
            return Err(SalzError::Malformed);
        }
        let slot: [u8; SLOT_BYTES] = self.data[self.pos..end].try_into().unwrap();
        self.register = u64::from_le_bytes(slot);
        self.pos = end;
        self.bits_left = u64::BITS;
        Ok(())
    }

    pub fn read_bit(&mut self) -> SalzResult<bool> {
        if self.bits_left == 0 {
            self.load_slot()?;
        }
        let bit = self.register >> 63 != 0;
        self.register <<= 1;
        self.bits_left -= 1;
        Ok(bit)
    }

    /// Read `n` bits, most significant first.
    pub fn read_bits(&mut self, n: u32) -> SalzResult<u64> {
        debug_assert!((1..=64).contains(&n));
        let mut n = n;
        let mut val = 0u64;
        while n > 0 {
            if self.bits_left == 0 {
                self.load_slot()?;
            }
            let take = n.min(self.bits_left);
            let chunk = self.register >> (64 - take);
            if take == 64 {
                self.register = 0;
                val = chunk;
            } else {
                self.register <<= take;
                val = (val << take) | chunk;
            }
            self.bits_left -= take;
            n -= take;
        }
        Ok(val)
    }

    /// Read one raw byte at the byte cursor.
    pub fn read_byte(&mut self) -> SalzResult<u8> {
        if self.pos >= self.data.len() {
            return Err(SalzError::Malformed);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Count zero bits up to the terminating one bit.
    pub fn read_unary(&mut self) -> SalzResult<u32> {
        let mut count = 0;
        while !self.read_bit()? {
            count += 1;
        }
        Ok(count)
    }

    /// Read a Golomb-Rice k=3 codeword.
    pub fn read_gr3(&mut self) -> SalzResult<u32> {
        let quotient = self.read_unary()?;
        if quotient > u32::MAX >> 3 {
            return Err(SalzError::Malformed);
        }
        let remainder = self.read_bits(3)? as u32;
        Ok((quotient << 3) | remainder)
    }

    /// Read a vnibble codeword.
    pub fn read_vnibble(&mut self) -> SalzResult<u32> {
        let mut nib = self.read_bits(4)?;
        let mut val = nib & 0x7;
        let mut nibbles = 1;
        while nib & 0x8 == 0 {
            if nibbles == vlc::VNIBBLE_MAX {
                return Err(SalzError::Malformed);
            }
            nib = self.read_bits(4)?;
            val = ((val + 1) << 3) | (nib & 0x7);
            nibbles += 1;
        }
        u32::try_from(val).map_err(|_| SalzError::Malformed)
    }

    /// True once every byte of the stream has been consumed.
    ///
    /// Leftover padding bits in the register do not count: each token in
    /// the format consumes exactly one raw byte, so byte exhaustion
    /// coincides with token exhaustion.
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }
}
