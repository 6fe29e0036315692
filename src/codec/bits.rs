use crate::codec::CodecError;

/// MSB-first bit sink over a growable byte buffer.
pub struct BitWriter {
    buf: Vec<u8>,
    acc: u8,
    used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        BitWriter {
            buf: Vec::new(),
            acc: 0,
            used: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.acc = (self.acc << 1) | bit as u8;
        self.used += 1;
        if self.used == 8 {
            self.buf.push(self.acc);
            self.acc = 0;
            self.used = 0;
        }
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, bits: u8) {
        debug_assert!(bits <= 32);
        for shift in (0..bits).rev() {
            self.write_bit(value >> shift & 1 == 1);
        }
    }

    /// Elias gamma code; `value` must be ≥ 1.
    pub fn write_gamma(&mut self, value: u32) {
        debug_assert!(value >= 1);
        let n = (32 - value.leading_zeros()) as u8;
        for _ in 1..n {
            self.write_bit(false);
        }
        self.write_bits(value, n);
    }

    /// Pads the current byte with zero bits and returns the buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.used > 0 {
            self.buf.push(self.acc << (8 - self.used));
        }
        self.buf
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        BitWriter::new()
    }
}

/// MSB-first bit source over a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    byte: usize,
    bit: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Index of the next unread byte, rounding a partial byte up.
    pub fn byte_pos(&self) -> usize {
        self.byte + (self.bit > 0) as usize
    }

    /// Skips to the next byte boundary.
    pub fn align(&mut self) {
        if self.bit > 0 {
            self.byte += 1;
            self.bit = 0;
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, CodecError> {
        let Some(&b) = self.data.get(self.byte) else {
            return Err(CodecError::UnexpectedEof { at_byte: self.byte });
        };
        let bit = b >> (7 - self.bit) & 1 == 1;
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.byte += 1;
        }
        Ok(bit)
    }

    pub fn read_bits(&mut self, bits: u8) -> Result<u32, CodecError> {
        debug_assert!(bits <= 32);
        let mut value = 0u32;
        for _ in 0..bits {
            value = value << 1 | self.read_bit()? as u32;
        }
        Ok(value)
    }

    pub fn read_gamma(&mut self) -> Result<u32, CodecError> {
        let mut zeros = 0u32;
        while !self.read_bit()? {
            zeros += 1;
            if zeros > 31 {
                return Err(CodecError::GammaOverflow { bits: zeros + 1 });
            }
        }
        let rest = self.read_bits(zeros as u8)?;
        Ok(1 << zeros | rest)
    }
}
