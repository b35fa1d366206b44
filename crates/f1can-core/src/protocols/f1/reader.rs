use super::error::F1Error;
use super::header::PacketType;

/// Little-endian cursor over a buffer already cut to a fixed layout size.
///
/// Every read is bounded by the slice handed to [`F1Reader::bounded`], never
/// by a length taken from the payload itself.
pub struct F1Reader<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> F1Reader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }

    /// Restrict `payload` to the first `size` bytes of a `packet` layout.
    pub fn bounded(payload: &'a [u8], packet: PacketType, size: usize) -> Result<Self, F1Error> {
        let bounded = payload.get(..size).ok_or(F1Error::TooShort {
            packet,
            needed: size,
            actual: payload.len(),
        })?;
        Ok(Self::new(bounded))
    }

    pub fn require_len(&self, needed: usize) -> Result<(), F1Error> {
        if self.payload.len() < needed {
            return Err(F1Error::TruncatedBuffer {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, offset: usize) {
        self.pos = offset;
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], F1Error> {
        let end = self.pos.checked_add(N).ok_or(F1Error::TruncatedBuffer {
            needed: usize::MAX,
            actual: self.payload.len(),
        })?;
        let bytes = self
            .payload
            .get(self.pos..end)
            .ok_or(F1Error::TruncatedBuffer {
                needed: end,
                actual: self.payload.len(),
            })?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos = end;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, F1Error> {
        self.take().map(u8::from_le_bytes)
    }

    pub fn read_i8(&mut self) -> Result<i8, F1Error> {
        self.take().map(i8::from_le_bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, F1Error> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Result<i16, F1Error> {
        self.take().map(i16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32, F1Error> {
        self.take().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64, F1Error> {
        self.take().map(u64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32, F1Error> {
        self.take().map(f32::from_le_bytes)
    }

    pub fn read_u8_array<const N: usize>(&mut self) -> Result<[u8; N], F1Error> {
        self.take()
    }

    pub fn read_u16_array<const N: usize>(&mut self) -> Result<[u16; N], F1Error> {
        let mut out = [0u16; N];
        for value in out.iter_mut() {
            *value = self.read_u16()?;
        }
        Ok(out)
    }

    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N], F1Error> {
        let mut out = [0f32; N];
        for value in out.iter_mut() {
            *value = self.read_f32()?;
        }
        Ok(out)
    }
}
