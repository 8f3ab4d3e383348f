/// Bytes per sample on the wire (little-endian i16).
pub const BYTES_PER_SAMPLE: usize = 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed packet: {actual} bytes, expected {expected}")]
pub struct PacketSizeError {
    pub actual: usize,
    pub expected: usize,
}

/// One datagram worth of signed 16-bit samples.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleBlock {
    samples: Vec<i16>,
}

impl SampleBlock {
    /// Decode a payload of `block_size` little-endian i16 samples.
    /// Any other payload length is rejected.
    pub fn from_le_bytes(payload: &[u8], block_size: usize) -> Result<Self, PacketSizeError> {
        let expected = block_size * BYTES_PER_SAMPLE;
        if payload.len() != expected {
            return Err(PacketSizeError {
                actual: payload.len(),
                expected,
            });
        }

        let samples = payload
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

impl From<Vec<i16>> for SampleBlock {
    fn from(samples: Vec<i16>) -> Self {
        Self { samples }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian() {
        let payload = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0xff, 0x7f];
        let block = SampleBlock::from_le_bytes(&payload, 4).unwrap();
        assert_eq!(block.samples(), &[1, -1, i16::MIN, i16::MAX]);
    }

    #[test]
    fn rejects_short_and_long_payloads() {
        let err = SampleBlock::from_le_bytes(&[0u8; 6], 4).unwrap_err();
        assert_eq!(err, PacketSizeError { actual: 6, expected: 8 });

        let err = SampleBlock::from_le_bytes(&[0u8; 9], 4).unwrap_err();
        assert_eq!(err.actual, 9);

        assert!(SampleBlock::from_le_bytes(&[], 4).is_err());
    }
}
