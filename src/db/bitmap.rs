use miette::{Result, miette};

/// One bit per schema field, least significant bit first.
///
/// Row encoding uses two of these: one marking which fields a row supplies and
/// one marking which supplied fields are null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBitmap {
    pub bytes: Vec<u8>,
}

impl FieldBitmap {
    pub fn new(num_fields: usize) -> Self {
        Self {
            bytes: vec![0u8; Self::byte_len(num_fields)],
        }
    }

    pub fn byte_len(num_fields: usize) -> usize {
        num_fields.div_ceil(8)
    }

    pub fn from_bytes(bytes: &[u8], num_fields: usize) -> Result<Self> {
        let expected_len = Self::byte_len(num_fields);
        if bytes.len() < expected_len {
            return Err(miette!(
                "Bitmap too short: expected {} byte(s), got {}",
                expected_len,
                bytes.len()
            ));
        }

        let bitmap = Self {
            bytes: bytes[0..expected_len].to_vec(),
        };

        // Bits past the last field must be clear.
        if let Some(stray) = (num_fields..expected_len * 8).find(|&i| bitmap.is_set(i)) {
            return Err(miette!("Bitmap has bit {stray} set past {num_fields} field(s)"));
        }

        Ok(bitmap)
    }

    pub fn set(&mut self, index: usize) {
        let byte_idx = index / 8;
        let bit_idx = index % 8;
        self.bytes[byte_idx] |= 1 << bit_idx;
    }

    pub fn is_set(&self, index: usize) -> bool {
        let byte_idx = index / 8;
        let bit_idx = index % 8;
        if byte_idx >= self.bytes.len() {
            return false;
        }
        (self.bytes[byte_idx] & (1 << bit_idx)) != 0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sizes_round_up() {
        assert_eq!(FieldBitmap::new(0).bytes.len(), 0);
        assert_eq!(FieldBitmap::new(8).bytes.len(), 1);
        assert_eq!(FieldBitmap::new(9).bytes.len(), 2);
    }

    #[test]
    fn test_set_and_query() {
        let mut bitmap = FieldBitmap::new(10);
        bitmap.set(0);
        bitmap.set(9);

        assert!(bitmap.is_set(0));
        assert!(!bitmap.is_set(1));
        assert!(bitmap.is_set(9));
        assert!(!bitmap.is_set(64));
        assert_eq!(bitmap.bytes, vec![0b0000_0001, 0b0000_0010]);
    }

    #[test]
    fn test_from_bytes_too_short() {
        assert!(FieldBitmap::from_bytes(&[0], 9).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_stray_bits() {
        assert!(FieldBitmap::from_bytes(&[0b1000_0000], 3).is_err());
        assert!(FieldBitmap::from_bytes(&[0b0000_0100], 3).is_ok());
    }
}
