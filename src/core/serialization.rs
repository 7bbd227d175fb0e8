/// Internal trait for serializing fixed-size data structures to bytes.
///
/// Used by the row codec for cells whose width is known at compile time.
pub(crate) trait Serializable<const N: usize>: Sized {
    /// Convert this value to a fixed-size byte array.
    fn to_bytes(&self) -> [u8; N];

    /// Reconstruct this value from a fixed-size byte array.
    fn from_bytes(data: [u8; N]) -> Self;
}

/// An INT cell as it exists on disk.
///
/// NULL and `0` share the all-zero encoding, so decoding zero always gives
/// `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IntCell(pub Option<u64>);

impl Serializable<8> for IntCell {
    fn to_bytes(&self) -> [u8; 8] {
        self.0.unwrap_or(0).to_le_bytes()
    }

    fn from_bytes(data: [u8; 8]) -> Self {
        match u64::from_le_bytes(data) {
            0 => Self(None),
            n => Self(Some(n)),
        }
    }
}
