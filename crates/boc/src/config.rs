/// How the low bit of the bits descriptor and the last data byte of a cell
/// determine its bit length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TailBits {
    /// Last data byte carries a completion tag: its lowest set bit marks the
    /// end of the data and is stripped together with the zeros after it.
    #[default]
    Marker,
    /// An extra byte after the data holds the number of unused bits at the
    /// end of the data: `bits = data_bytes * 8 - tail`.
    Literal,
}

/// Arguments for [`BagOfCells::decode`](crate::BagOfCells::decode)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Upper bound on the declared number of cells
    pub max_cell_count: usize,
    /// Verify CRC32C trailer when the container has one
    pub verify_crc32: bool,
    pub tail_bits: TailBits,
}

impl DecoderConfig {
    pub const DEFAULT_MAX_CELL_COUNT: usize = 1 << 16;
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_cell_count: Self::DEFAULT_MAX_CELL_COUNT,
            verify_crc32: true,
            tail_bits: TailBits::default(),
        }
    }
}

/// Arguments for [`BagOfCells::serialize`](crate::BagOfCells::serialize)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub has_index: bool,
    pub has_crc32c: bool,
}
