//! [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells) container
use core::fmt::{self, Debug};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crc::Crc;
use tracing::{debug, trace, warn};

use crate::{
    BocError, Cell, DecoderConfig, MAX_REFS_COUNT, SerializeOptions, TailBits,
    bits::{
        BitReaderExt, ResultExt, Slice,
        bitvec::{order::Msb0, vec::BitVec, view::BitView},
    },
};

/// Alias to [`BagOfCells`]
pub type BoC = BagOfCells;

const CRC_32_ISCSI: Crc<u32> = Crc::<u32>::new(&crc::CRC_32_ISCSI);

/// Decoded [Bag Of Cells](https://docs.ton.org/develop/data-formats/cell-boc#bag-of-cells):
/// root cells plus every cell of the container in storage order.
///
/// ```rust
/// # use tonpeek_boc::{BagOfCells, BocError, Cell, DecoderConfig, SerializeOptions};
/// # fn main() -> Result<(), BocError> {
/// let mut builder = Cell::builder();
/// builder.store_uint(1234, 32)?;
///
/// let boc = BagOfCells::from_root(builder.into_cell());
/// let packed = boc.serialize(SerializeOptions {
///     has_index: false,
///     has_crc32c: true,
/// });
///
/// let unpacked = BagOfCells::decode(&packed, &DecoderConfig::default())?;
/// let got = unpacked.single_root().unwrap().parser().load_u64(32)?;
///
/// assert_eq!(got, 1234);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BagOfCells {
    roots: Vec<Arc<Cell>>,
    cells: Vec<Arc<Cell>>,
}

impl BagOfCells {
    /// ```tlb
    /// serialized_boc#b5ee9c72
    /// ```
    pub const GENERIC_BOC_TAG: u32 = 0xb5ee9c72;

    ///```tlb
    /// serialized_boc_idx#68ff65f3
    /// ```
    pub const INDEXED_BOC_TAG: u32 = 0x68ff65f3;

    /// Create from single root cell
    #[inline]
    pub fn from_root(root: impl Into<Arc<Cell>>) -> Self {
        Self::from_roots([root.into()])
    }

    /// Create from given roots, collecting all reachable cells
    pub fn from_roots(roots: impl IntoIterator<Item = Arc<Cell>>) -> Self {
        let roots: Vec<_> = roots.into_iter().collect();
        let cells = ordered_cells(&roots);
        Self { roots, cells }
    }

    #[inline]
    pub fn roots(&self) -> &[Arc<Cell>] {
        &self.roots
    }

    /// All cells of the container, each distinct cell once
    #[inline]
    pub fn cells(&self) -> &[Arc<Cell>] {
        &self.cells
    }

    /// Return single root or `None` otherwise
    #[inline]
    pub fn single_root(&self) -> Option<&Arc<Cell>> {
        let [root]: &[_; 1] = self.roots.as_slice().try_into().ok()?;
        Some(root)
    }

    /// Decode container from bytes
    ///
    /// ```tlb
    /// serialized_boc#b5ee9c72 has_idx:(## 1) has_crc32c:(## 1)
    ///   has_cache_bits:(## 1) flags:(## 2) { flags = 0 }
    ///   size:(## 3) { size <= 4 }
    ///   off_bytes:(## 8) { off_bytes <= 8 }
    ///   cells:(##(size * 8))
    ///   roots:(##(size * 8)) { roots >= 1 }
    ///   absent:(##(size * 8)) { roots + absent <= cells }
    ///   tot_cells_size:(##(off_bytes * 8))
    ///   root_list:(roots * ##(size * 8))
    ///   index:has_idx?(cells * ##(off_bytes * 8))
    ///   cell_data:(tot_cells_size * [ uint8 ])
    ///   crc32c:has_crc32c?uint32
    ///   = BagOfCells;
    /// ```
    ///
    /// Containers tagged `0x68ff65f3` are read with the same flags layout.
    pub fn decode(bytes: impl AsRef<[u8]>, config: &DecoderConfig) -> Result<Self, BocError> {
        RawBagOfCells::parse(bytes.as_ref(), config)?.link()
    }

    /// Shortcut for [`decode`](BagOfCells::decode) with default
    /// [`DecoderConfig`]
    #[inline]
    pub fn deserialize(bytes: impl AsRef<[u8]>) -> Result<Self, BocError> {
        Self::decode(bytes, &DecoderConfig::default())
    }

    /// Parse hexadecimal string
    #[inline]
    pub fn parse_hex(s: impl AsRef<[u8]>) -> Result<Self, BocError> {
        hex::decode(s)
            .map_err(|err| BocError::InvalidEncoding(err.to_string()))
            .and_then(Self::deserialize)
    }

    /// Parse base64-encoded string
    #[cfg(feature = "base64")]
    #[inline]
    pub fn parse_base64(s: impl AsRef<[u8]>) -> Result<Self, BocError> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        STANDARD
            .decode(s)
            .map_err(|err| BocError::InvalidEncoding(err.to_string()))
            .and_then(Self::deserialize)
    }

    /// Encode roots and every cell reachable from them. Cells are written
    /// parents first, so all references point forward.
    pub fn serialize(&self, options: SerializeOptions) -> Vec<u8> {
        let cells = ordered_cells(&self.roots);
        let indices: HashMap<*const Cell, usize> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (Arc::as_ptr(cell), i))
            .collect();

        let size_bytes = byte_len(cells.len() as u64);
        let cell_sizes: Vec<usize> = cells
            .iter()
            .map(|cell| 2 + cell.bit_len().div_ceil(8) + cell.references.len() * size_bytes)
            .collect();
        let tot_cells_size: usize = cell_sizes.iter().sum();
        let off_bytes = byte_len(tot_cells_size as u64);

        let mut buf = Vec::with_capacity(tot_cells_size + 32);
        // serialized_boc#b5ee9c72
        buf.extend_from_slice(&Self::GENERIC_BOC_TAG.to_be_bytes());
        // has_idx has_crc32c has_cache_bits flags size
        buf.push(
            (u8::from(options.has_index) << 7)
                | (u8::from(options.has_crc32c) << 6)
                | size_bytes as u8,
        );
        // off_bytes
        buf.push(off_bytes as u8);
        // cells roots absent
        put_uint(&mut buf, cells.len() as u64, size_bytes);
        put_uint(&mut buf, self.roots.len() as u64, size_bytes);
        put_uint(&mut buf, 0, size_bytes);
        // tot_cells_size
        put_uint(&mut buf, tot_cells_size as u64, off_bytes);
        // root_list
        for root in &self.roots {
            put_uint(&mut buf, indices[&Arc::as_ptr(root)] as u64, size_bytes);
        }
        if options.has_index {
            // index: end offset of every cell
            let mut offset = 0;
            for size in &cell_sizes {
                offset += size;
                put_uint(&mut buf, offset as u64, off_bytes);
            }
        }
        // cell_data
        for cell in &cells {
            buf.push(cell.refs_descriptor());
            buf.push(cell.bits_descriptor());
            buf.extend_from_slice(&cell.padded_data());
            for r in &cell.references {
                put_uint(&mut buf, indices[&Arc::as_ptr(r)] as u64, size_bytes);
            }
        }
        // crc32c
        if options.has_crc32c {
            let cs = CRC_32_ISCSI.checksum(&buf);
            buf.extend_from_slice(&cs.to_le_bytes());
        }
        buf
    }
}

impl Debug for BagOfCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(&self.roots).finish()
    }
}

impl TryFrom<Vec<u8>> for BagOfCells {
    type Error = BocError;

    #[inline]
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::deserialize(value)
    }
}

/// Cells reachable from `roots`, each once, parents before children
fn ordered_cells(roots: &[Arc<Cell>]) -> Vec<Arc<Cell>> {
    let mut visited: HashSet<*const Cell> = HashSet::new();
    let mut post_order = Vec::new();
    let mut stack: Vec<(Arc<Cell>, bool)> = roots.iter().map(|r| (r.clone(), false)).collect();

    while let Some((cell, expanded)) = stack.pop() {
        if expanded {
            post_order.push(cell);
            continue;
        }
        if !visited.insert(Arc::as_ptr(&cell)) {
            continue;
        }
        stack.push((cell.clone(), true));
        stack.extend(cell.references.iter().map(|r| (r.clone(), false)));
    }

    post_order.reverse();
    post_order
}

/// Minimal number of bytes to store `value`, at least one
#[inline]
fn byte_len(value: u64) -> usize {
    ((64 - value.leading_zeros() as usize).div_ceil(8)).max(1)
}

#[inline]
fn put_uint(buf: &mut Vec<u8>, value: u64, bytes: usize) {
    buf.extend_from_slice(&value.to_be_bytes()[8 - bytes..]);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawBagOfCells {
    cells: Vec<RawCell>,
    roots: Vec<usize>,
}

impl RawBagOfCells {
    fn parse(bytes: &[u8], config: &DecoderConfig) -> Result<Self, BocError> {
        let bits = bytes.view_bits::<Msb0>();
        let mut reader = Slice::new(bits);

        let tag = reader.read_u32().context("magic")?;
        if tag != BagOfCells::GENERIC_BOC_TAG && tag != BagOfCells::INDEXED_BOC_TAG {
            return Err(BocError::UnsupportedMagic(tag));
        }
        // has_idx:(## 1) has_crc32c:(## 1) has_cache_bits:(## 1) flags:(## 2) size:(## 3)
        let flags = reader.read_u8().context("flags")?;
        let has_idx = flags & 0b1000_0000 != 0;
        let has_crc32c = flags & 0b0100_0000 != 0;
        if flags & 0b0010_0000 != 0 {
            return Err(BocError::UnsupportedCacheBits);
        }
        let size_bytes = flags & 0b111;
        if !(1..=4).contains(&size_bytes) {
            return Err(BocError::InvalidRefSize(size_bytes));
        }
        let size_bytes = size_bytes as usize;
        // off_bytes:(## 8) { off_bytes <= 8 }
        let off_bytes = reader.read_u8().context("off_bytes")?;
        if !(1..=8).contains(&off_bytes) {
            return Err(BocError::InvalidOffsetSize(off_bytes));
        }
        let off_bytes = off_bytes as usize;

        // cells:(##(size * 8))
        let cells = reader.read_uint_bytes(size_bytes).context("cells")?;
        // roots:(##(size * 8))
        let roots = reader.read_uint_bytes(size_bytes).context("roots")?;
        // absent:(##(size * 8))
        let absent = reader.read_uint_bytes(size_bytes).context("absent")?;
        if absent != 0 {
            return Err(BocError::UnsupportedAbsentCells(absent));
        }
        if cells > config.max_cell_count as u64 {
            return Err(BocError::TooManyCells {
                count: cells,
                max: config.max_cell_count,
            });
        }
        if roots > cells {
            return Err(BocError::TooManyRoots { roots, cells });
        }
        let cell_count = cells as usize;
        // tot_cells_size:(##(off_bytes * 8))
        let tot_cells_size = reader.read_uint_bytes(off_bytes).context("tot_cells_size")?;

        debug!(
            tag = format_args!("{tag:#010x}"),
            has_idx, has_crc32c, size_bytes, off_bytes, cells, roots, tot_cells_size, "BoC header"
        );

        // root_list:(roots * ##(size * 8))
        let root_list = (0..roots)
            .map(|_| {
                let index = reader.read_uint_bytes(size_bytes).context("root_list")?;
                if index >= cells {
                    return Err(BocError::InvalidRootIndex {
                        index,
                        count: cell_count,
                    });
                }
                Ok(index as usize)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if has_idx {
            // index:has_idx?(cells * ##(off_bytes * 8))
            reader
                .skip_bits(cell_count.saturating_mul(off_bytes * 8))
                .context("index")?;
        }

        // cell_data:(tot_cells_size * [ uint8 ])
        let cell_data_start = reader.position();
        let cell_data_bits = usize::try_from(tot_cells_size)
            .ok()
            .and_then(|n| n.checked_mul(8))
            .unwrap_or(usize::MAX);
        reader.skip_bits(cell_data_bits).context("cell_data")?;
        let mut cell_data = Slice::new(&bits[cell_data_start..reader.position()]);

        let cells = (0..cell_count)
            .map(|index| RawCell::parse(&mut cell_data, index, size_bytes, config.tail_bits))
            .collect::<Result<Vec<_>, _>>()?;
        if !cell_data.is_empty() {
            return Err(BocError::TrailingData(cell_data.remaining_bits() / 8));
        }

        if has_crc32c {
            // crc32c:has_crc32c?uint32
            let crc_start = reader.position() / 8;
            let expected = u32::from_le_bytes(reader.read_bytes_array().context("crc32c")?);
            if config.verify_crc32 {
                let actual = CRC_32_ISCSI.checksum(&bytes[..crc_start]);
                if actual != expected {
                    return Err(BocError::ChecksumMismatch { expected, actual });
                }
            }
        }
        if !reader.is_empty() {
            warn!(
                bytes = reader.remaining_bits() / 8,
                "ignoring trailing bytes after BoC"
            );
        }

        Ok(Self {
            cells,
            roots: root_list,
        })
    }

    /// Wires references by index, building every cell after all of its
    /// children, so references may point in any direction.
    fn link(self) -> Result<BagOfCells, BocError> {
        let count = self.cells.len();
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut pending: Vec<usize> = Vec::with_capacity(count);
        for (index, cell) in self.cells.iter().enumerate() {
            for &r in &cell.references {
                if r >= count as u64 {
                    return Err(BocError::InvalidReference {
                        index,
                        reference: r,
                        count,
                    });
                }
                parents[r as usize].push(index);
            }
            pending.push(cell.references.len());
        }

        let mut ready: Vec<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
        let mut raw: Vec<Option<RawCell>> = self.cells.into_iter().map(Some).collect();
        let mut linked: Vec<Option<Arc<Cell>>> = vec![None; count];

        while let Some(index) = ready.pop() {
            let Some(RawCell {
                data,
                references,
                exotic,
            }) = raw[index].take()
            else {
                continue;
            };
            let references = references
                .into_iter()
                .map(|r| linked[r as usize].clone().ok_or(BocError::ReferenceCycle))
                .collect::<Result<Vec<_>, _>>()?;
            linked[index] = Some(Arc::new(Cell {
                data,
                references,
                exotic,
            }));
            for &parent in &parents[index] {
                pending[parent] -= 1;
                if pending[parent] == 0 {
                    ready.push(parent);
                }
            }
        }

        let cells = linked
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(BocError::ReferenceCycle)?;
        trace!(cells = cells.len(), "linked BoC cells");

        Ok(BagOfCells {
            roots: self.roots.into_iter().map(|r| cells[r].clone()).collect(),
            cells,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RawCell {
    data: BitVec<u8, Msb0>,
    references: Vec<u64>,
    exotic: bool,
}

impl RawCell {
    fn parse(
        reader: &mut Slice<'_>,
        index: usize,
        size_bytes: usize,
        tail_bits: TailBits,
    ) -> Result<Self, BocError> {
        let refs_descriptor = reader.read_u8().with_context(|| format!("[{index}]"))?;
        let exotic = refs_descriptor & 0b1000 != 0;
        let ref_num = (refs_descriptor & 0b111) as usize;
        if ref_num > MAX_REFS_COUNT {
            return Err(BocError::TooManyReferences(ref_num));
        }

        let bits_descriptor = reader.read_u8().with_context(|| format!("[{index}]"))?;
        let data_bytes = (bits_descriptor >> 1) as usize;
        let has_tail = bits_descriptor & 1 == 1;

        let data = match (has_tail, tail_bits) {
            (false, _) => BitVec::from_vec(
                reader
                    .read_bytes_vec(data_bytes)
                    .with_context(|| format!("[{index}]: data"))?,
            ),
            (true, TailBits::Marker) => {
                let bytes = reader
                    .read_bytes_vec(data_bytes + 1)
                    .with_context(|| format!("[{index}]: data"))?;
                let tail = bytes.last().copied().unwrap_or_default();
                if tail == 0 {
                    return Err(BocError::InvalidTailByte { index, tail });
                }
                let len = bytes.len() * 8 - tail.trailing_zeros() as usize - 1;
                let mut data = BitVec::from_vec(bytes);
                data.truncate(len);
                data
            }
            (true, TailBits::Literal) => {
                let bytes = reader
                    .read_bytes_vec(data_bytes)
                    .with_context(|| format!("[{index}]: data"))?;
                let tail = reader.read_u8().with_context(|| format!("[{index}]: tail"))?;
                let len = (data_bytes * 8)
                    .checked_sub(tail as usize)
                    .ok_or(BocError::InvalidTailByte { index, tail })?;
                let mut data = BitVec::from_vec(bytes);
                data.truncate(len);
                data
            }
        };

        let references = (0..ref_num)
            .map(|_| reader.read_uint_bytes(size_bytes))
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("[{index}]: references"))?;

        trace!(index, bits = data.len(), refs = ?references, exotic, "raw cell");

        Ok(Self {
            data,
            references,
            exotic,
        })
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use rstest::rstest;

    use crate::tests::{STARS_PURCHASE, cell};

    use super::*;

    fn tree() -> BagOfCells {
        let shared = Arc::new(cell(0xAB, 8, []));
        let left = Arc::new(cell(0b101, 3, [shared.clone()]));
        let right = Arc::new(cell(0x1234, 16, [shared.clone(), Arc::new(Cell::new())]));
        let root = cell(0xDEADBEEF, 32, [left, right.clone()]);
        BagOfCells::from_roots([Arc::new(root), right])
    }

    #[rstest]
    fn round_trip(#[values(false, true)] has_index: bool, #[values(false, true)] has_crc32c: bool) {
        let boc = tree();
        let packed = boc.serialize(SerializeOptions {
            has_index,
            has_crc32c,
        });

        let unpacked = BagOfCells::decode(&packed, &DecoderConfig::default()).unwrap();

        assert_eq!(unpacked.roots(), boc.roots());
        assert_eq!(unpacked.cells().len(), 5);
        assert_eq!(unpacked.cells(), boc.cells());
    }

    #[test]
    fn shared_cells_stay_shared() {
        let boc = BagOfCells::deserialize(tree().serialize(SerializeOptions::default())).unwrap();
        let [root, right] = boc.roots() else {
            panic!("expected two roots");
        };

        assert!(Arc::ptr_eq(&root.references[1], right));
        assert!(Arc::ptr_eq(
            &root.references[0].references[0],
            &right.references[0]
        ));
    }

    #[test]
    fn canonical_bytes() {
        let boc = BagOfCells::from_root(cell(0x0000000F, 32, []));

        assert_eq!(
            boc.serialize(SerializeOptions::default()),
            hex!("b5ee9c72 01 01 01 01 00 06 00 0008 0000000f")
        );
    }

    #[rstest]
    #[case::magic(&hex!("deadbeef 01"), BocError::UnsupportedMagic(0xdeadbeef))]
    #[case::cache_bits(&hex!("b5ee9c72 21 01"), BocError::UnsupportedCacheBits)]
    #[case::zero_ref_size(&hex!("b5ee9c72 00 01"), BocError::InvalidRefSize(0))]
    #[case::wide_ref_size(&hex!("b5ee9c72 05 01"), BocError::InvalidRefSize(5))]
    #[case::zero_off_bytes(&hex!("b5ee9c72 01 00"), BocError::InvalidOffsetSize(0))]
    #[case::wide_off_bytes(&hex!("b5ee9c72 01 09"), BocError::InvalidOffsetSize(9))]
    #[case::absent(&hex!("b5ee9c72 01 01 02 01 01"), BocError::UnsupportedAbsentCells(1))]
    #[case::roots(&hex!("b5ee9c72 01 01 02 03 00"), BocError::TooManyRoots { roots: 3, cells: 2 })]
    #[case::root_index(
        &hex!("b5ee9c72 01 01 01 01 00 02 01 0000"),
        BocError::InvalidRootIndex { index: 1, count: 1 },
    )]
    #[case::reference(
        &hex!("b5ee9c72 01 01 01 01 00 03 00 010005"),
        BocError::InvalidReference { index: 0, reference: 5, count: 1 },
    )]
    #[case::self_reference(
        &hex!("b5ee9c72 01 01 01 01 00 03 00 010000"),
        BocError::ReferenceCycle,
    )]
    #[case::cycle(
        &hex!("b5ee9c72 01 01 02 01 00 06 00 010001 010000"),
        BocError::ReferenceCycle,
    )]
    #[case::trailing_cell_data(
        &hex!("b5ee9c72 01 01 01 01 00 04 00 000200ff"),
        BocError::TrailingData(1),
    )]
    #[case::zero_tail(
        &hex!("b5ee9c72 01 01 01 01 00 03 00 000100"),
        BocError::InvalidTailByte { index: 0, tail: 0 },
    )]
    #[case::too_many_refs(
        &hex!("b5ee9c72 01 01 01 01 00 02 00 0500"),
        BocError::TooManyReferences(5),
    )]
    fn malformed(#[case] bytes: &[u8], #[case] expected: BocError) {
        assert_eq!(BagOfCells::deserialize(bytes).unwrap_err(), expected);
    }

    #[rstest]
    #[case::header(&hex!("b5ee9c72 01 01 01"))]
    #[case::cell_data(&hex!("b5ee9c72 01 01 01 01 00 06 00 0008 00"))]
    #[case::cell_outside_region(&hex!("b5ee9c72 01 01 01 01 00 02 00 0008 0000000f"))]
    #[case::crc(&hex!("b5ee9c72 41 01 01 01 00 02 00 0000 aabb"))]
    fn truncated(#[case] bytes: &[u8]) {
        assert!(matches!(
            BagOfCells::deserialize(bytes).unwrap_err(),
            BocError::Truncated(_)
        ));
    }

    #[test]
    fn too_many_cells() {
        let packed = tree().serialize(SerializeOptions::default());
        let config = DecoderConfig {
            max_cell_count: 4,
            ..Default::default()
        };

        assert_eq!(
            BagOfCells::decode(packed, &config).unwrap_err(),
            BocError::TooManyCells { count: 5, max: 4 }
        );
    }

    #[test]
    fn checksum() {
        let mut packed = tree().serialize(SerializeOptions {
            has_index: false,
            has_crc32c: true,
        });
        let last = packed.len() - 1;
        packed[last] ^= 0xFF;

        assert!(matches!(
            BagOfCells::deserialize(&packed).unwrap_err(),
            BocError::ChecksumMismatch { .. }
        ));

        let config = DecoderConfig {
            verify_crc32: false,
            ..Default::default()
        };
        assert_eq!(
            BagOfCells::decode(&packed, &config).unwrap().roots(),
            tree().roots()
        );
    }

    #[test]
    fn backward_reference() {
        let boc = BagOfCells::deserialize(hex!("b5ee9c72 01 01 02 01 00 06 01 0002ab 010000")).unwrap();
        let root = boc.single_root().unwrap();

        assert_eq!(root.bit_len(), 0);
        assert_eq!(root.references[0].parser().load_u64(8).unwrap(), 0xAB);
        assert!(Arc::ptr_eq(&root.references[0], &boc.cells()[0]));
    }

    #[test]
    fn indexed_tag() {
        let boc = BagOfCells::deserialize(hex!("68ff65f3 01 01 01 01 00 02 00 0000")).unwrap();

        assert!(boc.single_root().unwrap().is_empty());
    }

    #[test]
    fn trailing_bytes_ignored() {
        let boc = BagOfCells::deserialize(hex!("b5ee9c72 01 01 01 01 00 02 00 0000 ffff")).unwrap();

        assert_eq!(boc.cells().len(), 1);
    }

    #[rstest]
    #[case::marker(TailBits::Marker, &hex!("b5ee9c72 01 01 01 01 00 03 00 0001b0"))]
    #[case::literal(TailBits::Literal, &hex!("b5ee9c72 01 01 01 01 00 04 00 0003a805"))]
    fn tail_rule(#[case] tail_bits: TailBits, #[case] bytes: &[u8]) {
        let config = DecoderConfig {
            tail_bits,
            ..Default::default()
        };
        let boc = BagOfCells::decode(bytes, &config).unwrap();
        let root = boc.single_root().unwrap();

        assert_eq!(root.bit_len(), 3);
        assert_eq!(root.parser().load_u64(3).unwrap(), 0b101);
    }

    #[test]
    fn literal_tail_too_large() {
        let config = DecoderConfig {
            tail_bits: TailBits::Literal,
            ..Default::default()
        };

        assert_eq!(
            BagOfCells::decode(hex!("b5ee9c72 01 01 01 01 00 04 00 0003a809"), &config).unwrap_err(),
            BocError::InvalidTailByte { index: 0, tail: 9 }
        );
    }

    #[test]
    fn parse_hex() {
        let boc = BagOfCells::parse_hex("b5ee9c720101010100060000080000000f").unwrap();

        assert_eq!(boc.single_root().unwrap().parser().load_u64(32).unwrap(), 0x0F);
        assert!(matches!(
            BagOfCells::parse_hex("b5ee9c72z").unwrap_err(),
            BocError::InvalidEncoding(_)
        ));
    }

    #[test]
    fn stars_purchase() {
        let boc = BagOfCells::parse_base64(STARS_PURCHASE).unwrap();

        assert_eq!(boc.cells().len(), 10);
        assert_eq!(
            boc.cells().iter().map(|c| c.bit_len()).collect::<Vec<_>>(),
            [724, 2, 520, 65, 901, 7, 712, 1001, 626, 445]
        );
        let root = boc.single_root().unwrap();
        assert_eq!(root.references.len(), 3);
        assert!(Arc::ptr_eq(root, &boc.cells()[0]));
        assert!(Arc::ptr_eq(&root.references[2].references[0], &boc.cells()[8]));
        assert_eq!(
            root.hash(),
            Some(hex!(
                "d125dd30459742c17405cb6d6771d28e82ad33e38ef59d6646d265d299f5e0a6"
            ))
        );

        let literal = DecoderConfig {
            tail_bits: TailBits::Literal,
            ..Default::default()
        };
        let bytes = {
            use base64::{Engine, engine::general_purpose::STANDARD};
            STANDARD.decode(STARS_PURCHASE).unwrap()
        };
        assert!(matches!(
            BagOfCells::decode(bytes, &literal).unwrap_err(),
            BocError::InvalidTailByte { .. }
        ));
    }
}
