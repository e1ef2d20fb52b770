//! Bag of Cells (BoC) serialization and deserialization.
//!
//! BoC is the byte-level envelope a cell tree travels in: message bodies go
//! to the transport as BoC blobs, and deployed contract state comes back as
//! one. Only the generic single-root format is handled here, which is all
//! the wallet flows produce.

use crate::tvm::cell::Cell;
use anyhow::{Result, bail};
use log::trace;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// BoC magic number for the generic format
const BOC_GENERIC_MAGIC: u32 = 0xb5ee9c72;

/// Serializes a cell tree into BoC bytes, optionally with a CRC32 trailer.
pub fn serialize_boc(root: &Arc<Cell>, has_crc32: bool) -> Result<Vec<u8>> {
    // Topological order, deduplicated by representation hash
    let cells = collect_cells(root);

    let root_index = cells
        .iter()
        .position(|cell| cell.hash() == root.hash())
        .ok_or_else(|| anyhow::anyhow!("Root cell not found in collected cells"))?;

    // Index every cell first: parents precede their children in the
    // topological order, so serializing in the same pass would look up
    // child hashes before they are mapped.
    let mut cell_map = HashMap::new();
    for (idx, cell) in cells.iter().enumerate() {
        cell_map.insert(cell.hash(), idx);
    }

    let size_bytes = bytes_needed(cells.len());
    let mut serialized_cells = Vec::new();
    for cell in &cells {
        serialized_cells.push(serialize_cell(cell, &cell_map, size_bytes)?);
    }

    let cells_size: usize = serialized_cells.iter().map(|c| c.len()).sum();
    let offset_bytes = bytes_needed(cells_size);

    let mut result = Vec::new();
    result.extend_from_slice(&BOC_GENERIC_MAGIC.to_be_bytes());

    let flags = if has_crc32 { 0x40u8 } else { 0 };
    result.push(flags | size_bytes as u8);
    result.push(offset_bytes as u8);

    write_uint(&mut result, cells.len(), size_bytes);
    write_uint(&mut result, 1, size_bytes); // root count
    write_uint(&mut result, 0, size_bytes); // absent count
    write_uint(&mut result, cells_size, offset_bytes);
    write_uint(&mut result, root_index, size_bytes);

    for cell_data in serialized_cells {
        result.extend_from_slice(&cell_data);
    }

    if has_crc32 {
        let crc = crate::crc::CRC32.checksum(&result);
        result.extend_from_slice(&crc.to_le_bytes());
    }

    Ok(result)
}

/// Deserializes BoC bytes into the root cell.
pub fn deserialize_boc(data: &[u8]) -> Result<Arc<Cell>> {
    if data.len() < 4 {
        bail!("BoC data too short");
    }

    let magic = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
    if magic != BOC_GENERIC_MAGIC {
        bail!("Invalid BoC magic number: 0x{:08x}", magic);
    }

    let mut pos = 4;

    if pos >= data.len() {
        bail!("Unexpected end of BoC data");
    }
    let flags_and_size = data[pos];
    pos += 1;

    let has_crc32 = (flags_and_size & 0x40) != 0;
    let size_bytes = (flags_and_size & 0x07) as usize;
    if size_bytes == 0 || size_bytes > 8 {
        bail!("Invalid size_bytes: {}", size_bytes);
    }

    if pos >= data.len() {
        bail!("Unexpected end of BoC data");
    }
    let offset_bytes = data[pos] as usize;
    pos += 1;
    if offset_bytes == 0 || offset_bytes > 8 {
        bail!("Invalid offset_bytes: {}", offset_bytes);
    }

    let cells_count = read_uint(data, &mut pos, size_bytes)?;
    let roots_count = read_uint(data, &mut pos, size_bytes)?;
    if roots_count != 1 {
        bail!("Multiple roots not supported");
    }
    let _absent_count = read_uint(data, &mut pos, size_bytes)?;
    let cells_size = read_uint(data, &mut pos, offset_bytes)?;
    let root_idx = read_uint(data, &mut pos, size_bytes)?;

    trace!("BoC header: {cells_count} cells, {cells_size} bytes, root {root_idx}");

    let cells_start = pos;
    let cells_end = cells_start + cells_size;
    if cells_end > data.len() - if has_crc32 { 4 } else { 0 } {
        bail!("Invalid cells size");
    }

    if has_crc32 {
        if data.len() < cells_end + 4 {
            bail!("Missing CRC32");
        }
        let expected_crc = u32::from_le_bytes([
            data[cells_end],
            data[cells_end + 1],
            data[cells_end + 2],
            data[cells_end + 3],
        ]);
        let actual_crc = crate::crc::CRC32.checksum(&data[..cells_end]);
        if expected_crc != actual_crc {
            bail!(
                "CRC32 mismatch: expected 0x{:08x}, got 0x{:08x}",
                expected_crc,
                actual_crc
            );
        }
    }

    let cells = parse_cells(&data[cells_start..cells_end], cells_count, size_bytes)?;
    if root_idx >= cells.len() {
        bail!("Invalid root index: {}", root_idx);
    }
    Ok(cells[root_idx].clone())
}

fn parse_cells(data: &[u8], count: usize, size_bytes: usize) -> Result<Vec<Arc<Cell>>> {
    let mut raw_cells = Vec::with_capacity(count);
    let mut pos = 0;

    // First pass: data bytes, bit lengths and reference indices
    for _ in 0..count {
        if pos + 2 > data.len() {
            bail!("Unexpected end of cells data");
        }
        let d1 = data[pos];
        let d2 = data[pos + 1];
        pos += 2;

        let ref_count = (d1 & 0x07) as usize;
        if d1 & 0x08 != 0 {
            bail!("Exotic cells are not supported");
        }

        // d2 = floor(b/8) + ceil(b/8); odd means a padded partial last byte
        let data_size = (d2 as usize + 1) / 2;
        if pos + data_size > data.len() {
            bail!("Cell data exceeds buffer");
        }
        let cell_data = data[pos..pos + data_size].to_vec();
        pos += data_size;

        let bit_len = if d2 % 2 == 0 {
            data_size * 8
        } else {
            // Strip the completion tag: lowest set bit of the last byte
            let last_byte = cell_data[data_size - 1];
            if last_byte == 0 {
                bail!("Missing completion tag in padded cell");
            }
            data_size * 8 - last_byte.trailing_zeros() as usize - 1
        };

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            // Reference indices are size_bytes wide, same as the header counts
            refs.push(read_uint(data, &mut pos, size_bytes)?);
        }

        raw_cells.push((cell_data, bit_len, refs));
    }

    // Second pass, back to front: children always follow their parents in
    // the serialized order, so they resolve before the parent is built.
    let mut cells: Vec<Option<Arc<Cell>>> = vec![None; count];
    for (i, (cell_data, bit_len, refs)) in raw_cells.into_iter().enumerate().rev() {
        let mut references = Vec::with_capacity(refs.len());
        for ref_idx in refs {
            if ref_idx <= i || ref_idx >= count {
                bail!("Invalid reference index: {}", ref_idx);
            }
            match &cells[ref_idx] {
                Some(child) => references.push(child.clone()),
                None => bail!("Unresolved reference index: {}", ref_idx),
            }
        }
        cells[i] = Some(Arc::new(Cell::new(cell_data, bit_len, references)?));
    }

    cells
        .into_iter()
        .map(|c| c.ok_or_else(|| anyhow::anyhow!("Cell left unbuilt")))
        .collect()
}

fn serialize_cell(
    cell: &Arc<Cell>,
    cell_map: &HashMap<[u8; 32], usize>,
    size_bytes: usize,
) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    result.extend_from_slice(&cell.descriptors());
    result.extend_from_slice(&cell.serialize_data());

    for reference in cell.references() {
        let ref_idx = cell_map
            .get(&reference.hash())
            .ok_or_else(|| anyhow::anyhow!("Reference not found in cell map"))?;
        write_uint(&mut result, *ref_idx, size_bytes);
    }

    Ok(result)
}

/// Collects the deduplicated cell tree in topological order: every
/// reference points to a higher index, root first.
fn collect_cells(root: &Arc<Cell>) -> Vec<Arc<Cell>> {
    let mut cells = Vec::new();
    let mut visited = HashSet::new();
    collect_cells_recursive(root, &mut cells, &mut visited);
    // Post-order puts children before parents; reversed, all edges point
    // forward and the root lands at index 0.
    cells.reverse();
    cells
}

fn collect_cells_recursive(
    cell: &Arc<Cell>,
    cells: &mut Vec<Arc<Cell>>,
    visited: &mut HashSet<[u8; 32]>,
) {
    if !visited.insert(cell.hash()) {
        return;
    }

    for reference in cell.references() {
        collect_cells_recursive(reference, cells, visited);
    }
    cells.push(cell.clone());
}

fn bytes_needed(value: usize) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = (usize::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8)
}

fn write_uint(buf: &mut Vec<u8>, value: usize, size: usize) {
    let bytes = value.to_be_bytes();
    buf.extend_from_slice(&bytes[8 - size..]);
}

fn read_uint(data: &[u8], pos: &mut usize, size: usize) -> Result<usize> {
    if *pos + size > data.len() {
        bail!("Not enough data to read uint");
    }
    let mut result = 0usize;
    for i in 0..size {
        result = (result << 8) | data[*pos + i] as usize;
    }
    *pos += size;
    Ok(result)
}

/// Parses a hex string into a root cell
pub fn hex_to_boc(hex: &str) -> Result<Arc<Cell>> {
    let hex = hex.trim().replace([' ', '\n'], "");
    let bytes = hex::decode(&hex).map_err(|e| anyhow::anyhow!("Failed to decode hex: {}", e))?;
    deserialize_boc(&bytes)
}

/// Serializes a cell tree into a hex string
pub fn boc_to_hex(cell: &Arc<Cell>, has_crc32: bool) -> Result<String> {
    Ok(hex::encode(serialize_boc(cell, has_crc32)?))
}

/// Serializes a cell tree into a base64 string
pub fn boc_to_base64(cell: &Arc<Cell>, has_crc32: bool) -> Result<String> {
    use base64::Engine;
    Ok(base64::engine::general_purpose::STANDARD.encode(serialize_boc(cell, has_crc32)?))
}

/// Parses a base64 string into a root cell
pub fn base64_to_boc(b64: &str) -> Result<Arc<Cell>> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| anyhow::anyhow!("Failed to decode base64: {}", e))?;
    deserialize_boc(&bytes)
}
