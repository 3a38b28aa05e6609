// ─── bsdiff40 Decoder ───
// Pure binary-delta application. The wire format is bsdiff 4.x: an 8-byte
// magic, three sign-magnitude little-endian lengths, then independently
// compressed control, diff, and extra blocks.

use std::io::Read;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;

use crate::core::error::{BundlerError, BundlerResult};

const MAGIC: &[u8; 8] = b"BSDIFF40";
const HEADER_LEN: usize = 32;
const CONTROL_RECORD_LEN: usize = 24;

fn corrupt(detail: impl Into<String>) -> BundlerError {
    BundlerError::PatchCorrupt {
        detail: detail.into(),
    }
}

/// Decode a bsdiff sign-magnitude 64-bit integer (little-endian, sign bit in
/// the top bit of the last byte).
fn read_offt(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    let sign = buf[7] & 0x80 != 0;
    buf[7] &= 0x7f;
    let magnitude = i64::from_le_bytes(buf);
    if sign {
        -magnitude
    } else {
        magnitude
    }
}

/// Decompress one block, sniffing the codec by magic. bsdiff's canonical
/// codec is bzip2; gzip blocks are also accepted, matching the compressor
/// auto-detection of the diff producer.
fn decompress_block(data: &[u8], name: &str) -> BundlerResult<Vec<u8>> {
    let mut out = Vec::new();
    if data.starts_with(b"BZh") {
        BzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| corrupt(format!("{name} block: bad bzip2 stream: {e}")))?;
    } else if data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b {
        GzDecoder::new(data)
            .read_to_end(&mut out)
            .map_err(|e| corrupt(format!("{name} block: bad gzip stream: {e}")))?;
    } else {
        return Err(corrupt(format!("{name} block: unsupported compression")));
    }
    Ok(out)
}

/// Apply a bsdiff40 delta to `base`, producing the target bytes.
///
/// Deterministic and side-effect-free: `base` is never mutated and the
/// output is a fresh buffer fully determined by `(base, diff)`. Any
/// structural problem — bad magic, negative or inconsistent lengths, block
/// over/under-runs, or the base cursor escaping `0..=base.len()` — is
/// [`BundlerError::PatchCorrupt`].
pub fn apply(base: &[u8], diff: &[u8]) -> BundlerResult<Vec<u8>> {
    if diff.len() < HEADER_LEN {
        return Err(corrupt("truncated header"));
    }
    if &diff[..8] != MAGIC {
        return Err(corrupt("bad magic, expected BSDIFF40"));
    }

    let ctrl_len = read_offt(&diff[8..16]);
    let diff_len = read_offt(&diff[16..24]);
    let new_size = read_offt(&diff[24..32]);
    if ctrl_len < 0 || diff_len < 0 || new_size < 0 {
        return Err(corrupt("negative length in header"));
    }
    let (ctrl_len, diff_len, new_size) = (ctrl_len as usize, diff_len as usize, new_size as usize);

    let blocks_end = HEADER_LEN
        .checked_add(ctrl_len)
        .and_then(|n| n.checked_add(diff_len))
        .ok_or_else(|| corrupt("header lengths overflow"))?;
    if blocks_end > diff.len() {
        return Err(corrupt("header lengths exceed patch size"));
    }

    let ctrl_block = decompress_block(&diff[HEADER_LEN..HEADER_LEN + ctrl_len], "control")?;
    let diff_block = decompress_block(&diff[HEADER_LEN + ctrl_len..blocks_end], "diff")?;
    let extra_block = decompress_block(&diff[blocks_end..], "extra")?;

    if ctrl_block.len() % CONTROL_RECORD_LEN != 0 {
        return Err(corrupt("control block is not a whole number of records"));
    }

    // Every output byte is drawn from either the diff or the extra block, so
    // a declared size beyond their sum can never be satisfied. Rejecting it
    // here keeps the header from dictating the allocation.
    if new_size > diff_block.len().saturating_add(extra_block.len()) {
        return Err(corrupt("declared output size exceeds diff and extra blocks"));
    }

    let mut output = Vec::with_capacity(new_size);
    let mut base_pos: i64 = 0;
    let mut diff_pos = 0usize;
    let mut extra_pos = 0usize;
    let mut ctrl = ctrl_block.chunks_exact(CONTROL_RECORD_LEN);

    while output.len() < new_size {
        let record = ctrl
            .next()
            .ok_or_else(|| corrupt("control block exhausted before output complete"))?;
        let copy = read_offt(&record[0..8]);
        let insert = read_offt(&record[8..16]);
        let seek = read_offt(&record[16..24]);

        if copy < 0 || insert < 0 {
            return Err(corrupt("negative copy or insert length"));
        }
        let copy = copy as usize;
        let insert = insert as usize;

        if output.len() + copy > new_size {
            return Err(corrupt("copy runs past declared output size"));
        }
        if diff_pos + copy > diff_block.len() {
            return Err(corrupt("copy runs past diff block"));
        }
        if base_pos < 0 || base_pos as usize + copy > base.len() {
            return Err(corrupt("copy reads outside the base artifact"));
        }

        // Copy: base bytes plus diff bytes, bytewise with wrap.
        let base_slice = &base[base_pos as usize..base_pos as usize + copy];
        let diff_slice = &diff_block[diff_pos..diff_pos + copy];
        output.extend(
            base_slice
                .iter()
                .zip(diff_slice)
                .map(|(b, d)| b.wrapping_add(*d)),
        );
        diff_pos += copy;
        base_pos += copy as i64;

        if output.len() + insert > new_size {
            return Err(corrupt("insert runs past declared output size"));
        }
        if extra_pos + insert > extra_block.len() {
            return Err(corrupt("insert runs past extra block"));
        }
        output.extend_from_slice(&extra_block[extra_pos..extra_pos + insert]);
        extra_pos += insert;

        base_pos += seek;
        if base_pos < 0 || base_pos as usize > base.len() {
            return Err(corrupt("seek moves the base cursor out of bounds"));
        }
    }

    Ok(output)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builders for crafting valid bsdiff40 patches in tests.

    use std::io::Write;

    use super::{CONTROL_RECORD_LEN, MAGIC};

    pub fn write_offt(value: i64) -> [u8; 8] {
        let mut bytes = value.unsigned_abs().to_le_bytes();
        if value < 0 {
            bytes[7] |= 0x80;
        }
        bytes
    }

    pub fn bzip2_block(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    pub fn gzip_block(data: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    /// Assemble a patch from raw control records, diff bytes, and extra
    /// bytes, compressing each block with `compress`.
    pub fn build_patch(
        control: &[(i64, i64, i64)],
        diff_bytes: &[u8],
        extra_bytes: &[u8],
        new_size: i64,
        compress: fn(&[u8]) -> Vec<u8>,
    ) -> Vec<u8> {
        let mut ctrl_raw = Vec::with_capacity(control.len() * CONTROL_RECORD_LEN);
        for (copy, insert, seek) in control {
            ctrl_raw.extend_from_slice(&write_offt(*copy));
            ctrl_raw.extend_from_slice(&write_offt(*insert));
            ctrl_raw.extend_from_slice(&write_offt(*seek));
        }

        let ctrl_block = compress(&ctrl_raw);
        let diff_block = compress(diff_bytes);
        let extra_block = compress(extra_bytes);

        let mut patch = Vec::new();
        patch.extend_from_slice(MAGIC);
        patch.extend_from_slice(&write_offt(ctrl_block.len() as i64));
        patch.extend_from_slice(&write_offt(diff_block.len() as i64));
        patch.extend_from_slice(&write_offt(new_size));
        patch.extend_from_slice(&ctrl_block);
        patch.extend_from_slice(&diff_block);
        patch.extend_from_slice(&extra_block);
        patch
    }
}
