//! LZW dictionary coder, built on the same trie arena as [`crate::lz78`] but
//! pre-seeded with one root per byte value. Codes are pure dictionary ids;
//! their bit width is the smallest `w` with `dict_size < 2^w`. Unlike LZ78
//! (which extends its dictionary on every code, symmetrically on both
//! sides), the LZW decoder's dictionary always lags the encoder's by exactly
//! one entry -- the very first code is read before the decoder has seen
//! enough to extend it, and every code thereafter still trails by that same
//! one entry. So the decoder computes its width and capacity against
//! `dict_size + 1`, not `dict_size`, to land on the same bit width and the
//! same capacity-reset point as the encoder; see [`decompress`] and
//! [`Dictionary::entry_byte_size`]. The decoder additionally handles the
//! classic "KwKwK" case, where the just-read code names the entry the
//! encoder is in the middle of defining.

use std::io::{self, Read, Write};

use crate::bitstream::{BitStreamReader, BitStreamWriter, ByteSink, ByteSource, RawSink, RawSource};
use crate::dictionary::Dictionary;
use crate::huffman::{AdaptiveHuffmanReader, AdaptiveHuffmanWriter};
use crate::{Options, DYNERR};

const CHUNK: usize = 16384;

fn code_width(dict_size: usize) -> u32 {
    let mut w = 1u32;
    while (dict_size as u64) >= (1u64 << w) {
        w += 1;
    }
    w
}

fn write_code<S: ByteSink>(
    output: &mut BitStreamWriter<S>,
    dict_size: usize,
    id: u32,
    opts: &Options,
) -> io::Result<()> {
    if opts.simulate {
        return Ok(());
    }
    output.write_bits(id as u64, code_width(dict_size))
}

fn compress_byte<S: ByteSink>(
    dict: &mut Dictionary,
    output: &mut BitStreamWriter<S>,
    byte: u8,
    opts: &Options,
) -> io::Result<()> {
    if !dict.step(byte) {
        write_code(output, dict.size(), dict.current(), opts)?;
        dict.add_suffix(byte);
        // the just-seeded/extended trie always has a root for `byte`.
        dict.step(byte);
    }
    Ok(())
}

/// Reads raw bytes from `input` in 16 KiB chunks, writing LZW codes to
/// `output` (typically a `BitStreamWriter` wrapping an [`AdaptiveHuffmanWriter`]).
pub fn compress<R: Read, S: ByteSink>(
    input: &mut R,
    output: &mut BitStreamWriter<S>,
    opts: &Options,
) -> io::Result<()> {
    log::info!("starting LZW compression, bit_size={}", opts.bit_size);
    let mut dict = Dictionary::new_prepopulated(opts.size_limit());
    let mut buf = [0u8; CHUNK];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        log::debug!("compressing chunk of {n} bytes");
        for &byte in &buf[..n] {
            let size_before = dict.size();
            compress_byte(&mut dict, output, byte, opts)?;
            if dict.size() < size_before {
                log::debug!("dictionary arena cleared at capacity");
            }
            if !output.good() {
                return Ok(());
            }
        }
    }
    if output.good() && dict.current() != 0 {
        log::debug!("flushing final code");
        write_code(output, dict.size(), dict.current(), opts)?;
    }
    log::info!("LZW compression finished");
    Ok(())
}

/// Reads LZW codes from `input` (typically a `BitStreamReader` wrapping an
/// [`AdaptiveHuffmanReader`]), writing the recovered raw bytes to `output`.
pub fn decompress<S: ByteSource, W: Write>(
    input: &mut BitStreamReader<S>,
    output: &mut W,
    opts: &Options,
) -> io::Result<()> {
    log::info!("starting LZW expansion, bit_size={}", opts.bit_size);
    // the decode-side dictionary always lags the encoder's by one entry, so
    // its capacity is biased by one entry's worth of bytes to make its
    // capacity-triggered clear land on the same code as the encoder's.
    let mut dict = Dictionary::new_prepopulated(
        opts.size_limit().saturating_sub(Dictionary::entry_byte_size()),
    );
    let mut previous_id: u32 = 0;
    loop {
        // width is computed against `dict.size() + 1` to compensate for the
        // same one-entry lag (see module docs).
        let w = code_width(dict.size() + 1);
        let id = match input.read_bits(w)? {
            Some(v) => v as u32,
            None => break,
        };
        log::trace!("code: {id} (width {w})");
        if id as usize == dict.size() + 1 {
            // KwKwK: this code names the entry the encoder is defining right
            // now -- its expansion is `previous`'s expansion plus its own
            // first byte.
            log::debug!("KwKwK case at id={id}");
            let prev_bytes = dict.jump(previous_id);
            if prev_bytes.is_empty() {
                break;
            }
            output.write_all(&prev_bytes)?;
            output.write_all(&[prev_bytes[0]])?;
            dict.add_suffix(prev_bytes[0]);
            previous_id = if dict.is_empty() { 0 } else { id };
        } else {
            let bytes = dict.jump(id);
            if bytes.is_empty() {
                break;
            }
            output.write_all(&bytes)?;
            if previous_id != 0 {
                // re-park `current` on the *previous* entry so the new
                // dictionary entry (previous string + this code's first
                // byte) is parented correctly; `jump(id)` above left
                // `current` pointing at `id`, not `previous_id`.
                dict.jump(previous_id);
                dict.add_suffix(bytes[0]);
                previous_id = if dict.is_empty() { 0 } else { id };
            } else {
                previous_id = id;
            }
        }
    }
    log::info!("LZW expansion finished");
    Ok(())
}

/// Compresses `data` in memory, returning the LZW-then-Huffman byte stream.
pub fn compress_slice(data: &[u8], opts: &Options) -> Result<Vec<u8>, DYNERR> {
    let mut compressed = Vec::new();
    {
        let huff = AdaptiveHuffmanWriter::new(RawSink::new(&mut compressed));
        let mut writer = BitStreamWriter::new(huff);
        compress(&mut &data[..], &mut writer, opts)?;
    }
    Ok(compressed)
}

/// Expands a buffer produced by [`compress_slice`].
pub fn expand_slice(data: &[u8], opts: &Options) -> Result<Vec<u8>, DYNERR> {
    let huff = AdaptiveHuffmanReader::new(RawSource::new(data));
    let mut reader = BitStreamReader::new(huff);
    let mut out = Vec::new();
    decompress(&mut reader, &mut out, opts)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::STD_OPTIONS;

    fn round_trip(data: &[u8], opts: &Options) {
        let compressed = compress_slice(data, opts).unwrap();
        let restored = expand_slice(&compressed, opts).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn empty_input() {
        round_trip(&[], &STD_OPTIONS);
    }

    #[test]
    fn one_byte() {
        round_trip(&[0x41], &STD_OPTIONS);
    }

    #[test]
    fn all_byte_values_in_order() {
        let data: Vec<u8> = (0..=255u8).collect();
        round_trip(&data, &STD_OPTIONS);
    }

    #[test]
    fn four_kib_of_zero() {
        round_trip(&[0u8; 4096], &STD_OPTIONS);
    }

    /// The textbook LZW example, exercising the KwKwK edge case
    /// ("...TOBEORNOTTOBEOR..." repeats a string immediately before it has
    /// finished being defined).
    #[test]
    fn tobeornottobeor_at_bit_size_15() {
        let opts = Options { bit_size: 15, simulate: false };
        round_trip(b"TOBEORNOTTOBEORTOBEORNOT", &opts);
    }

    #[test]
    fn random_payload_at_various_bit_sizes() {
        let mut data = vec![0u8; 1 << 16];
        let mut x: u32 = 0x9E3779B9;
        for b in data.iter_mut() {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *b = (x & 0xFF) as u8;
        }
        for bit_size in [15u32, 20, 24] {
            let opts = Options { bit_size, simulate: false };
            round_trip(&data, &opts);
        }
    }

    #[test]
    fn simulation_mode_runs_without_writing_output() {
        let opts = Options { bit_size: 15, simulate: true };
        let data = b"the quick brown fox jumps over the lazy dog".to_vec();
        let compressed = compress_slice(&data, &opts).unwrap();
        assert!(compressed.is_empty());
    }

    #[test]
    fn small_dictionary_forces_mid_stream_clear() {
        // a tiny arena forces repeated capacity clears well before 64 KiB of
        // varied input is consumed, exercising the reset-to-256-seeds path.
        let opts = Options { bit_size: 15, simulate: false };
        let mut data = Vec::new();
        for i in 0..8192usize {
            data.push((i % 251) as u8);
        }
        round_trip(&data, &opts);
    }

    #[test]
    fn code_width_matches_classic_lzw_thresholds() {
        assert_eq!(code_width(255), 8);
        assert_eq!(code_width(256), 9);
        assert_eq!(code_width(511), 9);
        assert_eq!(code_width(512), 10);
    }
}
