//! LZ78 dictionary coder: emits `(kind, byte, id)` codes where `kind` marks
//! whether a dictionary-match id accompanies the literal byte, and `id`'s
//! bit width tracks `ceil(log2(dict_size + 1))`, evaluated before the
//! dictionary is extended for this code -- the same rule the decoder uses,
//! so the two stay in lock-step.

use std::io::{self, Read, Write};

use crate::bitstream::{BitStreamReader, BitStreamWriter, ByteSink, ByteSource, RawSink, RawSource};
use crate::dictionary::Dictionary;
use crate::huffman::{AdaptiveHuffmanReader, AdaptiveHuffmanWriter};
use crate::{Options, DYNERR};

const CHUNK: usize = 16384;

fn id_width(dict_size: usize) -> u32 {
    let n = dict_size as u64 + 1;
    if n <= 1 {
        0
    } else {
        (n - 1).ilog2() + 1
    }
}

fn write_code<S: ByteSink>(
    output: &mut BitStreamWriter<S>,
    dict_size: usize,
    id: u32,
    byte: u8,
    opts: &Options,
) -> io::Result<()> {
    if opts.simulate {
        return Ok(());
    }
    output.write_bits(if id != 0 { 1 } else { 0 }, 1)?;
    output.write_bits(byte as u64, 8)?;
    if id != 0 {
        output.write_bits(id as u64, id_width(dict_size))?;
    }
    Ok(())
}

fn compress_byte<S: ByteSink>(
    dict: &mut Dictionary,
    output: &mut BitStreamWriter<S>,
    byte: u8,
    opts: &Options,
) -> io::Result<()> {
    if !dict.step(byte) {
        let id = dict.current();
        write_code(output, dict.size(), id, byte, opts)?;
        dict.add_suffix(byte);
    }
    Ok(())
}

/// Reads raw bytes from `input` in 16 KiB chunks, feeding the dictionary and
/// writing codes to `output` (typically a `BitStreamWriter` wrapping an
/// [`AdaptiveHuffmanWriter`]).
pub fn compress<R: Read, S: ByteSink>(
    input: &mut R,
    output: &mut BitStreamWriter<S>,
    opts: &Options,
) -> io::Result<()> {
    log::info!("starting LZ78 compression, bit_size={}", opts.bit_size);
    let mut dict = Dictionary::new(opts.size_limit());
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
        log::debug!("flushing final partial match");
        let (byte, parent) = dict.step_back();
        write_code(output, dict.size(), parent, byte, opts)?;
    }
    log::info!("LZ78 compression finished");
    Ok(())
}

/// Reads codes from `input` (typically a `BitStreamReader` wrapping an
/// [`AdaptiveHuffmanReader`]), writing the recovered raw bytes to `output`.
pub fn decompress<S: ByteSource, W: Write>(
    input: &mut BitStreamReader<S>,
    output: &mut W,
    opts: &Options,
) -> io::Result<()> {
    log::info!("starting LZ78 expansion, bit_size={}", opts.bit_size);
    let mut dict = Dictionary::new(opts.size_limit());
    loop {
        let kind = match input.read_bits(1)? {
            Some(v) => v,
            None => break,
        };
        let byte = match input.read_bits(8)? {
            Some(v) => v as u8,
            None => break,
        };
        let id = if kind == 1 {
            match input.read_bits(id_width(dict.size()))? {
                Some(v) => v as u32,
                None => break,
            }
        } else {
            0
        };
        log::trace!("code kind={kind} id={id} byte={byte:#04x}");
        if id != 0 {
            output.write_all(&dict.jump(id))?;
        }
        output.write_all(&[byte])?;
        let size_before = dict.size();
        dict.add_suffix(byte);
        if dict.size() < size_before {
            log::debug!("dictionary arena cleared at capacity");
        }
    }
    log::info!("LZ78 expansion finished");
    Ok(())
}

/// Compresses `data` in memory, returning the LZ78-then-Huffman byte stream.
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

    #[test]
    fn repeating_pattern_exercises_flush() {
        let data = b"abababababababababababababababab".to_vec();
        round_trip(&data, &STD_OPTIONS);
    }

    #[test]
    fn random_payload_at_various_bit_sizes() {
        let mut data = vec![0u8; 1 << 16];
        let mut x: u32 = 0x2545F491;
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
    fn id_width_matches_ceil_log2() {
        assert_eq!(id_width(0), 0);
        assert_eq!(id_width(1), 1);
        assert_eq!(id_width(2), 2);
        assert_eq!(id_width(3), 2);
        assert_eq!(id_width(4), 3);
        assert_eq!(id_width(255), 8);
        assert_eq!(id_width(256), 9);
    }
}
