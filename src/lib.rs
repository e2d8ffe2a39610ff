//! # Adaptive dictionary compression
//!
//! Two dictionary-coder front ends, [`lz78`] and [`lzw`], share the same
//! trie-in-an-arena dictionary ([`dictionary`]) and the same entropy coder
//! ([`huffman`]) riding on top of a bit-level stream adapter ([`bitstream`]).
//!
//! Compression pipes raw bytes through a dictionary coder into a stream of
//! variable-width codes, which are in turn entropy-coded byte-by-byte through
//! an adaptive Huffman tree, and finally packed onto the underlying byte
//! sink. Expansion reverses every stage.
//!
//! ## Buffer Example
//!
//! ```rs
//! use dictcomp::*;
//! let test_data = b"TOBEORNOTTOBEORTOBEORNOT";
//! let compressed = lzw::compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
//! let restored = lzw::expand_slice(&compressed,&STD_OPTIONS).expect("expansion failed");
//! assert_eq!(restored,test_data);
//! ```

pub mod bitstream;
pub mod huffman;
pub mod dictionary;
pub mod lz78;
pub mod lzw;
pub mod cli;

type DYNERR = Box<dyn std::error::Error>;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

/// Library errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("dictionary bit size out of range (expected 15..=31)")]
    InvalidBitSize,
    #[error("input file not found")]
    InputNotFound,
    #[error("output file already exists")]
    OutputExists,
    #[error("file name lacks the expected suffix")]
    InvalidSuffix,
    #[error("no output target: pass a file name, -c/--stdout, or -t/--test")]
    MissingOutputTarget,
    #[error(transparent)]
    Io(#[from] std::io::Error)
}

/// Options controlling compression
#[derive(Clone)]
pub struct Options {
    /// `log2` of the dictionary arena's byte capacity
    pub bit_size: u32,
    /// run the codec without writing any output bytes
    pub simulate: bool
}

pub const STD_OPTIONS: Options = Options {
    bit_size: 20,
    simulate: false
};

impl Options {
    /// arena capacity in bytes implied by `bit_size`
    pub fn size_limit(&self) -> usize {
        1usize << self.bit_size
    }
}
