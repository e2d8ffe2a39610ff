//! LZ78 compress/expand front end.

use std::fs::File;
use std::io::{self, Read, Write};

use dictcomp::bitstream::{BitStreamReader, BitStreamWriter, RawSink, RawSource};
use dictcomp::huffman::{AdaptiveHuffmanReader, AdaptiveHuffmanWriter};
use dictcomp::{cli, lz78};

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli::command("lz78", "compress or expand a file with the LZ78 dictionary coder")
        .get_matches();
    let inv = cli::resolve(&matches, "lz78")?;
    cli::init_logging(inv.quiet, inv.verbose);
    log::debug!(
        "bit_size={} decompress={} stdout={} test={}",
        inv.options.bit_size, inv.decompress, inv.to_stdout, inv.test
    );

    let mut input: Box<dyn Read> = match &inv.input_path {
        Some(p) => Box::new(File::open(p)?),
        None => Box::new(io::stdin()),
    };

    if inv.decompress {
        let mut output: Box<dyn Write> = if inv.test {
            Box::new(io::sink())
        } else if inv.to_stdout || inv.output_path.is_none() {
            Box::new(io::stdout())
        } else {
            Box::new(File::create(inv.output_path.as_ref().unwrap())?)
        };
        let huff = AdaptiveHuffmanReader::new(RawSource::new(input));
        let mut reader = BitStreamReader::new(huff);
        lz78::decompress(&mut reader, &mut output, &inv.options)?;
        if !reader.good() {
            return Err(Box::new(dictcomp::Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended mid-code",
            ))));
        }
    } else {
        let raw_out: Box<dyn Write> = if inv.test {
            Box::new(io::sink())
        } else if inv.to_stdout || inv.output_path.is_none() {
            Box::new(io::stdout())
        } else {
            Box::new(File::create(inv.output_path.as_ref().unwrap())?)
        };
        let mut writer = {
            let huff = AdaptiveHuffmanWriter::new(RawSink::new(raw_out));
            BitStreamWriter::new(huff)
        };
        lz78::compress(&mut input, &mut writer, &inv.options)?;
        if !writer.good() {
            return Err(Box::new(dictcomp::Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "output stream failed",
            ))));
        }
    }
    Ok(())
}
