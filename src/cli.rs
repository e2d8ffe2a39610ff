//! Shared argument parsing and I/O resolution for the `lz78` and `lzw`
//! binaries. Both front ends accept the same flag set and suffix
//! conventions; only the dictionary variant and file suffix differ.

use std::path::PathBuf;

use clap::{crate_version, Arg, ArgAction, ArgMatches, Command};

use crate::{Error, Options};

/// A fully-resolved invocation: what to read, what to write, and how.
pub struct Invocation {
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub to_stdout: bool,
    pub decompress: bool,
    pub test: bool,
    pub verbose: bool,
    pub quiet: bool,
    pub options: Options,
}

/// Builds the shared `clap::Command` for a dictionary-coder front end.
/// `bin_name` and `about` are specific to the caller; the flag set is not.
pub fn command(bin_name: &'static str, about: &'static str) -> Command {
    Command::new(bin_name)
        .version(crate_version!())
        .about(about)
        .arg(Arg::new("stdout").short('c').long("stdout")
            .action(ArgAction::SetTrue).help("write the result to stdout"))
        .arg(Arg::new("bitsize").short('b').long("bitsize")
            .value_parser(clap::value_parser!(u32)).default_value("20")
            .help("dictionary bit size, 15-31"))
        .arg(Arg::new("decompress").short('d').long("decompress")
            .action(ArgAction::SetTrue).help("decompress instead of compress"))
        .arg(Arg::new("force").short('f').long("force")
            .action(ArgAction::SetTrue).help("overwrite an existing output file"))
        .arg(Arg::new("quiet").short('q').long("quiet")
            .action(ArgAction::SetTrue).help("suppress logging"))
        .arg(Arg::new("test").short('t').long("test")
            .action(ArgAction::SetTrue).help("run the codec without writing output"))
        .arg(Arg::new("verbose").short('v').long("verbose")
            .action(ArgAction::SetTrue).help("verbose logging"))
        .arg(Arg::new("file").index(1)
            .help("input file (omit, or pass -, for stdin)"))
}

/// Installs `env_logger` at a level controlled by `-q`/`-v`.
pub fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();
}

/// Resolves parsed arguments into an [`Invocation`], validating bit size,
/// input existence, output-suffix conventions, and overwrite protection.
/// `suffix` is the compressed-file extension for this variant (`lz78` or `lzw`).
pub fn resolve(matches: &ArgMatches, suffix: &str) -> Result<Invocation, Error> {
    let bit_size: u32 = *matches.get_one("bitsize").expect("has a default");
    if !(15..=31).contains(&bit_size) {
        return Err(Error::InvalidBitSize);
    }

    let decompress = matches.get_flag("decompress");
    let to_stdout = matches.get_flag("stdout");
    let force = matches.get_flag("force");
    let test = matches.get_flag("test");
    let verbose = matches.get_flag("verbose");
    let quiet = matches.get_flag("quiet");

    let file = matches.get_one::<String>("file").map(String::as_str);
    let input_path = match file {
        None | Some("-") => None,
        Some(f) => Some(PathBuf::from(f)),
    };

    if let Some(p) = &input_path {
        if !p.exists() {
            return Err(Error::InputNotFound);
        }
    }

    let output_path = if to_stdout || test {
        None
    } else {
        let dotted = format!(".{suffix}");
        match &input_path {
            Some(p) => {
                let name = p.to_string_lossy().into_owned();
                if decompress {
                    match name.strip_suffix(&dotted) {
                        Some(stem) => Some(PathBuf::from(stem)),
                        None => return Err(Error::InvalidSuffix),
                    }
                } else {
                    Some(PathBuf::from(format!("{name}{dotted}")))
                }
            }
            None => return Err(Error::MissingOutputTarget),
        }
    };

    if let Some(p) = &output_path {
        if p.exists() && !force {
            return Err(Error::OutputExists);
        }
    }

    Ok(Invocation {
        input_path,
        output_path,
        to_stdout,
        decompress,
        test,
        verbose,
        quiet,
        options: Options { bit_size, simulate: test },
    })
}
