use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

type STDRESULT = Result<(), Box<dyn std::error::Error>>;

const SAMPLE: &[u8] = b"the quick brown fox jumps over the lazy dog\n\
the quick brown fox jumps over the lazy dog again and again\n";

fn round_trip(bin: &str, suffix: &str) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("input.txt");
    std::fs::write(&src, SAMPLE)?;
    let compressed = temp_dir.path().join(format!("input.txt.{suffix}"));
    let restored = temp_dir.path().join("input.txt");

    Command::cargo_bin(bin)?
        .arg(&src)
        .assert()
        .success();
    assert!(compressed.exists());

    std::fs::remove_file(&src)?; // force expand to rewrite it
    Command::cargo_bin(bin)?
        .arg("-d")
        .arg(&compressed)
        .assert()
        .success();
    assert_eq!(std::fs::read(&restored)?, SAMPLE);
    Ok(())
}

#[test]
fn lz78_compress_then_expand_round_trips() -> STDRESULT {
    round_trip("lz78", "lz78")
}

#[test]
fn lzw_compress_then_expand_round_trips() -> STDRESULT {
    round_trip("lzw", "lzw")
}

#[test]
fn stdout_flag_writes_to_stdout_without_a_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("input.txt");
    std::fs::write(&src, SAMPLE)?;
    Command::cargo_bin("lz78")?
        .arg("-c")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
    Ok(())
}

#[test]
fn decompress_requires_matching_suffix() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let wrong = temp_dir.path().join("input.bin");
    std::fs::write(&wrong, SAMPLE)?;
    Command::cargo_bin("lzw")?
        .arg("-d")
        .arg(&wrong)
        .assert()
        .failure();
    Ok(())
}

#[test]
fn refuses_to_overwrite_without_force() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("input.txt");
    std::fs::write(&src, SAMPLE)?;
    let compressed = temp_dir.path().join("input.txt.lz78");
    std::fs::write(&compressed, b"stale")?;
    Command::cargo_bin("lz78")?
        .arg(&src)
        .assert()
        .failure();
    Command::cargo_bin("lz78")?
        .arg("-f")
        .arg(&src)
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_mode_runs_without_producing_a_file() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("input.txt");
    std::fs::write(&src, SAMPLE)?;
    let would_be_output = temp_dir.path().join("input.txt.lz78");
    Command::cargo_bin("lz78")?
        .arg("-t")
        .arg(&src)
        .assert()
        .success();
    assert!(!would_be_output.exists());
    Ok(())
}

#[test]
fn invalid_bit_size_is_rejected() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let src = temp_dir.path().join("input.txt");
    std::fs::write(&src, SAMPLE)?;
    Command::cargo_bin("lzw")?
        .arg("-b").arg("8")
        .arg("-t")
        .arg(&src)
        .assert()
        .failure();
    Ok(())
}
