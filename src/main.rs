//! Main entry point for the runbsa CLI application.
//!
//! Lists, extracts or pipes entries of a BSA archive, or prints the archive
//! hash of arbitrary paths.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use runbsa::bsa::entry_path;
use runbsa::{Archive, Cli, FileRecord, ReadOptions, hash_path};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if !cli.hash.is_empty() {
        return print_hashes(&cli);
    }

    let Some(file) = cli.file.as_deref() else {
        anyhow::bail!("No archive given");
    };
    let options = ReadOptions::new().original_size_prefix(cli.size_prefix);
    let archive = Archive::open_with_options(file, options)
        .with_context(|| format!("Failed to open {file}"))?;

    process_bsa(&archive, &cli)
}

/// Print `hash  path` for every `--hash` argument.
fn print_hashes(cli: &Cli) -> Result<()> {
    for path in &cli.hash {
        let hash = hash_path(path, cli.folder)?;
        println!("{hash:016x}  {path}");
    }
    Ok(())
}

/// Process a BSA archive based on CLI options.
///
/// - List mode (`-l` or `-v`): display archive contents
/// - Extract mode: extract entries matching the filters
fn process_bsa(archive: &Archive, cli: &Cli) -> Result<()> {
    if cli.list || cli.verbose {
        list_files(archive, cli.verbose);
        return Ok(());
    }

    let files_to_extract: Vec<_> = archive
        .files()
        .iter()
        .filter(|e| is_selected(e, cli))
        .collect();

    let multiple_files = cli.pipe && files_to_extract.len() > 1;
    for entry in files_to_extract {
        extract_file(archive, entry, cli, multiple_files)?;
    }

    Ok(())
}

/// Whether `entry` passes the positional name filters and the `-x` exclusions.
fn is_selected(entry: &FileRecord, cli: &Cli) -> bool {
    if !cli.files.is_empty() {
        let matches = cli.files.iter().any(|f| {
            if has_glob_chars(f) {
                glob_match(f, &entry.name)
            } else {
                entry.name == *f || entry.file_name() == f.as_str()
            }
        });
        if !matches {
            return false;
        }
    }

    !cli
        .exclude
        .iter()
        .any(|x| entry.name.contains(x.as_str()) || glob_match(x, &entry.name))
}

/// List entries in the archive.
///
/// - Simple format (`-l`): just entry names, one per line
/// - Verbose format (`-v`): size, offset, compression and hash per entry
fn list_files(archive: &Archive, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>4}  {:>16}  Name",
            "Size", "Offset", "Zlib", "Hash"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_size = 0u64;
    let mut compressed_count = 0usize;

    for entry in archive.files() {
        if verbose {
            println!(
                "{:>10}  {:>10}  {:>4}  {:016x}  {}",
                entry.real_size(),
                entry.offset,
                if entry.compressed { "yes" } else { "no" },
                entry.name_hash,
                entry.name
            );
            total_size += u64::from(entry.real_size());
            if entry.compressed {
                compressed_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        println!(
            "{:>10}  {} files, {} compressed, {} folders",
            format_size(total_size),
            archive.len(),
            compressed_count,
            archive.folders().len()
        );
    }
}

/// Extract a single entry.
///
/// Handles pipe mode (`-p`), output directory (`-d`), junk paths (`-j`)
/// and the overwrite flags (`-n`, `-o`).
fn extract_file(
    archive: &Archive,
    entry: &FileRecord,
    cli: &Cli,
    show_filename: bool,
) -> Result<()> {
    if cli.pipe {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        if show_filename {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        archive
            .extract_to_writer(entry, &mut stdout)
            .with_context(|| format!("Failed to extract {}", entry.name))?;
        stdout.flush()?;
        return Ok(());
    }

    let relative = if cli.junk_paths {
        PathBuf::from(entry.file_name())
    } else {
        entry_path(&entry.name)
    };
    let output_path = match cli.extract_dir {
        Some(ref dir) => Path::new(dir).join(relative),
        None => relative,
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    archive
        .extract_to_file(entry, &output_path)
        .with_context(|| format!("Failed to extract {}", entry.name))?;

    Ok(())
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// Matching is case-insensitive, the way names inside archives are treated
/// by the games that read them.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let text_chars: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
