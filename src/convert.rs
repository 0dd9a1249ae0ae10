//! Directory-level conversion: picks the source files, skips outputs that
//! already exist, and writes each output through a temporary sibling.

use crate::bcp::BcpReader;
use crate::config::{PROGRESS_INTERVAL, SIR_PREFIX, SOURCE_EXTENSION, TMP_SUFFIX, WRITE_BUFFER_SIZE};
use crate::csv_export::write_csv;
use crate::models::Record;
use crate::rdf::{SourceFormat, TableSpec, TABLES};
use crate::sir::SirReader;
use crate::stats::ConversionStats;
use crate::turtle::TurtleWriter;
use anyhow::{Context, Result};
use clap::ValueEnum;
use indicatif::ProgressBar;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One Turtle file per published table
    Rdf,
    /// One CSV file per source file
    Csv,
}

/// Answers whether an output has already been produced by an earlier run.
pub trait OutputProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the filesystem.
pub struct FsProbe;

impl OutputProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F: Fn(&Path) -> bool> OutputProbe for F {
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

type Records = Box<dyn Iterator<Item = Result<Record>>>;

pub fn convert(
    format: OutputFormat,
    source_dir: &Path,
    target_dir: &Path,
    probe: &dyn OutputProbe,
) -> Result<ConversionStats> {
    match format {
        OutputFormat::Rdf => convert_to_rdf(source_dir, target_dir, probe),
        OutputFormat::Csv => convert_to_csv(source_dir, target_dir, probe),
    }
}

/// Converts every `*.bcp` file in `source_dir` to `<file name>.csv`.
pub fn convert_to_csv(
    source_dir: &Path,
    target_dir: &Path,
    probe: &dyn OutputProbe,
) -> Result<ConversionStats> {
    let stats = ConversionStats::new();

    for source in source_files(source_dir)? {
        let file_name = source
            .file_name()
            .context("Source path has no file name")?
            .to_string_lossy()
            .into_owned();
        let output = target_dir.join(format!("{}.csv", file_name));
        if probe.exists(&output) {
            info!(path = %output.display(), "Found existing CSV file, skipping conversion");
            stats.inc_skipped();
            continue;
        }

        let format = if file_name.starts_with(SIR_PREFIX) {
            SourceFormat::Sir
        } else {
            SourceFormat::Bcp
        };
        info!(
            source = %source.display(),
            output = %output.display(),
            ?format,
            "Converting to CSV"
        );

        let rows = convert_file(&source, &output, format, &spinner(&file_name))
            .with_context(|| format!("Failed to convert {:?} to CSV", source))?;

        stats.inc_converted();
        stats.add_records(rows);
        stats.add_rows(rows);
        debug!(rows, "CSV file written");
    }

    Ok(stats)
}

/// Converts every published table found in `source_dir` to Turtle.
pub fn convert_to_rdf(
    source_dir: &Path,
    target_dir: &Path,
    probe: &dyn OutputProbe,
) -> Result<ConversionStats> {
    let stats = ConversionStats::new();

    for table in TABLES {
        let output = target_dir.join(table.output);
        if probe.exists(&output) {
            info!(path = %output.display(), "RDF file already exists, skipping");
            stats.inc_skipped();
            continue;
        }

        let source = source_dir.join(table.source);
        if !source.is_file() {
            warn!(path = %source.display(), "Source table not found, skipping");
            stats.inc_missing();
            continue;
        }

        info!(
            source = %source.display(),
            output = %output.display(),
            "Converting to RDF"
        );
        let (records, statements) = convert_table(table, &source, &output, &spinner(table.source))
            .with_context(|| format!("Failed to convert {:?} to RDF", source))?;

        stats.inc_converted();
        stats.add_records(records);
        stats.add_statements(statements);
        debug!(records, statements, "Turtle file written");
    }

    Ok(stats)
}

/// Converts one file to CSV. `pb` is finished whether or not it succeeds.
fn convert_file(source: &Path, output: &Path, format: SourceFormat, pb: &ProgressBar) -> Result<u64> {
    let result = open_records(source, format).and_then(|records| {
        let records = with_progress(records, pb);
        write_atomically(output, |out| write_csv(records, out))
    });
    pb.finish_and_clear();
    result
}

/// Converts one table to Turtle. `pb` is finished whether or not it succeeds.
fn convert_table(
    table: &TableSpec,
    source: &Path,
    output: &Path,
    pb: &ProgressBar,
) -> Result<(u64, u64)> {
    let result = open_records(source, table.format)
        .and_then(|records| write_table(table, with_progress(records, pb), output));
    pb.finish_and_clear();
    result
}

fn write_table(table: &TableSpec, records: Records, output: &Path) -> Result<(u64, u64)> {
    let mut mapper = table.new_mapper();

    write_atomically(output, |out| {
        let mut turtle = TurtleWriter::new(out);
        turtle.write_prefixes()?;

        let mut pending = Vec::new();
        let mut read = 0u64;
        for record in records {
            let record = record?;
            read += 1;
            mapper
                .map(&record, &mut pending)
                .with_context(|| format!("Failed to map record {} of {}", read, table.source))?;
            for statement in pending.drain(..) {
                turtle.statement(&statement)?;
            }
        }
        mapper.finish(&mut pending)?;
        for statement in pending.drain(..) {
            turtle.statement(&statement)?;
        }

        turtle.flush()?;
        Ok((read, turtle.statements()))
    })
}

/// `*.bcp` files directly inside `dir`, in name order.
fn source_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read source directory: {:?}", dir))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn open_records(path: &Path, format: SourceFormat) -> Result<Records> {
    let records: Records = match format {
        SourceFormat::Bcp => {
            let reader = BcpReader::open(path)
                .with_context(|| format!("Failed to open BCP file: {:?}", path))?;
            Box::new(reader.map(|r| r.map_err(anyhow::Error::from)))
        }
        SourceFormat::Sir => {
            let reader = SirReader::open(path)
                .with_context(|| format!("Failed to open SIR file: {:?}", path))?;
            Box::new(reader.map(|r| r.map(Record::from).map_err(anyhow::Error::from)))
        }
    };
    Ok(records)
}

fn spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(name.to_string());
    pb
}

fn with_progress(records: Records, pb: &ProgressBar) -> Records {
    let pb = pb.clone();
    let mut seen = 0u64;
    Box::new(records.inspect(move |_| {
        seen += 1;
        if seen % PROGRESS_INTERVAL == 0 {
            pb.tick();
        }
    }))
}

pub fn tmp_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".");
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Runs `write` against `<output>.tmp` and renames it to `output` once it
/// succeeds. On failure the temporary file is removed and `output` is left
/// untouched.
fn write_atomically<T, F>(output: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let tmp = tmp_path(output);
    let file = File::create(&tmp)
        .with_context(|| format!("Failed to create temp output file: {:?}", tmp))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    let result = write(&mut writer).and_then(|value| {
        writer.flush().context("Failed to flush output")?;
        Ok(value)
    });
    drop(writer);

    match result {
        Ok(value) => {
            fs::rename(&tmp, output)
                .with_context(|| format!("Failed to rename temp output: {:?}", output))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(remove_err) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %remove_err, "Failed to remove temp output");
            }
            Err(e)
        }
    }
}
