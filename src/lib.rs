//! cc-convert: Charity Commission register export conversion
//!
//! The Charity Commission publishes its register as a set of BCP bulk-copy
//! exports plus a tab-separated Summary Information Return (SIR) file. This
//! crate reads those exports and writes them out either as plain CSV or as
//! Turtle RDF:
//!
//! 1. **Tokenizing** -- Stream each export into positional records without
//!    loading the file, recovering cells from the `@**@` / `*@@*` sentinels
//!    (BCP) or from TAB and CRLF (SIR)
//! 2. **CSV conversion** -- One CSV file per export, one row per record
//! 3. **RDF conversion** -- One Turtle file per published table, produced by a
//!    per-table mapper from the catalogue in [`rdf::TABLES`]
//!
//! Conversions are resumable: an output that already exists is skipped, and
//! outputs are written to a temporary sibling that is renamed into place only
//! when the whole file converted.
//!
//! # Key Modules
//!
//! - [`bcp`] -- Streaming BCP tokenizer with sentinel look-ahead
//! - [`sir`] -- CRLF/TAB tokenizer for the SIR export with overflow repair
//! - [`csv_export`] -- Record to CSV row writing
//! - [`rdf`] -- Table catalogue and record-to-statement mappers
//! - [`turtle`] -- Prefixes, literal escaping and statement rendering
//! - [`dates`] -- Export timestamp parsing into day IRIs and `xsd:dateTime`
//! - [`convert`] -- Directory-level orchestration with skip-if-exists
//! - [`models`] -- Positional record type
//! - [`stats`] -- Conversion counters
//! - [`config`] -- Constants for file naming, buffers and IRIs
//!
//! # Example Usage
//!
//! ```bash
//! # Convert every export to CSV
//! cc-convert convert csv data/ out/csv
//!
//! # Convert the published tables to Turtle
//! cc-convert -v convert rdf data/ out/rdf
//!
//! # List the tables the RDF conversion reads
//! cc-convert tables
//! ```

pub mod bcp;
pub mod config;
pub mod convert;
pub mod csv_export;
pub mod dates;
pub mod models;
pub mod rdf;
pub mod sir;
pub mod stats;
pub mod turtle;
