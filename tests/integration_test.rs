//! End-to-end tests for directory conversion.
//!
//! Each test writes a small set of export files into a TempDir, runs a
//! conversion into a second TempDir, and inspects the files produced.
//!
//! # Sample Data
//!
//! - `extract_charity.bcp`: one main charity and one subsidiary
//! - `extract_registration.bcp`: a registration and a removal
//! - `extract_objects.bcp`: an objective split over two rows
//! - `sir_data.bcp`: a tab-separated SIR file with a response containing a
//!   bare line break

use cc_convert::convert::{convert, convert_to_csv, convert_to_rdf, FsProbe, OutputFormat};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tempfile::TempDir;

const CHARITY: &[u8] = b"200000@**@0@**@THE CHARITY@**@R@**@TRUST DEED@**@ENGLAND@**@@**@F@**@@**@@**@@**@@**@@**@@**@@**@@**@@**@*@@*\
200000@**@1@**@THE SUBSIDIARY@**@RM@**@@**@@**@@**@T@**@@**@@**@@**@@**@@**@@**@@**@@**@@**@*@@*";

const REGISTRATION: &[u8] = b"200000@**@0@**@1961-09-14 00:00:00@**@@**@*@@*\
200000@**@1@**@1962-01-01 00:00:00@**@2001-05-31 00:00:00@**@01*@@*";

const OBJECTS: &[u8] = b"200000@**@0@**@0@**@TO RELIEVE0001*@@*200000@**@0@**@1@**@ POVERTY*@@*";

const SIR: &[u8] = b"200000\tTHE CHARITY\t2014\t1\tWho benefits?\tChildren\nand families\r\n\
200000\tTHE CHARITY\t2014\t2\tWhere?\tWales\r\n";

fn sample_sources() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("extract_charity.bcp"), CHARITY).unwrap();
    fs::write(dir.path().join("extract_registration.bcp"), REGISTRATION).unwrap();
    fs::write(dir.path().join("extract_objects.bcp"), OBJECTS).unwrap();
    fs::write(dir.path().join("sir_data.bcp"), SIR).unwrap();
    dir
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn modified_times(dir: &Path) -> Vec<(String, SystemTime)> {
    let mut times: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let e = e.unwrap();
            (
                e.file_name().to_string_lossy().into_owned(),
                e.metadata().unwrap().modified().unwrap(),
            )
        })
        .collect();
    times.sort();
    times
}

// ============================================================================
// CSV conversion
// ============================================================================

#[test]
fn csv_conversion_writes_one_file_per_export() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();

    let stats = convert_to_csv(src.path(), dst.path(), &FsProbe).unwrap();
    assert_eq!(stats.converted(), 4);
    assert_eq!(stats.rows(), 2 + 2 + 2 + 2);

    let charity = read(dst.path(), "extract_charity.bcp.csv");
    let lines: Vec<_> = charity.split("\r\n").collect();
    assert!(lines[0].starts_with("200000,0,THE CHARITY,R,TRUST DEED,ENGLAND,,F,"));
    assert_eq!(lines[0].matches(',').count(), 17);

    let sir = read(dst.path(), "sir_data.bcp.csv");
    assert_eq!(
        sir,
        "200000,THE CHARITY,2014,1,Who benefits?,\"Children\nand families\"\r\n\
         200000,THE CHARITY,2014,2,Where?,Wales\r\n"
    );
}

#[test]
fn csv_conversion_is_idempotent() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();

    convert(OutputFormat::Csv, src.path(), dst.path(), &FsProbe).unwrap();
    let before = modified_times(dst.path());
    let contents = read(dst.path(), "extract_objects.bcp.csv");

    let stats = convert(OutputFormat::Csv, src.path(), dst.path(), &FsProbe).unwrap();
    assert_eq!(stats.converted(), 0);
    assert_eq!(stats.skipped(), 4);
    assert_eq!(modified_times(dst.path()), before);
    assert_eq!(read(dst.path(), "extract_objects.bcp.csv"), contents);
}

#[test]
fn existing_csv_output_is_not_overwritten() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();
    fs::write(dst.path().join("extract_charity.bcp.csv"), "keep me").unwrap();

    let stats = convert_to_csv(src.path(), dst.path(), &FsProbe).unwrap();
    assert_eq!(stats.skipped(), 1);
    assert_eq!(stats.converted(), 3);
    assert_eq!(read(dst.path(), "extract_charity.bcp.csv"), "keep me");
}

// ============================================================================
// RDF conversion
// ============================================================================

#[test]
fn rdf_conversion_writes_published_tables() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();

    let stats = convert_to_rdf(src.path(), dst.path(), &FsProbe).unwrap();
    assert_eq!(stats.converted(), 4);
    assert!(stats.missing() > 0);
    assert!(!dst.path().join("class.ttl").exists());

    let charity = read(dst.path(), "charity.ttl");
    assert!(charity.starts_with("@prefix s: <http://schema.org/> .\n"));
    assert!(charity.contains("charity:200000 a s:Organization, ont:Charity\n"));
    assert!(charity.contains("\t; s:name \"THE CHARITY\"\n"));
    assert!(charity.contains("\t; ont:registerStatus reg:REGISTERED\n"));
    assert!(charity.contains(
        "charity:200000 s:childOrganization \
         <http://data.networkedplanet.com/data/charity_commission/charity/200000/subsidiary/1> .\n"
    ));
    assert!(charity.contains("\t; ont:registerStatus reg:REMOVED\n"));
    assert!(charity.contains("ont:Charity, ont:NhsCharity\n"));

    let registration = read(dst.path(), "registration.ttl");
    assert!(registration.contains(
        "\t; ont:registrationDate <http://reference.data.gov.uk/id/day/1961-09-14>\n"
    ));
    assert!(registration.contains("\t; ont:removalDateTimestamp \"2001-05-31T00:00:00\"^^xsd:dateTime\n"));
    assert!(registration.contains("\t; ont:removalReason rem:01\n"));

    let objectives = read(dst.path(), "objectives.ttl");
    assert!(objectives.ends_with("ont:objective \"TO RELIEVE POVERTY\" .\n"));

    let sir = read(dst.path(), "sir_data.ttl");
    assert_eq!(sir.matches("a ont:SummaryInformationReturn").count(), 1);
    assert_eq!(sir.matches("a ont:SummaryInformationResponse").count(), 2);
    assert!(sir.contains("ont:responseText \"Children\\nand families\""));
}

#[test]
fn rdf_conversion_is_idempotent() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();

    convert(OutputFormat::Rdf, src.path(), dst.path(), &FsProbe).unwrap();
    let before = modified_times(dst.path());

    let stats = convert(OutputFormat::Rdf, src.path(), dst.path(), &FsProbe).unwrap();
    assert_eq!(stats.converted(), 0);
    assert_eq!(stats.skipped(), 4);
    assert_eq!(modified_times(dst.path()), before);
}

#[test]
fn malformed_table_leaves_no_output() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(
        src.path().join("extract_name.bcp"),
        b"1@**@0@**@1@**@FIRST NAME*@@*2@**@0@**@SECOND*@@*",
    )
    .unwrap();

    let err = convert_to_rdf(src.path(), dst.path(), &FsProbe).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("extract_name.bcp"));
    assert!(message.contains("Expected 4 cells, got 3"));

    let left: Vec<_> = fs::read_dir(dst.path()).unwrap().collect();
    assert!(left.is_empty());
}

#[test]
fn injected_probe_controls_skipping() {
    let src = sample_sources();
    let dst = TempDir::new().unwrap();

    let skip_all = |_: &Path| true;
    let stats = convert_to_rdf(src.path(), dst.path(), &skip_all).unwrap();
    assert_eq!(stats.converted(), 0);
    assert_eq!(stats.missing(), 0);
    assert!(fs::read_dir(dst.path()).unwrap().next().is_none());
}
