//! Plain-text Turtle output.
//!
//! Statements are rendered straight to the writer as they are mapped; no
//! graph is held in memory.

use std::io::{self, Write};

pub const CHARITY_NS: &str = "http://data.networkedplanet.com/data/charity_commission/charity/";

/// Prefix block written at the top of every generated file, in this order.
pub const PREFIXES: &[(&str, &str)] = &[
    ("s", "http://schema.org/"),
    ("charity", CHARITY_NS),
    (
        "ont",
        "http://data.networkedplanet.com/data/charity_commission/ontology/",
    ),
    (
        "reg",
        "http://data.networkedplanet.com/data/charity_commission/ontology/registerStatus/",
    ),
    (
        "rem",
        "http://data.networkedplanet.com/data/charity_commission/ontology/removalReason/",
    ),
    // Published IRIs already use this spelling.
    (
        "area",
        "http://data.networkedplanet.com/data/charity_commision/ontology/area/",
    ),
    (
        "class",
        "http://data.networkedplanet.com/data/charity_commission/ontology/class/",
    ),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("oc", "https://opencorporates.com/id/companies/gb/"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// Trims the value and escapes it for use inside a double-quoted literal.
pub fn escape_literal(s: &str) -> String {
    let s = s.trim();
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out
}

pub fn literal(s: &str) -> String {
    format!("\"{}\"", escape_literal(s))
}

pub fn typed_literal(lexical: &str, datatype: &str) -> String {
    format!("\"{}\"^^{}", escape_literal(lexical), datatype)
}

/// Full IRI under the charity namespace, e.g. `<…/charity/200000/accounts/7>`.
pub fn charity_resource(path: &str) -> String {
    format!("<{}{}>", CHARITY_NS, path)
}

/// Identifier for a charity, or for one of its subsidiaries when `subno` is
/// present and non-zero.
pub fn charity_iri(regno: &str, subno: Option<&str>) -> String {
    match subno {
        Some(sub) if !sub.is_empty() && sub != "0" => {
            charity_resource(&format!("{}/subsidiary/{}", regno, sub))
        }
        _ => charity_resource(regno),
    }
}

/// One subject with its types and predicate-object list.
///
/// A statement with a single predicate and no types renders on one line.
#[derive(Debug, Clone)]
pub struct Statement {
    subject: String,
    types: Vec<String>,
    pairs: Vec<(String, String)>,
}

impl Statement {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            types: Vec::new(),
            pairs: Vec::new(),
        }
    }

    pub fn a(mut self, rdf_type: &str) -> Self {
        self.types.push(rdf_type.to_string());
        self
    }

    pub fn add(&mut self, predicate: &str, object: impl Into<String>) -> &mut Self {
        self.pairs.push((predicate.to_string(), object.into()));
        self
    }

    pub fn add_type(&mut self, rdf_type: &str) -> &mut Self {
        self.types.push(rdf_type.to_string());
        self
    }

    pub fn with(mut self, predicate: &str, object: impl Into<String>) -> Self {
        self.add(predicate, object);
        self
    }

    /// Adds an escaped string literal when `value` is present and non-empty.
    pub fn add_literal(&mut self, predicate: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.add(predicate, literal(v));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.pairs.is_empty()
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        write!(out, "{}", self.subject)?;
        let mut first = true;
        if !self.types.is_empty() {
            write!(out, " a {}", self.types.join(", "))?;
            first = false;
        }
        for (p, o) in &self.pairs {
            if first {
                write!(out, " {} {}", p, o)?;
                first = false;
            } else {
                write!(out, "\n\t; {} {}", p, o)?;
            }
        }
        if self.types.is_empty() && self.pairs.len() == 1 {
            out.write_all(b" .\n")
        } else {
            out.write_all(b"\n\t.\n")
        }
    }
}

/// Streams statements to `inner`, counting how many were written.
pub struct TurtleWriter<W: Write> {
    inner: W,
    statements: u64,
}

impl<W: Write> TurtleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            statements: 0,
        }
    }

    pub fn write_prefixes(&mut self) -> io::Result<()> {
        for (prefix, iri) in PREFIXES {
            writeln!(self.inner, "@prefix {}: <{}> .", prefix, iri)?;
        }
        Ok(())
    }

    pub fn statement(&mut self, statement: &Statement) -> io::Result<()> {
        if statement.is_empty() {
            return Ok(());
        }
        statement.render(&mut self.inner)?;
        self.statements += 1;
        Ok(())
    }

    pub fn statements(&self) -> u64 {
        self.statements
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
