use crate::config::DAY_IRI_BASE;
use thiserror::Error;
use time::macros::format_description;
use time::PrimitiveDateTime;
use tracing::warn;

/// Timestamp layouts found in the exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `2009-09-09 01:06:00`
    Seconds,
    /// `2009-09-09 01:06:00.000`
    Fractional,
}

impl DateFormat {
    fn pattern(self) -> &'static str {
        match self {
            DateFormat::Seconds => "%Y-%m-%d %H:%M:%S",
            DateFormat::Fractional => "%Y-%m-%d %H:%M:%S.%f",
        }
    }
}

#[derive(Debug, Error)]
pub enum DateError {
    #[error("Date value '{value}' does not match format '{pattern}'")]
    Format {
        value: String,
        pattern: &'static str,
        #[source]
        source: time::error::Parse,
    },
    #[error("Failed to format date value '{value}'")]
    Render {
        value: String,
        #[source]
        source: time::error::Format,
    },
}

pub fn parse_datetime(s: &str, format: DateFormat) -> Result<PrimitiveDateTime, DateError> {
    let s = s.trim();
    let parsed = match format {
        DateFormat::Seconds => PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        ),
        DateFormat::Fractional => PrimitiveDateTime::parse(
            s,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        ),
    };
    parsed.map_err(|source| DateError::Format {
        value: s.to_string(),
        pattern: format.pattern(),
        source,
    })
}

fn render_error(value: &str) -> impl FnOnce(time::error::Format) -> DateError + '_ {
    move |source| DateError::Render {
        value: value.trim().to_string(),
        source,
    }
}

/// `<http://reference.data.gov.uk/id/day/YYYY-MM-DD>` for the value's date.
pub fn day_iri(s: &str, format: DateFormat) -> Result<String, DateError> {
    let day = parse_datetime(s, format)?
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(render_error(s))?;
    Ok(format!("<{}{}>", DAY_IRI_BASE, day))
}

/// `xsd:dateTime` lexical form without a timezone.
pub fn xsd_datetime(s: &str, format: DateFormat) -> Result<String, DateError> {
    parse_datetime(s, format)?
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second]"
        ))
        .map_err(render_error(s))
}

/// Best-effort variant of [`day_iri`] for informational fields: a malformed
/// value is logged and read as absent.
pub fn lenient_day_iri(s: &str) -> Option<String> {
    match day_iri(s, DateFormat::Seconds) {
        Ok(iri) => Some(iri),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed date");
            None
        }
    }
}
