//! Areas of operation: the reference list and the per-charity links.

use super::{required, RecordMapper};
use crate::models::Record;
use crate::turtle::Statement;
use anyhow::Result;

fn area(area_type: &str, key: &str) -> String {
    format!("area:{}{}", area_type, key)
}

/// `extract_aoo_ref`
#[derive(Default)]
pub struct AreaReferenceMapper;

pub fn area_reference() -> Box<dyn RecordMapper> {
    Box::new(AreaReferenceMapper)
}

impl RecordMapper for AreaReferenceMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let area_type = required(record, 0, "area type")?;
        let key = required(record, 1, "area key")?;
        let schema_type = if area_type == "D" {
            "s:Country"
        } else {
            "s:AdministrativeArea"
        };

        let mut st = Statement::new(area(area_type, key))
            .a("ont:Area")
            .a(schema_type);
        st.add_literal("rdfs:label", record.cell(2));
        st.add_literal("s:name", record.cell(2));
        st.add_literal("s:description", record.cell(3));
        out.push(st);
        Ok(())
    }
}

/// `extract_charity_aoo`
///
/// The master column refers to the enclosing area: a continent for
/// countries (`D`), a GLA or county for boroughs (`B`).
#[derive(Default)]
pub struct CharityAreaMapper;

pub fn charity_areas() -> Box<dyn RecordMapper> {
    Box::new(CharityAreaMapper)
}

impl RecordMapper for CharityAreaMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let area_type = required(record, 1, "area type")?;
        let area_id = area(area_type, record.text(2));

        out.push(
            Statement::new(format!("charity:{}", regno))
                .with("ont:areaOfOperation", area_id.clone()),
        );

        if let Some(master) = record.cell(4) {
            let container = match area_type {
                "D" => Some(area("E", master)),
                "B" => Some(area("C", master)),
                _ => None,
            };
            if let Some(container) = container {
                out.push(Statement::new(area_id).with("s:containedInPlace", container));
            }
        }
        Ok(())
    }
}
