use super::{required, RecordMapper};
use crate::models::Record;
use crate::turtle::Statement;
use anyhow::Result;

/// `extract_class`: charitable purpose classifications per charity.
#[derive(Default)]
pub struct ClassificationMapper;

pub fn classifications() -> Box<dyn RecordMapper> {
    Box::new(ClassificationMapper)
}

impl RecordMapper for ClassificationMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let regno = required(record, 0, "registered number")?;
        let class = required(record, 1, "class code")?;
        out.push(
            Statement::new(format!("charity:{}", regno))
                .with("ont:charitablePurpose", format!("class:{}", class)),
        );
        Ok(())
    }
}

/// `extract_class_ref`
#[derive(Default)]
pub struct ClassReferenceMapper;

pub fn class_reference() -> Box<dyn RecordMapper> {
    Box::new(ClassReferenceMapper)
}

impl RecordMapper for ClassReferenceMapper {
    fn map(&mut self, record: &Record, out: &mut Vec<Statement>) -> Result<()> {
        let class = required(record, 0, "class code")?;
        let mut st = Statement::new(format!("class:{}", class)).a("ont:CharitablePurposeClass");
        st.add_literal("rdfs:label", record.cell(1));
        out.push(st);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::test_support::{record, render};

    #[test]
    fn classification_triple() {
        let row = record(&[Some("200000"), Some("101")]);
        assert_eq!(
            render(&mut ClassificationMapper, &[row]),
            "charity:200000 ont:charitablePurpose class:101 .\n"
        );
    }

    #[test]
    fn class_reference_label() {
        let row = record(&[Some("101"), Some("General Charitable Purposes")]);
        assert_eq!(
            render(&mut ClassReferenceMapper, &[row]),
            "class:101 a ont:CharitablePurposeClass\n\t; rdfs:label \"General Charitable Purposes\"\n\t.\n"
        );
    }

    #[test]
    fn missing_class_code_is_an_error() {
        let row = record(&[Some("200000"), None]);
        let mut out = Vec::new();
        assert!(ClassificationMapper.map(&row, &mut out).is_err());
        assert!(out.is_empty());
    }
}
