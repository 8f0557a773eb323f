use crate::diagnostics::Diagnostic;
use crate::line::{Line, classify};
use crate::reader;
use crate::registry::{FieldSetTable, FieldTable, RegisterTable};
use crate::types::{FieldId, RegisterId};
use anyhow::Result;
use serde::Serialize;

/// number of input lines of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineCounts {
    pub comment: usize,
    pub register: usize,
    pub field: usize,
    pub parse_error: usize,
}

impl LineCounts {
    pub fn total(&self) -> usize {
        self.comment + self.register + self.field + self.parse_error
    }

    fn count(&mut self, line: &Line) {
        match line {
            Line::Comment => self.comment += 1,
            Line::Register(_) => self.register += 1,
            Line::Field(_) => self.field += 1,
            Line::ParseError(_) => self.parse_error += 1,
        }
    }
}

/// final, read-only state of a run
#[derive(Debug, Clone)]
pub struct Analysis {
    pub fields: FieldTable,
    pub registers: RegisterTable,
    pub field_sets: FieldSetTable,
    pub line_counts: LineCounts,
    pub diagnostics: Vec<Diagnostic>,
}

/// single pass over the input lines.
///
/// fields are collected until the next register declaration (or the end of
/// input) because a field set's identity depends on all of its fields.
#[derive(Debug, Default)]
pub struct Pipeline {
    fields: FieldTable,
    registers: RegisterTable,
    field_sets: FieldSetTable,
    line_counts: LineCounts,
    diagnostics: Vec<Diagnostic>,
    line_number: usize,
    previous_register: Option<RegisterId>,
    pending_fields: Vec<FieldId>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// use a custom field set table, e.g. one with a different hash
    pub fn with_field_sets(field_sets: FieldSetTable) -> Self {
        Self {
            field_sets,
            ..Self::default()
        }
    }

    pub fn feed(&mut self, raw: &str) {
        self.line_number += 1;
        let line = classify(raw);
        self.line_counts.count(&line);

        match line {
            Line::Comment => {}
            Line::ParseError(error) => {
                self.report(Diagnostic::Malformed {
                    line: self.line_number,
                    text: raw.trim_end().to_string(),
                    error,
                });
            }
            Line::Field(decl) => {
                let id = self.fields.resolve(decl);
                self.pending_fields.push(id);
            }
            Line::Register(decl) => {
                self.close_field_set();
                self.previous_register = Some(self.registers.resolve(decl));
            }
        }
    }

    pub fn finish(mut self) -> Analysis {
        self.close_field_set();

        log::info!(
            "processed {} lines: {} fields, {} registers, {} field sets, {} diagnostics",
            self.line_counts.total(),
            self.fields.len(),
            self.registers.len(),
            self.field_sets.len(),
            self.diagnostics.len()
        );

        Analysis {
            fields: self.fields,
            registers: self.registers,
            field_sets: self.field_sets,
            line_counts: self.line_counts,
            diagnostics: self.diagnostics,
        }
    }

    /// attach the pending fields to the previous register
    fn close_field_set(&mut self) {
        if self.pending_fields.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_fields);

        let Some(register_id) = self.previous_register else {
            self.report(Diagnostic::FieldsBeforeRegister {
                line: self.line_number,
                count: pending.len(),
            });
            return;
        };

        let set_id = self.field_sets.resolve(pending, &self.fields);
        match self.registers.attach(register_id, set_id) {
            Ok(Some(previous)) => {
                log::debug!("field set {} replaced by {}", previous, set_id);
                if let Some(register) = self.registers.get(register_id) {
                    let diagnostic = Diagnostic::FieldSetOverwrite {
                        line: self.line_number,
                        register: register.name.clone(),
                        address: register.address.clone(),
                    };
                    self.report(diagnostic);
                }
            }
            Ok(None) => {}
            Err(error) => self.report(Diagnostic::RegisterNotFound {
                line: self.line_number,
                error,
            }),
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// run the whole pipeline over a sequence of lines
pub fn analyze_lines<I, S>(lines: I) -> Analysis
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pipeline = Pipeline::new();
    for line in lines {
        pipeline.feed(line.as_ref());
    }
    pipeline.finish()
}

pub struct DevregsAnalyzer {
    lines: Vec<String>,
}

impl DevregsAnalyzer {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// load a devregs file from path
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let lines = reader::load_lines(path)?;
        Ok(Self::new(lines))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn extract_analysis(&self) -> Analysis {
        analyze_lines(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSetId;

    fn run(input: &str) -> Analysis {
        analyze_lines(input.lines())
    }

    fn field_set_of(analysis: &Analysis, name: &str) -> Option<FieldSetId> {
        analysis
            .registers
            .by_address()
            .flat_map(|(_, regs)| regs)
            .find(|r| r.name == name)
            .and_then(|r| r.field_set)
    }

    #[test]
    fn test_line_counts() {
        let analysis = run("# header\nREG1 0x10\n:F0:3\n\n0bad\n:F1:x\n");
        assert_eq!(
            analysis.line_counts,
            LineCounts {
                comment: 2,
                register: 1,
                field: 1,
                parse_error: 2,
            }
        );
        assert_eq!(analysis.line_counts.total(), 6);
        assert_eq!(analysis.diagnostics.len(), 2);
        assert_eq!(analysis.diagnostics[0].line(), 5);
        assert_eq!(analysis.diagnostics[1].line(), 6);
    }

    #[test]
    fn test_register_without_fields() {
        let analysis = run("REG1 0x10\nREG2 0x14\n:F0:0\n");
        assert_eq!(field_set_of(&analysis, "REG1"), None);
        assert_eq!(field_set_of(&analysis, "REG2"), Some(FieldSetId(0)));
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn test_pending_fields_closed_at_end_of_input() {
        let analysis = run("REG1 0x10\n:F0:0\n:F1:1-2");
        let set = field_set_of(&analysis, "REG1").expect("REG1 should have fields");
        assert_eq!(analysis.field_sets.get(set).unwrap().fields.len(), 2);
    }

    #[test]
    fn test_fields_before_any_register() {
        let analysis = run(":F0:0\n:F1:1\nREG1 0x10\nREG2 0x20\n");
        assert_eq!(
            analysis.diagnostics,
            vec![Diagnostic::FieldsBeforeRegister { line: 3, count: 2 }]
        );
        assert!(analysis.field_sets.is_empty());
        assert_eq!(field_set_of(&analysis, "REG1"), None);
        // the fields themselves are still known
        assert_eq!(analysis.fields.len(), 2);
    }

    #[test]
    fn test_fields_only_input() {
        let analysis = run(":F0:0\n");
        assert_eq!(
            analysis.diagnostics,
            vec![Diagnostic::FieldsBeforeRegister { line: 1, count: 1 }]
        );
        assert!(analysis.registers.is_empty());
    }

    #[test]
    fn test_redeclared_register_overwrites_field_set() {
        let analysis = run("REG1 0x10\n:A:0\nREG2 0x20\nREG1 0x10\n:B:1\n");
        assert_eq!(analysis.registers.duplicates(), 1);
        assert_eq!(analysis.field_sets.len(), 2);
        assert_eq!(field_set_of(&analysis, "REG1"), Some(FieldSetId(1)));
        assert_eq!(
            analysis.diagnostics,
            vec![Diagnostic::FieldSetOverwrite {
                line: 5,
                register: "REG1".to_string(),
                address: "0X10".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_error_does_not_close_field_set() {
        let analysis = run("REG1 0x10\n:A:0\n???\n:B:1\n");
        let set = field_set_of(&analysis, "REG1").unwrap();
        assert_eq!(analysis.field_sets.get(set).unwrap().fields.len(), 2);
        assert_eq!(analysis.line_counts.parse_error, 1);
    }

    #[test]
    fn test_custom_field_set_table() {
        let mut pipeline = Pipeline::with_field_sets(FieldSetTable::with_hasher(|_| 0));
        for line in ["R1 0x0", ":A:1", ":B:2", "R2 0x4", ":A:2", ":B:1", "R3 0x8", ":B:2", ":A:1"] {
            pipeline.feed(line);
        }
        let analysis = pipeline.finish();

        assert_eq!(analysis.field_sets.hash_count(), 1);
        assert_eq!(analysis.field_sets.len(), 2);
        assert_eq!(analysis.field_sets.duplicates(), 1);
        assert_eq!(field_set_of(&analysis, "R1"), field_set_of(&analysis, "R3"));
        assert_ne!(field_set_of(&analysis, "R1"), field_set_of(&analysis, "R2"));
    }
}
