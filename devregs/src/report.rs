//! cleaned-up view of an analysis, ready for printing or JSON output
use crate::diagnostics::Diagnostic;
use crate::pipeline::{Analysis, LineCounts};
use crate::registry::FieldTable;
use crate::types::{Field, FieldId, FieldSetId};
use serde::Serialize;
use std::fmt::{self, Write};

/// register names are padded to this width in text output
const NAME_COLUMN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub lines: LineSummary,
    pub fields: TableSummary,
    pub registers: TableSummary,
    pub field_sets: TableSummary,
    /// field sets used by more than one register
    pub shared_field_sets: Vec<SharedFieldSet>,
    pub addresses: Vec<AddressGroup>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    #[serde(flatten)]
    pub counts: LineCounts,
    pub total: usize,
}

/// `keys` counts the lookup buckets: field names, register addresses or
/// field set hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub keys: usize,
    pub unique: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedFieldSet {
    pub id: FieldSetId,
    pub usage: usize,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressGroup {
    pub address: String,
    pub registers: Vec<RegisterEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    pub name: String,
    pub address: String,
    /// `None` for the default width
    pub width: Option<String>,
    pub fields: RegisterFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisterFields {
    Empty,
    /// field set used only by this register
    Inline { fields: Vec<Field> },
    /// reference to an entry of `shared_field_sets`
    Shared { id: FieldSetId },
}

impl Report {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let field_sets = &analysis.field_sets;

        let shared_field_sets = field_sets
            .iter()
            .filter(|(_, set)| set.usage > 1)
            .map(|(id, set)| SharedFieldSet {
                id,
                usage: set.usage,
                fields: resolve_fields(&set.fields, &analysis.fields),
            })
            .collect();

        let addresses = analysis
            .registers
            .by_address()
            .map(|(address, registers)| AddressGroup {
                address: address.to_string(),
                registers: registers
                    .into_iter()
                    .map(|reg| {
                        let attached = reg
                            .field_set
                            .and_then(|id| field_sets.get(id).map(|set| (id, set)));
                        let fields = match attached {
                            None => RegisterFields::Empty,
                            Some((_, set)) if set.usage == 1 => RegisterFields::Inline {
                                fields: resolve_fields(&set.fields, &analysis.fields),
                            },
                            Some((id, _)) => RegisterFields::Shared { id },
                        };
                        RegisterEntry {
                            name: reg.name.clone(),
                            address: reg.address.clone(),
                            width: reg.display_width().map(str::to_string),
                            fields,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            lines: LineSummary {
                counts: analysis.line_counts,
                total: analysis.line_counts.total(),
            },
            fields: TableSummary {
                keys: analysis.fields.name_count(),
                unique: analysis.fields.len(),
                duplicates: analysis.fields.duplicates(),
            },
            registers: TableSummary {
                keys: analysis.registers.address_count(),
                unique: analysis.registers.len(),
                duplicates: analysis.registers.duplicates(),
            },
            field_sets: TableSummary {
                keys: field_sets.hash_count(),
                unique: field_sets.len(),
                duplicates: field_sets.duplicates(),
            },
            shared_field_sets,
            addresses,
            diagnostics: analysis.diagnostics.clone(),
        }
    }

    /// line and table counts only
    pub fn summary(&self) -> String {
        let mut out = String::new();
        // writing to a String cannot fail
        let _ = self.write_summary(&mut out);
        out
    }

    fn write_summary(&self, out: &mut impl Write) -> fmt::Result {
        let c = &self.lines.counts;
        writeln!(
            out,
            "lines: {} total, {} comment, {} register, {} field, {} parse error",
            self.lines.total, c.comment, c.register, c.field, c.parse_error
        )?;
        writeln!(
            out,
            "fields: {} names, {} unique, {} duplicates",
            self.fields.keys, self.fields.unique, self.fields.duplicates
        )?;
        writeln!(
            out,
            "registers: {} addresses, {} unique, {} duplicates",
            self.registers.keys, self.registers.unique, self.registers.duplicates
        )?;
        writeln!(
            out,
            "field sets: {} hashes, {} unique, {} duplicates",
            self.field_sets.keys, self.field_sets.unique, self.field_sets.duplicates
        )
    }
}

fn resolve_fields(ids: &[FieldId], table: &FieldTable) -> Vec<Field> {
    ids.iter().filter_map(|id| table.get(*id)).cloned().collect()
}

fn write_fields(out: &mut impl Write, fields: &[Field]) -> fmt::Result {
    for field in fields {
        writeln!(out, "\t{}", field)?;
    }
    Ok(())
}

/// full report in devregs syntax: shared field sets as `/fsN` blocks, then
/// every register with its fields inline or a `:fsN/` back-reference
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_summary(f)?;

        for set in &self.shared_field_sets {
            writeln!(f, "/{}\t\t#usage {}", set.id, set.usage)?;
            write_fields(f, &set.fields)?;
        }

        for register in self.addresses.iter().flat_map(|group| &group.registers) {
            let suffix = register
                .width
                .as_deref()
                .map(|w| format!(".{}", w))
                .unwrap_or_default();
            writeln!(
                f,
                "{:<width$}{}{}",
                register.name,
                register.address,
                suffix,
                width = NAME_COLUMN
            )?;
            match &register.fields {
                RegisterFields::Empty => {}
                RegisterFields::Inline { fields } => write_fields(f, fields)?,
                RegisterFields::Shared { id } => writeln!(f, "\t:{}/", id)?,
            }
        }
        Ok(())
    }
}
