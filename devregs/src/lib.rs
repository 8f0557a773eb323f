//! devregs - clean up line-oriented device register descriptions
//!
//! input is a list of register declarations (`NAME ADDRESS[.WIDTH]`), each
//! optionally followed by bit-field declarations (`:NAME:BIT` or
//! `:NAME:HIGH-LOW`). the pipeline dedupes fields, registers and field sets
//! and produces a report where field sets shared by several registers are
//! listed once.
//!
//! - no validation of overlapping registers or bit ranges
//! - malformed lines are reported and skipped, never fatal

mod diagnostics;
mod line;
mod pipeline;
mod reader;
pub mod registry;
pub mod report;
pub mod types;

pub use diagnostics::Diagnostic;
pub use line::{FieldDecl, Line, LineError, RegisterDecl, classify};
pub use pipeline::{Analysis, DevregsAnalyzer, LineCounts, Pipeline, analyze_lines};
pub use reader::load_lines;
pub use registry::{FieldSetTable, FieldTable, RegisterTable};
pub use report::Report;
pub use types::{DEFAULT_WIDTH, Field, FieldId, FieldSet, FieldSetId, Register, RegisterId};
