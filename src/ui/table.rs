use tabled::{builder::Builder, settings::Style};

use crate::entity::EntityDescriptor;
use crate::value::FieldValue;

/// Render listed rows as a grid: header from the descriptor's column names,
/// one record per row. Column count varies per entity, hence the builder
/// rather than a derived row type.
pub fn render_rows(desc: &EntityDescriptor, rows: &[Vec<FieldValue>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(desc.column_names().map(str::to_string));
    for row in rows {
        builder.push_record(row.iter().map(|v| v.to_string()));
    }
    builder.build().with(Style::rounded()).to_string()
}
