//! Column mapping report.
//!
//! Shows, per source, which row was taken as the header and how each raw
//! label was resolved, without coercing or writing any data.

use anyhow::Result;
use log::{info, warn};

use crate::{
    cli::ColumnsArgs,
    consolidate::{Consolidator, SourceMapping},
    load_config, read_sources, table::TextTable,
};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let config = load_config(&args.sources)?;
    let consolidator = Consolidator::new(&config)?;
    let (tables, unreadable) = read_sources(&args.sources)?;

    let mut reported = 0usize;
    for table in &tables {
        match consolidator.map_source(table) {
            Ok(mapping) => {
                print!("{}", render_mapping(&mapping, &consolidator));
                reported += 1;
            }
            Err(err) => warn!("Skipping source '{}': {err}", table.source()),
        }
    }
    info!(
        "Reported column mappings for {reported} of {} source(s) ({unreadable} unreadable)",
        args.sources.inputs.len()
    );
    Ok(())
}

fn render_mapping(mapping: &SourceMapping, consolidator: &Consolidator) -> String {
    let mut table = TextTable::new(["#", "label", "column", "kind", "match", "alias"]);
    for column in &mapping.columns {
        let kind = if column.is_discardable() {
            "-".to_string()
        } else {
            consolidator
                .schema()
                .kind_of(&column.name)
                .map(|kind| kind.to_string())
                .unwrap_or_else(|| "text*".to_string())
        };
        table.push_row([
            (column.position + 1).to_string(),
            column.label.clone(),
            column.name.clone(),
            kind,
            column.kind.to_string(),
            column.alias.clone().unwrap_or_default(),
        ]);
    }
    format!(
        "Source '{}': header row {} (score {}{})\n{}\n",
        mapping.source,
        mapping.header.row + 1,
        mapping.header.score,
        if mapping.header.fell_back {
            ", fell back to first row"
        } else {
            ""
        },
        table
    )
}
