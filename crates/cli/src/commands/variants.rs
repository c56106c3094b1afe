//! `multiver variants`: registered and selected variants per operation.

use anyhow::{bail, Result};
use multiver_dispatch::{detected, OperationInfo};
use multiver_kernels::catalog;

pub fn execute(op: Option<&str>) -> Result<()> {
    let selected: Vec<&dyn OperationInfo> = match op {
        Some(name) => match catalog::find(name) {
            Some(info) => vec![info],
            None => bail!("unknown operation `{name}` (see `multiver variants` for the list)"),
        },
        None => catalog::operations().to_vec(),
    };

    let caps = detected();
    for (i, info) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let resolved = info.resolved_summary();
        println!("{} -> {}", info.operation(), resolved.name);

        // Most specific first, baseline last.
        let mut variants = info.variant_summaries();
        variants.sort_by(|a, b| b.required.preference_cmp(&a.required));

        for variant in variants {
            let marker = if variant.name == resolved.name {
                '*'
            } else if variant.required.is_subset_of(caps) {
                '+'
            } else {
                ' '
            };
            println!("  {marker} {:<10} {}", variant.name, variant.required);
        }
    }

    Ok(())
}
