//! `multiver check`: cross-variant consistency on this machine.

use anyhow::{bail, Result};
use multiver_kernels::check_all;

pub fn execute(all: bool) -> Result<()> {
    let checks = check_all();
    let failed = checks.iter().filter(|c| !c.passed()).count();

    for check in checks.iter().filter(|c| all || !c.passed()) {
        let status = if check.passed() { "ok" } else { "FAIL" };
        println!(
            "{status:<4} {:<12} {:<10} max {} ulp (bound {})",
            check.operation, check.variant, check.max_ulp, check.bound
        );
    }

    if failed > 0 {
        bail!("{failed} of {} variants deviate from their baseline", checks.len());
    }
    println!("all {} variants consistent", checks.len());
    Ok(())
}
