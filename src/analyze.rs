//! The `analyze` subcommand: derive the per-window summary table.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::AnalyzeArgs;
use crate::{input, setup};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let mut case = setup::build_case(&args.input)?;

    if args.fit_rate {
        let fit = case
            .minimize_lsq()
            .context("rate parameter reconciliation failed")?;
        info!(
            alpha = fit.alpha,
            beta = fit.beta,
            converged = fit.converged,
            "rate parameters reconciled"
        );
    }

    let table = case.summary()?;
    info!(
        n_windows = table.times().len(),
        n_columns = table.n_columns(),
        "summary assembled"
    );
    input::write_table(args.output.as_ref(), &table)
}
