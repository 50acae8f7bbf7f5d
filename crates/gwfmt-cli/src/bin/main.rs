//! gwfmt binary entry point

use anyhow::Result;
use gwfmt_cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
