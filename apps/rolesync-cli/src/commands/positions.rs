//! Show the effective position table

use clap::Args;

use super::load_positions;
use crate::config::Config;
use crate::error::CliResult;

/// Print the position → group table
#[derive(Args, Debug)]
pub struct PositionsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the positions command
pub fn execute(args: PositionsArgs, config: &Config) -> CliResult<()> {
    let positions = load_positions(config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&positions)?);
        return Ok(());
    }

    let width = positions.iter().map(|(p, _)| p.len()).max().unwrap_or(0);
    for (position, group) in positions.iter() {
        println!("{position:<width$}  {group}");
    }
    Ok(())
}
