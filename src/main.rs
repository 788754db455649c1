//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;

use cbb_sync::{
    cli::{CbbSync, Commands},
    commands::{
        roster::run_roster, schedule::run_schedule, seed_fantasy::run_seed_fantasy,
        stats::run_stats, RunContext,
    },
    config, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    config::load_env();
    let app = CbbSync::parse();

    match app.command {
        Commands::Roster { common } => {
            let mut ctx = RunContext::from_common(&common)?;
            run_roster(&mut ctx).await?;
        }

        Commands::Schedule { common, schedule } => {
            let mut ctx = RunContext::from_common(&common)?;
            run_schedule(&mut ctx, &schedule).await?;
        }

        Commands::Stats { common, stats } => {
            let mut ctx = RunContext::from_common(&common)?;
            run_stats(&mut ctx, &stats).await?;
        }

        Commands::SeedFantasy {
            common,
            draft_order,
        } => {
            let mut ctx = RunContext::from_common(&common)?;
            run_seed_fantasy(&mut ctx, draft_order.as_deref()).await?;
        }

        Commands::All {
            common,
            schedule,
            stats,
        } => {
            let mut ctx = RunContext::from_common(&common)?;
            run_roster(&mut ctx).await?;
            run_schedule(&mut ctx, &schedule).await?;
            run_stats(&mut ctx, &stats).await?;
        }
    }

    Ok(())
}
