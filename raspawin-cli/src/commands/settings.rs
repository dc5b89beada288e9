use crate::AppContext;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the configuration in effect
    Show,
    /// Write the configuration in effect to the data directory
    Init,
}

pub fn handle_config_command(cmd: ConfigCommands, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            println!();
            println!("Database: {}", ctx.config.db_path().display());
        }

        ConfigCommands::Init => {
            let path = ctx.config.save()?;
            println!("Configuration written to {}", path.display());
        }
    }

    Ok(())
}
