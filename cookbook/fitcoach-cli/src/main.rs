use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use fitcoach::{fitness_team, init_tracing, AppConfig, ToolContext};
use serde_json::Value;

/// Call the fitness team's mock tools from the command line.
#[derive(Parser, Debug)]
#[command(name = "fitcoach")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML configuration file. Defaults plus `FITCOACH_*` overrides when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the random source for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every tool with its description and parameters.
    Tools,

    /// Invoke a tool by name.
    Call {
        /// Tool name, e.g. `get_weather`.
        tool: String,

        /// JSON object of keyword arguments.
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Print the system prompt of a team member.
    Prompt {
        /// Agent name, e.g. "Planning Agent".
        agent: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_env_or_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AppConfig::from_env()?,
    };
    if let Some(seed) = cli.seed {
        config.tools.seed = Some(seed);
    }
    init_tracing(&config.telemetry)?;

    let ctx = ToolContext::from_config(&config.tools);
    let team = fitness_team(&config, &ctx);

    match cli.command {
        Command::Tools => {
            for agent in team.members() {
                println!("{} ({})", agent.name(), agent.role());
                for tool in agent.tool_descriptions() {
                    println!("  {}: {}", tool.name, tool.description);
                    if let Some(params) = tool.parameters {
                        println!("    parameters: {params}");
                    }
                }
            }
        }
        Command::Call { tool, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            if !arguments.is_object() {
                return Err(anyhow!("--args must be a JSON object, got {arguments}"));
            }
            let output = team.call_tool(&tool, arguments).await?;
            match output {
                Value::String(text) => print!("{text}"),
                other => println!("{other}"),
            }
        }
        Command::Prompt { agent } => {
            let profile = team
                .member(&agent)
                .ok_or_else(|| anyhow!("unknown agent `{agent}`"))?;
            print!("{}", profile.system_prompt());
        }
    }

    tracing::debug!(team = team.name(), "done");
    Ok(())
}
