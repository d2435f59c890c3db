use anyhow::Context as _;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use tracing::{debug, warn};
use wolfram_core::{Config, Solver, Step, Units, solver_from_config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wolfram", version, about = "Ask Wolfram Alpha from the terminal")]
pub struct Cli {
    /// Override the configured unit system ("metric" or "imperial").
    #[arg(long, global = true)]
    pub units: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the Wolfram Alpha appid and preferred units.
    Configure,

    /// Print the short spoken answer to a question.
    Ask { query: String },

    /// Fetch an image of the answer and print its path.
    Image { query: String },

    /// Print the step-by-step explanation of an answer.
    Explain { query: String },

    /// Print the raw structured result as JSON.
    Data { query: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = resolve_config(Config::load(), self.units.as_deref(), &self.command)?;

        match self.command {
            Command::Configure => configure(config),
            Command::Ask { query } => {
                let solver = solver_from_config(&config)?;
                match solver.get_spoken_answer(&query, None).await? {
                    Some(answer) => println!("{answer}"),
                    None => println!("Wolfram Alpha has no spoken answer for: {query}"),
                }
                Ok(())
            }
            Command::Image { query } => {
                let solver = solver_from_config(&config)?;
                let path = solver.get_image(&query, None).await?;
                println!("{}", path.display());
                Ok(())
            }
            Command::Explain { query } => {
                let solver = solver_from_config(&config)?;
                let steps = solver.get_expanded_answer(&query, None).await?;
                if steps.is_empty() {
                    println!("No explanation available for: {query}");
                }
                for step in &steps {
                    print_step(step);
                }
                Ok(())
            }
            Command::Data { query } => {
                let solver = solver_from_config(&config)?;
                let data = solver.get_data(&query, None).await?;
                let pretty = serde_json::to_string_pretty(&data)
                    .context("Failed to format Wolfram Alpha response")?;
                println!("{pretty}");
                Ok(())
            }
        }
    }
}

/// Effective configuration for `command`.
///
/// `configure` starts from the defaults when the stored config or the
/// `--units` override is unusable, so a broken file can still be repaired.
fn resolve_config(
    loaded: anyhow::Result<Config>,
    units: Option<&str>,
    command: &Command,
) -> anyhow::Result<Config> {
    let repairing = matches!(command, Command::Configure);

    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(err) if repairing => {
            warn!("Ignoring unusable config, starting from defaults: {err:#}");
            Config::default()
        }
        Err(err) => return Err(err),
    };

    if let Some(units) = units {
        match Units::try_from(units) {
            Ok(units) => {
                debug!(%units, "units overridden from the command line");
                config.units = units;
            }
            Err(err) if repairing => warn!("Ignoring --units: {err}"),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(config)
}

fn configure(current: Config) -> anyhow::Result<()> {
    let appid = Text::new("Wolfram Alpha appid:")
        .with_default(&current.appid)
        .prompt()
        .context("Failed to read appid")?;

    let start = Units::all()
        .iter()
        .position(|u| *u == current.units)
        .unwrap_or(0);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    let config = Config::new(appid.trim(), units)?;
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    if config.uses_demo_appid() {
        println!("Note: using the bundled demo appid; it is shared and rate limited.");
    }
    Ok(())
}

fn print_step(step: &Step) {
    println!("== {}", step.title);
    if let Some(summary) = &step.summary {
        // Drop the spoken "title\n." lead-in; the heading already shows it.
        let lead = format!("{}\n.", step.title);
        println!("{}", summary.strip_prefix(lead.as_str()).unwrap_or(summary.as_str()));
    }
    if let Some(img) = &step.img {
        println!("[image] {img}");
    }
    println!();
}
