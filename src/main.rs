use clap::Parser;
use pal_graph::{CliArgs, ConvertConfig, LoggingConfig, init_logging, run};

fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ConvertConfig::from_args(cli)?;

    // fail fast before touching the workbook
    config.validate()?;

    let summary = run(&config)?;
    println!("{}", summary.completion_message(&config));
    Ok(())
}
