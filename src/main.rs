use clap::Parser;
use lint_reviewdog::cli::{Cli, Commands, ConvertArgs, RunArgs};
use lint_reviewdog::convert;
use lint_reviewdog::fs::TokioFileSystem;
use lint_reviewdog::orchestrator;
use lint_reviewdog::reviewdog::ReviewdogCli;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `convert` can print the report on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Convert(args) => convert_report(args).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;
    debug!("Lint report: {}", config.lint_xml_file.display());
    orchestrator::run_action(&config, &TokioFileSystem, &ReviewdogCli::new()).await
}

async fn convert_report(args: ConvertArgs) -> anyhow::Result<()> {
    let input = args.report.input_path();
    let report = args.report.report_config();

    match args.output {
        Some(output) => {
            orchestrator::convert_to_file(&TokioFileSystem, &input, &output, &report).await
        }
        None => {
            let conversion = convert::convert_file(&TokioFileSystem, &input, &report).await?;
            println!("{}", conversion.xml);
            Ok(())
        }
    }
}
