use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use edgestack::cli::{
    format_stack_list, format_synth_summary, format_validation_result, list_stacks, load_app,
    show_stack, synth, validate_deployment_file, Cli, Commands,
};
use edgestack::config::load_env_file;

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Load .env file before the target environment is resolved
    if let Some(ref env_file) = cli.env_file {
        load_env_file(env_file)?;
    }

    match cli.command {
        Commands::Synth(args) => {
            let app = load_app(&args.config, args.context.as_deref())
                .with_context(|| format!("loading {}", args.config.display()))?;
            let summary = synth(&app, &args.output, args.format)?;
            print!("{}", format_synth_summary(&summary));
        }
        Commands::Validate(args) => {
            let result = validate_deployment_file(&args.config);
            print!(
                "{}",
                format_validation_result(&result, &args.config.display().to_string())
            );
            if !result.valid {
                process::exit(1);
            }
        }
        Commands::List(args) => {
            let app = load_app(&args.config, args.context.as_deref())
                .with_context(|| format!("loading {}", args.config.display()))?;
            print!("{}", format_stack_list(&list_stacks(&app)?));
        }
        Commands::Show(args) => {
            let app = load_app(&args.config, args.context.as_deref())
                .with_context(|| format!("loading {}", args.config.display()))?;
            println!("{}", show_stack(&app, &args.stack, args.format)?);
        }
    }

    Ok(())
}
