use clap::Parser;
use page_forge::cli::commands::{cmd_generate, cmd_purge_cache, cmd_run};
use page_forge::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());

    // CLI cache flags override the config file
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = dir.clone();
    }
    if let Some(ttl) = cli.cache_ttl_secs {
        config.cache.ttl_secs = ttl;
    }

    // Resolve LLM settings: CLI > config > defaults
    let llm_endpoint = cli
        .llm_endpoint
        .as_deref()
        .or(config.llm.endpoint.as_deref());
    let llm_model = cli.llm_model.as_deref().or(config.llm.model.as_deref());

    match &cli.command {
        Commands::Generate {
            input,
            output_dir,
            generator,
            offline,
        } => {
            cmd_generate(
                input,
                output_dir,
                generator,
                *offline,
                cli.verbose,
                llm_endpoint,
                llm_model,
                &config,
            )?;
        }
        Commands::Run {
            input,
            timeout_ms,
            healing_log,
        } => {
            let all_passed = cmd_run(input, *timeout_ms, healing_log, cli.verbose, &config)?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::PurgeCache => {
            cmd_purge_cache(&config, cli.verbose)?;
        }
    }

    Ok(())
}
