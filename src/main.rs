use anyhow::{bail, Context};
use clap::CommandFactory;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use wikiresearch::cli::export::export_markdown;
use wikiresearch::cli::output::Output;
use wikiresearch::cli::{AskArgs, Cli, Commands};
use wikiresearch::utils::{LogFormat, LoggingConfig};
use wikiresearch::{ResearchOrchestrator, ResearcherConfig, SynthesisClient, WikipediaClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = match ResearcherConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("Invalid configuration: {}", e));
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging, cli.verbose);

    match (&cli.command, cli.ask_args()) {
        (Some(Commands::Config { validate }), _) => show_config(&config, *validate, &output),
        (_, Some(args)) => ask(&config, args, &output).await,
        _ => {
            Cli::command().print_help()?;
            std::process::exit(2);
        }
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_filter = if verbose {
        "wikiresearch=debug,info"
    } else {
        logging.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so `--json` output stays machine-readable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber installed earlier stays in place.
    match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.with_target(false).try_init(),
    }
    .ok();
}

fn show_config(config: &ResearcherConfig, validate: bool, output: &Output) -> anyhow::Result<()> {
    if let Err(e) = config.provider() {
        output.warning(&format!("LLM provider not usable: {}", e));
        output.hint("Export the API key, or set type = \"ollama\" under [llm.provider]");
    }
    if validate {
        output.success("Configuration is valid");
        return Ok(());
    }
    println!("{}", config.to_toml()?);
    Ok(())
}

async fn ask(config: &ResearcherConfig, args: &AskArgs, output: &Output) -> anyhow::Result<()> {
    let query = args.query_text();
    if query.trim().is_empty() {
        bail!("a research question is required");
    }

    let provider = config
        .provider()
        .context("the LLM provider is not configured")?;
    let fetcher = Arc::new(
        WikipediaClient::new(config.wikipedia.endpoint.clone(), config.wikipedia.request_timeout())
            .context("failed to build the Wikipedia client")?,
    );
    let llm = provider
        .create_client(config.generation_settings())
        .context("failed to build the LLM client")?;
    let synthesis = SynthesisClient::new(llm, config.retry_policy(), config.llm.max_prompt_chars);
    let model = synthesis.model_name().to_string();
    tracing::info!(provider = provider.name(), %model, "Using LLM provider");
    let orchestrator = ResearchOrchestrator::new(fetcher, synthesis, config.orchestrator_config());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let options = args.apply(config.research_options());
    if !args.json {
        output.info(&format!(
            "Researching \"{}\" on {}.wikipedia.org with {}",
            query.trim(),
            options.language,
            model
        ));
    }

    let result = orchestrator.run_research(&query, &options, &cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output.research_result(&result);
    }

    if let Some(path) = &args.export {
        let written = export_markdown(&result, path)
            .with_context(|| format!("failed to export to {}", path.display()))?;
        if !args.json {
            output.success(&format!("Exported to {}", written.display()));
        }
    }
    Ok(())
}
