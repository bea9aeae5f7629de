use clap::Parser;
use kayit_client::core::ConfigProvider;
use kayit_client::utils::error::ErrorSeverity;
use kayit_client::utils::{logger, validation::Validate};
use kayit_client::{
    format_phone, validate, Cli, ClientConfig, ClientError, Command, DashboardPoller,
    ExportClient, IdentityNumber, LocalStorage, PageController, ReqwestFetcher, SearchClient,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logger::init_logger(logger::LogFormat::from_flag(cli.json_logs), cli.verbose);
    tracing::debug!("CLI arguments: {:?}", cli);

    match run(&cli).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(cli: &Cli) -> kayit_client::Result<i32> {
    match &cli.command {
        Command::Validate { number } => {
            let valid = validate(number);
            println!("{}", if valid { "valid" } else { "invalid" });
            Ok(if valid { 0 } else { 1 })
        }
        Command::FormatPhone { input } => {
            println!("{}", format_phone(input));
            Ok(0)
        }
        Command::Generate { first_nine } => {
            println!("{}", IdentityNumber::complete(first_nine)?);
            Ok(0)
        }
        Command::Inspect => inspect(cli).await,
        Command::Watch => watch(cli).await,
        Command::Search {
            keystrokes,
            typing_delay_ms,
        } => search(cli, keystrokes, Duration::from_millis(*typing_delay_ms)).await,
        Command::Export { href } => export(cli, href).await,
    }
}

/// Loads and validates the configuration, then fetches the page.
async fn connect(cli: &Cli) -> kayit_client::Result<(ClientConfig, Arc<ReqwestFetcher>, PageController)> {
    let config = cli.load_config()?;
    config.validate()?;

    let fetcher = Arc::new(ReqwestFetcher::new(config.request_timeout())?);
    let url = Url::parse(config.base_url())?;
    let controller = PageController::load(fetcher.as_ref(), &url).await?;
    Ok((config, fetcher, controller))
}

async fn inspect(cli: &Cli) -> kayit_client::Result<i32> {
    let (_, _, controller) = connect(cli).await?;
    println!("{}", serde_json::to_string_pretty(&controller.state().await)?);
    Ok(0)
}

async fn watch(cli: &Cli) -> kayit_client::Result<i32> {
    let (config, fetcher, controller) = connect(cli).await?;
    if !controller.state().await.has_dashboard {
        tracing::warn!("⚠️ {} has no dashboard to watch", config.base_url());
        return Ok(1);
    }

    let poller = DashboardPoller::from_config(fetcher, controller, &config);
    let mut handle = tokio::spawn(poller.run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down");
            handle.abort();
        }
        _ = &mut handle => {}
    }
    Ok(0)
}

async fn search(cli: &Cli, keystrokes: &[String], typing_delay: Duration) -> kayit_client::Result<i32> {
    let (config, fetcher, controller) = connect(cli).await?;
    let state = controller.state().await;
    if !state.has_search_field {
        tracing::warn!("⚠️ {} has no search field", config.base_url());
        return Ok(1);
    }
    if state.results_html.is_none() {
        tracing::warn!("⚠️ {} has no results table to refresh", config.base_url());
    }

    let (debouncer, handle) = SearchClient::from_config(fetcher, controller.clone(), &config).spawn();
    for value in keystrokes {
        tracing::debug!("Typing '{}'", value);
        debouncer.push(value.clone());
        tokio::time::sleep(typing_delay).await;
    }
    drop(debouncer);

    handle.await.map_err(|e| ClientError::PageError {
        message: format!("search task failed: {}", e),
    })?;

    match controller.state().await.results_html {
        Some(html) => {
            println!("{}", html.trim());
            Ok(0)
        }
        None => Ok(1),
    }
}

async fn export(cli: &Cli, href: &str) -> kayit_client::Result<i32> {
    let (config, fetcher, controller) = connect(cli).await?;
    let storage = LocalStorage::new(config.output_dir().to_string());
    let path = ExportClient::new(fetcher, storage, controller)
        .download(href)
        .await?;

    println!("📁 Export saved to: {}", path);
    Ok(0)
}
