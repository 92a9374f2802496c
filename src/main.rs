use clap::Parser;
use news_page::cli::Cli;
use news_page::{Config, NewsAgent};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; real environment variables win.
    let _ = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();

    let config = match Config::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error");
            eprintln!("❌ Error: {e}");
            eprintln!("   Please set SERPAPI_API_KEY and GOOGLE_API_KEY (environment or .env file)");
            return ExitCode::FAILURE;
        }
    };
    info!(
        topic = %args.topic,
        articles = args.articles,
        high_res = config.high_res_images,
        download = config.download_images,
        "news_page starting up"
    );

    let agent = match NewsAgent::new(&config) {
        Ok(agent) => agent,
        Err(e) => {
            error!(error = %e, "Failed to initialise HTTP clients");
            eprintln!("❌ Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let run = agent.run(&args.topic, args.articles, args.output.as_deref());
    tokio::pin!(run);
    let report = tokio::select! {
        report = &mut run => report,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                warn!("Interrupted by user");
                println!("\n\n👋 Interrupted by user");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                warn!(error = %e, "Could not listen for Ctrl-C; running to completion");
                run.await
            }
        },
    };

    match report.path {
        Some(path) => {
            let shown = std::path::absolute(&path).unwrap_or_else(|_| path.clone());
            println!("✅ Generated page with {} articles", report.article_count);
            println!("\n🌐 Open the generated page in your browser:");
            println!("   file://{}", display_path(&shown));
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("❌ Error: the page could not be written to disk");
            ExitCode::FAILURE
        }
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
