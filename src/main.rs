//! Terminal XRP ticker
//!
//! Prints the XRP summary card and keeps it fresh. While running, type
//! `r` + Enter to refresh, `a` to toggle auto-update, `c` to clear the last
//! summary, `q` to quit.

use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use xrp_ticker::{
    view::{self, SummaryView},
    CoinGeckoProvider, ConfigError, CountdownPolicy, LocalClock, Phase, PriceScreen,
    ScreenChange, SummaryProvider, TickerConfig,
};

#[derive(Debug, Parser)]
#[command(
    name = "xrp-ticker",
    version,
    about = "Live XRP market summary from CoinGecko"
)]
struct Cli {
    /// Seconds between automatic refreshes
    #[arg(long)]
    window_secs: Option<u64>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// CoinGecko API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Start with auto-update switched off
    #[arg(long)]
    no_auto_update: bool,

    /// Restart the countdown after a successful manual refresh
    #[arg(long)]
    reset_on_manual: bool,

    /// Fetch once, print the summary and exit
    #[arg(long)]
    once: bool,

    /// Print summaries as JSON lines instead of the text card
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Layers the command line on top of the environment configuration
    fn apply(&self, mut config: TickerConfig) -> Result<TickerConfig, ConfigError> {
        if let Some(secs) = self.window_secs {
            config.window_secs = secs;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = &self.api_url {
            config.api_base_url = url.clone();
        }
        if self.no_auto_update {
            config.auto_update = false;
        }
        if self.reset_on_manual {
            config.countdown_policy = CountdownPolicy::ResetOnManualSuccess;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn draw<W: Write>(
    out: &mut W,
    screen: &PriceScreen,
    change: ScreenChange,
    json: bool,
) -> io::Result<()> {
    let state = screen.state();

    match change {
        ScreenChange::Nothing => {}
        ScreenChange::Countdown if json => {}
        ScreenChange::Countdown => write!(out, "\r  {}   ", view::status_line(state))?,
        ScreenChange::Content if json => {
            if let Phase::Ready(summary) = state.phase() {
                writeln!(out, "{}", serde_json::to_string(summary)?)?;
            }
        }
        ScreenChange::Content => writeln!(out, "\n{}", view::render(state))?,
    }

    out.flush()
}

/// Runs the screen until `q`, Ctrl-C or the first output error
async fn run<R, W>(screen: &mut PriceScreen, input: R, out: &mut W, json: bool) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    screen.start();
    draw(out, screen, ScreenChange::Content, json)?;

    let mut commands = input.lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            change = screen.step() => draw(out, screen, change, json)?,
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(command)) => match command.trim() {
                    "r" => {
                        screen.refresh();
                        draw(out, screen, ScreenChange::Content, json)?;
                    }
                    "a" => {
                        screen.toggle_auto_update();
                        draw(out, screen, ScreenChange::Countdown, json)?;
                    }
                    "c" => {
                        screen.clear();
                        draw(out, screen, ScreenChange::Content, json)?;
                    }
                    "q" => return Ok(()),
                    "" => {}
                    other => tracing::warn!(command = other, "Unknown command (r, a, c, q)"),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin, commands disabled");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                return Ok(());
            }
        }
    }
}

/// Runs the screen, then always closes it and the provider
async fn session<R, W>(screen: &mut PriceScreen, input: R, out: &mut W, json: bool) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let result = run(screen, input, out, json).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Output failed, shutting down");
    }
    screen.close().await;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(TickerConfig::from_env()?)?;
    let provider = Arc::new(CoinGeckoProvider::from_config(&config)?);

    if cli.once {
        let result = provider.fetch_summary().await;
        provider.shutdown().await;
        let summary = result?;
        if cli.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!("{}", SummaryView::new(&summary));
        }
        return Ok(());
    }

    tracing::info!(
        window_secs = config.window_secs,
        auto_update = config.auto_update,
        "xrp-ticker starting"
    );

    let mut screen = PriceScreen::new(provider, Arc::new(LocalClock), &config);
    let result = session(
        &mut screen,
        BufReader::new(tokio::io::stdin()),
        &mut io::stdout(),
        cli.json,
    )
    .await;
    tracing::info!(metrics = %screen.metrics(), "xrp-ticker stopped");

    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrp_ticker::clock::FixedClock;

    /// Writer whose output end has gone away
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    fn screen(provider: Arc<CoinGeckoProvider>) -> PriceScreen {
        let config = TickerConfig {
            auto_update: false,
            ..TickerConfig::default()
        };
        PriceScreen::new(provider, Arc::new(FixedClock("12:00:00".to_string())), &config)
    }

    fn closed_port_provider() -> Arc<CoinGeckoProvider> {
        Arc::new(
            CoinGeckoProvider::with_options("http://127.0.0.1:9", Duration::from_secs(1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_output_error_still_shuts_provider_down() {
        let provider = closed_port_provider();
        let mut screen = screen(provider.clone());

        let result = session(&mut screen, &b""[..], &mut ClosedPipe, false).await;

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(provider.is_closed().await);
        assert!(screen.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_quit_command_shuts_provider_down() {
        let provider = closed_port_provider();
        let mut screen = screen(provider.clone());
        let mut out = Vec::new();

        session(&mut screen, &b"a\nq\n"[..], &mut out, false)
            .await
            .unwrap();

        assert!(provider.is_closed().await);
        assert!(!out.is_empty());
    }
}
