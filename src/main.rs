use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use uniroute::application::SwapService;
use uniroute::config::Config;
use uniroute::domain::wallet::{MockProvider, ProviderFlags, ProviderHost, WalletId};
use uniroute::shared::types::SwapParams;
use uniroute::shared::utils::shorten_address;

#[derive(Parser, Debug)]
#[command(version, about = "Multi-source DEX swap routing CLI with simulated wallet providers")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known wallets and their detection status
    Wallets,
    /// Show the configured token catalog
    Tokens,
    /// Quote a swap across all liquidity sources
    Quote {
        /// Input token symbol
        #[arg(long)]
        input: String,
        /// Output token symbol
        #[arg(long)]
        output: String,
        /// Amount to swap (in input token units)
        #[arg(long)]
        amount: String,
        /// Slippage tolerance in percent
        #[arg(long)]
        slippage: Option<f64>,
    },
    /// Connect the simulated wallet, quote, and execute the best route
    Swap {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        slippage: Option<f64>,
    },
}

/// Simulated injected namespace for the demo: MetaMask as the default
/// provider plus a second extension in the aggregated list
fn demo_host() -> ProviderHost {
    let metamask = Arc::new(
        MockProvider::new(
            ProviderFlags { is_metamask: true, ..Default::default() },
            vec!["0x742d35Cc6634C0532925a3b8D82ac62d7C0a1234".to_string()],
            1,
        )
        .authorized(),
    );
    let rabby = Arc::new(MockProvider::with_flags(ProviderFlags {
        is_rabby: true,
        ..Default::default()
    }));
    ProviderHost::new()
        .with_default(Arc::clone(&metamask) as _)
        .with_provider_list(vec![metamask as _, rabby as _])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let service = SwapService::new(config, demo_host());

    match args.command {
        Command::Wallets => {
            println!("👛 Known wallets:");
            for wallet in service.list_wallets() {
                let status = if wallet.is_installed { "✅ installed" } else { "— not installed" };
                println!("  {} {:<16} {}", wallet.icon, wallet.name, status);
            }
        }
        Command::Tokens => {
            println!("🪙 Token catalog (chain {}):", service.config().chain.chain_id);
            for token in service.config().token_catalog() {
                println!(
                    "  {:<6} {:<18} {} ({} decimals)",
                    token.symbol,
                    token.name,
                    shorten_address(&token.address),
                    token.decimals
                );
            }
        }
        Command::Quote { input, output, amount, slippage } => {
            let params = swap_params(&service, &input, &output, &amount, slippage)?;
            let quote = service
                .request_quote(&params)
                .await?
                .ok_or_else(|| anyhow!("quote superseded"))?;
            print_quote(&quote, &output);
        }
        Command::Swap { input, output, amount, slippage } => {
            let connection = service.connect(WalletId::Metamask).await?;
            println!(
                "🔗 Connected {} ({}) on chain {}",
                connection.wallet.name,
                shorten_address(&connection.account),
                connection.chain_id
            );
            if let Some(link) = service.explorer_link() {
                println!("🔍 Explorer: {}", link);
            }

            let params = swap_params(&service, &input, &output, &amount, slippage)?;
            let quote = service
                .request_quote(&params)
                .await?
                .ok_or_else(|| anyhow!("quote superseded"))?;
            print_quote(&quote, &output);

            let tx_hash = service.execute_swap(&params, &quote.best_route).await?;
            println!("🚀 Swap sent via {}: {}", quote.best_route.dex.as_str(), tx_hash);
        }
    }

    Ok(())
}

fn swap_params(
    service: &SwapService,
    input: &str,
    output: &str,
    amount: &str,
    slippage: Option<f64>,
) -> Result<SwapParams> {
    let config = service.config();
    let input_token = config
        .find_token(input)
        .ok_or_else(|| anyhow!("unknown token symbol: {}", input))?;
    let output_token = config
        .find_token(output)
        .ok_or_else(|| anyhow!("unknown token symbol: {}", output))?;
    Ok(SwapParams::new(
        input_token,
        output_token,
        amount,
        slippage.unwrap_or(config.trade.default_slippage),
    ))
}

fn print_quote(quote: &uniroute::SwapQuote, output_symbol: &str) {
    println!("📊 Routes:");
    for route in &quote.routes {
        let marker = if route.id == quote.best_route.id { "⭐" } else { "  " };
        println!(
            "  {} {:<12} out: {:>14} {}  impact: {:.2}%  gas: {}  ~{}ms",
            marker,
            route.dex.as_str(),
            route.output_amount,
            output_symbol,
            route.price_impact,
            route.gas_estimate,
            route.execution_time_ms
        );
    }
    println!(
        "💰 Best: {} ({} {})  total gas: {}  total impact: {:.2}% ({:?})",
        quote.best_route.dex.as_str(),
        quote.best_route.output_amount,
        output_symbol,
        quote.total_gas_estimate,
        quote.total_price_impact,
        quote.impact_severity
    );
}
