use clap::{Args, Parser, Subcommand};
use jspay::application::client::PaymentClient;
use jspay::application::notification::NotificationProcessor;
use jspay::config::GatewayConfig;
use jspay::domain::ports::CallbackResult;
use jspay::domain::signature::{SIGN_FIELD, Signer};
use jspay::domain::trade::{Fee, OrderRequest, TimeWindow, TradeEvent};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG is honoured otherwise)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArg {
    /// Merchant configuration file (TOML)
    #[arg(long, env = "JSPAY_CONFIG")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Place a unified order and print the result as JSON
    PlaceOrder {
        #[command(flatten)]
        config: ConfigArg,
        /// Merchant order number
        #[arg(long)]
        order_no: String,
        /// Amount in yuan, at most two decimals
        #[arg(long)]
        amount: Decimal,
        /// Order description
        #[arg(long)]
        body: String,
        /// IP of the paying user
        #[arg(long)]
        client_ip: String,
        /// Opaque value echoed back by the gateway
        #[arg(long)]
        attach: Option<String>,
        /// Minutes until the order expires
        #[arg(long, default_value_t = 10)]
        expire_minutes: i64,
        /// openid of the payer in the official account or mini-program
        #[arg(long)]
        sub_openid: Option<String>,
        /// The payment comes from a mini-program
        #[arg(long)]
        mini_program: bool,
    },
    /// Process a trade notification and print the acknowledgement
    Notify {
        #[command(flatten)]
        config: ConfigArg,
        /// Notification body; stdin when omitted
        input: Option<PathBuf>,
    },
    /// Print the signature of an XML or form-encoded parameter set
    Sign {
        #[command(flatten)]
        config: ConfigArg,
        /// Parameter set; stdin when omitted
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::PlaceOrder {
            config,
            order_no,
            amount,
            body,
            client_ip,
            attach,
            expire_minutes,
            sub_openid,
            mini_program,
        } => {
            let client = PaymentClient::from_config(GatewayConfig::load(&config.config)?)?;

            let window = TimeWindow::in_gateway_time(chrono::Utc::now(), expire_minutes);
            let mut order = OrderRequest::new(order_no, Fee::from_major(amount)?, body, client_ip)
                .time_window(window)
                .mini_program(mini_program);
            if let Some(attach) = attach {
                order = order.attach(attach);
            }
            if let Some(openid) = sub_openid {
                order = order.sub_openid(openid);
            }

            let result = client.place_order(&order).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&result).into_diagnostic()?
            );
        }
        Command::Notify { config, input } => {
            let client = PaymentClient::from_config(GatewayConfig::load(&config.config)?)?;
            let body = read_input(input.as_ref()).into_diagnostic()?;

            let callback = |event: &TradeEvent| -> CallbackResult {
                eprintln!("{}", serde_json::to_string(event)?);
                Ok(true)
            };
            let ack = client.trade_updated(&body, &callback)?;
            println!("{ack}");
        }
        Command::Sign { config, input } => {
            let config = GatewayConfig::load(&config.config)?;
            let body = read_input(input.as_ref()).into_diagnostic()?;

            let mut params = NotificationProcessor::normalize(&body)?;
            params.remove(SIGN_FIELD);
            println!("{}", Signer::new(config.key).sign(&params));
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("jspay=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}
