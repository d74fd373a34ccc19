use clap::{Parser, Subcommand};

mod api;
mod report;
mod server;

#[derive(Parser, Debug)]
#[command(name = "telemetry", about = "Regional latency and uptime statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Server {},

    Report {
        #[arg(long = "data")]
        data: Option<String>,

        #[arg(long = "threshold")]
        threshold_ms: f64,

        #[arg(required = true)]
        regions: Vec<String>,
    },
}

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {} => server::run().await,

        Commands::Report {
            data,
            threshold_ms,
            regions,
        } => report::run(
            data.or_else(|| std::env::var("TELEMETRY_DATA_PATH").ok())
                .as_deref(),
            regions,
            threshold_ms,
        ),
    }
}
