use clap::Parser;

/// PM2 Exporter - exposes `pm2 jlist` data as Prometheus metrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 9966)]
    pub port: u16,

    /// Listen address
    #[arg(short = 'a', long, env = "ADDRESS", default_value = "0.0.0.0")]
    pub address: String,

    /// How often (in seconds) to run `pm2 jlist` in the background
    #[arg(short = 'i', long, env = "SCRAPE_INTERVAL", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}
