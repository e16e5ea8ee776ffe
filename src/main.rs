use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use device_view::config::Config;
use device_view::detect::KeywordClassifier;
use device_view::logging::init_tracing;
use device_view::server::DeviceViewServer;

#[derive(Debug, Parser)]
#[command(name = "device-view", version, about = "Serve pages behind device view detection")]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override server.bind_addr
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let path = args.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    let classifier = KeywordClassifier::new().context("compiling classifier rules")?;
    let server = DeviceViewServer::bind(Arc::new(config), Arc::new(classifier)).await?;
    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn parse_args_defaults() {
        let args = Args::parse_from(["device-view"]);
        assert!(args.config.is_none());
        assert!(args.bind.is_none());
    }

    #[test]
    fn parse_args_with_overrides() {
        let args = Args::parse_from(["device-view", "--config", "/tmp/dv.toml", "-b", "0.0.0.0:9000"]);
        assert_eq!(args.config.unwrap().to_str(), Some("/tmp/dv.toml"));
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
    }
}
