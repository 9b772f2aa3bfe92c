use anyhow::Result;
use clap::Parser;
use scene_describer::app::App;
use scene_describer::models::Config;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "scene-describer")]
#[command(about = "Serve image and video scene descriptions")]
struct CliArgs {
    /// Address to listen on, overriding BIND_ADDR.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Directory with prompt overrides, overriding PROMPTS_DIR.
    #[arg(long, value_name = "DIR")]
    prompts_dir: Option<PathBuf>,
}

impl CliArgs {
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(dir) = self.prompts_dir {
            config.prompts_dir = Some(dir);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_describer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scene-describer");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    match App::from_config(&config) {
        Ok(app) => match app.run().await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!("Server failed: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
