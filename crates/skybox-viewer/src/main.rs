use anyhow::Result;

use skybox_engine::frame::RendererConfig;
use skybox_engine::logging::{init_logging, LoggingConfig};
use skybox_engine::window::{Runtime, RuntimeConfig};

fn run() -> Result<()> {
    let runtime = RuntimeConfig {
        title: "Skybox".to_string(),
        ..RuntimeConfig::default()
    };
    Runtime::run(runtime, RendererConfig::default())
}

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(e) = run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
