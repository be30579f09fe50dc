mod passes;
mod studio;

use anyhow::Result;
use dynres_engine::device::GpuInit;
use dynres_engine::logging::{init_logging, LoggingConfig};
use dynres_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    log::info!("keys: P pause, M resolve mode, S supersampling, C control mode,");
    log::info!("      J jitter pattern, D dynamic resolution, B motion blur,");
    log::info!("      Up/Down manual scale, Esc quit");

    let config = RuntimeConfig {
        title: "dynres studio".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), studio::Studio::default())
}
