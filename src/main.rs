use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use remote_memory_bridge::config::{validate_config, ConfigLoader, LoggingConfig};
use remote_memory_bridge::host::{CoreFunctions, TargetBridge};
use remote_memory_bridge::transport::MockTransport;
use remote_memory_bridge::{MemoryValue, ValueType};

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .with_context(|| format!("opening log file {}", logging.file))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = ConfigLoader::new(&config_path)
        .load_or_default()
        .with_context(|| format!("loading {}", config_path))?;
    validate_config(&config).context("invalid configuration")?;

    init_logging(&config.logging)?;
    info!("Starting remote-memory-bridge v{}", env!("CARGO_PKG_VERSION"));

    let watch_address = config.polling.watch_address()?;
    let watch_size = config.polling.watch_size;

    // The vendor link is not part of this crate; run against the demo target
    let bridge = Arc::new(TargetBridge::from_config(MockTransport::demo(), &config));
    info!(target_name = %config.target.name, byte_order = ?bridge.byte_order(), "bridge ready");

    let processes = {
        let bridge = Arc::clone(&bridge);
        tokio::task::spawn_blocking(move || {
            let mut processes = Vec::new();
            bridge.enumerate_processes(&mut |p| processes.push(p));
            processes
        })
        .await?
    };

    for process in &processes {
        info!("{}", serde_json::to_string(process)?);
    }

    let Some(process) = processes.first() else {
        warn!("target reported no processes");
        return Ok(());
    };
    let handle = bridge.open_remote_process(process.id.as_u64());

    {
        let bridge = Arc::clone(&bridge);
        tokio::task::spawn_blocking(move || {
            bridge.enumerate_remote_sections_and_modules(handle, &mut |_| {}, &mut |m| {
                info!(base = %m.base_address, size = m.size, "module {}", m.name);
            });
        })
        .await?;
    }

    info!(address = %watch_address, size = watch_size, "polling every {} ms, Ctrl+C to stop", config.polling.interval_ms);
    let mut interval = tokio::time::interval(Duration::from_millis(config.polling.interval_ms));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let bridge = Arc::clone(&bridge);
                let (ok, buffer) = tokio::task::spawn_blocking(move || {
                    let mut buffer = vec![0u8; watch_size];
                    let ok = bridge.read_remote_memory(handle, watch_address.as_u64(), &mut buffer, watch_size);
                    (ok, buffer)
                })
                .await?;

                if ok {
                    let head = MemoryValue::from_bytes(&buffer, ValueType::U32);
                    info!(
                        bytes = %hex::encode_upper(&buffer),
                        u32 = %head.map(|v| v.to_string()).unwrap_or_default(),
                        "watch"
                    );
                } else {
                    warn!(address = %watch_address, "watch read failed");
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down");
    let closer = Arc::clone(&bridge);
    tokio::task::spawn_blocking(move || closer.close_remote_process(handle)).await?;
    Ok(())
}
