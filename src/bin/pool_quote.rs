use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use std::time::Instant;
use tracing::info;

use virtual_pools_core::config::{static_source_from_env, QuoteConfig};
use virtual_pools_core::market::snapshot::PoolSnapshot;
use virtual_pools_core::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = QuoteConfig::from_env()?;
    let tel = telemetry::init(&config.service_name)?;
    let source = static_source_from_env()?;

    let span = telemetry::make_info_span("pool_quote", 1, "pool_quote");
    let _e = span.enter();

    let started = Instant::now();
    let snapshot = match PoolSnapshot::from_source(&config, &source) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::error!(error = %err.to_log_json(), "pool snapshot failed");
            tel.shutdown();
            return Err(err).context("falha ao avaliar o pool");
        }
    };
    let ms = started.elapsed().as_secs_f64() * 1e3;
    let attrs = [KeyValue::new("offer_denom", config.offer_denom.clone())];
    tel.quote_latency_ms.record(ms, &attrs);
    let pools = virtual_pools_core::market::VirtualPools::from_parameters(&source.params, &source.delta)?;
    tel.invariant_error_rel.record(pools.invariant_error_rel()?.to_f64_lossy(), &attrs);

    info!(
        terra_side = %snapshot.terra_side.to_fixed(2),
        luna_side = %snapshot.luna_side.to_fixed(2),
        scale_min = snapshot.scale.min,
        scale_max = snapshot.scale.max,
        "pool sides"
    );
    for line in snapshot.summary_lines()? {
        info!("{}", line);
    }

    drop(_e);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    tel.shutdown();
    Ok(())
}
