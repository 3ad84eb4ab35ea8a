//! Configuração por variáveis de ambiente (`VP_*`).
//!
//! `QuoteConfig` controla o swap de referência e as escalas do gráfico;
//! `static_source_from_env` monta uma fonte em memória para o binário de demo.

use anyhow::{bail, Context, Result};

use crate::market::coin::RateTable;
use crate::market::decimal::Dec;
use crate::market::pool::PoolParameters;
use crate::market::snapshot::{ChartScale, StaticSource};

pub const DEFAULT_SERVICE_NAME: &str = "virtual-pools-core";

// Cenário padrão: pool equilibrado de 50M SDR, 1 luna = 80 ust.
const DEFAULT_RATES: &str = "80uusd,80usdr";
const DEFAULT_BASE_POOL: &str = "50000000000000";
const DEFAULT_MIN_SPREAD: &str = "0.005";
const DEFAULT_DELTA: &str = "0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoteConfig {
    pub offer_denom: String,
    pub ask_denom: String,
    /// Em unidades inteiras do denom ofertado.
    pub swap_size: u64,
    pub narrow_scale: ChartScale,
    pub wide_scale: ChartScale,
    pub service_name: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            offer_denom: "uusd".to_string(),
            ask_denom: "uluna".to_string(),
            swap_size: 10_000,
            narrow_scale: ChartScale::NARROW,
            wide_scale: ChartScale::WIDE,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl QuoteConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual a `from_env`, com a fonte das variáveis injetada.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("VP_OFFER_DENOM") {
            cfg.offer_denom = v;
        }
        if let Some(v) = lookup("VP_ASK_DENOM") {
            cfg.ask_denom = v;
        }
        if let Some(v) = lookup("VP_SWAP_SIZE") {
            cfg.swap_size = v
                .trim()
                .parse()
                .with_context(|| format!("VP_SWAP_SIZE inválido: {v:?}"))?;
            if cfg.swap_size == 0 {
                bail!("VP_SWAP_SIZE deve ser > 0");
            }
        }
        if let Some(v) = lookup("VP_SCALE_NARROW") {
            cfg.narrow_scale = parse_scale(&v).context("VP_SCALE_NARROW")?;
        }
        if let Some(v) = lookup("VP_SCALE_WIDE") {
            cfg.wide_scale = parse_scale(&v).context("VP_SCALE_WIDE")?;
        }
        if let Some(v) = lookup("VP_SERVICE_NAME") {
            cfg.service_name = v;
        }
        Ok(cfg)
    }
}

/// `"min:max"` em SDR inteiros, com `min < max`.
pub fn parse_scale(raw: &str) -> Result<ChartScale> {
    let (min, max) = raw
        .split_once(':')
        .with_context(|| format!("escala sem ':' em {raw:?}"))?;
    let min: u64 = min.trim().parse().with_context(|| format!("mínimo inválido em {raw:?}"))?;
    let max: u64 = max.trim().parse().with_context(|| format!("máximo inválido em {raw:?}"))?;
    if min >= max {
        bail!("escala vazia: {min} >= {max}");
    }
    Ok(ChartScale { min, max })
}

pub fn static_source_from_env() -> Result<StaticSource> {
    static_source_from_lookup(|key| std::env::var(key).ok())
}

/// `VP_RATES`, `VP_BASE_POOL`, `VP_MIN_SPREAD`, `VP_DELTA`; ausentes usam o cenário padrão.
pub fn static_source_from_lookup<F>(lookup: F) -> Result<StaticSource>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let raw_rates = get("VP_RATES", DEFAULT_RATES);
    let rates: RateTable = raw_rates
        .parse()
        .with_context(|| format!("VP_RATES inválido: {raw_rates:?}"))?;
    let base_pool = parse_dec(&get("VP_BASE_POOL", DEFAULT_BASE_POOL), "VP_BASE_POOL")?;
    let min_spread = parse_dec(&get("VP_MIN_SPREAD", DEFAULT_MIN_SPREAD), "VP_MIN_SPREAD")?;
    let delta = parse_dec(&get("VP_DELTA", DEFAULT_DELTA), "VP_DELTA")?;

    Ok(StaticSource {
        rates,
        params: PoolParameters::new(base_pool, min_spread),
        delta,
    })
}

fn parse_dec(raw: &str, key: &str) -> Result<Dec> {
    raw.trim()
        .parse()
        .with_context(|| format!("{key} inválido: {raw:?}"))
}
