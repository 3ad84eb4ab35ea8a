//! Modelo do painel de pools virtuais: lados do pool em SDR, escala do
//! gráfico e as duas linhas de cotação do swap de referência.
//! A renderização fica fora; aqui só números e texto.

use tracing::debug;

use super::coin::{Coin, RateTable};
use super::decimal::Dec;
use super::error::{MarketError, Result};
use super::error_catalog::MarketErrorCode;
use super::pool::{PoolParameters, VirtualPools};
use super::pricing::{quote_swap, SwapQuote};
use super::types::MICRO_FACTOR;
use crate::config::QuoteConfig;
use crate::telemetry;

/// Fonte dos três snapshots lidos da chain a cada ciclo.
pub trait MarketSource {
    /// Taxas do oráculo em uluna.
    fn exchange_rates(&self) -> Result<RateTable>;
    /// `base_pool` e `min_stability_spread`.
    fn parameters(&self) -> Result<PoolParameters>;
    /// Desequilíbrio atual do pool terra.
    fn pool_delta(&self) -> Result<Dec>;
}

/// Fonte em memória (demo/testes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticSource {
    pub rates: RateTable,
    pub params: PoolParameters,
    pub delta: Dec,
}

impl MarketSource for StaticSource {
    fn exchange_rates(&self) -> Result<RateTable> {
        Ok(self.rates.clone())
    }

    fn parameters(&self) -> Result<PoolParameters> {
        Ok(self.params)
    }

    fn pool_delta(&self) -> Result<Dec> {
        Ok(self.delta)
    }
}

/// Domínio do eixo Y do gráfico, em unidades inteiras de SDR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartScale {
    pub min: u64,
    pub max: u64,
}

impl ChartScale {
    pub const NARROW: ChartScale = ChartScale { min: 49_000_000, max: 51_000_000 };
    pub const WIDE: ChartScale = ChartScale { min: 40_000_000, max: 60_000_000 };

    /// Escala estreita enquanto os dois lados ficam acima do seu mínimo.
    pub fn select(terra_side: &Dec, luna_side: &Dec, narrow: ChartScale, wide: ChartScale) -> ChartScale {
        let floor = Dec::from(narrow.min);
        if *terra_side < floor || *luna_side < floor {
            wide
        } else {
            narrow
        }
    }
}

/// Nome curto exibido para um denom (`uusd` → `ust`, `uluna` → `luna`).
pub fn display_name(denom: &str) -> String {
    match denom {
        "uluna" => "luna".to_string(),
        "uusd" => "ust".to_string(),
        "ukrw" => "krt".to_string(),
        "usdr" => "sdr".to_string(),
        "umnt" => "mnt".to_string(),
        other => other.strip_prefix('u').unwrap_or(other).to_string(),
    }
}

/// Rótulos das barras do gráfico.
pub const TERRA_SERIES_LABEL: &str = "Stablecoins (in sdr)";
pub const LUNA_SERIES_LABEL: &str = "LUNA (in sdr)";

/// Estado do painel para um ciclo de atualização.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// Lado das stablecoins em SDR inteiros.
    pub terra_side: Dec,
    /// Lado do token nativo em SDR inteiros.
    pub luna_side: Dec,
    /// Linha de referência, em micro-unidades.
    pub base_pool: Dec,
    pub delta: Dec,
    pub scale: ChartScale,
    /// Tamanho do swap de referência em unidades inteiras.
    pub swap_size: u64,
    pub quote: SwapQuote,
}

impl PoolSnapshot {
    pub fn evaluate(
        config: &QuoteConfig,
        rates: &RateTable,
        params: &PoolParameters,
        delta: &Dec,
    ) -> Result<Self> {
        telemetry::time("pool_snapshot", || {
            let pools = VirtualPools::from_parameters(params, delta)?;
            let micro = Dec::from(MICRO_FACTOR);
            let terra_side = pools.terra_pool.checked_quo(&micro)?;
            let luna_side = pools.luna_pool.checked_quo(&micro)?;
            let scale = ChartScale::select(&terra_side, &luna_side, config.narrow_scale, config.wide_scale);

            let offer = Coin::new(
                config.offer_denom.as_str(),
                Dec::from(config.swap_size).checked_mul(&micro)?,
            );
            let quote = quote_swap(&offer, &config.ask_denom, rates, params, delta)?;

            let invariant_error = pools.invariant_error_rel()?;
            telemetry::record_invariant_error("pool_snapshot", invariant_error.to_f64_lossy());
            debug!(
                terra_side = %terra_side,
                luna_side = %luna_side,
                spread = %quote.spread,
                slippage = %quote.slippage,
                "pool snapshot"
            );

            Ok(Self {
                terra_side,
                luna_side,
                base_pool: params.base_pool,
                delta: *delta,
                scale,
                swap_size: config.swap_size,
                quote,
            })
        })
    }

    /// Consulta a fonte e avalia.
    pub fn from_source(config: &QuoteConfig, source: &dyn MarketSource) -> Result<Self> {
        let rates = source.exchange_rates()?;
        let params = source.parameters()?;
        let delta = source.pool_delta()?;
        Self::evaluate(config, &rates, &params, &delta)
    }

    /// Barras `(rótulo, lado em SDR)`, terra primeiro.
    pub fn series(&self) -> [(&'static str, Dec); 2] {
        [(TERRA_SERIES_LABEL, self.terra_side), (LUNA_SERIES_LABEL, self.luna_side)]
    }

    /// Linhas "Oracle Rate" e "With x % spread fee" exibidas no painel.
    pub fn summary_lines(&self) -> Result<[String; 2]> {
        let micro = Dec::from(MICRO_FACTOR);
        let size = Dec::from(self.swap_size);
        let offer_name = display_name(&self.quote.offer.denom);
        let ask_name = display_name(&self.quote.oracle_return.denom);

        let before = self.quote.oracle_return.amount.checked_quo(&micro)?;
        let after = self.quote.after_fee_return.amount.checked_quo(&micro)?;
        if before.is_zero() || after.is_zero() {
            return Err(MarketError::new(MarketErrorCode::DivisionByZero).with_context("denom", &ask_name));
        }
        let price_before = size.checked_quo(&before)?;
        let price_after = size.checked_quo(&after)?;

        Ok([
            format!(
                "Oracle Rate: {} {} = {} {} (${} per {})",
                self.swap_size,
                offer_name,
                before.to_fixed(2),
                ask_name,
                price_before.to_fixed(4),
                ask_name
            ),
            format!(
                "With {} % spread fee: {} {} = {} {} (${} per {})",
                self.quote.spread_percent()?.to_fixed(2),
                self.swap_size,
                offer_name,
                after.to_fixed(2),
                ask_name,
                price_after.to_fixed(4),
                ask_name
            ),
        ])
    }
}
