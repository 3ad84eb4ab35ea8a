//! Pools virtuais do módulo Market (CPMM x·y=k com base pool simétrico).
//!
//! `terra_pool = base_pool + delta`, `luna_pool = base_pool² / terra_pool`,
//! ambos em micro-unidades da denominação de referência (usdr).

use super::decimal::Dec;
use super::error::Result;
use super::error_map::{from_pool_inputs, to_error};

/// Parâmetros de governança do módulo Market.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolParameters {
    pub base_pool: Dec,
    pub min_stability_spread: Dec,
}

impl PoolParameters {
    pub fn new(base_pool: Dec, min_stability_spread: Dec) -> Self {
        Self {
            base_pool,
            min_stability_spread,
        }
    }

    /// `base_pool > 0`, `0 <= min_stability_spread < 1` e `base_pool + delta > 0`.
    pub fn validate(&self, delta: &Dec) -> Result<()> {
        match from_pool_inputs(&self.base_pool, &self.min_stability_spread, delta) {
            Some(code) => Err(to_error(code, &self.base_pool, &self.min_stability_spread, delta)),
            None => Ok(()),
        }
    }
}

/// Snapshot dos dois lados do pool para um `delta`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualPools {
    /// Produto constante `base_pool²`.
    pub cp: Dec,
    /// Lado das stablecoins.
    pub terra_pool: Dec,
    /// Lado do token nativo.
    pub luna_pool: Dec,
}

impl VirtualPools {
    /// Calcula os lados sem validar o domínio (terra_pool zero → `DivisionByZero`).
    pub fn compute(base_pool: &Dec, delta: &Dec) -> Result<Self> {
        let cp = base_pool.checked_pow(2)?;
        let terra_pool = base_pool.checked_add(delta)?;
        let luna_pool = cp.checked_quo(&terra_pool)?;
        Ok(Self {
            cp,
            terra_pool,
            luna_pool,
        })
    }

    /// Valida os parâmetros e calcula os lados.
    pub fn from_parameters(params: &PoolParameters, delta: &Dec) -> Result<Self> {
        params.validate(delta)?;
        Self::compute(&params.base_pool, delta)
    }

    /// `(offer_pool, ask_pool)` conforme o lado ofertado.
    pub fn sides(&self, offer_is_native: bool) -> (Dec, Dec) {
        if offer_is_native {
            (self.luna_pool, self.terra_pool)
        } else {
            (self.terra_pool, self.luna_pool)
        }
    }

    /// Desvio relativo do invariante, `|terra·luna − cp| / cp`.
    pub fn invariant_error_rel(&self) -> Result<Dec> {
        let k1 = self.terra_pool.checked_mul(&self.luna_pool)?;
        k1.checked_sub(&self.cp)?.abs().checked_quo(&self.cp)
    }
}
