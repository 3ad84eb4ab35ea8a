//! Utilitários para UI: cotação de referência, preço do oráculo vs. preço
//! após spread, percentual de taxa e slippage.
//! Baseados nas funções puras de `swap.rs`.

use super::coin::{Coin, RateTable};
use super::decimal::Dec;
use super::error::Result;
use super::pool::PoolParameters;
use super::swap::swap_terms;

/// Cotação de um swap de referência.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapQuote {
    pub offer: Coin,
    /// Retorno pela taxa do oráculo (sem spread).
    pub oracle_return: Coin,
    /// Retorno após o spread efetivo.
    pub after_fee_return: Coin,
    /// Spread efetivo (com piso).
    pub spread: Dec,
    /// Spread bruto do invariante (impacto de preço, sem piso).
    pub slippage: Dec,
}

impl SwapQuote {
    /// Spread efetivo em %.
    pub fn spread_percent(&self) -> Result<Dec> {
        self.spread.checked_mul(&Dec::from(100u64))
    }

    /// Slippage em %.
    pub fn slippage_percent(&self) -> Result<Dec> {
        self.slippage.checked_mul(&Dec::from(100u64))
    }

    /// Oferta por unidade recebida, pela taxa do oráculo (ex.: "$ por luna").
    pub fn oracle_price(&self) -> Result<Dec> {
        self.offer.amount.checked_quo(&self.oracle_return.amount)
    }

    /// Oferta por unidade recebida, após o spread.
    pub fn effective_price(&self) -> Result<Dec> {
        self.offer.amount.checked_quo(&self.after_fee_return.amount)
    }
}

/// Cota `offer → ask_denom` com os parâmetros e o delta atuais.
pub fn quote_swap(
    offer: &Coin,
    ask_denom: &str,
    rates: &RateTable,
    params: &PoolParameters,
    delta: &Dec,
) -> Result<SwapQuote> {
    let terms = swap_terms(
        offer,
        ask_denom,
        rates,
        &params.base_pool,
        &params.min_stability_spread,
        delta,
    )?;
    let after_fee_return = terms.ret_coin.after_spread(&terms.spread)?;
    Ok(SwapQuote {
        offer: offer.clone(),
        oracle_return: terms.ret_coin,
        after_fee_return,
        spread: terms.spread,
        slippage: terms.raw_spread,
    })
}
