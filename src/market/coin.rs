//! Moedas (denom + montante decimal) e tabela de taxas do oráculo.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use super::decimal::Dec;
use super::error::{MarketError, Result};
use super::error_catalog::MarketErrorCode;

/// Montante de um ativo. Imutável; igualdade por denom e montante.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coin {
    pub denom: String,
    pub amount: Dec,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: Dec) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Mesmo denom com `amount × (1 − spread)`.
    pub fn after_spread(&self, spread: &Dec) -> Result<Coin> {
        let fee = self.amount.checked_mul(spread)?;
        Ok(Coin::new(self.denom.clone(), self.amount.checked_sub(&fee)?))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

fn valid_denom(denom: &str) -> bool {
    let mut chars = denom.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'))
}

impl FromStr for Coin {
    type Err = MarketError;

    /// Formato da chain: `<amount><denom>`, ex. `1.25uusd`.
    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| MarketError::new(MarketErrorCode::ParseDecimal).with_context("input", input))?;
        let (amount, denom) = trimmed.split_at(split);
        if !valid_denom(denom) {
            return Err(MarketError::new(MarketErrorCode::ParseDecimal).with_context("input", input));
        }
        Ok(Coin::new(denom, amount.parse()?))
    }
}

/// Taxas de câmbio de cada denom em unidades do token nativo (`uluna`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: BTreeMap<String, Dec>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere/substitui a taxa de `denom`.
    pub fn with_rate(mut self, denom: impl Into<String>, rate: Dec) -> Self {
        self.rates.insert(denom.into(), rate);
        self
    }

    pub fn insert(&mut self, denom: impl Into<String>, rate: Dec) -> Option<Dec> {
        self.rates.insert(denom.into(), rate)
    }

    /// Taxa de `denom`; ausência é erro (`MissingRate`), nunca zero implícito.
    pub fn get(&self, denom: &str) -> Result<Dec> {
        self.rates.get(denom).copied().ok_or_else(|| {
            MarketError::new(MarketErrorCode::MissingRate).with_context("denom", denom)
        })
    }

    pub fn contains(&self, denom: &str) -> bool {
        self.rates.contains_key(denom)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dec)> {
        self.rates.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<Coin> for RateTable {
    fn from_iter<I: IntoIterator<Item = Coin>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().map(|c| (c.denom, c.amount)).collect(),
        }
    }
}

impl FromStr for RateTable {
    type Err = MarketError;

    /// Lista de moedas separada por vírgula: `1.25uusd,0.9usdr`. Vazio = tabela vazia.
    fn from_str(input: &str) -> Result<Self> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Coin::from_str)
            .collect()
    }
}
