//! Referência de alta precisão ("goldens") baseada em **BigInt/BigRational**
//! para o swap do módulo Market (CPMM com piso de spread).
//!
//! Objetivos desta referência:
//! 1. Calcular retorno nominal e spread **exatos** (sem quantização em 1e-18).
//! 2. Quantizar o exato com **nearest-even** em 18 casas, a mesma política do
//!    `Dec`, para servir de **oráculo de validação** independente do core.
//! 3. Medir o erro do core contra o exato e o desvio do invariante `|Δk/k|`.
//!
//! Não entra no caminho de produção: serve para testes e geração de goldens.

use super::coin::{Coin, RateTable};
use super::decimal::Dec;
use super::error::{MarketError, Result};
use super::error_catalog::MarketErrorCode;
use super::error_map::{from_swap_inputs, to_error};
use super::swap::price_swap;
use super::types::{NATIVE_DENOM, PRECISION, REFERENCE_DENOM, U256};
use crate::market_bail;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer; // div_rem, is_odd
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

// -------------------------
// Helpers de conversão & arredondamento
// -------------------------
fn u256_to_biguint(v: U256) -> BigUint {
    let digits: Vec<u32> = v.0.iter().flat_map(|w| [*w as u32, (*w >> 32) as u32]).collect();
    BigUint::new(digits)
}

fn biguint_to_u256(v: &BigUint) -> Result<U256> {
    let limbs = v.to_u64_digits();
    if limbs.len() > 4 {
        return Err(MarketError::new(MarketErrorCode::OverflowNumeric));
    }
    let mut words = [0u64; 4];
    words[..limbs.len()].copy_from_slice(&limbs);
    Ok(U256(words))
}

#[inline]
fn scale() -> BigUint {
    BigUint::from(10u32).pow(PRECISION)
}

/// `Dec` → racional exato.
pub fn dec_to_rational(value: &Dec) -> BigRational {
    let (negative, abs) = value.atomics();
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    let numer = BigInt::from_biguint(sign, u256_to_biguint(abs));
    BigRational::new(numer, BigInt::from_biguint(Sign::Plus, scale()))
}

/// Divide `n/d` com **nearest (ties-to-even)** e retorna inteiro BigUint.
fn div_nearest_even_big(n: &BigUint, d: &BigUint) -> BigUint {
    let (q, r) = n.div_rem(d);
    let two_r = &r << 1;
    if two_r < *d {
        return q;
    }
    if two_r > *d {
        return q + BigUint::one();
    }
    // empate: arredonda para o par
    if q.is_odd() {
        q + BigUint::one()
    } else {
        q
    }
}

/// Racional → `Dec` com arredondamento nearest-even em 18 casas.
pub fn rational_to_dec(r: &BigRational) -> Result<Dec> {
    let numer = r.numer().magnitude();
    let denom = r.denom().magnitude();
    if denom.is_zero() {
        return Err(MarketError::new(MarketErrorCode::DivisionByZero));
    }
    let abs = biguint_to_u256(&div_nearest_even_big(&(numer * scale()), denom))?;
    Ok(Dec::from_atomics(r.is_negative(), abs))
}

// -------------------------
// Contínuo/exato (sem quantização)
// -------------------------
fn exact_rate(rates: &RateTable, denom: &str) -> Result<BigRational> {
    Ok(dec_to_rational(&rates.get(denom)?))
}

/// Conversão exata `amount × ask_rate / offer_rate` (sem arredondamento).
pub fn exact_convert(amount: &BigRational, offer_denom: &str, ask_denom: &str, rates: &RateTable) -> Result<BigRational> {
    if offer_denom == ask_denom {
        return Ok(amount.clone());
    }
    let offer_rate = exact_rate(rates, offer_denom)?;
    let ask_rate = if ask_denom == NATIVE_DENOM {
        BigRational::one()
    } else {
        exact_rate(rates, ask_denom)?
    };
    if offer_rate.is_zero() {
        market_bail!(MarketErrorCode::InvalidConversion, denom => offer_denom);
    }
    Ok(amount * ask_rate / offer_rate)
}

/// Resultado exato do swap.
#[derive(Debug, Clone)]
pub struct ExactSwap {
    pub base_offer: BigRational,
    pub ret_amount: BigRational,
    pub raw_spread: BigRational,
    pub spread: BigRational,
}

/// Swap exato: mesmos passos do core, todos em racionais.
pub fn exact_swap(
    offer: &Coin,
    ask_denom: &str,
    rates: &RateTable,
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> Result<ExactSwap> {
    if let Some(code) = from_swap_inputs(&offer.amount, base_pool, min_stability_spread, delta) {
        return Err(to_error(code, base_pool, min_stability_spread, delta));
    }

    let offer_amount = dec_to_rational(&offer.amount);
    let base_offer = exact_convert(&offer_amount, &offer.denom, REFERENCE_DENOM, rates)?;
    let ret_amount = exact_convert(&base_offer, REFERENCE_DENOM, ask_denom, rates)?;

    let base = dec_to_rational(base_pool);
    let cp = &base * &base;
    let terra_pool = &base + dec_to_rational(delta);
    let luna_pool = &cp / &terra_pool;
    let (offer_pool, ask_pool) = if offer.denom == NATIVE_DENOM {
        (luna_pool, terra_pool)
    } else {
        (terra_pool, luna_pool)
    };

    let ask_base = ask_pool - &cp / (offer_pool + &base_offer);
    let raw_spread = (&base_offer - ask_base) / &base_offer;
    let floor = dec_to_rational(min_stability_spread);
    let spread = if raw_spread < floor { floor } else { raw_spread.clone() };

    Ok(ExactSwap {
        base_offer,
        ret_amount,
        raw_spread,
        spread,
    })
}

// -------------------------
// Estruturas de comparação (goldens)
// -------------------------
#[derive(Debug, Clone)]
pub struct GoldenSwap {
    pub ret_core: Coin,
    pub spread_core: Dec,
    /// Exato quantizado com nearest-even em 18 casas.
    pub ret_policy: Dec,
    pub spread_policy: Dec,
    pub exact: ExactSwap,
    /// `|ret_core − ret_exato|`
    pub ret_error_abs: BigRational,
    /// `|spread_core − spread_exato|`
    pub spread_error_abs: BigRational,
}

/// Compara o **core** (`price_swap`) com a referência exata.
pub fn golden_price_swap(
    offer: &Coin,
    ask_denom: &str,
    rates: &RateTable,
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> Result<GoldenSwap> {
    let (ret_core, spread_core) = price_swap(offer, ask_denom, rates, *base_pool, *min_stability_spread, *delta)?;
    let exact = exact_swap(offer, ask_denom, rates, base_pool, min_stability_spread, delta)?;

    let ret_policy = rational_to_dec(&exact.ret_amount)?;
    let spread_policy = rational_to_dec(&exact.spread)?;
    let ret_error_abs = (dec_to_rational(&ret_core.amount) - &exact.ret_amount).abs();
    let spread_error_abs = (dec_to_rational(&spread_core) - &exact.spread).abs();

    Ok(GoldenSwap {
        ret_core,
        spread_core,
        ret_policy,
        spread_policy,
        exact,
        ret_error_abs,
        spread_error_abs,
    })
}

/// `|terra·luna − base²| / base²` exato, para os lados calculados pelo core.
pub fn invariant_error_rel_exact(terra_pool: &Dec, luna_pool: &Dec, base_pool: &Dec) -> BigRational {
    let base = dec_to_rational(base_pool);
    let cp = &base * &base;
    let k1 = dec_to_rational(terra_pool) * dec_to_rational(luna_pool);
    (k1 - &cp).abs() / cp
}
