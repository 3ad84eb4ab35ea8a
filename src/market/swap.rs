//! Funções puras de swap do módulo Market (CPMM com piso de spread).
//! - convert_via_reference: conversão em dois saltos via token nativo
//! - price_swap: retorno nominal (sem taxa) + spread efetivo
//! - apply_spread: retorno após o spread

use super::coin::{Coin, RateTable};
use super::decimal::Dec;
use super::error::Result;
use super::error_catalog::MarketErrorCode;
use super::error_map::{from_swap_inputs, to_error};
use super::pool::VirtualPools;
use super::types::{NATIVE_DENOM, REFERENCE_DENOM};
use crate::{market_bail, market_err};

/// Converte `offer` em `ask_denom` passando pelas taxas em uluna:
/// `amount = offer.amount × ask_rate / offer_rate`.
///
/// Mesma denominação → devolve `offer` sem consultar a tabela.
pub fn convert_via_reference(offer: &Coin, ask_denom: &str, rates: &RateTable) -> Result<Coin> {
    if offer.denom == ask_denom {
        return Ok(offer.clone());
    }

    let offer_rate = rates
        .get(&offer.denom)
        .map_err(|e| e.with_context("leg", "offer"))?;
    let ask_rate = if ask_denom == NATIVE_DENOM {
        Dec::one()
    } else {
        rates.get(ask_denom).map_err(|e| e.with_context("leg", "ask"))?
    };

    if offer_rate.is_zero() {
        market_bail!(MarketErrorCode::InvalidConversion, denom => &offer.denom, rate => offer_rate);
    }
    let amount = offer.amount.checked_mul(&ask_rate)?.checked_quo(&offer_rate)?;
    if !amount.is_positive() {
        market_bail!(MarketErrorCode::InvalidConversion, denom => ask_denom, amount => amount);
    }
    Ok(Coin::new(ask_denom, amount))
}

/// Spread bruto do produto constante, em unidades de referência:
/// `ask_base = ask_pool − cp / (offer_pool + base_offer)`,
/// `spread = (base_offer − ask_base) / base_offer`.
pub fn constant_product_spread(
    pools: &VirtualPools,
    offer_is_native: bool,
    base_offer_amount: &Dec,
) -> Result<Dec> {
    let (offer_pool, ask_pool) = pools.sides(offer_is_native);
    let ask_base = ask_pool.checked_sub(&pools.cp.checked_quo(&offer_pool.checked_add(base_offer_amount)?)?)?;
    base_offer_amount
        .checked_sub(&ask_base)?
        .checked_quo(base_offer_amount)
}

/// Todos os termos intermediários de um swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapTerms {
    /// Oferta em usdr.
    pub base_offer: Coin,
    /// Retorno nominal (taxa do oráculo, sem spread).
    pub ret_coin: Coin,
    pub pools: VirtualPools,
    /// Spread implícito no invariante (sem piso), o slippage.
    pub raw_spread: Dec,
    /// `max(raw_spread, min_stability_spread)`.
    pub spread: Dec,
}

/// Calcula os termos do swap `offer → ask_denom`.
pub fn swap_terms(
    offer: &Coin,
    ask_denom: &str,
    rates: &RateTable,
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> Result<SwapTerms> {
    match from_swap_inputs(&offer.amount, base_pool, min_stability_spread, delta) {
        Some(MarketErrorCode::ZeroAmount) => {
            market_bail!(MarketErrorCode::ZeroAmount, denom => &offer.denom, amount => offer.amount)
        }
        Some(code) => return Err(to_error(code, base_pool, min_stability_spread, delta)),
        None => {}
    }

    // oferta em usdr; falha aqui identifica o salto de referência
    let base_offer = convert_via_reference(offer, REFERENCE_DENOM, rates).map_err(|cause| match cause.code {
        MarketErrorCode::MissingRate => {
            market_err!(MarketErrorCode::InvalidRate, denom => &offer.denom).caused_by(cause)
        }
        _ => cause,
    })?;

    let ret_coin = convert_via_reference(&base_offer, ask_denom, rates)?;

    let pools = VirtualPools::compute(base_pool, delta)?;

    let raw_spread = constant_product_spread(&pools, offer.denom == NATIVE_DENOM, &base_offer.amount)?;
    let spread = raw_spread.max(*min_stability_spread);

    Ok(SwapTerms {
        base_offer,
        ret_coin,
        pools,
        raw_spread,
        spread,
    })
}

/// Retorno nominal e spread efetivo do swap `offer → ask_denom`.
///
/// O retorno **não** desconta o spread; use [`apply_spread`] para o valor
/// após a taxa.
pub fn price_swap(
    offer: &Coin,
    ask_denom: &str,
    rates: &RateTable,
    base_pool: Dec,
    min_stability_spread: Dec,
    delta: Dec,
) -> Result<(Coin, Dec)> {
    let terms = swap_terms(offer, ask_denom, rates, &base_pool, &min_stability_spread, &delta)?;
    Ok((terms.ret_coin, terms.spread))
}

/// `amount × (1 − spread)`; `None` propaga "sem dados ainda".
pub fn apply_spread(coin: Option<&Coin>, spread: &Dec) -> Result<Option<Coin>> {
    coin.map(|c| c.after_spread(spread)).transpose()
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Dec {
        s.parse().unwrap()
    }

    fn rates() -> RateTable {
        "0.7usdr,1.2uusd,1500ukrw".parse().unwrap()
    }

    #[test]
    fn t_identity_conversion_skips_lookup() {
        let c = Coin::new("umnt", d("42"));
        let out = convert_via_reference(&c, "umnt", &RateTable::new()).unwrap();
        assert_eq!(out, c);
    }

    #[test]
    fn t_conversion_two_legs() {
        // 12 uusd → usdr: 12 × 0.7 / 1.2 = 7
        let out = convert_via_reference(&Coin::new("uusd", d("12")), "usdr", &rates()).unwrap();
        assert_eq!(out, Coin::new("usdr", d("7")));
        // para uluna a taxa do ask é 1
        let out = convert_via_reference(&Coin::new("uusd", d("12")), "uluna", &rates()).unwrap();
        assert_eq!(out, Coin::new("uluna", d("10")));
    }

    #[test]
    fn t_missing_rate_each_leg() {
        let err = convert_via_reference(&Coin::new("ueur", d("1")), "usdr", &rates()).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::MissingRate);
        assert_eq!(err.context.get("leg").unwrap(), "offer");

        let err = convert_via_reference(&Coin::new("uusd", d("1")), "ueur", &rates()).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::MissingRate);
        assert_eq!(err.context.get("leg").unwrap(), "ask");
        assert_eq!(err.context.get("denom").unwrap(), "ueur");
    }

    #[test]
    fn t_native_offer_needs_own_rate() {
        // uluna como oferta não tem taxa implícita
        let err = convert_via_reference(&Coin::new("uluna", d("1")), "usdr", &rates()).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::MissingRate);
    }

    #[test]
    fn t_invalid_conversion() {
        let zero_rate = RateTable::new().with_rate("uusd", Dec::zero()).with_rate("usdr", d("1"));
        let err = convert_via_reference(&Coin::new("uusd", d("1")), "usdr", &zero_rate).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidConversion);

        let neg_rate = RateTable::new().with_rate("uusd", d("1")).with_rate("usdr", d("-1"));
        let err = convert_via_reference(&Coin::new("uusd", d("1")), "usdr", &neg_rate).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidConversion);

        // montante arredonda para zero
        let tiny = RateTable::new().with_rate("uusd", d("10000000000000")).with_rate("usdr", d("1"));
        let err = convert_via_reference(&Coin::new("uusd", d("0.000001")), "usdr", &tiny).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidConversion);
    }

    #[test]
    fn t_price_swap_wraps_reference_hop() {
        let base = d("50000000000000");
        let err = price_swap(&Coin::new("ueur", d("10")), "uluna", &rates(), base, d("0.005"), Dec::zero())
            .unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidRate);
        assert_eq!(err.cause().unwrap().code, MarketErrorCode::MissingRate);
        assert!(err.has_code(MarketErrorCode::MissingRate));
    }

    #[test]
    fn t_price_swap_invalid_conversion_not_wrapped() {
        let zero_rate = RateTable::new().with_rate("uusd", Dec::zero()).with_rate("usdr", d("1"));
        let err = price_swap(&Coin::new("uusd", d("10")), "uluna", &zero_rate, d("100"), d("0.005"), Dec::zero())
            .unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidConversion);
        assert!(err.cause().is_none());
    }

    #[test]
    fn t_price_swap_terra_side_beyond_twice_base() {
        // delta = base ⇒ terra 200, luna 50; delta = 2·base ⇒ terra 300, luna 100/3
        let rates = RateTable::new().with_rate("usdr", d("1")).with_rate("uusd", d("1"));
        let offer = Coin::new("uusd", d("10"));
        let (ret, spread) = price_swap(&offer, "uluna", &rates, d("100"), d("0.005"), d("100")).unwrap();
        assert_eq!(ret, Coin::new("uluna", d("10")));
        // 1 − cp / (terra · (terra + x)) = 1 − 10000 / (200 · 210)
        let expected = Dec::one().checked_sub(&d("10000").checked_quo(&d("42000")).unwrap()).unwrap();
        assert!(spread.checked_sub(&expected).unwrap().abs() <= d("0.000000000000000002"), "spread={}", spread);

        let terms = swap_terms(&offer, "uluna", &rates, &d("100"), &d("0.005"), &d("200")).unwrap();
        assert_eq!(terms.pools.terra_pool, d("300"));
        assert!(terms.spread > expected);
    }

    #[test]
    fn t_price_swap_ask_leg_not_wrapped() {
        let base = d("50000000000000");
        let err = price_swap(&Coin::new("uusd", d("10")), "ueur", &rates(), base, d("0.005"), Dec::zero())
            .unwrap_err();
        assert_eq!(err.code, MarketErrorCode::MissingRate);
    }

    #[test]
    fn t_price_swap_rejects_zero_offer_and_bad_pool() {
        let err = price_swap(&Coin::new("uusd", Dec::zero()), "uluna", &rates(), d("100"), d("0.005"), Dec::zero())
            .unwrap_err();
        assert_eq!(err.code, MarketErrorCode::ZeroAmount);

        let err = price_swap(&Coin::new("uusd", d("1")), "uluna", &rates(), d("100"), d("0.005"), d("-100"))
            .unwrap_err();
        assert_eq!(err.code, MarketErrorCode::InvalidPoolState);
    }

    #[test]
    fn t_price_swap_small_trade_hits_floor() {
        let base = d("50000000000000");
        let offer = Coin::new("uusd", d("10000000000"));
        let (ret, spread) = price_swap(&offer, "uluna", &rates(), base, d("0.005"), Dec::zero()).unwrap();
        assert_eq!(ret.denom, "uluna");
        // 1e10 × 0.7 / 1.2 → usdr, depois × 1 / 0.7 → uluna
        let expected = d("10000000000")
            .checked_mul(&d("0.7"))
            .unwrap()
            .checked_quo(&d("1.2"))
            .unwrap()
            .checked_quo(&d("0.7"))
            .unwrap();
        assert_eq!(ret.amount, expected);
        assert_eq!(spread, d("0.005"));
    }

    #[test]
    fn t_large_trade_exceeds_floor() {
        // base pequeno: oferta de 10% do pool ⇒ spread bruto ~ 1/11
        let rates = RateTable::new().with_rate("usdr", d("1")).with_rate("uusd", d("1"));
        let terms = swap_terms(&Coin::new("uusd", d("10")), "uluna", &rates, &d("100"), &d("0.005"), &Dec::zero())
            .unwrap();
        assert_eq!(terms.raw_spread, d("10").checked_quo(&d("110")).unwrap());
        assert_eq!(terms.spread, terms.raw_spread);
    }

    #[test]
    fn t_native_offer_uses_luna_pool() {
        // delta > 0: pool terra maior, luna menor ⇒ ofertar terra é mais caro
        let rates = RateTable::new().with_rate("usdr", d("1")).with_rate("uusd", d("1"));
        let rates = rates.with_rate("uluna", d("1"));
        let (b, m, delta) = (d("1000"), Dec::zero(), d("100"));
        let luna = swap_terms(&Coin::new("uluna", d("10")), "uusd", &rates, &b, &m, &delta).unwrap();
        let terra = swap_terms(&Coin::new("uusd", d("10")), "uluna", &rates, &b, &m, &delta).unwrap();
        assert!(terra.raw_spread > luna.raw_spread);
        // luna→terra com pool luna menor dá spread bruto negativo; piso zero
        assert!(luna.raw_spread.is_negative());
        assert_eq!(luna.spread, Dec::zero());
    }

    #[test]
    fn t_apply_spread() {
        let c = Coin::new("uluna", d("200"));
        let out = apply_spread(Some(&c), &d("0.005")).unwrap().unwrap();
        assert_eq!(out, Coin::new("uluna", d("199")));
        assert_eq!(apply_spread(None, &d("0.005")).unwrap(), None);
    }
}
