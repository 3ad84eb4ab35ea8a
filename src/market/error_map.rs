//! Mapeamento entre condições de domínio e códigos de erro do mercado.
use crate::market::decimal::Dec;
use crate::market::error::MarketError;
use crate::market::error_catalog::MarketErrorCode;

/// Determina o código de erro para um swap a partir dos inputs brutos.
///
/// Domínio válido: `offer > 0`, `base_pool > 0`, `base_pool + delta > 0`,
/// `0 <= min_spread < 1`. Delta positivo não tem teto.
pub fn from_swap_inputs(
    offer_amount: &Dec,
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> Option<MarketErrorCode> {
    if !offer_amount.is_positive() {
        return Some(MarketErrorCode::ZeroAmount);
    }
    from_pool_inputs(base_pool, min_stability_spread, delta)
}

/// Mesmo critério de [`from_swap_inputs`] sem olhar o montante ofertado.
pub fn from_pool_inputs(
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> Option<MarketErrorCode> {
    if !base_pool.is_positive() {
        return Some(MarketErrorCode::InvalidPoolState);
    }
    if min_stability_spread.is_negative() || *min_stability_spread >= Dec::one() {
        return Some(MarketErrorCode::InvalidPoolState);
    }
    // lado terra precisa ser positivo; luna = cp / terra
    match base_pool.checked_add(delta) {
        Ok(terra) if terra.is_positive() => {}
        _ => return Some(MarketErrorCode::InvalidPoolState),
    }
    None
}

/// Constrói um [`MarketError`] diretamente de um código, com os inputs no contexto.
pub fn to_error(
    code: MarketErrorCode,
    base_pool: &Dec,
    min_stability_spread: &Dec,
    delta: &Dec,
) -> MarketError {
    MarketError::new(code)
        .with_context("base_pool", base_pool)
        .with_context("min_stability_spread", min_stability_spread)
        .with_context("delta", delta)
}
