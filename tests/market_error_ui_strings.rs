use virtual_pools_core::market::error::MarketError;
use virtual_pools_core::market::error_catalog::MarketErrorCode;

#[test]
fn no_newlines_or_tabs() {
    let err = MarketError::new(MarketErrorCode::MissingRate).with_context("denom", "linha1\nlinha2\ttab");
    let user = err.to_user_string();
    assert!(!user.contains('\n'));
    assert!(!user.contains('\t'));
}

#[test]
fn truncate_long_context_values() {
    let long_value = "a".repeat(1024);
    let err = MarketError::new(MarketErrorCode::InvalidRate).with_context("denom", long_value);
    let user = err.to_user_string();
    assert!(user.len() < 512);
}

#[test]
fn unknown_placeholder_is_left_as_is() {
    let err = MarketError::new(MarketErrorCode::ZeroAmount);
    let rendered = err.render_with_template("erro {desconhecido}");
    assert_eq!(rendered, "erro {desconhecido}");
}

#[test]
fn missing_context_keeps_placeholder() {
    let err = MarketError::new(MarketErrorCode::InvalidRate);
    assert_eq!(err.to_user_string(), "[MKT-0004] taxa base (sdr) inválida para {denom}");
}
