//! Validações e helpers numéricos seguros para o mercado.
//! Objetivo: entradas seguras e divisões/multiplicações sem estouro.

use super::error::{MarketError, Result};
use super::error_catalog::MarketErrorCode;
use super::types::{U256, U512};

#[inline]
pub fn widen(v: U256) -> U512 {
    let mut words = [0u64; 8];
    words[..4].copy_from_slice(&v.0);
    U512(words)
}

/// Downcast U512 → U256 (erro se não couber).
#[inline]
pub fn narrow_checked(v: U512) -> Result<U256> {
    if v.0[4..].iter().any(|&w| w != 0) {
        return Err(MarketError::new(MarketErrorCode::OverflowNumeric));
    }
    let mut words = [0u64; 4];
    words.copy_from_slice(&v.0[..4]);
    Ok(U256(words))
}

#[inline]
pub fn mul_u256_to_u512(a: U256, b: U256) -> U512 {
    widen(a) * widen(b)
}

#[inline]
pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or_else(|| MarketError::new(MarketErrorCode::OverflowNumeric))
}

/// Divisão com arredondamento *nearest (ties-to-even)* em U512 → U512
pub fn div_nearest_even_u512(n: U512, d: U512) -> Result<U512> {
    if d.is_zero() {
        return Err(MarketError::new(MarketErrorCode::DivisionByZero));
    }
    let q = n / d; // quociente
    let r = n % d; // resto
    let two_r = r << 1; // 2*r
    if two_r < d {
        return Ok(q);
    }
    if two_r > d {
        return Ok(q + U512::from(1u8));
    }
    // empate: arredonda para o par
    if (q & U512::from(1u8)) == U512::from(1u8) {
        Ok(q + U512::from(1u8))
    } else {
        Ok(q)
    }
}

/// Versão que retorna U256 (com checagem de overflow no downcast)
pub fn div_nearest_even_u512_to_u256(n: U512, d: U512) -> Result<U256> {
    let q = div_nearest_even_u512(n, d)?;
    narrow_checked(q)
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_widen_narrow_roundtrip() {
        let v = U256::from(u128::MAX) * U256::from(7u8);
        assert_eq!(narrow_checked(widen(v)).unwrap(), v);
    }

    #[test]
    fn t_narrow_overflow() {
        let big = widen(U256::MAX) * U512::from(2u8);
        let err = narrow_checked(big).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_checked_add_overflow() {
        assert_eq!(checked_add(U256::from(1u8), U256::from(2u8)).unwrap(), U256::from(3u8));
        let err = checked_add(U256::MAX, U256::from(1u8)).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_mul_no_intermediate_overflow() {
        let p = mul_u256_to_u512(U256::MAX, U256::from(2u8));
        assert!(narrow_checked(p).is_err());
        let back = div_nearest_even_u512_to_u256(p, U512::from(2u8)).unwrap();
        assert_eq!(back, U256::MAX);
    }

    #[test]
    fn t_u512_div_nearest_even_rounding() {
        let two = U512::from(2u8);
        let three = U512::from(3u8);
        let five = U512::from(5u8);
        let seven = U512::from(7u8);

        // 5/2 = 2.5 -> empata, 2 é par -> fica 2
        assert_eq!(div_nearest_even_u512(five, two).unwrap(), U512::from(2u8));
        // 3/2 = 1.5 -> empata, 1 é ímpar -> sobe para 2
        assert_eq!(div_nearest_even_u512(three, two).unwrap(), U512::from(2u8));
        // 7/3 = 2.33 -> 2
        assert_eq!(div_nearest_even_u512(seven, three).unwrap(), U512::from(2u8));
    }

    #[test]
    fn t_div_by_zero() {
        let err = div_nearest_even_u512(U512::from(1u8), U512::zero()).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::DivisionByZero);
    }
}
