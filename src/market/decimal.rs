//! Decimal de ponto fixo com 18 casas (mesma semântica do `sdk.Dec` da chain).
//!
//! Representação: sinal + magnitude `U256` escalada por 1e18. Zero nunca é
//! negativo. Todas as operações são **checadas** (retornam `Result`, nunca
//! entram em pânico). Política de arredondamento:
//! - mul: `round_nearest_even(a·b / 1e18)`
//! - quo: `round_nearest_even(a·1e18 / b)`
//! - produtos intermediários em U512 (sem overflow antes do reescalonamento)

use core::cmp::Ordering;
use core::fmt;
use core::ops::Neg;
use core::str::FromStr;

use super::error::{MarketError, Result};
use super::error_catalog::MarketErrorCode;
use super::guardrails::{checked_add, div_nearest_even_u512_to_u256, mul_u256_to_u512, widen};
use super::types::{precision_multiplier, PRECISION, U256};

/// Decimal com sinal, 18 casas fracionárias.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dec {
    negative: bool,
    abs: U256,
}

// n/d nearest-even com d != 0 garantido pelo chamador
fn round_div_u256(n: U256, d: U256) -> U256 {
    let q = n / d;
    let r = n % d;
    let half_cmp = (r << 1).cmp(&d);
    match half_cmp {
        Ordering::Less => q,
        Ordering::Greater => q + U256::one(),
        Ordering::Equal if (q & U256::one()).is_zero() => q,
        Ordering::Equal => q + U256::one(),
    }
}

impl Dec {
    /// Constrói a partir do valor bruto escalado (`valor · 1e18`).
    pub fn from_atomics(negative: bool, abs: U256) -> Self {
        Self {
            negative: negative && !abs.is_zero(),
            abs,
        }
    }

    pub fn zero() -> Self {
        Self::from_atomics(false, U256::zero())
    }

    pub fn one() -> Self {
        Self::from_atomics(false, precision_multiplier())
    }

    /// Inteiro sem sinal → Dec (nunca estoura: u128·1e18 < 2^256).
    pub fn from_u128(value: u128) -> Self {
        Self::from_atomics(false, U256::from(value) * precision_multiplier())
    }

    pub fn from_i128(value: i128) -> Self {
        Self::from_u128(value.unsigned_abs()).with_sign(value < 0)
    }

    /// `num / den` com arredondamento nearest-even.
    pub fn from_ratio(num: i128, den: i128) -> Result<Self> {
        Self::from_i128(num).checked_quo(&Self::from_i128(den))
    }

    /// Valor bruto escalado (`valor · 1e18`) com sinal.
    pub fn atomics(&self) -> (bool, U256) {
        (self.negative, self.abs)
    }

    fn with_sign(self, negative: bool) -> Self {
        Self::from_atomics(negative, self.abs)
    }

    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.abs.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self::from_atomics(false, self.abs)
    }

    pub fn checked_add(&self, other: &Dec) -> Result<Dec> {
        if self.negative == other.negative {
            let abs = checked_add(self.abs, other.abs)?;
            return Ok(Self::from_atomics(self.negative, abs));
        }
        // sinais opostos: subtrai a menor magnitude da maior
        match self.abs.cmp(&other.abs) {
            Ordering::Less => Ok(Self::from_atomics(other.negative, other.abs - self.abs)),
            _ => Ok(Self::from_atomics(self.negative, self.abs - other.abs)),
        }
    }

    pub fn checked_sub(&self, other: &Dec) -> Result<Dec> {
        self.checked_add(&-*other)
    }

    pub fn checked_mul(&self, other: &Dec) -> Result<Dec> {
        let n = mul_u256_to_u512(self.abs, other.abs);
        let abs = div_nearest_even_u512_to_u256(n, widen(precision_multiplier()))?;
        Ok(Self::from_atomics(self.negative != other.negative, abs))
    }

    pub fn checked_quo(&self, other: &Dec) -> Result<Dec> {
        if other.is_zero() {
            return Err(MarketError::new(MarketErrorCode::DivisionByZero)
                .with_context("dividend", self));
        }
        let n = mul_u256_to_u512(self.abs, precision_multiplier());
        let abs = div_nearest_even_u512_to_u256(n, widen(other.abs))?;
        Ok(Self::from_atomics(self.negative != other.negative, abs))
    }

    /// Potência inteira por quadrados sucessivos (arredonda a cada mul).
    pub fn checked_pow(&self, exp: u32) -> Result<Dec> {
        let mut result = Dec::one();
        let mut base = *self;
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.checked_mul(&base)?;
            }
            e >>= 1;
            if e > 0 {
                base = base.checked_mul(&base)?;
            }
        }
        Ok(result)
    }

    /// Texto com `places` casas (nearest-even), como `toFixed` da UI.
    pub fn to_fixed(&self, places: u32) -> String {
        let places = places.min(PRECISION);
        let divisor = U256::exp10((PRECISION - places) as usize);
        let rounded = round_div_u256(self.abs, divisor);
        let unit = U256::exp10(places as usize);
        let int_part = rounded / unit;
        let sign = if self.negative && !rounded.is_zero() { "-" } else { "" };
        if places == 0 {
            return format!("{}{}", sign, int_part);
        }
        let frac = (rounded % unit).to_string();
        format!("{}{}.{:0>width$}", sign, int_part, frac, width = places as usize)
    }

    /// Aproximação em f64, só para métricas e exibição.
    pub fn to_f64_lossy(&self) -> f64 {
        let magnitude = self.abs.to_string().parse::<f64>().unwrap_or(f64::MAX) / 1e18;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

impl Default for Dec {
    fn default() -> Self {
        Dec::zero()
    }
}

impl Neg for Dec {
    type Output = Dec;

    fn neg(self) -> Dec {
        Dec::from_atomics(!self.negative, self.abs)
    }
}

impl Ord for Dec {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.abs.cmp(&other.abs),
            (true, true) => other.abs.cmp(&self.abs),
        }
    }
}

impl PartialOrd for Dec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u64> for Dec {
    fn from(value: u64) -> Self {
        Dec::from_u128(u128::from(value))
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fixed(PRECISION))
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({})", self)
    }
}

impl FromStr for Dec {
    type Err = MarketError;

    /// Aceita `[-]int[.frac]` com até 18 dígitos fracionários.
    fn from_str(input: &str) -> Result<Self> {
        let malformed = || MarketError::new(MarketErrorCode::ParseDecimal).with_context("input", input);
        let trimmed = input.trim();
        let (negative, body) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (int_str, frac_str) = match body.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (body, None),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_str) {
            return Err(malformed());
        }
        let frac_str = match frac_str {
            Some(f) if !all_digits(f) || f.len() > PRECISION as usize => return Err(malformed()),
            Some(f) => f,
            None => "",
        };

        let overflow = || MarketError::new(MarketErrorCode::OverflowNumeric).with_context("input", input);
        let int_part = U256::from_dec_str(int_str).map_err(|_| overflow())?;
        let scaled = int_part
            .checked_mul(precision_multiplier())
            .ok_or_else(overflow)?;
        let frac_part = if frac_str.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac_str, width = PRECISION as usize);
            U256::from_dec_str(&padded).map_err(|_| malformed())?
        };
        let abs = checked_add(scaled, frac_part)?;
        Ok(Dec::from_atomics(negative, abs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Dec {
        s.parse().unwrap()
    }

    #[test]
    fn t_parse_and_display() {
        assert_eq!(d("1").to_string(), "1.000000000000000000");
        assert_eq!(d("-0.005").to_string(), "-0.005000000000000000");
        assert_eq!(d("123.456").to_string(), "123.456000000000000000");
        assert_eq!(d("0.000000000000000001").atomics(), (false, U256::one()));
        assert_eq!(d("-0"), Dec::zero());
        assert!(!d("-0").is_negative());
    }

    #[test]
    fn t_parse_rejects_garbage() {
        for bad in ["", "-", "abc", "1.", ".5", "1.2.3", "1e5", "0.0000000000000000001", "+1"] {
            let err = bad.parse::<Dec>().unwrap_err();
            assert_eq!(err.code, MarketErrorCode::ParseDecimal, "input {:?}", bad);
        }
    }

    #[test]
    fn t_parse_overflow() {
        let huge = "9".repeat(80);
        let err = huge.parse::<Dec>().unwrap_err();
        assert_eq!(err.code, MarketErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_add_sub_signs() {
        assert_eq!(d("1.5").checked_add(&d("-2")).unwrap(), d("-0.5"));
        assert_eq!(d("-1.5").checked_add(&d("2")).unwrap(), d("0.5"));
        assert_eq!(d("-1").checked_sub(&d("-1")).unwrap(), Dec::zero());
        assert_eq!(d("3").checked_sub(&d("5")).unwrap(), d("-2"));
    }

    #[test]
    fn t_mul_rounds_nearest_even() {
        let tiny = d("0.000000000000000001");
        // 1e-18 * 0.5 = 0.5e-18 -> empate, 0 é par
        assert_eq!(tiny.checked_mul(&d("0.5")).unwrap(), Dec::zero());
        // 3e-18 * 0.5 = 1.5e-18 -> empate, sobe para 2e-18
        let three = d("0.000000000000000003");
        assert_eq!(three.checked_mul(&d("0.5")).unwrap(), d("0.000000000000000002"));
        assert_eq!(d("-2").checked_mul(&d("1.25")).unwrap(), d("-2.5"));
    }

    #[test]
    fn t_quo_rounding_and_zero() {
        assert_eq!(Dec::one().checked_quo(&d("3")).unwrap(), d("0.333333333333333333"));
        assert_eq!(d("2").checked_quo(&d("3")).unwrap(), d("0.666666666666666667"));
        assert_eq!(d("-1").checked_quo(&d("4")).unwrap(), d("-0.25"));
        let err = Dec::one().checked_quo(&Dec::zero()).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::DivisionByZero);
    }

    #[test]
    fn t_pow() {
        assert_eq!(d("50000000000000").checked_pow(2).unwrap(), d("2500000000000000000000000000"));
        assert_eq!(d("1.1").checked_pow(3).unwrap(), d("1.331"));
        assert_eq!(d("7").checked_pow(0).unwrap(), Dec::one());
        assert_eq!(d("-2").checked_pow(3).unwrap(), d("-8"));
    }

    #[test]
    fn t_mul_overflow_is_error() {
        let big = Dec::from_u128(u128::MAX);
        let err = big.checked_pow(3).unwrap_err();
        assert_eq!(err.code, MarketErrorCode::OverflowNumeric);
    }

    #[test]
    fn t_ordering() {
        let mut v = vec![d("1"), d("-3"), Dec::zero(), d("-0.5"), d("2.25")];
        v.sort();
        assert_eq!(v, vec![d("-3"), d("-0.5"), Dec::zero(), d("1"), d("2.25")]);
        assert_eq!(d("0.004").max(d("0.005")), d("0.005"));
    }

    #[test]
    fn t_to_fixed() {
        assert_eq!(d("7.995").to_fixed(2), "8.00");
        assert_eq!(d("7.985").to_fixed(2), "7.98");
        assert_eq!(d("1234.56789").to_fixed(4), "1234.5679");
        assert_eq!(d("-0.001").to_fixed(2), "0.00");
        assert_eq!(d("-1.5").to_fixed(0), "-2");
        assert_eq!(d("0.05").to_fixed(2), "0.05");
    }

    #[test]
    fn t_from_ratio_and_f64() {
        assert_eq!(Dec::from_ratio(1, 8).unwrap(), d("0.125"));
        assert_eq!(Dec::from_i128(-42), d("-42"));
        assert!((d("0.005").to_f64_lossy() - 0.005).abs() < 1e-15);
    }
}
