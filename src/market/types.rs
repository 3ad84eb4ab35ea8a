//! Tipos básicos do mercado (escala fixa 1e18) + U256/U512 para intermediários.
//! Mesma escala do `sdk.Dec` da chain: 18 casas decimais.

use uint::construct_uint;
construct_uint! {
    /// Inteiro de 256 bits: magnitude de um [`Dec`](super::decimal::Dec).
    pub struct U256(4);
}
construct_uint! {
    /// Inteiro de 512 bits para produtos intermediários (a·b, a·1e18).
    pub struct U512(8);
}

/// Casas decimais de um `Dec`.
pub const PRECISION: u32 = 18;

/// Denominação de referência (SDR) usada na matemática do invariante.
pub const REFERENCE_DENOM: &str = "usdr";
/// Token nativo de staking; taxa implícita = 1.
pub const NATIVE_DENOM: &str = "uluna";

/// Fator micro-unidade → unidade inteira (1e6).
pub const MICRO_FACTOR: u64 = 1_000_000;

/// 1e18 como U256 (um inteiro no `Dec`).
#[inline]
pub fn precision_multiplier() -> U256 {
    U256::exp10(PRECISION as usize)
}
