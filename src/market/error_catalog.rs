//! Catálogo imutável de erros do mercado.
use core::fmt;

/// Código de erro do mercado.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum MarketErrorCode {
    /// Montante ofertado zero ou negativo.
    ZeroAmount,
    /// Denominação ausente da tabela de taxas.
    MissingRate,
    /// Conversão resultou em montante não positivo (taxa corrompida/zerada).
    InvalidConversion,
    /// Taxa ausente no salto para a denominação de referência (envolve a causa).
    InvalidRate,
    /// Base pool, delta ou spread mínimo fora do domínio.
    InvalidPoolState,
    /// Overflow em cálculos numéricos.
    OverflowNumeric,
    /// Divisão por zero.
    DivisionByZero,
    /// Texto decimal ou de moedas malformado.
    ParseDecimal,
}

impl MarketErrorCode {
    /// Código textual estável do erro.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "MKT-0001",
            Self::MissingRate => "MKT-0002",
            Self::InvalidConversion => "MKT-0003",
            Self::InvalidRate => "MKT-0004",
            Self::InvalidPoolState => "MKT-0005",
            Self::OverflowNumeric => "MKT-0006",
            Self::DivisionByZero => "MKT-0007",
            Self::ParseDecimal => "MKT-0008",
        }
    }

    /// Título curto em português.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "Quantidade zerada",
            Self::MissingRate => "Taxa ausente",
            Self::InvalidConversion => "Conversão inválida",
            Self::InvalidRate => "Taxa base inválida",
            Self::InvalidPoolState => "Estado do pool inválido",
            Self::OverflowNumeric => "Overflow numérico",
            Self::DivisionByZero => "Divisão por zero",
            Self::ParseDecimal => "Decimal malformado",
        }
    }

    /// Mensagem base em português. Placeholders `{chave}` vêm do contexto.
    pub const fn message_pt(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "amount ofertado deve ser > 0",
            Self::MissingRate => "taxa (uluna) ausente para {denom}",
            Self::InvalidConversion => "montante de retorno inválido",
            Self::InvalidRate => "taxa base (sdr) inválida para {denom}",
            Self::InvalidPoolState => "parâmetros do pool fora do domínio",
            Self::OverflowNumeric => "overflow/underflow numérico",
            Self::DivisionByZero => "divisão por zero",
            Self::ParseDecimal => "texto decimal inválido",
        }
    }

    /// Retorna todas as variantes em ordem estável.
    pub fn all() -> &'static [MarketErrorCode] {
        const ALL: &[MarketErrorCode] = &[
            MarketErrorCode::ZeroAmount,
            MarketErrorCode::MissingRate,
            MarketErrorCode::InvalidConversion,
            MarketErrorCode::InvalidRate,
            MarketErrorCode::InvalidPoolState,
            MarketErrorCode::OverflowNumeric,
            MarketErrorCode::DivisionByZero,
            MarketErrorCode::ParseDecimal,
        ];
        ALL
    }
}

impl fmt::Display for MarketErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mensagem padrão na localidade ativa (pt-BR).
pub fn default_locale_message(code: MarketErrorCode) -> &'static str {
    code.message_pt()
}
