//! Tipo de erro unificado do mercado com formatação estável.
use core::fmt;
use std::collections::BTreeMap;

use crate::market::error_catalog::{default_locale_message, MarketErrorCode};

const CONTEXT_VALUE_MAX: usize = 256;

fn sanitize_value(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| match ch {
            '\n' | '\r' | '\t' => ' ',
            _ => ch,
        })
        .collect();
    if cleaned.chars().count() > CONTEXT_VALUE_MAX {
        let mut truncated = cleaned
            .chars()
            .take(CONTEXT_VALUE_MAX - 1)
            .collect::<String>();
        truncated.push('…');
        truncated
    } else {
        cleaned
    }
}

fn escape_json(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\u{08}' => escaped.push_str("\\b"),
            '\u{0c}' => escaped.push_str("\\f"),
            c if c.is_control() => {
                use core::fmt::Write as _;
                let _ = write!(&mut escaped, "\\u{:04x}", c as u32);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_template(template: &str, context: &BTreeMap<String, String>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars();
    while let Some(ch) = chars.next() {
        if ch != '{' {
            rendered.push(ch);
            continue;
        }
        let key: String = chars.by_ref().take_while(|&c| c != '}').collect();
        match context.get(&key) {
            Some(value) if !key.is_empty() => rendered.push_str(value),
            _ => {
                rendered.push('{');
                rendered.push_str(&key);
                rendered.push('}');
            }
        }
    }
    rendered
}

/// Erro do mercado com contexto estruturado e causa opcional.
#[derive(Debug, Clone)]
pub struct MarketError {
    pub code: MarketErrorCode,
    pub context: BTreeMap<String, String>,
    source: Option<Box<MarketError>>,
}

impl MarketError {
    /// Cria um novo erro sem contexto adicional.
    pub fn new(code: MarketErrorCode) -> Self {
        Self {
            code,
            context: BTreeMap::new(),
            source: None,
        }
    }

    /// Adiciona um par chave/valor ao contexto.
    pub fn with_context<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let key_string = key.into();
        if !key_string.is_empty() {
            let sanitized = sanitize_value(&value.to_string());
            self.context.insert(key_string, sanitized);
        }
        self
    }

    /// Envolve `cause` como origem deste erro.
    pub fn caused_by(mut self, cause: MarketError) -> Self {
        self.source = Some(Box::new(cause));
        self
    }

    /// Erro de origem, se houver.
    pub fn cause(&self) -> Option<&MarketError> {
        self.source.as_deref()
    }

    /// Verdadeiro se este erro ou algum da cadeia tem `code`.
    pub fn has_code(&self, code: MarketErrorCode) -> bool {
        self.code == code || self.cause().is_some_and(|c| c.has_code(code))
    }

    fn resolved_message(&self) -> String {
        let template = default_locale_message(self.code);
        render_template(template, &self.context)
    }

    /// Mensagem curta para UI.
    pub fn to_user_string(&self) -> String {
        let message = self.resolved_message();
        format!("[{}] {}", self.code.code(), message)
    }

    /// Renderiza um template arbitrário usando o contexto atual.
    pub fn render_with_template(&self, template: &str) -> String {
        render_template(template, &self.context)
    }

    /// Serialização estável em JSON para logs.
    pub fn to_log_json(&self) -> String {
        let message = self.resolved_message();
        let mut json = String::from("{");
        json.push_str("\"code\":\"");
        json.push_str(&escape_json(self.code.code()));
        json.push_str("\",\"title\":\"");
        json.push_str(&escape_json(self.code.title()));
        json.push_str("\",\"message\":\"");
        json.push_str(&escape_json(&message));
        json.push_str("\",\"context\":{");
        let mut first = true;
        for (key, value) in &self.context {
            if !first {
                json.push(',');
            }
            first = false;
            json.push('"');
            json.push_str(&escape_json(key));
            json.push_str("\":\"");
            json.push_str(&escape_json(value));
            json.push('"');
        }
        json.push('}');
        if let Some(cause) = &self.source {
            json.push_str(",\"cause\":");
            json.push_str(&cause.to_log_json());
        }
        json.push('}');
        json
    }
}

impl PartialEq for MarketError {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.context == other.context && self.source == other.source
    }
}

impl fmt::Display for MarketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_user_string())
    }
}

impl std::error::Error for MarketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Resultado padrão para operações do mercado.
pub type Result<T> = std::result::Result<T, MarketError>;

#[macro_export]
macro_rules! market_err {
  ($code:expr) => {{
    $crate::market::error::MarketError::new($code)
  }};
  ($code:expr, $($key:ident => $value:expr),+ $(,)?) => {{
    let mut err = $crate::market::error::MarketError::new($code);
    $(
      err = err.with_context(stringify!($key), $value);
    )+
    err
  }};
  ($code:expr, { $($key:expr => $value:expr),+ $(,)? }) => {{
    let mut err = $crate::market::error::MarketError::new($code);
    $(
      err = err.with_context($key, $value);
    )+
    err
  }};
}

#[macro_export]
macro_rules! market_bail {
  ($($tt:tt)*) => {
    return Err($crate::market_err!($($tt)*))
  };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn user_string_basic() {
        let err = MarketError::new(MarketErrorCode::ZeroAmount);
        assert_eq!(err.to_user_string(), "[MKT-0001] amount ofertado deve ser > 0");
    }

    #[test]
    fn user_string_fills_denom() {
        let err = MarketError::new(MarketErrorCode::MissingRate).with_context("denom", "ukrw");
        assert_eq!(err.to_user_string(), "[MKT-0002] taxa (uluna) ausente para ukrw");
    }

    #[test]
    fn placeholder_subst() {
        let err = MarketError::new(MarketErrorCode::OverflowNumeric).with_context("detalhe", "valor");
        let rendered = err.render_with_template("falha {detalhe}");
        assert_eq!(rendered, "falha valor");
    }

    #[test]
    fn log_json_shape() {
        let err = MarketError::new(MarketErrorCode::InvalidPoolState).with_context("base_pool", "0");
        let json = err.to_log_json();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"code\":"));
        assert!(json.contains("\"title\":"));
        assert!(json.contains("\"message\":"));
        assert!(json.contains("\"context\":"));
        assert!(!json.contains("\"cause\":"));
    }

    #[test]
    fn cause_chain() {
        let inner = MarketError::new(MarketErrorCode::MissingRate).with_context("denom", "ukrw");
        let outer = MarketError::new(MarketErrorCode::InvalidRate)
            .with_context("denom", "ukrw")
            .caused_by(inner.clone());
        assert_eq!(outer.cause(), Some(&inner));
        assert!(outer.has_code(MarketErrorCode::MissingRate));
        assert!(!outer.has_code(MarketErrorCode::ZeroAmount));
        assert!(outer.source().is_some());
        assert!(outer.to_log_json().contains("\"cause\":{\"code\":\"MKT-0002\""));
    }

    #[test]
    fn macros_variants() {
        let err = market_err!(MarketErrorCode::MissingRate, denom => "uusd");
        assert_eq!(err.code, MarketErrorCode::MissingRate);
        assert_eq!(err.context.get("denom").unwrap(), "uusd");

        let err_block = market_err!(MarketErrorCode::InvalidPoolState, { "delta" => 7 });
        assert_eq!(err_block.code, MarketErrorCode::InvalidPoolState);
        assert_eq!(err_block.context.get("delta").unwrap(), "7");

        fn bails() -> Result<()> {
            market_bail!(MarketErrorCode::ZeroAmount, amount => 0);
        }
        assert_eq!(bails().unwrap_err().code, MarketErrorCode::ZeroAmount);
    }
}
