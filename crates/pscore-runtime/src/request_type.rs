use pscore_fields::is_match;

use crate::scoring::ScoreFormula;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request-type values that select a scoring formula.
pub struct RequestTypeValues {
    pub product: String,
    pub engineering_enabler: String,
    pub ktlo: String,
}

impl Default for RequestTypeValues {
    fn default() -> Self {
        Self {
            product: "Product PR".to_string(),
            engineering_enabler: "Engineering Enabler".to_string(),
            ktlo: "Keep the Lights on (KTLO)".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTypeClass {
    Product,
    EngineeringOrKtlo,
    /// Carries the raw request-type value, if there was one.
    Unmatched(Option<String>),
}

impl RequestTypeClass {
    pub fn classify(request_type: Option<&str>, values: &RequestTypeValues) -> Self {
        if is_match(request_type, Some(values.product.as_str())) {
            Self::Product
        } else if is_match(request_type, Some(values.engineering_enabler.as_str()))
            || is_match(request_type, Some(values.ktlo.as_str()))
        {
            Self::EngineeringOrKtlo
        } else {
            Self::Unmatched(request_type.map(str::to_string))
        }
    }

    pub fn formula(&self) -> Option<ScoreFormula> {
        match self {
            Self::Product => Some(ScoreFormula::Product),
            Self::EngineeringOrKtlo => Some(ScoreFormula::EngineeringOrKtlo),
            Self::Unmatched(_) => None,
        }
    }

    /// Raw value for "not matched" log lines; blank renders as `(null)`.
    pub fn display_value(&self) -> &str {
        match self {
            Self::Unmatched(Some(value)) if !value.trim().is_empty() => value,
            Self::Unmatched(_) => "(null)",
            Self::Product => "Product",
            Self::EngineeringOrKtlo => "EngineeringOrKtlo",
        }
    }
}
