//! Outbound query parameter mapping
//!
//! A `Params` value is built fresh per tool call and discarded after the
//! response. Absent parameters are never inserted, so they never reach the
//! wire as empty or null values.

/// A single query parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// String value
    Str(String),
    /// Non-negative integer value
    Int(u64),
    /// Array of strings, serialized as repeated `key[]=value` entries
    Seq(Vec<String>),
}

impl ParamValue {
    /// Scalar rendering of this value; `None` for arrays.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::Seq(_) => None,
        }
    }
}

/// Ordered parameter mapping for one outbound request
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    /// Create an empty parameter mapping
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a string parameter
    #[must_use]
    pub fn str(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.push((key.to_string(), ParamValue::Str(value.into())));
        self
    }

    /// Insert a string parameter; `None` is omitted entirely
    #[must_use]
    pub fn str_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.str(key, v),
            None => self,
        }
    }

    /// Insert an integer parameter; `None` is omitted entirely
    #[must_use]
    pub fn int_opt(mut self, key: &str, value: Option<u64>) -> Self {
        if let Some(v) = value {
            self.0.push((key.to_string(), ParamValue::Int(v)));
        }
        self
    }

    /// Insert an array parameter
    #[must_use]
    pub fn seq(mut self, key: &str, values: Vec<String>) -> Self {
        self.0.push((key.to_string(), ParamValue::Seq(values)));
        self
    }

    /// Insert an array parameter; `None` is omitted entirely
    #[must_use]
    pub fn seq_opt(self, key: &str, values: Option<Vec<String>>) -> Self {
        match values {
            Some(v) => self.seq(key, v),
            None => self,
        }
    }

    /// First value recorded under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether no parameters were recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into query pairs. Arrays expand to repeated `key[]` entries.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                ParamValue::Str(s) => pairs.push((key.clone(), s.clone())),
                ParamValue::Int(n) => pairs.push((key.clone(), n.to_string())),
                ParamValue::Seq(values) => {
                    for v in values {
                        pairs.push((format!("{key}[]"), v.clone()));
                    }
                }
            }
        }
        pairs
    }
}
