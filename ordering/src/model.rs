use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const LOCAL_FIELD: &str = "local";
pub const FECHA_FIELD: &str = "fecha";

/// Menu items, in the order the form lists them.
pub const QUANTITY_FIELDS: [&str; 7] = [
    "pollo",
    "mila",
    "pata",
    "alita",
    "suprema",
    "menudo",
    "rebosador",
];

pub const SUCCESS_MESSAGE: &str = "Pedido procesado correctamente";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Opcion1,
    Opcion2,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Opcion1 => "opcion1",
            Location::Opcion2 => "opcion2",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "opcion1" => Some(Location::Opcion1),
            "opcion2" => Some(Location::Opcion2),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quantities {
    pub pollo: u64,
    pub mila: u64,
    pub pata: u64,
    pub alita: u64,
    pub suprema: u64,
    pub menudo: u64,
    pub rebosador: u64,
}

impl Quantities {
    /// Values in `QUANTITY_FIELDS` order.
    pub fn from_array(values: [u64; 7]) -> Self {
        let [pollo, mila, pata, alita, suprema, menudo, rebosador] = values;
        Self {
            pollo,
            mila,
            pata,
            alita,
            suprema,
            menudo,
            rebosador,
        }
    }

    pub fn to_array(&self) -> [u64; 7] {
        [
            self.pollo,
            self.mila,
            self.pata,
            self.alita,
            self.suprema,
            self.menudo,
            self.rebosador,
        ]
    }

    /// Saturates at `u64::MAX`; quantities are only bounded by `u64`.
    pub fn total(&self) -> u64 {
        self.to_array()
            .iter()
            .fold(0u64, |acc, &quantity| acc.saturating_add(quantity))
    }
}

/// A validated order, serialized as the flat JSON object the stock API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub local: Location,
    pub fecha: String,
    #[serde(flatten)]
    pub quantities: Quantities,
}

/// Raw key/value form submission. When a key repeats, the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    fields: HashMap<String, String>,
}

impl OrderForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields = HashMap::new();
        for (key, value) in pairs {
            fields.entry(key.into()).or_insert_with(|| value.into());
        }
        Self { fields }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome returned to the caller of the order form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "OrderResultBody")]
pub enum OrderResult {
    Success {
        message: String,
        data: Value,
    },
    Failure {
        message: String,
        /// Field name (or `general`) to message, only for validation failures.
        errors: Option<BTreeMap<String, String>>,
    },
}

impl OrderResult {
    pub fn success(data: Value) -> Self {
        OrderResult::Success {
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        OrderResult::Failure {
            message: message.into(),
            errors: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OrderResult::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            OrderResult::Success { message, .. } | OrderResult::Failure { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            OrderResult::Success { data, .. } => Some(data),
            OrderResult::Failure { .. } => None,
        }
    }

    pub fn validation_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            OrderResult::Failure { errors, .. } => errors.as_ref(),
            OrderResult::Success { .. } => None,
        }
    }
}

/// Wire shape: `{ success, message, data?, errors? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResultBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl From<OrderResult> for OrderResultBody {
    fn from(result: OrderResult) -> Self {
        match result {
            OrderResult::Success { message, data } => OrderResultBody {
                success: true,
                message,
                data: Some(data),
                errors: None,
            },
            OrderResult::Failure { message, errors } => OrderResultBody {
                success: false,
                message,
                data: None,
                errors,
            },
        }
    }
}
