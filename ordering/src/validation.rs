//! Order form validation.
//!
//! Runs in two stages over the raw form: per-field checks that produce a
//! typed value or a message keyed by field name, then the cross-field rule
//! that at least one product was ordered, keyed by [`GENERAL_KEY`]. Both are
//! pure functions of the submitted form.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{
    FECHA_FIELD, LOCAL_FIELD, Location, OrderForm, OrderRequest, QUANTITY_FIELDS, Quantities,
};

/// Error slot for messages not tied to a single field.
pub const GENERAL_KEY: &str = "general";

pub const MISSING_LOCATION: &str = "Debe seleccionar un local";
pub const INVALID_LOCATION: &str = "Local no válido";
pub const INVALID_DATE: &str = "Formato de fecha inválido (debe ser dd/mm/yyyy)";
pub const NOT_AN_INTEGER: &str = "Debe ser un número entero";
pub const NEGATIVE_QUANTITY: &str = "No puede ser negativo";
pub const REQUIRED_FIELD: &str = "Campo obligatorio";
pub const NO_PRODUCTS: &str = "Debe ingresar al menos un producto";

// ASCII digits only; `\d` would also accept other Unicode digits.
static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("date pattern compiles"));

/// Validation messages keyed by field name or [`GENERAL_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(key.into(), message.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn general(&self) -> Option<&str> {
        self.get(GENERAL_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .errors
            .iter()
            .map(|(key, message)| format!("{key}: {message}"))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

/// Output of the per-field stage.
#[derive(Debug, Clone, Default)]
pub struct CheckedFields {
    pub local: Option<Location>,
    pub fecha: Option<String>,
    /// In `QUANTITY_FIELDS` order; `None` where the field failed.
    pub quantities: [Option<u64>; 7],
    /// Numeric reading of each quantity, even when it failed the integer
    /// or sign checks; `None` only when missing or not a number.
    pub amounts: [Option<f64>; 7],
    pub errors: ValidationErrors,
}

/// Validates the whole form, returning the typed order or every message found.
pub fn validate(form: &OrderForm) -> Result<OrderRequest, ValidationErrors> {
    let CheckedFields {
        local,
        fecha,
        quantities,
        amounts,
        mut errors,
    } = check_fields(form);

    if let Some(message) = check_cross_fields(&amounts) {
        errors.insert(GENERAL_KEY, message);
    }

    match (local, fecha, collect_quantities(quantities)) {
        (Some(local), Some(fecha), Some(quantities)) if errors.is_empty() => Ok(OrderRequest {
            local,
            fecha,
            quantities,
        }),
        _ => Err(errors),
    }
}

pub fn check_fields(form: &OrderForm) -> CheckedFields {
    let mut errors = ValidationErrors::default();

    let local = record(&mut errors, LOCAL_FIELD, parse_location(form.get(LOCAL_FIELD)));
    let fecha = record(&mut errors, FECHA_FIELD, parse_date(form.get(FECHA_FIELD)));

    let mut quantities = [None; 7];
    let mut amounts = [None; 7];
    for ((slot, amount), field) in quantities.iter_mut().zip(amounts.iter_mut()).zip(QUANTITY_FIELDS) {
        let raw = form.get(field);
        *amount = parse_amount(raw);
        *slot = record(&mut errors, field, parse_quantity(raw));
    }

    CheckedFields {
        local,
        fecha,
        quantities,
        amounts,
        errors,
    }
}

/// Runs over every quantity that reads as a number, including negative or
/// fractional ones; skipped only when some quantity is missing or not numeric.
pub fn check_cross_fields(amounts: &[Option<f64>; 7]) -> Option<&'static str> {
    let all_numeric = amounts.iter().all(Option::is_some);
    let any_ordered = amounts.iter().flatten().any(|&amount| amount > 0.0);
    (all_numeric && !any_ordered).then_some(NO_PRODUCTS)
}

pub fn parse_amount(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
}

pub fn parse_location(raw: Option<&str>) -> Result<Location, &'static str> {
    match raw.map(str::trim) {
        None | Some("") => Err(MISSING_LOCATION),
        Some(value) => Location::from_wire(value).ok_or(INVALID_LOCATION),
    }
}

pub fn parse_date(raw: Option<&str>) -> Result<String, &'static str> {
    match raw.map(str::trim) {
        None | Some("") => Err(REQUIRED_FIELD),
        Some(value) if DATE_PATTERN.is_match(value) => Ok(value.to_string()),
        Some(_) => Err(INVALID_DATE),
    }
}

/// Accepts integral values written either as integers or as floats
/// (`"3"`, `"3.0"`); fractional values fail before the sign is checked.
pub fn parse_quantity(raw: Option<&str>) -> Result<u64, &'static str> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Err(REQUIRED_FIELD),
        Some(value) => value,
    };

    if let Ok(integer) = value.parse::<i64>() {
        return u64::try_from(integer).map_err(|_| NEGATIVE_QUANTITY);
    }

    match value.parse::<f64>() {
        Ok(number) if number.is_finite() && number.fract() == 0.0 => {
            if number < 0.0 {
                Err(NEGATIVE_QUANTITY)
            } else if number < u64::MAX as f64 {
                Ok(number as u64)
            } else {
                Err(NOT_AN_INTEGER)
            }
        }
        _ => Err(NOT_AN_INTEGER),
    }
}

fn record<T>(
    errors: &mut ValidationErrors,
    field: &str,
    outcome: Result<T, &'static str>,
) -> Option<T> {
    outcome.map_err(|message| errors.insert(field, message)).ok()
}

fn collect_quantities(quantities: [Option<u64>; 7]) -> Option<Quantities> {
    match quantities {
        [Some(a), Some(b), Some(c), Some(d), Some(e), Some(f), Some(g)] => {
            Some(Quantities::from_array([a, b, c, d, e, f, g]))
        }
        _ => None,
    }
}
