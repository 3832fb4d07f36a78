//! Descriptor structure: ordered field checks and normalization.
//!
//! [`validate_structure`] is the only way to obtain a [`NormalizedDescriptor`],
//! so later stages (hash verification, sandboxed linting) can rely on the
//! required fields being present, well-shaped and lower-cased.
//!
//! # Check order (first failure wins)
//!
//! 1. `provider` present
//! 2. `metadata` present
//! 3. `filehash` is a 128-unit string
//! 4. `standard` equals 1
//! 5. `metahash` is a 128-unit string
//! 6. `provider` passes the [`AddressValidator`]

pub mod address;

use serde_json::{Map, Value};

use crate::proof::digest::DIGEST_HEX_LEN;
use crate::reject::{Field, Rejection};
use address::{AddressValidator, HEX_ADDRESS_LEN};

/// The only accepted value of the `standard` field.
pub const SUPPORTED_STANDARD: f64 = 1.0;

/// A descriptor that passed the structural checks and has been normalized.
///
/// Extra keys supplied by the producer are preserved unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDescriptor {
    doc: Value,
}

impl NormalizedDescriptor {
    /// The whole document (always a JSON object).
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    #[must_use]
    pub fn metadata(&self) -> &Value {
        &self.doc[Field::Metadata.key()]
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        self.str_field(Field::Provider)
    }

    #[must_use]
    pub fn filehash(&self) -> &str {
        self.str_field(Field::Filehash)
    }

    #[must_use]
    pub fn metahash(&self) -> &str {
        self.str_field(Field::Metahash)
    }

    fn str_field(&self, field: Field) -> &str {
        self.doc[field.key()].as_str().unwrap_or_default()
    }
}

/// Run the ordered structural checks, then normalize in place.
///
/// A non-object input is malformed and fails as an internal failure, the
/// same class a transport-level parse error would produce.
///
/// # Errors
///
/// Returns the [`Rejection`] for the first violated rule.
pub fn validate_structure(
    value: Value,
    addresses: &dyn AddressValidator,
) -> Result<NormalizedDescriptor, Rejection> {
    let Value::Object(mut doc) = value else {
        return Err(Rejection::internal_failure());
    };

    if !is_present(doc.get(Field::Provider.key())) {
        return Err(Rejection::missing_field(Field::Provider));
    }
    if !is_present(doc.get(Field::Metadata.key())) {
        return Err(Rejection::missing_field(Field::Metadata));
    }
    check_hash_length(&doc, Field::Filehash)?;
    if doc.get(Field::Standard.key()).and_then(Value::as_f64) != Some(SUPPORTED_STANDARD) {
        return Err(Rejection::invalid_version());
    }
    check_hash_length(&doc, Field::Metahash)?;
    let provider = doc
        .get(Field::Provider.key())
        .and_then(Value::as_str)
        .filter(|p| addresses.is_valid(p))
        .ok_or_else(Rejection::invalid_address)?;

    let provider = normalize_provider(provider);
    doc.insert(Field::Provider.key().to_string(), Value::String(provider));
    lowercase_field(&mut doc, Field::Filehash);
    lowercase_field(&mut doc, Field::Metahash);

    Ok(NormalizedDescriptor {
        doc: Value::Object(doc),
    })
}

/// Lower-case the address, force a leading `Q`, cap at the address length.
#[must_use]
pub fn normalize_provider(provider: &str) -> String {
    let lower = provider.to_lowercase();
    let mut out = String::with_capacity(HEX_ADDRESS_LEN);
    out.push('Q');
    out.extend(lower.chars().skip(1).take(HEX_ADDRESS_LEN - 1));
    out
}

/// Presence follows the producer-side truthiness test: absent, `null`,
/// `false`, `0` and `""` all count as missing.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Bool(true) | Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Absent and non-string values fail the same way as a wrong length.
fn check_hash_length(doc: &Map<String, Value>, field: Field) -> Result<(), Rejection> {
    match doc.get(field.key()).and_then(Value::as_str) {
        Some(s) if utf16_len(s) == DIGEST_HEX_LEN => Ok(()),
        _ => Err(Rejection::invalid_length(field)),
    }
}

fn lowercase_field(doc: &mut Map<String, Value>, field: Field) {
    if let Some(Value::String(s)) = doc.get_mut(field.key()) {
        *s = s.to_lowercase();
    }
}

/// String length in UTF-16 code units, as a JavaScript producer measures it.
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}
