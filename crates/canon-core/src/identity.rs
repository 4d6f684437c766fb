//! Choosing one canonical phone number out of a fragment's phone fields.

use serde_json::Value;

use crate::{
  Error, Result,
  fragment::kind_of,
  phone::{self, PhoneCandidate},
};

/// Normalize one raw phone field.
///
/// Returns `Ok(None)` for empty values (`null`, `""`, `0`, `false`), which
/// are skipped without comment. Strings and non-negative integers are
/// normalized; any other JSON value is a [`Error::PhoneNormalization`].
pub fn normalize_field(field: &'static str, raw: &Value) -> Result<Option<PhoneCandidate>> {
  if is_empty(raw) {
    return Ok(None);
  }
  let text = match raw {
    Value::String(s) => s.clone(),
    Value::Number(n) => n
      .as_u64()
      .ok_or_else(|| Error::PhoneNormalization {
        field,
        reason: format!("expected a whole number, found {n}"),
      })?
      .to_string(),
    other => {
      return Err(Error::PhoneNormalization {
        field,
        reason: format!("expected a string or number, found {}", kind_of(other)),
      });
    }
  };
  Ok(Some(phone::normalize(&text)))
}

/// Pick the best-scoring candidate among `fields`.
///
/// Faulty fields are logged and skipped. Ties go to the field seen first.
/// `None` means the fragment has no usable identity.
pub fn select_identity<'a, I>(fields: I) -> Option<PhoneCandidate>
where
  I: IntoIterator<Item = (&'static str, Option<&'a Value>)>,
{
  let mut best: Option<PhoneCandidate> = None;

  for (field, raw) in fields {
    let Some(raw) = raw else { continue };
    let candidate = match normalize_field(field, raw) {
      Ok(Some(c)) => c,
      Ok(None) => continue,
      Err(e) => {
        tracing::warn!(error = %e, "skipping phone field");
        continue;
      }
    };
    tracing::debug!(
      field,
      normalized = %candidate.normalized,
      score = candidate.score,
      "scored phone candidate"
    );
    if best.as_ref().is_none_or(|b| candidate.score > b.score) {
      best = Some(candidate);
    }
  }

  best
}

fn is_empty(raw: &Value) -> bool {
  match raw {
    Value::Null => true,
    Value::Bool(b) => !b,
    Value::String(s) => s.is_empty(),
    Value::Number(n) => n.as_f64() == Some(0.0),
    Value::Array(a) => a.is_empty(),
    Value::Object(o) => o.is_empty(),
  }
}
