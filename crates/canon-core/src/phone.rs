//! Brazilian mobile number normalization and scoring.
//!
//! The canonical shape is `55` + two-digit area code + mobile marker `9` +
//! eight subscriber digits, e.g. `5511987654321`. Normalization never rejects
//! input; malformed numbers come out non-canonical and score lower, and the
//! score is what [`crate::identity`] uses to pick a winner.

/// Country calling code every normalized number starts with.
pub const COUNTRY_PREFIX: &str = "55";

const MOBILE_MARKER: char = '9';

/// Byte offset just past the country prefix and area code.
const AREA_END: usize = 4;

const CANONICAL_LEN: usize = 13;

/// Score of a canonical number whose digits are not all the same.
pub const MAX_SCORE: u8 = 3;

/// One normalized, scored phone number. Lives only for the duration of an
/// identity selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCandidate {
  pub raw_input:  String,
  pub normalized: String,
  pub score:      u8,
}

/// Normalize `raw` and score the result. An empty input scores `0` and
/// normalizes to the empty string.
pub fn normalize(raw: &str) -> PhoneCandidate {
  if raw.is_empty() {
    return PhoneCandidate {
      raw_input:  String::new(),
      normalized: String::new(),
      score:      0,
    };
  }

  let normalized = format_digits(raw);
  let score = score(&normalized);

  PhoneCandidate { raw_input: raw.to_owned(), normalized, score }
}

/// Whether `digits` is exactly `55` + area code + `9` + eight digits.
pub fn is_canonical(digits: &str) -> bool {
  digits.len() == CANONICAL_LEN
    && all_ascii_digits(digits)
    && digits.starts_with(COUNTRY_PREFIX)
    && digits.as_bytes()[AREA_END] == MOBILE_MARKER as u8
}

/// Whether the mobile marker appears twice after the area code
/// (`55` + area code + `99` + eight digits).
fn has_duplicate_nine(digits: &str) -> bool {
  digits.len() == CANONICAL_LEN + 1
    && all_ascii_digits(digits)
    && digits.starts_with(COUNTRY_PREFIX)
    && &digits.as_bytes()[AREA_END..AREA_END + 2] == b"99"
}

/// Placeholder numbers such as `5511111111111`: every digit after the
/// country prefix is identical.
fn is_repeated_digit(digits: &str) -> bool {
  let rest = digits.strip_prefix(COUNTRY_PREFIX).unwrap_or(digits);
  let mut chars = rest.chars();
  match chars.next() {
    Some(first) => chars.all(|c| c == first),
    None => false,
  }
}

fn all_ascii_digits(s: &str) -> bool { s.bytes().all(|b| b.is_ascii_digit()) }

fn format_digits(raw: &str) -> String {
  let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();

  if !digits.starts_with(COUNTRY_PREFIX) {
    digits.insert_str(0, COUNTRY_PREFIX);
  }

  if has_duplicate_nine(&digits) {
    digits.remove(AREA_END);
  }

  if !is_canonical(&digits) {
    if digits.len() >= AREA_END {
      digits.insert(AREA_END, MOBILE_MARKER);
    } else {
      digits.push(MOBILE_MARKER);
    }
  }

  digits
}

fn score(normalized: &str) -> u8 {
  let shape = if is_canonical(normalized) { 2 } else { 1 };
  let variety = if is_repeated_digit(normalized) { 0 } else { 1 };
  shape + variety
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_input_scores_zero() {
    let c = normalize("");
    assert_eq!(c.score, 0);
    assert_eq!(c.normalized, "");
  }

  #[test]
  fn formatted_local_number_gains_country_prefix() {
    let c = normalize("(11) 98765-4321");
    assert_eq!(c.normalized, "5511987654321");
    assert_eq!(c.score, MAX_SCORE);
    assert_eq!(c.raw_input, "(11) 98765-4321");
  }

  #[test]
  fn international_format_is_stripped_to_digits() {
    assert_eq!(normalize("+55 11 98765-4321").normalized, "5511987654321");
  }

  #[test]
  fn missing_mobile_marker_is_inserted() {
    let c = normalize("1187654321");
    assert_eq!(c.normalized, "5511987654321");
    assert_eq!(c.score, MAX_SCORE);
  }

  #[test]
  fn duplicated_nine_collapses() {
    for raw in ["55119987654321", "5521991234567", "11998765432 1"] {
      let c = normalize(raw);
      assert!(is_canonical(&c.normalized), "{raw} -> {}", c.normalized);
    }
    assert_eq!(normalize("55119987654321").normalized, "5511987654321");
  }

  #[test]
  fn short_input_gets_trailing_marker() {
    let c = normalize("5");
    assert_eq!(c.normalized, "5559");
    assert!(!is_canonical(&c.normalized));
    assert!(c.score >= 1);

    // Fewer than four digits even after the prefix: marker goes at the end.
    assert_eq!(normalize("55").normalized, "559");
    assert_eq!(normalize("abc").normalized, "559");
  }

  #[test]
  fn inputs_not_starting_with_prefix_always_gain_it() {
    for raw in ["1234", "0000", "11987654321", "219999", "987654321000"] {
      assert!(normalize(raw).normalized.starts_with(COUNTRY_PREFIX), "{raw}");
    }
  }

  #[test]
  fn canonical_numbers_are_fixed_points() {
    for raw in ["5511987654321", "5521912345678", "5599999999999"] {
      let once = normalize(raw);
      let twice = normalize(&once.normalized);
      assert_eq!(once.normalized, raw);
      assert_eq!(twice.normalized, once.normalized);
      assert_eq!(twice.score, once.score);
    }
  }

  #[test]
  fn repeated_digits_lose_the_variety_point() {
    let placeholder = normalize("5599999999999");
    assert!(is_canonical(&placeholder.normalized));
    assert_eq!(placeholder.score, 2);
  }

  #[test]
  fn canonical_number_outscores_malformed_and_placeholder() {
    let good = normalize("11987654321");
    for worse in ["123", "1198765", "5599999999999", "9", "551234567890123"] {
      assert!(good.score > normalize(worse).score, "{worse}");
    }
  }

  #[test]
  fn overlong_input_is_not_canonical() {
    let c = normalize("551198765432199");
    assert!(!is_canonical(&c.normalized));
    assert_eq!(c.score, 2);
  }
}
