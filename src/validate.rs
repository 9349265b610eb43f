//! Input validation and sanitization for wizard form fields.
//!
//! Free text (topics, rubric/criterion/level names, descriptions,
//! descriptors) is restricted to letters -- including Spanish accented
//! letters -- spaces, and a fixed punctuation set. Digits are rejected
//! everywhere except the numeric patterns (course code, semester).

use once_cell::sync::Lazy;
use regex::Regex;

// Shared character class for description-like text. Keep the sanitizer's
// strip class and the validator's accept class in lockstep.
const TEXT_CLASS: &str = r"A-Za-zÁÉÍÓÚÜÑáéíóúüñ .,;:¿?¡!()\-";

static TEXT_OK: Lazy<Regex> =
  Lazy::new(|| Regex::new(&format!("^[{TEXT_CLASS}]+$")).unwrap());
static TEXT_STRIP: Lazy<Regex> =
  Lazy::new(|| Regex::new(&format!("[^{TEXT_CLASS}]")).unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(" {2,}").unwrap());

static COURSE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4,5}$").unwrap());
static SEMESTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-[12]$").unwrap());
// Person name: words of letters separated by single spaces.
static PERSON_NAME: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[A-Za-zÁÉÍÓÚÜÑáéíóúüñ]+(?: [A-Za-zÁÉÍÓÚÜÑáéíóúüñ]+)*$").unwrap()
});

/// Strip disallowed characters, collapse runs of spaces, and trim.
/// Idempotent: sanitizing an already-sanitized string is a no-op.
pub fn sanitize(input: &str) -> String {
  let stripped = TEXT_STRIP.replace_all(input, "");
  let collapsed = MULTI_SPACE.replace_all(&stripped, " ");
  collapsed.trim().to_string()
}

/// Sanitize while the user is mid-word: keeps a single trailing space so the
/// cursor isn't fought on every keystroke. Use [`sanitize`] on commit.
pub fn sanitize_typing(input: &str) -> String {
  let had_tail = input.ends_with(' ');
  let s = sanitize(input);
  if had_tail && !s.is_empty() {
    format!("{s} ")
  } else {
    s
  }
}

/// Description-like text: non-empty after trimming, and only letters, spaces
/// and basic punctuation. `"Tema 1"` fails (digit), `"Tema uno: intro"` passes.
pub fn is_valid_description_text(value: &str) -> bool {
  let t = value.trim();
  !t.is_empty() && TEXT_OK.is_match(t)
}

/// Course code: 4 or 5 digits, nothing else.
pub fn is_valid_course_code(value: &str) -> bool {
  COURSE_CODE.is_match(value.trim())
}

/// Semester label: `YYYY-1` or `YYYY-2`.
pub fn is_valid_semester(value: &str) -> bool {
  SEMESTER.is_match(value.trim())
}

/// Person name: letter words separated by single spaces, no digits/symbols.
pub fn is_valid_person_name(value: &str) -> bool {
  PERSON_NAME.is_match(value.trim())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitize_strips_digits_and_symbols() {
    assert_eq!(sanitize("Tema 1: <b>intro</b>"), "Tema : bintrob");
    assert_eq!(sanitize("  Métodos   de    análisis  "), "Métodos de análisis");
    assert_eq!(sanitize("100% seguro"), "seguro");
  }

  #[test]
  fn sanitize_is_idempotent() {
    let samples = [
      "Tema uno: introducción",
      "  muchos    espacios   ",
      "dígitos 123 y símbolos @#$",
      "¿Qué opinas? ¡Bien!",
      "",
      "   ",
      "a-b (c); d, e.",
    ];
    for s in samples {
      let once = sanitize(s);
      assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
    }
  }

  #[test]
  fn sanitize_typing_keeps_one_trailing_space() {
    assert_eq!(sanitize_typing("Tema uno "), "Tema uno ");
    assert_eq!(sanitize_typing("Tema uno   "), "Tema uno ");
    assert_eq!(sanitize_typing("Tema uno"), "Tema uno");
    // Nothing left after stripping: no lone space either.
    assert_eq!(sanitize_typing("123 "), "");
  }

  #[test]
  fn description_text_rejects_digits_and_odd_symbols() {
    assert!(!is_valid_description_text("Tema 1"));
    assert!(!is_valid_description_text("hola_mundo"));
    assert!(!is_valid_description_text("precio $20"));
    assert!(!is_valid_description_text(""));
    assert!(!is_valid_description_text("   "));
  }

  #[test]
  fn description_text_accepts_accents_and_basic_punctuation() {
    assert!(is_valid_description_text("Tema uno: introducción"));
    assert!(is_valid_description_text("¿Qué es la evaluación? ¡Veamos!"));
    assert!(is_valid_description_text("Análisis (parte uno) - resumen; cierre."));
  }

  #[test]
  fn course_code_is_four_or_five_digits() {
    assert!(is_valid_course_code("1234"));
    assert!(is_valid_course_code("10482"));
    assert!(!is_valid_course_code("123"));
    assert!(!is_valid_course_code("123456"));
    assert!(!is_valid_course_code("CA-301"));
    assert!(!is_valid_course_code(""));
  }

  #[test]
  fn semester_matches_year_dash_term() {
    assert!(is_valid_semester("2025-1"));
    assert!(is_valid_semester("2024-2"));
    assert!(!is_valid_semester("2025-3"));
    assert!(!is_valid_semester("2025"));
    assert!(!is_valid_semester("25-1"));
  }

  #[test]
  fn person_name_allows_compound_names() {
    assert!(is_valid_person_name("Juan Perez"));
    assert!(is_valid_person_name("María de los Ángeles"));
    assert!(!is_valid_person_name("Juan  Perez"));
    assert!(!is_valid_person_name("Juan P3rez"));
    assert!(!is_valid_person_name(""));
  }
}
