//! LaTeX validation.

use pulldown_latex::{Parser, Storage};

/// Parse `latex` and report the first error, if any.
///
/// Used to decide whether a math-aware parse of pasted text can be trusted.
/// The renderer performs its own parse when producing `MathML`.
pub fn check_latex(latex: &str) -> Result<(), String> {
    if latex.trim().is_empty() {
        return Err("empty expression".to_owned());
    }
    let storage = Storage::new();
    let errors: Vec<String> = Parser::new(latex, &storage)
        .filter_map(|event| event.err().map(|err| err.to_string()))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_latex() {
        assert_eq!(check_latex(r"\frac{a}{b}"), Ok(()));
        assert_eq!(check_latex(r"\sum_{i=0}^{n} x_i"), Ok(()));
    }

    #[test]
    fn test_unclosed_group() {
        assert!(check_latex(r"\frac{a").is_err());
    }

    #[test]
    fn test_blank_is_error() {
        assert!(check_latex("  ").is_err());
    }
}
