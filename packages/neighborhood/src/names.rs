//! Neighborhood name normalization.
//!
//! Every source spells neighborhood names its own way: with or without
//! accents, mixed case, stray whitespace. All grouping keys go through
//! [`normalize_name`] so that "Jardim Botânico" and "JARDIM  BOTANICO"
//! join to the same neighborhood.

/// Normalizes a neighborhood name into its grouping key.
///
/// Strips diacritics, upper-cases, collapses internal whitespace runs to a
/// single space, and trims. Idempotent.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars() {
        fold_char(c, &mut folded);
    }

    folded
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a name that may be missing.
///
/// Returns `None` for blank values and for the literal placeholders some
/// exports write for missing cells ("nan", "None").
#[must_use]
pub fn normalize_key(raw: &str) -> Option<String> {
    let name = normalize_name(raw);
    match name.as_str() {
        "" | "NAN" | "NONE" | "NULL" => None,
        _ => Some(name),
    }
}

/// Pushes the accent-free form of `c` onto `out`.
///
/// Covers the Latin-1 letters with grave, acute, circumflex, tilde,
/// diaeresis and ring, plus `ç`, `ñ`, `ø`, the ordinals `ª` `º`, the
/// ligatures `æ` `œ`, `ß`, and combining marks U+0300..U+036F. Anything
/// else, such as `ł` or `ő`, passes through unchanged.
fn fold_char(c: char, out: &mut String) {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'ª' => out.push('A'),
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
        'Ç' => out.push('C'),
        'ç' => out.push('c'),
        'È' | 'É' | 'Ê' | 'Ë' => out.push('E'),
        'è' | 'é' | 'ê' | 'ë' => out.push('e'),
        'Ì' | 'Í' | 'Î' | 'Ï' => out.push('I'),
        'ì' | 'í' | 'î' | 'ï' => out.push('i'),
        'Ñ' => out.push('N'),
        'ñ' => out.push('n'),
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'º' => out.push('O'),
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => out.push('o'),
        'Ù' | 'Ú' | 'Û' | 'Ü' => out.push('U'),
        'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
        'Ý' | 'ý' | 'ÿ' => out.push('Y'),
        'Æ' | 'æ' => out.push_str("AE"),
        'Œ' | 'œ' => out.push_str("OE"),
        'ß' => out.push_str("SS"),
        // Combining diacritical marks (decomposed input).
        '\u{0300}'..='\u{036F}' => {}
        _ => out.push(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_uppercases() {
        assert_eq!(normalize_name("Jardim Botânico"), "JARDIM BOTANICO");
        assert_eq!(normalize_name("São João"), "SAO JOAO");
        assert_eq!(normalize_name("Conceição"), "CONCEICAO");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_name("  Vila   Nova\t "), "VILA NOVA");
    }

    #[test]
    fn handles_decomposed_accents() {
        assert_eq!(normalize_name("Sa\u{0303}o"), "SAO");
    }

    #[test]
    fn folds_every_covered_letter() {
        assert_eq!(normalize_name("ÀÁÂÃÄÅª àáâãäå"), "AAAAAAA AAAAAA");
        assert_eq!(normalize_name("ÈÉÊË èéêë ÌÍÎÏ ìíîï"), "EEEE EEEE IIII IIII");
        assert_eq!(normalize_name("ÒÓÔÕÖØº òóôõöø"), "OOOOOOO OOOOOO");
        assert_eq!(normalize_name("ÙÚÛÜ ùúûü Ýýÿ"), "UUUU UUUU YYY");
        assert_eq!(normalize_name("Çç Ññ"), "CC NN");
        assert_eq!(normalize_name("Æsir Œuvre Straße"), "AESIR OEUVRE STRASSE");
    }

    #[test]
    fn uncovered_letters_pass_through() {
        assert_eq!(normalize_name("Łódź"), "ŁODŹ");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["Água Verde", "  rebouças ", "CIC", "Bairro Alto"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn missing_placeholders_are_none() {
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key("   "), None);
        assert_eq!(normalize_key("nan"), None);
        assert_eq!(normalize_key("None"), None);
        assert_eq!(normalize_key("Batel"), Some("BATEL".to_string()));
    }
}
