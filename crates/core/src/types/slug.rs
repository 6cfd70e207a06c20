//! URL slug generation.
//!
//! Product and category slugs are derived from titles when not supplied
//! explicitly, so "Canne à pêche 3m" becomes "canne-a-peche-3m".

/// Turn an arbitrary title into a URL-safe slug.
///
/// ASCII letters and digits are lowercased and kept; accented Latin
/// characters are folded to their ASCII base; every other run of
/// characters collapses into a single hyphen. Leading and trailing
/// hyphens are stripped.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in title.chars() {
        let folded = fold_char(c);
        match folded {
            Some(c) => {
                slug.push(c);
                last_was_hyphen = false;
            }
            None => {
                if !last_was_hyphen {
                    slug.push('-');
                    last_was_hyphen = true;
                }
            }
        }
    }

    if slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Map a character to its slug form, or `None` if it acts as a separator.
fn fold_char(c: char) -> Option<char> {
    if c.is_ascii_alphanumeric() {
        return Some(c.to_ascii_lowercase());
    }

    // Latin-1 accent folding covers the catalog data we actually see.
    let folded = match c {
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' | 'À' | 'Á' | 'Â' | 'Ä' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'ö' | 'õ' | 'Ô' | 'Ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ÿ' => 'y',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Spinning Reel 4000"), "spinning-reel-4000");
    }

    #[test]
    fn test_accents_folded() {
        assert_eq!(slugify("Canne à pêche 3m"), "canne-a-peche-3m");
        assert_eq!(slugify("Épuisette télescopique"), "epuisette-telescopique");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("Hooks -- size #6 (pack)"), "hooks-size-6-pack");
    }

    #[test]
    fn test_edges_trimmed() {
        assert_eq!(slugify("  Braided line  "), "braided-line");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
    }
}
