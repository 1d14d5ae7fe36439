//! Bundle destination naming
//!
//! Bundle archives land in the working folder under a name derived from the
//! publication title. Slugs are ASCII-only so the names survive every
//! filesystem and URL context the archives pass through.

use unicode_normalization::UnicodeNormalization;

/// Maximum slug length before word-boundary truncation
const SLUG_MAX_LENGTH: usize = 20;

/// Build the destination filename for a publication's bundle
///
/// The name is `<slug>_pub<id>.zip`. Titles that produce an empty slug fall
/// back to `dataset`.
///
/// # Example
///
/// ```
/// use canopy::core::bundle::bundle_filename;
///
/// assert_eq!(
///     bundle_filename("Östra Göinge, Sweden by X - part of deadtrees.earth", 36),
///     "ostra-goinge-sweden_pub36.zip"
/// );
/// ```
pub fn bundle_filename(title: &str, publication_id: i64) -> String {
    let slug = slugify(title, SLUG_MAX_LENGTH);
    let slug = if slug.is_empty() {
        "dataset".to_string()
    } else {
        slug
    };

    format!("{slug}_pub{publication_id}.zip")
}

/// Turn a title into a lowercase ASCII slug
///
/// Characters are NFKD-decomposed and only their ASCII-alphanumeric pieces
/// survive, so accented letters reduce to their base letter. Runs of
/// everything else collapse into a single hyphen. Slugs longer than
/// `max_length` are cut at the last word boundary inside the limit.
pub fn slugify(text: &str, max_length: usize) -> String {
    let mut slug = String::new();
    let mut pending_separator = false;

    for ch in text.chars() {
        let letters: String = ch
            .nfkd()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if letters.is_empty() {
            pending_separator = true;
        } else {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push_str(&letters);
        }
    }

    if slug.len() > max_length {
        // Slug is pure ASCII at this point, so byte slicing is safe
        let cut = &slug[..max_length];
        slug = match cut.rfind('-') {
            Some(pos) if pos > 0 => cut[..pos].to_string(),
            _ => cut.to_string(),
        };
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Östra Göinge, Sweden by X - part of deadtrees.earth", "ostra-goinge-sweden" ; "accented title truncates at word boundary")]
    #[test_case("Amazonas flight 2024", "amazonas-flight-2024" ; "plain title")]
    #[test_case("  spaced   out  ", "spaced-out" ; "whitespace runs collapse")]
    #[test_case("UPPER case Title", "upper-case-title" ; "lowercased")]
    #[test_case("çà-et-là", "ca-et-la" ; "diacritics reduce to base letters")]
    #[test_case("!!!", "" ; "no alphanumerics yields empty slug")]
    #[test_case("abcdefghijklmnopqrstuvwxyz", "abcdefghijklmnopqrst" ; "single long word cut hard at limit")]
    fn test_slugify(input: &str, expected: &str) {
        assert_eq!(slugify(input, 20), expected);
    }

    #[test]
    fn test_bundle_filename() {
        assert_eq!(
            bundle_filename("Amazonas flight 2024", 7),
            "amazonas-flight-2024_pub7.zip"
        );
    }

    #[test]
    fn test_bundle_filename_falls_back_for_empty_slug() {
        assert_eq!(bundle_filename("???", 12), "dataset_pub12.zip");
        assert_eq!(bundle_filename("", 12), "dataset_pub12.zip");
    }
}
