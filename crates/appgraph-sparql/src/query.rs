//! The fixed application-facts query.

/// Label locale used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Wikidata SELECT over every instance of a (transitive) subclass of
/// `wd:Q7397` (software) that has a developer (P178), operating system
/// (P306), license (P275), copyright status (P6216) and programming language
/// (P277). Labels are resolved in `language` by the label service.
pub fn software_query(language: &str) -> String {
    let language = sanitize_language_tag(language);
    format!(
        r#"SELECT DISTINCT ?AppLabel ?DeveloperLabel ?OSLabel ?LanguageLabel ?LicenseLabel ?CopyrightStatusLabel
WHERE {{
   wd:Q7397 ^wdt:P279* / ^wdt:P31 ?App .
   ?App wdt:P178 ?Developer.
   ?App wdt:P306 ?OS.
   ?App wdt:P275 ?License.
   ?App wdt:P6216 ?CopyrightStatus.
   ?App wdt:P277 ?Language.
   SERVICE wikibase:label {{
     bd:serviceParam wikibase:language "{language}" .
   }}
}}
"#
    )
}

/// Keep only characters valid in a BCP 47 tag so the locale cannot escape
/// the string literal it is spliced into.
fn sanitize_language_tag(tag: &str) -> String {
    let tag: String = tag
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if tag.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RESULT_VARIABLES;

    #[test]
    fn selects_every_result_variable() {
        let q = software_query(DEFAULT_LANGUAGE);
        for var in RESULT_VARIABLES {
            assert!(q.contains(&format!("?{var}")), "missing ?{var}");
        }
        assert!(!q.contains("OPTIONAL"));
        assert!(q.contains(r#"wikibase:language "en""#));
    }

    #[test]
    fn language_tag_is_sanitized() {
        let q = software_query(r#"de" . } ?x ?y ?z {"#);
        assert!(q.contains(r#"wikibase:language "dexyz""#));
        assert!(software_query("  ").contains(r#"wikibase:language "en""#));
        assert!(software_query("pt-BR").contains(r#"wikibase:language "pt-BR""#));
    }
}
