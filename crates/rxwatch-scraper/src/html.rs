//! Small HTML/text helpers shared by the extraction pipeline.

use scraper::{ElementRef, Selector};

/// Collapses all whitespace runs to single spaces and trims. Returns `None`
/// for empty/whitespace-only input so "nothing there" stays distinguishable
/// from an empty string.
#[must_use]
pub fn clean_text(s: &str) -> Option<String> {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// All text beneath an element, space-joined and whitespace-collapsed.
/// Multi-paragraph cells come out as one line.
#[must_use]
pub fn element_text(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    clean_text(&joined).unwrap_or_default()
}

/// Text of the first element matching `selector` under `root`, cleaned.
/// A selector that matches nothing is a parse-miss, not an error.
#[must_use]
pub fn select_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(element_text).and_then(|t| {
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    })
}

/// Resolves `href` against `base`. Absolute hrefs pass through; anything
/// unresolvable yields `None`.
#[must_use]
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = reqwest::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Parses a CSS selector that is known valid at compile time.
///
/// # Panics
///
/// Panics if the literal is not a valid selector; only used with fixed
/// selector strings.
#[must_use]
pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid css selector literal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn clean_text_collapses_runs_and_rejects_empty() {
        assert_eq!(clean_text("  a \n\t b  ").as_deref(), Some("a b"));
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text(""), None);
    }

    #[test]
    fn element_text_joins_nested_paragraphs() {
        // A bare <td> fragment loses its tag; cells need table context.
        let html = Html::parse_fragment(
            "<table><tr><td><p>Darzalex (Daratumumab)</p><p>1800mg/15 ml vial for SC Injection</p></td></tr></table>",
        );
        let td = html
            .select(&selector("td"))
            .next()
            .expect("td in fragment");
        assert_eq!(
            element_text(td),
            "Darzalex (Daratumumab) 1800mg/15 ml vial for SC Injection"
        );
    }

    #[test]
    fn select_text_misses_are_none() {
        let html = Html::parse_fragment("<div><p>body</p></div>");
        let root = html.root_element();
        assert_eq!(select_text(root, &selector("h1")), None);
        assert_eq!(select_text(root, &selector("p")).as_deref(), Some("body"));
    }

    #[test]
    fn absolutize_joins_relative_and_keeps_absolute() {
        // "../" climbs one segment from the base's directory.
        assert_eq!(
            absolutize("https://nafdac.gov.ng/category/recalls/", "../alert/31/").as_deref(),
            Some("https://nafdac.gov.ng/category/alert/31/")
        );
        assert_eq!(
            absolutize("https://nafdac.gov.ng/", "https://other.example/x").as_deref(),
            Some("https://other.example/x")
        );
        assert_eq!(absolutize("not a url", "x"), None);
    }
}
