//! Pulls the two catalog facts out of a search results page.
//!
//! Only the first result item is trusted, and only when the catalog
//! highlighted the searched keyword inside it.

use once_cell::sync::Lazy;
use regex::Regex;

use super::country::country_name;
use super::source::ScrapeError;

static FIRST_RESULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<ul[^>]*class="[^"]*\bbb_d7dbe4\b[^"]*"[^>]*>\s*<li[^>]*>(.*?)</li>"#)
        .expect("first result pattern")
});

static HIGHLIGHT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span[^>]*class="[^"]*\bsearchKeyword\b[^"]*""#).expect("highlight pattern")
});

static LABEL_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="[^"]*\bsearchLabel_blue\b[^"]*"[^>]*>.*?class="[^"]*\blabelNum\b[^"]*"[^>]*>([^<]*)<"#)
        .expect("label number pattern")
});

static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div[^>]*class="[^"]*\bsearchListImgTit\b[^"]*"[^>]*>(.*?)</div>"#)
        .expect("title pattern")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

static COUNTRY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([A-Z]{2})\)").expect("country code pattern"));

fn highlighted_first_result(html: &str) -> Result<&str, ScrapeError> {
    let item = FIRST_RESULT
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ScrapeError::Inconclusive("no search results".to_string()))?;
    if !HIGHLIGHT.is_match(item) {
        return Err(ScrapeError::Inconclusive(
            "first result does not highlight the searched model".to_string(),
        ));
    }
    Ok(item)
}

/// Label numbers look like `<prefix>-<code>`; the code is the second half.
pub fn classification_code(html: &str) -> Result<String, ScrapeError> {
    let item = highlighted_first_result(html)?;
    let label = LABEL_NUMBER
        .captures(item)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or(ScrapeError::Inconclusive("no classification label".to_string()))?;

    let parts: Vec<&str> = label.split('-').collect();
    match parts.as_slice() {
        [_, code] if !code.trim().is_empty() => Ok(code.trim().to_string()),
        _ => Err(ScrapeError::Inconclusive(format!(
            "unexpected label format: {}",
            label
        ))),
    }
}

pub fn country_of_origin(html: &str) -> Result<String, ScrapeError> {
    let item = highlighted_first_result(html)?;
    let title = TITLE
        .captures(item)
        .and_then(|caps| caps.get(1))
        .map(|m| TAG.replace_all(m.as_str(), " ").into_owned())
        .ok_or(ScrapeError::Inconclusive("no result title".to_string()))?;

    let code = COUNTRY_CODE
        .captures(&title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::Inconclusive(format!("no country code in title: {}", title.trim())))?;

    country_name(&code)
        .map(str::to_string)
        .ok_or(ScrapeError::Inconclusive(format!("unknown country code: {}", code)))
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub fn results_page(highlight: bool, label: &str, title: &str) -> String {
        let keyword = if highlight {
            r#"<span class="searchKeyword">AX40R3080WMD</span>"#
        } else {
            "AX40R3080WMD"
        };
        format!(
            r#"<html><body>
<ul class="list bb_d7dbe4">
  <li class="item">
    <div class="searchListImgTit"><a href="/d">Air purifier {keyword} {title}</a></div>
    <div class="searchLabel_blue"><span class="labelTit">G2B</span><span class="labelNum">{label}</span></div>
  </li>
  <li class="item"><div class="searchListImgTit">Other (CN)</div></li>
</ul>
</body></html>"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::results_page;
    use super::*;

    #[test]
    fn extracts_classification_code() {
        let html = results_page(true, " 4511190101-23642147 ", "(TH)");
        assert_eq!(classification_code(&html).unwrap(), "23642147");
    }

    #[test]
    fn extracts_country_from_title() {
        let html = results_page(true, "4511190101-23642147", "Samsung (TH)");
        assert_eq!(country_of_origin(&html).unwrap(), "Thailand");
    }

    #[test]
    fn unhighlighted_result_is_inconclusive() {
        let html = results_page(false, "4511190101-23642147", "(TH)");
        assert!(matches!(classification_code(&html), Err(ScrapeError::Inconclusive(_))));
        assert!(matches!(country_of_origin(&html), Err(ScrapeError::Inconclusive(_))));
    }

    #[test]
    fn label_needs_exactly_two_parts() {
        let html = results_page(true, "45-11-23642147", "(TH)");
        assert!(classification_code(&html).is_err());
    }

    #[test]
    fn unknown_or_missing_country_is_inconclusive() {
        assert!(country_of_origin(&results_page(true, "1-2", "(XQ)")).is_err());
        assert!(country_of_origin(&results_page(true, "1-2", "no code")).is_err());
    }

    #[test]
    fn empty_page_has_no_results() {
        assert!(classification_code("<html></html>").is_err());
    }
}
