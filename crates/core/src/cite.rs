use once_cell::sync::Lazy;
use regex::Regex;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    // Trailing sentence punctuation is excluded so "see https://x.y/z." keeps
    // the period out of the captured link.
    Regex::new(r#"https?://[^\s<>"')\]]+[^\s<>"')\].,;:!?]"#).expect("url regex")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Citation {
    /// 1-based marker number as rendered in the rewritten text.
    pub index: usize,
    pub url: String,
}

/// Rewrite embedded URLs in an assistant reply as numbered `[Source n]`
/// markers, returning the rewritten text and the extracted links in order of
/// appearance. Replies without URLs come back unchanged.
pub fn linkify(text: &str) -> (String, Vec<Citation>) {
    let mut citations: Vec<Citation> = Vec::new();
    let rewritten = URL_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let url = caps[0].to_string();
            let index = citations.len() + 1;
            citations.push(Citation { index, url });
            format!("[Source {}]", index)
        })
        .into_owned();
    (rewritten, citations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_url_becomes_a_source_marker() {
        let (text, cites) = linkify("Backed by https://example.com/study in trials.");
        assert_eq!(text, "Backed by [Source 1] in trials.");
        assert_eq!(cites.len(), 1);
        assert_eq!(cites[0].url, "https://example.com/study");
        assert_eq!(cites[0].index, 1);
    }

    #[test]
    fn multiple_urls_number_in_order_of_appearance() {
        let (text, cites) =
            linkify("See https://a.example/one and http://b.example/two?x=1 for details.");
        assert_eq!(text, "See [Source 1] and [Source 2] for details.");
        assert_eq!(cites[0].url, "https://a.example/one");
        assert_eq!(cites[1].url, "http://b.example/two?x=1");
    }

    #[test]
    fn trailing_punctuation_stays_out_of_the_link() {
        let (text, cites) = linkify("Read https://example.com/study.");
        assert_eq!(text, "Read [Source 1].");
        assert_eq!(cites[0].url, "https://example.com/study");
    }

    #[test]
    fn text_without_urls_is_unchanged() {
        let (text, cites) = linkify("AM: cleanser, serum. PM: retinol.");
        assert_eq!(text, "AM: cleanser, serum. PM: retinol.");
        assert!(cites.is_empty());
    }
}
