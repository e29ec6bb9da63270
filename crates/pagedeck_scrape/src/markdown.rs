//! Markdown to plain prose.

use regex::Regex;
use std::sync::LazyLock;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("Valid markdown cleanup regex"),
            replacement,
        }
    }
}

// Applied in order; whitespace normalization comes last.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // image embeds
        Rule::new(r"!\[.*?\]\(.*?\)", ""),
        // links keep their text
        Rule::new(r"\[([^\]]+)\]\(.*?\)", "$1"),
        Rule::new(r"https?://\S+", ""),
        Rule::new(r"(?m)^#+\s+", ""),
        Rule::new(r"\*\*(.*?)\*\*", "$1"),
        Rule::new(r"__(.*?)__", "$1"),
        Rule::new(r"\*(.*?)\*", "$1"),
        Rule::new(r"_(.*?)_", "$1"),
        Rule::new(r"`{1,3}(.*?)`{1,3}", "$1"),
        // table rows
        Rule::new(r"\|.*\|", ""),
        // list bullets
        Rule::new(r"(?m)^[ \t]*[-*+][ \t]+", ""),
        // horizontal rules
        Rule::new(r"(?m)^-{3,}|_{3,}|\*{3,}", ""),
        Rule::new(r"[ \t]+", " "),
        Rule::new(r"(?m)[ \t]+$", ""),
        Rule::new(r"\n{3,}", "\n\n"),
    ]
});

fn clean_once(input: &str) -> String {
    let mut text = input.to_string();
    for rule in RULES.iter() {
        if let std::borrow::Cow::Owned(replaced) =
            rule.pattern.replace_all(&text, rule.replacement)
        {
            text = replaced;
        }
    }
    text.trim().to_string()
}

/// Strip markdown syntax from scraped content, leaving readable prose.
///
/// Removes image embeds, bare URLs, heading markers, emphasis and code
/// markers, table rows, list bullets and horizontal rules; link text is kept.
/// Whitespace is collapsed and the result trimmed.
///
/// Removing one marker can expose another (a heading behind a bullet, for
/// instance), so passes repeat until the text stops changing. Every pass
/// either shortens the text or replaces tabs, so this terminates and
/// `clean_markdown(clean_markdown(x)) == clean_markdown(x)`.
///
/// # Examples
///
/// ```
/// use pagedeck_scrape::clean_markdown;
///
/// let md = "# Title\n\nSee [the docs](https://example.com) for **more**.\n\n\n\n- one\n- two";
/// assert_eq!(clean_markdown(md), "Title\n\nSee the docs for more.\n\none\ntwo");
/// ```
pub fn clean_markdown(markdown: &str) -> String {
    let mut current = clean_once(markdown);
    loop {
        let next = clean_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
