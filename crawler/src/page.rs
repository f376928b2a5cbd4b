use lazy_static::lazy_static;
use scraper::{Html, Selector};
use url::Url;

lazy_static! {
    static ref SEL_TITLE: Selector = Selector::parse("title").expect("valid selector");
    static ref SEL_ANCHOR: Selector = Selector::parse("a[href]").expect("valid selector");
}

/// One parsed page: title, visible text, and resolved outbound links.
pub struct Page {
    url: Url,
    html: Html,
}

impl Page {
    pub fn parse(url: Url, body: &str) -> Self {
        Self { url, html: Html::parse_document(body) }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Contents of the first `<title>` element, if any.
    pub fn title(&self) -> Option<String> {
        self.html
            .select(&SEL_TITLE)
            .next()
            .map(|n| n.text().collect::<String>())
    }

    /// All text content joined with single spaces. Includes the title
    /// text; the document builder strips it back off the front.
    pub fn text(&self) -> String {
        self.html.root_element().text().collect::<Vec<_>>().join(" ")
    }

    /// Anchor hrefs resolved against this page's URL. Fragments are
    /// dropped so `#section` variants dedup to one page; non-http(s)
    /// schemes (mailto, javascript) are skipped.
    pub fn links(&self) -> Vec<Url> {
        let mut links = Vec::new();
        for a in self.html.select(&SEL_ANCHOR) {
            if let Some(href) = a.value().attr("href") {
                if let Ok(mut resolved) = self.url.join(href) {
                    if resolved.scheme().starts_with("http") {
                        resolved.set_fragment(None);
                        links.push(resolved);
                    }
                }
            }
        }
        links
    }
}
