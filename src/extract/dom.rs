//! Parsed-document capability used by the page extractor
//!
//! The extractor only needs "give me every element matching this selector, in
//! document order". [`DomQuery`] captures that, and [`HtmlDocument`] provides
//! it on top of `scraper`.

use scraper::{Html, Selector};

/// Owned snapshot of one matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    name: String,
    text: String,
    attributes: Vec<(String, String)>,
}

impl ElementHandle {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute (builder style, mostly for tests and adapters)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Lowercase tag name, e.g. `h2`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concatenated descendant text, untrimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Attribute value, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Selector query over a parsed document
pub trait DomQuery {
    /// Returns every element matching `selector` in document order
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ElementHandle>)` - Matches (possibly empty)
    /// * `Err(String)` - The selector itself could not be evaluated
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, String>;
}

/// HTML document parsed with `scraper`
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses markup leniently; html5ever recovers from any malformed input
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

impl DomQuery for HtmlDocument {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, String> {
        let selector = Selector::parse(selector).map_err(|e| format!("{:?}", e))?;

        Ok(self
            .html
            .select(&selector)
            .map(|element| {
                let value = element.value();
                ElementHandle {
                    name: value.name().to_ascii_lowercase(),
                    text: element.text().collect(),
                    attributes: value
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                }
            })
            .collect())
    }
}
