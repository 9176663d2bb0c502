//! Built-in extractor for WeChat official-account articles

use crate::extract::custom::{CustomExtractor, PluginError};
use crate::extract::dates::{date_from_timestamp, normalize_date};
use crate::extract::generic::{first_text, visible_text};
use crate::extract::links::{anchor_text, resolve_href};
use crate::extract::types::{Article, CustomOutput, DiscoveredLinks, LinkCandidates};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

pub const WECHAT_DOMAIN: &str = "mp.weixin.qq.com";

/// Publish time is usually rendered by script from `var ct = "<unix seconds>"`
static CREATE_TIME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"var\s+ct\s*=\s*"(\d{9,11})""#).ok());

/// Extracts article body, account name and publish date from `mp.weixin.qq.com` pages
#[derive(Debug, Default)]
pub struct WechatArticleExtractor;

impl WechatArticleExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CustomExtractor for WechatArticleExtractor {
    fn name(&self) -> &str {
        "wechat"
    }

    async fn extract(&self, html: &str, url: &Url) -> Result<CustomOutput, PluginError> {
        let document = Html::parse_document(html);

        let content_selector = Selector::parse("#js_content")
            .map_err(|e| PluginError::Failed(format!("bad selector: {:?}", e)))?;

        // Deleted or blocked articles have no body at all
        let Some(body) = document.select(&content_selector).next() else {
            return Ok(CustomOutput::default());
        };

        let mut article = Article::new(visible_text(body));

        if let Some(author) = first_text(&document, &["#js_name"]).or_else(|| meta_author(&document)) {
            article = article.with_author(author);
        }

        let publish_date = first_text(&document, &["#publish_time"])
            .as_deref()
            .and_then(normalize_date)
            .or_else(|| script_publish_date(html));
        if let Some(date) = publish_date {
            article = article.with_publish_date(date);
        }

        let mut hints = LinkCandidates::new();
        if let Ok(anchor_selector) = Selector::parse("a[href]") {
            for anchor in body.select(&anchor_selector) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                let text = anchor_text(&anchor);
                if text.is_empty() {
                    continue;
                }
                if let Some(resolved) = resolve_href(href, url) {
                    hints.insert(text, resolved);
                }
            }
        }

        let links = if hints.is_empty() {
            DiscoveredLinks::None
        } else {
            DiscoveredLinks::Hints(hints)
        };

        Ok(CustomOutput {
            article: Some(article),
            links,
            records: vec![],
        })
    }
}

fn meta_author(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="author"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

fn script_publish_date(html: &str) -> Option<chrono::NaiveDate> {
    let pattern = CREATE_TIME.as_ref()?;
    let seconds = pattern.captures(html)?.get(1)?.as_str().parse().ok()?;
    date_from_timestamp(seconds)
}
