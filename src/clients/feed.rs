use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

/// A single entry pulled out of an RSS feed, cleaned up for storage.
#[derive(Debug, Clone)]
pub struct FeedArticle {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published_at: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<String>,

    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,

    #[serde(rename = "pubDate")]
    pub_date: Option<String>,

    #[serde(default)]
    category: Vec<String>,
}

/// Feed descriptions often arrive as HTML fragments with escaped entities.
fn clean_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw).to_string();
    html2text::from_read(decoded.as_bytes(), 200)
        .map_or(decoded, |text| text.trim().to_string())
}

fn normalize_pub_date(raw: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc2822(raw)
        .map(|dt| dt.to_utc().to_rfc3339())
        .ok()
}

pub fn parse_feed(xml: &str) -> Result<(Option<String>, Vec<FeedArticle>)> {
    let document: RssDocument =
        quick_xml::de::from_str(xml).context("Failed to parse RSS document")?;

    let feed_title = document.channel.title;
    let articles = document
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let link = item.link?;
            let title = clean_text(&item.title.unwrap_or_default());
            if title.is_empty() {
                return None;
            }

            Some(FeedArticle {
                title,
                link,
                summary: clean_text(&item.description.unwrap_or_default()),
                published_at: item.pub_date.as_deref().and_then(normalize_pub_date),
                category: item.category.into_iter().next(),
            })
        })
        .collect();

    Ok((feed_title, articles))
}

#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<(Option<String>, Vec<FeedArticle>)> {
        let xml = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch feed: {url}"))?
            .error_for_status()
            .with_context(|| format!("Feed returned error status: {url}"))?
            .text()
            .await
            .with_context(|| format!("Failed to read feed body: {url}"))?;

        parse_feed(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <title>Beredskapsvarsler</title>
    <item>
      <title>Flomvarsel for &#216;stlandet</title>
      <link>https://example.no/varsel/123</link>
      <description>&lt;p&gt;Gult niv&#229; fra torsdag.&lt;/p&gt;</description>
      <pubDate>Thu, 12 Jun 2025 08:30:00 +0200</pubDate>
      <category>Innlandet</category>
    </item>
    <item>
      <title>Stengt vannverk</title>
      <link>https://example.no/varsel/124</link>
      <description>Kokevarsel inntil videre.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_feed() {
        let (title, articles) = parse_feed(SAMPLE).unwrap();
        assert_eq!(title.as_deref(), Some("Beredskapsvarsler"));
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.title, "Flomvarsel for Østlandet");
        assert_eq!(first.link, "https://example.no/varsel/123");
        assert!(first.summary.contains("Gult nivå"));
        assert_eq!(first.category.as_deref(), Some("Innlandet"));
        assert!(first.published_at.as_deref().unwrap().starts_with("2025-06-12"));

        assert!(articles[1].published_at.is_none());
    }

    #[test]
    fn test_items_without_link_are_skipped() {
        let xml = r#"<rss><channel><title>t</title>
            <item><title>no link</title></item>
        </channel></rss>"#;
        let (_, articles) = parse_feed(xml).unwrap();
        assert!(articles.is_empty());
    }
}
