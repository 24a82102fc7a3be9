//! Parsing of Finding API search responses.
//!
//! The response is an XML document in the marketplace's search namespace;
//! we match on element local names so prefix choices don't matter. Every
//! item field is optional: text fields default to empty, price to +inf.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::market::types::Listing;

/// Item child elements we capture text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Price,
    Url,
    Condition,
}

#[derive(Default)]
struct PartialItem {
    title: String,
    price_text: String,
    url: String,
    condition: String,
}

impl PartialItem {
    fn finish(self) -> Listing {
        Listing {
            price: parse_price(&self.price_text),
            title: self.title,
            url: self.url,
            condition: self.condition,
        }
    }
}

/// Price text carries grouping commas; absent or unparseable values map to
/// the +inf sentinel so they sort last and never win selection.
fn parse_price(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "");
    cleaned.trim().parse().unwrap_or(f64::INFINITY)
}

/// Extract all listings from a search response body.
///
/// Returns an error only for ill-formed XML; a well-formed document with no
/// `searchResult` node is an empty result, not an error.
pub fn parse_search_response(body: &str) -> anyhow::Result<Vec<Listing>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut listings = Vec::new();
    let mut in_search_result = false;
    let mut saw_search_result = false;
    let mut current: Option<PartialItem> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"searchResult" => {
                    in_search_result = true;
                    saw_search_result = true;
                }
                b"item" if in_search_result => current = Some(PartialItem::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"currentPrice" if current.is_some() => field = Some(Field::Price),
                b"viewItemURL" if current.is_some() => field = Some(Field::Url),
                b"conditionDisplayName" if current.is_some() => field = Some(Field::Condition),
                _ => {}
            },
            Event::Text(t) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    let text = t.unescape()?;
                    let slot = match field {
                        Field::Title => &mut item.title,
                        Field::Price => &mut item.price_text,
                        Field::Url => &mut item.url,
                        Field::Condition => &mut item.condition,
                    };
                    slot.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"item" => {
                    if let Some(item) = current.take() {
                        listings.push(item.finish());
                    }
                    field = None;
                }
                b"searchResult" => in_search_result = false,
                b"title" | b"currentPrice" | b"viewItemURL" | b"conditionDisplayName" => {
                    field = None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_search_result {
        debug!("response contained no searchResult node");
    }

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<findItemsByKeywordsResponse xmlns="http://www.ebay.com/marketplace/search/v1/services">
  <ack>Success</ack>
  <searchResult count="2">
    <item>
      <itemId>1001</itemId>
      <title>RTX 3080 Founders Edition</title>
      <viewItemURL>https://example.com/itm/1001</viewItemURL>
      <sellingStatus>
        <currentPrice currencyId="USD">1,234.56</currentPrice>
      </sellingStatus>
      <condition>
        <conditionId>3000</conditionId>
        <conditionDisplayName>Used</conditionDisplayName>
      </condition>
    </item>
    <item>
      <itemId>1002</itemId>
      <title>RTX 3080 OEM</title>
      <viewItemURL>https://example.com/itm/1002</viewItemURL>
    </item>
  </searchResult>
</findItemsByKeywordsResponse>"#;

    #[test]
    fn parses_items_with_nested_price_and_condition() {
        let listings = parse_search_response(RESPONSE).unwrap();
        assert_eq!(listings.len(), 2);

        assert_eq!(listings[0].title, "RTX 3080 Founders Edition");
        assert_eq!(listings[0].price, 1234.56);
        assert_eq!(listings[0].url, "https://example.com/itm/1001");
        assert_eq!(listings[0].condition, "Used");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let listings = parse_search_response(RESPONSE).unwrap();
        assert!(listings[1].price.is_infinite());
        assert_eq!(listings[1].condition, "");
    }

    #[test]
    fn no_search_result_node_is_empty_not_error() {
        let body = r#"<findItemsByKeywordsResponse><ack>Failure</ack></findItemsByKeywordsResponse>"#;
        let listings = parse_search_response(body).unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn mismatched_tags_are_an_error() {
        let body = "<searchResult><item></wrong></searchResult>";
        assert!(parse_search_response(body).is_err());
    }

    #[test]
    fn price_parsing_strips_grouping_commas() {
        assert_eq!(parse_price("2,599.00"), 2599.0);
        assert!(parse_price("").is_infinite());
        assert!(parse_price("N/A").is_infinite());
    }
}
