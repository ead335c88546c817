//! Movie photo gallery.

use scraper::{Html, Selector};

use super::{first_text, selector};
use crate::constants::endpoints;
use crate::models::Photo;

#[derive(Debug)]
pub struct PhotoParser {
    item: Selector,
    prop: Selector,
}

impl Default for PhotoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoParser {
    pub fn new() -> Self {
        Self {
            item: selector(".poster-col3>li"),
            prop: selector("div.prop"),
        }
    }

    /// Parse a photo gallery page; items without a `data-id` are skipped
    pub fn parse_wallpapers(&self, document: &Html) -> Vec<Photo> {
        document
            .select(&self.item)
            .filter_map(|item| {
                let id = item.value().attr("data-id").unwrap_or_default().trim();
                if id.is_empty() {
                    return None;
                }

                let dimension_label = first_text(item, &self.prop);
                let (width, height) = split_dimensions(&dimension_label);

                Some(Photo {
                    id: id.to_string(),
                    small_url: endpoints::photo("s", id),
                    medium_url: endpoints::photo("m", id),
                    large_url: endpoints::photo("l", id),
                    dimension_label,
                    width,
                    height,
                })
            })
            .collect()
    }
}

/// Split a `WxH` label on its first `x`; both sides are empty when there is none
fn split_dimensions(label: &str) -> (String, String) {
    match label.split_once('x') {
        Some((w, h)) => (w.trim().to_string(), h.trim().to_string()),
        None => (String::new(), String::new()),
    }
}
