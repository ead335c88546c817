//! Cast listings and celebrity profile pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{capture, first_attr, first_text, pattern, selector};
use crate::constants::filters::{CAST_ROLES, MAX_CELEBRITIES};
use crate::models::{Celebrity, CelebrityInfo};

/// Extracts [`Celebrity`] rows and [`CelebrityInfo`] profiles
#[derive(Debug)]
pub struct CelebrityParser {
    row: Selector,
    name: Selector,
    avatar: Selector,
    role: Selector,
    person_id: Regex,
    background: Regex,
    played: Regex,

    content: Selector,
    headline_image: Selector,
    heading: Selector,
    intro_full: Selector,
    intro_short: Selector,
    info: Selector,
    gender: Regex,
    star_sign: Regex,
    birth_date: Regex,
    life_span: Regex,
    birth_place: Regex,
    career: Regex,
    aka_names: Regex,
    relatives: Regex,
    external_id: Regex,
}

impl Default for CelebrityParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Profile field pattern: label, a colon, an optional line break, then the value line
fn profile_field(label: &str) -> Regex {
    pattern(&format!(r"{}:\s*\n?\s*(.+?)\n", regex::escape(label)))
}

impl CelebrityParser {
    pub fn new() -> Self {
        Self {
            row: selector("#content ul.celebrities-list li.celebrity"),
            name: selector("div.info a.name"),
            avatar: selector("div.avatar"),
            role: selector("div.info span.role"),
            person_id: pattern(r"/([0-9]+?)/"),
            background: pattern(r"url\((.+?)\)"),
            played: pattern(r"\([饰配] (.+?)\)"),

            content: selector("#content"),
            headline_image: selector("#headline .nbg img"),
            heading: selector("h1"),
            intro_full: selector("#intro span.all"),
            intro_short: selector("#intro div.bd"),
            info: selector("div.info"),
            gender: profile_field("性别"),
            star_sign: profile_field("星座"),
            birth_date: profile_field("出生日期"),
            life_span: pattern(r"生卒日期:\s*\n?\s*(.+?)\s*至"),
            birth_place: profile_field("出生地"),
            career: profile_field("职业"),
            aka_names: profile_field("更多外文名"),
            relatives: profile_field("家庭成员"),
            external_id: profile_field("imdb编号"),
        }
    }

    /// Parse the full cast page of a movie
    ///
    /// Keeps directors, voice actors and actors, at most
    /// [`MAX_CELEBRITIES`] of them, in page order.
    pub fn parse_celebrities(&self, document: &Html) -> Vec<Celebrity> {
        document
            .select(&self.row)
            .filter_map(|row| self.parse_row(row))
            .take(MAX_CELEBRITIES)
            .collect()
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Option<Celebrity> {
        let raw_role = first_text(row, &self.role);
        let role_category = role_category(&raw_role);
        if !CAST_ROLES.contains(&role_category.as_str()) {
            return None;
        }

        let mut role = capture(&self.played, &raw_role);
        if role.is_empty() {
            role = role_category.clone();
        }

        let full_name = first_text(row, &self.name);
        let name = full_name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Some(Celebrity {
            id: capture(&self.person_id, &first_attr(row, &self.name, "href")),
            image: capture(&self.background, &first_attr(row, &self.avatar, "style")),
            name,
            role_category,
            role,
        })
    }

    /// Parse a celebrity profile page
    pub fn parse_celebrity_info(&self, document: &Html, id: &str) -> CelebrityInfo {
        let Some(content) = document.select(&self.content).next() else {
            return CelebrityInfo {
                id: id.to_string(),
                ..CelebrityInfo::default()
            };
        };

        let mut biography = first_text(content, &self.intro_full);
        if biography.is_empty() {
            biography = first_text(content, &self.intro_short);
        }

        let info: String = content
            .select(&self.info)
            .flat_map(|el| el.text())
            .collect();

        let mut birth_date = capture(&self.birth_date, &info);
        if birth_date.is_empty() {
            birth_date = capture(&self.life_span, &info);
        }

        CelebrityInfo {
            id: id.to_string(),
            image: first_attr(content, &self.headline_image, "src"),
            name: first_text(content, &self.heading),
            role: capture(&self.career, &info),
            biography,
            gender: capture(&self.gender, &info),
            star_sign: capture(&self.star_sign, &info),
            birth_date,
            birth_place: capture(&self.birth_place, &info),
            aka_names: capture(&self.aka_names, &info),
            external_id: capture(&self.external_id, &info),
            relatives: capture(&self.relatives, &info),
        }
    }
}

/// First token of a role label, without a trailing colon
fn role_category(raw_role: &str) -> String {
    raw_role
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_end_matches([':', '：'])
        .to_string()
}
