//! Movie search listings and subject pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{
    capture, first_attr, first_text, image_by_size, info_text, pattern, selector, truncate,
    LabelPatterns,
};
use crate::constants::filters::MOVIE_CATEGORIES;
use crate::models::{Celebrity, Movie, MovieInfo};

const DIRECTOR: &str = "导演";
const WRITER: &str = "编剧";
const CAST: &str = "主演";
const GENRE: &str = "类型";
const COUNTRY: &str = "制片国家/地区";
const LANGUAGE: &str = "语言";
const RUNTIME: &str = "片长";
const EPISODES: &str = "集数";
const RELEASE_DATE: &str = "上映日期";
const AKA: &str = "又名";
const IMDB: &str = "IMDb";
const SITE: &str = "官方网站";

/// Extracts [`Movie`] rows and [`MovieInfo`] records
#[derive(Debug)]
pub struct MovieParser {
    // listing
    result_list: Selector,
    result: Selector,
    rating_nums: Selector,
    title_link: Selector,
    poster: Selector,
    title_mark: Selector,
    subject_cast: Selector,
    sid: Regex,
    category: Regex,

    // subject page
    content: Selector,
    heading: Selector,
    year_span: Selector,
    rating_num: Selector,
    cover: Selector,
    summary: Selector,
    info: Selector,
    first_celebrity: Selector,
    celebrity_name: Selector,
    celebrity_avatar: Selector,
    celebrity_role: Selector,
    year: Regex,
    name_split: Regex,
    person_id: Regex,
    background: Regex,
    labels: LabelPatterns,
}

impl Default for MovieParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieParser {
    pub fn new() -> Self {
        Self {
            result_list: selector("div.result-list"),
            result: selector(".result"),
            rating_nums: selector("div.rating-info>.rating_nums"),
            title_link: selector("div.title a"),
            poster: selector("a.nbg>img"),
            title_mark: selector("div.title>h3>span"),
            subject_cast: selector("div.rating-info>.subject-cast"),
            sid: pattern(r"sid: ([0-9]+?),"),
            category: pattern(r"\[(.+?)\]"),

            content: selector("#content"),
            heading: selector("h1>span:first-child"),
            year_span: selector("h1>span.year"),
            rating_num: selector("div.rating_self strong.rating_num"),
            cover: selector("a.nbgnbg>img"),
            summary: selector("div.indent>span"),
            info: selector("#info"),
            first_celebrity: selector("#celebrities li.celebrity"),
            celebrity_name: selector("div.info a.name"),
            celebrity_avatar: selector("div.avatar"),
            celebrity_role: selector("div.info span.role"),
            year: pattern(r"\(([0-9]+?)\)"),
            name_split: pattern(r"(.+第\w季|[\p{Han}\w：！，·]+)\s*(.*)"),
            person_id: pattern(r"/([0-9]+?)/"),
            background: pattern(r"url\((.+?)\)"),
            labels: LabelPatterns::new(&[
                DIRECTOR, WRITER, CAST, GENRE, COUNTRY, LANGUAGE, RUNTIME, EPISODES,
                RELEASE_DATE, AKA, IMDB, SITE,
            ]),
        }
    }

    /// Parse a movie search page
    ///
    /// Only movie and TV rows are kept. `limit` truncates when positive.
    pub fn parse_movies(&self, document: &Html, limit: i64, image_size: &str) -> Vec<Movie> {
        let Some(list) = document.select(&self.result_list).next() else {
            return Vec::new();
        };

        let mut movies: Vec<Movie> = list
            .select(&self.result)
            .filter_map(|row| {
                let title_mark = first_text(row, &self.title_mark);
                let category = capture(&self.category, &title_mark);
                if !MOVIE_CATEGORIES.contains(&category.as_str()) {
                    return None;
                }

                let mut rating = first_text(row, &self.rating_nums);
                if rating.is_empty() {
                    rating = "0".to_string();
                }
                let onclick = first_attr(row, &self.title_link, "onclick");
                let subject = first_text(row, &self.subject_cast);

                Some(Movie {
                    category,
                    id: capture(&self.sid, &onclick),
                    title: first_text(row, &self.title_link),
                    rating,
                    image: image_by_size(&first_attr(row, &self.poster, "src"), image_size),
                    year: last_segment(&subject),
                })
            })
            .collect();

        truncate(&mut movies, limit);
        movies
    }

    /// Parse a movie subject page
    pub fn parse_movie_info(&self, document: &Html, sid: &str, image_size: &str) -> MovieInfo {
        let Some(content) = document.select(&self.content).next() else {
            return MovieInfo {
                id: sid.to_string(),
                rating: "0".to_string(),
                ..MovieInfo::default()
            };
        };

        let heading = first_text(content, &self.heading);
        let (title, original_title) = self.split_title(&heading);

        let mut rating = first_text(content, &self.rating_num);
        if rating.is_empty() {
            rating = "0".to_string();
        }

        let synopsis = content
            .select(&self.summary)
            .map(|el| el.text().collect::<String>())
            .collect::<String>()
            .replace("©豆瓣", "")
            .trim()
            .to_string();

        let info = content
            .select(&self.info)
            .next()
            .map(info_text)
            .unwrap_or_default();
        let fields = self.labels.extract(&info);

        let people = content
            .select(&self.first_celebrity)
            .next()
            .map(|row| self.first_person(row, image_size))
            .into_iter()
            .collect();

        MovieInfo {
            id: sid.to_string(),
            title,
            original_title,
            rating,
            image: image_by_size(&first_attr(content, &self.cover, "src"), image_size),
            year: capture(&self.year, &first_text(content, &self.year_span)),
            synopsis,
            director: fields.text(DIRECTOR),
            writer: fields.text(WRITER),
            cast: fields.text(CAST),
            genre: fields.text(GENRE),
            site: fields.text(SITE),
            country: fields.text(COUNTRY),
            language: fields.text(LANGUAGE),
            release_date: fields.text(RELEASE_DATE),
            runtime: fields.text(RUNTIME),
            episode_count: fields.text(EPISODES),
            aka_titles: fields.text(AKA),
            external_id: fields.text(IMDB),
            people,
        }
    }

    /// Split a heading into localized title and original title
    ///
    /// Falls back to the whole heading as title when the pattern does not match.
    pub fn split_title(&self, heading: &str) -> (String, String) {
        match self.name_split.captures(heading) {
            Some(caps) => (
                caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
            ),
            None => (heading.to_string(), String::new()),
        }
    }

    fn first_person(&self, row: ElementRef<'_>, image_size: &str) -> Celebrity {
        let avatar = first_attr(row, &self.celebrity_avatar, "style");
        Celebrity {
            id: capture(&self.person_id, &first_attr(row, &self.celebrity_name, "href")),
            image: image_by_size(&capture(&self.background, &avatar), image_size),
            name: first_text(row, &self.celebrity_name),
            role_category: String::new(),
            role: first_text(row, &self.celebrity_role),
        }
    }
}

/// Last `/`-separated segment, trimmed
fn last_segment(text: &str) -> String {
    text.rsplit('/').next().unwrap_or_default().trim().to_string()
}
