//! Book search listings and subject pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::{capture, first_attr, first_text, pattern, selector, text_of, truncate, LabelMap};
use crate::models::{Book, BookImages, BookRating, BookTag};

const AUTHOR: &str = "作者";
const TRANSLATOR: &str = "译者";
const PRODUCER: &str = "出品方";
const SERIES: &str = "丛书";
const ORIGIN: &str = "原作名";
const PUBLISHER: &str = "出版社";
const PUBDATE: &str = "出版年";
const PAGES: &str = "页数";
const PRICE: &str = "定价";
const BINDING: &str = "装帧";
const SUBTITLE: &str = "副标题";
const ISBN: &str = "ISBN";

/// Extracts [`Book`] records from search and subject pages
#[derive(Debug)]
pub struct BookParser {
    result_list: Selector,
    result: Selector,
    title_link: Selector,
    paragraph: Selector,
    cover: Selector,
    rating_nums: Selector,
    subject_cast: Selector,
    sid: Regex,

    wrapper: Selector,
    heading: Selector,
    large_cover: Selector,
    small_cover: Selector,
    tag: Selector,
    content: Selector,
    rating_num: Selector,
    summary_full: Selector,
    summary_short: Selector,
    author_intro_full: Selector,
    author_intro_short: Selector,
    info: Selector,
    split_space: Regex,
    info_pair: Regex,
}

impl Default for BookParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BookParser {
    pub fn new() -> Self {
        Self {
            result_list: selector("div.result-list"),
            result: selector(".result"),
            title_link: selector("div.title a"),
            paragraph: selector("p"),
            cover: selector(".pic img"),
            rating_nums: selector(".rating_nums"),
            subject_cast: selector(".subject-cast"),
            sid: pattern(r"sid: ([0-9]+?),"),

            wrapper: selector("#wrapper"),
            heading: selector("h1>span:first-child"),
            large_cover: selector("a.nbg"),
            small_cover: selector("a.nbg>img"),
            tag: selector("a.tag"),
            content: selector("#content"),
            rating_num: selector("div.rating_self strong.rating_num"),
            summary_full: selector("#link-report .hidden .intro"),
            summary_short: selector("#link-report .intro"),
            author_intro_full: selector(".related_info .indent:not([id]) > .all.hidden .intro"),
            author_intro_short: selector(".related_info .indent:not([id]) .intro"),
            info: selector("#info"),
            split_space: pattern(r"\s+?/\s+"),
            info_pair: pattern(r"([^\s]+?):\s*([^\n]+)"),
        }
    }

    /// Parse a book search page; `limit` truncates when positive
    pub fn parse_search_list(&self, document: &Html, limit: i64) -> Vec<Book> {
        let Some(list) = document.select(&self.result_list).next() else {
            return Vec::new();
        };

        let mut books: Vec<Book> = list.select(&self.result).map(|row| self.parse_row(row)).collect();
        truncate(&mut books, limit);
        books
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Book {
        let (author, publisher, pubdate) = parse_subject_cast(&first_text(row, &self.subject_cast));
        let summary: String = row.select(&self.paragraph).flat_map(|p| p.text()).collect();

        Book {
            id: capture(&self.sid, &first_attr(row, &self.title_link, "onclick")),
            author,
            images: BookImages {
                large: first_attr(row, &self.cover, "src"),
                ..BookImages::default()
            },
            rating: parse_rating(&first_text(row, &self.rating_nums)),
            pubdate,
            publisher,
            summary: summary.trim().to_string(),
            title: first_text(row, &self.title_link),
            ..Book::default()
        }
    }

    /// Parse a book subject page
    pub fn parse_book_page(&self, document: &Html, id: &str) -> Book {
        let Some(wrapper) = document.select(&self.wrapper).next() else {
            return Book {
                id: id.to_string(),
                ..Book::default()
            };
        };

        let large = first_attr(wrapper, &self.large_cover, "href");
        let images = BookImages {
            small: first_attr(wrapper, &self.small_cover, "src"),
            medium: large.clone(),
            large,
        };
        let tags = wrapper
            .select(&self.tag)
            .map(|t| BookTag { name: text_of(t) })
            .collect();

        let mut book = Book {
            id: id.to_string(),
            title: first_text(wrapper, &self.heading),
            images,
            tags,
            ..Book::default()
        };

        let Some(content) = wrapper.select(&self.content).next() else {
            return book;
        };

        book.rating = parse_rating(&first_text(content, &self.rating_num));
        book.summary = first_html(content, &self.summary_full)
            .or_else(|| first_html(content, &self.summary_short))
            .unwrap_or_default();
        book.author_intro = first_html(content, &self.author_intro_full)
            .or_else(|| first_html(content, &self.author_intro_short))
            .unwrap_or_default();

        let info_text: String = content
            .select(&self.info)
            .flat_map(|el| el.text())
            .collect();
        let info = self.parse_info(info_text.trim());

        book.author = info.texts(AUTHOR);
        book.translators = info.texts(TRANSLATOR);
        book.producer = info.text(PRODUCER);
        book.serials = info.text(SERIES);
        book.origin = info.text(ORIGIN);
        book.publisher = info.text(PUBLISHER);
        book.pubdate = info.text(PUBDATE);
        book.pages = info.text(PAGES);
        book.price = info.text(PRICE);
        book.binding = info.text(BINDING);
        book.subtitle = info.text(SUBTITLE);
        book.isbn13 = info.text(ISBN);
        book
    }

    /// Read every `key: value` pair from the book metadata block
    ///
    /// Multi-valued entries spread across lines are joined with `/` first.
    /// A repeated key keeps its last value.
    pub fn parse_info(&self, text: &str) -> LabelMap {
        let joined = self.split_space.replace_all(text, "/");
        let mut map = LabelMap::default();
        for caps in self.info_pair.captures_iter(&joined) {
            map.insert(caps[1].trim(), caps[2].trim());
        }
        map
    }
}

/// Split a listing subject-cast line into authors, publisher and publish date
///
/// Three or more segments: the last is the date, the one before it the
/// publisher, the rest are authors. Two segments: an author, then a date when
/// the second parses as an integer, otherwise a publisher. One non-blank
/// segment: a single author.
pub fn parse_subject_cast(text: &str) -> (Vec<String>, String, String) {
    let segments: Vec<&str> = text.split('/').map(str::trim).collect();

    match segments.as_slice() {
        [authors @ .., publisher, pubdate] if !authors.is_empty() => (
            authors.iter().map(|s| s.to_string()).collect(),
            publisher.to_string(),
            pubdate.to_string(),
        ),
        [author, second] => {
            if second.parse::<i64>().is_ok() {
                (vec![author.to_string()], String::new(), second.to_string())
            } else {
                (vec![author.to_string()], second.to_string(), String::new())
            }
        }
        [author] if !author.is_empty() => (vec![author.to_string()], String::new(), String::new()),
        _ => (Vec::new(), String::new(), String::new()),
    }
}

/// Numeric rating, `0.0` when blank or malformed
fn parse_rating(raw: &str) -> BookRating {
    BookRating {
        average: raw.trim().parse().unwrap_or(0.0),
    }
}

/// Trimmed inner markup of the first match, `None` when absent or blank
fn first_html(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(|el| el.inner_html().trim().to_string())
        .filter(|html| !html.is_empty())
}
