//! Structural extraction of typed records from portal HTML.
//!
//! Each page type has one fixed set of CSS locators. Extraction never
//! reports syntax errors: documents are parsed leniently by `scraper`, and a
//! failure always means an expected element is absent (or, for the unread
//! count, not a number).

pub mod form;

use crate::error::ExtractionError;
use crate::portal::RawDocument;
use crate::types::{NotificationRecord, ProfileSummary, ThreadBody};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, warn};
use url::Url;

pub use form::{parse_login_form, LoginForm};

/// Student name, only rendered for a logged-in session.
pub const PROFILE_NAME: &str = "span#LblStudentName1";
/// Unread notification counter next to the name.
pub const PROFILE_COUNT: &str = "span#dataCount";
/// One unread notification block.
pub const UNREAD_BLOCK: &str = "div.notification.unread";
const CREDENTIALS_BLOCK: &str = "div.credentials";
const THREAD_ANCHOR: &str = "a";
const NOTIFICATION_DATE: &str = "span.date";
/// The first post in the thread view.
pub const THREAD_BODY: &str = "span#MainContent_rptThreadView_lblPostContent_0";

/// Read the profile name and unread count from the post-login page.
pub fn parse_profile(doc: &RawDocument) -> Result<ProfileSummary, ExtractionError> {
    let document = Html::parse_document(&doc.html);

    let name = first(&document, PROFILE_NAME).ok_or(ExtractionError::Missing(PROFILE_NAME))?;
    let count = first(&document, PROFILE_COUNT).ok_or(ExtractionError::Missing(PROFILE_COUNT))?;

    let display_name = inline_text(name);
    let count_text = inline_text(count);
    let unread_count = count_text
        .parse::<u32>()
        .map_err(|_| ExtractionError::Malformed {
            element: PROFILE_COUNT,
            value: count_text.clone(),
        })?;

    Ok(ProfileSummary {
        display_name,
        unread_count,
    })
}

/// List every unread notification on the notifications page, in document
/// order, with indices `1..=N`.
///
/// Relative thread links are resolved against `origin`. A block missing its
/// credentials, anchor, href or date is skipped and does not take an index.
pub fn parse_notification_list(doc: &RawDocument, origin: &Url) -> Vec<NotificationRecord> {
    let document = Html::parse_document(&doc.html);
    let block_sel = Selector::parse(UNREAD_BLOCK).unwrap();
    let cred_sel = Selector::parse(CREDENTIALS_BLOCK).unwrap();
    let anchor_sel = Selector::parse(THREAD_ANCHOR).unwrap();
    let date_sel = Selector::parse(NOTIFICATION_DATE).unwrap();

    let mut records = Vec::new();
    for (position, block) in document.select(&block_sel).enumerate() {
        let Some(credentials) = block.select(&cred_sel).next() else {
            warn!(position, "unread notification without credentials block, skipping");
            continue;
        };
        let Some(anchor) = credentials.select(&anchor_sel).next() else {
            warn!(position, "unread notification without thread link, skipping");
            continue;
        };
        let Some(href) = anchor.value().attr("href").filter(|h| !h.trim().is_empty()) else {
            warn!(position, "thread link without href, skipping");
            continue;
        };
        let Some(date) = credentials.select(&date_sel).next() else {
            warn!(position, "unread notification without date, skipping");
            continue;
        };
        let Ok(thread_url) = origin.join(href.trim()) else {
            warn!(position, href, "unresolvable thread link, skipping");
            continue;
        };

        records.push(NotificationRecord {
            index: records.len() + 1,
            title: inline_text(anchor),
            date: inline_text(date),
            thread_url: thread_url.to_string(),
        });
    }

    debug!(count = records.len(), "parsed notification list");
    records
}

/// Read the body of the first post in a thread view.
pub fn parse_thread_body(doc: &RawDocument) -> Result<ThreadBody, ExtractionError> {
    let document = Html::parse_document(&doc.html);
    let body = first(&document, THREAD_BODY).ok_or(ExtractionError::Missing(THREAD_BODY))?;
    Ok(ThreadBody {
        text: block_text(body),
    })
}

fn first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(css).ok()?;
    document.select(&sel).next()
}

/// Element text with whitespace collapsed to single spaces.
pub(crate) fn inline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Element text keeping `<br>` line breaks, each line trimmed and outer
/// blank lines dropped.
fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(e) if e.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    let normalized: Vec<String> = raw
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let start = normalized.iter().position(|l| !l.is_empty());
    let end = normalized.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(s), Some(e)) => normalized[s..=e].join("\n"),
        _ => String::new(),
    }
}
