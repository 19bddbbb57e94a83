//! Login form extraction for the plain-HTTP transport.
//!
//! The portal is an ASP.NET WebForms site, so the login POST only succeeds
//! when it carries the hidden state fields (`__VIEWSTATE` and friends) from
//! the page it was served on. This module collects the form's successful
//! controls the way a browser would before submission.

use crate::error::ExtractionError;
use crate::portal::RawDocument;
use scraper::{Html, Selector};
use url::Url;

/// Selector for the login form.
pub const LOGIN_FORM: &str = "form.custom-form";

/// A login form ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Absolute submission URL.
    pub action: String,
    /// Upper-cased HTTP method.
    pub method: String,
    /// Successful controls in document order.
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    /// Set a field, replacing its existing value or appending it.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Locate the login form and collect its submission data.
pub fn parse_login_form(doc: &RawDocument) -> Result<LoginForm, ExtractionError> {
    let document = Html::parse_document(&doc.html);
    let form_sel = Selector::parse(LOGIN_FORM).unwrap();
    let control_sel = Selector::parse("input, select, textarea").unwrap();
    let option_sel = Selector::parse("option").unwrap();

    let form = document
        .select(&form_sel)
        .next()
        .ok_or(ExtractionError::Missing(LOGIN_FORM))?;

    let page_url = Url::parse(&doc.url).map_err(|_| ExtractionError::Malformed {
        element: LOGIN_FORM,
        value: doc.url.clone(),
    })?;
    let action_attr = form.value().attr("action").unwrap_or("").trim();
    let action = if action_attr.is_empty() {
        page_url.clone()
    } else {
        page_url
            .join(action_attr)
            .map_err(|_| ExtractionError::Malformed {
                element: LOGIN_FORM,
                value: action_attr.to_string(),
            })?
    };
    let method = form.value().attr("method").unwrap_or("get").to_uppercase();

    let mut fields = Vec::new();
    let mut submit_taken = false;
    for control in form.select(&control_sel) {
        let el = control.value();
        let Some(name) = el.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if el.attr("disabled").is_some() {
            continue;
        }

        let value = match el.name() {
            "select" => {
                let options: Vec<_> = control.select(&option_sel).collect();
                let chosen = options
                    .iter()
                    .find(|o| o.value().attr("selected").is_some())
                    .or_else(|| options.first());
                match chosen {
                    Some(o) => o
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| super::inline_text(*o)),
                    None => continue,
                }
            }
            "textarea" => control.text().collect::<String>(),
            _ => {
                let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
                match kind.as_str() {
                    "checkbox" | "radio" if el.attr("checked").is_none() => continue,
                    "checkbox" | "radio" => el.attr("value").unwrap_or("on").to_string(),
                    "submit" | "image" => {
                        if submit_taken {
                            continue;
                        }
                        submit_taken = true;
                        el.attr("value").unwrap_or("").to_string()
                    }
                    "button" | "reset" | "file" => continue,
                    _ => el.attr("value").unwrap_or("").to_string(),
                }
            }
        };
        fields.push((name.to_string(), value));
    }

    Ok(LoginForm {
        action: action.to_string(),
        method,
        fields,
    })
}
