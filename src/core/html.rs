//! Extraction of the page fragments the client cares about.
//!
//! `scraper::Html` is not `Send`, so every function here parses, extracts
//! owned data and drops the document before returning.

use crate::domain::model::Field;
use crate::utils::error::{ClientError, Result};
use scraper::{Html, Selector};

pub const DASHBOARD_SELECTOR: &str = ".dashboard-box";
pub const STAT_SELECTOR: &str = ".stat-card .fs-2";
pub const RESULTS_SELECTOR: &str = ".table-responsive";
pub const EXPORT_LINK_SELECTOR: &str = r#"a[href*="export"]"#;
pub const FORM_SELECTOR: &str = "form";
pub const SEARCH_INPUT_SELECTOR: &str = r#"input[name="ad_soyad"]"#;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ClientError::SelectorError {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

fn input_selector(field: Field) -> Result<Selector> {
    selector(&format!(r#"input[name="{}"]"#, field.input_name()))
}

/// What a freshly loaded page looks like to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub has_dashboard: bool,
    pub has_form: bool,
    pub has_search_field: bool,
    pub stats: Vec<String>,
    pub results_html: Option<String>,
    pub export_links: Vec<String>,
    pub identity_value: Option<String>,
    pub phone_value: Option<String>,
}

pub fn snapshot(html: &str) -> Result<PageSnapshot> {
    let document = Html::parse_document(html);

    let has_dashboard = document.select(&selector(DASHBOARD_SELECTOR)?).next().is_some();
    let has_form = document.select(&selector(FORM_SELECTOR)?).next().is_some();
    let has_search_field = document
        .select(&selector(SEARCH_INPUT_SELECTOR)?)
        .next()
        .is_some();
    let stats = collect_stats(&document)?;
    let results_html = collect_results(&document)?;

    let export_links = document
        .select(&selector(EXPORT_LINK_SELECTOR)?)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    let identity_value = document
        .select(&input_selector(Field::IdentityNumber)?)
        .next()
        .map(|input| input.value().attr("value").unwrap_or_default().to_string());
    let phone_value = document
        .select(&input_selector(Field::Phone)?)
        .next()
        .map(|input| input.value().attr("value").unwrap_or_default().to_string());

    Ok(PageSnapshot {
        has_dashboard,
        has_form,
        has_search_field,
        stats,
        results_html,
        export_links,
        identity_value,
        phone_value,
    })
}

/// Text content of every `.stat-card .fs-2` node, in document order.
pub fn extract_stats(html: &str) -> Result<Vec<String>> {
    collect_stats(&Html::parse_document(html))
}

/// Inner markup of the first `.table-responsive` container, if any.
pub fn extract_results(html: &str) -> Result<Option<String>> {
    collect_results(&Html::parse_document(html))
}

fn collect_stats(document: &Html) -> Result<Vec<String>> {
    Ok(document
        .select(&selector(STAT_SELECTOR)?)
        .map(|node| node.text().collect::<String>())
        .collect())
}

fn collect_results(document: &Html) -> Result<Option<String>> {
    Ok(document
        .select(&selector(RESULTS_SELECTOR)?)
        .next()
        .map(|container| container.inner_html()))
}
