//! [`SessionSource`] over a static HTML snapshot, using `scraper`.

use std::collections::HashSet;

use reclink_config::{ColumnMap, ExtractionConfig};
use reclink_protocols::{find_recording_urls, ExtractError, SessionMetadata};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{ButtonInfo, ParsedTable, RowRecord, SessionSource};

/// Attributes that sometimes carry the recording URL directly.
const URL_ATTRIBUTES: [&str; 4] = ["data-url", "data-href", "data-link", "data-recording"];

const WEEK_INPUT: &str = r#"input[disabled][type="text"][class*="form-control"]"#;

pub struct HtmlSessionSource {
    table: Selector,
    row: Selector,
    cell: Selector,
    button: Selector,
    icon: Selector,
    week_input: Selector,
    label: Selector,
    input: Selector,
    anchor: Selector,
    frame: Selector,
    columns: ColumnMap,
    min_cells: usize,
    week_marker: String,
}

impl HtmlSessionSource {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let prefix = config.button_id_prefix.replace('"', "\\\"");
        Ok(Self {
            table: selector(&config.table_selector)?,
            row: selector("tr")?,
            cell: selector("td")?,
            button: selector(&format!(r#"button[id^="{}"]"#, prefix))?,
            icon: selector(&config.available_icon_selector)?,
            week_input: selector(WEEK_INPUT)?,
            label: selector("label")?,
            input: selector("input")?,
            anchor: selector("a[href]")?,
            frame: selector("iframe[src]")?,
            columns: config.columns.clone(),
            min_cells: config.min_cells,
            week_marker: config.week_marker.clone(),
        })
    }

    fn pick_table<'a>(&self, html: &'a Html) -> Option<ElementRef<'a>> {
        let mut tables = html.select(&self.table).peekable();
        let first = *tables.peek()?;
        let with_rows = tables.find(|table| {
            table
                .select(&self.row)
                .any(|row| row.select(&self.cell).count() >= self.min_cells)
        });
        Some(with_rows.unwrap_or(first))
    }

    fn parse_row(&self, row: usize, element: ElementRef<'_>) -> Result<RowRecord, ExtractError> {
        let cells: Vec<String> = element.select(&self.cell).map(cell_text).collect();
        let column = |index: i32| {
            ColumnMap::resolve(index, cells.len())
                .map(|i| cells[i].clone())
                .unwrap_or_default()
        };

        let metadata = SessionMetadata {
            course: column(self.columns.course),
            section: column(self.columns.section),
            date: column(self.columns.date),
            start_time: column(self.columns.start_time),
            instructor: column(self.columns.instructor),
            session_type: column(self.columns.session_type),
            status: column(self.columns.status),
            modality: column(self.columns.modality),
            week: None,
            button_id: None,
        };
        if metadata.course.is_empty() {
            return Err(ExtractError::Row {
                row,
                message: "missing course".to_string(),
            });
        }

        let button = element.select(&self.button).next().map(|b| self.inspect_button(b));
        Ok(RowRecord {
            row,
            metadata: SessionMetadata {
                button_id: button.as_ref().map(|b| b.id.clone()),
                ..metadata
            },
            button,
        })
    }

    fn inspect_button(&self, button: ElementRef<'_>) -> ButtonInfo {
        let el = button.value();
        let disabled_class = el
            .attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == "disabled"));
        let enabled = el.attr("disabled").is_none() && !disabled_class;
        let marked = button.select(&self.icon).next().is_some();

        let mut hints: Vec<String> = el.attr("onclick").map(str::to_string).into_iter().collect();
        hints.extend(URL_ATTRIBUTES.iter().filter_map(|a| el.attr(a)).map(str::to_string));
        let enclosing_href = button
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "a")
            .and_then(|a| a.value().attr("href"));
        if let Some(href) = enclosing_href {
            hints.push(href.to_string());
        }

        let id = el.attr("id").unwrap_or_default().to_string();
        debug!(
            "Button {}: enabled={} marked={} hints={}",
            id,
            enabled,
            marked,
            hints.len()
        );
        ButtonInfo {
            id,
            enabled,
            marked,
            hints,
        }
    }

    fn week(&self, html: &Html) -> Option<u32> {
        let from_input = html
            .select(&self.week_input)
            .filter_map(|i| i.value().attr("value"))
            .find_map(leading_number);
        if from_input.is_some() {
            return from_input;
        }

        html.select(&self.label)
            .filter(|label| label.text().collect::<String>().contains(&self.week_marker))
            .filter_map(|label| label.parent().and_then(ElementRef::wrap))
            .filter_map(|parent| parent.select(&self.input).next())
            .filter_map(|input| input.value().attr("value"))
            .find_map(leading_number)
    }
}

impl SessionSource for HtmlSessionSource {
    fn parse(&self, document: &str) -> Result<ParsedTable, ExtractError> {
        let html = Html::parse_document(document);
        let table = self.pick_table(&html).ok_or(ExtractError::TableNotFound)?;

        let rows = table
            .select(&self.row)
            .enumerate()
            .filter(|(_, row)| row.select(&self.cell).count() >= self.min_cells)
            .map(|(index, row)| self.parse_row(index, row))
            .collect();

        Ok(ParsedTable {
            week: self.week(&html),
            rows,
        })
    }

    fn candidate_urls(&self, document: &str) -> Vec<String> {
        let html = Html::parse_document(document);
        let mut seen = HashSet::new();
        let links = html
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .chain(html.select(&self.frame).filter_map(|f| f.value().attr("src")))
            .map(str::to_string);
        let text: String = html.root_element().text().collect::<Vec<_>>().join(" ");

        links
            .chain(find_recording_urls(&text))
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Page(format!("invalid selector '{}': {:?}", css, e)))
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Leading decimal digits of `value`, like a lenient integer parse.
fn leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
