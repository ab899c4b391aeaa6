use crate::extraction::table::is_table_header;
use crate::extraction::PageContent;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Where the fiscal year of a report is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearSource {
    /// File name first, then report content.
    #[default]
    Auto,
    Filename,
    Content,
}

impl fmt::Display for YearSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSource::Auto => write!(f, "auto"),
            YearSource::Filename => write!(f, "filename"),
            YearSource::Content => write!(f, "content"),
        }
    }
}

impl YearSource {
    pub fn from_str_loose(s: &str) -> Option<YearSource> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Some(YearSource::Auto),
            "filename" | "file" | "name" => Some(YearSource::Filename),
            "content" | "text" => Some(YearSource::Content),
            _ => None,
        }
    }
}

static FILENAME_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)((?:19|20)\d{2})(?:\D|$)").expect("valid regex"));

static LABELLED_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:fiscal\s+year|year|fy)\s*[:\-]?\s*((?:19|20)\d{2})\b")
        .expect("valid regex")
});

static DATED_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d{1,2}[/.\-]\d{1,2}[/.\-]((?:19|20)\d{2})|((?:19|20)\d{2})-\d{2}-\d{2})\b")
        .expect("valid regex")
});

static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").expect("valid regex"));

/// Take the year from a report's file stem, e.g. `rooms_2023_q4.pdf` -> 2023.
pub fn year_from_file_name(file_name: &str) -> Option<i32> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    FILENAME_YEAR
        .captures(&stem)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lines above the first table header, i.e. the report's title block.
fn preamble_lines(pages: &[PageContent]) -> Vec<&str> {
    let mut lines = Vec::new();
    for page in pages {
        for line in &page.lines {
            if is_table_header(line) {
                return lines;
            }
            lines.push(line.as_str());
        }
    }
    lines
}

/// Search the report's title block for its year.
///
/// A labelled year ("Fiscal Year: 2023", "FY2023") beats a date, which beats
/// any other year-looking number.
pub fn year_from_content(pages: &[PageContent]) -> Option<i32> {
    let lines = preamble_lines(pages);

    let labelled = lines.iter().find_map(|l| {
        LABELLED_YEAR
            .captures(l)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    });
    let dated = || {
        lines.iter().find_map(|l| {
            DATED_YEAR
                .captures(l)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
                .map(|m| m.as_str().to_string())
        })
    };
    let bare = || {
        lines.iter().find_map(|l| {
            BARE_YEAR
                .captures(l)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
    };

    labelled
        .or_else(dated)
        .or_else(bare)
        .and_then(|y| y.parse().ok())
}

pub fn derive_fiscal_year(
    source: YearSource,
    file_name: &str,
    pages: &[PageContent],
) -> Option<i32> {
    match source {
        YearSource::Filename => year_from_file_name(file_name),
        YearSource::Content => year_from_content(pages),
        YearSource::Auto => {
            year_from_file_name(file_name).or_else(|| year_from_content(pages))
        }
    }
}
