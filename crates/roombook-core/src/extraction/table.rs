use crate::extraction::PageContent;

/// Reconstruct table data from pdftotext -layout output.
///
/// pdftotext -layout preserves column alignment using spaces. A table starts
/// at a header line; column spans come from the header cells and every text
/// segment below is assigned to the column it overlaps most.
const HEADER_KEYWORDS: &[&str] = &["room", "month", "arrival", "night", "revenue", "adr"];

/// A run of text separated from its neighbours by 2+ spaces.
///
/// `start` and `end` are character columns, not byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub line_index: usize,
    /// One cell per header column, empty when nothing lined up with it.
    pub cells: Vec<String>,
    pub raw: String,
}

/// A table region of one page, split into columns.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub page_number: usize,
    pub header_line: usize,
    pub headers: Vec<String>,
    pub columns: ColumnMap,
    pub rows: Vec<TableRow>,
}

/// Which header column holds which field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub room: usize,
    pub month: usize,
    pub nights: usize,
    pub revenue: usize,
    pub arrivals: Option<usize>,
    pub adr: Option<usize>,
}

/// Map header cells to fields. Returns None unless the room, month, nights
/// and revenue columns are all present, each in a cell of its own.
pub fn map_columns<S: AsRef<str>>(headers: &[S]) -> Option<ColumnMap> {
    let mut room = None;
    let mut month = None;
    let mut nights = None;
    let mut revenue = None;
    let mut arrivals = None;
    let mut adr = None;

    for (i, header) in headers.iter().enumerate() {
        let lower = header.as_ref().to_lowercase();
        // "Room Nights" and "Room Revenue" also say "room", so test those first
        let slot = if lower.contains("adr") || lower.contains("average") || lower.contains("rate") {
            &mut adr
        } else if lower.contains("revenue") {
            &mut revenue
        } else if lower.contains("night") {
            &mut nights
        } else if lower.contains("arrival") {
            &mut arrivals
        } else if lower.contains("month") {
            &mut month
        } else if lower.contains("room") {
            &mut room
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(i);
        }
    }

    Some(ColumnMap {
        room: room?,
        month: month?,
        nights: nights?,
        revenue: revenue?,
        arrivals,
        adr,
    })
}

/// Header segments and their column map, if `line` is a room table header.
fn header_columns(line: &str) -> Option<(Vec<Segment<'_>>, ColumnMap)> {
    let segments = split_segments(line);
    if segments.len() < 3 {
        return None;
    }
    let lower = line.to_lowercase();
    let keywords = HEADER_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    if keywords < 2 {
        return None;
    }
    let texts: Vec<&str> = segments.iter().map(|s| s.text).collect();
    let columns = map_columns(&texts)?;
    Some((segments, columns))
}

/// Detect if a line is a room table header row.
///
/// Title lines can carry the same words ("Room Revenue Report"), so the line
/// only counts when room, month, nights and revenue sit in separate cells.
pub fn is_table_header(line: &str) -> bool {
    header_columns(line).is_some()
}

fn is_table_footer(trimmed: &str) -> bool {
    let lower = trimmed.to_lowercase();
    lower.starts_with("page ")
        || lower.starts_with("printed")
        || lower.starts_with("end of report")
        || trimmed.starts_with("---")
}

/// Split a line by gaps of 2+ whitespace characters, keeping column positions.
pub fn split_segments(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start: Option<(usize, usize)> = None;
    let mut last_byte_end = 0;
    let mut last_col_end = 0;
    let mut space_count = 0;

    for (col, (i, c)) in line.char_indices().enumerate() {
        if c.is_whitespace() {
            space_count += 1;
            if space_count == 2 {
                if let Some((byte_start, col_start)) = start.take() {
                    segments.push(Segment {
                        start: col_start,
                        end: last_col_end,
                        text: &line[byte_start..last_byte_end],
                    });
                }
            }
        } else {
            if start.is_none() {
                start = Some((i, col));
            }
            space_count = 0;
            last_byte_end = i + c.len_utf8();
            last_col_end = col + 1;
        }
    }

    if let Some((byte_start, col_start)) = start {
        segments.push(Segment {
            start: col_start,
            end: last_col_end,
            text: &line[byte_start..last_byte_end],
        });
    }

    segments
}

/// Pick the header column a segment belongs to: the largest overlap wins,
/// otherwise the column whose centre is closest.
fn assign_column(segment: &Segment<'_>, headers: &[Segment<'_>]) -> usize {
    let overlap = |h: &Segment<'_>| {
        let lo = segment.start.max(h.start);
        let hi = segment.end.min(h.end);
        hi.saturating_sub(lo)
    };

    let best = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (i, overlap(h)))
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)));
    if let Some((i, o)) = best {
        if o > 0 {
            return i;
        }
    }

    let centre = (segment.start + segment.end) as i64;
    headers
        .iter()
        .enumerate()
        .min_by_key(|(_, h)| (centre - (h.start + h.end) as i64).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn split_row(line: &str, headers: &[Segment<'_>]) -> Vec<String> {
    let mut cells = vec![String::new(); headers.len()];
    for segment in split_segments(line) {
        let cell = &mut cells[assign_column(&segment, headers)];
        if !cell.is_empty() {
            cell.push(' ');
        }
        cell.push_str(segment.text);
    }
    cells
}

/// Find the table regions of every page and split their lines into columns.
///
/// A region runs from a header line to a footer line, the next header, or
/// the end of the page. Blank lines inside a region are skipped.
pub fn extract_tables(pages: &[PageContent]) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();

    for page in pages {
        let mut current: Option<(ExtractedTable, Vec<Segment<'_>>)> = None;

        for (i, line) in page.lines.iter().enumerate() {
            if let Some((header_segments, columns)) = header_columns(line) {
                if let Some((table, _)) = current.take() {
                    tables.push(table);
                }
                let table = ExtractedTable {
                    page_number: page.page_number,
                    header_line: i,
                    headers: header_segments.iter().map(|s| s.text.to_string()).collect(),
                    columns,
                    rows: Vec::new(),
                };
                current = Some((table, header_segments));
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if is_table_footer(trimmed) {
                if let Some((table, _)) = current.take() {
                    tables.push(table);
                }
                continue;
            }

            if let Some((table, header_segments)) = current.as_mut() {
                table.rows.push(TableRow {
                    line_index: i,
                    cells: split_row(line, header_segments),
                    raw: trimmed.to_string(),
                });
            }
        }

        if let Some((table, _)) = current.take() {
            tables.push(table);
        }
    }

    tables
}
