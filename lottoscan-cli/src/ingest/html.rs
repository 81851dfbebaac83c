// Minimal HTML table scanning: enough to pull rows out of a results page
// without a DOM. Tag matching is ASCII case-insensitive and non-nesting.

/// Position of the next `<tag` whose name ends right there (so `<th` skips `<thead`).
fn find_open_tag(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let pat = format!("<{tag}");
    let mut pos = from;
    while let Some(rel) = lc.get(pos..)?.find(&pat) {
        let start = pos + rel;
        match lc.as_bytes().get(start + pat.len()) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') | Some(b'/') => {
                return Some(start)
            }
            _ => pos = start + pat.len(),
        }
    }
    None
}

/// Inner HTML of every `<tag>...</tag>` block in `s`, in document order.
pub fn inner_blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = s.to_ascii_lowercase();
    let close = format!("</{tag}");
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(start) = find_open_tag(&lc, tag, from) {
        let Some(gt) = lc[start..].find('>') else { break };
        let open_end = start + gt + 1;
        let Some(end_rel) = lc[open_end..].find(&close) else { break };
        out.push(&s[open_end..open_end + end_rel]);
        from = open_end + end_rel + close.len();
    }
    out
}

/// Cells of a table row, `<td>` and `<th>` alike, in order.
pub fn row_cells(row: &str) -> Vec<String> {
    let lc = row.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut from = 0;
    loop {
        let td = find_open_tag(&lc, "td", from);
        let th = find_open_tag(&lc, "th", from);
        let (start, close) = match (td, th) {
            (Some(a), Some(b)) if b < a => (b, "</th"),
            (Some(a), _) => (a, "</td"),
            (None, Some(b)) => (b, "</th"),
            (None, None) => break,
        };
        let Some(gt) = lc[start..].find('>') else { break };
        let open_end = start + gt + 1;
        let Some(end_rel) = lc[open_end..].find(close) else { break };
        out.push(strip_tags(&row[open_end..open_end + end_rel]));
        from = open_end + end_rel + close.len();
    }
    out
}

/// Rows of every table in the page, header row of each table dropped.
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    inner_blocks(html, "table")
        .into_iter()
        .flat_map(|table| inner_blocks(table, "tr").into_iter().skip(1).map(row_cells))
        .collect()
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&#36;", "$");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
