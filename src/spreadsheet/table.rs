use crate::helpers::date::month_from_text;
use crate::helpers::date::DATE_FIELDS;
use crate::helpers::string::is_blank;
use crate::helpers::string::normalize_name;
use crate::spreadsheet::payload::value_to_string;
use crate::spreadsheet::payload::RawPayload;
use serde_json::Value;
use std::collections::HashMap;

/// Field the name column is copied into.
pub const NAME_FIELD: &str = "姓名";

/// Headers recognised as the name column by exact match.
const NAME_HEADERS: [&str; 5] = ["姓名", "Name", "name", "員工姓名", "中文姓名"];

/// Row fields consulted for the person name, in lookup order.
const NAME_FIELDS: [&str; 6] = ["name", "姓名", "員工姓名", "中文姓名", "姓名(中文)", "姓名 "];

/// One data row keyed by header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Position-based identity (`row_0`, `row_1`, ...) after blank rows are removed
    pub id: String,
    /// Raw cell text keyed by header, or `col_{n}` for blank headers
    pub values: HashMap<String, String>,
    /// Background colors per cell
    pub bg: Option<Vec<Value>>,
    /// Foreground colors per cell
    pub fc: Option<Vec<Value>>,
    /// Extra per-cell attributes
    pub att: Option<Vec<Value>>,
}

impl Row {
    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Looks up the person name: the known name fields first, then any field
    /// whose header contains `姓名`. Returns an empty string when absent.
    pub fn name(&self) -> String {
        let known = NAME_FIELDS
            .iter()
            .filter_map(|field| self.get(field))
            .map(str::trim)
            .find(|name| !name.is_empty());
        if let Some(name) = known {
            return name.to_owned();
        }
        let mut fields: Vec<(&String, &String)> = self
            .values
            .iter()
            .filter(|(key, _)| key.contains(NAME_FIELD))
            .collect();
        // Stable choice when several headers mention a name.
        fields.sort_by(|left, right| left.0.cmp(right.0));
        fields
            .into_iter()
            .map(|(_, value)| value.trim())
            .find(|name| !name.is_empty())
            .map(str::to_owned)
            .unwrap_or_default()
    }

    /// Returns true if the row belongs to the given (already normalized) employee key.
    pub fn belongs_to(&self, employee_key: &str) -> bool {
        normalize_name(&self.name()) == employee_key
    }

    /// Month of the first date field that parses, scanning the known date fields in order.
    pub fn month(&self) -> Option<u32> {
        DATE_FIELDS
            .iter()
            .filter_map(|field| self.get(field))
            .filter(|value| !value.is_empty())
            .find_map(month_from_text)
    }
}

/// A tab's contents after normalization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Indexes of date-bearing columns
    pub date_cols: Vec<usize>,
    /// ISO dates parallel to `headers`
    pub headers_iso: Vec<String>,
    /// Number of frozen columns on the left
    pub frozen_left: usize,
}

/// Finds the name column: exact header match first, then a header containing
/// `姓名` or equal to `name` in any case.
pub fn find_name_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|header| {
            let header = header.trim();
            !header.is_empty() && NAME_HEADERS.contains(&header)
        })
        .or_else(|| {
            headers.iter().position(|header| {
                let header = header.trim();
                !header.is_empty() && (header.contains(NAME_FIELD) || header.eq_ignore_ascii_case("name"))
            })
        })
}

impl NormalizedTable {
    /// Normalizes a raw tab payload.
    ///
    /// Rows whose cells are all blank across the header span are dropped; the
    /// cells kept in surviving rows are the raw, uncleaned text.
    pub fn parse(payload: &RawPayload) -> Self {
        let headers = payload.header_strings();
        let name_column = find_name_column(&headers);

        let rows = payload
            .rows
            .iter()
            .filter(|row| {
                (0..headers.len()).any(|index| {
                    row.v
                        .get(index)
                        .map(|value| !is_blank(&value_to_string(value)))
                        .unwrap_or(false)
                })
            })
            .enumerate()
            .map(|(index, raw)| {
                let mut values = HashMap::with_capacity(headers.len() + 1);
                for (column, header) in headers.iter().enumerate() {
                    let key = if header.is_empty() {
                        format!("col_{}", column + 1)
                    } else {
                        header.to_owned()
                    };
                    let value = raw.v.get(column).map(value_to_string).unwrap_or_default();
                    values.insert(key, value);
                }
                // Re-read the name from its own column in case another header shadows it.
                // A null cell keeps the value already taken from the headers.
                if let Some(value) = name_column.and_then(|column| raw.v.get(column)).filter(|value| !value.is_null()) {
                    values.insert(NAME_FIELD.to_owned(), value_to_string(value));
                }
                Row {
                    id: format!("row_{index}"),
                    values,
                    bg: raw.bg.to_owned(),
                    fc: raw.fc.to_owned(),
                    att: raw.att.to_owned(),
                }
            })
            .collect();

        NormalizedTable {
            headers,
            rows,
            date_cols: payload.date_cols.to_owned(),
            headers_iso: payload.headers_iso.iter().map(value_to_string).collect(),
            frozen_left: payload.frozen_left,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows belonging to the employee, compared by normalized name.
    pub fn matching_rows(&self, employee: &str) -> Vec<Row> {
        let key = normalize_name(employee);
        self.rows.iter().filter(|row| row.belongs_to(&key)).cloned().collect()
    }

    /// Same table restricted to the given rows.
    pub fn with_rows(&self, rows: Vec<Row>) -> Self {
        NormalizedTable {
            headers: self.headers.to_owned(),
            rows,
            date_cols: self.date_cols.to_owned(),
            headers_iso: self.headers_iso.to_owned(),
            frozen_left: self.frozen_left,
        }
    }

    /// Header of the given column index, if non-empty.
    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str).filter(|header| !header.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RawPayload {
        RawPayload::from_value(&value).expect("payload")
    }

    #[test]
    fn test_parse_drops_blank_rows() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["姓名", "3/1", "3/2"],
            "rows": [
                {"v": ["王小明", "休", ""]},
                {"v": ["", " ", "\u{200B}"]},
                {"v": [null, "\u{00A0}"]},
                {"v": []},
                {"v": ["", "", "", "多出來的欄位"]},
                {"v": ["李大華", "", "特休"]}
            ]
        })));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].id, "row_0");
        assert_eq!(table.rows[1].id, "row_1");
        assert_eq!(table.rows[1].get("3/2"), Some("特休"));
    }

    #[test]
    fn test_parse_keeps_raw_text_and_synthetic_headers() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["姓名", "", "備註"],
            "rows": [{"v": [" 王小明\u{200B}", 8, "  遲到 "], "fc": ["#000"]}]
        })));
        let row = &table.rows[0];
        assert_eq!(row.get("col_2"), Some("8"));
        assert_eq!(row.get("備註"), Some("  遲到 "));
        assert_eq!(row.get("姓名"), Some(" 王小明\u{200B}"));
        assert_eq!(row.fc.as_ref().map(Vec::len), Some(1));
        assert!(row.bg.is_none());
    }

    #[test]
    fn test_parse_tolerates_short_rows() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["姓名", "3/1", "3/2"],
            "rows": [{"v": ["王小明"]}]
        })));
        assert_eq!(table.rows[0].get("3/2"), Some(""));
    }

    #[test]
    fn test_parse_populates_name_from_name_column() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["組別", "員工姓名", "班別"],
            "rows": [{"v": ["A", "王小明", "早"]}]
        })));
        assert_eq!(table.rows[0].get(NAME_FIELD), Some("王小明"));
        assert_eq!(table.rows[0].name(), "王小明");
    }

    #[test]
    fn test_parse_keeps_name_when_name_column_is_null() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["Name", "姓名", "班別"],
            "rows": [{"v": [null, "王小明", "早"]}, {"v": ["Ming", "李大華", "晚"]}]
        })));
        assert_eq!(table.rows[0].get(NAME_FIELD), Some("王小明"));
        assert_eq!(table.rows[1].get(NAME_FIELD), Some("Ming"));
    }

    #[test]
    fn test_find_name_column() {
        let headers = |list: &[&str]| list.iter().map(|it| it.to_string()).collect::<Vec<_>>();
        assert_eq!(find_name_column(&headers(&["日期", "姓名"])), Some(1));
        assert_eq!(find_name_column(&headers(&["姓名(中文)", "Name"])), Some(1));
        assert_eq!(find_name_column(&headers(&["日期", "姓名(中文)"])), Some(1));
        assert_eq!(find_name_column(&headers(&["NAME", "日期"])), Some(0));
        assert_eq!(find_name_column(&headers(&["日期", "工號"])), None);
    }

    #[test]
    fn test_row_name_fallback() {
        let mut row = Row::default();
        row.values.insert("姓名(英文)".to_owned(), "Ming".to_owned());
        assert_eq!(row.name(), "Ming");
        row.values.insert("name".to_owned(), " ".to_owned());
        row.values.insert("中文姓名".to_owned(), "王小明".to_owned());
        assert_eq!(row.name(), "王小明");
        assert_eq!(Row::default().name(), "");
    }

    #[test]
    fn test_row_month() {
        let mut row = Row::default();
        row.values.insert("日期".to_owned(), "無".to_owned());
        row.values.insert("出勤日期".to_owned(), "".to_owned());
        row.values.insert("Date".to_owned(), "2026/3/9".to_owned());
        row.values.insert("date".to_owned(), "4/1".to_owned());
        assert_eq!(row.month(), Some(3));
        assert_eq!(Row::default().month(), None);
    }

    #[test]
    fn test_matching_rows() {
        let table = NormalizedTable::parse(&payload(json!({
            "headers": ["姓名", "3/1"],
            "rows": [
                {"v": ["王小明\u{200B}", "休"]},
                {"v": ["王大明", "休"]},
                {"v": [" 王 小明", "特休"]}
            ]
        })));
        let matched = table.matching_rows("王小明");
        assert_eq!(matched.len(), 2);
        assert_eq!(table.with_rows(matched).headers, table.headers);
    }
}
