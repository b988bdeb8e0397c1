//! Lenient catalog parser
//!
//! Format: one record per line, `id,year,tags` where `tags` is a
//! semicolon-separated list. An optional header row is recognised on the
//! first line. Malformed rows are dropped, never defaulted; the parser never
//! fails on an individual line.

use std::collections::HashSet;

use tracing::debug;

use super::MetaRecord;

/// Normalise a tag: lowercase, keep ASCII letters and digits only
///
/// `" Open-World! "` becomes `"openworld"`; `"---"` becomes `""`.
pub fn normalize_tag(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Parse a whole catalog document into records
///
/// Handles `\n` and `\r\n` line endings, skips blank lines and a header on
/// the first line, and drops rows whose id is missing, non-integer or zero.
/// Later rows repeating an id already seen are dropped as well.
pub fn parse_catalog(text: &str) -> Vec<MetaRecord> {
    let mut records = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if index == 0 && is_header(line) {
            debug!("Skipping catalog header: {}", line);
            continue;
        }

        let Some(record) = parse_row(line) else {
            debug!("Dropping malformed catalog row {}: {:?}", index + 1, line);
            continue;
        };

        if !seen_ids.insert(record.id) {
            debug!("Dropping duplicate id {} on catalog row {}", record.id, index + 1);
            continue;
        }

        records.push(record);
    }

    records
}

/// A header names its columns: the first field is not a number, and the
/// line mentions both `id` and `year`
fn is_header(line: &str) -> bool {
    let first = line.split(',').next().unwrap_or_default().trim();
    if first.parse::<i64>().is_ok() {
        return false;
    }
    let lower = line.to_ascii_lowercase();
    lower.contains("id") && lower.contains("year")
}

fn parse_row(line: &str) -> Option<MetaRecord> {
    let mut fields = line.split(',');

    let id = fields
        .next()
        .map(str::trim)
        .and_then(|f| f.parse::<u64>().ok())
        .filter(|id| *id > 0)?;

    let year = fields
        .next()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .and_then(|f| f.parse::<i32>().ok());

    let tags = fields.next().map(parse_tags).unwrap_or_default();

    Some(MetaRecord { id, year, tags })
}

fn parse_tags(field: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in field.split(';').map(normalize_tag) {
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag_strips_punctuation_and_case() {
        assert_eq!(normalize_tag(" Open-World! "), "openworld");
        assert_eq!(normalize_tag("Rogue-Lite 2"), "roguelite2");
        assert_eq!(normalize_tag("---"), "");
        assert_eq!(normalize_tag("Café"), "caf");
    }

    #[test]
    fn test_header_row_is_skipped() {
        let records = parse_catalog("AppID,Year,Tags\n10,2000,Action\n");
        assert_eq!(records, vec![MetaRecord::new(10, Some(2000), vec!["action".into()])]);
    }

    #[test]
    fn test_header_detection_is_case_insensitive() {
        let records = parse_catalog("appid,YEAR,tags\n20,,\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 20);
    }

    #[test]
    fn test_first_data_line_without_header_tokens_is_kept() {
        let records = parse_catalog("30,2011,Indie\n40,2012,\n");
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![30, 40]);
    }

    #[test]
    fn test_numeric_first_row_with_header_words_in_tags_is_kept() {
        let records = parse_catalog("10,2000,Valid;Yearly\n11,2001,\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 10);
        assert_eq!(records[0].tags, vec!["valid".to_string(), "yearly".to_string()]);
    }

    #[test]
    fn test_header_only_checked_on_first_line() {
        // A later line with header tokens is just a malformed row
        let records = parse_catalog("50,2001,\nAppID,Year,Tags\n60,2002,\n");
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![50, 60]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let records = parse_catalog("AppID,Year,Tags\r\n\r\n70,1999,RPG\r\n   \r\n80,,\r\n");
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![70, 80]);
        assert_eq!(records[0].tags, vec!["rpg".to_string()]);
    }

    #[test]
    fn test_rows_with_bad_ids_are_dropped() {
        let text = "abc,2000,x\n,2001,y\n-5,2002,z\n0,2003,w\n12abc,2004,v\n90,2005,u\n";
        let records = parse_catalog(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 90);
    }

    #[test]
    fn test_year_absent_when_missing_or_unparseable() {
        let records = parse_catalog("1\n2,\n3,soon\n4, 2019 ,\n");
        let years: Vec<Option<i32>> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![None, None, None, Some(2019)]);
    }

    #[test]
    fn test_tags_are_normalized_and_empties_dropped() {
        let records = parse_catalog("5,2020, Open-World! ;---;;Co-op;open world\n");
        assert_eq!(records[0].tags, vec!["openworld".to_string(), "coop".to_string()]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let records = parse_catalog("6,2021,Puzzle,unexpected,columns\n");
        assert_eq!(records, vec![MetaRecord::new(6, Some(2021), vec!["puzzle".into()])]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        let records = parse_catalog("7,2001,a\n7,2002,b\n8,,\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, Some(2001));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_catalog("").is_empty());
        assert!(parse_catalog("\n\r\n").is_empty());
        assert!(parse_catalog("AppID,Year,Tags").is_empty());
    }
}
