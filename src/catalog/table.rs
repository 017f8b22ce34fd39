//! Catalog table parsing
//!
//! One row per book. Headers are matched by name; the library export uses
//! Chinese column names, hand-written fixtures usually use English ones.

use anyhow::{anyhow, bail, Context, Result};
use std::io::Read;
use std::path::Path;

use super::{BookFeature, BookId, FeatureCatalog};

const BOOK_ID: &[&str] = &["book_id"];
const TITLE: &[&str] = &["题名", "title"];
const AUTHOR: &[&str] = &["作者", "author"];
const PUBLISHER: &[&str] = &["出版社", "publisher", "press"];
const CATEGORY1: &[&str] = &["一级分类", "category1", "category_level1"];
const CATEGORY2: &[&str] = &["二级分类", "category2", "category_level2"];

/// Column positions resolved from the header row
struct Columns {
    book_id: usize,
    title: usize,
    author: usize,
    publisher: usize,
    category1: usize,
    category2: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |aliases: &[&str]| -> Result<usize> {
            headers
                .iter()
                .position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
                .ok_or_else(|| anyhow!("missing column, expected one of {:?}", aliases))
        };

        Ok(Self {
            book_id: find(BOOK_ID)?,
            title: find(TITLE)?,
            author: find(AUTHOR)?,
            publisher: find(PUBLISHER)?,
            category1: find(CATEGORY1)?,
            category2: find(CATEGORY2)?,
        })
    }
}

pub(super) fn read_catalog(path: &Path) -> Result<FeatureCatalog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open catalog {}", path.display()))?;
    parse_catalog(file)
}

/// Parse a catalog table from any reader
pub(crate) fn parse_catalog<R: Read>(reader: R) -> Result<FeatureCatalog> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read catalog header")?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut books = Vec::new();
    for (row, record) in reader.records().enumerate() {
        // Header is line 1
        let line = row + 2;
        let record = record.with_context(|| format!("Failed to read catalog line {line}"))?;

        let raw_id = record.get(columns.book_id).unwrap_or("");
        if raw_id.is_empty() {
            bail!("empty book_id on catalog line {line}");
        }

        let cell = |idx: usize| -> Option<String> {
            record
                .get(idx)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
                .map(str::to_string)
        };

        books.push(BookFeature {
            id: BookId::new(raw_id),
            title: cell(columns.title).unwrap_or_default(),
            author: cell(columns.author),
            publisher: cell(columns.publisher),
            category1: cell(columns.category1),
            category2: cell(columns.category2),
        });
    }

    Ok(FeatureCatalog::from_books(books))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chinese_headers() {
        let data = "book_id,题名,作者,出版社,一级分类,二级分类\n\
                    1001.0,机器学习,周志华,清华大学出版社,计算机科学,人工智能\n\
                    1002,反杜林论,恩格斯,人民出版社,马克思主义,\n";

        let catalog = parse_catalog(data.as_bytes()).unwrap();

        assert_eq!(catalog.len(), 2);
        let first = catalog.get(&BookId::new("1001")).unwrap();
        assert_eq!(first.title, "机器学习");
        assert_eq!(first.author.as_deref(), Some("周志华"));
        assert_eq!(first.category2.as_deref(), Some("人工智能"));

        let second = catalog.get(&BookId::new("1002")).unwrap();
        assert_eq!(second.category2, None);
    }

    #[test]
    fn test_parse_english_headers_any_order() {
        let data = "title,book_id,author,publisher,category2,category1\n\
                    Dune,7,Herbert,Chilton,SF,Fiction\n";

        let catalog = parse_catalog(data.as_bytes()).unwrap();
        let dune = catalog.get(&BookId::new("7")).unwrap();
        assert_eq!(dune.category1.as_deref(), Some("Fiction"));
        assert_eq!(dune.category2.as_deref(), Some("SF"));
    }

    #[test]
    fn test_nan_cells_are_absent() {
        let data = "book_id,title,author,publisher,category1,category2\n\
                    1,T,NaN,P,nan,\n";

        let catalog = parse_catalog(data.as_bytes()).unwrap();
        let book = catalog.get(&BookId::new("1")).unwrap();
        assert_eq!(book.author, None);
        assert_eq!(book.category1, None);
        assert_eq!(book.publisher.as_deref(), Some("P"));
    }

    #[test]
    fn test_missing_column_is_error() {
        let data = "book_id,title,author\n1,T,A\n";
        let err = parse_catalog(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("publisher"));
    }

    #[test]
    fn test_empty_id_is_error() {
        let data = "book_id,title,author,publisher,category1,category2\n\
                    ,T,A,P,C1,C2\n";
        assert!(parse_catalog(data.as_bytes()).is_err());
    }
}
