//! Shared fixtures: on-disk catalog, embedding bundle and mapping files

#![allow(dead_code)]

use bookwise::catalog::{BookFeature, BookId, FeatureCatalog, UserId};
use bookwise::config::Config;
use bookwise::ledger::Interaction;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

pub fn borrow(user: &str, book: &str, at: DateTime<Utc>) -> Interaction {
    Interaction::borrow(UserId::new(user), BookId::new(book), at)
}

pub fn book(id: &str, author: &str) -> BookFeature {
    BookFeature {
        id: BookId::new(id),
        title: format!("Title {id}"),
        author: Some(author.to_string()),
        publisher: None,
        category1: None,
        category2: None,
    }
}

/// Three-book catalog: B1 and B2 by "A", B3 by "Z"
pub fn abz_catalog() -> FeatureCatalog {
    FeatureCatalog::from_books([book("B1", "A"), book("B2", "A"), book("B3", "Z")])
}

/// Write a catalog CSV with English headers
pub fn write_catalog(dir: &Path, rows: &[[&str; 6]]) -> PathBuf {
    let path = dir.join("item.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer
        .write_record(["book_id", "title", "author", "publisher", "category1", "category2"])
        .unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
    path
}

/// Tensor for `write_vectors`: name, shape, values
pub struct Tensor<'a> {
    pub name: &'a str,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    pub double: bool,
}

impl<'a> Tensor<'a> {
    pub fn f32(name: &'a str, shape: &[usize], values: &[f64]) -> Self {
        Self {
            name,
            shape: shape.to_vec(),
            values: values.to_vec(),
            double: false,
        }
    }

    pub fn f64(name: &'a str, shape: &[usize], values: &[f64]) -> Self {
        Self {
            double: true,
            ..Self::f32(name, shape, values)
        }
    }
}

/// Serialize tensors in safetensors layout: u64 LE header length, JSON
/// header, then the packed little-endian payloads in order.
pub fn safetensors_bytes(tensors: &[Tensor<'_>]) -> Vec<u8> {
    let mut header = serde_json::Map::new();
    let mut data = Vec::new();
    for tensor in tensors {
        let start = data.len();
        for v in &tensor.values {
            if tensor.double {
                data.extend_from_slice(&v.to_le_bytes());
            } else {
                data.extend_from_slice(&(*v as f32).to_le_bytes());
            }
        }
        header.insert(
            tensor.name.to_string(),
            serde_json::json!({
                "dtype": if tensor.double { "F64" } else { "F32" },
                "shape": tensor.shape,
                "data_offsets": [start, data.len()],
            }),
        );
    }

    let mut header = serde_json::to_vec(&serde_json::Value::Object(header)).unwrap();
    while header.len() % 8 != 0 {
        header.push(b' ');
    }

    let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(&header);
    bytes.extend_from_slice(&data);
    bytes
}

pub fn write_vectors(dir: &Path, tensors: &[Tensor<'_>]) -> PathBuf {
    let path = dir.join("model.safetensors");
    std::fs::write(&path, safetensors_bytes(tensors)).unwrap();
    path
}

pub fn write_mapping(dir: &Path, mapping: serde_json::Value) -> PathBuf {
    let path = dir.join("model_mappings.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&mapping).unwrap()).unwrap();
    path
}

/// Config pointing every artifact into `dir`
pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.path = dir.join("item.csv").to_string_lossy().into_owned();
    config.embeddings.vectors_path = dir.join("model.safetensors").to_string_lossy().into_owned();
    config.embeddings.mapping_path = dir
        .join("model_mappings.json")
        .to_string_lossy()
        .into_owned();
    config.ledger.db_path = dir.join("library.db").to_string_lossy().into_owned();
    config
}
