//! Decoding of the two embedding files
//!
//! - vectors: safetensors bundle with `user_embeddings [U×D]`,
//!   `item_embeddings [I×D]`, optional `user_biases [U]`, `item_biases [I]`
//! - mapping: JSON `{ "user_ids": [...], "item_ids": [...] }` giving row order

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array1, Array2};
use safetensors::tensor::TensorView;
use safetensors::{Dtype, SafeTensors};
use serde::Deserialize;
use std::path::Path;

use super::table::EmbeddingTable;
use crate::catalog::canonical_json_id;

pub const USER_EMBEDDINGS: &str = "user_embeddings";
pub const ITEM_EMBEDDINGS: &str = "item_embeddings";
pub const USER_BIASES: &str = "user_biases";
pub const ITEM_BIASES: &str = "item_biases";

/// Mapping document schema. Ids may be JSON numbers or strings.
#[derive(Debug, Deserialize)]
struct MappingDocument {
    user_ids: Vec<serde_json::Value>,
    item_ids: Vec<serde_json::Value>,
}

pub(super) fn read_table(vectors_path: &Path, mapping_path: &Path) -> Result<EmbeddingTable> {
    let (user_ids, item_ids) = read_mapping(mapping_path)?;

    let bytes = std::fs::read(vectors_path)
        .with_context(|| format!("Failed to read {}", vectors_path.display()))?;
    let tensors = SafeTensors::deserialize(&bytes)
        .map_err(|e| anyhow!("Invalid safetensors file {}: {:?}", vectors_path.display(), e))?;

    let user_vectors = read_matrix(&tensors, USER_EMBEDDINGS)?;
    let item_vectors = read_matrix(&tensors, ITEM_EMBEDDINGS)?;
    let user_bias = read_optional_vector(&tensors, USER_BIASES)?;
    let item_bias = read_optional_vector(&tensors, ITEM_BIASES)?;

    EmbeddingTable::new(
        user_ids,
        item_ids,
        user_vectors,
        item_vectors,
        user_bias,
        item_bias,
    )
}

fn read_mapping(path: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: MappingDocument = serde_json::from_str(&content)
        .with_context(|| format!("Invalid mapping document {}", path.display()))?;

    let canonical = |kind: &str, values: &[serde_json::Value]| -> Result<Vec<String>> {
        values
            .iter()
            .enumerate()
            .map(|(pos, v)| {
                canonical_json_id(v)
                    .ok_or_else(|| anyhow!("{kind}_ids[{pos}] is not a number or string: {v}"))
            })
            .collect()
    };

    Ok((canonical("user", &doc.user_ids)?, canonical("item", &doc.item_ids)?))
}

fn read_matrix(tensors: &SafeTensors<'_>, name: &str) -> Result<Array2<f64>> {
    let view = tensors
        .tensor(name)
        .map_err(|e| anyhow!("tensor {name}: {:?}", e))?;
    let shape = view.shape().to_vec();
    if shape.len() != 2 {
        bail!("tensor {name} must be 2-dimensional, got shape {shape:?}");
    }
    let values = tensor_values(&view, name)?;
    Array2::from_shape_vec((shape[0], shape[1]), values)
        .with_context(|| format!("tensor {name} has inconsistent shape"))
}

fn read_optional_vector(tensors: &SafeTensors<'_>, name: &str) -> Result<Option<Array1<f64>>> {
    if !tensors.names().iter().any(|n| *n == name) {
        return Ok(None);
    }
    let view = tensors
        .tensor(name)
        .map_err(|e| anyhow!("tensor {name}: {:?}", e))?;
    if view.shape().len() != 1 {
        bail!("tensor {name} must be 1-dimensional, got shape {:?}", view.shape());
    }
    Ok(Some(Array1::from_vec(tensor_values(&view, name)?)))
}

/// Little-endian F32 or F64 payload, widened to f64
fn tensor_values(view: &TensorView<'_>, name: &str) -> Result<Vec<f64>> {
    let data = view.data();
    match view.dtype() {
        Dtype::F32 => Ok(data
            .chunks_exact(4)
            .map(|c| f64::from(f32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect()),
        Dtype::F64 => Ok(data
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect()),
        other => bail!("tensor {name} has unsupported dtype {other:?}"),
    }
}
