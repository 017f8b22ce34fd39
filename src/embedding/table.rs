//! Latent-factor table: factor matrices, biases, id indexes

use anyhow::{bail, Result};
use ndarray::{Array1, Array2};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Pretrained user/item factors with their id-to-row indexes
///
/// Invariants (checked in `new`): matrix row counts equal index sizes,
/// user and item vectors share one dimensionality, bias lengths match
/// their matrices, every factor and bias is finite.
#[derive(Debug)]
pub struct EmbeddingTable {
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    item_ids: Vec<String>,
    user_vectors: Array2<f64>,
    item_vectors: Array2<f64>,
    user_bias: Option<Array1<f64>>,
    item_bias: Option<Array1<f64>>,
}

impl EmbeddingTable {
    /// Build a table. Ids must already be canonical.
    pub fn new(
        user_ids: Vec<String>,
        item_ids: Vec<String>,
        user_vectors: Array2<f64>,
        item_vectors: Array2<f64>,
        user_bias: Option<Array1<f64>>,
        item_bias: Option<Array1<f64>>,
    ) -> Result<Self> {
        if user_vectors.nrows() != user_ids.len() {
            bail!(
                "user_embeddings has {} rows but mapping lists {} users",
                user_vectors.nrows(),
                user_ids.len()
            );
        }
        if item_vectors.nrows() != item_ids.len() {
            bail!(
                "item_embeddings has {} rows but mapping lists {} items",
                item_vectors.nrows(),
                item_ids.len()
            );
        }
        if user_vectors.ncols() != item_vectors.ncols() {
            bail!(
                "latent dimension mismatch: users {} vs items {}",
                user_vectors.ncols(),
                item_vectors.ncols()
            );
        }
        if let Some(bias) = &user_bias {
            if bias.len() != user_ids.len() {
                bail!("user_biases has {} entries, expected {}", bias.len(), user_ids.len());
            }
        }
        if let Some(bias) = &item_bias {
            if bias.len() != item_ids.len() {
                bail!("item_biases has {} entries, expected {}", bias.len(), item_ids.len());
            }
        }

        ensure_finite("user_embeddings", user_vectors.iter())?;
        ensure_finite("item_embeddings", item_vectors.iter())?;
        if let Some(bias) = &user_bias {
            ensure_finite("user_biases", bias.iter())?;
        }
        if let Some(bias) = &item_bias {
            ensure_finite("item_biases", bias.iter())?;
        }

        let user_index = index_of("user", &user_ids)?;
        let item_index = index_of("item", &item_ids)?;

        Ok(Self {
            user_index,
            item_index,
            item_ids,
            user_vectors,
            item_vectors,
            user_bias,
            item_bias,
        })
    }

    pub fn user_count(&self) -> usize {
        self.user_vectors.nrows()
    }

    pub fn item_count(&self) -> usize {
        self.item_vectors.nrows()
    }

    /// Latent dimensionality shared by users and items
    pub fn dimension(&self) -> usize {
        self.user_vectors.ncols()
    }

    /// dot(user, item) + user bias + item bias
    pub fn score(&self, user_key: &str, item_key: &str) -> Option<f64> {
        let u = *self.user_index.get(user_key)?;
        let i = *self.item_index.get(item_key)?;

        let mut score = self.user_vectors.row(u).dot(&self.item_vectors.row(i));
        if let Some(bias) = &self.user_bias {
            score += bias[u];
        }
        if let Some(bias) = &self.item_bias {
            score += bias[i];
        }
        Some(score)
    }

    /// Top `k` item keys for a user by descending score.
    ///
    /// Selects the k best with a partial sort, then orders only those.
    /// Equal scores keep stored item order.
    pub fn top_items(&self, user_key: &str, k: usize) -> Vec<&str> {
        let Some(&u) = self.user_index.get(user_key) else {
            return Vec::new();
        };
        let take = k.min(self.item_count());
        if take == 0 {
            return Vec::new();
        }

        let mut scores = self.item_vectors.dot(&self.user_vectors.row(u));
        if let Some(bias) = &self.item_bias {
            scores += bias;
        }
        if let Some(bias) = &self.user_bias {
            scores += bias[u];
        }

        let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        let by_score = |a: &(usize, f64), b: &(usize, f64)| -> Ordering {
            b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
        };

        if take < ranked.len() {
            ranked.select_nth_unstable_by(take - 1, by_score);
            ranked.truncate(take);
        }
        ranked.sort_unstable_by(by_score);

        ranked
            .into_iter()
            .map(|(idx, _)| self.item_ids[idx].as_str())
            .collect()
    }
}

fn ensure_finite<'a>(name: &str, values: impl IntoIterator<Item = &'a f64>) -> Result<()> {
    if let Some((pos, value)) = values.into_iter().enumerate().find(|(_, v)| !v.is_finite()) {
        bail!("{name} holds non-finite value {value} at flat index {pos}");
    }
    Ok(())
}

fn index_of(kind: &str, ids: &[String]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(ids.len());
    for (pos, id) in ids.iter().enumerate() {
        if index.insert(id.clone(), pos).is_some() {
            bail!("duplicate {kind} id {id:?} in mapping");
        }
    }
    Ok(index)
}
