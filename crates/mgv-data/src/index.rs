// SPDX-License-Identifier: Apache-2.0

use mgv_model::Feature;
use std::collections::HashMap;
use std::sync::Arc;

/// The three lookup tables over registered features.
///
/// Cluster-id and symbol buckets are append-only and keep registration order.
/// Symbols are keyed lowercase.
#[derive(Debug, Default)]
pub struct FeatureIndex {
    id2feat: HashMap<String, Arc<Feature>>,
    cid2feats: HashMap<String, Vec<Arc<Feature>>>,
    symbol2feats: HashMap<String, Vec<Arc<Feature>>>,
}

impl FeatureIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: &Arc<Feature>) {
        self.id2feat
            .insert(feature.id().to_string(), Arc::clone(feature));
        if let Some(cid) = feature.cid() {
            self.cid2feats
                .entry(cid.to_string())
                .or_default()
                .push(Arc::clone(feature));
        }
        if let Some(symbol) = feature.symbol() {
            self.symbol2feats
                .entry(symbol.to_lowercase())
                .or_default()
                .push(Arc::clone(feature));
        }
    }

    /// Moves every entry of `other` in, keeping `other`'s bucket order after ours.
    pub fn merge(&mut self, other: Self) {
        self.id2feat.extend(other.id2feat);
        for (cid, feats) in other.cid2feats {
            self.cid2feats.entry(cid).or_default().extend(feats);
        }
        for (symbol, feats) in other.symbol2feats {
            self.symbol2feats.entry(symbol).or_default().extend(feats);
        }
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Arc<Feature>> {
        self.id2feat.get(id)
    }

    #[must_use]
    pub fn by_cid(&self, cid: &str) -> &[Arc<Feature>] {
        self.cid2feats.get(cid).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> &[Arc<Feature>] {
        self.symbol2feats
            .get(&symbol.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// ID match first, then cluster id, then symbol.
    #[must_use]
    pub fn by_value(&self, value: &str) -> Vec<Arc<Feature>> {
        if let Some(f) = self.by_id(value) {
            return vec![Arc::clone(f)];
        }
        let by_cid = self.by_cid(value);
        if !by_cid.is_empty() {
            return by_cid.to_vec();
        }
        self.by_symbol(value).to_vec()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.id2feat.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id2feat.is_empty()
    }
}
