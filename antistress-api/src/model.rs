//! Trained classifier artifact
//!
//! The artifact is a JSON-serialized decision-tree ensemble exported from the
//! training environment:
//!
//! ```json
//! {
//!   "n_features": 10,
//!   "classes": [0, 1, 2],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 10.5, "left": 1, "right": 2 },
//!         { "value": [8.0, 2.0, 0.0] },
//!         { "value": [0.0, 3.0, 9.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Split nodes send a sample left when `x[feature] <= threshold`. Leaves hold
//! per-class weights aligned with `classes`. Node 0 is the root and children
//! always come after their parent.

use antistress_common::features::{FeatureVector, FEATURE_COUNT};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Classifier failures
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact missing, unreadable or malformed
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    /// Classifier produced an index outside the known classes
    #[error("Invalid class index: {0}")]
    InvalidClassIndex(i64),
}

/// Opaque classifier: feature vector in, class index out
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn leaf(&self, x: &[f64; FEATURE_COUNT]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }

    fn check(&self, tree: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!(
                            "tree {} node {} splits on feature {} (only {} features)",
                            tree, index, feature, FEATURE_COUNT
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("tree {} node {} has a non-finite threshold", tree, index));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!(
                                "tree {} node {} has invalid child {}",
                                tree, index, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "tree {} leaf {} has {} class weights, expected {}",
                            tree,
                            index,
                            value.len(),
                            n_classes
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Artifact as read from disk, before the structural checks
#[derive(Deserialize)]
struct RawForest {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
}

/// Decision-tree ensemble predicting by averaged leaf class probabilities
///
/// Deserializing always runs the artifact checks, so tree walks never index
/// out of bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawForest")]
pub struct ForestClassifier {
    n_features: usize,
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
}

impl TryFrom<RawForest> for ForestClassifier {
    type Error = String;

    fn try_from(raw: RawForest) -> Result<Self, String> {
        let forest = ForestClassifier {
            n_features: raw.n_features,
            classes: raw.classes,
            trees: raw.trees,
        };
        forest.check()?;
        Ok(forest)
    }
}

impl ForestClassifier {
    /// Load and check the artifact at `path`
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let forest = Self::from_json(&content)
            .map_err(|e| ModelError::Unavailable(format!("{}: {}", path.display(), e)))?;
        info!(
            "Loaded classifier from {} ({} trees, {} classes)",
            path.display(),
            forest.trees.len(),
            forest.classes.len()
        );
        Ok(forest)
    }

    /// Parse and check an artifact held in memory
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str(content).map_err(|e| format!("malformed artifact: {}", e))
    }

    fn check(&self) -> Result<(), String> {
        if self.n_features != FEATURE_COUNT {
            return Err(format!(
                "artifact expects {} features, service provides {}",
                self.n_features, FEATURE_COUNT
            ));
        }
        if self.classes.is_empty() {
            return Err("artifact declares no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("artifact contains no trees".to_string());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.check(index, self.classes.len())?;
        }
        Ok(())
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for ForestClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError> {
        let x = features.to_f64();
        let mut votes = vec![0.0_f64; self.classes.len()];

        for tree in &self.trees {
            let leaf = tree.leaf(&x);
            let total: f64 = leaf.iter().sum();
            if total <= 0.0 {
                continue;
            }
            for (vote, weight) in votes.iter_mut().zip(leaf) {
                *vote += weight / total;
            }
        }

        // First maximum wins ties
        let mut best = 0;
        for (index, vote) in votes.iter().enumerate() {
            if *vote > votes[best] {
                best = index;
            }
        }
        Ok(self.classes[best])
    }
}
