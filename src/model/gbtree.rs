//! Boosted-Tree Classifier Module
//!
//! Loads a gradient-boosted decision-tree ensemble from the XGBoost JSON
//! model format and scores single feature rows. Only what the serving path
//! needs is implemented: document parsing with validation, per-class margin
//! accumulation, and the softmax link for `multi:` objectives.
//!
//! Format notes (stable across XGBoost 1.x/2.x JSON models):
//! - each tree is a set of parallel arrays indexed by node id
//! - a node is a leaf when its left child is -1, and leaf values are stored
//!   in `split_conditions`
//! - `tree_info[i]` is the class group tree `i` contributes to
//! - numeric learner parameters (`num_class`, `base_score`, ...) are
//!   string-encoded

use std::path::Path;

use serde::Deserialize;

use crate::error::{CropStressError, Result};

/// Raw model document, as serialized by `XGBClassifier.save_model(...)`.
/// Unknown fields (feature names, version, attributes) are ignored.
#[derive(Debug, Deserialize)]
struct ModelDoc {
    learner: LearnerDoc,
}

#[derive(Debug, Deserialize)]
struct LearnerDoc {
    gradient_booster: GradientBoosterDoc,
    learner_model_param: LearnerModelParamDoc,
    objective: ObjectiveDoc,
}

#[derive(Debug, Deserialize)]
struct ObjectiveDoc {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParamDoc {
    base_score: String,
    num_class: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct GradientBoosterDoc {
    name: String,
    model: BoosterModelDoc,
}

#[derive(Debug, Deserialize)]
struct BoosterModelDoc {
    tree_info: Vec<i32>,
    trees: Vec<TreeDoc>,
}

#[derive(Debug, Deserialize)]
struct TreeDoc {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<u8>,
}

/// A single regression tree, stored as parallel node arrays.
#[derive(Debug, Clone)]
struct Tree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<bool>,
}

impl Tree {
    fn from_doc(index: usize, doc: TreeDoc) -> Result<Self> {
        let n = doc.left_children.len();
        if n == 0 {
            return Err(CropStressError::MalformedModel(format!(
                "tree {index} has no nodes"
            )));
        }
        if doc.right_children.len() != n
            || doc.split_indices.len() != n
            || doc.split_conditions.len() != n
            || doc.default_left.len() != n
        {
            return Err(CropStressError::MalformedModel(format!(
                "tree {index}: node arrays have inconsistent lengths"
            )));
        }

        for nid in 0..n {
            let left = doc.left_children[nid];
            let right = doc.right_children[nid];
            if (left < 0) != (right < 0) {
                return Err(CropStressError::MalformedModel(format!(
                    "tree {index}, node {nid}: half-leaf node"
                )));
            }
            if left >= 0 {
                // Children must come after their parent, which also rules
                // out cycles during traversal.
                let in_range = (left as usize) < n && (right as usize) < n;
                if !in_range || left as usize <= nid || right as usize <= nid {
                    return Err(CropStressError::MalformedModel(format!(
                        "tree {index}, node {nid}: invalid child reference"
                    )));
                }
            }
        }

        Ok(Self {
            left_children: doc.left_children,
            right_children: doc.right_children,
            split_indices: doc.split_indices,
            split_conditions: doc.split_conditions,
            default_left: doc.default_left.into_iter().map(|d| d != 0).collect(),
        })
    }

    /// Walk the tree for one feature row and return the leaf value.
    /// Missing values (NaN) follow the recorded default direction.
    fn leaf_value(&self, features: &[f32]) -> f32 {
        let mut nid = 0usize;
        loop {
            let left = self.left_children[nid];
            if left < 0 {
                return self.split_conditions[nid];
            }
            let value = features
                .get(self.split_indices[nid] as usize)
                .copied()
                .unwrap_or(f32::NAN);
            nid = if value.is_nan() {
                if self.default_left[nid] {
                    left as usize
                } else {
                    self.right_children[nid] as usize
                }
            } else if value < self.split_conditions[nid] {
                left as usize
            } else {
                self.right_children[nid] as usize
            };
        }
    }
}

/// A multi-class gradient-boosted tree ensemble.
///
/// Immutable once loaded; scoring borrows the model and never mutates it, so
/// concurrent requests can share one instance without coordination.
#[derive(Debug, Clone)]
pub struct GbtModel {
    trees: Vec<Tree>,
    tree_class: Vec<usize>,
    num_class: usize,
    num_feature: usize,
    base_score: f64,
}

impl GbtModel {
    /// Load a model from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a model from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: ModelDoc = serde_json::from_str(json)?;
        let learner = doc.learner;

        if learner.gradient_booster.name != "gbtree" {
            return Err(CropStressError::UnsupportedModel(format!(
                "booster '{}' (only gbtree is supported)",
                learner.gradient_booster.name
            )));
        }
        if !learner.objective.name.starts_with("multi:") {
            return Err(CropStressError::UnsupportedModel(format!(
                "objective '{}' (only multi-class objectives are supported)",
                learner.objective.name
            )));
        }

        let params = &learner.learner_model_param;
        let num_class = parse_param::<usize>("num_class", &params.num_class)?;
        let num_feature = parse_param::<usize>("num_feature", &params.num_feature)?;
        let base_score = parse_param::<f64>("base_score", &params.base_score)?;
        if num_class < 2 {
            return Err(CropStressError::UnsupportedModel(format!(
                "num_class {num_class} (expected a multi-class model)"
            )));
        }

        let booster = learner.gradient_booster.model;
        if booster.tree_info.len() != booster.trees.len() {
            return Err(CropStressError::MalformedModel(format!(
                "tree_info has {} entries for {} trees",
                booster.tree_info.len(),
                booster.trees.len()
            )));
        }

        let mut tree_class = Vec::with_capacity(booster.tree_info.len());
        for (index, &class) in booster.tree_info.iter().enumerate() {
            if class < 0 || class as usize >= num_class {
                return Err(CropStressError::MalformedModel(format!(
                    "tree {index} assigned to class {class} of {num_class}"
                )));
            }
            tree_class.push(class as usize);
        }

        let trees = booster
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, doc)| Tree::from_doc(index, doc))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            trees,
            tree_class,
            num_class,
            num_feature,
            base_score,
        })
    }

    /// Number of output classes.
    pub fn num_class(&self) -> usize {
        self.num_class
    }

    /// Number of input features the model was trained on.
    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    /// Number of trees in the ensemble.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Raw per-class margins: base score plus the sum of leaf values of
    /// every tree in that class group.
    fn margins(&self, features: &[f32]) -> Result<Vec<f64>> {
        if features.len() != self.num_feature {
            return Err(CropStressError::SchemaMismatch {
                expected: self.num_feature,
                actual: features.len(),
            });
        }
        let mut margins = vec![self.base_score; self.num_class];
        for (tree, &class) in self.trees.iter().zip(&self.tree_class) {
            margins[class] += f64::from(tree.leaf_value(features));
        }
        Ok(margins)
    }

    /// Single-row class prediction (argmax over class probabilities).
    pub fn predict(&self, features: &[f32]) -> Result<usize> {
        let margins = self.margins(features)?;
        let class = margins
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .unwrap_or(0);
        Ok(class)
    }

    /// Single-row probability vector, ordered by class index. Sums to 1.0
    /// up to floating-point error.
    pub fn predict_proba(&self, features: &[f32]) -> Result<Vec<f64>> {
        Ok(softmax(&self.margins(features)?))
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        CropStressError::MalformedModel(format!("unparseable {name}: '{raw}'"))
    })
}

/// Numerically stable softmax.
fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
