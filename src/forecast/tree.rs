use crate::errors::{Result, ForecastError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

impl RegressionTree {
    /// 只用 `indices` 选中的行拟合
    pub fn fit(params: TreeParams, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Result<Self> {
        if indices.is_empty() {
            return Err(ForecastError::ModelError("Cannot grow a tree on zero samples".to_string()));
        }
        if x.len() != y.len() {
            return Err(ForecastError::ModelError(format!(
                "Feature rows ({}) and targets ({}) differ in length", x.len(), y.len()
            )));
        }

        let mut indices = indices.to_vec();
        let root = Self::grow(&params, x, y, &mut indices, 0);
        Ok(Self { root })
    }

    fn grow(params: &TreeParams, x: &[Vec<f64>], y: &[f64], indices: &mut [usize], depth: usize) -> Node {
        let n = indices.len();
        let value = mean_of(y, indices);

        if depth >= params.max_depth
            || n < params.min_samples_split
            || n < 2 * params.min_samples_leaf
        {
            return Node::Leaf(value);
        }

        // 纯节点无需再分
        let first = y[indices[0]];
        if indices.iter().all(|&i| y[i] == first) {
            return Node::Leaf(value);
        }

        let Some(split) = Self::best_split(params, x, y, indices) else {
            return Node::Leaf(value);
        };

        // 左侧: x <= threshold
        let mut boundary = 0;
        for k in 0..n {
            if x[indices[k]][split.feature] <= split.threshold {
                indices.swap(k, boundary);
                boundary += 1;
            }
        }
        let (left, right) = indices.split_at_mut(boundary);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(Self::grow(params, x, y, left, depth + 1)),
            right: Box::new(Self::grow(params, x, y, right, depth + 1)),
        }
    }

    // 在相邻不同取值的中点上找方差下降最大的切分
    // 改进量 = n_l * n_r / n * (mean_l - mean_r)^2
    fn best_split(params: &TreeParams, x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let n_features = x[indices[0]].len();
        let total: f64 = indices.iter().map(|&i| y[i]).sum();
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..n_features {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

            let mut left_sum = 0.0;
            for k in 1..n {
                left_sum += y[order[k - 1]];

                let lo = x[order[k - 1]][feature];
                let hi = x[order[k]][feature];
                if lo == hi || k < params.min_samples_leaf || n - k < params.min_samples_leaf {
                    continue;
                }

                let (n_l, n_r) = (k as f64, (n - k) as f64);
                let diff = left_sum / n_l - (total - left_sum) / n_r;
                let improvement = n_l * n_r / n as f64 * diff * diff;

                if improvement > best.map_or(0.0, |b| b.improvement) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold == hi {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate { feature, threshold, improvement });
                }
            }
        }

        best
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split { feature, threshold, left, right } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 1,
                Node::Split { left, right, .. } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}
