use crate::errors::{Result, ForecastError};
use crate::forecast::tree::{RegressionTree, TreeParams};
use crate::forecast::Regressor;
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GbmParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// 每轮无放回抽样的行比例
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

impl GbmParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter("n_estimators must be positive".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter("learning_rate must be positive".to_string()));
        }
        if self.max_depth == 0 {
            return Err(ForecastError::InvalidParameter("max_depth must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter("min_samples_split must be at least 2".to_string()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter("min_samples_leaf must be positive".to_string()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ForecastError::InvalidParameter("subsample must be in (0, 1]".to_string()));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    params: GbmParams,
    init: f64,
    trees: Vec<RegressionTree>,
    train_loss: Vec<f64>,
}

impl GradientBoostingRegressor {
    pub fn new(params: GbmParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            init: 0.0,
            trees: Vec::new(),
            train_loss: Vec::new(),
        })
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// 每一轮之后的训练集均方误差
    pub fn train_loss(&self) -> &[f64] {
        &self.train_loss
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.init, |acc, tree| acc + self.params.learning_rate * tree.predict_row(row))
    }

    fn stage_sample(&self, rng: &mut StdRng, n: usize) -> Vec<usize> {
        if self.params.subsample >= 1.0 {
            return (0..n).collect();
        }
        let n_inbag = ((self.params.subsample * n as f64) as usize).max(1);
        let mut sample = rand::seq::index::sample(rng, n, n_inbag).into_vec();
        sample.sort_unstable();
        sample
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            return Err(ForecastError::ModelError("Cannot fit on zero samples".to_string()));
        }
        if x.len() != y.len() {
            return Err(ForecastError::ModelError(format!(
                "Feature rows ({}) and targets ({}) differ in length", x.len(), y.len()
            )));
        }
        let width = x[0].len();
        if width == 0 || x.iter().any(|row| row.len() != width) {
            return Err(ForecastError::ModelError("Feature rows must share a non-zero width".to_string()));
        }

        let n = y.len();
        let tree_params = self.params.tree_params();
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        self.init = y.iter().sum::<f64>() / n as f64;
        self.trees.clear();
        self.train_loss.clear();

        let mut predictions = vec![self.init; n];
        for _ in 0..self.params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&predictions).map(|(t, p)| t - p).collect();
            let sample = self.stage_sample(&mut rng, n);
            let tree = RegressionTree::fit(tree_params, x, &residuals, &sample)?;

            for (pred, row) in predictions.iter_mut().zip(x) {
                *pred += self.params.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);

            let mse = y.iter().zip(&predictions).map(|(t, p)| (t - p).powi(2)).sum::<f64>() / n as f64;
            self.train_loss.push(mse);
        }

        debug!(
            "Fitted {} trees on {} rows, init {:.4}, final train MSE {:.6}",
            self.trees.len(),
            n,
            self.init,
            self.train_loss.last().copied().unwrap_or_default()
        );
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ForecastError::ModelError("Model has not been fitted".to_string()));
        }
        Ok(x.iter().map(|row| self.predict_row(row)).collect())
    }

    fn name(&self) -> &str {
        "GradientBoostingRegressor"
    }
}
