use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日线数据结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// 单个代码的日线序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(symbol: &str, bars: Vec<DailyBar>) -> Self {
        Self {
            symbol: symbol.to_string(),
            bars,
        }
    }

    /// 无数据的序列（无效代码或数据源无返回）
    pub fn empty(symbol: &str) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 最后 n 条记录
    pub fn tail(&self, n: usize) -> &[DailyBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 截取 [start, end] 区间
    pub fn within(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        Self::new(&self.symbol, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> DailyBar {
        DailyBar {
            date: date.parse().unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn tail_is_clamped_to_series_length() {
        let series = PriceSeries::new("AAPL", vec![bar("2024-01-02", 1.0), bar("2024-01-03", 2.0)]);
        assert_eq!(series.tail(5).len(), 2);
        assert_eq!(series.tail(1)[0].close, 2.0);
        assert!(PriceSeries::empty("AAPL").tail(5).is_empty());
    }

    #[test]
    fn within_is_inclusive_on_both_ends() {
        let series = PriceSeries::new(
            "AAPL",
            vec![bar("2024-01-02", 1.0), bar("2024-01-03", 2.0), bar("2024-01-04", 3.0)],
        );
        let cut = series.within("2024-01-03".parse().unwrap(), "2024-01-04".parse().unwrap());
        assert_eq!(cut.closes(), vec![2.0, 3.0]);
        assert_eq!(cut.bars.last().map(|b| b.date), Some("2024-01-04".parse().unwrap()));
    }
}
