use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use crate::errors::{Result, ForecastError};

/// 1970-01-01 的日序数
pub const UNIX_EPOCH_ORDINAL: i32 = 719_163;

/// 下一个工作日（周一至周五）
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(1);
    }
    next
}

/// 日期 -> 公历日序数（0001-01-01 为 1）
pub fn date_to_ordinal(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

pub fn ordinal_to_date(ordinal: i32) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(ordinal)
        .ok_or_else(|| ForecastError::DataError(format!("Invalid date ordinal: {}", ordinal)))
}

/// 交易所所在时区的“今天”
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")?)
}

/// 如 `Monday, 20-10-2026`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %d-%m-%Y").to_string()
}

// Arrow数据转换工具
pub mod arrow_utils {
    use super::*;
    use crate::models::price::{DailyBar, PriceSeries};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::ipc::reader::FileReader;
    use arrow::ipc::writer::FileWriter;
    use arrow::record_batch::RecordBatch;
    use arrow_array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array};
    use log::info;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::{Read, Seek};
    use std::path::Path;
    use std::sync::Arc;

    const SYMBOL_METADATA_KEY: &str = "symbol";

    fn price_schema(symbol: &str) -> Schema {
        let metadata = HashMap::from([(SYMBOL_METADATA_KEY.to_string(), symbol.to_string())]);
        Schema::new(vec![
            Field::new("date", DataType::Date32, false),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("volume", DataType::Int64, false),
        ])
        .with_metadata(metadata)
    }

    // 将价格序列转换为Arrow记录批次
    pub fn price_series_to_record_batch(series: &PriceSeries) -> Result<RecordBatch> {
        let dates: Vec<i32> = series
            .bars
            .iter()
            .map(|b| date_to_ordinal(b.date) - UNIX_EPOCH_ORDINAL)
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(Date32Array::from(dates)),
            Arc::new(Float64Array::from_iter_values(series.bars.iter().map(|b| b.open))),
            Arc::new(Float64Array::from_iter_values(series.bars.iter().map(|b| b.high))),
            Arc::new(Float64Array::from_iter_values(series.bars.iter().map(|b| b.low))),
            Arc::new(Float64Array::from_iter_values(series.bars.iter().map(|b| b.close))),
            Arc::new(Int64Array::from_iter_values(series.bars.iter().map(|b| b.volume))),
        ];

        Ok(RecordBatch::try_new(Arc::new(price_schema(&series.symbol)), columns)?)
    }

    fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
        batch
            .column_by_name(name)
            .and_then(|a| a.as_any().downcast_ref::<T>())
            .ok_or_else(|| ForecastError::ArrowError(format!("Failed to downcast {} column", name)))
    }

    fn read_price_series<R: Read + Seek>(reader: R, fallback_symbol: &str) -> Result<PriceSeries> {
        let reader = FileReader::try_new(reader, None)?;
        let symbol = reader
            .schema()
            .metadata()
            .get(SYMBOL_METADATA_KEY)
            .cloned()
            .unwrap_or_else(|| fallback_symbol.to_string());

        let mut bars = Vec::new();
        for batch in reader {
            let batch = batch?;
            let date = column::<Date32Array>(&batch, "date")?;
            let open = column::<Float64Array>(&batch, "open")?;
            let high = column::<Float64Array>(&batch, "high")?;
            let low = column::<Float64Array>(&batch, "low")?;
            let close = column::<Float64Array>(&batch, "close")?;
            let volume = column::<Int64Array>(&batch, "volume")?;

            for i in 0..batch.num_rows() {
                if date.is_null(i) {
                    continue;
                }
                let ordinal = date.value(i).checked_add(UNIX_EPOCH_ORDINAL).ok_or_else(|| {
                    ForecastError::DataError(format!("Date32 value out of range: {}", date.value(i)))
                })?;
                bars.push(DailyBar {
                    date: ordinal_to_date(ordinal)?,
                    open: open.value(i),
                    high: high.value(i),
                    low: low.value(i),
                    close: close.value(i),
                    volume: volume.value(i),
                });
            }
        }

        Ok(PriceSeries::new(&symbol, bars))
    }

    // 从Arrow文件读取价格序列
    pub fn read_price_series_from_arrow(path: &Path) -> Result<PriceSeries> {
        let fallback = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let file = File::open(path)?;
        read_price_series(file, &fallback)
    }

    // 将价格序列保存到Arrow文件
    pub fn save_price_series_to_arrow(series: &PriceSeries, path: &Path) -> Result<()> {
        info!("Saving {} daily records of {} to {}", series.len(), series.symbol, path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let batch = price_series_to_record_batch(series)?;
        let file = File::create(path)?;

        let mut writer = FileWriter::try_new(file, &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("2024-06-03", "2024-06-04")] // Mon
    #[case("2024-06-06", "2024-06-07")] // Thu
    #[case("2024-06-07", "2024-06-10")] // Fri
    #[case("2024-06-08", "2024-06-10")] // Sat
    #[case("2024-06-09", "2024-06-10")] // Sun
    #[case("2024-12-31", "2025-01-01")] // year boundary, Tue
    fn next_business_day_skips_weekends(#[case] from: &str, #[case] expected: &str) {
        assert_eq!(next_business_day(d(from)), d(expected));
    }

    #[test]
    fn next_business_day_is_always_a_weekday_after_input() {
        let mut date = d("2023-01-01");
        for _ in 0..60 {
            let next = next_business_day(date);
            assert!(next > date);
            assert!(!matches!(next.weekday(), Weekday::Sat | Weekday::Sun));
            date += Duration::days(1);
        }
    }

    #[test]
    fn ordinal_matches_proleptic_gregorian_numbering() {
        assert_eq!(date_to_ordinal(d("0001-01-01")), 1);
        assert_eq!(date_to_ordinal(d("1970-01-01")), UNIX_EPOCH_ORDINAL);
        assert_eq!(date_to_ordinal(d("2015-01-01")), 735_599);
        assert_eq!(ordinal_to_date(735_599).unwrap(), d("2015-01-01"));
    }

    #[test]
    fn long_date_format_names_the_weekday() {
        assert_eq!(format_long_date(d("2026-10-19")), "Monday, 19-10-2026");
    }

    #[test]
    fn arrow_file_round_trip_keeps_symbol_and_bars() {
        use crate::models::price::{DailyBar, PriceSeries};

        let series = PriceSeries::new(
            "M&M.NS",
            vec![
                DailyBar { date: d("2024-01-02"), open: 1.5, high: 2.0, low: 1.0, close: 1.75, volume: 10 },
                DailyBar { date: d("2024-01-03"), open: 1.75, high: 2.5, low: 1.5, close: 2.25, volume: 12 },
            ],
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mm.arrow");

        arrow_utils::save_price_series_to_arrow(&series, &path).unwrap();
        let loaded = arrow_utils::read_price_series_from_arrow(&path).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn out_of_range_date32_is_a_data_error() {
        use crate::models::price::{DailyBar, PriceSeries};
        use arrow::ipc::writer::FileWriter;
        use arrow::record_batch::RecordBatch;
        use arrow_array::{ArrayRef, Date32Array};
        use std::sync::Arc;

        let series = PriceSeries::new(
            "BAD",
            vec![DailyBar { date: d("2024-01-02"), open: 1.0, high: 1.0, low: 1.0, close: 1.0, volume: 1 }],
        );
        let good = arrow_utils::price_series_to_record_batch(&series).unwrap();
        let mut columns: Vec<ArrayRef> = good.columns().to_vec();
        columns[0] = Arc::new(Date32Array::from(vec![i32::MAX]));
        let batch = RecordBatch::try_new(good.schema(), columns).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BAD.arrow");
        let mut writer = FileWriter::try_new(std::fs::File::create(&path).unwrap(), &batch.schema()).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        let err = arrow_utils::read_price_series_from_arrow(&path).unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }
}
