use super::Dataset;
use csv::ReaderBuilder;
use ndarray::{s, Array2};
use std::fs::File;
use std::io::Read;

use crate::error::{ElmError, Result};

/// Parse a numeric CSV file into a dataset.
/// The last "target_columns" columns of every record are the targets, the rest are features.
pub fn parse_dataset(path: &str, target_columns: usize, has_headers: bool) -> Result<Dataset> {
    let file = File::open(path)?;

    parse_reader(file, target_columns, has_headers)
}

/// Same as parse_dataset, for any reader
pub fn parse_reader<R: Read>(reader: R, target_columns: usize, has_headers: bool) -> Result<Dataset> {
    if target_columns == 0 {
        return Err(ElmError::InvalidConfig("need at least one target column".to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut values = Vec::<f64>::new();
    let mut width = None;
    let mut num_rows = 0;

    for (line, record) in reader.deserialize::<Vec<f64>>().enumerate() {
        let record = record?;

        match width {
            None if record.len() <= target_columns => {
                return Err(ElmError::InvalidData(format!(
                    "records have {} columns, need more than the {} target columns",
                    record.len(),
                    target_columns
                )));
            }
            None => width = Some(record.len()),
            Some(w) if w != record.len() => {
                return Err(ElmError::InvalidData(format!(
                    "record {} has {} columns, expected {}",
                    line + 1,
                    record.len(),
                    w
                )));
            }
            Some(_) => {}
        }

        values.extend(record);
        num_rows += 1;
    }

    let width = width.ok_or_else(|| ElmError::EmptyData("no records found".to_string()))?;
    let num_features = width - target_columns;
    let table = Array2::from_shape_vec((num_rows, width), values)
        .map_err(|e| ElmError::InvalidData(e.to_string()))?;

    let data = table.slice(s![.., ..num_features]).to_owned();
    let target = table.slice(s![.., num_features..]).to_owned();

    Dataset::new(data, target)
}
