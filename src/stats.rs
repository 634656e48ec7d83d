use std::fmt::Write;

use log::debug;

use crate::DataError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
}

/// Parses command-line values into numbers, naming the first one that is not.
pub fn parse_values<S: AsRef<str>>(values: &[S]) -> Result<Vec<f64>, DataError> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let value = value.as_ref();
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| DataError::InvalidData {
                    reason: format!("item {} (`{value}`) is not a number", i + 1),
                })
        })
        .collect()
}

fn ensure_data(data: &[f64]) -> Result<&[f64], DataError> {
    if data.is_empty() {
        return Err(DataError::EmptyInput);
    }
    if let Some(bad) = data.iter().find(|x| x.is_nan()) {
        return Err(DataError::InvalidData {
            reason: format!("`{bad}` is not a number"),
        });
    }
    Ok(data)
}

pub fn mean(data: &[f64]) -> Result<f64, DataError> {
    Ok(mean_of(ensure_data(data)?))
}

pub fn median(data: &[f64]) -> Result<f64, DataError> {
    Ok(median_of(ensure_data(data)?))
}

/// Standard deviation with `ddof` delta degrees of freedom (0 for the
/// population, 1 for a sample).
pub fn std(data: &[f64], ddof: usize) -> Result<f64, DataError> {
    std_of(ensure_data(data)?, ddof)
}

pub fn summary(data: &[f64], ddof: usize) -> Result<Summary, DataError> {
    let data = ensure_data(data)?;
    let summary = Summary {
        count: data.len(),
        mean: mean_of(data),
        median: median_of(data),
        std: std_of(data, ddof)?,
    };
    debug!("summarised {} values: {summary:?}", summary.count);
    Ok(summary)
}

// The `*_of` helpers expect data that already passed `ensure_data`.

fn mean_of(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn median_of(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn std_of(data: &[f64], ddof: usize) -> Result<f64, DataError> {
    if ddof >= data.len() {
        return Err(DataError::InvalidData {
            reason: format!(
                "ddof must be smaller than the number of values ({})",
                data.len()
            ),
        });
    }
    let mean = mean_of(data);
    let squares: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
    Ok((squares / (data.len() - ddof) as f64).sqrt())
}

/// Renders the boxed summary report.
pub fn pretty_print(data: &[f64], label: Option<&str>, ddof: usize) -> Result<String, DataError> {
    let s = summary(data, ddof)?;

    let title = match label {
        Some(label) => format!("Data: {label}"),
        None => "Data Summary".to_string(),
    };
    let rule = "-".repeat(title.chars().count() + 4);

    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "| {title} |");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "| Count:   {:<9} |", s.count);
    let _ = writeln!(out, "| Mean:    {:.4}    |", s.mean);
    let _ = writeln!(out, "| Median:  {:.4}    |", s.median);
    let _ = writeln!(out, "| Std:     {:.4}    |", s.std);
    let _ = writeln!(out, "{rule}");
    Ok(out)
}
