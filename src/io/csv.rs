/*!
# Loading Observations from Delimited Text

Reads `(x, y)` observations from a CSV table. Enable via the `csv` feature (on by default).

Column selection:
- if the first row is a header naming `x` and `y` (case-insensitive), those columns are used;
- otherwise the **last two** columns are used, so tables written with a leading index
  column (e.g. `,x,y` from a data frame) load without changes.

A first row whose cells all parse as numbers is treated as data, not as a header.
*/

use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array2;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Observations;

/**
Loads observations from the CSV file at `path`.

# Examples

```rust
use linreg_mcmc::io::csv::load_observations;
use std::io::Write;

let mut file = tempfile::NamedTempFile::new()?;
writeln!(file, "x,y\n1,2\n2,4.5")?;
let data = load_observations(file.path())?;
assert_eq!(data.len(), 2);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn load_observations<P: AsRef<Path>>(path: P) -> Result<Observations> {
    let path = path.as_ref();
    let data = read_observations(File::open(path)?)?;
    debug!(path = %path.display(), rows = data.len(), "loaded observations");
    Ok(data)
}

/// Reads observations from any reader holding a comma-delimited table.
pub fn read_observations<R: Read>(reader: R) -> Result<Observations> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let first = match records.next() {
        Some(record) => record?,
        None => return Observations::new(Array2::zeros((0, 2))),
    };
    if first.len() < 2 {
        return Err(Error::InvalidData(format!(
            "expected at least 2 columns, got {}",
            first.len()
        )));
    }

    let is_header = first.iter().any(|cell| cell.parse::<f64>().is_err());
    let (x_col, y_col) = if is_header {
        select_columns(&first)
    } else {
        (first.len() - 2, first.len() - 1)
    };

    let mut flat = Vec::new();
    if !is_header {
        push_row(&mut flat, &first, x_col, y_col, 1)?;
    }
    for (i, record) in records.enumerate() {
        // Line numbers are 1-based and the first line was consumed above.
        push_row(&mut flat, &record?, x_col, y_col, i + 2)?;
    }

    let n = flat.len() / 2;
    let data =
        Array2::from_shape_vec((n, 2), flat).map_err(|e| Error::InvalidData(e.to_string()))?;
    Observations::new(data)
}

fn select_columns(header: &StringRecord) -> (usize, usize) {
    let position = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
    match (position("x"), position("y")) {
        (Some(x), Some(y)) => (x, y),
        _ => (header.len() - 2, header.len() - 1),
    }
}

fn push_row(
    flat: &mut Vec<f64>,
    record: &StringRecord,
    x_col: usize,
    y_col: usize,
    line: usize,
) -> Result<()> {
    for col in [x_col, y_col] {
        let cell = record.get(col).ok_or_else(|| {
            Error::InvalidData(format!("line {line}: missing column {col}"))
        })?;
        let value = cell.parse::<f64>().map_err(|_| {
            Error::InvalidData(format!("line {line}: cannot parse {cell:?} as a number"))
        })?;
        flat.push(value);
    }
    Ok(())
}
