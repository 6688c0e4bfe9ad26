use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{ArrayRef, Float32Array, Float64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use oxyroot::{RootFile, WriterTree};
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};
use tracing::{info, warn};

use crate::{
    data::io::{canonicalize_path, expand_output_path, float_column},
    row::OutputRow,
    utils::enums::{FloatPrecision, OutputFormat},
    RjpsiError, RjpsiResult,
};

const DEFAULT_WRITE_BATCH_SIZE: usize = 10_000;

/// The default name of the flat table inside ROOT files.
pub const DEFAULT_TREE_NAME: &str = "tree";

/// Somewhere to put [`OutputRow`]s.
pub trait RowSink {
    /// Append one row. Rows are never revisited once appended.
    fn append(&mut self, row: OutputRow) -> RjpsiResult<()>;
}

impl RowSink for Vec<OutputRow> {
    fn append(&mut self, row: OutputRow) -> RjpsiResult<()> {
        self.push(row);
        Ok(())
    }
}

/// Options for writing the flat table.
#[derive(Clone, Debug)]
pub struct RowWriterOptions {
    /// Number of rows to include in each Parquet batch.
    pub batch_size: usize,
    /// Floating-point precision to use for persisted columns.
    pub precision: FloatPrecision,
    /// Tree name to use when writing ROOT files.
    pub tree: Option<String>,
    /// Force a format instead of guessing it from the file extension.
    pub format: Option<OutputFormat>,
}

impl Default for RowWriterOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_WRITE_BATCH_SIZE,
            precision: FloatPrecision::default(),
            tree: None,
            format: None,
        }
    }
}

impl RowWriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the batch size used for writing; defaults to 10_000.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Select the floating-point precision for persisted columns.
    pub fn precision(mut self, precision: FloatPrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the ROOT tree name (defaults to \"tree\").
    pub fn tree<S: Into<String>>(mut self, name: S) -> Self {
        self.tree = Some(name.into());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }
}

fn row_schema(precision: FloatPrecision) -> Schema {
    let dtype = match precision {
        FloatPrecision::F64 => DataType::Float64,
        FloatPrecision::F32 => DataType::Float32,
    };
    Schema::new(
        OutputRow::COLUMNS
            .iter()
            .map(|name| Field::new(*name, dtype.clone(), true))
            .collect::<Vec<_>>(),
    )
}

fn rows_to_record_batch(
    rows: &[OutputRow],
    schema: Arc<Schema>,
    precision: FloatPrecision,
) -> arrow::error::Result<RecordBatch> {
    let values: Vec<Vec<f64>> = rows.iter().map(OutputRow::values).collect();
    let columns: Vec<ArrayRef> = (0..OutputRow::COLUMNS.len())
        .map(|column| -> ArrayRef {
            let column_values = values.iter().map(|row| row[column]);
            match precision {
                FloatPrecision::F64 => Arc::new(Float64Array::from_iter_values(column_values)),
                FloatPrecision::F32 => Arc::new(Float32Array::from_iter_values(
                    column_values.map(|value| value as f32),
                )),
            }
        })
        .collect();
    RecordBatch::try_new(schema, columns)
}

/// Streams rows into a Parquet file in batches.
pub struct ParquetRowWriter {
    path: PathBuf,
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
    precision: FloatPrecision,
    batch_size: usize,
    buffer: Vec<OutputRow>,
    n_rows: usize,
}

impl ParquetRowWriter {
    pub fn create(path: &Path, options: &RowWriterOptions) -> RjpsiResult<Self> {
        let schema = Arc::new(row_schema(options.precision));
        let file = File::create(path)?;
        let writer = ArrowWriter::try_new(file, schema.clone(), None)
            .map_err(|err| RjpsiError::Custom(format!("Failed to create Parquet writer: {err}")))?;
        let batch_size = options.batch_size.max(1);
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            schema,
            precision: options.precision,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
            n_rows: 0,
        })
    }

    fn flush(&mut self) -> RjpsiResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = rows_to_record_batch(&self.buffer, self.schema.clone(), self.precision)
            .map_err(|err| RjpsiError::Custom(format!("Failed to build Parquet batch: {err}")))?;
        self.writer
            .write(&batch)
            .map_err(|err| RjpsiError::Custom(format!("Failed to write Parquet batch: {err}")))?;
        self.n_rows += self.buffer.len();
        self.buffer.clear();
        Ok(())
    }

    /// Write any buffered rows and finalise the file. Returns the number of rows written.
    pub fn close(mut self) -> RjpsiResult<usize> {
        self.flush()?;
        self.writer
            .close()
            .map_err(|err| RjpsiError::Custom(format!("Failed to finalise Parquet file: {err}")))?;
        info!(path = %self.path.display(), n_rows = self.n_rows, "closed Parquet table");
        Ok(self.n_rows)
    }
}

impl RowSink for ParquetRowWriter {
    fn append(&mut self, row: OutputRow) -> RjpsiResult<()> {
        self.buffer.push(row);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }
}

trait FromF64 {
    fn from_f64(value: f64) -> Self;
}

impl FromF64 for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl FromF64 for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

fn map_root_error<E: std::fmt::Display>(context: &str, err: E) -> RjpsiError {
    RjpsiError::Custom(format!("{context}: {err}"))
}

/// Collects rows and writes them as one flat ROOT tree when closed.
///
/// The output file is created up front, so an unwritable destination fails before any event
/// is processed.
pub struct RootRowWriter {
    path: PathBuf,
    tree_name: String,
    precision: FloatPrecision,
    rows: Vec<OutputRow>,
}

impl RootRowWriter {
    pub fn create(path: &Path, options: &RowWriterOptions) -> RjpsiResult<Self> {
        File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            tree_name: options
                .tree
                .clone()
                .unwrap_or_else(|| DEFAULT_TREE_NAME.to_string()),
            precision: options.precision,
            rows: Vec::new(),
        })
    }

    fn write_with_type<T>(&self) -> RjpsiResult<()>
    where
        T: FromF64 + oxyroot::Marshaler + 'static,
    {
        let mut file = RootFile::create(&self.path).map_err(|err| {
            map_root_error(
                &format!("Failed to create ROOT file '{}'", self.path.display()),
                err,
            )
        })?;
        let mut tree = WriterTree::new(self.tree_name.as_str());
        let values: Vec<Vec<f64>> = self.rows.iter().map(OutputRow::values).collect();
        for (column, name) in OutputRow::COLUMNS.iter().enumerate() {
            let branch: Vec<T> = values.iter().map(|row| T::from_f64(row[column])).collect();
            tree.new_branch(name.to_string(), branch.into_iter());
        }
        tree.write(&mut file).map_err(|err| {
            map_root_error(
                &format!(
                    "Failed to write ROOT tree '{}' to '{}'",
                    self.tree_name,
                    self.path.display()
                ),
                err,
            )
        })?;
        file.close().map_err(|err| {
            map_root_error(
                &format!("Failed to close ROOT file '{}'", self.path.display()),
                err,
            )
        })?;
        Ok(())
    }

    /// Write the tree and close the file. Returns the number of rows written.
    pub fn close(self) -> RjpsiResult<usize> {
        match self.precision {
            FloatPrecision::F64 => self.write_with_type::<f64>()?,
            FloatPrecision::F32 => self.write_with_type::<f32>()?,
        }
        info!(
            path = %self.path.display(),
            tree = %self.tree_name,
            n_rows = self.rows.len(),
            "closed ROOT table"
        );
        Ok(self.rows.len())
    }
}

impl RowSink for RootRowWriter {
    fn append(&mut self, row: OutputRow) -> RjpsiResult<()> {
        self.rows.push(row);
        Ok(())
    }
}

/// The flat analysis table, in whichever format was requested.
pub enum RowWriter {
    Parquet(ParquetRowWriter),
    Root(RootRowWriter),
}

impl RowWriter {
    /// Open the table at `file_path` (expanded with [`shellexpand::full`]).
    ///
    /// The format is [`RowWriterOptions::format`] if set, otherwise it follows the file
    /// extension, falling back to Parquet.
    pub fn create(file_path: &str, options: &RowWriterOptions) -> RjpsiResult<Self> {
        let path = expand_output_path(file_path)?;
        let format = match options.format.or_else(|| OutputFormat::from_path(&path)) {
            Some(format) => format,
            None => {
                warn!(path = %path.display(), "unrecognised extension, writing Parquet");
                OutputFormat::Parquet
            }
        };
        info!(
            path = %path.display(),
            %format,
            precision = %options.precision,
            "opening output table"
        );
        Ok(match format {
            OutputFormat::Parquet => Self::Parquet(ParquetRowWriter::create(&path, options)?),
            OutputFormat::Root => Self::Root(RootRowWriter::create(&path, options)?),
        })
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Parquet(_) => OutputFormat::Parquet,
            Self::Root(_) => OutputFormat::Root,
        }
    }

    /// Finalise the table. Returns the number of rows written.
    pub fn close(self) -> RjpsiResult<usize> {
        match self {
            Self::Parquet(writer) => writer.close(),
            Self::Root(writer) => writer.close(),
        }
    }
}

impl RowSink for RowWriter {
    fn append(&mut self, row: OutputRow) -> RjpsiResult<()> {
        match self {
            Self::Parquet(writer) => writer.append(row),
            Self::Root(writer) => writer.append(row),
        }
    }
}

/// Load a flat table written by [`ParquetRowWriter`].
pub fn read_parquet_rows(file_path: &str) -> RjpsiResult<Vec<OutputRow>> {
    let path = canonicalize_path(file_path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;
    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        let columns = OutputRow::COLUMNS
            .iter()
            .map(|name| float_column(&batch, name))
            .collect::<RjpsiResult<Vec<_>>>()?;
        let mut values = vec![0.0; columns.len()];
        for row in 0..batch.num_rows() {
            for (value, column) in values.iter_mut().zip(&columns) {
                *value = column.value(row);
            }
            rows.extend(OutputRow::from_values(&values));
        }
    }
    Ok(rows)
}
