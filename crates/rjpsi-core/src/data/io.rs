//! Event I/O for particle listings stored one particle per row in Parquet files.
//!
//! Rows belonging to one event are contiguous and share `(run, lumi, event)`. See
//! [`PARTICLE_COLUMNS`] for the layout.

use super::*;
use arrow::{
    array::{
        Array, ArrayRef, BooleanArray, BooleanBuilder, Float32Array, Float64Array, Float64Builder,
        Int32Builder, Int64Array, ListArray, ListBuilder, UInt32Builder, UInt64Builder,
    },
    compute::cast,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::{
    arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder},
    ArrowWriter,
};
use std::{
    collections::VecDeque,
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};

/// Columns written by [`write_parquet_events`]. `qscale`, `weight`, `is_last_copy` and
/// `is_hard_process` may be absent when reading.
pub const PARTICLE_COLUMNS: [&str; 19] = [
    "run",
    "lumi",
    "event",
    "qscale",
    "weight",
    "pdg_id",
    "status",
    "charge",
    "is_last_copy",
    "is_hard_process",
    "px",
    "py",
    "pz",
    "e",
    "vx",
    "vy",
    "vz",
    "mothers",
    "daughters",
];

const DEFAULT_READ_BATCH_SIZE: usize = 8192;

pub(crate) fn canonicalize_path(file_path: &str) -> RjpsiResult<PathBuf> {
    Ok(Path::new(&*shellexpand::full(file_path)?).canonicalize()?)
}

pub(crate) fn expand_output_path(file_path: &str) -> RjpsiResult<PathBuf> {
    Ok(PathBuf::from(&*shellexpand::full(file_path)?))
}

/// Options for reading [`GenEvent`]s.
#[derive(Clone, Debug)]
pub struct EventReadOptions {
    /// Number of particle rows decoded at a time.
    pub batch_size: usize,
}

impl Default for EventReadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_READ_BATCH_SIZE,
        }
    }
}

impl EventReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the number of rows decoded at a time; defaults to 8192.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Pick the files handled by job `job_id` when every job processes `files_per_job` files.
///
/// The last job may receive fewer files. A job which would receive none is an error.
pub fn select_job_files<T: Clone>(
    files: &[T],
    files_per_job: usize,
    job_id: usize,
) -> RjpsiResult<Vec<T>> {
    files
        .chunks(files_per_job.max(1))
        .nth(job_id)
        .map(<[T]>::to_vec)
        .ok_or(RjpsiError::JobSelection {
            job_id,
            files_per_job,
            n_files: files.len(),
        })
}

struct PendingEvent {
    key: (i64, i64, i64),
    header: EventHeader,
    particles: Vec<ParticleRecord>,
}

/// Streams [`GenEvent`]s from a sequence of Parquet files, in file order.
///
/// Files are opened lazily. Any failure is yielded once as an [`Err`], after which the
/// iterator is exhausted.
pub struct EventReader {
    files: VecDeque<PathBuf>,
    options: EventReadOptions,
    current: Option<ParquetRecordBatchReader>,
    pending: Option<PendingEvent>,
    ready: VecDeque<RjpsiResult<GenEvent>>,
    failed: bool,
}

/// Open a sequence of Parquet particle listings.
///
/// Paths are expanded with [`shellexpand::full`] and must exist.
pub fn read_parquet_events<S: AsRef<str>>(
    file_paths: &[S],
    options: &EventReadOptions,
) -> RjpsiResult<EventReader> {
    let files = file_paths
        .iter()
        .map(|path| canonicalize_path(path.as_ref()))
        .collect::<RjpsiResult<VecDeque<_>>>()?;
    Ok(EventReader {
        files,
        options: options.clone(),
        current: None,
        pending: None,
        ready: VecDeque::new(),
        failed: false,
    })
}

impl EventReader {
    fn open_next_file(&mut self) -> RjpsiResult<bool> {
        let Some(path) = self.files.pop_front() else {
            return Ok(false);
        };
        let file = File::open(&path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let n_rows = builder.metadata().file_metadata().num_rows();
        info!(path = %path.display(), n_rows, "opened particle listing");
        self.current = Some(builder.with_batch_size(self.options.batch_size.max(1)).build()?);
        Ok(true)
    }

    fn finish_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.ready
                .push_back(GenEvent::new(pending.header, pending.particles));
        }
    }

    /// Decode more input. Returns `false` once every file has been read.
    fn fill(&mut self) -> RjpsiResult<bool> {
        if self.current.is_none() && !self.open_next_file()? {
            self.finish_pending();
            return Ok(!self.ready.is_empty());
        }
        let Some(reader) = self.current.as_mut() else {
            return Ok(false);
        };
        match reader.next() {
            Some(batch) => {
                let batch = batch?;
                debug!(n_rows = batch.num_rows(), "decoding particle batch");
                self.append_batch(&batch)?;
            }
            None => {
                // events never span files
                self.finish_pending();
                self.current = None;
            }
        }
        Ok(true)
    }

    fn append_batch(&mut self, batch: &RecordBatch) -> RjpsiResult<()> {
        let columns = ParticleColumns::new(batch)?;
        for row in 0..batch.num_rows() {
            let key = (
                columns.run.value(row),
                columns.lumi.value(row),
                columns.event.value(row),
            );
            if self.pending.as_ref().is_some_and(|pending| pending.key != key) {
                self.finish_pending();
            }
            if self.pending.is_none() {
                self.pending = Some(PendingEvent {
                    key,
                    header: columns.header(row)?,
                    particles: Vec::new(),
                });
            }
            if let Some(pending) = self.pending.as_mut() {
                pending.particles.push(columns.particle(row)?);
            }
        }
        Ok(())
    }
}

impl Iterator for EventReader {
    type Item = RjpsiResult<GenEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                if event.is_err() {
                    self.failed = true;
                    self.ready.clear();
                }
                return Some(event);
            }
            if self.failed {
                return None;
            }
            match self.fill() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum FloatColumn<'a> {
    F32(&'a Float32Array),
    F64(&'a Float64Array),
}

impl<'a> FloatColumn<'a> {
    pub(crate) fn value(&self, row: usize) -> f64 {
        match self {
            Self::F32(array) => array.value(row) as f64,
            Self::F64(array) => array.value(row),
        }
    }
}

fn out_of_range(name: &str, row: usize, value: i64) -> RjpsiError {
    RjpsiError::ValueOutOfRange {
        name: name.to_string(),
        row,
        value,
    }
}

/// Read an integer as the narrower type of the field it fills.
fn narrow<T: TryFrom<i64>>(column: &Int64Array, name: &str, row: usize) -> RjpsiResult<T> {
    let value = column.value(row);
    T::try_from(value).map_err(|_| out_of_range(name, row, value))
}

fn invalid_type(name: &str, datatype: &DataType) -> RjpsiError {
    RjpsiError::InvalidColumnType {
        name: name.to_string(),
        datatype: datatype.to_string(),
    }
}

pub(crate) fn find_float_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> RjpsiResult<Option<FloatColumn<'a>>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let datatype = column.data_type();
    let float_column = match datatype {
        DataType::Float32 => column
            .as_any()
            .downcast_ref::<Float32Array>()
            .map(FloatColumn::F32),
        DataType::Float64 => column
            .as_any()
            .downcast_ref::<Float64Array>()
            .map(FloatColumn::F64),
        _ => None,
    };
    float_column
        .map(Some)
        .ok_or_else(|| invalid_type(name, datatype))
}

pub(crate) fn float_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> RjpsiResult<FloatColumn<'a>> {
    find_float_column(batch, name)?.ok_or_else(|| RjpsiError::MissingColumn {
        name: name.to_string(),
    })
}

fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> RjpsiResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RjpsiError::MissingColumn {
            name: name.to_string(),
        })
}

fn int_column(batch: &RecordBatch, name: &str) -> RjpsiResult<Int64Array> {
    let column = required_column(batch, name)?;
    if !column.data_type().is_integer() {
        return Err(invalid_type(name, column.data_type()));
    }
    let cast_column = cast(column, &DataType::Int64)?;
    cast_column
        .as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| invalid_type(name, column.data_type()))
}

fn bool_column<'a>(batch: &'a RecordBatch, name: &str) -> RjpsiResult<Option<&'a BooleanArray>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    column
        .as_any()
        .downcast_ref::<BooleanArray>()
        .map(Some)
        .ok_or_else(|| invalid_type(name, column.data_type()))
}

/// A list-of-integers column with its values flattened to `i64`.
struct IndexListColumn {
    offsets: Vec<usize>,
    values: Int64Array,
}

impl IndexListColumn {
    fn new(batch: &RecordBatch, name: &str) -> RjpsiResult<Self> {
        let column = required_column(batch, name)?;
        let is_int_list = match column.data_type() {
            DataType::List(field) | DataType::LargeList(field) => field.data_type().is_integer(),
            _ => false,
        };
        if !is_int_list {
            return Err(invalid_type(name, column.data_type()));
        }
        let target = DataType::List(Arc::new(Field::new("item", DataType::Int64, true)));
        let cast_column = cast(column, &target)?;
        let list = cast_column
            .as_any()
            .downcast_ref::<ListArray>()
            .ok_or_else(|| invalid_type(name, column.data_type()))?;
        let values = list
            .values()
            .as_any()
            .downcast_ref::<Int64Array>()
            .cloned()
            .ok_or_else(|| invalid_type(name, column.data_type()))?;
        let offsets = list
            .value_offsets()
            .iter()
            .map(|&offset| offset as usize)
            .collect();
        Ok(Self { offsets, values })
    }

    fn indices(&self, name: &str, row: usize) -> RjpsiResult<Vec<usize>> {
        (self.offsets[row]..self.offsets[row + 1])
            .map(|i| {
                let value = self.values.value(i);
                usize::try_from(value).map_err(|_| out_of_range(name, row, value))
            })
            .collect()
    }
}

struct ParticleColumns<'a> {
    run: Int64Array,
    lumi: Int64Array,
    event: Int64Array,
    qscale: Option<FloatColumn<'a>>,
    weight: Option<FloatColumn<'a>>,
    pdg_id: Int64Array,
    status: Int64Array,
    charge: Int64Array,
    last_copy: Option<&'a BooleanArray>,
    hard_process: Option<&'a BooleanArray>,
    p4: [FloatColumn<'a>; 4],
    vertex: [FloatColumn<'a>; 3],
    mothers: IndexListColumn,
    daughters: IndexListColumn,
}

impl<'a> ParticleColumns<'a> {
    fn new(batch: &'a RecordBatch) -> RjpsiResult<Self> {
        Ok(Self {
            run: int_column(batch, "run")?,
            lumi: int_column(batch, "lumi")?,
            event: int_column(batch, "event")?,
            qscale: find_float_column(batch, "qscale")?,
            weight: find_float_column(batch, "weight")?,
            pdg_id: int_column(batch, "pdg_id")?,
            status: int_column(batch, "status")?,
            charge: int_column(batch, "charge")?,
            last_copy: bool_column(batch, "is_last_copy")?,
            hard_process: bool_column(batch, "is_hard_process")?,
            p4: [
                float_column(batch, "px")?,
                float_column(batch, "py")?,
                float_column(batch, "pz")?,
                float_column(batch, "e")?,
            ],
            vertex: [
                float_column(batch, "vx")?,
                float_column(batch, "vy")?,
                float_column(batch, "vz")?,
            ],
            mothers: IndexListColumn::new(batch, "mothers")?,
            daughters: IndexListColumn::new(batch, "daughters")?,
        })
    }

    fn header(&self, row: usize) -> RjpsiResult<EventHeader> {
        Ok(EventHeader {
            run: narrow(&self.run, "run", row)?,
            lumi: narrow(&self.lumi, "lumi", row)?,
            event: narrow(&self.event, "event", row)?,
            qscale: self.qscale.map_or(f64::NAN, |column| column.value(row)),
            weight: self.weight.map_or(1.0, |column| column.value(row)),
        })
    }

    fn particle(&self, row: usize) -> RjpsiResult<ParticleRecord> {
        let [px, py, pz, e] = self.p4.map(|column| column.value(row));
        let [vx, vy, vz] = self.vertex.map(|column| column.value(row));
        Ok(ParticleRecord {
            pdg_id: narrow(&self.pdg_id, "pdg_id", row)?,
            status: narrow(&self.status, "status", row)?,
            charge: narrow(&self.charge, "charge", row)?,
            p4: Vec4::new(px, py, pz, e),
            vertex: Vec3::new(vx, vy, vz),
            last_copy: self.last_copy.map_or(true, |column| column.value(row)),
            hard_process: self.hard_process.map_or(false, |column| column.value(row)),
            mothers: self.mothers.indices("mothers", row)?,
            daughters: self.daughters.indices("daughters", row)?,
        })
    }
}

fn particle_schema() -> Schema {
    let index_list = DataType::List(Arc::new(Field::new("item", DataType::Int32, true)));
    Schema::new(vec![
        Field::new("run", DataType::UInt32, false),
        Field::new("lumi", DataType::UInt32, false),
        Field::new("event", DataType::UInt64, false),
        Field::new("qscale", DataType::Float64, false),
        Field::new("weight", DataType::Float64, false),
        Field::new("pdg_id", DataType::Int32, false),
        Field::new("status", DataType::Int32, false),
        Field::new("charge", DataType::Int32, false),
        Field::new("is_last_copy", DataType::Boolean, false),
        Field::new("is_hard_process", DataType::Boolean, false),
        Field::new("px", DataType::Float64, false),
        Field::new("py", DataType::Float64, false),
        Field::new("pz", DataType::Float64, false),
        Field::new("e", DataType::Float64, false),
        Field::new("vx", DataType::Float64, false),
        Field::new("vy", DataType::Float64, false),
        Field::new("vz", DataType::Float64, false),
        Field::new("mothers", index_list.clone(), false),
        Field::new("daughters", index_list, false),
    ])
}

#[derive(Default)]
struct ParticleBatchBuilder {
    run: UInt32Builder,
    lumi: UInt32Builder,
    event: UInt64Builder,
    qscale: Float64Builder,
    weight: Float64Builder,
    pdg_id: Int32Builder,
    status: Int32Builder,
    charge: Int32Builder,
    last_copy: BooleanBuilder,
    hard_process: BooleanBuilder,
    p4: [Float64Builder; 4],
    vertex: [Float64Builder; 3],
    mothers: ListBuilder<Int32Builder>,
    daughters: ListBuilder<Int32Builder>,
}

impl ParticleBatchBuilder {
    fn append_event(&mut self, event: &GenEvent) -> RjpsiResult<()> {
        let header = event.header();
        for particle in event.particles() {
            self.run.append_value(header.run);
            self.lumi.append_value(header.lumi);
            self.event.append_value(header.event);
            self.qscale.append_value(header.qscale);
            self.weight.append_value(header.weight);
            self.pdg_id.append_value(particle.pdg_id);
            self.status.append_value(particle.status);
            self.charge.append_value(particle.charge);
            self.last_copy.append_value(particle.last_copy);
            self.hard_process.append_value(particle.hard_process);
            let p4 = [particle.p4.x, particle.p4.y, particle.p4.z, particle.p4.t];
            for (builder, value) in self.p4.iter_mut().zip(p4) {
                builder.append_value(value);
            }
            let vertex = [particle.vertex.x, particle.vertex.y, particle.vertex.z];
            for (builder, value) in self.vertex.iter_mut().zip(vertex) {
                builder.append_value(value);
            }
            for (builder, indices) in [
                (&mut self.mothers, &particle.mothers),
                (&mut self.daughters, &particle.daughters),
            ] {
                for &index in indices {
                    let index = i32::try_from(index).map_err(|_| {
                        RjpsiError::Custom(format!("Particle index {index} does not fit in i32"))
                    })?;
                    builder.values().append_value(index);
                }
                builder.append(true);
            }
        }
        Ok(())
    }

    fn finish(&mut self, schema: Arc<Schema>) -> arrow::error::Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(self.run.finish()),
            Arc::new(self.lumi.finish()),
            Arc::new(self.event.finish()),
            Arc::new(self.qscale.finish()),
            Arc::new(self.weight.finish()),
            Arc::new(self.pdg_id.finish()),
            Arc::new(self.status.finish()),
            Arc::new(self.charge.finish()),
            Arc::new(self.last_copy.finish()),
            Arc::new(self.hard_process.finish()),
        ];
        for builder in self.p4.iter_mut().chain(self.vertex.iter_mut()) {
            columns.push(Arc::new(builder.finish()));
        }
        columns.push(Arc::new(self.mothers.finish()));
        columns.push(Arc::new(self.daughters.finish()));
        RecordBatch::try_new(schema, columns)
    }
}

/// Persist [`GenEvent`]s as a Parquet particle listing readable by [`read_parquet_events`].
///
/// `events_per_batch` events are grouped into each record batch.
pub fn write_parquet_events(
    events: &[GenEvent],
    file_path: &str,
    events_per_batch: usize,
) -> RjpsiResult<()> {
    let path = expand_output_path(file_path)?;
    let schema = Arc::new(particle_schema());
    let file = File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema.clone(), None)
        .map_err(|err| RjpsiError::Custom(format!("Failed to create Parquet writer: {err}")))?;
    for chunk in events.chunks(events_per_batch.max(1)) {
        let mut builder = ParticleBatchBuilder::default();
        for event in chunk {
            builder.append_event(event)?;
        }
        let batch = builder
            .finish(schema.clone())
            .map_err(|err| RjpsiError::Custom(format!("Failed to build Parquet batch: {err}")))?;
        writer
            .write(&batch)
            .map_err(|err| RjpsiError::Custom(format!("Failed to write Parquet batch: {err}")))?;
    }
    writer
        .close()
        .map_err(|err| RjpsiError::Custom(format!("Failed to finalise Parquet file: {err}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::{env, fs};

    fn make_temp_dir() -> PathBuf {
        let dir = env::temp_dir().join(format!("rjpsi_test_{}", fastrand::u64(..)));
        fs::create_dir(&dir).expect("temp dir should be created");
        dir
    }

    fn numbered(event: &GenEvent, number: u64) -> GenEvent {
        let mut header = *event.header();
        header.event = number;
        GenEvent::new(header, event.particles().to_vec()).expect("fixture should be valid")
    }

    #[test]
    fn test_round_trip_across_batches_and_files() {
        let dir = make_temp_dir();
        let events: Vec<GenEvent> = (0..5).map(|i| numbered(&test_event(), 100 + i)).collect();
        let first = dir.join("first.parquet");
        let second = dir.join("second.parquet");
        write_parquet_events(&events[..3], first.to_str().unwrap(), 2).unwrap();
        write_parquet_events(&events[3..], second.to_str().unwrap(), 1).unwrap();

        // batches of 7 rows split the 10-particle events
        let reader = read_parquet_events(
            &[first.to_str().unwrap(), second.to_str().unwrap()],
            &EventReadOptions::new().batch_size(7),
        )
        .unwrap();
        let read: Vec<GenEvent> = reader.collect::<RjpsiResult<_>>().unwrap();
        assert_eq!(read.len(), 5);
        for (written, read) in events.iter().zip(&read) {
            assert_eq!(written.header().event, read.header().event);
            assert_relative_eq!(written.header().qscale, read.header().qscale);
            assert_eq!(written.len(), read.len());
            for (a, b) in written.particles().iter().zip(read.particles()) {
                assert_eq!(a, b);
            }
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = make_temp_dir();
        let missing = dir.join("missing.parquet");
        let result = read_parquet_events(&[missing.to_str().unwrap()], &EventReadOptions::new());
        assert!(result.is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_column_is_reported_once() {
        let dir = make_temp_dir();
        let path = dir.join("no_vertex.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("run", DataType::Int64, false),
            Field::new("px", DataType::Float32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1_i64])),
                Arc::new(Float32Array::from(vec![1.0_f32])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let mut reader =
            read_parquet_events(&[path.to_str().unwrap()], &EventReadOptions::new()).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(RjpsiError::MissingColumn { ref name })) if name == "lumi"
        ));
        assert!(reader.next().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_out_of_range_codes_are_rejected() {
        let dir = make_temp_dir();
        let source = dir.join("source.parquet");
        write_parquet_events(&[test_event()], source.to_str().unwrap(), 100).unwrap();
        let batch = ParquetRecordBatchReaderBuilder::try_new(File::open(&source).unwrap())
            .unwrap()
            .build()
            .unwrap()
            .next()
            .unwrap()
            .unwrap();

        // a 64-bit identity code does not fit the 32-bit field
        let index = batch.schema().index_of("pdg_id").unwrap();
        let mut pdg_ids = vec![13_i64; batch.num_rows()];
        pdg_ids[2] = 1 << 40;
        let mut fields: Vec<Field> = batch
            .schema()
            .fields()
            .iter()
            .map(|field| field.as_ref().clone())
            .collect();
        fields[index] = Field::new("pdg_id", DataType::Int64, false);
        let mut columns = batch.columns().to_vec();
        columns[index] = Arc::new(Int64Array::from(pdg_ids));
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let path = dir.join("wide_codes.parquet");
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let mut reader =
            read_parquet_events(&[path.to_str().unwrap()], &EventReadOptions::new()).unwrap();
        assert!(matches!(
            reader.next(),
            Some(Err(RjpsiError::ValueOutOfRange { ref name, row: 2, value }))
                if name == "pdg_id" && value == 1 << 40
        ));
        assert!(reader.next().is_none());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_narrowing() {
        let column = Int64Array::from(vec![-1, 7, i64::from(u32::MAX) + 1]);
        assert_eq!(narrow::<i32>(&column, "status", 0).unwrap(), -1);
        assert_eq!(narrow::<u32>(&column, "run", 1).unwrap(), 7);
        assert!(matches!(
            narrow::<u32>(&column, "run", 0),
            Err(RjpsiError::ValueOutOfRange { value: -1, .. })
        ));
        assert!(narrow::<u32>(&column, "lumi", 2).is_err());
        assert_eq!(narrow::<u64>(&column, "event", 2).unwrap(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_job_selection() {
        let files = ["a", "b", "c", "d", "e"];
        assert_eq!(select_job_files(&files, 2, 0).unwrap(), vec!["a", "b"]);
        assert_eq!(select_job_files(&files, 2, 2).unwrap(), vec!["e"]);
        assert!(matches!(
            select_job_files(&files, 2, 3),
            Err(RjpsiError::JobSelection { n_files: 5, .. })
        ));
        assert_eq!(select_job_files(&files, 10, 0).unwrap().len(), 5);
    }
}
