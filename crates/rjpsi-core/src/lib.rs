//! # rjpsi-core
//!
//! This is an internal crate used by `rjpsi`.
#![warn(clippy::perf, clippy::style)]
#![allow(clippy::excessive_precision)]

use thiserror::Error;

/// Methods for loading generator-level [`GenEvent`](crate::data::GenEvent)s.
pub mod data;
/// Ancestry and descendant resolution over the decay graph of a single event.
pub mod genealogy;
/// The per-event candidate loop which ties walking, kinematics and emission together.
pub mod inspector;
/// Displacement, lifetime and three-body missing-mass observables.
pub mod kinematics;
/// Row writers for the flat analysis table.
pub mod output;
/// The fixed-schema [`OutputRow`](crate::row::OutputRow) and its builder.
pub mod row;
/// Utility functions, enums, and traits
pub mod utils;

pub use crate::data::{EventHeader, GenEvent, ParticleRecord};
pub use crate::genealogy::{Ancestry, AncestryRules};
pub use crate::inspector::{Inspector, InspectorConfig, Outcome, Rejection, RunSummary};
pub use crate::kinematics::{CtauReweighting, DecayGeometry, ThreeBodyObservables};
pub use crate::output::{RowSink, RowWriter, RowWriterOptions};
pub use crate::row::{OutputRow, RowBuilder};
pub use crate::utils::enums::{FloatPrecision, OutputFormat};
pub use crate::utils::pdg::{ParticleNamer, PdgTable};
pub use crate::utils::vectors::{Vec3, Vec4};

/// Shorthand for results produced by `rjpsi` methods.
pub type RjpsiResult<T> = Result<T, RjpsiError>;

/// The error type used by all `rjpsi` internal methods
#[derive(Error, Debug)]
pub enum RjpsiError {
    /// An alias for [`std::io::Error`].
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// An alias for [`parquet::errors::ParquetError`].
    #[error("Parquet Error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),
    /// An alias for [`arrow::error::ArrowError`].
    #[error("Arrow Error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),
    /// An alias for [`shellexpand::LookupError`].
    #[error("Failed to expand path: {0}")]
    LookupError(#[from] shellexpand::LookupError<std::env::VarError>),
    /// A required column is absent from an input file.
    #[error("Required column \"{name}\" was not found")]
    MissingColumn {
        /// Name of the missing column
        name: String,
    },
    /// A column exists but has a type which cannot be interpreted.
    #[error("Column \"{name}\" has unsupported type {datatype}")]
    InvalidColumnType {
        /// Name of the offending column
        name: String,
        /// The Arrow data type found in the file
        datatype: String,
    },
    /// An integer column holds a value which does not fit the field it is read into.
    #[error("Column \"{name}\" holds {value} at row {row}, which is out of range")]
    ValueOutOfRange {
        /// Name of the offending column
        name: String,
        /// Row of the value within its record batch
        row: usize,
        /// The value as stored
        value: i64,
    },
    /// A mother or daughter reference points outside of its event.
    #[error(
        "Particle {particle} in event {event} references index {reference}, but the event only has {n_particles} particles"
    )]
    InvalidParticleReference {
        /// Event number in which the reference was found
        event: u64,
        /// Index of the particle holding the reference
        particle: usize,
        /// The dangling index
        reference: usize,
        /// Number of particles in the event
        n_particles: usize,
    },
    /// An error returned when a string cannot be parsed into an enum.
    #[error("Failed to parse string: \"{name}\" does not correspond to a valid \"{object}\"!")]
    ParseError {
        /// The string which was parsed
        name: String,
        /// The name of the object it failed to parse into
        object: String,
    },
    /// A job slice selects no input files.
    #[error("Job {job_id} with {files_per_job} files per job is out of range for {n_files} input files")]
    JobSelection {
        /// The requested job index
        job_id: usize,
        /// Number of files assigned to each job
        files_per_job: usize,
        /// Total number of input files
        n_files: usize,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own error
    /// category.
    #[error("{0}")]
    Custom(String),
}
