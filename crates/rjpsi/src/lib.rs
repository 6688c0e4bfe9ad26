//! `rjpsi` builds flat analysis tables from generator-level particle listings of
//! $`H_b \to J/\psi\,\mu X`$ samples. It was written for the R(J/ψ) measurement, where the
//! shape of the missing-mass and $`q^2`$ distributions of the background has to be understood at
//! generator level before any detector simulation is involved.
//!
//! # Table of Contents
//! - [What It Does](#what-it-does)
//! - [Quick Start](#quick-start)
//! - [Data Format](#data-format)
//! - [Output](#output)
//! - [Command-Line Tool](#command-line-tool)
//!
//! # What It Does
//! For every event, each $`J/\psi`$ candidate is traced back through the decay graph to the
//! hadron it came from. Stable muons are split into those from the candidate and the rest, and
//! the leading muon of the rest is combined with the candidate into a three-body system. From
//! there the usual semileptonic observables are computed: the missing mass squared, the missing
//! transverse momentum, $`q^2`$ and the energy of the third muon in several rest frames. The same
//! quantities are also computed with the three-muon system rescaled to the $`B_c^+`$ mass, which
//! is what a reconstruction-level analysis would have access to. Flight distance, boost and
//! lifetime weights for the originating hadron complete the row.
//!
//! A row is written only when both signal muons and a third muon were found and the originating
//! hadron is a b hadron. Everything else is counted in the [`RunSummary`] and explained in the
//! `debug` log.
//!
//! # Quick Start
//! ```rust
//! use rjpsi::{data::test_event, Inspector, OutputRow};
//!
//! let inspector = Inspector::default();
//! let mut rows: Vec<OutputRow> = Vec::new();
//! let summary = inspector.run([Ok(test_event())], &mut rows).unwrap();
//! assert_eq!(summary.rows, 1);
//! println!("m2_miss = {}", rows[0].m2_miss);
//! ```
//!
//! Events are usually streamed from disk and rows written straight to a file:
//! ```rust,no_run
//! use rjpsi::{
//!     data::{read_parquet_events, EventReadOptions},
//!     Inspector, RowWriter, RowWriterOptions,
//! };
//!
//! let files = ["gen_0.parquet", "gen_1.parquet"];
//! let events = read_parquet_events(&files, &EventReadOptions::new()).unwrap();
//! let mut writer = RowWriter::create("rows.parquet", &RowWriterOptions::new()).unwrap();
//! let summary = Inspector::default().run(events, &mut writer).unwrap();
//! writer.close().unwrap();
//! println!("{summary}");
//! ```
//!
//! # Data Format
//! Input files hold one row per generated particle, with the particles of an event stored
//! contiguously. Events are separated wherever `(run, lumi, event)` changes.
//!
//! | Column name       | Data Type            | Interpretation                               |
//! | ----------------- | -------------------- | -------------------------------------------- |
//! | `run`             | any integer          | Run number                                   |
//! | `lumi`            | any integer          | Luminosity block                             |
//! | `event`           | any integer          | Event number                                 |
//! | `qscale`          | `Float32`/`Float64`  | Hard-process scale (optional)                |
//! | `weight`          | `Float32`/`Float64`  | Generator weight (optional, defaults to 1)   |
//! | `pdg_id`          | any integer          | Particle identity code                       |
//! | `status`          | any integer          | Generator status code                        |
//! | `charge`          | any integer          | Charge in units of $`e`$                     |
//! | `is_last_copy`    | `Boolean`            | Last-copy flag (optional, defaults to true)  |
//! | `is_hard_process` | `Boolean`            | Hard-process flag (optional, defaults to false) |
//! | `px`, `py`, `pz`, `e` | `Float32`/`Float64` | Four-momentum in GeV                      |
//! | `vx`, `vy`, `vz`  | `Float32`/`Float64`  | Production vertex in cm                      |
//! | `mothers`         | list of integers     | Event-local indices of the mothers           |
//! | `daughters`       | list of integers     | Event-local indices of the daughters         |
//!
//! [`data::write_parquet_events`] writes this layout.
//!
//! # Output
//! One flat table with the columns listed in [`OutputRow::COLUMNS`]. Quantities which could not
//! be computed for a candidate are NaN. The table is written as Parquet or as a ROOT TTree named
//! `tree`, depending on the file extension.
//!
//! # Command-Line Tool
//! The `rjpsi-inspect` binary wraps the whole pipeline:
//! ```shell
//! rjpsi-inspect gen_*.parquet --destination out --files-per-job 2 --jobid 3
//! ```
//! Run it with `--help` for the full list of options.
#![warn(clippy::perf, clippy::style, missing_docs)]

/// Generator-level events and their Parquet I/O.
pub mod data {
    pub use rjpsi_core::data::io::{
        read_parquet_events, select_job_files, write_parquet_events, EventReadOptions,
        EventReader, PARTICLE_COLUMNS,
    };
    pub use rjpsi_core::data::{
        test_event, EventHeader, GenEvent, GenEventBuilder, ParticleRecord, FINAL_STATE,
    };
}
/// Walking the decay graph of an event.
pub mod genealogy {
    pub use rjpsi_core::genealogy::*;
}
/// Flight, lifetime and missing-mass observables.
pub mod kinematics {
    pub use rjpsi_core::kinematics::*;
}
/// The flat analysis table and its writers.
pub mod output {
    pub use rjpsi_core::output::*;
    pub use rjpsi_core::row::{OutputRow, RowBuilder};
}
/// Utility functions, enums, and traits
pub mod utils {
    pub use rjpsi_core::utils::*;
}

pub use rjpsi_core::data::{EventHeader, GenEvent, ParticleRecord};
pub use rjpsi_core::genealogy::{Ancestry, AncestryRules};
pub use rjpsi_core::inspector::{Inspector, InspectorConfig, Outcome, Rejection, RunSummary};
pub use rjpsi_core::kinematics::{CtauReweighting, DecayGeometry, ThreeBodyObservables};
pub use rjpsi_core::output::{RowSink, RowWriter, RowWriterOptions};
pub use rjpsi_core::row::{OutputRow, RowBuilder};
pub use rjpsi_core::utils::enums::{FloatPrecision, OutputFormat};
pub use rjpsi_core::utils::pdg::{ParticleNamer, PdgTable};
pub use rjpsi_core::utils::vectors::{Vec3, Vec4};
pub use rjpsi_core::{RjpsiError, RjpsiResult};
