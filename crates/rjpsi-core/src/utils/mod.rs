/// Output format and precision selectors.
pub mod enums;
/// Identity-code classification and human-readable particle names.
pub mod pdg;
/// Three- and four-vectors with the kinematic accessors used throughout the crate (in
/// particular, treating [`Vec4`](vectors::Vec4) as a four-momentum).
pub mod vectors;
