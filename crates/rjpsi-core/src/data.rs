use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    utils::vectors::{Vec3, Vec4},
    RjpsiError, RjpsiResult,
};

/// Event I/O for columnar particle listings.
pub mod io;

/// Status code of stable final-state particles.
pub const FINAL_STATE: i32 = 1;

/// A single generated particle.
///
/// Mother and daughter references are positions in the owning [`GenEvent`]'s particle list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// The signed identity code
    pub pdg_id: i32,
    /// The generator status code (`1` for stable final-state particles)
    pub status: i32,
    /// Electric charge in units of $`e`$
    pub charge: i32,
    /// Four-momentum in GeV
    pub p4: Vec4,
    /// Production vertex in cm
    pub vertex: Vec3,
    /// Whether this is the generator's final copy of the particle before it decays
    pub last_copy: bool,
    /// Whether the particle takes part in the hard scattering
    pub hard_process: bool,
    /// Indices of the mothers, in generator order
    pub mothers: Vec<usize>,
    /// Indices of the daughters, in generator order
    pub daughters: Vec<usize>,
}

impl ParticleRecord {
    /// A particle with no links, no charge, and the last-copy flag set.
    pub fn new(pdg_id: i32, status: i32, p4: Vec4, vertex: Vec3) -> Self {
        Self {
            pdg_id,
            status,
            charge: 0,
            p4,
            vertex,
            last_copy: true,
            hard_process: false,
            mothers: Vec::new(),
            daughters: Vec::new(),
        }
    }

    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_last_copy(mut self, last_copy: bool) -> Self {
        self.last_copy = last_copy;
        self
    }

    pub fn with_hard_process(mut self, hard_process: bool) -> Self {
        self.hard_process = hard_process;
        self
    }

    pub fn is_final_state(&self) -> bool {
        self.status == FINAL_STATE
    }

    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }

    pub fn eta(&self) -> f64 {
        self.p4.eta()
    }

    pub fn phi(&self) -> f64 {
        self.p4.phi()
    }

    pub fn rapidity(&self) -> f64 {
        self.p4.rapidity()
    }

    pub fn mass(&self) -> f64 {
        self.p4.m()
    }
}

/// Run, luminosity block and event numbers plus the per-event generator scalars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventHeader {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
    /// The hard-process energy scale, or NaN if the source has none
    pub qscale: f64,
    /// The generator weight
    pub weight: f64,
}

impl Default for EventHeader {
    fn default() -> Self {
        Self {
            run: 1,
            lumi: 1,
            event: 0,
            qscale: f64::NAN,
            weight: 1.0,
        }
    }
}

/// One generated event, stored as an arena of [`ParticleRecord`]s.
///
/// Every mother and daughter index is checked against the arena when the event is built, so
/// traversals never go out of bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenEvent {
    header: EventHeader,
    particles: Vec<ParticleRecord>,
}

impl GenEvent {
    /// Build an event, checking that every reference lands inside it.
    pub fn new(header: EventHeader, particles: Vec<ParticleRecord>) -> RjpsiResult<Self> {
        let n_particles = particles.len();
        for (index, particle) in particles.iter().enumerate() {
            if let Some(&reference) = particle
                .mothers
                .iter()
                .chain(&particle.daughters)
                .find(|&&reference| reference >= n_particles)
            {
                return Err(RjpsiError::InvalidParticleReference {
                    event: header.event,
                    particle: index,
                    reference,
                    n_particles,
                });
            }
        }
        Ok(Self { header, particles })
    }

    pub fn header(&self) -> &EventHeader {
        &self.header
    }

    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles
    }

    /// Panics if `index` is out of range.
    pub fn particle(&self, index: usize) -> &ParticleRecord {
        &self.particles[index]
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Indices of all particles for which `predicate` holds, in arena order.
    pub fn select<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&ParticleRecord) -> bool,
    {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, particle)| predicate(particle))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Display for GenEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Event {}:{}:{} (qscale = {}, weight = {}):",
            self.header.run,
            self.header.lumi,
            self.header.event,
            self.header.qscale,
            self.header.weight
        )?;
        for (index, particle) in self.particles.iter().enumerate() {
            writeln!(
                f,
                "  {index:>4} id {:>8} status {:>3} {} mothers {:?} daughters {:?}",
                particle.pdg_id,
                particle.status,
                particle.p4.to_p4_string(),
                particle.mothers,
                particle.daughters
            )?;
        }
        Ok(())
    }
}

/// Incrementally assembles a [`GenEvent`], keeping mother and daughter lists consistent.
#[derive(Debug, Clone, Default)]
pub struct GenEventBuilder {
    header: EventHeader,
    particles: Vec<ParticleRecord>,
}

impl GenEventBuilder {
    pub fn new(header: EventHeader) -> Self {
        Self {
            header,
            particles: Vec::new(),
        }
    }

    /// Append a particle and return its index.
    pub fn add(&mut self, particle: ParticleRecord) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    /// Append a particle as a daughter of each of `mothers` and return its index.
    pub fn add_with_mothers(&mut self, particle: ParticleRecord, mothers: &[usize]) -> usize {
        let index = self.add(particle);
        for &mother in mothers {
            self.link(mother, index);
        }
        index
    }

    /// Record a mother-daughter edge on both particles. Out-of-range indices are reported by
    /// [`GenEventBuilder::build`].
    pub fn link(&mut self, mother: usize, daughter: usize) {
        if let Some(particle) = self.particles.get_mut(daughter) {
            particle.mothers.push(mother);
        }
        if let Some(particle) = self.particles.get_mut(mother) {
            particle.daughters.push(daughter);
        }
    }

    pub fn build(self) -> RjpsiResult<GenEvent> {
        GenEvent::new(self.header, self.particles)
    }
}

/// Indices of the particles of interest in [`test_event`].
pub mod test_indices {
    pub const B_QUARK: usize = 1;
    pub const ANTI_B_QUARK: usize = 2;
    pub const BC: usize = 4;
    pub const JPSI: usize = 5;
    pub const EXTRA_MU: usize = 6;
    pub const NU_MU: usize = 7;
    pub const MU_TRAILING: usize = 8;
    pub const MU_LEADING: usize = 9;
}

/// The production vertex of the $`B_c^+`$ in [`test_event`].
pub const TEST_PV: Vec3 = Vec3::new(0.01, 0.02, -0.5);
/// The decay vertex of the $`B_c^+`$ in [`test_event`], 2 mm away from [`TEST_PV`].
pub const TEST_SV: Vec3 = Vec3::new(0.13, 0.18, -0.5);

/// An event that can be used to test the inspector. It contains
/// $`B_c^+ \to J/\psi(\to \mu^+\mu^-)\,\mu^+\nu_\mu`$ with a 30 GeV $`B_c^+`$ of mass 5.28 GeV,
/// muons of 10 and 5 GeV from the $`J/\psi`$, and a flight distance of 2 mm.
pub fn test_event() -> GenEvent {
    use test_indices::*;
    let origin = Vec3::zero();
    let mut builder = GenEventBuilder::new(EventHeader {
        run: 1,
        lumi: 7,
        event: 1234,
        qscale: 42.5,
        weight: 1.0,
    });
    let beam = builder.add(
        ParticleRecord::new(2212, 4, Vec4::new(0.0, 0.0, 6500.0, 6500.0), origin).with_charge(1),
    );
    let b = builder.add_with_mothers(
        ParticleRecord::new(5, 23, Vec4::from_pt_eta_phi_m(35.0, 0.25, 0.6, 4.8), origin)
            .with_hard_process(true),
        &[beam],
    );
    let bbar = builder.add_with_mothers(
        ParticleRecord::new(-5, 23, Vec4::from_pt_eta_phi_m(22.0, -1.4, -2.5, 4.8), origin)
            .with_hard_process(true),
        &[beam],
    );
    debug_assert_eq!((b, bbar), (B_QUARK, ANTI_B_QUARK));
    let string = builder.add_with_mothers(
        ParticleRecord::new(92, 2, Vec4::from_pt_eta_phi_m(32.0, 0.3, 0.6, 12.0), origin),
        &[b, bbar],
    );
    let bc_p4 = Vec4::from_pt_eta_phi_m(30.0, 0.3, 0.6, 5.28);
    let bc = builder.add_with_mothers(
        ParticleRecord::new(541, 2, bc_p4, TEST_PV).with_charge(1),
        &[string],
    );
    let mu_leading = Vec4::from_pt_eta_phi_m(10.0, 0.3, 0.5, 0.105_658_375_5);
    let mu_trailing = Vec4::from_pt_eta_phi_m(5.0, 0.1, 0.9, 0.105_658_375_5);
    let mu_extra = Vec4::from_pt_eta_phi_m(4.0, 0.4, 0.2, 0.105_658_375_5);
    let jpsi_p4 = mu_leading + mu_trailing;
    let jpsi = builder.add_with_mothers(ParticleRecord::new(443, 2, jpsi_p4, TEST_SV), &[bc]);
    let extra = builder.add_with_mothers(
        ParticleRecord::new(-13, 1, mu_extra, TEST_SV).with_charge(1),
        &[bc],
    );
    let neutrino = builder.add_with_mothers(
        ParticleRecord::new(14, 1, bc_p4 - jpsi_p4 - mu_extra, TEST_SV),
        &[bc],
    );
    // trailing muon comes first in the arena, so pt ordering has to come from sorting
    let trailing = builder.add_with_mothers(
        ParticleRecord::new(13, 1, mu_trailing, TEST_SV).with_charge(-1),
        &[jpsi],
    );
    let leading = builder.add_with_mothers(
        ParticleRecord::new(-13, 1, mu_leading, TEST_SV).with_charge(1),
        &[jpsi],
    );
    debug_assert_eq!(
        (bc, jpsi, extra, neutrino, trailing, leading),
        (BC, JPSI, EXTRA_MU, NU_MU, MU_TRAILING, MU_LEADING)
    );
    GenEvent {
        header: builder.header,
        particles: builder.particles,
    }
}
