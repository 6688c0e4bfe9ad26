use crate::{
    data::{EventHeader, GenEvent, ParticleRecord},
    kinematics::{CtauReweighting, DecayGeometry, ThreeBodyObservables},
};

macro_rules! output_row {
    ($($field:ident),* $(,)?) => {
        /// One row of the flat analysis table.
        ///
        /// Every field is either a defined value or NaN. Integer quantities such as identifiers,
        /// charges and counts are stored as floats, and flags as `0.0`/`1.0`.
        #[derive(Copy, Clone, Debug, PartialEq)]
        pub struct OutputRow {
            $(pub $field: f64,)*
        }

        impl OutputRow {
            /// Column names, in file order.
            pub const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),*];

            /// A row with every field set to NaN.
            pub fn undefined() -> Self {
                Self {
                    $($field: f64::NAN,)*
                }
            }

            /// Field values in the order of [`OutputRow::COLUMNS`].
            pub fn values(&self) -> Vec<f64> {
                vec![$(self.$field),*]
            }

            /// Look up a field by column name.
            pub fn get(&self, column: &str) -> Option<f64> {
                match column {
                    $(stringify!($field) => Some(self.$field),)*
                    _ => None,
                }
            }

            /// Rebuild a row from values in the order of [`OutputRow::COLUMNS`].
            pub fn from_values(values: &[f64]) -> Option<Self> {
                if values.len() != Self::COLUMNS.len() {
                    return None;
                }
                let mut values = values.iter().copied();
                Some(Self {
                    $($field: values.next()?,)*
                })
            }
        }
    };
}

output_row!(
    run,
    lumi,
    event,
    qscale,
    weight,
    min_bq_pt,
    max_bq_eta,
    mu1_pt,
    mu1_eta,
    mu1_y,
    mu1_phi,
    mu1_q,
    mu2_pt,
    mu2_eta,
    mu2_y,
    mu2_phi,
    mu2_q,
    jpsi_pt,
    jpsi_eta,
    jpsi_y,
    jpsi_phi,
    jpsi_m,
    jpsi_status,
    bhad_pt,
    bhad_eta,
    bhad_y,
    bhad_phi,
    bhad_m,
    bhad_q,
    bhad_pdgid,
    mmm_pt,
    mmm_eta,
    mmm_y,
    mmm_phi,
    mmm_m,
    mmm_q,
    m2_miss,
    pt_miss_sca,
    pt_miss_vec,
    q2,
    e_star_mu3,
    e_hash_mu3,
    ptvar,
    m2_miss_reco,
    pt_miss_sca_reco,
    pt_miss_vec_reco,
    q2_reco,
    e_star_mu3_reco,
    mu3_pt,
    mu3_eta,
    mu3_y,
    mu3_phi,
    mu3_q,
    dr_jpsi_m,
    dr12,
    dr23,
    dr13,
    m12,
    m13,
    m23,
    is3m,
    pv_x,
    pv_y,
    pv_z,
    sv_x,
    sv_y,
    sv_z,
    lxyz,
    beta,
    gamma,
    ct,
    ctau_weight_central,
    ctau_weight_up,
    ctau_weight_down,
    n_extra_mu,
    n_jpsi,
);

impl Default for OutputRow {
    fn default() -> Self {
        Self::undefined()
    }
}

/// Builds one [`OutputRow`].
///
/// A builder starts from [`OutputRow::undefined`] and is consumed by [`RowBuilder::build`], so
/// a fresh one is needed for every candidate and nothing carries over between rows.
#[derive(Clone, Debug)]
#[must_use]
pub struct RowBuilder {
    row: OutputRow,
}

/// `(pt, eta, y, phi)` of a particle.
fn collider_kinematics(particle: &ParticleRecord) -> [f64; 4] {
    [
        particle.pt(),
        particle.eta(),
        particle.rapidity(),
        particle.phi(),
    ]
}

impl RowBuilder {
    /// Start a row carrying the event identifiers and generator scalars.
    pub fn new(header: &EventHeader) -> Self {
        let mut row = OutputRow::undefined();
        row.run = header.run as f64;
        row.lumi = header.lumi as f64;
        row.event = header.event as f64;
        row.qscale = header.qscale;
        row.weight = header.weight;
        Self { row }
    }

    /// Summaries of the hard-process b quarks: the smallest $`p_T`$ and the largest
    /// $`|\eta|`$. Both stay NaN when there are none.
    pub fn hard_b_quarks(mut self, event: &GenEvent, quarks: &[usize]) -> Self {
        let particles = quarks.iter().map(|&index| event.particle(index));
        self.row.min_bq_pt = particles
            .clone()
            .map(ParticleRecord::pt)
            .reduce(f64::min)
            .unwrap_or(f64::NAN);
        self.row.max_bq_eta = particles
            .map(|particle| particle.eta().abs())
            .reduce(f64::max)
            .unwrap_or(f64::NAN);
        self
    }

    /// The candidate and the number of candidates in its event.
    pub fn candidate(mut self, event: &GenEvent, candidate: usize, n_candidates: usize) -> Self {
        let particle = event.particle(candidate);
        [
            self.row.jpsi_pt,
            self.row.jpsi_eta,
            self.row.jpsi_y,
            self.row.jpsi_phi,
        ] = collider_kinematics(particle);
        self.row.jpsi_m = particle.mass();
        self.row.jpsi_status = particle.status as f64;
        self.row.n_jpsi = n_candidates as f64;
        self
    }

    pub fn ancestor(mut self, event: &GenEvent, ancestor: usize) -> Self {
        let particle = event.particle(ancestor);
        [
            self.row.bhad_pt,
            self.row.bhad_eta,
            self.row.bhad_y,
            self.row.bhad_phi,
        ] = collider_kinematics(particle);
        self.row.bhad_m = particle.mass();
        self.row.bhad_q = particle.charge as f64;
        self.row.bhad_pdgid = particle.pdg_id as f64;
        self
    }

    /// Vertices, flight distance, boost and lifetime weights.
    pub fn geometry(mut self, geometry: &DecayGeometry, ctau: &CtauReweighting) -> Self {
        self.row.pv_x = geometry.pv.x;
        self.row.pv_y = geometry.pv.y;
        self.row.pv_z = geometry.pv.z;
        self.row.sv_x = geometry.sv.x;
        self.row.sv_y = geometry.sv.y;
        self.row.sv_z = geometry.sv.z;
        self.row.lxyz = geometry.lxyz;
        self.row.beta = geometry.beta;
        self.row.gamma = geometry.gamma;
        self.row.ct = geometry.ct;
        let weights = ctau.weights(geometry.ct);
        self.row.ctau_weight_central = weights.central;
        self.row.ctau_weight_up = weights.up;
        self.row.ctau_weight_down = weights.down;
        self
    }

    /// Flags events with at least three stable leptons of the analysed flavour.
    pub fn final_state_leptons(mut self, n_leptons: usize) -> Self {
        self.row.is3m = if n_leptons >= 3 { 1.0 } else { 0.0 };
        self
    }

    /// The two leading leptons from the candidate, in descending $`p_T`$.
    pub fn signal_leptons(mut self, event: &GenEvent, leading: usize, trailing: usize) -> Self {
        let (mu1, mu2) = (event.particle(leading), event.particle(trailing));
        [
            self.row.mu1_pt,
            self.row.mu1_eta,
            self.row.mu1_y,
            self.row.mu1_phi,
        ] = collider_kinematics(mu1);
        self.row.mu1_q = mu1.charge as f64;
        [
            self.row.mu2_pt,
            self.row.mu2_eta,
            self.row.mu2_y,
            self.row.mu2_phi,
        ] = collider_kinematics(mu2);
        self.row.mu2_q = mu2.charge as f64;
        self
    }

    /// The leading lepton not from the candidate, and how many such leptons there are.
    pub fn extra_lepton(mut self, event: &GenEvent, extra: usize, n_extra: usize) -> Self {
        let mu3 = event.particle(extra);
        [
            self.row.mu3_pt,
            self.row.mu3_eta,
            self.row.mu3_y,
            self.row.mu3_phi,
        ] = collider_kinematics(mu3);
        self.row.mu3_q = mu3.charge as f64;
        self.row.n_extra_mu = n_extra as f64;
        self
    }

    /// The three-lepton system and derived observables. `charge` is the summed charge of the
    /// three leptons.
    pub fn three_body(mut self, observables: &ThreeBodyObservables, charge: i32) -> Self {
        let three_mu = &observables.three_mu;
        self.row.mmm_pt = three_mu.pt();
        self.row.mmm_eta = three_mu.eta();
        self.row.mmm_y = three_mu.rapidity();
        self.row.mmm_phi = three_mu.phi();
        self.row.mmm_m = three_mu.m();
        self.row.mmm_q = charge as f64;
        self.row.m2_miss = observables.m2_miss;
        self.row.pt_miss_sca = observables.pt_miss_sca;
        self.row.pt_miss_vec = observables.pt_miss_vec;
        self.row.q2 = observables.q2;
        self.row.e_star_mu3 = observables.e_star_mu3;
        self.row.e_hash_mu3 = observables.e_hash_mu3;
        self.row.ptvar = observables.ptvar;
        self.row.m2_miss_reco = observables.m2_miss_reco;
        self.row.pt_miss_sca_reco = observables.pt_miss_sca_reco;
        self.row.pt_miss_vec_reco = observables.pt_miss_vec_reco;
        self.row.q2_reco = observables.q2_reco;
        self.row.e_star_mu3_reco = observables.e_star_mu3_reco;
        self.row.m12 = observables.m12;
        self.row.m13 = observables.m13;
        self.row.m23 = observables.m23;
        self.row.dr12 = observables.dr12;
        self.row.dr13 = observables.dr13;
        self.row.dr23 = observables.dr23;
        self.row.dr_jpsi_m = observables.dr_jpsi_m;
        self
    }

    pub fn build(self) -> OutputRow {
        self.row
    }
}
