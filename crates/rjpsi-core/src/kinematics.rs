use serde::{Deserialize, Serialize};

use crate::{
    data::GenEvent,
    utils::vectors::{Vec3, Vec4},
};

/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Convert a lifetime in picoseconds into $`c\tau`$ in millimetres.
pub fn ctau_mm_from_ps(tau_ps: f64) -> f64 {
    tau_ps * 1e-12 * SPEED_OF_LIGHT * 1e3
}

/// The mass of the $`B_c^+`$ in GeV, used for the mass-constrained three-body system.
pub const BC_MASS: f64 = 6.275;

/// Flight of an ancestor from its production vertex to the candidate's production vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecayGeometry {
    /// Production vertex of the ancestor, in cm
    pub pv: Vec3,
    /// Production vertex of the candidate, which is the ancestor's decay vertex, in cm
    pub sv: Vec3,
    /// Flight distance in cm
    pub lxyz: f64,
    /// Speed of the ancestor in the lab
    pub beta: f64,
    /// Lorentz factor of the ancestor in the lab
    pub gamma: f64,
    /// Proper decay length in mm, NaN when the ancestor is at rest or massless
    pub ct: f64,
}

impl DecayGeometry {
    pub fn new(event: &GenEvent, candidate: usize, ancestor: usize) -> Self {
        let ancestor = event.particle(ancestor);
        let pv = ancestor.vertex;
        let sv = event.particle(candidate).vertex;
        let lxyz = (sv - pv).mag();
        let beta = ancestor.p4.p() / ancestor.p4.e();
        let gamma = ancestor.p4.gamma();
        let beta_gamma = beta * gamma;
        let ct = if beta_gamma.is_finite() && beta_gamma > 0.0 {
            lxyz * 10.0 / beta_gamma
        } else {
            f64::NAN
        };
        Self {
            pv,
            sv,
            lxyz,
            beta,
            gamma,
            ct,
        }
    }
}

/// The weight which turns an exponential proper-time distribution with scale `ctau_old` into
/// one with scale `ctau_new`:
///
/// ```math
/// w(t) = \frac{\tau_\text{old}}{\tau_\text{new}} \exp\left[\left(\frac{1}{\tau_\text{old}} - \frac{1}{\tau_\text{new}}\right)t\right]
/// ```
///
/// All three arguments must share a unit. The weights average to one over a sample generated
/// with `ctau_old`.
pub fn lifetime_weight(ctau_old: f64, ctau_new: f64, ct: f64) -> f64 {
    ctau_old / ctau_new * ((1.0 / ctau_old - 1.0 / ctau_new) * ct).exp()
}

/// Lifetime hypotheses for reweighting, as $`c\tau`$ in mm.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CtauReweighting {
    /// The value the sample was generated with
    pub generated: f64,
    pub central: f64,
    pub up: f64,
    pub down: f64,
}

impl Default for CtauReweighting {
    /// The $`B_c^+`$ lifetime, generated at 0.507 ps and reweighted to $`0.510 \pm 0.009`$ ps.
    fn default() -> Self {
        Self {
            generated: ctau_mm_from_ps(0.507),
            central: ctau_mm_from_ps(0.510),
            up: ctau_mm_from_ps(0.510 + 0.009),
            down: ctau_mm_from_ps(0.510 - 0.009),
        }
    }
}

/// Central, up and down lifetime weights for one candidate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CtauWeights {
    pub central: f64,
    pub up: f64,
    pub down: f64,
}

impl CtauReweighting {
    /// Weights for a proper decay length `ct` in mm. A NaN `ct` gives NaN weights.
    pub fn weights(&self, ct: f64) -> CtauWeights {
        CtauWeights {
            central: lifetime_weight(self.generated, self.central, ct),
            up: lifetime_weight(self.generated, self.up, ct),
            down: lifetime_weight(self.generated, self.down, ct),
        }
    }
}

/// The visible and true four-momenta of a $`H_b \to J/\psi\,\mu X`$ decay.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThreeBodySystem {
    /// The generated b hadron
    pub b_gen: Vec4,
    /// The candidate
    pub jpsi: Vec4,
    /// Leading signal lepton
    pub mu1: Vec4,
    /// Trailing signal lepton
    pub mu2: Vec4,
    /// The extra lepton
    pub mu3: Vec4,
}

/// Missing-mass, rest-frame and pairwise observables of a [`ThreeBodySystem`].
///
/// Fields with a `_reco` suffix replace the generated b hadron with the three-lepton system
/// rescaled to a fixed mass.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThreeBodyObservables {
    /// Sum of the three lepton four-momenta
    pub three_mu: Vec4,
    /// [`ThreeBodyObservables::three_mu`] rescaled to the constrained mass
    pub b_scaled: Vec4,
    pub m2_miss: f64,
    pub pt_miss_sca: f64,
    pub pt_miss_vec: f64,
    pub q2: f64,
    /// Energy of the extra lepton in the generated b-hadron rest frame
    pub e_star_mu3: f64,
    /// Energy of the extra lepton in the candidate rest frame
    pub e_hash_mu3: f64,
    pub ptvar: f64,
    pub m2_miss_reco: f64,
    pub pt_miss_sca_reco: f64,
    pub pt_miss_vec_reco: f64,
    pub q2_reco: f64,
    /// Energy of the extra lepton in the mass-constrained rest frame
    pub e_star_mu3_reco: f64,
    pub m12: f64,
    pub m13: f64,
    pub m23: f64,
    pub dr12: f64,
    pub dr13: f64,
    pub dr23: f64,
    pub dr_jpsi_m: f64,
}

impl ThreeBodySystem {
    /// Compute every observable, constraining the three-lepton mass to `constrained_mass`.
    pub fn observables(&self, constrained_mass: f64) -> ThreeBodyObservables {
        let Self {
            b_gen,
            jpsi,
            mu1,
            mu2,
            mu3,
        } = self;
        let three_mu = mu1 + mu2 + mu3;
        let b_scaled = three_mu.scaled(constrained_mass / three_mu.m());
        let missing = b_gen - jpsi - mu3;
        let missing_reco = b_scaled - mu1 - mu2 - mu3;
        ThreeBodyObservables {
            three_mu,
            b_scaled,
            m2_miss: missing.m2(),
            pt_miss_sca: b_gen.pt() - mu3.pt() - jpsi.pt(),
            pt_miss_vec: missing.pt(),
            q2: (b_gen - jpsi).m2(),
            e_star_mu3: mu3.boost(&-b_gen.beta()).e(),
            e_hash_mu3: mu3.boost(&-jpsi.beta()).e(),
            ptvar: jpsi.pt() - mu3.pt(),
            m2_miss_reco: missing_reco.m2(),
            pt_miss_sca_reco: b_scaled.pt() - mu3.pt() - mu1.pt() - mu2.pt(),
            pt_miss_vec_reco: missing_reco.pt(),
            q2_reco: (b_scaled - jpsi).m2(),
            e_star_mu3_reco: mu3.boost(&-b_scaled.beta()).e(),
            m12: (mu1 + mu2).m(),
            m13: (mu1 + mu3).m(),
            m23: (mu2 + mu3).m(),
            dr12: mu1.delta_r(mu2),
            dr13: mu1.delta_r(mu3),
            dr23: mu2.delta_r(mu3),
            dr_jpsi_m: mu3.delta_r(jpsi),
        }
    }
}
