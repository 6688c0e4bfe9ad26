//! Particle identity codes follow the Monte Carlo numbering scheme of the Particle Data Group.

/// Generator-internal two-quark states. They appear in fragmentation bookkeeping but are not
/// physical hadrons.
pub const DIQUARKS: [i32; 25] = [
    1103, 2101, 2103, 2203, 3101, 3103, 3201, 3203, 3303, 4101, 4103, 4201, 4203, 4301, 4303,
    4403, 5101, 5103, 5201, 5203, 5301, 5303, 5401, 5403, 5503,
];

pub const GLUON: i32 = 21;
pub const B_QUARK: i32 = 5;
pub const MUON: i32 = 13;
pub const JPSI: i32 = 443;

/// Quarks (`|id| < 8`) and the gluon.
pub fn is_parton(pdg_id: i32) -> bool {
    pdg_id.abs() < 8 || pdg_id.abs() == GLUON
}

/// Either charge state of any code in [`DIQUARKS`].
pub fn is_diquark(pdg_id: i32) -> bool {
    DIQUARKS.contains(&pdg_id.abs())
}

/// b mesons (`500 < |id| < 600`) and b baryons (`5000 < |id| < 6000`). The b diquarks share
/// the baryon range and are excluded.
pub fn is_b_hadron(pdg_id: i32) -> bool {
    let id = pdg_id.abs();
    ((id > 500 && id < 600) || (id > 5000 && id < 6000)) && !is_diquark(id)
}

/// Turns identity codes into names for diagnostics.
///
/// Implementations only feed log messages and never influence the numeric output.
pub trait ParticleNamer: Send + Sync {
    /// The name for `pdg_id`, if one is known.
    fn name(&self, pdg_id: i32) -> Option<String>;

    /// The name for `pdg_id`, falling back to the raw code.
    fn display_name(&self, pdg_id: i32) -> String {
        self.name(pdg_id).unwrap_or_else(|| format!("pdgid {pdg_id}"))
    }
}

/// A static table covering the particles that show up in b-hadron to charmonium decay chains.
#[derive(Copy, Clone, Debug, Default)]
pub struct PdgTable;

const NAMES: &[(i32, &str)] = &[
    (1, "d"),
    (2, "u"),
    (3, "s"),
    (4, "c"),
    (5, "b"),
    (6, "t"),
    (11, "e-"),
    (-11, "e+"),
    (12, "nu_e"),
    (13, "mu-"),
    (-13, "mu+"),
    (14, "nu_mu"),
    (15, "tau-"),
    (-15, "tau+"),
    (16, "nu_tau"),
    (21, "g"),
    (22, "gamma"),
    (23, "Z0"),
    (24, "W+"),
    (-24, "W-"),
    (25, "H0"),
    (91, "cluster"),
    (92, "string"),
    (111, "pi0"),
    (211, "pi+"),
    (-211, "pi-"),
    (130, "K_L0"),
    (310, "K_S0"),
    (311, "K0"),
    (321, "K+"),
    (-321, "K-"),
    (313, "K*0"),
    (323, "K*+"),
    (-323, "K*-"),
    (2212, "p+"),
    (-2212, "p~-"),
    (2112, "n0"),
    (411, "D+"),
    (-411, "D-"),
    (421, "D0"),
    (431, "D_s+"),
    (-431, "D_s-"),
    (441, "eta_c"),
    (443, "J/psi"),
    (445, "chi_c2"),
    (10441, "chi_c0"),
    (20443, "chi_c1"),
    (100443, "psi(2S)"),
    (30443, "psi(3770)"),
    (511, "B0"),
    (513, "B*0"),
    (521, "B+"),
    (-521, "B-"),
    (523, "B*+"),
    (-523, "B*-"),
    (531, "B_s0"),
    (533, "B_s*0"),
    (541, "B_c+"),
    (-541, "B_c-"),
    (543, "B_c*+"),
    (-543, "B_c*-"),
    (553, "Upsilon"),
    (5122, "Lambda_b0"),
    (5132, "Xi_b-"),
    (5232, "Xi_b0"),
    (5332, "Omega_b-"),
    (4122, "Lambda_c+"),
];

impl ParticleNamer for PdgTable {
    fn name(&self, pdg_id: i32) -> Option<String> {
        let lookup = |code: i32| {
            NAMES
                .iter()
                .find(|(id, _)| *id == code)
                .map(|(_, name)| *name)
        };
        if let Some(name) = lookup(pdg_id) {
            return Some(name.to_string());
        }
        if pdg_id < 0 {
            // neutral and unlisted antiparticles
            return lookup(-pdg_id).map(|name| format!("anti-{name}"));
        }
        if is_diquark(pdg_id) {
            return Some(format!("diquark {pdg_id}"));
        }
        None
    }
}
