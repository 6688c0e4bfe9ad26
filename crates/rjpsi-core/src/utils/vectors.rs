use std::{f64::consts::PI, fmt::Display, iter::Sum};

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

/// A three-vector of `f64`s, used for momenta, velocities and vertex positions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// The $`x`$ component
    pub x: f64,
    /// The $`y`$ component
    pub y: f64,
    /// The $`z`$ component
    pub z: f64,
}

impl Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

impl Vec3 {
    /// Create a new [`Vec3`] from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Form a four-momentum with this three-momentum and the given `mass`.
    pub fn with_mass(&self, mass: f64) -> Vec4 {
        let e = (mass.powi(2) + self.mag2()).sqrt();
        Vec4::new(self.x, self.y, self.z, e)
    }

    /// Form a four-momentum with this three-momentum and the given `energy`.
    pub fn with_energy(&self, energy: f64) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, energy)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Magnitude of the projection onto the $`xy`$-plane.
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn costheta(&self) -> f64 {
        self.z / self.mag()
    }

    pub fn theta(&self) -> f64 {
        self.costheta().acos()
    }

    pub fn phi(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn unit(&self) -> Self {
        self / self.mag()
    }
}

impl_op_ex!(+ |a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x + b.x, a.y + b.y, a.z + b.z) });
impl_op_ex!(-|a: &Vec3, b: &Vec3| -> Vec3 { Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z) });
impl_op_ex!(-|a: &Vec3| -> Vec3 { Vec3::new(-a.x, -a.y, -a.z) });
impl_op_ex_commutative!(*|a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x * b, a.y * b, a.z * b) });
impl_op_ex!(/ |a: &Vec3, b: &f64| -> Vec3 { Vec3::new(a.x / b, a.y / b, a.z / b) });

/// A four-momentum $`(p_x, p_y, p_z, E)`$ with the metric signature $`(-,-,-,+)`$.
///
/// Energies and momenta are in GeV throughout this crate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    /// The $`p_x`$ component
    pub x: f64,
    /// The $`p_y`$ component
    pub y: f64,
    /// The $`p_z`$ component
    pub z: f64,
    /// The energy component
    pub t: f64,
}

impl Display for Vec4 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_p4_string())
    }
}

impl Vec4 {
    /// Create a new [`Vec4`] from its momentum components and energy.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            x: px,
            y: py,
            z: pz,
            t: e,
        }
    }

    /// Build a four-momentum from collider coordinates and a mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        Self::momentum_from_pt_eta_phi(pt, eta, phi).with_mass(m)
    }

    /// Build a four-momentum from collider coordinates and an energy.
    pub fn from_pt_eta_phi_e(pt: f64, eta: f64, phi: f64, e: f64) -> Self {
        Self::momentum_from_pt_eta_phi(pt, eta, phi).with_energy(e)
    }

    fn momentum_from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Vec3 {
        Vec3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh())
    }

    pub fn px(&self) -> f64 {
        self.x
    }

    pub fn py(&self) -> f64 {
        self.y
    }

    pub fn pz(&self) -> f64 {
        self.z
    }

    pub fn e(&self) -> f64 {
        self.t
    }

    /// The three-momentum.
    pub fn vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Magnitude of the three-momentum.
    pub fn p(&self) -> f64 {
        self.vec3().mag()
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.vec3().perp()
    }

    /// Pseudorapidity, $`\sinh^{-1}(p_z / p_T)`$.
    ///
    /// This is infinite along the beam axis and undefined for a null three-momentum.
    pub fn eta(&self) -> f64 {
        (self.z / self.pt()).asinh()
    }

    pub fn phi(&self) -> f64 {
        self.vec3().phi()
    }

    /// Rapidity, $`\frac{1}{2}\ln\frac{E + p_z}{E - p_z}`$.
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.t + self.z) / (self.t - self.z)).ln()
    }

    /// The invariant mass squared, $`E^2 - \vec{p}^2`$.
    pub fn m2(&self) -> f64 {
        self.t * self.t - self.vec3().mag2()
    }

    /// The invariant mass.
    ///
    /// Space-like vectors return $`-\sqrt{-m^2}`$ so that the sign of [`Vec4::m2`] survives.
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// The velocity $`\vec{\beta} = \vec{p}/E`$.
    pub fn beta(&self) -> Vec3 {
        self.vec3() / self.t
    }

    /// The Lorentz factor $`E/m`$.
    pub fn gamma(&self) -> f64 {
        self.t / self.m2().sqrt()
    }

    /// Boost this four-vector by the velocity `beta`.
    ///
    /// To obtain a vector in the rest frame of `frame`, boost by `-frame.beta()`. Boosting by
    /// `frame.beta()` afterwards returns to the lab frame.
    pub fn boost(&self, beta: &Vec3) -> Self {
        let b2 = beta.mag2();
        if b2 == 0.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let p3 = self.vec3() + beta * ((gamma - 1.0) * self.vec3().dot(beta) / b2 + gamma * self.t);
        p3.with_energy(gamma * (self.t + beta.dot(&self.vec3())))
    }

    /// Scale all four components by `factor`, which scales the invariant mass by `|factor|`
    /// while keeping the velocity fixed.
    pub fn scaled(&self, factor: f64) -> Self {
        self * factor
    }

    /// Azimuthal separation wrapped into $`(-\pi, \pi]`$.
    pub fn delta_phi(&self, other: &Self) -> f64 {
        wrap_phi(self.phi() - other.phi())
    }

    /// Angular separation $`\Delta R = \sqrt{\Delta\eta^2 + \Delta\phi^2}`$.
    pub fn delta_r(&self, other: &Self) -> f64 {
        (self.eta() - other.eta()).hypot(self.delta_phi(other))
    }

    /// A compact human-readable form, `[e = ...; p = (...); m = ...]`.
    pub fn to_p4_string(&self) -> String {
        format!(
            "[e = {:.5}; p = ({:.5}, {:.5}, {:.5}); m = {:.5}]",
            self.t,
            self.x,
            self.y,
            self.z,
            self.m()
        )
    }
}

/// Map an angle into $`(-\pi, \pi]`$.
pub fn wrap_phi(phi: f64) -> f64 {
    PI - (PI - phi).rem_euclid(2.0 * PI)
}

impl_op_ex!(+ |a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x + b.x, a.y + b.y, a.z + b.z, a.t + b.t) });
impl_op_ex!(-|a: &Vec4, b: &Vec4| -> Vec4 { Vec4::new(a.x - b.x, a.y - b.y, a.z - b.z, a.t - b.t) });
impl_op_ex!(-|a: &Vec4| -> Vec4 { Vec4::new(-a.x, -a.y, -a.z, -a.t) });
impl_op_ex_commutative!(*|a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x * b, a.y * b, a.z * b, a.t * b) });
impl_op_ex!(/ |a: &Vec4, b: &f64| -> Vec4 { Vec4::new(a.x / b, a.y / b, a.z / b, a.t / b) });

impl Sum for Vec4 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Vec4> for Vec4 {
    fn sum<I: Iterator<Item = &'a Vec4>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}
