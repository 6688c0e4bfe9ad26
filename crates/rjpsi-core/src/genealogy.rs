//! Every traversal here is iterative and guarded by a visited set, so malformed generator
//! records with cycles or shared ancestors terminate.
use std::fmt::Write;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{
    data::GenEvent,
    utils::pdg::{is_diquark, is_parton, ParticleNamer},
};

/// What the ancestor walk does when it reaches a mother.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Record the mother and keep walking through its own mothers.
    Accept,
    /// Record the mother but do not look above it.
    Terminal,
    /// Do not record the mother, but keep walking through its mothers.
    Transparent,
    /// Do not record the mother and abandon this branch.
    Halt,
}

/// The boundary conditions of the ancestor walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestryRules {
    /// Mothers with `|id|` below this value (strings, clusters, leptons, gauge bosons) end a
    /// branch.
    pub hadron_threshold: i32,
}

impl Default for AncestryRules {
    fn default() -> Self {
        Self {
            hadron_threshold: 100,
        }
    }
}

impl AncestryRules {
    /// Classify the particle at `index` as a mother seen by the walk.
    ///
    /// Quarks and gluons halt a branch, as does anything under the hadron threshold. Earlier
    /// copies are walked through without being recorded. Diquarks are recorded and end the
    /// branch. Everything else is accepted.
    pub fn classify(&self, event: &GenEvent, index: usize) -> Step {
        let particle = event.particle(index);
        if is_parton(particle.pdg_id) || particle.pdg_id.abs() < self.hadron_threshold {
            Step::Halt
        } else if !particle.last_copy {
            Step::Transparent
        } else if is_diquark(particle.pdg_id) {
            Step::Terminal
        } else {
            Step::Accept
        }
    }
}

/// Accepted ancestors of a candidate, nearest first.
///
/// When a particle has several mothers all branches are explored, first mother first, and the
/// results are merged into this single list in the order a recursive walk would visit them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ancestry {
    members: Vec<usize>,
}

impl Ancestry {
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The outermost accepted ancestor which is not a diquark. Diquarks closing several merged
    /// branches are all stepped over. [`None`] if only diquarks were recorded.
    pub fn origin(&self, event: &GenEvent) -> Option<usize> {
        self.members
            .iter()
            .rev()
            .copied()
            .find(|&index| !is_diquark(event.particle(index).pdg_id))
    }

    /// A human-readable chain such as ` <--  B_c+ <--  pdgid 9000541`.
    pub fn trace(&self, event: &GenEvent, namer: &dyn ParticleNamer) -> String {
        let mut out = String::new();
        for &index in &self.members {
            let _ = write!(
                out,
                " <--  {}",
                namer.display_name(event.particle(index).pdg_id)
            );
        }
        out
    }
}

/// Walk up from `candidate` through every mother branch and collect accepted ancestors.
pub fn walk_ancestors(event: &GenEvent, candidate: usize, rules: &AncestryRules) -> Ancestry {
    let mut visited = IndexSet::new();
    visited.insert(candidate);
    let mut stack: Vec<usize> = event.particle(candidate).mothers.iter().rev().copied().collect();
    let mut members = Vec::new();
    while let Some(index) = stack.pop() {
        if !visited.insert(index) {
            continue;
        }
        let step = rules.classify(event, index);
        if matches!(step, Step::Accept | Step::Terminal) {
            members.push(index);
        }
        if matches!(step, Step::Accept | Step::Transparent) {
            stack.extend(event.particle(index).mothers.iter().rev());
        }
    }
    Ancestry { members }
}

/// Whether `ancestor` can be reached from `particle` by following mothers. A particle is its
/// own ancestor.
pub fn is_ancestor(event: &GenEvent, ancestor: usize, particle: usize) -> bool {
    let mut visited = vec![false; event.len()];
    let mut stack = vec![particle];
    while let Some(index) = stack.pop() {
        if index == ancestor {
            return true;
        }
        if std::mem::replace(&mut visited[index], true) {
            continue;
        }
        stack.extend(&event.particle(index).mothers);
    }
    false
}

/// Number of direct daughters of `candidate` with `|id| == pdg_id`.
pub fn count_daughters(event: &GenEvent, candidate: usize, pdg_id: i32) -> usize {
    event
        .particle(candidate)
        .daughters
        .iter()
        .filter(|&&index| event.particle(index).pdg_id.abs() == pdg_id)
        .count()
}

/// Stable particles with `|id| == pdg_id`, in arena order.
pub fn final_state(event: &GenEvent, pdg_id: i32) -> Vec<usize> {
    event.select(|particle| particle.pdg_id.abs() == pdg_id && particle.is_final_state())
}

/// Sort particle indices by descending transverse momentum, keeping arena order on ties.
pub fn sort_by_pt(event: &GenEvent, indices: &mut [usize]) {
    indices.sort_by(|&a, &b| event.particle(b).pt().total_cmp(&event.particle(a).pt()));
}

/// The members of `leptons` which descend from `candidate`, by descending transverse momentum.
pub fn signal_leptons(event: &GenEvent, candidate: usize, leptons: &[usize]) -> Vec<usize> {
    let mut signal: Vec<usize> = leptons
        .iter()
        .copied()
        .filter(|&lepton| is_ancestor(event, candidate, lepton))
        .collect();
    sort_by_pt(event, &mut signal);
    signal
}

/// The members of `leptons` not in `signal`, by descending transverse momentum.
pub fn extra_leptons(event: &GenEvent, leptons: &[usize], signal: &[usize]) -> Vec<usize> {
    let mut extra: Vec<usize> = leptons
        .iter()
        .copied()
        .filter(|lepton| !signal.contains(lepton))
        .collect();
    sort_by_pt(event, &mut extra);
    extra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{test_event, test_indices::*, EventHeader, GenEventBuilder, ParticleRecord},
        utils::{
            pdg::PdgTable,
            vectors::{Vec3, Vec4},
        },
    };

    fn particle(pdg_id: i32, status: i32) -> ParticleRecord {
        ParticleRecord::new(
            pdg_id,
            status,
            Vec4::new(0.0, 0.0, 1.0, 10.0),
            Vec3::zero(),
        )
    }

    #[test]
    fn test_fixture_ancestry() {
        let event = test_event();
        let ancestry = walk_ancestors(&event, JPSI, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[BC]);
        assert_eq!(ancestry.origin(&event), Some(BC));
        assert_eq!(ancestry.trace(&event, &PdgTable), " <--  B_c+");
    }

    #[test]
    fn test_diquark_origin_is_skipped() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let diquark = builder.add(particle(5203, 63));
        let lambda_b = builder.add_with_mothers(particle(5122, 2), &[diquark]);
        let jpsi = builder.add_with_mothers(particle(443, 2), &[lambda_b]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[lambda_b, diquark]);
        assert_eq!(ancestry.origin(&event), Some(lambda_b));
    }

    #[test]
    fn test_trailing_diquarks_from_several_branches_are_skipped() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let bottom = builder.add(particle(5203, 63));
        let light = builder.add(particle(-2101, 63));
        let lambda_b = builder.add_with_mothers(particle(5122, 2), &[bottom, light]);
        let jpsi = builder.add_with_mothers(particle(443, 2), &[lambda_b]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[lambda_b, bottom, light]);
        assert_eq!(ancestry.origin(&event), Some(lambda_b));
    }

    #[test]
    fn test_lone_diquark_has_no_origin() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let diquark = builder.add(particle(2203, 63));
        let jpsi = builder.add_with_mothers(particle(443, 2), &[diquark]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.len(), 1);
        assert_eq!(ancestry.origin(&event), None);
    }

    #[test]
    fn test_partons_and_strings_end_the_walk() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let proton = builder.add(particle(2212, 4));
        let gluon = builder.add_with_mothers(particle(21, 21), &[proton]);
        let string = builder.add_with_mothers(particle(92, 2), &[gluon]);
        let b = builder.add_with_mothers(particle(521, 2), &[string]);
        let direct = builder.add_with_mothers(particle(443, 2), &[gluon]);
        let from_b = builder.add_with_mothers(particle(443, 2), &[b]);
        let event = builder.build().unwrap();
        let rules = AncestryRules::default();
        assert!(walk_ancestors(&event, direct, &rules).is_empty());
        assert_eq!(walk_ancestors(&event, direct, &rules).origin(&event), None);
        assert_eq!(walk_ancestors(&event, from_b, &rules).members(), &[b]);
    }

    #[test]
    fn test_earlier_copies_are_transparent() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let bs_star = builder.add(particle(533, 2));
        let early = builder.add_with_mothers(particle(531, 2).with_last_copy(false), &[bs_star]);
        let late = builder.add_with_mothers(particle(531, 2), &[early]);
        let jpsi = builder.add_with_mothers(particle(443, 2), &[late]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[late, bs_star]);
        assert_eq!(ancestry.origin(&event), Some(bs_star));
    }

    #[test]
    fn test_multiple_mothers_merge_in_preorder() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let top = builder.add(particle(2212, 4));
        let left = builder.add_with_mothers(particle(511, 2), &[top]);
        let right = builder.add_with_mothers(particle(521, 2), &[top]);
        let jpsi = builder.add_with_mothers(particle(443, 2), &[left, right]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[left, top, right]);
        assert_eq!(ancestry.origin(&event), Some(right));
    }

    #[test]
    fn test_cycles_terminate() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let a = builder.add(particle(511, 2));
        let b = builder.add_with_mothers(particle(513, 2), &[a]);
        builder.link(b, a);
        let jpsi = builder.add_with_mothers(particle(443, 2), &[b]);
        builder.link(jpsi, a);
        let muon = builder.add_with_mothers(particle(13, 1), &[jpsi]);
        let event = builder.build().unwrap();
        let ancestry = walk_ancestors(&event, jpsi, &AncestryRules::default());
        assert_eq!(ancestry.members(), &[b, a]);
        assert!(is_ancestor(&event, a, muon));
        assert!(!is_ancestor(&event, muon, a));
    }

    #[test]
    fn test_descendants_follow_every_mother() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let jpsi = builder.add(particle(443, 2));
        let other = builder.add(particle(22, 1));
        let photon = builder.add_with_mothers(particle(22, 2), &[jpsi]);
        // the candidate is only reachable through the second mother
        let muon = builder.add_with_mothers(particle(13, 1), &[other, photon]);
        let event = builder.build().unwrap();
        assert!(is_ancestor(&event, jpsi, muon));
        assert!(is_ancestor(&event, muon, muon));
        assert!(!is_ancestor(&event, jpsi, other));
    }

    #[test]
    fn test_fixture_leptons() {
        let event = test_event();
        assert_eq!(count_daughters(&event, JPSI, 13), 2);
        let muons = final_state(&event, 13);
        let signal = signal_leptons(&event, JPSI, &muons);
        assert_eq!(signal, vec![MU_LEADING, MU_TRAILING]);
        assert_eq!(extra_leptons(&event, &muons, &signal), vec![EXTRA_MU]);
    }
}
