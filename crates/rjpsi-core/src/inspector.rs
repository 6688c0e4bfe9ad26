#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, Level};

use crate::{
    data::{EventHeader, GenEvent},
    genealogy::{
        count_daughters, extra_leptons, final_state, signal_leptons, walk_ancestors,
        AncestryRules,
    },
    kinematics::{CtauReweighting, DecayGeometry, ThreeBodySystem, BC_MASS},
    output::RowSink,
    row::{OutputRow, RowBuilder},
    utils::pdg::{is_b_hadron, ParticleNamer, PdgTable, B_QUARK, JPSI, MUON},
    RjpsiResult,
};

/// Number of events decoded before a batch is handed to the inspector.
const EVENTS_PER_CHUNK: usize = 512;

/// Settings for an [`Inspector`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Identity code of the candidate; both charge states match
    pub candidate_pdg_id: i32,
    /// Identity code of the signal and extra leptons; both charge states match
    pub lepton_pdg_id: i32,
    /// Mass in GeV the three-lepton system is rescaled to for the `_reco` observables
    pub constrained_mass: f64,
    pub ancestry: AncestryRules,
    pub ctau: CtauReweighting,
    /// Stop after this many events
    pub max_events: Option<usize>,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            candidate_pdg_id: JPSI,
            lepton_pdg_id: MUON,
            constrained_mass: BC_MASS,
            ancestry: AncestryRules::default(),
            ctau: CtauReweighting::default(),
            max_events: None,
        }
    }
}

/// Why a candidate did not produce a row.
///
/// Rejections found after the row was partially filled carry that partial row for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub enum Rejection {
    /// Fewer than two direct daughters are leptons.
    NotDileptonic { n_leptons: usize },
    /// The ancestor walk found no originating hadron.
    NoAncestor,
    /// Fewer than two stable leptons descend from the candidate.
    TooFewSignalLeptons {
        n_signal: usize,
        row: Box<OutputRow>,
    },
    /// No stable lepton outside the candidate's decay.
    NoExtraLepton { row: Box<OutputRow> },
    /// The originating hadron is not a b hadron.
    NotFromBHadron { pdg_id: i32, row: Box<OutputRow> },
}

impl Rejection {
    /// A short key used to tally rejections.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotDileptonic { .. } => "not dileptonic",
            Self::NoAncestor => "no ancestor",
            Self::TooFewSignalLeptons { .. } => "too few signal leptons",
            Self::NoExtraLepton { .. } => "no extra lepton",
            Self::NotFromBHadron { .. } => "not from a b hadron",
        }
    }

    pub fn partial_row(&self) -> Option<&OutputRow> {
        match self {
            Self::TooFewSignalLeptons { row, .. }
            | Self::NoExtraLepton { row }
            | Self::NotFromBHadron { row, .. } => Some(row),
            Self::NotDileptonic { .. } | Self::NoAncestor => None,
        }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDileptonic { n_leptons } => {
                write!(f, "{} ({n_leptons} leptonic daughters)", self.label())
            }
            Self::TooFewSignalLeptons { n_signal, .. } => {
                write!(f, "{} ({n_signal} found)", self.label())
            }
            Self::NotFromBHadron { pdg_id, .. } => {
                write!(f, "{} (origin pdgid {pdg_id})", self.label())
            }
            _ => write!(f, "{}", self.label()),
        }
    }
}

/// The result of inspecting one candidate.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Accepted(OutputRow),
    Rejected(Rejection),
}

impl Outcome {
    pub fn row(&self) -> Option<&OutputRow> {
        match self {
            Self::Accepted(row) => Some(row),
            Self::Rejected(_) => None,
        }
    }
}

/// Counts accumulated over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: usize,
    pub candidates: usize,
    pub rows: usize,
    /// Rejected candidates per [`Rejection::label`], in the order reasons were first seen
    pub rejections: IndexMap<&'static str, usize>,
}

impl RunSummary {
    fn record<S: RowSink + ?Sized>(
        &mut self,
        header: &EventHeader,
        outcome: Outcome,
        sink: &mut S,
    ) -> RjpsiResult<()> {
        self.candidates += 1;
        match outcome {
            Outcome::Accepted(row) => {
                sink.append(row)?;
                self.rows += 1;
            }
            Outcome::Rejected(rejection) => {
                if tracing::enabled!(Level::DEBUG) {
                    debug!(
                        run = header.run,
                        lumi = header.lumi,
                        event = header.event,
                        partial = ?rejection.partial_row(),
                        "candidate rejected: {rejection}"
                    );
                }
                *self.rejections.entry(rejection.label()).or_insert(0) += 1;
            }
        }
        Ok(())
    }

    /// Total number of rejected candidates.
    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} events, {} candidates, {} rows",
            self.events, self.candidates, self.rows
        )?;
        for (reason, count) in &self.rejections {
            write!(f, ", {count} {reason}")?;
        }
        Ok(())
    }
}

/// Per-event selections shared by every candidate of the event.
struct EventContext {
    candidates: Vec<usize>,
    b_hadrons: Vec<usize>,
    hard_b_quarks: Vec<usize>,
    leptons: Vec<usize>,
}

impl EventContext {
    fn new(event: &GenEvent, config: &InspectorConfig) -> Self {
        Self {
            candidates: event.select(|p| p.pdg_id.abs() == config.candidate_pdg_id),
            b_hadrons: event.select(|p| is_b_hadron(p.pdg_id)),
            hard_b_quarks: event.select(|p| p.pdg_id.abs() == B_QUARK && p.hard_process),
            leptons: final_state(event, config.lepton_pdg_id),
        }
    }
}

/// Turns generator events into rows of the flat analysis table.
///
/// ```
/// use rjpsi_core::{data::test_event, Inspector};
///
/// let inspector = Inspector::default();
/// let outcomes = inspector.inspect_event(&test_event());
/// assert_eq!(outcomes.len(), 1);
/// assert!(outcomes[0].row().is_some());
/// ```
pub struct Inspector {
    config: InspectorConfig,
    namer: Box<dyn ParticleNamer>,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self {
            config,
            namer: Box::new(PdgTable),
        }
    }

    /// Replace the [`ParticleNamer`] used for diagnostic messages.
    pub fn with_namer<N: ParticleNamer + 'static>(mut self, namer: N) -> Self {
        self.namer = Box::new(namer);
        self
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Inspect every candidate of `event`, in arena order.
    pub fn inspect_event(&self, event: &GenEvent) -> Vec<Outcome> {
        let context = EventContext::new(event, &self.config);
        let outcomes = context
            .candidates
            .iter()
            .map(|&candidate| self.inspect_candidate(event, &context, candidate))
            .collect();
        if tracing::enabled!(Level::TRACE) {
            self.dump_event(event, &context);
        }
        outcomes
    }

    fn inspect_candidate(
        &self,
        event: &GenEvent,
        context: &EventContext,
        candidate: usize,
    ) -> Outcome {
        let config = &self.config;
        let ancestry = walk_ancestors(event, candidate, &config.ancestry);
        let particle = event.particle(candidate);
        if tracing::enabled!(Level::DEBUG) {
            let daughters: Vec<i32> = particle
                .daughters
                .iter()
                .map(|&index| event.particle(index).pdg_id)
                .collect();
            debug!(
                "{} {:?} pt {:.2}, genealogy: {}",
                self.namer.display_name(particle.pdg_id),
                daughters,
                particle.pt(),
                ancestry.trace(event, self.namer.as_ref())
            );
        }

        let n_leptons = count_daughters(event, candidate, config.lepton_pdg_id);
        if n_leptons < 2 {
            return Outcome::Rejected(Rejection::NotDileptonic { n_leptons });
        }
        let Some(origin) = ancestry.origin(event) else {
            return Outcome::Rejected(Rejection::NoAncestor);
        };

        let geometry = DecayGeometry::new(event, candidate, origin);
        let builder = RowBuilder::new(event.header())
            .hard_b_quarks(event, &context.hard_b_quarks)
            .candidate(event, candidate, context.candidates.len())
            .ancestor(event, origin)
            .geometry(&geometry, &config.ctau)
            .final_state_leptons(context.leptons.len());

        let signal = signal_leptons(event, candidate, &context.leptons);
        let (leading, trailing) = match signal.as_slice() {
            [leading, trailing, ..] => (*leading, *trailing),
            _ => {
                return Outcome::Rejected(Rejection::TooFewSignalLeptons {
                    n_signal: signal.len(),
                    row: Box::new(builder.build()),
                })
            }
        };
        let builder = builder.signal_leptons(event, leading, trailing);

        let extra = extra_leptons(event, &context.leptons, &signal);
        let Some(&mu3) = extra.first() else {
            return Outcome::Rejected(Rejection::NoExtraLepton {
                row: Box::new(builder.build()),
            });
        };

        let system = ThreeBodySystem {
            b_gen: event.particle(origin).p4,
            jpsi: particle.p4,
            mu1: event.particle(leading).p4,
            mu2: event.particle(trailing).p4,
            mu3: event.particle(mu3).p4,
        };
        let charge: i32 = [leading, trailing, mu3]
            .iter()
            .map(|&index| event.particle(index).charge)
            .sum();
        let row = builder
            .extra_lepton(event, mu3, extra.len())
            .three_body(&system.observables(config.constrained_mass), charge)
            .build();

        if !context.b_hadrons.contains(&origin) {
            return Outcome::Rejected(Rejection::NotFromBHadron {
                pdg_id: event.particle(origin).pdg_id,
                row: Box::new(row),
            });
        }
        Outcome::Accepted(row)
    }

    fn dump_event(&self, event: &GenEvent, context: &EventContext) {
        let header = event.header();
        trace!("{event}");
        if context.b_hadrons.len() > 1 {
            for (i, &hadron) in context.b_hadrons.iter().enumerate() {
                let particle = event.particle(hadron);
                let daughters: Vec<String> = particle
                    .daughters
                    .iter()
                    .map(|&index| self.namer.display_name(event.particle(index).pdg_id))
                    .collect();
                trace!(
                    event = header.event,
                    "b hadron {i}: {} -> [{}]",
                    self.namer.display_name(particle.pdg_id),
                    daughters.join(", ")
                );
            }
        }
        if context.leptons.len() < 3 {
            trace!(
                event = header.event,
                "only {} stable leptons",
                context.leptons.len()
            );
        }
        if context.candidates.len() > 1 {
            trace!(
                event = header.event,
                "{} candidates",
                context.candidates.len()
            );
        }
    }

    #[cfg(feature = "rayon")]
    fn inspect_chunk(&self, events: &[GenEvent]) -> Vec<Vec<Outcome>> {
        // diagnostics must stay in event order
        if tracing::enabled!(Level::DEBUG) {
            events.iter().map(|event| self.inspect_event(event)).collect()
        } else {
            events
                .par_iter()
                .map(|event| self.inspect_event(event))
                .collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn inspect_chunk(&self, events: &[GenEvent]) -> Vec<Vec<Outcome>> {
        events.iter().map(|event| self.inspect_event(event)).collect()
    }

    /// Inspect `events` in order and append every accepted row to `sink`.
    ///
    /// The first error from `events` or `sink` ends the run.
    pub fn run<I, S>(&self, events: I, sink: &mut S) -> RjpsiResult<RunSummary>
    where
        I: IntoIterator<Item = RjpsiResult<GenEvent>>,
        S: RowSink + ?Sized,
    {
        self.run_with_progress(events, sink, |_| {})
    }

    /// Like [`Inspector::run`], calling `progress` with the number of events completed since
    /// the previous call.
    pub fn run_with_progress<I, S, F>(
        &self,
        events: I,
        sink: &mut S,
        mut progress: F,
    ) -> RjpsiResult<RunSummary>
    where
        I: IntoIterator<Item = RjpsiResult<GenEvent>>,
        S: RowSink + ?Sized,
        F: FnMut(usize),
    {
        let limit = self.config.max_events.unwrap_or(usize::MAX);
        let mut events = events.into_iter().take(limit);
        let mut summary = RunSummary::default();
        let mut chunk = Vec::with_capacity(EVENTS_PER_CHUNK);
        loop {
            chunk.clear();
            for event in events.by_ref().take(EVENTS_PER_CHUNK) {
                chunk.push(event?);
            }
            if chunk.is_empty() {
                break;
            }
            for (event, outcomes) in chunk.iter().zip(self.inspect_chunk(&chunk)) {
                summary.events += 1;
                for outcome in outcomes {
                    summary.record(event.header(), outcome, sink)?;
                }
            }
            progress(chunk.len());
        }
        info!(
            events = summary.events,
            candidates = summary.candidates,
            rows = summary.rows,
            rejected = summary.rejected(),
            "inspection finished"
        );
        for (reason, count) in &summary.rejections {
            info!("rejected {count} candidates: {reason}");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        data::{test_event, EventHeader, GenEventBuilder, ParticleRecord},
        utils::vectors::{Vec3, Vec4},
        RjpsiError,
    };

    const MUON_MASS: f64 = 0.105_658_375_5;

    fn muon(pdg_id: i32, pt: f64, phi: f64) -> ParticleRecord {
        ParticleRecord::new(
            pdg_id,
            1,
            Vec4::from_pt_eta_phi_m(pt, 0.2, phi, MUON_MASS),
            Vec3::new(0.1, 0.1, 0.0),
        )
        .with_charge(-pdg_id.signum())
    }

    /// A J/psi decaying to two muons, produced at the end of a chain of hadrons listed outermost
    /// first. `n_extra` further muons come from the innermost hadron, or from nowhere without
    /// one.
    fn chain(ancestors: &[i32], n_extra: usize) -> GenEvent {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let mut mother: Option<usize> = None;
        for &pdg_id in ancestors {
            let hadron = ParticleRecord::new(
                pdg_id,
                2,
                Vec4::from_pt_eta_phi_m(25.0, 0.2, 0.4, 5.3),
                Vec3::zero(),
            );
            let mothers: Vec<usize> = mother.into_iter().collect();
            mother = Some(builder.add_with_mothers(hadron, &mothers));
        }
        let mothers: Vec<usize> = mother.into_iter().collect();
        let mu_plus = muon(-13, 8.0, 0.3);
        let mu_minus = muon(13, 6.0, 0.6);
        let jpsi = builder.add_with_mothers(
            ParticleRecord::new(443, 2, mu_plus.p4 + mu_minus.p4, Vec3::new(0.1, 0.1, 0.0)),
            &mothers,
        );
        builder.add_with_mothers(mu_minus, &[jpsi]);
        builder.add_with_mothers(mu_plus, &[jpsi]);
        for i in 0..n_extra {
            builder.add_with_mothers(muon(-13, 4.0 - i as f64, 1.0), &mothers);
        }
        builder.build().unwrap()
    }

    fn rejection(outcomes: &[Outcome]) -> &Rejection {
        match outcomes {
            [Outcome::Rejected(rejection)] => rejection,
            other => panic!("expected a single rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_fixture_row() {
        let event = test_event();
        let outcomes = Inspector::default().inspect_event(&event);
        assert_eq!(outcomes.len(), 1);
        let row = outcomes[0].row().unwrap();
        assert_relative_eq!(row.mu1_pt, 10.0, epsilon = 1e-9);
        assert_relative_eq!(row.mu2_pt, 5.0, epsilon = 1e-9);
        assert_relative_eq!(row.mu3_pt, 4.0, epsilon = 1e-9);
        assert_relative_eq!(row.bhad_pt, 30.0, epsilon = 1e-9);
        assert_relative_eq!(row.bhad_m, 5.28, epsilon = 1e-9);
        assert_relative_eq!(row.lxyz, 0.2, epsilon = 1e-12);
        assert_eq!(row.bhad_pdgid, 541.0);
        assert_eq!(row.mmm_q, 1.0);
        assert_eq!(row.is3m, 1.0);
        assert_eq!(row.n_jpsi, 1.0);
        assert_eq!(row.n_extra_mu, 1.0);
        assert_eq!(row.run, 1.0);
        assert_eq!(row.lumi, 7.0);
        assert_eq!(row.event, 1234.0);
        assert_eq!(row.qscale, 42.5);
        assert!(row.ct.is_finite() && row.ct > 0.0);
        assert!(row.ctau_weight_central.is_finite());
        for value in [row.m2_miss, row.q2, row.e_star_mu3, row.m2_miss_reco, row.q2_reco] {
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_signal_leptons_are_ordered() {
        for event in [test_event(), chain(&[521], 1), chain(&[5203, 5122], 2)] {
            for outcome in Inspector::default().inspect_event(&event) {
                let row = outcome.row().unwrap();
                assert!(row.mu1_pt >= row.mu2_pt);
            }
        }
    }

    #[test]
    fn test_zero_ancestor_candidate_emits_nothing() {
        let outcomes = Inspector::default().inspect_event(&chain(&[], 1));
        assert_eq!(rejection(&outcomes), &Rejection::NoAncestor);
        // a string is below the hadron threshold
        let outcomes = Inspector::default().inspect_event(&chain(&[92], 1));
        assert_eq!(rejection(&outcomes), &Rejection::NoAncestor);
    }

    #[test]
    fn test_diquark_origin_uses_inner_hadron() {
        let outcomes = Inspector::default().inspect_event(&chain(&[5203, 5122], 1));
        let row = outcomes[0].row().unwrap();
        assert_eq!(row.bhad_pdgid, 5122.0);
        assert_eq!(row.n_extra_mu, 1.0);
    }

    #[test]
    fn test_diquarks_from_several_branches_are_never_the_origin() {
        let mut builder = GenEventBuilder::new(EventHeader::default());
        let hadron = |pdg_id| {
            ParticleRecord::new(
                pdg_id,
                2,
                Vec4::from_pt_eta_phi_m(25.0, 0.2, 0.4, 5.6),
                Vec3::zero(),
            )
        };
        let bottom = builder.add(hadron(5203));
        let light = builder.add(hadron(-2101));
        let lambda_b = builder.add_with_mothers(hadron(5122), &[bottom, light]);
        let mu_plus = muon(-13, 8.0, 0.3);
        let mu_minus = muon(13, 6.0, 0.6);
        let jpsi = builder.add_with_mothers(
            ParticleRecord::new(443, 2, mu_plus.p4 + mu_minus.p4, Vec3::new(0.1, 0.1, 0.0)),
            &[lambda_b],
        );
        builder.add_with_mothers(mu_minus, &[jpsi]);
        builder.add_with_mothers(mu_plus, &[jpsi]);
        builder.add_with_mothers(muon(-13, 4.0, 1.0), &[lambda_b]);
        let event = builder.build().unwrap();

        let outcomes = Inspector::default().inspect_event(&event);
        let row = outcomes[0].row().unwrap();
        assert_eq!(row.bhad_pdgid, 5122.0);

        // a chain ending in a b diquark alone has no origin at all
        let outcomes = Inspector::default().inspect_event(&chain(&[5203], 1));
        assert_eq!(rejection(&outcomes), &Rejection::NoAncestor);
    }

    #[test]
    fn test_too_few_signal_leptons() {
        let mut event = chain(&[521], 1);
        let jpsi = event.select(|p| p.pdg_id == 443)[0];
        let daughters = event.particle(jpsi).daughters.clone();
        let mut particles = event.particles().to_vec();
        for index in daughters {
            // decayed further, with no stable descendants listed
            particles[index].status = 2;
        }
        event = GenEvent::new(*event.header(), particles).unwrap();

        let outcomes = Inspector::default().inspect_event(&event);
        match rejection(&outcomes) {
            Rejection::TooFewSignalLeptons { n_signal, row } => {
                assert_eq!(*n_signal, 0);
                assert_eq!(row.bhad_pdgid, 521.0);
                assert!(row.mu1_pt.is_nan());
            }
            other => panic!("unexpected rejection {other:?}"),
        }

        let mut rows: Vec<OutputRow> = Vec::new();
        let summary = Inspector::default()
            .run(vec![Ok(event)], &mut rows)
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.rejections.get("too few signal leptons"), Some(&1));
    }

    #[test]
    fn test_not_dileptonic() {
        let inspector = Inspector::new(InspectorConfig {
            lepton_pdg_id: 11,
            ..Default::default()
        });
        let outcomes = inspector.inspect_event(&test_event());
        assert_eq!(
            rejection(&outcomes),
            &Rejection::NotDileptonic { n_leptons: 0 }
        );
    }

    #[test]
    fn test_no_extra_lepton() {
        let outcomes = Inspector::default().inspect_event(&chain(&[521], 0));
        let rejection = rejection(&outcomes);
        assert_eq!(rejection.label(), "no extra lepton");
        let partial = rejection.partial_row().unwrap();
        assert_eq!(partial.is3m, 0.0);
        assert_relative_eq!(partial.mu1_pt, 8.0, epsilon = 1e-9);
        assert!(partial.mu3_pt.is_nan());
    }

    #[test]
    fn test_not_from_b_hadron() {
        let outcomes = Inspector::default().inspect_event(&chain(&[100443], 1));
        match rejection(&outcomes) {
            Rejection::NotFromBHadron { pdg_id, row } => {
                assert_eq!(*pdg_id, 100443);
                assert!(row.m2_miss.is_finite());
            }
            other => panic!("unexpected rejection {other:?}"),
        }
    }

    #[test]
    fn test_two_candidates_one_unresolvable() {
        let event = test_event();
        let header = *event.header();
        let mut particles = event.particles().to_vec();
        let jpsi = particles.len();
        let mut prompt = ParticleRecord::new(443, 2, Vec4::new(0.0, 0.0, 5.0, 6.0), Vec3::zero());
        // produced from the string, so the walk stops immediately
        prompt.mothers = vec![3];
        prompt.daughters = vec![jpsi + 1, jpsi + 2];
        particles[3].daughters.push(jpsi);
        particles.push(prompt);
        for (pdg_id, pt) in [(13, 3.0), (-13, 2.0)] {
            let mut mu = muon(pdg_id, pt, 2.0);
            mu.mothers = vec![jpsi];
            particles.push(mu);
        }
        let event = GenEvent::new(header, particles).unwrap();

        let outcomes = Inspector::default().inspect_event(&event);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1], Outcome::Rejected(Rejection::NoAncestor));
        let row = outcomes[0].row().unwrap();
        assert_eq!(row.n_jpsi, 2.0);
        assert_eq!(row.n_extra_mu, 3.0);
        assert_relative_eq!(row.mu3_pt, 4.0, epsilon = 1e-9);

        let mut rows: Vec<OutputRow> = Vec::new();
        let summary = Inspector::default()
            .run(vec![Ok(event)], &mut rows)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.rejections.get("no ancestor"), Some(&1));
    }

    #[test]
    fn test_output_is_idempotent() {
        let events = || vec![test_event(), chain(&[5203, 5122], 2), chain(&[521], 1)];
        let inspector = Inspector::default();
        let mut first: Vec<OutputRow> = Vec::new();
        let mut second: Vec<OutputRow> = Vec::new();
        inspector
            .run(events().into_iter().map(Ok), &mut first)
            .unwrap();
        inspector
            .run(events().into_iter().map(Ok), &mut second)
            .unwrap();
        assert_eq!(first.len(), 3);
        let bits = |rows: &[OutputRow]| {
            rows.iter()
                .flat_map(|row| row.values())
                .map(f64::to_bits)
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_run_summary_and_limits() {
        let events: Vec<RjpsiResult<GenEvent>> = vec![
            Ok(test_event()),
            Ok(chain(&[], 1)),
            Ok(chain(&[521], 0)),
            Ok(test_event()),
        ];
        let mut rows: Vec<OutputRow> = Vec::new();
        let mut seen = 0;
        let summary = Inspector::default()
            .run_with_progress(events, &mut rows, |n| seen += n)
            .unwrap();
        assert_eq!(seen, 4);
        assert_eq!(summary.events, 4);
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.rejected(), 2);
        assert_eq!(
            summary.rejections.keys().copied().collect::<Vec<_>>(),
            vec!["no ancestor", "no extra lepton"]
        );
        assert_eq!(rows.len(), 2);

        let limited = Inspector::new(InspectorConfig {
            max_events: Some(1),
            ..Default::default()
        });
        let mut rows: Vec<OutputRow> = Vec::new();
        let summary = limited
            .run((0..10).map(|_| Ok(test_event())), &mut rows)
            .unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_run_stops_on_error() {
        let events: Vec<RjpsiResult<GenEvent>> = vec![
            Ok(test_event()),
            Err(RjpsiError::Custom("corrupt".to_string())),
        ];
        let mut rows: Vec<OutputRow> = Vec::new();
        let result = Inspector::default().run(events, &mut rows);
        assert!(matches!(result, Err(RjpsiError::Custom(_))));
    }

    #[test]
    fn test_custom_namer() {
        struct Codes;
        impl ParticleNamer for Codes {
            fn name(&self, pdg_id: i32) -> Option<String> {
                Some(pdg_id.to_string())
            }
        }
        let inspector = Inspector::default().with_namer(Codes);
        assert_eq!(inspector.namer.display_name(541), "541");
        assert_eq!(inspector.inspect_event(&test_event()).len(), 1);
    }
}
