//! Whole-program resolution.
//!
//! Every unit added to a [`Program`] is registered up front, so the registry
//! knows all program classes before any reference resolves. Resolution then
//! runs in rounds:
//!
//! 1. header stage of every new unit (in parallel when enabled)
//! 2. barrier: request failures are forgotten, all shapes are published
//! 3. body stage of every new unit
//! 4. units the external resolver reported are loaded and registered; if any
//!    were, the next round resolves them
//!
//! Finalization runs once all rounds are done.

use crate::external::SourceLoader;
use crate::session::ResolveSession;
use crate::unit::{Stage, UnitResolution, UnitResolver};
use gvc_ast::ModuleAst;
use gvc_common::Diagnostic;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use std::sync::Arc;
use tracing::{debug, info_span, warn};

pub struct Program<'s> {
    session: &'s ResolveSession,
    loader: Option<Box<dyn SourceLoader + 's>>,
    units: Vec<UnitResolver<'s>>,
}

impl<'s> Program<'s> {
    pub fn new(session: &'s ResolveSession) -> Self {
        Self {
            session,
            loader: None,
            units: Vec::new(),
        }
    }

    /// Supplier of units the external resolver schedules.
    #[must_use]
    pub fn with_loader(mut self, loader: impl SourceLoader + 's) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Register a unit's classes and queue it for resolution.
    pub fn add_module(&mut self, module: ModuleAst) {
        if self.session.registry().has_unit(&module.file) {
            warn!(file = %module.file, "unit added twice; ignoring");
            return;
        }
        self.units
            .push(UnitResolver::new(self.session, Arc::new(module)));
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Resolve every unit, loading scheduled ones as they are reported.
    pub fn resolve(mut self) -> ProgramResolution {
        let session = self.session;
        let options = session.options();
        let mut start = 0;
        let mut round = 0u32;

        loop {
            let _span =
                info_span!("resolve_round", round, units = self.units.len() - start).entered();
            let batch = &mut self.units[start..];
            run_stage(batch, Stage::Header, options.parallel);
            session.caches().begin_round();
            run_stage(batch, Stage::Body, options.parallel);
            start = self.units.len();
            round += 1;

            let loaded = self.load_scheduled();
            if loaded == 0 {
                break;
            }
            if round >= options.max_scheduling_rounds {
                warn!(round, "scheduling round limit reached; no further units are loaded");
                break;
            }
            session.caches().begin_round();
        }

        // Units loaded in the last allowed round still need their stages.
        if start < self.units.len() {
            let batch = &mut self.units[start..];
            run_stage(batch, Stage::Header, options.parallel);
            run_stage(batch, Stage::Body, options.parallel);
        }

        if options.parallel {
            self.units.par_iter_mut().for_each(UnitResolver::finalize);
        } else {
            self.units.iter_mut().for_each(UnitResolver::finalize);
        }
        debug!(
            units = self.units.len(),
            rounds = round,
            pending = session.registry().pending_count(),
            "program resolved"
        );
        ProgramResolution {
            units: self
                .units
                .into_iter()
                .map(UnitResolver::into_resolution)
                .collect(),
        }
    }

    /// Load the units scheduled since the last call. Returns how many were
    /// added.
    fn load_scheduled(&mut self) -> usize {
        let scheduled = self.session.registry().take_scheduled();
        if scheduled.is_empty() {
            return 0;
        }
        let Some(loader) = self.loader.as_ref() else {
            warn!(units = scheduled.len(), "units scheduled without a source loader");
            return 0;
        };
        let modules: Vec<ModuleAst> = scheduled
            .iter()
            .filter_map(|file| {
                let module = loader.load(file);
                if module.is_none() {
                    warn!(file = %file, "scheduled unit could not be loaded");
                }
                module
            })
            .collect();
        let before = self.units.len();
        for module in modules {
            self.add_module(module);
        }
        debug!(loaded = self.units.len() - before, "loaded scheduled units");
        self.units.len() - before
    }
}

fn run_stage(units: &mut [UnitResolver<'_>], stage: Stage, parallel: bool) {
    if parallel {
        units.par_iter_mut().for_each(|unit| unit.run_stage(stage));
    } else {
        for unit in units {
            unit.run_stage(stage);
        }
    }
}

/// Resolution results of every unit of a program.
#[derive(Debug)]
pub struct ProgramResolution {
    units: Vec<UnitResolution>,
}

impl ProgramResolution {
    pub fn units(&self) -> &[UnitResolution] {
        &self.units
    }

    pub fn unit(&self, file: &str) -> Option<&UnitResolution> {
        self.units.iter().find(|u| u.file() == file)
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.units.iter().flat_map(UnitResolution::diagnostics)
    }

    pub fn error_count(&self) -> usize {
        self.units.iter().map(UnitResolution::error_count).sum()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.units.iter().all(UnitResolution::is_fully_resolved)
    }
}
