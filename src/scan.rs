//! The scan pipeline: per-document extraction in parallel, then corpus-wide
//! resolution and reconciliation once every document is done.

use rayon::prelude::*;

use crate::context::DEFAULT_WINDOW;
use crate::document::{Document, SanitizedDocument};
use crate::error::Error;
use crate::extractor::{extract_anchors, extract_references};
use crate::index::CorpusIndex;
use crate::reconciler::reconcile;
use crate::report::{self, Report, ScanStats};
use crate::resolver::resolve;
use crate::sanitizer::FrontMatterScope;
use crate::store::DocumentStore;
use crate::types::{AnchorDefinition, DocumentId, LinkReference, ResolvedReference};

/// Settings for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Characters of context on each side of a defect.
    pub context_window: usize,
    /// How far a front-matter block reaches.
    pub front_matter: FrontMatterScope,
}

impl Default for ScanOptions {
    fn default() -> Self {
        return Self {
            context_window: DEFAULT_WINDOW,
            front_matter: FrontMatterScope::default(),
        };
    }
}

/// Output of the per-document stage.
struct Extracted {
    anchors: Vec<AnchorDefinition>,
    document: Document,
    references: Vec<LinkReference>,
}

/// Read, sanitize and extract one document.
///
/// # Errors
///
/// Returns the store's error if the document cannot be read or analyzed.
fn extract_document<S: DocumentStore + ?Sized>(
    store: &S,
    id: &DocumentId,
    options: ScanOptions,
) -> Result<Extracted, Error> {
    let raw_text = store.read(id)?;
    let structure = store.structure(id, &raw_text)?;
    let structural = structure.ignore_ranges();

    let document = Document::new(id.clone(), raw_text, structure.aliases);
    let sanitized = SanitizedDocument::new(document, &structural, options.front_matter);
    let anchors = extract_anchors(id, sanitized.sanitized_text());
    let references = extract_references(id, sanitized.sanitized_text());

    tracing::debug!(
        document = %id,
        anchors = anchors.len(),
        references = references.len(),
        ignored = sanitized.ignored().len(),
        "extracted"
    );

    return Ok(Extracted {
        anchors,
        document: sanitized.into_document(),
        references,
    });
}

/// Scan the whole corpus in `store` and classify every anchor and link.
///
/// Stage one reads and extracts every document in parallel. Its collect is a
/// barrier: resolution starts only once every document has been extracted,
/// and the first retrieval failure aborts the scan without a report.
///
/// # Errors
///
/// Returns the first error from listing, reading or analyzing documents.
pub fn scan<S: DocumentStore + ?Sized>(store: &S, options: ScanOptions) -> Result<Report, Error> {
    let ids = store.list()?;
    tracing::info!(documents = ids.len(), "scanning corpus");

    let extracted: Vec<Extracted> = ids
        .par_iter()
        .map(|id| return extract_document(store, id, options))
        .collect::<Result<_, _>>()?;

    let mut documents = Vec::with_capacity(extracted.len());
    let mut anchors = Vec::new();
    let mut references = Vec::new();
    for item in extracted {
        documents.push(item.document);
        anchors.extend(item.anchors);
        references.extend(item.references);
    }

    let index = CorpusIndex::build(&documents, &anchors);
    let outcomes: Vec<Option<ResolvedReference>> = references
        .par_iter()
        .map(|reference| return resolve(reference, &index))
        .collect();
    let malformed = outcomes.iter().filter(|o| return o.is_none()).count();
    let resolved: Vec<ResolvedReference> = outcomes.into_iter().flatten().collect();

    let mut stats = ScanStats {
        anchors: anchors.len(),
        documents: documents.len(),
        malformed,
        references: references.len(),
        resolved: 0,
    };
    let reconciliation = reconcile(anchors, resolved);
    stats.resolved = reconciliation.resolved;

    tracing::info!(
        orphans = reconciliation.orphan_anchors.len(),
        broken = reconciliation.broken_links.len(),
        resolved = stats.resolved,
        malformed,
        "reconciled"
    );

    return Ok(report::assemble(&documents, reconciliation, stats, options.context_window));
}

// ── State machine ─────────────────────────────────────────────────────

/// Where a scan session is.
#[derive(Debug)]
pub enum ScanState {
    /// The corpus could not be retrieved. No report exists.
    Failed(Error),
    /// The scan completed; the report may be empty.
    Finished(Report),
    /// Created, not started.
    Initializing,
    /// Extraction or classification in progress.
    Scanning,
}

impl ScanState {
    /// Short name for logs and status lines.
    pub const fn label(&self) -> &'static str {
        return match self {
            Self::Failed(_) => "failed",
            Self::Finished(_) => "finished",
            Self::Initializing => "initializing",
            Self::Scanning => "scanning",
        };
    }

    /// Whether the session has ended, successfully or not.
    pub const fn is_terminal(&self) -> bool {
        return matches!(self, Self::Failed(_) | Self::Finished(_));
    }
}

/// One scan session over a store.
pub struct Scanner<'s, S: DocumentStore + ?Sized> {
    options: ScanOptions,
    state: ScanState,
    store: &'s S,
}

impl<'s, S: DocumentStore + ?Sized> Scanner<'s, S> {
    /// A session in the `Initializing` state.
    pub const fn new(store: &'s S, options: ScanOptions) -> Self {
        return Self {
            options,
            state: ScanState::Initializing,
            store,
        };
    }

    /// Current state.
    pub const fn state(&self) -> &ScanState {
        return &self.state;
    }

    /// Run the pipeline and end in `Finished` or `Failed`.
    ///
    /// Running again starts a fresh scan of the store's current contents.
    pub fn run(&mut self) -> &ScanState {
        self.transition(ScanState::Scanning);
        let next = match scan(self.store, self.options) {
            Ok(report) => ScanState::Finished(report),
            Err(e) => ScanState::Failed(e),
        };
        self.transition(next);
        return &self.state;
    }

    /// The report, if the scan finished.
    pub const fn report(&self) -> Option<&Report> {
        return match &self.state {
            ScanState::Finished(report) => Some(report),
            ScanState::Failed(_) | ScanState::Initializing | ScanState::Scanning => None,
        };
    }

    /// Consume the session, keeping its final state.
    pub fn into_state(self) -> ScanState {
        return self.state;
    }

    /// Consume the session and hand back its outcome, scanning first if
    /// `run` was never called.
    ///
    /// # Errors
    ///
    /// Returns the error the scan failed with.
    pub fn into_report(self) -> Result<Report, Error> {
        return match self.state {
            ScanState::Failed(e) => Err(e),
            ScanState::Finished(report) => Ok(report),
            ScanState::Initializing | ScanState::Scanning => scan(self.store, self.options),
        };
    }

    fn transition(&mut self, next: ScanState) {
        tracing::info!(from = self.state.label(), to = next.label(), "scan state");
        self.state = next;
    }
}
