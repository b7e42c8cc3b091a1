//! Tagging orchestrator: read a note, ask the generator for keywords, run
//! the pipeline, and write the note back.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use contextkeys_generation::{KeywordGenerator, build_prompt};
use contextkeys_shared::{AppConfig, ContextKeysError, MergePolicy, Result};
use tracing::{debug, info, instrument, warn};

use crate::pipeline::{KeywordExtractionPipeline, PipelineOutcome, existing_keywords};
use crate::store::DocumentStore;

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Runtime tagging options, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct TaggingOptions {
    /// How stored and generated keywords are combined.
    pub policy: MergePolicy,
    /// Compute the rewrite but never write it.
    pub dry_run: bool,
    /// Prompt prefix placed before the note body.
    pub prompt: String,
}

impl From<&AppConfig> for TaggingOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            policy: config.defaults.merge_policy,
            dry_run: config.defaults.dry_run,
            prompt: config.generation.prompt.clone(),
        }
    }
}

/// Result of tagging one note.
#[derive(Debug, Clone)]
pub struct TagResult {
    pub path: PathBuf,
    pub outcome: PipelineOutcome,
    /// Whether the note was saved (false for dry runs and no-op rewrites).
    pub written: bool,
}

/// Result of tagging a batch of notes.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub tagged: Vec<TagResult>,
    pub failed: Vec<(PathBuf, ContextKeysError)>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.tagged.iter().filter(|r| r.written).count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for tagging runs.
pub trait TagProgress: Send + Sync {
    /// Called before a note is processed.
    fn document_started(&self, path: &Path, current: usize, total: usize);
    /// Called after a note is processed, successfully or not.
    fn document_finished(&self, path: &Path, result: &Result<TagResult>);
    /// Called when the batch completes.
    fn done(&self, summary: &BatchSummary);
}

/// No-op progress for headless/test usage.
pub struct SilentProgress;

impl TagProgress for SilentProgress {
    fn document_started(&self, _path: &Path, _current: usize, _total: usize) {}
    fn document_finished(&self, _path: &Path, _result: &Result<TagResult>) {}
    fn done(&self, _summary: &BatchSummary) {}
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Generate keywords for one note and merge them into its header.
///
/// 1. Read the note
/// 2. Check for a header (no generation call is made without one)
/// 3. Prompt the generator with the note body
/// 4. Run the pipeline
/// 5. Write the note back unless this is a dry run or nothing changed
#[instrument(skip_all, fields(path = %path.display(), generator = generator.name()))]
pub async fn generate_and_insert<S, G>(
    store: &S,
    generator: &G,
    path: &Path,
    options: &TaggingOptions,
) -> Result<TagResult>
where
    S: DocumentStore,
    G: KeywordGenerator,
{
    let doc = store.read(path).await?;
    let existing = existing_keywords(&doc)?;

    let body = existing.header.body(&doc);
    let generated = if body.trim().is_empty() {
        warn!("note body is empty, skipping generation");
        String::new()
    } else {
        generator.generate(&build_prompt(&options.prompt, body)).await?
    };
    debug!(completion_len = generated.len(), "generation finished");

    let outcome = KeywordExtractionPipeline::new(options.policy).run_detailed(&doc, &generated)?;
    info!(
        old = %outcome.existing,
        new = %outcome.incoming,
        merged = outcome.merged.len(),
        "keywords merged"
    );

    let written = if options.dry_run {
        debug!("dry run, not writing");
        false
    } else if !outcome.changed(&doc) {
        debug!("note unchanged, not writing");
        false
    } else {
        store.write(path, &outcome.document).await?;
        true
    };

    Ok(TagResult {
        path: path.to_path_buf(),
        outcome,
        written,
    })
}

/// Tag every note in `paths`, one after another.
///
/// A failure on one note is recorded and the rest are still processed.
#[instrument(skip_all, fields(documents = paths.len()))]
pub async fn tag_documents<S, G>(
    store: &S,
    generator: &G,
    paths: &[PathBuf],
    options: &TaggingOptions,
    progress: &dyn TagProgress,
) -> BatchSummary
where
    S: DocumentStore,
    G: KeywordGenerator,
{
    let start = Instant::now();
    let mut summary = BatchSummary::default();

    for (idx, path) in paths.iter().enumerate() {
        progress.document_started(path, idx + 1, paths.len());

        let result = generate_and_insert(store, generator, path, options).await;
        progress.document_finished(path, &result);

        match result {
            Ok(tagged) => summary.tagged.push(tagged),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "tagging failed");
                summary.failed.push((path.clone(), e));
            }
        }
    }

    summary.elapsed = start.elapsed();
    info!(
        tagged = summary.tagged.len(),
        written = summary.written(),
        failed = summary.failed.len(),
        "tagging complete"
    );
    progress.done(&summary);

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
