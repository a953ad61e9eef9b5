use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use encoding_rs::Encoding;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    catalog::{read_catalog, resolve_encoding, write_catalog},
    cli::args::ExtractArgs,
    config::{Config, load_config},
    core::{
        error::ExtractError,
        eval::Evaluator,
        file_scanner::scan_files,
        parsers::java::parse_java_source,
        rules::RuleRegistry,
        scan::scan_unit,
        store::MessageStore,
        sync::{SyncSummary, synchronize},
    },
    utils::relative_path,
};

/// What one extraction run produced.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub store: MessageStore,
    pub summary: SyncSummary,
    pub written: bool,
}

/// Extraction pipeline for one project.
///
/// Built from command line arguments with the priority
/// CLI arguments > `.glotpotrc.json` > built-in defaults, then run as
/// discover → parse and scan (parallel) → merge → synchronize → write.
pub struct ExtractContext {
    /// Merged configuration (CLI args > config file > defaults).
    pub config: Config,

    /// Project root; occurrence paths are relative to it.
    pub root_dir: PathBuf,

    /// Resolved catalog path.
    pub output_path: PathBuf,

    /// Java files to scan, sorted.
    pub files: BTreeSet<PathBuf>,

    /// Paths skipped because they could not be accessed.
    pub skipped_count: usize,

    pub remove_unused: bool,

    registry: RuleRegistry,
    evaluator: Evaluator,
    encoding: &'static Encoding,
}

impl ExtractContext {
    /// Load config, apply CLI overrides, validate rules and discover files.
    pub fn new(args: &ExtractArgs) -> Result<Self> {
        let root_dir = args
            .common
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if !root_dir.is_dir() {
            return Err(ExtractError::MissingSourceRoot(root_dir).into());
        }

        let config_result = load_config(&root_dir)?;
        match &config_result.path {
            Some(path) => debug!(path = %path.display(), "loaded config"),
            None => debug!("no config file found, using default configuration"),
        }
        let mut config = config_result.config;

        if let Some(output) = &args.output {
            config.output = output.to_string_lossy().to_string();
        }
        if let Some(encoding) = &args.encoding {
            config.encoding = encoding.clone();
        }
        // CLI rules extend the configured ones; a CLI rule replaces one of the same name.
        for rule in &args.keywords {
            config.keywords.retain(|r| r.name != rule.name);
            config.keywords.push(rule.clone());
        }
        for rule in &args.annotations {
            config.annotations.retain(|r| r.name != rule.name);
            config.annotations.push(rule.clone());
        }

        let encoding = resolve_encoding(&config.encoding)?;
        let registry = config.registry().map_err(ExtractError::from)?;
        let remove_unused = config.remove_unused && !args.keep_unused;

        let output_path = {
            let output = Path::new(&config.output);
            if output.is_absolute() {
                output.to_path_buf()
            } else {
                root_dir.join(output)
            }
        };

        let scan_result = scan_files(&root_dir, &config.includes, &config.ignores)?;
        if scan_result.skipped_count > 0 {
            warn!(
                count = scan_result.skipped_count,
                "paths skipped due to access errors"
            );
        }
        info!(files = scan_result.files.len(), "discovered source files");

        Ok(Self {
            config,
            root_dir,
            output_path,
            files: scan_result.files,
            skipped_count: scan_result.skipped_count,
            remove_unused,
            registry,
            evaluator: Evaluator::new(),
            encoding,
        })
    }

    /// Parse and scan every file in parallel and merge the per-file stores.
    ///
    /// The first failing file aborts the run.
    pub fn extract(&self) -> Result<MessageStore, ExtractError> {
        let store = self
            .files
            .par_iter()
            .map(|file| self.extract_file(file))
            .try_reduce(MessageStore::new, |left, right| Ok(left.merged(right)))?;
        info!(
            messages = store.len(),
            occurrences = store.occurrence_count(),
            "extracted messages"
        );
        Ok(store)
    }

    fn extract_file(&self, file: &Path) -> Result<MessageStore, ExtractError> {
        let code = fs::read_to_string(file).map_err(|source| ExtractError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let path = relative_path(&self.root_dir, file);
        let unit = parse_java_source(&code, &path)?;
        scan_unit(&unit, &self.registry, &self.evaluator)
            .map_err(|source| ExtractError::Evaluation { path, source })
    }

    /// The store persisted by a previous run, if the catalog exists.
    pub fn previous_catalog(&self) -> Result<Option<MessageStore>> {
        if !self.output_path.exists() {
            return Ok(None);
        }
        let store = read_catalog(&self.output_path, self.encoding)?;
        debug!(messages = store.len(), "read previous catalog");
        Ok(Some(store))
    }

    /// Run the whole pipeline. Nothing is written unless every phase succeeds.
    pub fn run(&self, dry_run: bool) -> Result<ExtractOutcome> {
        let fresh = self.extract()?;
        let previous = self.previous_catalog()?;
        let (store, summary) = synchronize(fresh, previous, self.remove_unused);

        if !dry_run {
            let header = self.config.header();
            write_catalog(&self.output_path, &store, &header, self.encoding)
                .with_context(|| format!("Failed to write {}", self.output_path.display()))?;
        }

        Ok(ExtractOutcome {
            store,
            summary,
            written: !dry_run,
        })
    }
}
