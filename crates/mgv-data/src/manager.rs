// SPDX-License-Identifier: Apache-2.0

use crate::index::FeatureIndex;
use crate::query::{HttpQueryService, QueryService, SequenceType};
use crate::registrar::{FeatureRegistrar, LayoutSettings};
use mgv_core::{Error, MgvConfig, Result};
use mgv_model::{Chromosome, Feature, Genome, TrackRecord, TranscriptModel};
use mgv_store::{
    DataSource, FsByteCache, FsKeyStore, GenomeRegistrar, HttpDataSource, BYTE_CACHE_DIR,
    KEY_STORE_FILE,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const GENES_TRACK: &str = "genes";
pub const TRANSCRIPTS_TRACK: &str = "transcripts";
pub const SEQUENCES_TRACK: &str = "sequences";

type ChromosomeFeatures = HashMap<String, Vec<Arc<Feature>>>;

#[derive(Default)]
struct FeatureCache {
    loaded: HashMap<String, Arc<ChromosomeFeatures>>,
    failed: HashMap<String, Error>,
}

/// Either a registered feature or a value to resolve through [`DataManager::get_features_by`].
#[derive(Debug, Clone, Copy)]
pub enum FeatureRef<'a> {
    Feature(&'a Arc<Feature>),
    Value(&'a str),
}

impl<'a> From<&'a Arc<Feature>> for FeatureRef<'a> {
    fn from(value: &'a Arc<Feature>) -> Self {
        Self::Feature(value)
    }
}

impl<'a> From<&'a str> for FeatureRef<'a> {
    fn from(value: &'a str) -> Self {
        Self::Value(value)
    }
}

struct Inner {
    settings: LayoutSettings,
    root_location: String,
    registrar: Arc<GenomeRegistrar>,
    queries: Arc<dyn QueryService>,
    cache: RwLock<FeatureCache>,
    index: RwLock<FeatureIndex>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Feature cache, lookup indices and query surface over registered genomes.
///
/// Loads are at most once per genome. A load runs in its own task, so a
/// caller dropping its future does not abandon the load half way.
#[derive(Clone)]
pub struct DataManager {
    inner: Arc<Inner>,
}

impl DataManager {
    #[must_use]
    pub fn new(
        config: &MgvConfig,
        registrar: Arc<GenomeRegistrar>,
        queries: Arc<dyn QueryService>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings: LayoutSettings::from_config(config),
                root_location: config.root_location.clone(),
                registrar,
                queries,
                cache: RwLock::new(FeatureCache::default()),
                index: RwLock::new(FeatureIndex::new()),
                inflight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// HTTP transport plus the on-disk byte cache and key store under
    /// `config.cache_db_dir()`.
    pub fn from_config(config: &MgvConfig) -> Result<Self> {
        let source: Arc<dyn DataSource> = Arc::new(HttpDataSource::from_config(config)?);
        let db_dir = config.cache_db_dir();
        let registrar = Arc::new(GenomeRegistrar::new(
            Arc::clone(&source),
            Arc::new(FsByteCache::new(db_dir.join(BYTE_CACHE_DIR))),
            Arc::new(FsKeyStore::new(db_dir.join(KEY_STORE_FILE))),
        ));
        let queries = Arc::new(HttpQueryService::new(source, config.root_location.clone()));
        Ok(Self::new(config, registrar, queries))
    }

    #[must_use]
    pub fn registrar(&self) -> &Arc<GenomeRegistrar> {
        &self.inner.registrar
    }

    /// Genomes reachable from the configured root location.
    pub async fn get_genomes(&self) -> Result<Vec<Arc<Genome>>> {
        self.inner.registrar.register(&self.inner.root_location).await
    }

    #[must_use]
    pub fn lookup_genome(&self, name: &str) -> Option<Arc<Genome>> {
        self.inner.registrar.lookup_genome(name)
    }

    #[must_use]
    pub fn is_loaded(&self, genome: &Genome) -> bool {
        self.inner.load_state(genome.name()).is_some_and(|r| r.is_ok())
    }

    /// Loads and registers every gene of `genome`, at most once.
    ///
    /// Concurrent callers share one load. A failed load is remembered and
    /// returned again without refetching.
    pub async fn ensure_features(&self, genome: &Arc<Genome>) -> Result<()> {
        if let Some(done) = self.inner.load_state(genome.name()) {
            return done;
        }
        let gate = {
            let mut inflight = self.inner.inflight.lock().await;
            Arc::clone(
                inflight
                    .entry(genome.name().to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        let guard = gate.lock_owned().await;
        if let Some(done) = self.inner.load_state(genome.name()) {
            return done;
        }

        let inner = Arc::clone(&self.inner);
        let genome = Arc::clone(genome);
        tokio::spawn(async move {
            let _guard = guard;
            let result = inner.load_and_store(&genome).await;
            inner.inflight.lock().await.remove(genome.name());
            result
        })
        .await
        .map_err(|e| Error::internal(format!("feature load task failed: {e}")))?
    }

    /// All features of `genome` in chromosome order, loading first if needed.
    pub async fn get_all_features(&self, genome: &Arc<Genome>) -> Result<Vec<Arc<Feature>>> {
        self.ensure_features(genome).await?;
        Ok(self.cached_features(genome))
    }

    /// Whatever is cached for `genome` right now; empty when not loaded.
    #[must_use]
    pub fn cached_features(&self, genome: &Genome) -> Vec<Arc<Feature>> {
        let Some(by_chr) = self.inner.loaded(genome.name()) else {
            return Vec::new();
        };
        genome
            .chromosomes()
            .iter()
            .filter_map(|c| by_chr.get(&c.name))
            .flat_map(|feats| feats.iter().cloned())
            .collect()
    }

    /// Features overlapping `[start, end]` on `chromosome`; with
    /// `include_transcripts`, transcript models are attached to features
    /// that have none yet.
    pub async fn get_genes(
        &self,
        genome: &Arc<Genome>,
        chromosome: &str,
        start: u64,
        end: u64,
        include_transcripts: bool,
    ) -> Result<Vec<Arc<Feature>>> {
        self.ensure_features(genome).await?;
        if genome.chromosome(chromosome).is_none() {
            return Err(Error::missing_chromosome(genome.name(), chromosome));
        }
        let feats: Vec<Arc<Feature>> = self
            .inner
            .loaded(genome.name())
            .and_then(|by_chr| by_chr.get(chromosome).cloned())
            .unwrap_or_default()
            .into_iter()
            .filter(|f| f.overlaps(chromosome, start, end))
            .collect();
        if include_transcripts && feats.iter().any(|f| f.transcripts().is_empty()) {
            let mut by_gene: HashMap<String, Vec<TranscriptModel>> = HashMap::new();
            for model in self.get_models(genome, chromosome, start, end).await? {
                by_gene.entry(model.gene_id.clone()).or_default().push(model);
            }
            for f in &feats {
                if !f.transcripts().is_empty() {
                    continue;
                }
                if let Some(models) = by_gene.remove(f.id()) {
                    f.attach_transcripts(models);
                }
            }
        }
        Ok(feats)
    }

    /// Transcript models overlapping the range, exons in absolute coordinates.
    pub async fn get_models(
        &self,
        genome: &Genome,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<TranscriptModel>> {
        let reader = self
            .inner
            .registrar
            .get_reader(genome, TRANSCRIPTS_TRACK)
            .await?;
        let records = reader.features()?.read_range(chromosome, start, end).await?;
        records
            .iter()
            .map(|r| TranscriptModel::from_record(r).map_err(Error::from))
            .collect()
    }

    pub async fn get_sequence(
        &self,
        genome: &Genome,
        chromosome: &str,
        start: u64,
        end: u64,
    ) -> Result<String> {
        let reader = self
            .inner
            .registrar
            .get_reader(genome, SEQUENCES_TRACK)
            .await?;
        reader.sequence()?.read_range(chromosome, start, end).await
    }

    #[must_use]
    pub fn get_feature_by_id(&self, id: &str) -> Option<Arc<Feature>> {
        self.inner.index().by_id(id).cloned()
    }

    #[must_use]
    pub fn get_features_by_cid(&self, cid: &str) -> Vec<Arc<Feature>> {
        self.inner.index().by_cid(cid).to_vec()
    }

    /// Case-insensitive.
    #[must_use]
    pub fn get_features_by_symbol(&self, symbol: &str) -> Vec<Arc<Feature>> {
        self.inner.index().by_symbol(symbol).to_vec()
    }

    /// ID match (as a single-element list), else cluster-id match, else
    /// symbol match, else empty.
    #[must_use]
    pub fn get_features_by(&self, value: &str) -> Vec<Arc<Feature>> {
        self.inner.index().by_value(value)
    }

    /// One slot per requested genome, in the requested order: the member of
    /// the feature's cluster registered first in that genome, if any.
    #[must_use]
    pub fn get_genologs<'a>(
        &self,
        feature: impl Into<FeatureRef<'a>>,
        genomes: &[Arc<Genome>],
    ) -> Vec<Option<Arc<Feature>>> {
        let resolved = match feature.into() {
            FeatureRef::Feature(f) => Some(Arc::clone(f)),
            FeatureRef::Value(v) => self.get_features_by(v).into_iter().next(),
        };
        let Some(feature) = resolved else {
            debug!("genolog lookup found no feature");
            return vec![None; genomes.len()];
        };
        let members = match feature.cid() {
            Some(cid) => self.get_features_by_cid(cid),
            None => vec![Arc::clone(&feature)],
        };
        let mut by_genome: HashMap<&str, &Arc<Feature>> = HashMap::new();
        for m in &members {
            by_genome.entry(m.genome().name()).or_insert(m);
        }
        genomes
            .iter()
            .map(|g| by_genome.get(g.name()).map(|f| Arc::clone(f)))
            .collect()
    }

    #[must_use]
    pub fn get_genolog<'a>(
        &self,
        feature: impl Into<FeatureRef<'a>>,
        genome: &Arc<Genome>,
    ) -> Option<Arc<Feature>> {
        self.get_genologs(feature, std::slice::from_ref(genome))
            .into_iter()
            .next()
            .flatten()
    }

    pub async fn get_queries(&self) -> Result<Value> {
        self.inner.queries.queries().await
    }

    /// `kind` is one of `dna`, `transcript`, `cds`.
    pub fn get_fasta_url(
        &self,
        feature: &Feature,
        kind: &str,
        genomes: &[Arc<Genome>],
    ) -> Result<String> {
        let kind: SequenceType = kind.parse()?;
        Ok(self.inner.queries.fasta_url(feature, kind, genomes))
    }
}

impl Inner {
    fn load_state(&self, genome: &str) -> Option<Result<()>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        if cache.loaded.contains_key(genome) {
            return Some(Ok(()));
        }
        cache.failed.get(genome).cloned().map(Err)
    }

    fn loaded(&self, genome: &str) -> Option<Arc<ChromosomeFeatures>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded
            .get(genome)
            .cloned()
    }

    fn index(&self) -> std::sync::RwLockReadGuard<'_, FeatureIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn load_and_store(&self, genome: &Arc<Genome>) -> Result<()> {
        let result = self.load(genome).await;
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(by_chr) => {
                cache
                    .loaded
                    .insert(genome.name().to_string(), Arc::new(by_chr));
                Ok(())
            }
            Err(err) => {
                warn!(genome = %genome.name(), error = %err, "feature load failed");
                cache.failed.insert(genome.name().to_string(), err.clone());
                Err(err)
            }
        }
    }

    async fn load(&self, genome: &Arc<Genome>) -> Result<ChromosomeFeatures> {
        let reader = self.registrar.get_reader(genome, GENES_TRACK).await?;
        let records = reader.features()?.read_all().await?;
        info!(genome = %genome.name(), records = records.len(), "loading features");
        let runs = chromosome_runs(genome, records)?;

        let mut staged = FeatureIndex::new();
        let mut by_chr = ChromosomeFeatures::new();
        for (chromosome, records) in runs {
            let name = chromosome.name.clone();
            let mut registrar =
                FeatureRegistrar::new(Arc::clone(genome), chromosome, &mut staged, &self.settings);
            let mut feats = Vec::with_capacity(records.len());
            for record in &records {
                if let Some(f) = registrar.register(record)? {
                    feats.push(f);
                }
            }
            info!(
                genome = %genome.name(),
                chromosome = %name,
                count = feats.len(),
                "registered chromosome features"
            );
            by_chr.insert(name, feats);
        }
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(staged);
        Ok(by_chr)
    }
}

/// Splits source-ordered records into per-chromosome runs, in order of first
/// appearance. A chromosome missing from the genome fails the whole load
/// before anything is registered.
fn chromosome_runs(
    genome: &Genome,
    records: Vec<TrackRecord>,
) -> Result<Vec<(Chromosome, Vec<TrackRecord>)>> {
    let mut runs: Vec<(Chromosome, Vec<TrackRecord>)> = Vec::new();
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;
    for record in records {
        let slot = match current {
            Some(slot) if runs[slot].0.name == record.seqid => slot,
            _ => {
                let slot = match slot_of.get(&record.seqid).copied() {
                    Some(slot) => {
                        warn!(
                            genome = %genome.name(),
                            chromosome = %record.seqid,
                            "chromosome records are not contiguous, merging runs"
                        );
                        slot
                    }
                    None => {
                        let chromosome =
                            genome.chromosome(&record.seqid).cloned().ok_or_else(|| {
                                Error::missing_chromosome(genome.name(), &record.seqid)
                            })?;
                        slot_of.insert(chromosome.name.clone(), runs.len());
                        runs.push((chromosome, Vec::new()));
                        runs.len() - 1
                    }
                };
                current = Some(slot);
                slot
            }
        };
        runs[slot].1.push(record);
    }
    for (_, run) in &mut runs {
        run.sort_by_key(|r| r.start);
    }
    Ok(runs)
}
