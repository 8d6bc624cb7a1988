// SPDX-License-Identifier: Apache-2.0

use crate::byte_cache::ByteCache;
use crate::genome_reader::GenomeReader;
use crate::key_store::KeyStore;
use crate::location::{metadata_url, normalize_location, resolve_location};
use crate::source::DataSource;
use crate::track::TrackReader;
use mgv_core::{Error, Result};
use mgv_model::{Genome, GenomeDescriptor};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// One resolved element of a discovery document.
#[derive(Debug, Clone)]
enum DiscoveryEntry {
    Genome(Box<GenomeDescriptor>),
    Forward(String),
}

type Cell<T> = Arc<OnceCell<Result<T>>>;

#[derive(Default)]
struct Registry {
    by_alias: HashMap<String, Arc<Genome>>,
    readers: HashMap<String, Arc<GenomeReader>>,
    order: Vec<Arc<Genome>>,
}

/// Discovers genomes reachable from a location and hands out their track readers.
///
/// Every location's document is fetched at most once. A registration walks
/// the forwarding graph with a visited set, so forwarding cycles end once
/// each distinct location has been read.
pub struct GenomeRegistrar {
    source: Arc<dyn DataSource>,
    byte_cache: Arc<dyn ByteCache>,
    key_store: Arc<dyn KeyStore>,
    documents: Mutex<HashMap<String, Cell<Vec<DiscoveryEntry>>>>,
    registrations: Mutex<HashMap<String, Cell<Vec<Arc<Genome>>>>>,
    registry: RwLock<Registry>,
}

impl GenomeRegistrar {
    #[must_use]
    pub fn new(
        source: Arc<dyn DataSource>,
        byte_cache: Arc<dyn ByteCache>,
        key_store: Arc<dyn KeyStore>,
    ) -> Self {
        Self {
            source,
            byte_cache,
            key_store,
            documents: Mutex::new(HashMap::new()),
            registrations: Mutex::new(HashMap::new()),
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Genomes reachable from `location`, in discovery order, each once.
    /// Repeated and concurrent calls for one location share a single result.
    pub async fn register(&self, location: &str) -> Result<Vec<Arc<Genome>>> {
        let root = normalize_location(location);
        let cell = cell_for(&self.registrations, &root);
        cell.get_or_init(|| self.walk(root.clone())).await.clone()
    }

    async fn walk(&self, root: String) -> Result<Vec<Arc<Genome>>> {
        enum Step {
            Visit(String),
            Emit(Box<GenomeDescriptor>, String),
        }
        let mut visited: HashSet<String> = HashSet::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![Step::Visit(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(location) => {
                    if !visited.insert(location.clone()) {
                        debug!(location = %location, "location already visited");
                        continue;
                    }
                    let entries = self.document(&location).await?;
                    for entry in entries.into_iter().rev() {
                        stack.push(match entry {
                            DiscoveryEntry::Genome(d) => Step::Emit(d, location.clone()),
                            DiscoveryEntry::Forward(to) => Step::Visit(to),
                        });
                    }
                }
                Step::Emit(descriptor, location) => {
                    if let Some(genome) = self.register_genome(*descriptor, &location) {
                        if seen.insert(genome.name().to_string()) {
                            out.push(genome);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    async fn document(&self, location: &str) -> Result<Vec<DiscoveryEntry>> {
        let cell = cell_for(&self.documents, location);
        cell.get_or_init(|| async {
            let url = metadata_url(location);
            debug!(location, url = %url, "fetching discovery document");
            let value = self.source.fetch_json(&url).await?;
            let mut entries = Vec::new();
            collect_entries(location, value, &mut entries)?;
            Ok(entries)
        })
        .await
        .clone()
    }

    /// Registers one descriptor under its name, path and short name.
    /// Non-genome descriptors yield `None`; a name seen before yields the
    /// instance registered first.
    pub fn register_genome(
        &self,
        descriptor: GenomeDescriptor,
        base_url: &str,
    ) -> Option<Arc<Genome>> {
        if !descriptor.is_genome() {
            return None;
        }
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = registry.by_alias.get(&descriptor.name) {
            debug!(genome = %descriptor.name, "genome already registered");
            return Some(Arc::clone(existing));
        }
        let genome = Arc::new(Genome::from_descriptor(descriptor, base_url));
        let reader = Arc::new(GenomeReader::new(
            Arc::clone(&genome),
            Arc::clone(&self.source),
            Arc::clone(&self.byte_cache),
            Arc::clone(&self.key_store),
        ));
        for alias in genome.aliases() {
            if registry.by_alias.contains_key(alias) {
                warn!(genome = %genome.name(), alias, "alias already taken, keeping first");
                continue;
            }
            registry
                .by_alias
                .insert(alias.to_string(), Arc::clone(&genome));
            registry
                .readers
                .insert(alias.to_string(), Arc::clone(&reader));
        }
        registry.order.push(Arc::clone(&genome));
        drop(registry);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let early = Arc::clone(&reader);
            handle.spawn(async move {
                if let Err(err) = early.check_timestamp().await {
                    warn!(genome = %early.genome().name(), error = %err, "timestamp check failed");
                }
            });
        }
        info!(
            genome = %genome.name(),
            path = %genome.path(),
            chromosomes = genome.chromosomes().len(),
            "registered genome"
        );
        Some(genome)
    }

    /// The named track reader, once the genome's timestamp check has finished.
    pub async fn get_reader(&self, genome: &Genome, track: &str) -> Result<TrackReader> {
        let reader = self
            .genome_reader(genome.name())
            .ok_or_else(|| Error::unknown_genome(genome.name()))?;
        reader.ready().await?;
        reader
            .reader(track)
            .cloned()
            .ok_or_else(|| Error::unknown_track(genome.name(), track))
    }

    #[must_use]
    pub fn genome_reader(&self, name: &str) -> Option<Arc<GenomeReader>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .readers
            .get(name)
            .cloned()
    }

    /// Looks a genome up by name, path or short name.
    #[must_use]
    pub fn lookup_genome(&self, name: &str) -> Option<Arc<Genome>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_alias
            .get(name)
            .cloned()
    }

    /// Every registered genome, in registration order.
    #[must_use]
    pub fn genomes(&self) -> Vec<Arc<Genome>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }
}

fn cell_for<T>(table: &Mutex<HashMap<String, Cell<T>>>, key: &str) -> Cell<T> {
    let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(table.entry(key.to_string()).or_default())
}

fn collect_entries(location: &str, value: Value, out: &mut Vec<DiscoveryEntry>) -> Result<()> {
    match value {
        Value::String(target) => {
            out.push(DiscoveryEntry::Forward(resolve_location(location, &target)));
        }
        Value::Array(items) => {
            for item in items {
                collect_entries(location, item, out)?;
            }
        }
        obj @ Value::Object(_) if GenomeDescriptor::is_genome_value(&obj) => {
            let descriptor: GenomeDescriptor = serde_json::from_value(obj).map_err(|e| {
                Error::decode(format!("invalid genome descriptor at {location}: {e}"))
            })?;
            out.push(DiscoveryEntry::Genome(Box::new(descriptor)));
        }
        Value::Object(_) => debug!(location, "ignoring non-genome discovery object"),
        other => warn!(location, value = %other, "ignoring unexpected discovery value"),
    }
    Ok(())
}
