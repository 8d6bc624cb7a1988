// SPDX-License-Identifier: Apache-2.0

use mgv_core::ErrorCode;
use mgv_store::{
    metadata_key, ByteCache, FakeDataSource, GenomeRegistrar, KeyStore, MemoryByteCache,
    MemoryKeyStore,
};
use serde_json::{json, Value};
use std::sync::Arc;

const ROOT: &str = "http://mgv.test/data";

fn meta(location: &str) -> String {
    format!("{location}/fetch.cgi?datatype=metadata")
}

fn genome_doc(name: &str, path: &str, short: Option<&str>, timestamp: &str) -> Value {
    let mut doc = json!({
        "type": "genome",
        "name": name,
        "path": path,
        "timestamp": timestamp,
        "chromosomes": [{"name": "1"}, {"name": "2"}],
        "tracks": [
            {"track": "genes", "filetype": "gff"},
            {"track": "models", "filetype": "gff"},
            {"track": "sequences", "filetype": "fasta"},
            {"track": "variants", "filetype": "vcf"}
        ]
    });
    if let Some(short) = short {
        doc["shortname"] = json!(short);
    }
    doc
}

struct Fixture {
    source: Arc<FakeDataSource>,
    bytes: Arc<MemoryByteCache>,
    keys: Arc<MemoryKeyStore>,
    registrar: GenomeRegistrar,
}

fn fixture() -> Fixture {
    let source = Arc::new(FakeDataSource::new());
    let bytes = Arc::new(MemoryByteCache::new());
    let keys = Arc::new(MemoryKeyStore::new());
    let registrar = GenomeRegistrar::new(source.clone(), bytes.clone(), keys.clone());
    Fixture {
        source,
        bytes,
        keys,
        registrar,
    }
}

fn names(genomes: &[Arc<mgv_model::Genome>]) -> Vec<String> {
    genomes.iter().map(|g| g.name().to_string()).collect()
}

#[tokio::test]
async fn forwarding_cycle_settles_on_the_union_of_reachable_genomes() {
    let fx = fixture();
    fx.source.insert_json(
        meta(ROOT),
        &json!([genome_doc("A/J", "mus_musculus_aj", Some("AJ"), "1"), "../other"]),
    );
    fx.source.insert_json(
        meta("http://mgv.test/other"),
        &json!([genome_doc("C3H/HeJ", "mus_musculus_c3hhej", None, "1"), "../data/"]),
    );

    let genomes = fx.registrar.register(ROOT).await.expect("register");
    assert_eq!(names(&genomes), vec!["A/J", "C3H/HeJ"]);
    assert_eq!(fx.source.fetch_count(&meta(ROOT)), 1);
    assert_eq!(fx.source.fetch_count(&meta("http://mgv.test/other")), 1);
}

#[tokio::test]
async fn register_is_memoized_per_normalized_location() {
    let fx = fixture();
    fx.source
        .insert_json(meta(ROOT), &genome_doc("A/J", "mus_musculus_aj", None, "1"));

    let (a, b) = tokio::join!(fx.registrar.register(ROOT), fx.registrar.register(ROOT));
    let again = fx
        .registrar
        .register("http://mgv.test/data/./")
        .await
        .expect("normalized");
    assert_eq!(names(&a.expect("a")), vec!["A/J"]);
    assert_eq!(names(&b.expect("b")), vec!["A/J"]);
    assert_eq!(names(&again), vec!["A/J"]);
    assert_eq!(fx.source.fetch_count(&meta(ROOT)), 1);
}

#[tokio::test]
async fn genome_is_reachable_by_name_path_and_short_name() {
    let fx = fixture();
    fx.source.insert_json(
        meta(ROOT),
        &json!([
            genome_doc("C57BL/6J", "mus_musculus", Some("B6"), "1"),
            {"type": "note", "text": "not a genome"},
            42
        ]),
    );
    let genomes = fx.registrar.register(ROOT).await.expect("register");
    assert_eq!(genomes.len(), 1);

    let by_name = fx.registrar.lookup_genome("C57BL/6J").expect("name");
    let by_path = fx.registrar.lookup_genome("mus_musculus").expect("path");
    let by_short = fx.registrar.lookup_genome("B6").expect("short name");
    assert!(Arc::ptr_eq(&by_name, &by_path));
    assert!(Arc::ptr_eq(&by_name, &by_short));
    assert_eq!(by_name.chromosome("2").map(|c| c.index), Some(1));
    assert_eq!(by_name.url(), ROOT);
    assert!(fx.registrar.lookup_genome("DBA/2J").is_none());
}

#[tokio::test]
async fn descriptor_seen_at_two_locations_registers_once() {
    let fx = fixture();
    let g = genome_doc("A/J", "mus_musculus_aj", None, "1");
    fx.source
        .insert_json(meta(ROOT), &json!([g.clone(), "mirror"]));
    fx.source.insert_json(meta("http://mgv.test/data/mirror"), &g);

    let genomes = fx.registrar.register(ROOT).await.expect("register");
    assert_eq!(names(&genomes), vec!["A/J"]);
    assert_eq!(fx.registrar.genomes().len(), 1);
}

#[tokio::test]
async fn readers_include_models_gene_view_and_reject_unknown_tracks() {
    let fx = fixture();
    fx.source
        .insert_json(meta(ROOT), &genome_doc("A/J", "mus_musculus_aj", None, "1"));
    let genome = fx.registrar.register(ROOT).await.expect("register")[0].clone();

    let gene_view = fx
        .registrar
        .get_reader(&genome, "models.genes")
        .await
        .expect("models.genes reader");
    assert_eq!(gene_view.track(), "models.genes");
    assert!(gene_view.features().is_ok());

    let seq = fx
        .registrar
        .get_reader(&genome, "sequences")
        .await
        .expect("sequence reader");
    assert!(seq.sequence().is_ok());

    let err = fx
        .registrar
        .get_reader(&genome, "variants")
        .await
        .expect_err("vcf track is skipped");
    assert_eq!(err.code, ErrorCode::UnknownTrack);

    let reader = fx.registrar.genome_reader("A/J").expect("genome reader");
    assert_eq!(
        reader.track_names().collect::<Vec<_>>(),
        vec!["genes", "models", "models.genes", "sequences"]
    );
}

#[tokio::test]
async fn changed_timestamp_clears_cached_bytes_before_the_first_read() {
    let fx = fixture();
    fx.source
        .insert_json(meta(ROOT), &genome_doc("A/J", "mm", None, "2020-02-02"));
    let genes_url = format!("{ROOT}/fetch.cgi?datatype=gff&genome=mm&track=genes");
    fx.source
        .insert(genes_url.as_str(), "1\tMGI\tgene\t10\t20\t.\t+\t.\tID=fresh\n");
    fx.bytes
        .put("mm", &genes_url, b"1\tMGI\tgene\t10\t20\t.\t+\t.\tID=stale\n")
        .await
        .expect("seed cache");
    fx.keys
        .set(&metadata_key("mm"), json!({"timestamp": "2019-01-01"}))
        .await
        .expect("seed key store");

    let genome = fx.registrar.register(ROOT).await.expect("register")[0].clone();
    let reader = fx
        .registrar
        .get_reader(&genome, "genes")
        .await
        .expect("reader");
    let records = reader.features().expect("features").read_all().await.expect("read");
    assert_eq!(records[0].attr("ID"), Some("fresh"));

    let saved = fx.keys.get(&metadata_key("mm")).await.expect("get").expect("saved");
    assert_eq!(saved["timestamp"], json!("2020-02-02"));
    assert_eq!(saved["name"], json!("A/J"));
}

#[tokio::test]
async fn matching_timestamp_keeps_cached_bytes() {
    let fx = fixture();
    fx.source
        .insert_json(meta(ROOT), &genome_doc("A/J", "mm", None, "7"));
    let genes_url = format!("{ROOT}/fetch.cgi?datatype=gff&genome=mm&track=genes");
    fx.bytes
        .put("mm", &genes_url, b"1\tMGI\tgene\t10\t20\t.\t+\t.\tID=cached\n")
        .await
        .expect("seed cache");
    fx.keys
        .set(&metadata_key("mm"), json!({"timestamp": 7}))
        .await
        .expect("seed key store");

    let genome = fx.registrar.register(ROOT).await.expect("register")[0].clone();
    let reader = fx
        .registrar
        .get_reader(&genome, "genes")
        .await
        .expect("reader");
    let records = reader.features().expect("features").read_all().await.expect("read");
    assert_eq!(records[0].attr("ID"), Some("cached"));
    assert_eq!(fx.source.fetch_count(&genes_url), 0);
}

#[tokio::test]
async fn unreachable_forward_fails_the_registration() {
    let fx = fixture();
    fx.source
        .insert_json(meta(ROOT), &json!(["http://elsewhere.test/missing"]));
    let err = fx.registrar.register(ROOT).await.expect_err("missing doc");
    assert_eq!(err.code, ErrorCode::Network);
}
