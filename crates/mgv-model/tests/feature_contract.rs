// SPDX-License-Identifier: Apache-2.0

use mgv_model::{
    Exon, FeatureDraft, FeatureLayout, Genome, GenomeDescriptor, Strand, TrackRecord,
    TranscriptModel,
};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn genome() -> Arc<Genome> {
    let d: GenomeDescriptor = serde_json::from_value(json!({
        "type": "genome",
        "name": "A/J",
        "path": "mus_musculus_aj",
        "timestamp": "2020-01-01",
        "chromosomes": [{"name": "1"}],
        "tracks": []
    }))
    .expect("descriptor");
    Arc::new(Genome::from_descriptor(d, "."))
}

fn record(attrs: &[(&str, &str)]) -> TrackRecord {
    TrackRecord {
        seqid: "1".to_string(),
        source: "MGI".to_string(),
        feature_type: "protein_coding_gene".to_string(),
        start: 100,
        end: 199,
        score: Some("0.5".to_string()),
        strand: Strand::Minus,
        phase: None,
        attrs: attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn draft_consumes_identity_attributes_and_keeps_the_rest() {
    let draft = FeatureDraft::from_record(&record(&[
        ("ID", "MGP_AJ_G0000001"),
        ("cID", "MGI:97490"),
        ("symbol", "Pax6"),
        ("tCount", "3"),
        ("long_name", "paired box 6"),
    ]))
    .expect("draft");
    assert_eq!(draft.id, "MGP_AJ_G0000001");
    assert_eq!(draft.cid.as_deref(), Some("MGI:97490"));
    assert_eq!(draft.transcript_count, 3);
    assert_eq!(draft.weight(), 3);
    assert_eq!(draft.length(), 100);
    assert_eq!(draft.so_type, "protein_coding_gene");
    assert_eq!(draft.attributes.len(), 1);
    assert!(draft.attributes.contains_key("long_name"));
}

#[test]
fn draft_requires_id_and_numeric_transcript_count() {
    assert!(FeatureDraft::from_record(&record(&[("symbol", "x")])).is_err());
    assert!(FeatureDraft::from_record(&record(&[("ID", "g"), ("tCount", "many")])).is_err());
    let no_count = FeatureDraft::from_record(&record(&[("ID", "g")])).expect("draft");
    assert_eq!(no_count.weight(), 1);
}

#[test]
fn sealed_feature_derives_display_id_and_label() {
    let g = genome();
    let chr = g.chromosome("1").cloned().expect("chr");
    let with_cluster = FeatureDraft::from_record(&record(&[("ID", "g1"), ("cID", "C1")]))
        .expect("draft")
        .seal(Arc::clone(&g), chr.clone(), FeatureLayout::default());
    assert_eq!(with_cluster.display_id(), "C1");
    assert_eq!(with_cluster.label(), "C1");

    let bare = FeatureDraft::from_record(&record(&[("ID", "g2"), ("symbol", "Abc1")]))
        .expect("draft")
        .seal(g, chr, FeatureLayout { lane: 2, lane2: 1, contig: 4 });
    assert_eq!(bare.display_id(), "g2");
    assert_eq!(bare.label(), "Abc1");
    assert_eq!((bare.lane(), bare.lane2(), bare.contig()), (2, 1, 4));
    assert_eq!(bare.strand(), Strand::Minus);
}

#[test]
fn transcripts_attach_at_most_once() {
    let g = genome();
    let chr = g.chromosome("1").cloned().expect("chr");
    let f = FeatureDraft::from_record(&record(&[("ID", "g1")]))
        .expect("draft")
        .seal(g, chr, FeatureLayout::default());
    assert!(f.transcripts().is_empty());
    assert!(!f.attach_transcripts(Vec::new()));
    let model = TranscriptModel {
        gene_id: "g1".to_string(),
        transcript_id: "t1".to_string(),
        exons: vec![Exon { start: 100, end: 150 }],
    };
    assert!(f.attach_transcripts(vec![model.clone()]));
    assert!(!f.attach_transcripts(vec![model.clone(), model]));
    assert_eq!(f.transcripts().len(), 1);
}

#[test]
fn feature_serializes_with_genome_name_and_layout() {
    let g = genome();
    let chr = g.chromosome("1").cloned().expect("chr");
    let f = FeatureDraft::from_record(&record(&[("ID", "g1"), ("symbol", "Kit")]))
        .expect("draft")
        .seal(g, chr, FeatureLayout { lane: 1, lane2: 0, contig: 0 });
    let v = serde_json::to_value(&f).expect("serialize");
    assert_eq!(v["ID"], json!("g1"));
    assert_eq!(v["genome"], json!("A/J"));
    assert_eq!(v["strand"], json!("-"));
    assert_eq!(v["lane"], json!(1));
    assert!(v.get("transcripts").is_none());
}
