use criterion::{criterion_group, criterion_main, Criterion};
use img_hash::image::{DynamicImage, ImageOutputFormat};
use pratyaksh_core::evidence::{
    DeviceLocation, Fingerprint, GeoForensics, IntegrityBadge, IntegrityScore, SealedVerdict,
    EvidenceRecord,
};
use pratyaksh_core::ledger::EvidenceLedger;
use pratyaksh_core::{fingerprint, integrity};

// Synthetic in-memory PNG so the bench has no filesystem preconditions
fn synthetic_png() -> Vec<u8> {
    let img = DynamicImage::new_rgb8(256, 256);
    let mut buf = Vec::new();
    img.write_to(&mut buf, ImageOutputFormat::Png)
        .expect("encode synthetic png");
    buf
}

fn bench_scoring(c: &mut Criterion) {
    let device = DeviceLocation {
        latitude: 19.076,
        longitude: 72.8777,
    };
    let forensics = GeoForensics {
        latitude: Some(19.09),
        longitude: Some(72.88),
        timestamp: Some("2026:08:07 10:00:00".to_string()),
        software: Some("Adobe Photoshop 2025".to_string()),
        is_edited: true,
        is_geotagged: true,
    };

    c.bench_function("integrity_scoring", |b| {
        b.iter(|| integrity::calculate_integrity(&forensics, &device))
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let bytes = synthetic_png();

    c.bench_function("fingerprint_generation", |b| {
        b.iter(|| fingerprint::generate_fingerprints(&bytes))
    });
}

fn bench_ledger_append(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("bench tempdir");
    let mut ledger = EvidenceLedger::open(dir.path().to_str().unwrap()).expect("open ledger");

    let integrity_score = IntegrityScore {
        score: 100,
        badge: IntegrityBadge::Verified,
        reasons: vec![],
    };
    let record = EvidenceRecord {
        fingerprint: Fingerprint {
            sha256: "ab".repeat(32),
            phash: None,
        },
        forensics: GeoForensics {
            latitude: Some(19.076),
            longitude: Some(72.8777),
            timestamp: None,
            software: None,
            is_edited: false,
            is_geotagged: true,
        },
        device: DeviceLocation {
            latitude: 19.076,
            longitude: 72.8777,
        },
        integrity: integrity_score.clone(),
        reported_at: 1_700_000_000,
    };
    let verdict = SealedVerdict {
        record_digest: [1u8; 32],
        integrity: integrity_score,
        sealed_at: 1_700_000_000,
    };

    c.bench_function("ledger_append_entry", |b| {
        b.iter(|| ledger.append(&verdict, &record).unwrap())
    });
}

criterion_group!(benches, bench_scoring, bench_fingerprint, bench_ledger_append);
criterion_main!(benches);
