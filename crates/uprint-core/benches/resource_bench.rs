// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for notification resource parsing and Graph payload
// deserialization in the uprint-core crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use uprint_core::resource::{JobResource, TaskResource, operation_id_from_location};
use uprint_core::types::{NotificationBatch, PrinterShare};

const RESOURCE: &str =
    "print/taskDefinitions/8119abe3-b5f5-457c-8a32-d83d94816cca/tasks/b9be9576-099e-48ee-a06b-1c1bf9245607";
const PARENT_URL: &str =
    "https://graph.microsoft.com/v1.0/print/printers/879146bd-984c-4989-bded-691a209442fc/jobs/1";

fn bench_resource_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_parsing");

    group.bench_function("task_resource", |b| {
        b.iter(|| black_box(RESOURCE).parse::<TaskResource>());
    });

    group.bench_function("job_parent_url", |b| {
        b.iter(|| black_box(PARENT_URL).parse::<JobResource>());
    });

    group.bench_function("operation_location", |b| {
        b.iter(|| {
            operation_id_from_location(black_box(
                "https://graph.microsoft.com/v1.0/print/operations/67348dfe-b1bb-4e1a-9a17-ca0da73cef64",
            ))
        });
    });

    group.finish();
}

fn bench_payload_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_parsing");

    let batch = format!(
        r#"{{"value": [{{"tenantId": "t", "clientState": "s", "resource": "{RESOURCE}",
            "resourceData": {{"parentUrl": "{PARENT_URL}"}}}}]}}"#
    );
    group.bench_function("notification_batch", |b| {
        b.iter(|| serde_json::from_str::<NotificationBatch>(black_box(&batch)));
    });

    let shares: String = {
        let one = r#"{"id": "P1", "displayName": "Front Desk",
            "defaults": {"copiesPerJob": 1, "orientation": "portrait", "colorMode": "auto"},
            "capabilities": {"orientations": ["portrait", "landscape"], "colorModes": ["auto"]}}"#;
        format!("[{}]", vec![one; 50].join(","))
    };
    group.bench_function("share_list_50", |b| {
        b.iter(|| serde_json::from_str::<Vec<PrinterShare>>(black_box(&shares)));
    });

    group.finish();
}

criterion_group!(benches, bench_resource_parsing, bench_payload_parsing);
criterion_main!(benches);
