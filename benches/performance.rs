use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;
use wizard_core::draft::{DraftEnvelope, DraftStore, JsonDraftStore};
use wizard_core::flows::dealer::DealerFlow;
use wizard_core::session::WizardFlow;
use wizard_core::state::{FieldValue, FormPatch, FormState};

fn wide_patch(fields: usize) -> FormPatch {
    (0..fields)
        .map(|idx| (format!("field_{}", idx), FieldValue::text("value")))
        .collect()
}

fn filled_dealer_state() -> FormState {
    let mut state = DealerFlow::create().seed();
    state.apply(
        FormPatch::new()
            .set("business_name", "Shetkari Agro Center")
            .set("dealer_type", "distributor")
            .set("contact_person", "Ramesh Patil")
            .set("establishment_year", 1998i64)
            .set("employee_count", "10-50")
            .set("phone", "9822000110")
            .set("email", "ramesh@shetkari.example")
            .set("address_line1", "14 Market Yard Road")
            .set("city", "Pune")
            .set("state", "Maharashtra")
            .set("postal_code", "411037")
            .set("gst_number", "27AAPFS1234F1ZK")
            .set("pan_number", "AAPFS1234F")
            .set("territory", "North Maharashtra"),
    );
    state
}

fn step_patches() -> Vec<FormPatch> {
    vec![
        FormPatch::new()
            .set("business_name", "Shetkari Agro Center")
            .set("dealer_type", "distributor")
            .set("contact_person", "Ramesh Patil"),
        FormPatch::new()
            .set("phone", "9822000110")
            .set("email", "ramesh@shetkari.example"),
        FormPatch::new()
            .set("address_line1", "14 Market Yard Road")
            .set("city", "Pune")
            .set("state", "Maharashtra")
            .set("postal_code", "411037"),
    ]
}

fn bench_form_state_merges(c: &mut Criterion) {
    let patch = wide_patch(black_box(200));

    c.bench_function("form_state_merge_200", |b| {
        b.iter_batched(
            || (FormState::new(), patch.clone()),
            |(mut state, patch)| {
                state.apply(patch);
                black_box(state);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_dealer_walkthrough(c: &mut Criterion) {
    let flow = DealerFlow::create();

    c.bench_function("dealer_wizard_walkthrough", |b| {
        b.iter_batched(
            || (flow.open(), step_patches()),
            |(mut session, patches)| {
                for patch in patches {
                    session.apply(patch);
                    session.advance();
                }
                // Registration and commercial terms pass on defaults.
                session.advance();
                session.advance();
                black_box(session.progress());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_dealer_validation(c: &mut Criterion) {
    let flow = DealerFlow::create();
    let descriptor = flow.descriptor();
    let state = filled_dealer_state();

    c.bench_function("dealer_validate_all", |b| {
        b.iter_batched(
            || state.clone(),
            |mut state| {
                descriptor.validate_all(&mut state).expect("valid state");
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_draft_io(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let store = JsonDraftStore::new(Some(dir.path().join("drafts"))).expect("create draft store");
    let envelope = DraftEnvelope::new(filled_dealer_state());

    c.bench_function("draft_save", |b| {
        b.iter(|| {
            store.save("bench_draft", &envelope).expect("save draft");
        })
    });

    store.save("bench_draft", &envelope).expect("seed");

    c.bench_function("draft_load", |b| {
        b.iter(|| {
            let loaded = store.load("bench_draft").expect("load draft");
            black_box(loaded);
        })
    });
}

criterion_group!(
    benches,
    bench_form_state_merges,
    bench_dealer_walkthrough,
    bench_dealer_validation,
    bench_draft_io
);
criterion_main!(benches);
