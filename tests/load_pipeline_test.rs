//! End-to-end directory runs against the in-memory store
//!
//! Each test writes input files into a temporary directory, runs the
//! directory driver and inspects both the progress output and the tables.

use chrono::NaiveDate;
use patient_loader::adapters::memory::MemoryStore;
use patient_loader::core::load::{DirectoryDriver, LoadOptions, LoadSummary};
use patient_loader::domain::{PatientId, VisitId};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const P1_RECORD: &str = r#"{"patient_id":"P1","name":"A","visits":[{"visit_id":"V1","date":"2023-05-10","diagnoses":[{"code":"X1","treatments":[{"drug":"D1","dose":"5mg"}]}],"provider_notes":{"text":"n","author":"Dr"}}]}"#;

struct Run {
    summary: LoadSummary,
    store: MemoryStore,
    output: String,
}

async fn run_with(dir: &Path, store: MemoryStore, options: LoadOptions) -> Run {
    let mut out = Vec::new();
    let mut driver = DirectoryDriver::new(store, options, &mut out);
    let summary = driver.run(dir).await.expect("run should not abort");
    let store = driver.into_store();

    Run {
        summary,
        store,
        output: String::from_utf8(out).unwrap(),
    }
}

async fn run(dir: &Path) -> Run {
    run_with(dir, MemoryStore::new(), LoadOptions::default()).await
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

#[tokio::test]
async fn test_single_record_fans_out_to_all_tables() {
    let dir = TempDir::new().unwrap();
    write(&dir, "p1.json", P1_RECORD);

    let run = run(dir.path()).await;
    let tables = run.store.tables();

    assert_eq!(run.output, "Loaded file: p1.json\n");

    let patient = &tables.patients[&PatientId::new("P1")];
    assert_eq!(patient.name, "A");

    let visit = &tables.visits[&VisitId::new("V1")];
    assert_eq!(visit.patient_id, PatientId::new("P1"));
    assert_eq!(visit.visit_date, NaiveDate::from_ymd_opt(2023, 5, 10).unwrap());

    assert_eq!(tables.diagnoses.len(), 1);
    let diagnosis = &tables.diagnoses[0];
    assert_eq!(diagnosis.visit_id, VisitId::new("V1"));
    assert_eq!(diagnosis.code, "X1");
    assert_eq!(diagnosis.description, None);

    assert_eq!(tables.treatments.len(), 1);
    let treatment = &tables.treatments[0];
    assert_eq!(treatment.diagnosis_id, diagnosis.diagnosis_id);
    assert_eq!(treatment.drug, "D1");
    assert_eq!(treatment.dose.as_deref(), Some("5mg"));

    assert_eq!(tables.provider_notes.len(), 1);
    let note = &tables.provider_notes[0];
    assert_eq!(note.visit_id, VisitId::new("V1"));
    assert_eq!(note.text.as_deref(), Some("n"));
    assert_eq!(note.author.as_deref(), Some("Dr"));

    assert_eq!(run.summary.files_loaded, 1);
    assert_eq!(run.summary.records_loaded, 1);
    assert_eq!(run.summary.rows.total_rows(), 5);
}

#[tokio::test]
async fn test_malformed_date_rolls_back_whole_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "bad.json", &P1_RECORD.replace("2023-05-10", "10-05-2023"));

    let run = run(dir.path()).await;

    assert_eq!(
        run.output,
        "ERROR loading bad.json: Invalid visit date '10-05-2023': expected YYYY-MM-DD\n"
    );
    assert_eq!(run.store.tables().row_count(), 0);
    assert_eq!(run.store.rollbacks(), 1);
    assert_eq!(run.store.commits(), 0);
    assert!(!run.summary.is_successful());
}

#[tokio::test]
async fn test_failure_late_in_array_undoes_earlier_records() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "batch.json",
        r#"[
            {"patient_id": "P1", "name": "A", "visits": [{"visit_id": "V1", "date": "2023-01-01"}]},
            {"patient_id": "P2", "name": "B"},
            {"patient_id": "P3"}
        ]"#,
    );

    let run = run(dir.path()).await;

    assert_eq!(
        run.output,
        "ERROR loading batch.json: Missing required field 'name' in patient\n"
    );
    assert_eq!(run.store.tables().row_count(), 0);
}

#[tokio::test]
async fn test_reloading_keeps_first_patient_and_duplicates_children() {
    let dir = TempDir::new().unwrap();
    write(&dir, "p1.json", P1_RECORD);

    let first = run(dir.path()).await;

    // Same ids, different name: the stored patient must not change
    write(&dir, "p1.json", &P1_RECORD.replace(r#""name":"A""#, r#""name":"Changed""#));
    let second = run_with(dir.path(), first.store, LoadOptions::default()).await;
    let tables = second.store.tables();

    assert_eq!(second.output, "Loaded file: p1.json\n");
    assert_eq!(tables.patients.len(), 1);
    assert_eq!(tables.patients[&PatientId::new("P1")].name, "A");
    assert_eq!(tables.visits.len(), 1);
    assert_eq!(tables.diagnoses.len(), 2);
    assert_eq!(tables.treatments.len(), 2);
    assert_eq!(tables.provider_notes.len(), 2);

    assert_eq!(second.summary.rows.patients, 0);
    assert_eq!(second.summary.rows.visits, 0);
    assert_eq!(second.summary.rows.conflicts_skipped, 2);

    let ids: Vec<_> = tables.diagnoses.iter().map(|d| d.diagnosis_id).collect();
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_treatments_attach_to_their_own_diagnosis() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "fanout.json",
        r#"{"patient_id": "P1", "name": "A", "visits": [{
            "visit_id": "V1", "date": "2023-05-10",
            "diagnoses": [
                {"code": "X1", "treatments": [{"drug": "A1"}, {"drug": "A2"}]},
                {"code": "X2", "treatments": [{"drug": "B1"}, {"drug": "B2"}]}
            ]
        }]}"#,
    );

    let run = run(dir.path()).await;
    let tables = run.store.tables();
    let visit_id = VisitId::new("V1");

    let diagnoses: Vec<_> = tables.diagnoses_for(&visit_id).collect();
    assert_eq!(diagnoses.len(), 2);

    let drugs_of = |index: usize| -> Vec<&str> {
        tables
            .treatments_for(diagnoses[index].diagnosis_id)
            .map(|t| t.drug.as_str())
            .collect()
    };
    assert_eq!(diagnoses[0].code, "X1");
    assert_eq!(drugs_of(0), vec!["A1", "A2"]);
    assert_eq!(diagnoses[1].code, "X2");
    assert_eq!(drugs_of(1), vec!["B1", "B2"]);
}

#[tokio::test]
async fn test_array_loads_records_in_order() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "many.json",
        r#"[
            {"patient_id": "P1", "name": "A"},
            {"patient_id": "P2", "name": "B"},
            {"patient_id": "P3", "name": "C"}
        ]"#,
    );

    let run = run(dir.path()).await;

    assert_eq!(run.output, "Loaded file: many.json\n");
    assert_eq!(run.store.tables().patients.len(), 3);
    assert_eq!(run.store.commits(), 1);
    assert_eq!(run.summary.records_loaded, 3);
}

#[tokio::test]
async fn test_empty_array_is_a_successful_empty_load() {
    let dir = TempDir::new().unwrap();
    write(&dir, "empty.json", "[]");

    let run = run(dir.path()).await;

    assert_eq!(run.output, "Loaded file: empty.json\n");
    assert_eq!(run.store.tables().row_count(), 0);
    assert!(run.summary.is_successful());
}

#[tokio::test]
async fn test_isolation_across_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.json", r#"{"patient_id": "PA", "name": "A"}"#);
    write(&dir, "b.json", r#"{"patient_id": "PB", "name": "B", "visits": [{"visit_id": "VB"}]}"#);
    write(&dir, "c.json", r#"{"patient_id": "PC", "name": "C"}"#);

    let run = run(dir.path()).await;
    let tables = run.store.tables();

    assert_eq!(
        run.output,
        "Loaded file: a.json\n\
         ERROR loading b.json: Missing required field 'date' in visit\n\
         Loaded file: c.json\n"
    );
    assert!(tables.patients.contains_key(&PatientId::new("PA")));
    assert!(!tables.patients.contains_key(&PatientId::new("PB")));
    assert!(tables.patients.contains_key(&PatientId::new("PC")));
    assert_eq!(run.summary.files_seen, 3);
    assert_eq!(run.summary.files_loaded, 2);
    assert_eq!(run.summary.files_failed, 1);
    assert_eq!(run.summary.failures[0].file, "b.json");
}

#[tokio::test]
async fn test_files_are_processed_in_name_order() {
    let dir = TempDir::new().unwrap();
    for name in ["c.json", "a.json", "b.json"] {
        write(&dir, name, "[]");
    }

    let run = run(dir.path()).await;

    assert_eq!(
        run.output,
        "Loaded file: a.json\nLoaded file: b.json\nLoaded file: c.json\n"
    );
}

#[tokio::test]
async fn test_scalar_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(&dir, "scalar.json", "\"P1\"");

    let run = run(dir.path()).await;

    assert!(run.output.starts_with("ERROR loading scalar.json: File "));
    assert!(run.output.contains("does not contain a JSON object or array"));
}

#[tokio::test]
async fn test_invalid_json_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir, "broken.json", r#"{"patient_id": "P1", "name": "#);

    let run = run(dir.path()).await;

    assert!(run.output.starts_with("ERROR loading broken.json: Invalid JSON"));
    assert_eq!(run.store.tables().row_count(), 0);
}

#[tokio::test]
async fn test_visit_of_other_patient_is_kept_unchanged() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "a.json",
        r#"{"patient_id": "P1", "name": "A", "visits": [{"visit_id": "V1", "date": "2023-05-10"}]}"#,
    );
    write(
        &dir,
        "b.json",
        r#"{"patient_id": "P2", "name": "B", "visits": [{"visit_id": "V1", "date": "2024-01-01",
            "diagnoses": [{"code": "X9"}]}]}"#,
    );

    let run = run(dir.path()).await;
    let tables = run.store.tables();
    let visit = &tables.visits[&VisitId::new("V1")];

    assert!(run.summary.is_successful());
    assert_eq!(visit.patient_id, PatientId::new("P1"));
    assert_eq!(visit.visit_date, NaiveDate::from_ymd_opt(2023, 5, 10).unwrap());
    // The diagnosis still lands on the existing visit
    assert_eq!(tables.diagnoses_for(&VisitId::new("V1")).count(), 1);
}

#[tokio::test]
async fn test_non_json_entries_are_skipped() {
    let dir = TempDir::new().unwrap();
    write(&dir, "notes.txt", "not data");
    write(&dir, "UPPER.JSON", r#"{"patient_id": "P1", "name": "A"}"#);
    fs::create_dir(dir.path().join("archive")).unwrap();

    let run = run(dir.path()).await;

    assert_eq!(run.output, "Loaded file: UPPER.JSON\n");
    assert_eq!(run.summary.files_seen, 1);
    assert_eq!(run.summary.skipped_entries(), 2);
}

#[tokio::test]
async fn test_verbose_reports_skipped_input() {
    let dir = TempDir::new().unwrap();
    write(&dir, "notes.txt", "not data");
    write(
        &dir,
        "mixed.json",
        r#"[{"patient_id": "P1", "name": "A"}, 7, {"patient_id": "P2", "name": "B"}]"#,
    );

    let options = LoadOptions {
        verbose: true,
        ..LoadOptions::default()
    };
    let run = run_with(dir.path(), MemoryStore::new(), options).await;

    assert_eq!(
        run.output,
        "Skipped entry: notes.txt\n\
         Loaded file: mixed.json\n\
         Skipped element 1 of mixed.json: number is not a record\n"
    );
    assert_eq!(run.store.tables().patients.len(), 2);
}

#[tokio::test]
async fn test_special_characters_survive_unchanged() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "quotes.json",
        r#"{"patient_id": "P'1", "name": "O'Brien; DROP TABLE patients; --", "visits": [
            {"visit_id": "V\"1", "date": "2023-05-10", "provider_notes": {"text": "línea\nnueva"}}
        ]}"#,
    );

    let run = run(dir.path()).await;
    let tables = run.store.tables();

    assert!(run.summary.is_successful());
    assert_eq!(
        tables.patients[&PatientId::new("P'1")].name,
        "O'Brien; DROP TABLE patients; --"
    );
    assert_eq!(tables.provider_notes[0].text.as_deref(), Some("línea\nnueva"));
}

#[tokio::test]
async fn test_missing_input_directory_aborts() {
    let mut out = Vec::new();
    let mut driver = DirectoryDriver::new(MemoryStore::new(), LoadOptions::default(), &mut out);

    let result = driver.run(Path::new("/nonexistent/patient-input")).await;
    assert!(result.is_err());
}
