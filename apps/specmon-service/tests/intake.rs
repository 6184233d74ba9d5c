//! End-to-end intake pipeline tests over temp folders, an in-memory store,
//! scripted document text, and a recording notifier.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use specmon_core::{Folder, SpecRecord};
use specmon_service::config::{EmailSettings, Settings};
use specmon_service::mailer::Notify;
use specmon_service::pdf::{DocumentSource, UnreadableDocument};
use specmon_service::pipeline::IntakePipeline;
use specmon_service::store::SpecStore;

const COMPLETE_TEXT: &str = "Title\nSpec A\nAuthor\nJane\nRevision\n1\nDate\n2024-01-01\nArea\nHW\nPurpose\nTest\nDescription\nDoes X";

/// Text missing its Description body, so the extracted record is incomplete.
const INCOMPLETE_TEXT: &str =
    "Title\nSpec B\nAuthor\nJane\nRevision\n1\nDate\n2024-01-01\nArea\nHW\nPurpose\nTest\nDescription";

/// Returns scripted text per base filename; unknown files fail extraction.
#[derive(Default)]
struct ScriptedSource {
    texts: HashMap<String, String>,
}

impl ScriptedSource {
    fn with(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }
}

impl DocumentSource for ScriptedSource {
    fn extract_text(&self, path: &Path) -> Result<String, UnreadableDocument> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .cloned()
            .ok_or_else(|| UnreadableDocument {
                path: path.to_path_buf(),
                reason: "scripted failure".to_string(),
            })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    recipient_mails: Mutex<Vec<(Folder, Vec<String>)>>,
    admin_mails: Mutex<Vec<(Folder, String)>>,
}

impl RecordingNotifier {
    fn recipient_count(&self) -> usize {
        self.recipient_mails.lock().unwrap().len()
    }

    fn admin_count(&self) -> usize {
        self.admin_mails.lock().unwrap().len()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify_recipients(&self, records: &[SpecRecord], folder: Folder) {
        let names = records.iter().map(|r| r.file_name.clone()).collect();
        self.recipient_mails.lock().unwrap().push((folder, names));
    }

    async fn notify_admin(&self, issue: &str, folder: Folder) {
        self.admin_mails
            .lock()
            .unwrap()
            .push((folder, issue.to_string()));
    }
}

struct Harness {
    pipeline: IntakePipeline<ScriptedSource, Arc<RecordingNotifier>>,
    notifier: Arc<RecordingNotifier>,
    ongoing: tempfile::TempDir,
    approved: tempfile::TempDir,
    csv: tempfile::TempDir,
}

fn settings(ongoing: &Path, approved: &Path, csv: &Path) -> Settings {
    Settings {
        ongoing_dir: ongoing.to_path_buf(),
        approved_dir: approved.to_path_buf(),
        approved_csv_dir: csv.to_path_buf(),
        poll_interval: Duration::from_millis(10),
        database_url: "sqlite::memory:".to_string(),
        email: EmailSettings {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender_email: "service@example.com".to_string(),
            sender_password: "secret".to_string(),
            recipients: vec!["team@example.com".to_string()],
            admins: vec!["admin@example.com".to_string()],
        },
    }
}

async fn harness(source: ScriptedSource) -> Harness {
    let ongoing = tempfile::tempdir().unwrap();
    let approved = tempfile::tempdir().unwrap();
    let csv = tempfile::tempdir().unwrap();

    let settings = settings(ongoing.path(), approved.path(), csv.path());
    let store = SpecStore::connect(&settings.database_url).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = IntakePipeline::new(&settings, store, source, Arc::clone(&notifier))
        .await
        .unwrap();

    Harness {
        pipeline,
        notifier,
        ongoing,
        approved,
        csv,
    }
}

fn drop_file(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"%PDF-1.4 placeholder").unwrap();
}

fn csv_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn valid_ongoing_record_is_persisted_and_announced_without_csv() {
    let mut h = harness(ScriptedSource::default().with("a.pdf", COMPLETE_TEXT)).await;
    drop_file(h.ongoing.path(), "a.pdf");
    drop_file(h.ongoing.path(), "notes.txt");

    h.pipeline.run_cycle().await;

    let stored = h.pipeline.store().list_records(Folder::Ongoing).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Spec A");
    assert_eq!(stored[0].file_name, "a.pdf");

    let mails = h.notifier.recipient_mails.lock().unwrap().clone();
    assert_eq!(mails, vec![(Folder::Ongoing, vec!["a.pdf".to_string()])]);
    assert_eq!(h.notifier.admin_count(), 0);

    // Ongoing records never trigger a CSV export.
    assert!(csv_files(h.csv.path()).is_empty());
}

#[tokio::test]
async fn second_run_over_an_unchanged_folder_dispatches_nothing() {
    let mut h = harness(ScriptedSource::default().with("a.pdf", COMPLETE_TEXT)).await;
    drop_file(h.ongoing.path(), "a.pdf");

    h.pipeline.run_cycle().await;
    h.pipeline.run_cycle().await;

    assert_eq!(h.notifier.recipient_count(), 1);
    assert_eq!(h.notifier.admin_count(), 0);
    let stored = h.pipeline.store().list_records(Folder::Ongoing).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn approved_records_are_exported_to_a_dated_csv() {
    let mut h = harness(ScriptedSource::default().with("b.pdf", COMPLETE_TEXT)).await;
    drop_file(h.approved.path(), "b.pdf");

    h.pipeline.run_cycle().await;

    let files = csv_files(h.csv.path());
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("bvlib_"), "unexpected name {name}");
    assert!(name.ends_with(".csv"));

    let contents = std::fs::read_to_string(&files[0]).unwrap();
    assert!(contents.starts_with("Title,Author,Revision,Date,Area,Purpose,Description"));
    assert!(contents.contains("Spec A,Jane,1,2024-01-01,HW,Test,Does X"));

    let mails = h.notifier.recipient_mails.lock().unwrap().clone();
    assert_eq!(mails, vec![(Folder::Approved, vec!["b.pdf".to_string()])]);
}

#[tokio::test]
async fn incomplete_record_alerts_admin_and_is_retried_next_run() {
    let mut h = harness(ScriptedSource::default().with("c.pdf", INCOMPLETE_TEXT)).await;
    drop_file(h.ongoing.path(), "c.pdf");

    h.pipeline.run_cycle().await;

    assert_eq!(h.notifier.recipient_count(), 0);
    let admin = h.notifier.admin_mails.lock().unwrap().clone();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].0, Folder::Ongoing);
    assert!(admin[0].1.contains("c.pdf"));
    assert!(h
        .pipeline
        .store()
        .list_records(Folder::Ongoing)
        .await
        .unwrap()
        .is_empty());

    // Never baselined, so the next cycle reports it again.
    h.pipeline.run_cycle().await;
    assert_eq!(h.notifier.admin_count(), 2);
}

#[tokio::test]
async fn unreadable_document_is_dropped_with_an_admin_alert() {
    // d.pdf has no scripted text, so extraction fails.
    let mut h = harness(ScriptedSource::default()).await;
    drop_file(h.ongoing.path(), "d.pdf");

    h.pipeline.run_cycle().await;

    assert_eq!(h.notifier.recipient_count(), 0);
    let admin = h.notifier.admin_mails.lock().unwrap().clone();
    assert_eq!(admin.len(), 1);
    assert!(admin[0].1.contains("d.pdf"));
    assert!(h
        .pipeline
        .store()
        .list_records(Folder::Ongoing)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn one_folder_failing_never_blocks_the_other() {
    let ongoing = tempfile::tempdir().unwrap();
    let approved = tempfile::tempdir().unwrap();
    let csv = tempfile::tempdir().unwrap();

    let mut settings = settings(ongoing.path(), approved.path(), csv.path());
    // Point the ongoing folder somewhere that does not exist.
    settings.ongoing_dir = ongoing.path().join("gone");

    let store = SpecStore::connect(&settings.database_url).await.unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let source = ScriptedSource::default().with("b.pdf", COMPLETE_TEXT);
    let mut pipeline = IntakePipeline::new(&settings, store, source, Arc::clone(&notifier))
        .await
        .unwrap();

    drop_file(approved.path(), "b.pdf");
    pipeline.run_cycle().await;

    // The unreadable ongoing folder produced an admin alert...
    let admin = notifier.admin_mails.lock().unwrap().clone();
    assert_eq!(admin.len(), 1);
    assert_eq!(admin[0].0, Folder::Ongoing);

    // ...while the approved folder was still processed in full.
    let mails = notifier.recipient_mails.lock().unwrap().clone();
    assert_eq!(mails, vec![(Folder::Approved, vec!["b.pdf".to_string()])]);
    let stored = pipeline.store().list_records(Folder::Approved).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn mixed_batch_is_partitioned_into_one_mail_each() {
    let source = ScriptedSource::default()
        .with("good.pdf", COMPLETE_TEXT)
        .with("bad.pdf", INCOMPLETE_TEXT);
    let mut h = harness(source).await;
    drop_file(h.ongoing.path(), "good.pdf");
    drop_file(h.ongoing.path(), "bad.pdf");

    h.pipeline.run_cycle().await;

    // One aggregated recipient mail for the valid record, one aggregated
    // admin mail for the invalid one.
    let mails = h.notifier.recipient_mails.lock().unwrap().clone();
    assert_eq!(mails, vec![(Folder::Ongoing, vec!["good.pdf".to_string()])]);
    let admin = h.notifier.admin_mails.lock().unwrap().clone();
    assert_eq!(admin.len(), 1);
    assert!(admin[0].1.contains("bad.pdf"));
    assert!(!admin[0].1.contains("good.pdf"));
}
