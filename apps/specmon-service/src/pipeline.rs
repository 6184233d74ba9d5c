//! The per-run intake pipeline: scan, diff, extract, validate, dispatch.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use specmon_core::{new_files, parse_spec_text, Folder, SpecRecord};
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Settings;
use crate::csv_export::CsvExporter;
use crate::mailer::Notify;
use crate::pdf::DocumentSource;
use crate::scan;
use crate::store::SpecStore;

/// Orchestrates one intake cycle over both watched folders and owns the
/// per-folder known-filenames baselines.
///
/// The baselines are loaded from the store at construction and only ever
/// grow, only from inside the scheduling loop. Files whose records came out
/// incomplete are never baselined, so they are rediscovered every cycle
/// until the source document is corrected in place.
pub struct IntakePipeline<S, N> {
    store: SpecStore,
    source: S,
    notifier: N,
    exporter: CsvExporter,
    ongoing_dir: PathBuf,
    approved_dir: PathBuf,
    baselines: HashMap<Folder, HashSet<String>>,
}

impl<S: DocumentSource, N: Notify> IntakePipeline<S, N> {
    /// Build the pipeline and load the per-folder baselines from the store.
    pub async fn new(
        settings: &Settings,
        store: SpecStore,
        source: S,
        notifier: N,
    ) -> Result<Self, sqlx::Error> {
        let mut baselines = HashMap::new();
        for folder in Folder::ALL {
            let known = store.list_file_names(folder).await?;
            info!(%folder, known = known.len(), "loaded baseline");
            baselines.insert(folder, known);
        }

        Ok(Self {
            store,
            source,
            notifier,
            exporter: CsvExporter::new(&settings.approved_csv_dir),
            ongoing_dir: settings.ongoing_dir.clone(),
            approved_dir: settings.approved_dir.clone(),
            baselines,
        })
    }

    /// Scheduling loop: run a cycle, sleep, repeat until shutdown flips.
    ///
    /// Cancellation is cooperative: the signal is checked before each run
    /// and interrupts the inter-run delay, never an in-flight cycle.
    pub async fn run(&mut self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.run_cycle().await;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("intake loop stopped");
    }

    /// One full run over both watched folders. A failure in one folder never
    /// prevents the other from being processed.
    pub async fn run_cycle(&mut self) {
        for folder in Folder::ALL {
            self.process_folder(folder).await;
        }
    }

    /// The store behind this pipeline.
    pub fn store(&self) -> &SpecStore {
        &self.store
    }

    fn folder_dir(&self, folder: Folder) -> &Path {
        match folder {
            Folder::Ongoing => &self.ongoing_dir,
            Folder::Approved => &self.approved_dir,
        }
    }

    async fn process_folder(&mut self, folder: Folder) {
        let dir = self.folder_dir(folder).to_path_buf();
        let listing = match scan::list_folder(&dir) {
            Ok(listing) => listing,
            Err(err) => {
                error!(%folder, path = %dir.display(), error = %err, "failed to read folder contents");
                let issue = format!(
                    "There was an issue attempting to read the folder contents for {} by the \
                     monitoring service. Here is the error:\n{err}\n\nPlease review.",
                    dir.display()
                );
                self.notifier.notify_admin(&issue, folder).await;
                Vec::new()
            }
        };

        let arrivals = {
            let known = self.baselines.entry(folder).or_default();
            new_files(&listing, known)
        };
        if arrivals.is_empty() {
            info!(%folder, "no new files since last run");
            return;
        }
        for path in &arrivals {
            info!(%folder, file = %path.display(), "file added");
        }

        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for path in &arrivals {
            // Only lowercase .pdf is picked up; anything else is ignored
            // without classification or reporting.
            if path.extension() != Some(OsStr::new("pdf")) {
                continue;
            }

            let text = match self.source.extract_text(path) {
                Ok(text) => text,
                Err(err) => {
                    // Dropped entirely: not valid, not invalid, not
                    // baselined, so it is retried next cycle.
                    error!(error = %err, "failed to extract document text");
                    let issue = format!(
                        "There was an issue extracting data from {}. The error is as \
                         follows:\n{err}\n\nPlease review.",
                        path.display()
                    );
                    self.notifier.notify_admin(&issue, folder).await;
                    continue;
                }
            };

            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let record = parse_spec_text(&text, &file_name, folder);
            log_spec_record(&record);

            if record.is_complete() {
                valid.push(record);
            } else {
                invalid.push(record);
            }
        }

        self.dispatch(folder, valid, invalid).await;
    }

    async fn dispatch(&mut self, folder: Folder, valid: Vec<SpecRecord>, invalid: Vec<SpecRecord>) {
        if !valid.is_empty() {
            self.notifier.notify_recipients(&valid, folder).await;

            if let Err(err) = self.store.save_all(&valid, &self.notifier).await {
                error!(error = %err, "failed to persist records");
                let issue = format!(
                    "There was an issue saving new {folder} records to the database:\n{err}\n\n\
                     Please review."
                );
                self.notifier.notify_admin(&issue, folder).await;
            }

            if folder == Folder::Approved {
                if let Err(err) = self.exporter.export(&valid) {
                    error!(error = %err, "failed to write CSV export");
                    let issue = format!(
                        "There was an issue writing the approved CSV export:\n{err}\n\n\
                         Please review."
                    );
                    self.notifier.notify_admin(&issue, folder).await;
                }
            }

            let baseline = self.baselines.entry(folder).or_default();
            baseline.extend(valid.iter().map(|record| record.file_name.clone()));
        }

        if !invalid.is_empty() {
            let names: Vec<&str> = invalid
                .iter()
                .map(|record| record.file_name.as_str())
                .collect();
            let issue = format!(
                "The following {folder} specs are missing required information: {}.\n\
                 Please review to ensure each spec is formatted correctly and fully complete, \
                 then update the files.",
                names.join(", ")
            );
            self.notifier.notify_admin(&issue, folder).await;
        }
    }
}

fn log_spec_record(record: &SpecRecord) {
    info!(
        file = %record.file_name,
        folder = ?record.folder,
        title = %record.title,
        author = %record.author,
        revision = %record.revision,
        date = %record.date,
        area = %record.area,
        purpose = %record.purpose,
        description = %record.description,
        "extracted spec data"
    );
}
