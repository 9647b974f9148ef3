use crate::config::PipelineConfig;
use crate::dispatcher::FormatDispatcher;
use crate::error::{BatchError, FailureKind, ParseError};
use crate::table::TableWriter;
use crate::types::{PlenaryMinutes, SchemaKind};
use crate::xml_tree::parse_document;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Times pipeline steps and, for steps that work through files, their rate
pub struct StepProfiler {
    enabled: bool,
    steps: Vec<StepTiming>,
}

struct StepTiming {
    name: String,
    elapsed: Duration,
    /// Items handled by the step, e.g. parsed files or written rows
    items: Option<(usize, &'static str)>,
}

impl StepTiming {
    fn rate(&self) -> Option<f64> {
        let (count, _) = self.items?;
        let secs = self.elapsed.as_secs_f64();
        (secs > 0.0).then(|| count as f64 / secs)
    }
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            steps: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.steps.push(StepTiming {
            name: step_name.to_string(),
            elapsed,
            items: None,
        });
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    /// Attach an item count to an already timed step and return its rate per second
    pub fn record_items(
        &mut self,
        step_name: &str,
        count: usize,
        unit: &'static str,
    ) -> Option<f64> {
        let step = self.steps.iter_mut().find(|step| step.name == step_name)?;
        step.items = Some((count, unit));
        let rate = step.rate();
        if let Some(rate) = rate {
            println!("🔄 {}: {} {} ({:.1} {}/s)", step_name, count, unit, rate, unit);
        }
        rate
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.steps.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.steps.iter().map(|step| step.elapsed).sum();

        for step in &self.steps {
            let share = if total.is_zero() {
                0.0
            } else {
                step.elapsed.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            let rate = match (step.items, step.rate()) {
                (Some((_, unit)), Some(rate)) => format!(", {:.1} {}/s", rate, unit),
                _ => String::new(),
            };
            println!(
                "   {:.<35} {:.0}ms ({:.1}%{})",
                step.name,
                step.elapsed.as_millis(),
                share,
                rate
            );
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

/// One input file that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    fn new(file: &Path, error: &ParseError) -> Self {
        Self {
            file: file.to_path_buf(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of a complete batch: records in input order plus every failure
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<PlenaryMinutes>,
    pub failures: Vec<FileFailure>,
    pub processed: usize,
    /// Successful records per source schema
    pub schema_counts: HashMap<SchemaKind, usize>,
}

/// Serializable run summary written next to the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn count_for(&self, schema: SchemaKind) -> usize {
        self.schema_counts.get(&schema).copied().unwrap_or(0)
    }

    pub fn count_by_period(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for pm in &self.records {
            *counts.entry(pm.period).or_insert(0) += 1;
        }
        counts
    }

    pub fn total_words(&self) -> usize {
        self.records.iter().map(PlenaryMinutes::word_count).sum()
    }

    pub fn failure_report(&self) -> FailureReport {
        FailureReport {
            generated_at: chrono::Utc::now(),
            processed: self.processed,
            succeeded: self.succeeded(),
            failed: self.failed(),
            failures: self.failures.clone(),
        }
    }

    pub fn save_failure_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.failure_report())
            .map_err(|e| anyhow!("Failed to serialize failure report: {}", e))?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write failure report {}", path.display()))?;
        Ok(())
    }
}

/// Recursively collect `*.xml` files below `dir`, sorted by path
pub fn discover_xml_files(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    collect_xml_files(dir, &mut files).map_err(|source| BatchError::Discovery {
        dir: dir.to_path_buf(),
        source,
    })?;
    files.sort();
    Ok(files)
}

fn collect_xml_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_xml_files(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

/// Read, classify and extract a single transcript file
pub fn parse_file(path: &Path) -> Result<PlenaryMinutes, ParseError> {
    parse_file_with_schema(path).map(|(_, pm)| pm)
}

fn parse_file_with_schema(path: &Path) -> Result<(SchemaKind, PlenaryMinutes), ParseError> {
    let bytes = std::fs::read(path)?;
    let xml = String::from_utf8(bytes)
        .map_err(|e| ParseError::Xml(format!("input is not valid UTF-8: {e}")))?;
    let root = parse_document(&xml)?;
    let document = FormatDispatcher::new().dispatch(root, path)?;
    Ok((document.schema(), document.extract()?))
}

/// Per-file result, keyed by the file's position in the input list
type FileOutcome = (usize, Result<(SchemaKind, PlenaryMinutes), ParseError>);

pub struct BatchProcessor {
    workers: usize,
    progress_interval: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(1)
    }
}

impl BatchProcessor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            progress_interval: 0,
            cancel: None,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.workers).with_progress_interval(config.progress_interval)
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Stop between files once `flag` is set; the run then fails with `Cancelled`
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Process every file exactly once. Per-file errors are recorded in the
    /// report; the returned records follow the input order.
    pub fn process_files(&self, files: &[PathBuf]) -> Result<BatchReport, BatchError> {
        println!("📄 Parsing {} XML files with {} worker(s)", files.len(), self.workers);

        let outcomes = if self.workers > 1 && files.len() > 1 {
            self.process_parallel(files)?
        } else {
            self.process_chunk(files, 0)
        };

        if outcomes.len() != files.len() {
            return Err(BatchError::Cancelled {
                processed: outcomes.len(),
                total: files.len(),
            });
        }

        let mut report = BatchReport {
            processed: outcomes.len(),
            ..BatchReport::default()
        };
        for (index, outcome) in outcomes {
            match outcome {
                Ok((schema, pm)) => {
                    *report.schema_counts.entry(schema).or_insert(0) += 1;
                    report.records.push(pm);
                }
                Err(e) => {
                    let failure = FileFailure::new(&files[index], &e);
                    eprintln!("⚠️  Skipping {}: {}", failure.file.display(), failure.message);
                    report.failures.push(failure);
                }
            }
        }

        println!(
            "✅ Parsed {} of {} files ({} failed)",
            report.succeeded(),
            report.processed,
            report.failed()
        );
        Ok(report)
    }

    /// Contiguous chunks on scoped threads, reassembled by input position
    fn process_parallel(&self, files: &[PathBuf]) -> Result<Vec<FileOutcome>, BatchError> {
        let chunk_size = files.len().div_ceil(self.workers);

        let chunks = thread::scope(|scope| {
            let handles: Vec<_> = files
                .chunks(chunk_size)
                .enumerate()
                .map(|(i, chunk)| {
                    let offset = i * chunk_size;
                    let handle = scope.spawn(move || self.process_chunk(chunk, offset));
                    (offset..offset + chunk.len(), handle)
                })
                .collect();
            join_workers(handles)
        })?;

        let mut outcomes: Vec<FileOutcome> = chunks.into_iter().flatten().collect();
        outcomes.sort_by_key(|(index, _)| *index);
        Ok(outcomes)
    }

    fn process_chunk(&self, files: &[PathBuf], offset: usize) -> Vec<FileOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());

        for (i, path) in files.iter().enumerate() {
            if self.is_cancelled() {
                break;
            }

            let index = offset + i;
            outcomes.push((index, parse_file_with_schema(path)));

            if self.progress_interval > 0 && (i + 1) % self.progress_interval == 0 {
                println!("🔄 Parsed {} files (at {})", i + 1, path.display());
            }
        }

        outcomes
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Join every worker before reporting, so no panicked thread is left for the
/// scope to re-raise. The first panicked range is returned.
fn join_workers<T>(
    handles: Vec<(Range<usize>, thread::ScopedJoinHandle<'_, T>)>,
) -> Result<Vec<T>, BatchError> {
    let mut results = Vec::with_capacity(handles.len());
    let mut panicked = None;

    for (range, handle) in handles {
        match handle.join() {
            Ok(result) => results.push(result),
            Err(_) => {
                eprintln!("❌ Worker for files {}..{} panicked", range.start, range.end);
                panicked.get_or_insert(range);
            }
        }
    }

    match panicked {
        Some(range) => Err(BatchError::WorkerPanicked {
            start: range.start,
            end: range.end,
        }),
        None => Ok(results),
    }
}

/// Counts of a finished pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub output_path: PathBuf,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub legacy_records: usize,
    pub modern_records: usize,
    pub records_per_period: BTreeMap<u32, usize>,
    pub total_words: usize,
}

const PARSE_STEP: &str = "2. Parsing";
const WRITE_STEP: &str = "3. Table Writing";

/// Full run: discover → parse → write table → write failure report
pub fn run_pipeline(config: &PipelineConfig, enable_profiling: bool) -> Result<PipelineSummary> {
    run_pipeline_with_processor(config, &BatchProcessor::from_config(config), enable_profiling)
}

pub fn run_pipeline_with_processor(
    config: &PipelineConfig,
    processor: &BatchProcessor,
    enable_profiling: bool,
) -> Result<PipelineSummary> {
    config.validate()?;
    let start_time = Instant::now();
    let mut profiler = StepProfiler::new(enable_profiling);

    let files = profiler.time_step("1. Input Discovery", || {
        discover_xml_files(&config.input_dir)
    })?;
    println!(
        "📁 Found {} XML files under {}",
        files.len(),
        config.input_dir.display()
    );

    let report = profiler.time_step(PARSE_STEP, || processor.process_files(&files))?;
    profiler.record_items(PARSE_STEP, report.processed, "files");

    if report.records.is_empty() && config.fail_on_empty {
        return Err(anyhow!(
            "No records extracted from {} files; not writing {}",
            report.processed,
            config.output_path.display()
        ));
    }

    let writer = TableWriter::new(config.delimiter_byte()?);
    let output_path = profiler.time_step(WRITE_STEP, || {
        writer.write(&report.records, &config.output_path)
    })?;
    profiler.record_items(WRITE_STEP, report.succeeded(), "rows");

    if let Some(report_path) = &config.failure_report {
        report.save_failure_report(report_path)?;
        println!("💾 Failure report saved to: {}", report_path.display());
    }

    profiler.print_summary();
    println!(
        "⏱️  Total processing time: {:.3}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(PipelineSummary {
        output_path,
        processed: report.processed,
        succeeded: report.succeeded(),
        failed: report.failed(),
        legacy_records: report.count_for(SchemaKind::Legacy),
        modern_records: report.count_for(SchemaKind::Modern),
        records_per_period: report.count_by_period(),
        total_words: report.total_words(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const LEGACY: &str = "<DOKUMENT><WAHLPERIODE>1</WAHLPERIODE><DOKUMENTART>PLENARPROTOKOLL</DOKUMENTART>\
<NR>1/12</NR><DATUM>7.9.1949</DATUM><TITEL>Sitzung</TITEL><TEXT>a\nb</TEXT></DOKUMENT>";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_profiler_reports_file_rate() {
        let mut profiler = StepProfiler::new(true);
        profiler.time_step(PARSE_STEP, || thread::sleep(Duration::from_millis(20)));

        let rate = profiler.record_items(PARSE_STEP, 10, "files").unwrap();
        assert!(rate > 0.0 && rate <= 500.0, "rate {rate}");
        assert_eq!(profiler.steps[0].items, Some((10, "files")));
        assert!(profiler.record_items("4. Unknown", 1, "files").is_none());
    }

    #[test]
    fn test_disabled_profiler_records_nothing() {
        let mut profiler = StepProfiler::new(false);
        assert_eq!(profiler.time_step(PARSE_STEP, || 7), 7);
        assert!(profiler.record_items(PARSE_STEP, 10, "files").is_none());
        assert!(profiler.steps.is_empty());
    }

    #[test]
    fn test_every_worker_is_joined_before_reporting_a_panic() {
        let result = thread::scope(|scope| {
            let handles = vec![
                (0..2, scope.spawn(|| -> usize { panic!("first chunk") })),
                (2..4, scope.spawn(|| 4)),
                (4..6, scope.spawn(|| -> usize { panic!("last chunk") })),
            ];
            join_workers(handles)
        });
        assert!(matches!(
            result,
            Err(BatchError::WorkerPanicked { start: 0, end: 2 })
        ));

        let joined = thread::scope(|scope| {
            let handles = vec![(0..1, scope.spawn(|| 1)), (1..2, scope.spawn(|| 2))];
            join_workers(handles)
        });
        assert_eq!(joined.unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_discovery_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "19-votingperiod/b.xml", LEGACY);
        write(dir.path(), "01-votingperiod/z.XML", LEGACY);
        write(dir.path(), "01-votingperiod/a.xml", LEGACY);
        write(dir.path(), "01-votingperiod/notes.txt", "x");

        let files = discover_xml_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("01-votingperiod/a.xml"),
                PathBuf::from("01-votingperiod/z.XML"),
                PathBuf::from("19-votingperiod/b.xml"),
            ]
        );
    }

    #[test]
    fn test_discovery_of_missing_dir_fails() {
        let err = discover_xml_files(Path::new("/nonexistent/plenary")).unwrap_err();
        assert!(matches!(err, BatchError::Discovery { .. }));
    }

    #[test]
    fn test_failures_are_recorded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.xml", LEGACY),
            write(dir.path(), "b.xml", "<DOKUMENT><TITEL>"),
            write(dir.path(), "c.xml", "<html/>"),
            dir.path().join("missing.xml"),
            write(dir.path(), "e.xml", LEGACY),
        ];

        let report = BatchProcessor::default().process_files(&files).unwrap();
        assert_eq!(report.processed, 5);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.count_for(SchemaKind::Legacy), 2);
        assert_eq!(report.count_for(SchemaKind::Modern), 0);
        assert_eq!(report.count_by_period().get(&1), Some(&2));

        let kinds: Vec<_> = report.failures.iter().map(|f| (f.file.clone(), f.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (files[1].clone(), FailureKind::MalformedXml),
                (files[2].clone(), FailureKind::UnrecognizedSchema),
                (files[3].clone(), FailureKind::Io),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_malformed_xml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.xml");
        fs::write(&path, b"<DOKUMENT>\xe4</DOKUMENT>").unwrap();
        assert!(matches!(parse_file(&path), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_parallel_run_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<_> = (1..=7)
            .map(|n| {
                let xml = LEGACY.replace("1/12", &format!("1/{n}"));
                write(dir.path(), &format!("{n}.xml"), &xml)
            })
            .collect();

        let report = BatchProcessor::new(3).process_files(&files).unwrap();
        let numbers: Vec<_> = report.records.iter().map(|pm| pm.period_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_cancelled_run_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write(dir.path(), "a.xml", LEGACY)];
        let flag = Arc::new(AtomicBool::new(true));

        let err = BatchProcessor::default()
            .with_cancel_flag(flag)
            .process_files(&files)
            .unwrap_err();
        assert!(matches!(err, BatchError::Cancelled { processed: 0, total: 1 }));
    }

    #[test]
    fn test_failure_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write(dir.path(), "bad.xml", "<unknown/>")];
        let report = BatchProcessor::default().process_files(&files).unwrap();

        let path = dir.path().join("reports/failures.json");
        report.save_failure_report(&path).unwrap();

        let parsed: FailureReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.processed, 1);
        assert_eq!(parsed.failed, 1);
        assert_eq!(parsed.failures[0].kind, FailureKind::UnrecognizedSchema);
        assert!(parsed.failures[0].message.contains("unknown"));
    }
}
