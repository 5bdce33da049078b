use chrono::Local;
use readbench::observability::RunLog;
use readbench::sink::read_report;
use readbench::{run_benchmark, AdapterRegistry, BenchConfig, BenchError, BenchResult};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn count_lines(path: &Path) -> BenchResult<u64> {
    Ok(fs::read_to_string(path)?.lines().skip(1).count() as u64)
}

#[test]
fn test_failing_file_is_absorbed_and_reported() -> BenchResult<()> {
    let dir = tempdir()?;
    let input = dir.path().join("csv_files");
    fs::create_dir(&input)?;
    fs::write(input.join("1.csv"), "a\n1\n2\n")?;
    fs::write(input.join("2.csv"), "a\n\"unterminated\n")?;
    fs::write(input.join("3.csv"), "a\n1\n2\n3\n4\n")?;

    let config = BenchConfig {
        input_dir: input,
        output: dir.path().join("performance_results.csv"),
        log_dir: dir.path().join("logs"),
        ..Default::default()
    };

    let mut registry = AdapterRegistry::new();
    registry.register("strict", |path| {
        if path.ends_with("2.csv") {
            return Err(BenchError::Unknown(anyhow::anyhow!("unterminated quote")));
        }
        count_lines(path)
    });
    registry.register("lenient", count_lines);

    let log = RunLog::open(&config.log_dir, Local::now(), None)?;
    let report = run_benchmark(&config, &registry, &log, false)?;
    let log_path = log.path().to_path_buf();
    log.close()?;

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.files_processed, 3);
    let strict = report.entries.iter().find(|e| e.library == "strict").unwrap();
    assert_eq!(strict.rows_read, 2 + 4);
    assert_eq!(strict.failed_files, 1);
    let lenient = report.entries.iter().find(|e| e.library == "lenient").unwrap();
    assert_eq!(lenient.rows_read, 2 + 1 + 4);
    assert!(report
        .entries
        .windows(2)
        .all(|w| w[0].duration_seconds <= w[1].duration_seconds));

    let rows = read_report(&config.output)?;
    assert_eq!(rows.len(), report.entries.len());
    for (row, entry) in rows.iter().zip(&report.entries) {
        assert_eq!(row.library, entry.library);
        assert_eq!(row.rows_read, entry.rows_read);
        assert_eq!(row.files_processed, 3);
        assert!((row.duration_seconds - entry.duration_seconds).abs() < 1e-9);
    }

    let log_text = fs::read_to_string(log_path)?;
    assert!(log_text.contains("strict failed to read 2.csv: unterminated quote"));
    assert!(log_text.contains("Starting processing of 3 files"));
    assert!(log_text.contains("Results saved to"));
    Ok(())
}

#[test]
fn test_missing_directory_writes_no_table() -> BenchResult<()> {
    let dir = tempdir()?;
    let config = BenchConfig {
        input_dir: dir.path().join("nope"),
        output: dir.path().join("performance_results.csv"),
        log_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let log = RunLog::open(&config.log_dir, Local::now(), None)?;

    let err = run_benchmark(&config, &AdapterRegistry::new(), &log, false).unwrap_err();
    assert!(matches!(err, BenchError::DirectoryNotFound(_)));
    assert!(!config.output.exists());
    Ok(())
}

#[test]
fn test_stock_adapters_end_to_end() -> BenchResult<()> {
    let dir = tempdir()?;
    let input = dir.path().join("csv_files");
    fs::create_dir(&input)?;
    fs::write(input.join("a.csv"), "id,name\n1,x\n2,y\n")?;
    fs::write(input.join("b.csv"), "id,score\n1,0.5\n")?;

    let config = BenchConfig {
        input_dir: input,
        output: dir.path().join("out.csv"),
        log_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let report = readbench::execute_benchmark(
        &config,
        uuid::Uuid::new_v4(),
        readbench::RunOptions::default(),
    )?;

    assert_eq!(report.entries.len(), 3);
    assert!(report.entries.iter().all(|e| e.rows_read == 3));
    assert_eq!(read_report(&config.output)?.len(), 3);
    Ok(())
}
