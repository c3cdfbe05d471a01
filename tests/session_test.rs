use datasweep::{
    ChartOutput, Command, CommandOutcome, Error, FileFormat, Session, SessionConfig, UploadedFile,
};

mod common;

#[test]
fn full_workflow() {
    let mut session = Session::new();

    // 1. upload
    let reports = session.upload(&[common::messy_upload("people.csv")]);
    assert!(reports[0].is_ok());
    assert_eq!(reports[0].size_bytes, common::messy_csv_bytes().len() as u64);
    assert_eq!(session.table("people.csv").unwrap().height(), 4);

    // 2. clean: duplicates first, then fill
    session
        .dispatch(Command::RemoveDuplicates("people.csv".to_string()))
        .unwrap();
    assert_eq!(session.table("people.csv").unwrap().height(), 3);

    session
        .dispatch(Command::FillMissing("people.csv".to_string()))
        .unwrap();
    let table = session.table("people.csv").unwrap();
    assert_eq!(table.column("age").unwrap().null_count(), 0);
    // the duplicate was removed before the fill, so the mean is over 30 and 40
    assert_eq!(table.column("age").unwrap().f64().unwrap().get(1), Some(35.0));
    assert_eq!(
        table.column("score").unwrap().f64().unwrap().get(2),
        Some(85.0)
    );

    // 3. preview reads the cleaned state
    let preview = session.preview("people.csv").unwrap();
    assert_eq!(preview.total_rows, 3);
    assert_eq!(preview.columns, vec!["name", "age", "score"]);

    // 4. chart selection and render, also against the cleaned state
    let numeric = session.numeric_columns("people.csv").unwrap();
    assert_eq!(numeric, vec!["age".to_string(), "score".to_string()]);
    match session.render_chart("people.csv", &numeric).unwrap() {
        ChartOutput::Svg(svg) => assert!(svg.contains("<svg")),
        ChartOutput::Warning(w) => panic!("unexpected selection warning: {}", w),
    }

    // 5. convert back out
    let outcome = session
        .dispatch(Command::Convert("people.csv".to_string(), FileFormat::Excel))
        .unwrap();
    let download = match outcome {
        CommandOutcome::Converted(download) => download,
        other => panic!("expected a download, got {:?}", other),
    };
    assert_eq!(download.filename, "people.xlsx");
    assert!(!download.bytes.is_empty());

    // 6. a re-render pass re-uploads the same raw bytes; cleaning survives
    let reports = session.upload(&[common::messy_upload("people.csv")]);
    assert!(reports[0].is_ok());
    assert_eq!(session.table("people.csv").unwrap().height(), 3);
}

#[test]
fn failed_file_does_not_abort_the_batch() {
    let mut session = Session::new();
    let files = vec![
        common::messy_upload("ok.csv"),
        UploadedFile::new("data.txt", b"junk".to_vec()),
        common::xlsx_upload("book.xlsx", &common::sample_df()),
    ];
    let reports = session.upload(&files);
    assert!(reports[0].is_ok());
    assert!(matches!(
        reports[1].result,
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(reports[2].is_ok());
    assert_eq!(reports[2].result.as_ref().unwrap(), &FileFormat::Excel);

    assert!(session.store().contains("ok.csv"));
    assert!(!session.store().contains("data.txt"));
    assert!(session.store().contains("book.xlsx"));
}

#[test]
fn upload_reads_host_file_bytes() {
    // hosts hand over bytes they read from disk; simulate one doing so
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.csv");
    std::fs::write(&path, common::messy_csv_bytes()).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let mut session = Session::new();
    let reports = session.upload(&[UploadedFile::new("people.csv", bytes)]);
    assert!(reports[0].is_ok());
    assert_eq!(session.table("people.csv").unwrap().height(), 4);
}

#[test]
fn preview_cap_comes_from_config() {
    let config = SessionConfig::from_toml_str(
        r#"
        [display]
        preview_rows = 2
        "#,
    )
    .unwrap();
    let mut session = Session::with_config(config);
    session.upload(&[common::messy_upload("people.csv")]);
    let preview = session.preview("people.csv").unwrap();
    assert_eq!(preview.rows.len(), 2);
    assert!(preview.truncated);
}

#[test]
fn excel_upload_parses_like_csv() {
    let mut session = Session::new();
    session.upload(&[common::xlsx_upload("book.xlsx", &common::sample_df())]);
    let table = session.table("book.xlsx").unwrap();
    assert_eq!(table.shape(), (3, 3));
    assert_eq!(
        session.numeric_columns("book.xlsx").unwrap(),
        vec!["id".to_string(), "value".to_string()]
    );
}
