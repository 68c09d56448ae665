//! End-to-end conversions through the public API with the built-in engine.

use std::fs;

use camconv::api::logs::{JobLog, LOG_BROADCASTER};
use camconv::{
    convert_bytes, convert_file, parse_str, validate_upload, ConversionContext, ConvertOptions,
    CoordType, CsrsEngine, Epoch, FrameSelection, GridStore, PipelineError, ReferenceFrame,
    SchemaError, TransformationParameters, TransformationService, VerticalDatum,
};
use tokio_stream::StreamExt;
use uuid::Uuid;

const HEADER: &str = "Timestamp,Filename,Origin (Latitude[deg],Longitude[deg],Altitude[m]),Roll(X)[deg],Pitch(Y)[deg],Yaw(Z)[deg],Omega[deg],Phi[deg],Kappa[deg]";

fn side(frame: ReferenceFrame, coords: CoordType, epoch: f64) -> FrameSelection {
    FrameSelection::new(frame, coords, VerticalDatum::Grs80, Epoch::new(epoch).unwrap())
}

fn cam01_params() -> TransformationParameters {
    TransformationParameters::new(
        side(ReferenceFrame::Nad83Csrs, CoordType::Geographic, 2010.0),
        side(ReferenceFrame::Itrf14, CoordType::Geographic, 2023.0),
    )
}

fn context(params: TransformationParameters) -> ConversionContext {
    ConversionContext::new(Some("events.csv".to_string()), ConvertOptions::default(), Some(params))
}

#[test]
fn cam01_produces_exactly_one_row() {
    let csv = format!("{HEADER}\n2023-06-01 12:00:00,CAM01,45.0,-75.0,100.0,0.5,-0.2,181.3,0.4,-0.1,1.2\n");
    let engine = CsrsEngine::without_geoids();
    let result = convert_bytes(csv.as_bytes(), &context(cam01_params()), &engine).unwrap();

    assert_eq!(result.table.row_count(), 1);
    let row = &result.table.rows[0];
    assert_eq!(row[1], "CAM01");

    let lat: f64 = row[2].parse().unwrap();
    let lon: f64 = row[3].parse().unwrap();
    let alt: f64 = row[4].parse().unwrap();
    // NAD83(CSRS) to ITRF2014 moves a point near Ottawa by about a metre or two
    assert!((lat - 45.0).abs() > 1e-7 && (lat - 45.0).abs() < 1e-4);
    assert!((lon + 75.0).abs() > 1e-7 && (lon + 75.0).abs() < 1e-4);
    assert!((alt - 100.0).abs() < 3.0);

    // attitude columns untouched
    assert_eq!(&row[5..], &["0.5", "-0.2", "181.3", "0.4", "-0.1", "1.2"]);

    // the 2010 -> 2023 epoch change is flagged as plate motion only
    let details = result.inspection.as_ref().unwrap().summary_lines();
    assert!(details.iter().any(|l| l.starts_with("Note:") && l.contains("NAD83v70VG")));
}

#[test]
fn identity_transform_keeps_coordinates() {
    let params = TransformationParameters::new(
        side(ReferenceFrame::Itrf14, CoordType::Geographic, 2020.0),
        side(ReferenceFrame::Itrf14, CoordType::Geographic, 2020.0),
    );
    assert!(params.is_identity());

    let csv = format!(
        "{HEADER}\n2023,a.iiq,52.5125,-123.258333,100.0,0,0,0,0,0,0\n2023,b.iiq,52.6,-123.3,120.5,0,0,0,0,0,0\n"
    );
    let table = parse_str(&csv, ',').unwrap();
    let validated = validate_upload(table).unwrap();

    let mut service = TransformationService::new(CsrsEngine::without_geoids());
    let out = service.transform(&validated, &params).unwrap();

    assert_eq!(out.rows[0][2], "52.512500000");
    assert_eq!(out.rows[0][3], "-123.258333000");
    assert_eq!(out.rows[0][4], "100.0000");
    assert_eq!(out.rows[1][4], "120.5000");
    assert_eq!(service.inspect().unwrap().point_count, 2);
}

#[test]
fn rows_keep_order_through_utm() {
    let params = TransformationParameters::new(
        side(ReferenceFrame::Itrf14, CoordType::Geographic, 2023.5),
        side(
            ReferenceFrame::Nad83Csrs,
            CoordType::from_selection("Projected", Some(10)).unwrap(),
            2002.0,
        ),
    );
    let rows: Vec<String> = (0..20)
        .map(|i| format!("2023,img{i:02}.iiq,{},{},150.0,0,0,0,0,0,{i}", 49.0 + i as f64 * 0.01, -123.0))
        .collect();
    let csv = format!("{HEADER}\n{}\n", rows.join("\n"));

    let engine = CsrsEngine::without_geoids();
    let result = convert_bytes(csv.as_bytes(), &context(params), &engine).unwrap();

    assert_eq!(result.table.headers[2], "Easting[m]");
    assert_eq!(result.table.row_count(), 20);
    let northings: Vec<f64> = result.table.rows.iter().map(|r| r[3].parse().unwrap()).collect();
    assert!(northings.windows(2).all(|w| w[1] > w[0]));
    for (i, row) in result.table.rows.iter().enumerate() {
        assert_eq!(row[1], format!("img{i:02}.iiq"));
        assert_eq!(row[10], i.to_string());
    }
}

#[test]
fn header_only_upload_is_empty_input() {
    let csv = format!("{HEADER}\n");
    let engine = CsrsEngine::without_geoids();
    let err = convert_bytes(csv.as_bytes(), &context(cam01_params()), &engine).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(SchemaError::EmptyInput)));
}

#[test]
fn orthometric_target_without_grid_fails_whole_batch() {
    let mut target = side(ReferenceFrame::Nad83Csrs, CoordType::Geographic, 2010.0);
    target.vertical_datum = VerticalDatum::Cgg2013a;
    let params = TransformationParameters::new(
        side(ReferenceFrame::Nad83Csrs, CoordType::Geographic, 2010.0),
        target,
    );

    let dir = tempfile::tempdir().unwrap();
    let engine = CsrsEngine::new(GridStore::with_dir(dir.path()).load_models().unwrap());

    let csv = format!("{HEADER}\n2023,a.iiq,45.0,-75.0,100.0,0,0,0,0,0,0\n");
    let err = convert_bytes(csv.as_bytes(), &context(params), &engine).unwrap_err();
    assert_eq!(err.kind(), "transformation");
}

#[test]
fn semicolon_file_keeps_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vol_été.csv");

    let header = HEADER.replace(',', ";") + ";Remarque";
    let row = "2023;a.iiq;45.0;-75.0;100.0;0;0;0;0;0;0;prise de vue près du lac";
    fs::write(&path, format!("{header}\n{row}\n")).unwrap();

    let engine = CsrsEngine::without_geoids();
    let result = convert_file(&path, &context(cam01_params()), &engine).unwrap();

    assert_eq!(result.csv_info.delimiter, ';');
    assert_eq!(result.table.rows[0][11], "prise de vue près du lac");
    assert_eq!(result.file_name, "events_converted.csv");
    assert!(result.csv.contains("prise de vue près du lac"));
}

#[tokio::test]
async fn job_logs_stay_with_their_job() {
    let mine = Uuid::new_v4();
    let mut stream = Box::pin(LOG_BROADCASTER.job_stream(mine));

    let other = ConversionContext::new(
        Some("secret_site_survey.csv".to_string()),
        ConvertOptions::default(),
        Some(cam01_params()),
    );
    assert_ne!(other.job_id, mine);
    let csv = format!("{HEADER}\n2023,a.iiq,45.0,-75.0,100.0,0,0,0,0,0,0\n");
    convert_bytes(csv.as_bytes(), &other, CsrsEngine::without_geoids()).unwrap();

    JobLog::new(mine).info("Waiting for upload");
    let first = stream.next().await.unwrap();
    assert_eq!(first.message, "Waiting for upload");
    assert_eq!(first.job, Some(mine.to_string()));
}
