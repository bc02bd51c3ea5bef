// End-to-end: write a small manifest .xlsx, load it, select routes, render reports
use manifest_reader::{
    render_report, select, ManifestError, ProviderSelector, ProviderTable, ReportMode,
    ReportOptions, RouteCatalog, SheetLayout,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

const SBS: &str = "8b6c9223-3e5f-421b-bd34-ca3926bd0cd3-PREFERRED";

/// Stop row: (trid, time window or "" for none, address)
type StopRow<'a> = (&'a str, &'a str, &'a str);

struct RouteSheet<'a> {
    sheet: &'a str,
    route: &'a str,
    service: &'a str,
    dsp: &'a str,
    stops: &'a [StopRow<'a>],
    /// Write missing windows as empty text cells instead of leaving them out
    blank_windows: bool,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn inline_cell(reference: &str, text: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        reference,
        escape(text)
    )
}

/// Worksheet XML. The header lead cell (A1) is a shared string at `lead_index`.
fn worksheet_xml(route: &RouteSheet<'_>, lead_index: usize) -> String {
    let tail = format!("  Service type: {}   Preferred DSP: {}", route.service, route.dsp);
    let mut rows = String::new();
    rows.push_str(&format!(
        r#"<row r="1"><c r="A1" t="s"><v>{}</v></c>{}</row>"#,
        lead_index,
        inline_cell("E1", &tail)
    ));
    rows.push_str(&format!(
        r#"<row r="3">{}{}{}</row>"#,
        inline_cell("B3", "TRID"),
        inline_cell("E3", "Time Window"),
        inline_cell("F3", "Address")
    ));
    for (i, (trid, window, address)) in route.stops.iter().enumerate() {
        let r = 4 + i;
        let mut row = format!(r#"<row r="{}"><c r="A{}"><v>{}</v></c>"#, r, r, i + 1);
        row.push_str(&inline_cell(&format!("B{}", r), trid));
        if !window.is_empty() || route.blank_windows {
            row.push_str(&inline_cell(&format!("E{}", r), window));
        }
        row.push_str(&inline_cell(&format!("F{}", r), address));
        row.push_str("</row>");
        rows.push_str(&row);
    }
    let footer = 4 + route.stops.len();
    rows.push_str(&format!(
        r#"<row r="{}">{}</row>"#,
        footer,
        inline_cell(&format!("A{}", footer), "End of manifest")
    ));

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        rows
    )
}

fn lead_text(route: &str) -> String {
    format!(
        "Route for {}   Driving distance: 48.20 km Route plan: 3 hours 10 minutes Route time: 4 hours 0 minutes   Total capacity: 320.50 cu ft",
        route
    )
}

fn write_workbook(dir: &Path, routes: &[RouteSheet<'_>]) -> PathBuf {
    let path = dir.join("manifest.xlsx");
    let file = File::create(&path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let sheets: String = routes
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(r.sheet),
                i + 1,
                i + 1
            )
        })
        .collect();
    writer.start_file("xl/workbook.xml", options).unwrap();
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        sheets
    )
    .unwrap();

    let rels: String = routes
        .iter()
        .enumerate()
        .map(|(i, _)| {
            format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            )
        })
        .collect();
    writer.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
    .unwrap();

    let shared: String = routes
        .iter()
        .map(|r| format!(r#"<si><t xml:space="preserve">{}</t></si>"#, escape(&lead_text(r.route))))
        .collect();
    writer.start_file("xl/sharedStrings.xml", options).unwrap();
    write!(
        writer,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</sst>"#,
        shared
    )
    .unwrap();

    for (i, route) in routes.iter().enumerate() {
        writer.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        writer.write_all(worksheet_xml(route, i).as_bytes()).unwrap();
    }

    writer.finish().unwrap();
    path
}

fn sample_routes() -> Vec<RouteSheet<'static>> {
    vec![
        RouteSheet {
            sheet: "Route 1",
            route: "CA101",
            service: "Standard Parcel",
            dsp: SBS,
            stops: &[
                ("TBA0001", "10:00 - 12:00", "1-2-3 Shibuya, Tokyo"),
                ("TBA0002", "", "4 Elm St & 5th"),
                ("TBA0003", "", "東京都新宿区 1-1"),
            ],
            blank_windows: false,
        },
        RouteSheet {
            sheet: "Route 2",
            route: "CA102",
            service: "Standard Parcel - Large Van",
            dsp: "",
            stops: &[("TBA0004", "", "9 Oak Ave")],
            blank_windows: false,
        },
        RouteSheet {
            sheet: "Route 3",
            route: "CA103",
            service: "Standard Parcel",
            dsp: SBS,
            stops: &[("TBA0005", "14:00 - 16:00", "2 Pine Rd")],
            blank_windows: false,
        },
    ]
}

fn load(routes: &[RouteSheet<'_>]) -> (tempfile::TempDir, RouteCatalog) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), routes);
    let catalog = RouteCatalog::load_path(&path, &SheetLayout::new()).unwrap();
    (dir, catalog)
}

#[test]
fn test_load_manifest_workbook() {
    let (_dir, catalog) = load(&sample_routes());

    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["CA101", "CA102", "CA103"]);

    let info = catalog.info("CA101").unwrap();
    assert_eq!(info.distance, 48.2);
    assert_eq!(info.capacity, 320.5);
    assert_eq!(info.plantime, "3 hours 10 minutes");
    assert_eq!(info.routetime, "4 hours 0 minutes");
    assert_eq!(info.servicetype, "Standard Parcel");
    assert_eq!(info.dspcode, SBS);
    assert_eq!(info.count, 3);

    assert_eq!(catalog.info("CA102").unwrap().dspcode, "");

    let stops = catalog.stops("CA101").unwrap();
    assert_eq!(stops[0].time_window, "10:00 - 12:00");
    assert_eq!(stops[1].time_window, "nan");
    assert_eq!(stops[1].address, "4 Elm St & 5th");
    assert_eq!(stops[2].address, "東京都新宿区 1-1");
}

#[test]
fn test_info_report_for_all_routes() {
    let (_dir, catalog) = load(&sample_routes());
    let groups: &[&str] = &[];
    let selection = select(&catalog, &ProviderTable::new(), &ProviderSelector::All, groups).unwrap();

    let out = render_report(&catalog, ReportMode::Info, &selection.targets, ReportOptions::new()).unwrap();
    assert_eq!(out, "Route, ItemCount\nCA101,3\nCA102,1\nCA103,1\n");
}

#[test]
fn test_provider_selection_with_exclusion() {
    let (_dir, catalog) = load(&sample_routes());
    let selection = select(
        &catalog,
        &ProviderTable::new(),
        &ProviderSelector::Named("sbs".into()),
        &["CA103,ZZ999"],
    )
    .unwrap();
    assert_eq!(selection.targets, vec!["CA101"]);
    assert_eq!(selection.unresolved, vec!["ZZ999"]);

    let out = render_report(
        &catalog,
        ReportMode::MoreInfo,
        &selection.targets,
        ReportOptions::new(),
    )
    .unwrap();
    assert_eq!(
        out,
        "Route, ItemCount, ServiceType, PlanTime, RouteTime\nCA101,3,Standard Parcel,3 hours 10 minutes,4 hours 0 minutes\n"
    );
}

#[test]
fn test_dump_and_schedule_reports() {
    let (_dir, catalog) = load(&sample_routes());
    let targets = vec!["CA101".to_string()];

    let dump = render_report(
        &catalog,
        ReportMode::Dump,
        &targets,
        ReportOptions::new().with_time_window(true),
    )
    .unwrap();
    assert_eq!(
        dump,
        "[CA101]: ItemCount:3 ServiceType:Standard Parcel\nTBA0001,10:00 - 12:00\nTBA0002,nan\nTBA0003,nan\n\n"
    );

    let schedule = render_report(
        &catalog,
        ReportMode::DumpSchedule,
        &targets,
        ReportOptions::new().with_headers(false).with_address(true),
    )
    .unwrap();
    assert_eq!(schedule, "TBA0001,10:00 - 12:00,\"1-2-3 Shibuya, Tokyo\"\n");
}

#[test]
fn test_schedule_skips_empty_text_windows() {
    let mut routes = sample_routes();
    routes[0].blank_windows = true;
    let (_dir, catalog) = load(&routes[..1]);

    let stops = catalog.stops("CA101").unwrap();
    assert_eq!(stops[1].time_window, "nan");
    assert!(!stops[1].has_time_window());

    let targets = vec!["CA101".to_string()];
    let schedule = render_report(&catalog, ReportMode::DumpSchedule, &targets, ReportOptions::new()).unwrap();
    assert_eq!(
        schedule,
        "[CA101]: ItemCount:3 ServiceType:Standard Parcel\nTBA0001,10:00 - 12:00\n\n"
    );
}

#[test]
fn test_duplicate_route_across_sheets() {
    let mut routes = sample_routes();
    routes[2].route = "CA101";

    let dir = tempfile::tempdir().unwrap();
    let path = write_workbook(dir.path(), &routes);
    let result = RouteCatalog::load_path(&path, &SheetLayout::new());
    assert!(matches!(
        result,
        Err(ManifestError::DuplicateRoute { ref name, ref sheet }) if name == "CA101" && sheet == "Route 3"
    ));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = RouteCatalog::load_path(&dir.path().join("missing.xlsx"), &SheetLayout::new());
    assert!(matches!(result, Err(ManifestError::InputNotFound(_))));
}

#[test]
fn test_not_a_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.xlsx");
    std::fs::write(&path, "just text").unwrap();
    assert!(RouteCatalog::load_path(&path, &SheetLayout::new()).is_err());
}
