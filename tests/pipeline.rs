use cutsheet::writer::{render_connections, SUMMARY_FILE_NAME};
use cutsheet::{extract_connections, process_file, read_table, run_batch, CutsheetError, FileSummary, ReaderOptions};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const HEADER: &str = "DeviceA Name,DeviceA Port,DeviceA Building,DeviceA Rack,DeviceA RU,DeviceA Type,\
DeviceB Name,DeviceB Port,DeviceB Building,DeviceB Rack,DeviceB RU,DeviceB Type";

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

/// Single-sheet workbook with every cell stored as an inline string.
fn xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for row in rows {
        sheet.push_str("<row>");
        for value in *row {
            sheet.push_str(&format!(r#"<c t="inlineStr"><is><t>{value}</t></is></c>"#));
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_owned(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_owned(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn semicolon_file_parses_through_fallback() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "semi.csv",
        b"DeviceA Name;DeviceA Port;DeviceB Name;DeviceB Port\nleaf-01;Eth1;spine-01;Eth49\n",
    );
    let table = read_table(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(table.columns().len(), 4);
    assert_eq!(extract_connections(&table).device_count(), 2);
}

#[test]
fn header_is_kept_when_ports_match_its_length() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "arista.csv",
        b"DeviceA Name,DeviceA Port,DeviceB Name,DeviceB Port\n\
          leaf-100,Ethernet1/50,spine-22,Ethernet1/02\n\
          leaf-1,Ethernet1/49,spine-1,Ethernet1/01\n\
          leaf-100,Ethernet1/51,spine-3,Ethernet1/03\n\
          leaf-22,Ethernet1/52,spine-22,Ethernet1/04\n",
    );
    let table = read_table(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(table.columns(), ["DeviceA Name", "DeviceA Port", "DeviceB Name", "DeviceB Port"]);
    assert_eq!(table.len(), 4);

    let connections = extract_connections(&table);
    assert_eq!(connections.device_count(), 6);
    assert_eq!(connections.peer("spine-22", "Ethernet1/04"), Some("leaf-22:Ethernet1/52"));
}

#[test]
fn headerless_file_gets_positional_columns() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bare.csv", b"sw1,1,sw2,2\nsw3,5,sw4,6\nsw5,7,sw6,8\n");
    let table = read_table(&path, &ReaderOptions::default()).unwrap();
    assert_eq!(table.columns(), ["col0", "col1", "col2", "col3"]);
    assert_eq!(table.len(), 3);
}

#[test]
fn single_file_writes_both_artifacts() {
    let dir = tempdir().unwrap();
    let contents = format!(
        "{HEADER}\n\
         leaf-01,Eth1,DC1,R01,42,switch,spine-01,Eth49,DC1,R02,40,switch\n\
         leaf-01,Eth2,DC1,R01,42,switch,srv-01,eno1,DC1,R01,10,server\n"
    );
    let path = write(&dir, "site-a.csv", contents.as_bytes());
    let output = dir.path().join("out");

    let summary = process_file(&path, &output, &ReaderOptions::default()).unwrap().unwrap();
    assert_eq!(
        summary,
        FileSummary {
            name: "site-a".to_owned(),
            device_count: 3,
            rack_count: 2,
        }
    );
    assert_eq!(
        read(&output.join("site-a_connections.txt")),
        "leaf-01\n  Eth1 -> spine-01:Eth49\n  Eth2 -> srv-01:eno1\n\n\
         spine-01\n  Eth49 -> leaf-01:Eth1\n\n\
         srv-01\n  eno1 -> leaf-01:Eth2\n\n"
    );
    assert_eq!(
        read(&output.join("site-a_rack_topology.txt")),
        "DC1\n  R01\n    RU 42: leaf-01 (switch)\n    RU 10: srv-01 (server)\n  R02\n    RU 40: spine-01 (switch)\n\n"
    );
}

#[test]
fn connection_output_is_stable_and_sorted() {
    let dir = tempdir().unwrap();
    let rows = [
        "zeta,Eth9,alpha,Eth2",
        "beta,Eth1,alpha,Eth10",
        "alpha,Eth1,gamma,Eth3",
    ];
    let forward = format!("DeviceA Name,DeviceA Port,DeviceB Name,DeviceB Port\n{}\n", rows.join("\n"));
    let path = write(&dir, "c.csv", forward.as_bytes());
    let options = ReaderOptions::default();

    let first = render_connections(&extract_connections(&read_table(&path, &options).unwrap()));
    let second = render_connections(&extract_connections(&read_table(&path, &options).unwrap()));
    assert_eq!(first, second);

    let devices: Vec<&str> = first
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(' '))
        .collect();
    assert_eq!(devices, ["alpha", "beta", "gamma", "zeta"]);
    assert!(first.starts_with("alpha\n  Eth1 -> gamma:Eth3\n  Eth10 -> beta:Eth1\n  Eth2 -> zeta:Eth9\n\n"));
}

#[test]
fn workbook_input_matches_csv_input() {
    let dir = tempdir().unwrap();
    let rows: &[&[&str]] = &[
        &["DeviceA Host Name", "DeviceA Port", "DeviceB Name", "DeviceB Port", "DeviceB Building", "DeviceB Rack", "DeviceB RU", "DeviceB Type", "DeviceB RackPlatform"],
        &["fw-01", "ge-0/0/0", "core-01", "Gi1/0/1", "HQ", "A1", "2", "router", "OCP"],
        &["fw-01", "ge-0/0/1", "core-01", "Gi1/0/2", "HQ", "A1", "10", "router", "OCP"],
    ];
    let path = write(&dir, "hq.xlsx", &xlsx(rows));
    let output = dir.path().join("out");

    let summary = process_file(&path, &output, &ReaderOptions::default()).unwrap().unwrap();
    assert_eq!(summary.device_count, 2);
    assert_eq!(summary.rack_count, 1);
    assert_eq!(
        read(&output.join("hq_rack_topology.txt")),
        "HQ\n  A1 (OCP)\n    RU 2: core-01 (router)\n    RU 10: core-01 (router)\n\n"
    );
}

#[test]
fn corrupt_workbook_is_a_parse_failure() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "broken.xlsx", b"not a zip archive");
    assert!(matches!(
        read_table(&path, &ReaderOptions::default()),
        Err(CutsheetError::ParseFailure { .. })
    ));
    assert_eq!(process_file(&path, dir.path(), &ReaderOptions::default()).unwrap(), None);
}

#[test]
fn null_literals_are_treated_as_missing() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "n.csv",
        b"DeviceA Name,DeviceA Port,DeviceB Name,DeviceB Port\nleaf-01,Eth1,N/A,Eth2\nleaf-02,Eth1,spine,Eth2\n",
    );
    let options = ReaderOptions {
        nulls: vec!["N/A".to_owned()],
        ..Default::default()
    };
    let connections = extract_connections(&read_table(&path, &options).unwrap());
    assert_eq!(connections.device_count(), 2);
    assert!(connections.device("N/A").is_none());
}

#[test]
fn batch_skips_unparsable_files() {
    let input = tempdir().unwrap();
    let good = format!("{HEADER}\nleaf-01,Eth1,DC1,R01,42,switch,spine-01,Eth49,DC1,R02,40,switch\n");
    write(&input, "good.csv", good.as_bytes());
    write(&input, "bad.csv", b"");
    write(&input, "ignored.txt", b"a,b\n");
    let output = input.path().join("output_combined");

    let summaries = run_batch(input.path(), &output, &ReaderOptions::default()).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "good");
    assert_eq!(
        read(&output.join(SUMMARY_FILE_NAME)),
        "Cutsheet Processing Summary:\n\nCutsheet: good\n  - Devices: 2\n  - Racks: 2\n\n"
    );
    assert!(output.join("good_connections.txt").exists());
    assert!(!output.join("bad_connections.txt").exists());
}

#[test]
fn empty_batch_still_writes_summary() {
    let input = tempdir().unwrap();
    let output = input.path().join("out");
    let summaries = run_batch(input.path(), &output, &ReaderOptions::default()).unwrap();
    assert!(summaries.is_empty());
    assert_eq!(read(&output.join(SUMMARY_FILE_NAME)), "Cutsheet Processing Summary:\n\n");
}

#[test]
fn batch_fails_when_output_cannot_be_created() {
    let input = tempdir().unwrap();
    let blocker = write(&input, "blocker", b"");
    assert!(run_batch(input.path(), &blocker.join("out"), &ReaderOptions::default()).is_err());
}
