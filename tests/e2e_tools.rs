mod support;

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use support::{describe, run_gateway_replay};

const V0_CID: &str = "QmdfTbBqBPQ7VNxZEYEj14VmRuZBkqFbiwReogJgS1zR1n";
const V1_CID: &str = "bafkreidchi5c4c3kwr5rpkvvwnjz3lh44xi2y2lnbldehwmpplgynigidm";

fn data_lines(path: &Path) -> Result<Vec<String>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("read {} failed: {}", path.display(), err))?;
    let mut lines = contents.lines();
    if lines.next() != Some("ts,cid,path") {
        return Err(format!("{} has no header", path.display()));
    }
    Ok(lines
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect())
}

#[test]
fn e2e_split_distributes_every_record() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let input = dir.path().join("records.csv");
    let rows: String = (0..60)
        .map(|second| format!("2022-03-01T10:00:{:02}Z,{}\n", second, V1_CID))
        .collect();
    fs::write(&input, format!("ts,cid\n{}", rows))
        .map_err(|err| format!("write input failed: {}", err))?;
    let out_dir = dir.path().join("parts");

    let output = run_gateway_replay([
        "split".to_owned(),
        input.to_string_lossy().into_owned(),
        "4".to_owned(),
        "--out-dir".to_owned(),
        out_dir.to_string_lossy().into_owned(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }

    let mut total = 0_usize;
    for index in 0..4 {
        let lines = data_lines(&out_dir.join(format!("{}.csv", index)))?;
        total = total.saturating_add(lines.len());
    }
    if total != 60 {
        return Err(format!("expected 60 records across files, found {}", total));
    }
    if out_dir.join("4.csv").exists() {
        return Err("split wrote more files than requested".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_split_rejects_zero_count() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let input = dir.path().join("records.csv");
    fs::write(&input, "ts,cid\n").map_err(|err| format!("write input failed: {}", err))?;

    let output = run_gateway_replay([
        "split".to_owned(),
        input.to_string_lossy().into_owned(),
        "0".to_owned(),
    ])?;
    if output.status.success() {
        return Err(format!("expected failure\n{}", describe(&output)));
    }
    Ok(())
}

#[test]
fn e2e_transform_extracts_records() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let input = dir.path().join("access.log");
    let log = format!(
        "203.0.113.9 - - [2022-03-01T10:00:00+00:00] \"GET /ipfs/{v0}/index.html HTTP/1.1\" 200 1024\n\
         203.0.113.9 - - [2022-03-01T10:00:01+00:00] \"GET /favicon.ico HTTP/1.1\" 404 0\n\
         203.0.113.9 - - [2022-03-01T10:00:02+00:00] {v1}.ipfs.dweb.link/img.png 200 10\n",
        v0 = V0_CID,
        v1 = V1_CID
    );
    fs::write(&input, log).map_err(|err| format!("write input failed: {}", err))?;
    let out_dir = dir.path().join("out");

    let output = run_gateway_replay([
        "transform".to_owned(),
        input.to_string_lossy().into_owned(),
        "--out-dir".to_owned(),
        out_dir.to_string_lossy().into_owned(),
    ])?;
    if !output.status.success() {
        return Err(describe(&output));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Wrote 2 records") || !stdout.contains("(1 lines skipped)") {
        return Err(describe(&output));
    }

    let produced: Vec<_> = fs::read_dir(&out_dir)
        .map_err(|err| format!("read out dir failed: {}", err))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    let [csv] = produced.as_slice() else {
        return Err(format!("expected one csv, found {:?}", produced));
    };
    let lines = data_lines(csv)?;
    let [first, second] = lines.as_slice() else {
        return Err(format!("expected two records, found {:?}", lines));
    };
    if !first.starts_with("2022-03-01T10:00:00.000Z,bafybei") || !first.ends_with(",/index.html")
    {
        return Err(format!("unexpected first record {}", first));
    }
    if *second != format!("2022-03-01T10:00:02.000Z,{},/img.png", V1_CID) {
        return Err(format!("unexpected second record {}", second));
    }
    Ok(())
}
