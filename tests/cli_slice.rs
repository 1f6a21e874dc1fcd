use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn command_slice() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    let output = cmd
        .arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("--ranks")
        .arg("2,3,2,3")
        .arg("--gap")
        .arg("3")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    assert!(output.status.success());
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "Hs\t1\t3000\t5999\tMm\t7\t4000\t6999\t2\t1.000E0");

    Ok(())
}

#[test]
fn command_slice_genes() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    let output = cmd
        .arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("-n")
        .arg("2")
        .arg("--ranks")
        .arg("3,3,3,3")
        .arg("--genes")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with(">Hs\t2\t5000\t5999\tMm\t7\t6000\t6999\t1\t"));
    assert_eq!(lines[3], " h3\tHB3\tm3\tMa3");

    Ok(())
}

#[test]
fn command_slice_out_of_range() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    cmd.arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("--ranks")
        .arg("1,5,1,3");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("rank 5 out of range [1, 3]"));

    Ok(())
}

#[test]
fn command_slice_no_segment() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    cmd.arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("-n")
        .arg("3")
        .arg("--ranks")
        .arg("1,1,1,1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No segment 3 among 2 segments"));

    Ok(())
}

#[test]
fn command_slice_ranks_count() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    cmd.arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("--ranks")
        .arg("1,2,3");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("needs 4 values"));

    Ok(())
}

#[test]
fn command_slice_reversed() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("chsm");
    cmd.arg("slice")
        .arg("tests/chsm/genes.tsv")
        .arg("tests/chsm/inter.tsv")
        .arg("--ranks")
        .arg("3,2,2,3");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("reversed rank window 3-2"));

    Ok(())
}
