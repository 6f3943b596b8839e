use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn end_to_end_remittance_flow() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, account, arg1, arg2, arg3, amount").unwrap();
    writeln!(file, "deposit, alice, , , , 100.50").unwrap();
    writeln!(file, "register_alias, bob, mama, , ,").unwrap();
    writeln!(file, "register_point, carlos, Farmacia Sol, CDMX, 200,").unwrap();
    writeln!(file, "create, alice, mama, CODE01, , 100.50").unwrap();
    writeln!(file, "claim, carlos, CODE01, , ,").unwrap();

    let mut cmd = Command::new(cargo_bin!("tlalix-engine"));
    cmd.arg(file.path());

    // 100.50 USD at 1.5% and 17.50: net 98.992500 USD, payout 1732.36 MXN.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "alice,,0.000000,100.500000,0.00,1,false",
        ))
        .stdout(predicate::str::contains(
            "bob,mama,0.000000,0.000000,1732.36,0,false",
        ));
}

#[test]
fn rejected_operations_do_not_abort_the_run() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, account, arg1, arg2, arg3, amount").unwrap();
    writeln!(file, "deposit, alice, , , , 10.00").unwrap();
    // Unknown alias: rejected, run continues.
    writeln!(file, "create, alice, nobody, CODE01, , 5.00").unwrap();
    writeln!(file, "create, alice, addr:bob, CODE02, , 5.00").unwrap();

    let mut cmd = Command::new(cargo_bin!("tlalix-engine"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "alice,,5.000000,5.000000,0.00,1,false",
        ));
}

#[test]
fn custom_rate_and_fee_flags() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, account, arg1, arg2, arg3, amount").unwrap();
    writeln!(file, "deposit, alice, , , , 100.00").unwrap();
    writeln!(file, "create, alice, addr:bob, CODE01, , 100.00").unwrap();
    writeln!(file, "claim, bob, CODE01, , ,").unwrap();

    let mut cmd = Command::new(cargo_bin!("tlalix-engine"));
    // 18.00 MXN/USD, 1% fee: net 99 USD, payout 1782.00 MXN.
    cmd.arg(file.path()).arg("--rate=1800").arg("--fee-bps=100");

    cmd.assert().success().stdout(predicate::str::contains(
        "bob,,99.000000,0.000000,1782.00,0,false",
    ));
}
