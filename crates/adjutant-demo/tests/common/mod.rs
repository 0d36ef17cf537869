#![allow(dead_code)]

use assert_cmd::Command;

pub fn now_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("now"));
    cmd.env_remove("RUST_LOG").env_remove("ADJUTANT_LOG");
    cmd
}

pub fn sayhello_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sayhello"));
    cmd.env_remove("RUST_LOG").env_remove("ADJUTANT_LOG");
    cmd
}

pub fn platform() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}
