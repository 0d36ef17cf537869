#![allow(dead_code)]

use adjutant::{AppInfo, BoxError, Context, Output, SharedBuffer};

pub fn test_info() -> AppInfo {
    AppInfo {
        name: "test".into(),
        summary: "A test".into(),
        usage: "testing".into(),
        version: "vTest".into(),
    }
}

pub fn platform() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

pub fn version_out() -> String {
    format!("test vTest ({})\n", platform())
}

pub fn noop(_: &Context, _: &[String]) -> Result<(), BoxError> {
    Ok(())
}

/// Captured standard and error output of one app.
#[derive(Clone, Default)]
pub struct Captured {
    pub out: SharedBuffer,
    pub err: SharedBuffer,
}

impl Captured {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn out_sink(&self) -> Output {
        self.out.clone().into()
    }

    pub fn err_sink(&self) -> Output {
        self.err.clone().into()
    }

    pub fn out(&self) -> String {
        self.out.contents()
    }

    pub fn err(&self) -> String {
        self.err.contents()
    }
}
