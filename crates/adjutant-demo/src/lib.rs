#![deny(clippy::all)]

//! Example apps built on `adjutant`: `now` (multi-command) and `sayhello`
//! (single command).

pub mod clock;
pub mod telemetry;

/// `<greeting> <names joined by ", ">!`
pub fn greet(greeting: &str, names: &[String]) -> String {
    format!("{} {}!", greeting, names.join(", "))
}
