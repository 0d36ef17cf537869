use std::sync::{Arc, OnceLock};

use adjutant::{
    exit_codes, shared, AppInfo, ClapFlags, CommandInfo, Context, MultiCommandApp, Output,
    RegistrationError,
};
use adjutant_demo::clock::{self, Timezone};
use adjutant_demo::telemetry;
use chrono::Utc;
use tracing::{debug, error};

fn main() {
    let telemetry = telemetry::init_tracing("warn");
    let code = run();
    drop(telemetry);
    std::process::exit(code);
}

fn run() -> i32 {
    match build(Output::stdout(), Output::stderr()) {
        Ok(mut app) => app.run(&Context::background(), Vec::<String>::new()),
        Err(err) => {
            error!(error = %err, "Failed to register commands");
            eprintln!("Error: {}", err);
            exit_codes::ERROR
        }
    }
}

fn build(out: Output, err: Output) -> Result<MultiCommandApp, RegistrationError> {
    let mut globals = ClapFlags::new("now");
    let timezone = globals.string("timezone", "UTC", "the timezone to report in");

    let mut app = MultiCommandApp::new(
        AppInfo {
            name: "now".into(),
            summary: "An example CLI app to report the date and time".into(),
            usage: "<command>... [options]...".into(),
            version: "v1.0.4".into(),
        },
        Some(shared(globals)),
        out.clone(),
        err,
    );

    let zone: Arc<OnceLock<Timezone>> = Arc::new(OnceLock::new());

    let mut time_flags = ClapFlags::new("time");
    let seconds = time_flags.bool("seconds", false, "to include seconds");
    let (time_zone, time_out) = (zone.clone(), out.clone());
    app.set_command(
        CommandInfo {
            name: "time".into(),
            summary: "Show the time".into(),
            usage: "[options]".into(),
        },
        move |_: &Context, _: &[String]| {
            let zone = time_zone.get().copied().unwrap_or_default();
            time_out.print(&format!("{}\n", clock::format_time(Utc::now(), zone, seconds.value())));
            Ok(())
        },
        Some(shared(time_flags)),
    )?;

    let mut date_flags = ClapFlags::new("date");
    let year = date_flags.bool("year", false, "to include year");
    let date_zone = zone.clone();
    app.set_command(
        CommandInfo {
            name: "date".into(),
            summary: "Show the date".into(),
            usage: "[options]".into(),
        },
        move |_: &Context, _: &[String]| {
            let zone = date_zone.get().copied().unwrap_or_default();
            out.print(&format!("{}\n", clock::format_date(Utc::now(), zone, year.value())));
            Ok(())
        },
        Some(shared(date_flags)),
    )?;

    app.on_init(move || {
        let resolved: Timezone = timezone.value().parse()?;
        debug!(zone = %resolved, "Resolved time zone");
        let _ = zone.set(resolved);
        Ok(())
    });

    Ok(app)
}
