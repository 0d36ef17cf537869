use adjutant::{shared, AppInfo, ClapFlags, Context, ErrorSignalExt, Output, SingleCommandApp};
use adjutant_demo::{greet, telemetry};

fn main() {
    let telemetry = telemetry::init_tracing("warn");
    let code = run();
    drop(telemetry);
    std::process::exit(code);
}

fn run() -> i32 {
    let mut flags = ClapFlags::new("sayhello");
    let greeting = flags.string("greeting", "Hello", "the greeting to use");

    let out = Output::stdout();
    let printer = out.clone();
    let mut app = SingleCommandApp::new(
        AppInfo {
            name: "sayhello".into(),
            summary: "An example CLI app to say hello to the given names".into(),
            usage: "[option]... [names]...".into(),
            version: "v0.1-alpha".into(),
        },
        move |_: &Context, names: &[String]| {
            if names.is_empty() {
                return Err("at least one name is required".with_help_requested().into());
            }
            printer.print(&format!("{}\n", greet(&greeting.value(), names)));
            Ok(())
        },
        Some(shared(flags)),
        out,
        Output::stderr(),
    );

    app.run(&Context::background(), Vec::<String>::new())
}
