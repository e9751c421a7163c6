use brconf::cli;

fn main() {
    env_logger::init();

    let progname = std::env::args()
        .next()
        .as_deref()
        .map(|p| {
            std::path::Path::new(p)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.to_string())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());

    if let Err(err) = run() {
        eprintln!("{progname}: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), cli::CliError> {
    let args = cli::parse(std::env::args())?;
    cli::run(args)
}
