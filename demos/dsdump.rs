use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

use dscontainer::Container;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: dsdump /path/to/.DS_Store");
        return ExitCode::FAILURE;
    }

    match run(&args[1]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dsdump: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e: io::Error| e.to_string())?;

    let container = Container::read_with_diagnostics(&bytes, |diagnostic| {
        eprintln!("warning: {diagnostic:?}");
    })
    .map_err(|e| e.to_string())?;

    println!("{} record(s)", container.len());
    for record in container.records() {
        println!("{}\t{}\t{:?}", record.filename, record.type_code, record.value);
    }

    Ok(())
}
