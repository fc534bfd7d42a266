use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match indentc_drv::Config::parse(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = indentc_drv::run(&config) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
