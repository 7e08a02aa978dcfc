use std::process::ExitCode;

fn main() -> ExitCode {
    match mlc_drv::run_cli() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
