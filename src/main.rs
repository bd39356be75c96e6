use std::process;

fn main() {
    // a missing .env is fine; flags and the real environment still apply
    dotenvy::dotenv().ok();

    if let Err(e) = cat2meraki::cli::run_with_args(std::env::args_os()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
