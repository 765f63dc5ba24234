use std::process;

fn main() {
    if let Err(e) = tasknest::cli::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
