fn main() {
    if let Err(error) = vesseltrack_lib::run() {
        eprintln!("vesseltrack: {error}");
        if let Some(suggestion) = error.suggestion {
            eprintln!("hint: {suggestion}");
        }
        std::process::exit(1);
    }
}
