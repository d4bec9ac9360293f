fn main() {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before settings are read from the environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    if let Err(error) = formplane::cli::run_cli() {
        eprintln!("Error: {:#}", error);
        std::process::exit(1);
    }
}
