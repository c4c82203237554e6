//! Command-line argument parsing for onair

/// Parsed command line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub once: bool,
    pub validate: bool,
    pub help: bool,
    /// Evaluate as of this RFC 3339 instant instead of now (implies --once)
    pub at: Option<String>,
}

pub fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args)
}

/// Parse from an explicit argv (first element is the program name)
pub fn parse_args_from(args: &[String]) -> Args {
    let mut result = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--once" => result.once = true,
            "--validate" => result.validate = true,
            "--help" | "-h" => result.help = true,
            "--at" => {
                if i + 1 < args.len() {
                    i += 1;
                    result.at = Some(args[i].clone());
                    result.once = true;
                }
            }
            _ => {}
        }
        i += 1;
    }

    result
}

pub fn print_help() {
    println!("onair - radio schedule now/next board\n");
    println!("USAGE:");
    println!("    onair [OPTIONS]\n");
    println!("OPTIONS:");
    println!("    --once                  Print the current board once and exit");
    println!("    --at <RFC3339>          Print the board as of the given instant (implies --once)");
    println!("    --validate              Validate configuration and exit");
    println!("    --help, -h              Show this help message\n");
    println!("ENVIRONMENT:");
    println!("    SCHEDULE_BASE_URL       Base URL of the weekday documents ({{base}}/Monday.json ...)");
    println!("    SCHEDULE_TIMEZONE       Station time zone (default America/New_York)");
    println!("    FETCH_TIMEOUT_SECS      Per-request timeout (default 10)");
    println!("    REFRESH_INTERVAL_SECS   Re-fetch period, 0 to fetch once (default 0)");
}
