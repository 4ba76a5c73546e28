use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "codepad", about = "Send code to a remote execution service", version)]
pub struct Cli {
    /// Source code to execute. Omit to read stdin, --file, or open the editor.
    #[arg(value_name = "CODE", conflicts_with = "file")]
    pub code: Option<String>,

    /// Load code from a plain-text file.
    #[arg(short = 'f', long)]
    pub file: Option<String>,

    /// Use the debug/compile action instead of a plain run.
    #[arg(short = 'd', long, visible_alias = "compile")]
    pub debug: bool,

    /// Execution service endpoint (overrides BACKEND_URL).
    #[arg(long = "backend-url", value_name = "URL")]
    pub backend_url: Option<String>,

    /// Request timeout in seconds (overrides REQUEST_TIMEOUT).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Open the editor even when code is supplied; the code is preloaded.
    #[arg(long)]
    pub tui: bool,

    /// Write a default config file and exit (hidden).
    #[arg(long = "init-config", hide = true)]
    pub init_config: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_debug_and_overrides() {
        let cli = Cli::try_parse_from([
            "codepad",
            "--compile",
            "--backend-url",
            "http://exec:9000",
            "--timeout",
            "5",
            "int main(){}",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.backend_url.as_deref(), Some("http://exec:9000"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.code.as_deref(), Some("int main(){}"));
    }

    #[test]
    fn code_and_file_conflict() {
        assert!(Cli::try_parse_from(["codepad", "--file", "a.c", "x"]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["codepad", "--timeout", "0"]).is_err());
    }
}
