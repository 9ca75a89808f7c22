use clap::{CommandFactory, Parser};

#[derive(Debug, Parser)]
#[command(name = "control-room", version, about = "Incident, vehicle and wind control room")]
pub struct CliArgs {
    /// Print a snapshot of incidents, vehicles and wind, then exit
    #[arg(long)]
    pub headless: bool,

    /// Print the headless snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the backend base URL
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// Override the routing service base URL
    #[arg(long = "routing-base", value_name = "URL")]
    pub routing_base: Option<String>,

    /// Override the log file used while the terminal UI is running
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<String>,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(base) = &self.api_base {
            std::env::set_var("API_BASE", base);
        }
        if let Some(base) = &self.routing_base {
            std::env::set_var("ROUTING_BASE", base);
        }
        if let Some(path) = &self.log_file {
            std::env::set_var("LOG_FILE", path);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = CliArgs::parse_from([
            "control-room",
            "--headless",
            "--json",
            "--api-base",
            "http://localhost:9000",
        ]);
        assert!(args.headless);
        assert!(args.json);
        assert_eq!(args.api_base.as_deref(), Some("http://localhost:9000"));
        assert!(args.routing_base.is_none());
    }

    #[test]
    fn help_mentions_flags() {
        let help = CliArgs::help_text();
        assert!(help.contains("--api-base"));
        assert!(help.contains("--headless"));
    }
}
