use clap::{Arg, ArgAction, ArgMatches, Command, builder::BoolishValueParser};

pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";
pub const ARG_DB_TIMEOUT: &str = "db-timeout";
pub const ARG_APPLY_SCHEMA: &str = "apply-schema";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub max_connections: u32,
    pub timeout_seconds: u64,
    pub apply_schema: bool,
}

impl Options {
    /// Parse database pool arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow absent.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let max_connections = matches
            .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!("missing required argument: --{ARG_DB_MAX_CONNECTIONS}")
            })?;
        let timeout_seconds = matches
            .get_one::<u64>(ARG_DB_TIMEOUT)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_DB_TIMEOUT}"))?;

        Ok(Self {
            max_connections,
            timeout_seconds,
            apply_schema: matches.get_flag(ARG_APPLY_SCHEMA),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum number of pooled database connections")
                .env("REFINER_DB_MAX_CONNECTIONS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_DB_TIMEOUT)
                .long(ARG_DB_TIMEOUT)
                .help("Seconds to wait for a connection or a query before giving up")
                .env("REFINER_DB_TIMEOUT")
                .default_value("5")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_APPLY_SCHEMA)
                .long(ARG_APPLY_SCHEMA)
                .help("Create the users table on startup if it does not exist")
                .env("REFINER_APPLY_SCHEMA")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
