//! The `tinto-node` CLI, grounded on the teacher's `node/src/cli.rs`: an
//! `argh`-derived `Args { cmd: Command }` wrapping one subcommand struct per
//! operation.

use argh::FromArgs;

use crate::command;
use crate::config::Config;
use crate::context::AppContext;

/// the Tinto invoicing node CLI
#[derive(Debug, FromArgs)]
pub struct Args {
    #[argh(subcommand)]
    cmd: Command,
}

#[derive(Debug, FromArgs)]
#[argh(subcommand)]
pub enum Command {
    Issue(IssueCommand),
    Poll(PollCommand),
    Inspect(InspectCommand),
}

/// Build, sign, and submit an invoice described by a request file.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "issue")]
pub struct IssueCommand {
    /// path to a JSON file describing the issuer, customer, and line items
    #[argh(positional)]
    pub request_file: String,
}

/// Poll a previously-submitted invoice's submission until a terminal
/// verdict, or until `max_attempts` is reached.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "poll")]
pub struct PollCommand {
    /// the invoice id to poll
    #[argh(positional)]
    pub invoice_id: String,

    /// maximum number of status checks before giving up. Defaults to 10
    #[argh(option, default = "10")]
    pub max_attempts: u32,

    /// seconds to sleep between checks. Defaults to 5
    #[argh(option, default = "5")]
    pub delay_secs: u64,
}

/// Print an invoice's current state, its latest submission, and its audit
/// trail.
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "inspect")]
pub struct InspectCommand {
    /// the invoice id to inspect
    #[argh(positional)]
    pub invoice_id: String,
}

impl Args {
    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::from_env()?;
        let ctx = AppContext::init(config)?;

        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime");

        match self.cmd {
            Command::Issue(args) => rt.block_on(command::issue::run(&ctx, &args)),
            Command::Poll(args) => rt.block_on(command::poll::run(&ctx, &args)),
            Command::Inspect(args) => rt.block_on(command::inspect::run(&ctx, &args)),
        }
    }
}
