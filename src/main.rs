use std::collections::BTreeMap;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use splitledger::journal::{
    JournalError, read_records, write_amounts, write_balances, write_splits, write_summary,
    write_transactions,
};
use splitledger::{
    Amount, GroupLedger, GroupSnapshot, MemberId, SplitParams, SplitType, compute_splits,
    global_summary,
};

#[derive(Parser, Debug)]
#[command(name = "splitledger")]
#[command(about = "Group expense balances, debt simplification and pairwise debts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Net balance of every member of a group.
    Balances { journal: PathBuf },
    /// Minimal set of transfers that settles a group.
    Settle { journal: PathBuf },
    /// Netted amounts between one member and each counterparty.
    Pairwise {
        journal: PathBuf,
        #[arg(long)]
        member: MemberId,
    },
    /// One member's totals owed and owing across several groups.
    Summary {
        #[arg(long)]
        member: MemberId,
        #[arg(required = true)]
        journals: Vec<PathBuf>,
    },
    /// Split an amount among participants given as `member` or `member=value`.
    Split {
        #[arg(long)]
        amount: f64,
        #[arg(long = "type", value_parser = parse_split_type, default_value = "equal")]
        split_type: SplitType,
        #[arg(required = true)]
        participants: Vec<String>,
    },
}

fn parse_split_type(value: &str) -> Result<SplitType, String> {
    value.parse().map_err(|e| format!("{e}"))
}

/// Stream a journal through a ledger and take its snapshot
async fn load(path: &Path) -> Result<GroupSnapshot, JournalError> {
    if path.extension().is_none_or(|ext| ext != "csv") {
        warn!(path = %path.display(), "input file seems to not be a csv file");
    }

    let records = read_records(path)?;
    let mut ledger = GroupLedger::new();
    let (record_sender, record_receiver) = tokio::sync::mpsc::channel(16);

    let reader = tokio::task::spawn_blocking(move || {
        for result in records {
            match result {
                Ok(record) => {
                    if record_sender.blocking_send(record).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    ledger.run(ReceiverStream::new(record_receiver)).await;
    if let Err(e) = reader.await {
        warn!(reason = %e, "journal reader stopped early");
    }

    Ok(ledger.snapshot())
}

/// Convert a command-line value, rejecting values an [`Amount`] cannot hold
fn checked_amount(value: f64) -> Result<Amount, String> {
    Amount::try_from_float(value).ok_or_else(|| format!("value {value} is out of range"))
}

/// Turn `member[=value]` arguments into participants and split parameters.
///
/// A repeated member keeps its first position and its last value.
fn participants(
    split_type: SplitType,
    args: &[String],
) -> Result<(Vec<MemberId>, BTreeMap<MemberId, SplitParams>), String> {
    let mut members = Vec::with_capacity(args.len());
    let mut params = BTreeMap::new();

    for arg in args {
        let (member, value) = match arg.split_once('=') {
            Some((member, value)) => {
                let value: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid value in '{arg}'"))?;
                (member.trim().to_string(), Some(checked_amount(value)?))
            }
            None => (arg.trim().to_string(), None),
        };
        if !members.contains(&member) {
            members.push(member.clone());
        }
        params.insert(member, SplitParams::for_split(split_type, value));
    }

    Ok((members, params))
}

async fn execute(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Balances { journal } => {
            let snapshot = load(&journal).await?;
            write_balances(io::stdout().lock(), &snapshot.balances())?;
        }
        Command::Settle { journal } => {
            let snapshot = load(&journal).await?;
            write_transactions(io::stdout().lock(), &snapshot.simplified())?;
        }
        Command::Pairwise { journal, member } => {
            let snapshot = load(&journal).await?;
            let net = snapshot.pairwise().net_with(&member);
            write_amounts(
                io::stdout().lock(),
                net.iter().map(|(other, amount)| (other, *amount)),
            )?;
        }
        Command::Summary { member, journals } => {
            let mut group_balances = Vec::with_capacity(journals.len());
            for journal in &journals {
                group_balances.push(load(journal).await?.balances());
            }
            write_summary(
                io::stdout().lock(),
                &global_summary(&member, &group_balances),
            )?;
        }
        Command::Split {
            amount,
            split_type,
            participants: args,
        } => {
            let (members, params) = participants(split_type, &args)?;
            let amount = checked_amount(amount)?;
            let splits = compute_splits(amount, split_type, &members, &params);
            let total: Amount = splits.iter().map(|split| split.amount).sum();
            if !total.approx_eq(amount) {
                warn!(expected = %amount, actual = %total, "split amounts do not equal total");
            }
            write_splits(io::stdout().lock(), &splits)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
