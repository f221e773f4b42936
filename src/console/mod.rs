//! Line-oriented operator console.
//!
//! Thin glue between stdin and the library: parses commands, drives session
//! transitions and operations, and prints report lines. All user-facing
//! messages flow through the notifier; the console itself only renders
//! prompts, reports, and usage errors.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::abi::{AbiDescriptor, AbiResolver};
use crate::config::ConsoleConfig;
use crate::notify::{Notifier, Severity};
use crate::ops::{Executor, Operation};
use crate::session::Session;

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Load { address: Option<String> },
    ReloadAbi,
    SetProfile { name: String, age: String },
    GetProfile { address: Option<String> },
    Deposit { amount: String },
    Balance { address: Option<String> },
    MyBalance,
    Withdraw { amount: String },
    ContractBalance,
    WithdrawContract,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parses a non-empty input line. The error is the message to show the
    /// operator, usage or unknown-command.
    pub fn parse(line: &str) -> Result<Command, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (verb, args) = match tokens.split_first() {
            Some((verb, args)) => (verb.to_ascii_lowercase(), args),
            None => return Err("empty command".to_string()),
        };

        match verb.as_str() {
            "connect" => no_args(Command::Connect, args, "usage: connect"),
            "load" => optional_arg(args, "usage: load [address]")
                .map(|address| Command::Load { address }),
            "reload-abi" => no_args(Command::ReloadAbi, args, "usage: reload-abi"),
            "set-profile" => match args.split_last() {
                Some((age, name)) if !name.is_empty() => Ok(Command::SetProfile {
                    name: name.join(" "),
                    age: (*age).to_string(),
                }),
                _ => Err("usage: set-profile <name> <age>".to_string()),
            },
            "get-profile" => optional_arg(args, "usage: get-profile [address]")
                .map(|address| Command::GetProfile { address }),
            "deposit" => single_arg(args, "usage: deposit <amount>")
                .map(|amount| Command::Deposit { amount }),
            "balance" => optional_arg(args, "usage: balance [address]")
                .map(|address| Command::Balance { address }),
            "my-balance" => no_args(Command::MyBalance, args, "usage: my-balance"),
            "withdraw" => single_arg(args, "usage: withdraw <amount>")
                .map(|amount| Command::Withdraw { amount }),
            "contract-balance" => {
                no_args(Command::ContractBalance, args, "usage: contract-balance")
            }
            "withdraw-contract" => {
                no_args(Command::WithdrawContract, args, "usage: withdraw-contract")
            }
            "status" => no_args(Command::Status, args, "usage: status"),
            "help" => no_args(Command::Help, args, "usage: help"),
            "quit" | "exit" => no_args(Command::Quit, args, "usage: quit"),
            other => Err(format!(
                "unknown command: {other} (type help for the command list)"
            )),
        }
    }
}

fn no_args(command: Command, args: &[&str], usage: &str) -> Result<Command, String> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(usage.to_string())
    }
}

fn single_arg(args: &[&str], usage: &str) -> Result<String, String> {
    match args {
        [value] => Ok((*value).to_string()),
        _ => Err(usage.to_string()),
    }
}

fn optional_arg(args: &[&str], usage: &str) -> Result<Option<String>, String> {
    match args {
        [] => Ok(None),
        [value] => Ok(Some((*value).to_string())),
        _ => Err(usage.to_string()),
    }
}

/// Notifier that renders to the terminal with a severity label and color.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        const RESET: &str = "\x1b[0m";
        let (label, color) = match severity {
            Severity::Info => ("info", "\x1b[36m"),
            Severity::Success => ("ok", "\x1b[32m"),
            Severity::Error => ("error", "\x1b[31m"),
        };
        println!("{color}[{label}]{RESET} {message}");
    }
}

enum Flow {
    Continue,
    Quit,
}

/// The interactive console loop.
pub struct Console {
    config: ConsoleConfig,
    session: Arc<Session>,
    executor: Executor,
    resolver: AbiResolver,
    notifier: Arc<dyn Notifier>,
    descriptor: Option<AbiDescriptor>,
}

impl Console {
    pub fn new(
        config: ConsoleConfig,
        session: Arc<Session>,
        executor: Executor,
        resolver: AbiResolver,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            session,
            executor,
            resolver,
            notifier,
            descriptor: None,
        }
    }

    /// Startup sequence, then the command loop. Returns when the operator
    /// quits, stdin closes, or ctrl-c arrives.
    pub async fn run(mut self) -> std::io::Result<()> {
        self.startup().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    break;
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if let Flow::Quit = self.dispatch(line.trim()).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }

        tracing::info!("Console session ended");
        Ok(())
    }

    /// Discovery window, then one artifact resolution. Neither failure is
    /// fatal; the operator can connect or reload later.
    async fn startup(&mut self) {
        let window = self.config.discovery.window();
        let found = self.session.discover_provider(window).await;
        if !found {
            tracing::warn!(
                window_ms = window.as_millis() as u64,
                "No wallet provider detected in the discovery window"
            );
        }
        self.reload_abi(false).await;

        println!("profile console (type help for commands)");
    }

    async fn dispatch(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                return Flow::Continue;
            }
        };

        match command {
            Command::Connect => self.connect().await,
            Command::Load { address } => self.load(address),
            Command::ReloadAbi => self.reload_abi(true).await,
            Command::SetProfile { name, age } => {
                self.run_operation(Operation::SetProfile { name, age }).await;
            }
            Command::GetProfile { address } => {
                self.run_operation(Operation::GetProfile { address }).await;
            }
            Command::Deposit { amount } => {
                self.run_operation(Operation::Deposit { amount }).await;
            }
            Command::Balance { address } => {
                self.run_operation(Operation::CheckBalance { address }).await;
            }
            Command::MyBalance => self.my_balance().await,
            Command::Withdraw { amount } => {
                self.run_operation(Operation::Withdraw { amount }).await;
            }
            Command::ContractBalance => {
                self.run_operation(Operation::ContractBalance).await;
            }
            Command::WithdrawContract => {
                self.run_operation(Operation::WithdrawContractBalance).await;
            }
            Command::Status => self.status(),
            Command::Help => help(),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    async fn connect(&mut self) {
        let previous = self.session.snapshot().bound_address();
        if let Ok(snapshot) = self.session.connect_wallet().await {
            if let Some(identity) = &snapshot.identity {
                print_kv("Account", identity.account);
                print_kv("Network", &identity.network);
            }
            // A reconnect re-binds the remembered contract under the new
            // identity, as the page does after its connect button.
            if let Some(address) = previous {
                let _ = self
                    .session
                    .bind_contract(&address.to_string(), self.descriptor.as_ref());
            }
        }
    }

    fn load(&mut self, address: Option<String>) {
        let target = address
            .or_else(|| self.config.contract.address.clone())
            .unwrap_or_default();
        let _ = self.session.bind_contract(&target, self.descriptor.as_ref());
    }

    async fn reload_abi(&mut self, announce_success: bool) {
        match self.resolver.resolve().await {
            Ok(descriptor) => {
                if announce_success {
                    self.notifier.notify(
                        &format!("Contract ABI loaded from {}", descriptor.source()),
                        Severity::Success,
                    );
                }
                self.descriptor = Some(descriptor);
            }
            Err(err) => {
                tracing::warn!(error = %err, "ABI resolution failed");
                // A previously loaded interface stays usable.
                self.notifier.notify(
                    "Could not load ABI. Run truffle compile and serve from project root or from src/",
                    Severity::Error,
                );
            }
        }
    }

    /// Own-balance shortcut. The connect gate fires before the contract gate,
    /// matching the page's dedicated button.
    async fn my_balance(&self) {
        if self.session.snapshot().identity.is_none() {
            self.notifier
                .notify("Please connect your wallet first", Severity::Error);
            return;
        }
        self.run_operation(Operation::CheckBalance { address: None })
            .await;
    }

    async fn run_operation(&self, operation: Operation) {
        let outcome = self.executor.execute(operation).await;
        if let Some(report) = outcome.report() {
            for (key, value) in report.lines() {
                print_kv(key, value);
            }
        }
    }

    fn status(&self) {
        let snapshot = self.session.snapshot();
        print_kv("Stage", snapshot.stage());
        print_kv(
            "Provider",
            if snapshot.provider_present {
                "present"
            } else {
                "absent"
            },
        );
        if let Some(found) = snapshot.discovery_outcome {
            print_kv(
                "Discovery",
                if found {
                    "provider detected"
                } else {
                    "window elapsed without a provider"
                },
            );
        }
        if let Some(identity) = &snapshot.identity {
            print_kv("Account", identity.account);
            print_kv("Network", &identity.network);
        }
        if let Some(address) = snapshot.bound_address() {
            print_kv("Contract", address);
        }
        match &self.descriptor {
            Some(descriptor) => print_kv("ABI", descriptor.source()),
            None => print_kv("ABI", "not loaded"),
        }
    }
}

fn print_kv(key: &str, value: impl std::fmt::Display) {
    println!("  {key}: {value}");
}

fn help() {
    println!(
        "\
commands:
  connect                    request wallet accounts and adopt the first
  load [address]             bind the contract (default address from config)
  reload-abi                 re-run artifact resolution

  set-profile <name> <age>   store name and age under your account
  get-profile [address]      read a profile (defaults to your account)
  deposit <amount>           deposit ETH into your ledger balance
  balance [address]          read a ledger balance (defaults to your account)
  my-balance                 read your own ledger balance
  withdraw <amount>          withdraw ETH from your ledger balance
  contract-balance           native ETH held by the contract
  withdraw-contract          drain the contract balance (owner only)

  status                     show session state
  help                       this list
  quit | exit                leave"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("connect").unwrap(), Command::Connect);
        assert_eq!(Command::parse("status").unwrap(), Command::Status);
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
        assert_eq!(Command::parse("CONNECT").unwrap(), Command::Connect);
    }

    #[test]
    fn test_parse_set_profile_joins_name_words() {
        let command = Command::parse("set-profile Ada King Lovelace 36").unwrap();
        assert_eq!(
            command,
            Command::SetProfile {
                name: "Ada King Lovelace".to_string(),
                age: "36".to_string(),
            }
        );

        assert!(Command::parse("set-profile 36").is_err());
        assert!(Command::parse("set-profile").is_err());
    }

    #[test]
    fn test_parse_optional_address() {
        assert_eq!(
            Command::parse("balance").unwrap(),
            Command::Balance { address: None }
        );
        assert_eq!(
            Command::parse("get-profile 0xabc").unwrap(),
            Command::GetProfile {
                address: Some("0xabc".to_string())
            }
        );
        assert!(Command::parse("balance 0xabc extra").is_err());
    }

    #[test]
    fn test_parse_amount_commands() {
        assert_eq!(
            Command::parse("deposit 1.5").unwrap(),
            Command::Deposit {
                amount: "1.5".to_string()
            }
        );
        assert!(Command::parse("deposit").is_err());
        assert!(Command::parse("withdraw 1 2").is_err());
    }

    #[test]
    fn test_unknown_command_mentions_help() {
        let err = Command::parse("frobnicate").unwrap_err();
        assert!(err.contains("unknown command"));
        assert!(err.contains("help"));
    }
}
