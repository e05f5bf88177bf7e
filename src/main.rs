// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Command-line front end for action-guard
use action_guard::engine_core::audit::AuditHook;
use action_guard::engine_core::constants::exit;
use action_guard::{
    list_policies, load_policy, ActionRequest, Config, ConfigUpdate, Context, DecisionRecord,
    Guard, Mode, Params,
};
use anyhow::{bail, Context as _};
use clap::{Args, Parser, Subcommand};
use std::io::{IsTerminal, Read};
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "action-guard",
    version,
    about = "Pre-execution guardrail for agent tool calls",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one proposed action. Exit code: 0 ALLOW, 1 BLOCK, 2 ESCALATE
    Check(CheckArgs),

    /// List built-in policies, or print one policy (built-in name or file path) as JSON
    Policies {
        /// Built-in policy name or path to a policy file
        name: Option<String>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the JSON Schema of policy documents
    #[cfg(feature = "schema")]
    Schema,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Tool the agent wants to invoke (e.g. "exec")
    #[arg(short, long)]
    tool: Option<String>,

    /// Agent identifier
    #[arg(short, long)]
    agent: Option<String>,

    /// Tool parameters as JSON (an object or a string)
    #[arg(short, long)]
    params: Option<String>,

    /// Role the agent is acting in
    #[arg(short, long)]
    role: Option<String>,

    /// Recent conversational context; repeat for a history
    #[arg(short, long)]
    context: Vec<String>,

    /// Read the whole request as JSON from stdin
    #[arg(long)]
    stdin: bool,

    /// Print the decision record as JSON
    #[arg(long)]
    json: bool,

    /// Override the operating mode (enforce, warn, log)
    #[arg(long)]
    mode: Option<Mode>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap exits usage errors with 2, which would read as ESCALATE.
            let code = if e.use_stderr() { exit::ERROR } else { exit::ALLOW };
            let _ = e.print();
            return exit_code(code);
        }
    };

    install_panic_hook();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config from env, using defaults: {}",
            e
        );
        Config::default()
    });

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    match run(cli.command, config) {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(exit::ERROR)
        }
    }
}

fn run(command: Command, config: Config) -> anyhow::Result<i32> {
    match command {
        Command::Check(args) => check(args, config),
        Command::Policies { name: Some(name), .. } => {
            let doc = load_policy(&name)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(exit::ALLOW)
        }
        Command::Policies { name: None, json } => {
            list(json)?;
            Ok(exit::ALLOW)
        }
        #[cfg(feature = "schema")]
        Command::Schema => {
            let schema = schemars::schema_for!(action_guard::PolicyDocument);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(exit::ALLOW)
        }
    }
}

fn check(args: CheckArgs, config: Config) -> anyhow::Result<i32> {
    let request = if args.stdin {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read request from stdin")?;
        let value: serde_json::Value =
            serde_json::from_str(&input).context("stdin is not valid JSON")?;
        ActionRequest::from_value(value)
    } else {
        request_from_flags(&args)?
    };

    let mode = args.mode.unwrap_or(config.mode);
    let guard = Guard::with_config(config.engine_config());
    guard.configure(
        ConfigUpdate::new()
            .mode(mode)
            .violation_hook(AuditHook::new(mode)),
    );
    debug!(?request, %mode, "Checking action");

    let record = guard.check_action(&request);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        render(&record);
    }
    Ok(decision_exit_code(record.decision.as_str()))
}

fn request_from_flags(args: &CheckArgs) -> anyhow::Result<ActionRequest> {
    let params = match &args.params {
        Some(raw) => {
            let value: serde_json::Value = serde_json::from_str(raw)
                .with_context(|| format!("--params is not valid JSON: {}", raw))?;
            if value.is_null() {
                None
            } else {
                Some(Params::from(value))
            }
        }
        None => None,
    };

    let context = match args.context.len() {
        0 => None,
        1 => Some(Context::Text(args.context[0].clone())),
        _ => Some(Context::History(args.context.clone())),
    };

    if args.tool.is_none() && params.is_none() && context.is_none() && args.agent.is_none() {
        bail!("nothing to check: pass --tool, --params, --context or --stdin");
    }

    Ok(ActionRequest {
        agent: args.agent.clone(),
        tool: args.tool.clone(),
        params,
        role: args.role.clone(),
        context,
    })
}

/// Exit code for a decision value. Unknown values are treated as ESCALATE.
fn decision_exit_code(decision: &str) -> i32 {
    match decision {
        "ALLOW" => exit::ALLOW,
        "BLOCK" => exit::BLOCK,
        "ESCALATE" => exit::ESCALATE,
        _ => exit::ESCALATE,
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn render(record: &DecisionRecord) {
    let color = std::io::stdout().is_terminal();
    let (start, bold, reset) = if color {
        let start = match record.decision.as_str() {
            "ALLOW" => "\x1b[32m", // Green
            "BLOCK" => "\x1b[31m", // Red
            _ => "\x1b[33m",       // Yellow
        };
        (start, "\x1b[1m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let rule = record.rule.map(|r| r.as_str()).unwrap_or("none");
    println!(
        "{}{}{}{}  rule={}  risk={}  confidence={}  latency={}ms",
        bold,
        start,
        record.decision,
        reset,
        rule,
        record.risk_level,
        record.confidence,
        record.latency_ms
    );
    println!("  {}", record.reason);
}

fn list(json: bool) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    for name in list_policies() {
        let doc = load_policy(name)?;
        entries.push((name, doc.description));
    }

    if json {
        let value: Vec<serde_json::Value> = entries
            .iter()
            .map(|(name, description)| {
                serde_json::json!({ "name": name, "description": description })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for (name, description) in entries {
            println!("{:<12} {}", name, description);
        }
    }
    Ok(())
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("PANIC: {} at {}", message, location);
    }));
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}
