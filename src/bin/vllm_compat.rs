//! vllm-compat — dry-run the vLLM parameter rewrites from the command line
//!
//! Usage:
//!   vllm-compat normalize [--policy always|opt-in] <request.json|->
//!   vllm-compat schema
//!   vllm-compat version

use std::io::Read;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use vllm_compat::guided::{DirectiveExtraction, GuidedParameterExtractor, GuidedType};
use vllm_compat::schema::vllm_parameter_rules;
use vllm_compat::{ModelParameters, PromptMessage};

fn main() {
    vllm_compat::logging::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "normalize" => cmd_normalize(&args[2..]),
        "schema" => cmd_schema(),
        "version" | "--version" | "-V" => {
            println!("vllm-compat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"vllm-compat — vLLM parameter dialect adapter

USAGE:
    vllm-compat <COMMAND> [OPTIONS]

COMMANDS:
    normalize [--policy <p>] <file|->   Rewrite a request and print the result
    schema                              Print the extra parameter rules
    version                             Show version information
    help                                Show this help message

The normalize input is a JSON object with "prompt_messages" and
"model_parameters". Use "-" to read it from stdin.

ENVIRONMENT:
    VLLM_COMPAT_DIRECTIVE_EXTRACTION    Default policy: always | opt-in
    RUST_LOG                            Log filter (default vllm_compat=info)"#
    );
}

#[derive(Debug, Deserialize)]
struct DryRunRequest {
    #[serde(default)]
    prompt_messages: Vec<PromptMessage>,
    #[serde(default)]
    model_parameters: ModelParameters,
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    directive: Option<GuidedType>,
    prompt_messages: Vec<PromptMessage>,
    model_parameters: ModelParameters,
}

fn cmd_normalize(args: &[String]) -> anyhow::Result<()> {
    let mut policy = None;
    let mut input = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--policy" => {
                let raw = iter.next().context("--policy needs a value")?;
                policy = Some(raw.parse::<DirectiveExtraction>()?);
            }
            other if input.is_none() => input = Some(other.to_string()),
            other => bail!("unexpected argument: {other}"),
        }
    }

    let policy = match policy {
        Some(p) => p,
        None => DirectiveExtraction::from_env()?,
    };
    let input = input.context("missing request file (use - for stdin)")?;

    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(&input).with_context(|| format!("reading {input}"))?
    };

    let mut req: DryRunRequest = serde_json::from_str(&raw).context("parsing request")?;
    let outcome = GuidedParameterExtractor::new(policy)
        .normalize(&mut req.model_parameters, &mut req.prompt_messages);

    let out = DryRunOutput {
        directive: outcome.directive,
        prompt_messages: req.prompt_messages,
        model_parameters: req.model_parameters,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_schema() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&vllm_parameter_rules())?);
    Ok(())
}
