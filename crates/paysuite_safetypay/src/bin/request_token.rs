// --- File: crates/paysuite_safetypay/src/bin/request_token.rs ---
//! Requests a SafetyPay express token from the command line.
//!
//! ```text
//! safetypay-token [--bare] [--sign FIELD_LIST] KEY=VALUE...
//! ```
//!
//! Configuration comes from `config/` and the environment (see
//! `paysuite_config::load_config`). With `--sign`, `RequestDateTime` is set to
//! the client timestamp and a `Signature` over the listed fields is added
//! before sending.

use paysuite_common::{config_error, logging, HttpStatusCode, PaysuiteError};
use paysuite_config::load_config;
use paysuite_safetypay::{RequestParameters, SafetypayManager};
use std::env;
use std::process::ExitCode;

struct Args {
    want_html_link: bool,
    sign_fields: Option<String>,
    params: RequestParameters,
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args {
        want_html_link: true,
        sign_fields: None,
        params: RequestParameters::new(),
    };

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--bare" => args.want_html_link = false,
            "--sign" => {
                let fields = raw.next().ok_or("--sign needs a comma separated field list")?;
                args.sign_fields = Some(fields);
            }
            other => {
                let (key, value) = other
                    .split_once('=')
                    .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", other))?;
                args.params.insert(key.to_string(), value.to_string());
            }
        }
    }
    Ok(args)
}

async fn run(args: Args) -> Result<String, PaysuiteError> {
    let app_config = load_config().map_err(config_error)?;
    let manager = SafetypayManager::from_app_config(&app_config)?;

    let mut params = args.params;
    if let Some(fields) = args.sign_fields {
        params.insert(
            "RequestDateTime".to_string(),
            manager.request_timestamp().to_string(),
        );
        let signature = manager.compute_signature(&params, &fields, false)?;
        params.insert("Signature".to_string(), signature);
    }

    Ok(manager
        .request_token_rendered(&params, args.want_html_link)
        .await?)
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            logging::log_error(&msg, "Invalid arguments");
            eprintln!("usage: safetypay-token [--bare] [--sign FIELD_LIST] KEY=VALUE...");
            return ExitCode::from(2);
        }
    };

    match logging::log_result(run(args).await, "Token request completed", "Token request failed") {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} (HTTP {})", e, e.status_code());
            ExitCode::FAILURE
        }
    }
}
