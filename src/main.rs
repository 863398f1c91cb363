use clap::Parser;
use log::debug;
use std::process;

use jwt_kit::{
    claims::{self, Config},
    idp, inspect, sign, HeaderAndClaims,
};

fn help_long_about() -> String {
    format!(
        "jwt-kit contains an embedded keypair used to sign JWTs.\n\n\
         Public JWKS url: {}\n\n\
         Issuer name: {}\n",
        idp::JWKS_URL,
        idp::ISSUER
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "jwt-kit",
    version,
    about = "jwt-kit - a simple CLI to generate JWTs using a development IDP",
    long_about = help_long_about()
)]
struct Cli {
    /// Add jwt claims, each in key=value format
    #[arg(short, long)]
    claims: Vec<String>,

    /// Add jwt scopes
    #[arg(short, long)]
    scopes: Vec<String>,

    /// Jwt audience
    #[arg(short, long, default_value = claims::DEFAULT_AUDIENCE)]
    audiences: Vec<String>,

    /// Expires duration (Go time.ParseDuration grammar, e.g. 1h30m)
    #[arg(short, long, default_value = claims::DEFAULT_EXPIRES_IN)]
    expires_in: String,

    /// Jwt subject
    #[arg(short = 'u', long, default_value = claims::DEFAULT_SUBJECT)]
    subject: String,

    /// Pretty print the token
    #[arg(short, long)]
    pretty_print: bool,

    /// Print the JWKS document for the embedded keypair and exit
    #[arg(short = 'j', long)]
    jwks: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            claims: self.claims.clone(),
            scopes: self.scopes.clone(),
            audiences: self.audiences.clone(),
            expires_in: self.expires_in.clone(),
            subject: self.subject.clone(),
            pretty_print: self.pretty_print,
        }
    }
}

fn run(cli: &Cli) -> jwt_kit::Result<()> {
    if cli.jwks {
        println!("{}", serde_json::to_string_pretty(&idp::jwks()?)?);
        return Ok(());
    }

    let claims = claims::assemble(&cli.config())?;
    debug!("assembled claim set with {} extra claims", claims.extra.len());

    let mut token = HeaderAndClaims::new(claims);
    let signed = sign(&mut token, idp::private_key())?;

    if cli.pretty_print {
        // Re-parse what was just minted. A verification failure here means
        // the tool emitted a token it cannot itself verify, which must never
        // reach stdout.
        let inspected = inspect(&signed, idp::public_key())?;
        println!("\n{}", serde_json::to_string_pretty(&inspected)?);
    } else {
        println!("{}", signed);
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("Whoops. There was an error while executing your CLI '{}'", err);
        process::exit(1);
    }
}
