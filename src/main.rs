use std::sync::Arc;

use clap::Parser;
use serde_json::{json, Value as Json};
use structural_equivalency::{
    verify, ComparisonContext, Configuration, EquivalencyOptions, CyclicReferenceHandling, EquivalencyError, Value,
};

/// Check two JSON documents for structural equivalency.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Subject JSON document (string).
    subject: String,
    /// Expectation JSON document (string).
    expectation: String,
    /// Member path to leave out of the comparison (repeatable)
    #[arg(long)]
    exclude: Vec<String>,
    /// Compare only this member path (repeatable)
    #[arg(long)]
    include: Vec<String>,
    /// Also compare public fields
    #[arg(long)]
    fields: bool,
    /// Treat cyclic references as satisfied instead of failing
    #[arg(long)]
    ignore_cycles: bool,
    /// Reason phrase added to failure messages
    #[arg(long, default_value = "")]
    because: String,
    /// Full options as JSON; flags above are applied on top
    #[arg(long)]
    options: Option<String>,
}

fn parse_or_exit<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> T {
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Invalid {what}: {e}");
            std::process::exit(2);
        }
    }
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Parse CLI arguments.
    let args = Args::parse();

    let subject: Json = parse_or_exit("subject JSON", &args.subject);
    let expectation: Json = parse_or_exit("expectation JSON", &args.expectation);

    // Build options.
    let mut options = match args.options.as_deref() {
        Some(raw) => parse_or_exit::<EquivalencyOptions>("options", raw),
        None => EquivalencyOptions::default(),
    };
    options.excluding.extend(args.exclude);
    options.including.extend(args.include);
    options.include_fields |= args.fields;
    if args.ignore_cycles {
        options.cyclic_references = CyclicReferenceHandling::Ignore;
    }

    let ctx = ComparisonContext::new(
        Arc::new(Configuration::from(&options)),
        Value::from_json(&subject),
        Value::from_json(&expectation),
    )
    .with_reason(args.because, Vec::new());

    let out = match verify(&ctx) {
        Ok(()) => json!({ "equivalent": true, "failures": [] }),
        Err(EquivalencyError::AssertionFailed { failures }) => json!({ "equivalent": false, "failures": failures }),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
    if out["equivalent"] == json!(false) {
        std::process::exit(1);
    }
}
