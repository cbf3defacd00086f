//! # Nota CLI
//!
//! Usage:
//!   nota invoice invoice.json -o invoice.pdf
//!   echo '[{ ... }]' | nota receipts -o receipts.pdf
//!   nota number Q 1042
//!   nota --example invoice > invoice.json
//!
//! Every command accepts `--config render.json`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use nota::config::RenderConfig;
use nota::error::NotaError;
use nota::identifier::document_number;
use nota::model::DocType;

const USAGE: &str = "usage: nota <invoice|receipts> [input.json] [-o out.pdf] [--config render.json]
       nota number <Q|I> <sequence>
       nota --example <invoice|receipts>
";

const COMMANDS: [&str; 3] = ["invoice", "receipts", "number"];

fn main() {
    nota::logging::init();
    let args: Vec<String> = env::args().skip(1).collect();

    // Handle --example flag
    if let Some(pos) = args.iter().position(|a| a == "--example") {
        match args.get(pos + 1).map(String::as_str) {
            Some("receipts") => print!("{}", example_receipts_json()),
            _ => print!("{}", example_invoice_json()),
        }
        return;
    }

    let positional = positional_args(&args);
    let Some(command) = command(&positional) else {
        eprint!("{}", USAGE);
        std::process::exit(2);
    };

    if let Err(e) = run(command, &positional, &args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(command: &str, positional: &[String], args: &[String]) -> Result<(), NotaError> {
    let config = match flag_value(args, "--config") {
        Some(path) => RenderConfig::from_file(Path::new(path))?,
        None => RenderConfig::default(),
    };

    match command {
        "number" => {
            let doc_type = DocType::from(positional.get(1).cloned().unwrap_or_else(|| "I".to_string()));
            let sequence = positional.get(2).map(String::as_str).unwrap_or("0");
            println!("{}", document_number(&config.organization.prefix, &doc_type, sequence));
            Ok(())
        }
        kind => {
            let input = read_input(positional.get(1))?;
            let rendered = if kind == "invoice" {
                nota::render_invoice_json(&input, &config)?
            } else {
                nota::render_receipts_json(&input, &config)?
            };

            let output_path = PathBuf::from(flag_value(args, "-o").unwrap_or("output.pdf"));
            fs::write(&output_path, &rendered.bytes).map_err(|source| NotaError::Io {
                path: output_path.clone(),
                source,
            })?;
            eprintln!(
                "✓ Written {} ({} pages, {} bytes) to {}",
                rendered.document_id,
                rendered.page_count,
                rendered.bytes.len(),
                output_path.display()
            );
            Ok(())
        }
    }
}

/// The first positional argument when it names a command.
fn command(positional: &[String]) -> Option<&str> {
    positional
        .first()
        .map(String::as_str)
        .filter(|c| COMMANDS.contains(c))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
fn positional_args(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-o" || arg == "--config" {
            iter.next();
        } else if !arg.starts_with('-') {
            out.push(arg.clone());
        }
    }
    out
}

/// The named file, or stdin when no file is given.
fn read_input(path: Option<&String>) -> Result<String, NotaError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| NotaError::Io {
            path: PathBuf::from(path),
            source,
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map_err(|source| NotaError::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
            Ok(buf)
        }
    }
}

fn example_invoice_json() -> &'static str {
    r##"{
  "docType": "I",
  "docNumber": "",
  "orderId": "1042",
  "dueDate": "2023-02-01",
  "customerName": "PT Sinar Jaya Abadi",
  "customerAddress": [
    "Jl. Babakan Madang No. 8",
    "Sentul, Bogor",
    "Jawa Barat 16810"
  ],
  "customerPhone": "021-8790123",
  "customerFax": "021-8790124",
  "items": [
    { "name": "kaos polo bordir logo", "price": 85000, "quantity": 24 },
    { "name": "topi baseball sablon", "price": 35000, "quantity": 24 },
    { "name": "ongkos kirim", "price": 150000, "quantity": 1 }
  ],
  "discount": 100000,
  "downPayment": 1000000
}
"##
}

fn example_receipts_json() -> &'static str {
    r##"[
  {
    "orderId": "073-00068330",
    "recipientName": "Rudi",
    "recipientPhone": "0815912034",
    "recipientAddress": "Jl. Babakan Madang No. 8 Sirkuit Sentul Bogor",
    "senderName": "Herculex Indonesia",
    "senderPhone": "0000100002",
    "totalAmount": 2525000,
    "bankName": "BCA",
    "orderDetail": "Kemeja polos warna merah 1~!~Kemeja polos warna biru 2",
    "paid": false,
    "invoiceDate": "2023-01-25 11:20:00"
  },
  {
    "orderId": "073-00068331",
    "recipientName": "Sari Wulandari",
    "recipientPhone": "0812334455",
    "recipientAddress": "Jl. Diponegoro No. 12, Semarang",
    "senderName": "Herculex Indonesia",
    "senderPhone": "0000100002",
    "totalAmount": 480000,
    "orderDetail": "Jaket parasut hitam XL 1",
    "paid": true,
    "invoiceDate": "2023-01-26 09:05:00"
  }
]
"##
}
