extern crate graql;
extern crate clap;
extern crate log;
extern crate env_logger;

use std::io::{self, Read};
use std::process;
use std::time::Instant;

use log::{info, error};
use clap::{Arg, App};

use graql::{Conn, InterpreterConfig};

fn main() {
    env_logger::init();
    let defaults = InterpreterConfig::default();
    let matches = App::new("graql-run")
        .version("0.1.0")
        .about("Submits a query to a Graql interpreter and prints its raw output")
        .arg(
            Arg::with_name("interpreter")
                .short("i")
                .long("interpreter")
                .value_name("PATH")
                .help("Sets the interpreter executable")
                .default_value(&defaults.program)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("format")
                .short("o")
                .long("format")
                .value_name("FMT")
                .help("Sets the output format the interpreter is asked for")
                .default_value(&defaults.format)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("timeout")
                .short("t")
                .long("timeout-ms")
                .value_name("MS")
                .help("Kills the interpreter after this many milliseconds")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("arg")
                .long("arg")
                .value_name("ARG")
                .help("Passes an extra argument to the interpreter before the query")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("query")
                .value_name("QUERY")
                .help("The query text; read from stdin if absent")
                .index(1),
        )
        .get_matches();

    let timeout_ms = matches.value_of("timeout").map(|t| {
        t.parse::<u64>().unwrap_or_else(|e| {
            error!("Invalid timeout '{}': {}", t, e);
            process::exit(2);
        })
    });

    let config = InterpreterConfig {
        program: matches.value_of("interpreter").unwrap_or(&defaults.program).to_string(),
        args: matches
            .values_of("arg")
            .map(|args| args.map(String::from).collect())
            .unwrap_or_default(),
        format: matches.value_of("format").unwrap_or(&defaults.format).to_string(),
        timeout_ms,
    };

    let query = match matches.value_of("query") {
        Some(q) => q.to_string(),
        None => {
            let mut input = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut input) {
                error!("Failed to read query from stdin: {}", e);
                process::exit(2);
            }
            input.trim().to_string()
        }
    };

    let conn = Conn::from_config(config);
    let start = Instant::now();
    match conn.execute_str(&query) {
        Ok(output) => {
            info!("Query executed in {} ms", start.elapsed().as_millis());
            print!("{}", output);
        }
        Err(e) => {
            eprint!("{}", e.message());
            process::exit(1);
        }
    }
}
