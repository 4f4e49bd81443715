extern crate mstmap_import;

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process;

use flate2::read::GzDecoder;
use getopts::Options;
use tracing_subscriber::EnvFilter;

use mstmap_import::config::ImportConfig;
use mstmap_import::db::ChadoStore;
use mstmap_import::import::MstImporter;

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options] [map_file]", program);
    print!("{}", opts.usage(&brief));
}

fn open_map_file(file_name: &str) -> Box<dyn BufRead> {
    let file = match File::open(file_name) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Failed to read {}: {}", file_name, err);
            process::exit(1);
        }
    };

    if file_name.ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut opts = Options::new();

    opts.optflag("h", "help", "print this help message");
    opts.optopt("d", "database",
                "path to the chado SQLite database",
                "DB_PATH");
    opts.optflag("", "init-db", "create the chado tables before importing");
    opts.optopt("c", "config",
                "importer vocabulary configuration (JSON)",
                "CONFIG_FILE");
    opts.optmulti("s", "set",
                  "submission field, e.g. -s featuremap_name='Lazy Map'",
                  "FIELD=VALUE");

    let program = args[0].clone();

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            print_usage(&program, &opts);
            println!("\nerror: {}", e);
            process::exit(0);
        }
    };

    if matches.opt_present("help") {
        print_usage(&program, &opts);
        process::exit(0);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("mstmap_import=info"))
                .unwrap(),
        )
        .init();

    if !matches.opt_present("database") {
        println!("no -d|--database option");
        print_usage(&program, &opts);
        process::exit(1);
    }

    if matches.free.is_empty() {
        println!("needs a [map_file] argument");
        print_usage(&program, &opts);
        process::exit(1);
    }

    println!("Importing using {} v{}", PKG_NAME, VERSION);

    let db_path = matches.opt_str("database").unwrap();
    let map_file_name = &matches.free[0];

    let config = match matches.opt_str("config") {
        Some(config_file_name) => ImportConfig::read(&config_file_name),
        None => ImportConfig::default(),
    };

    let mut fields = HashMap::new();
    for setting in matches.opt_strs("set") {
        match setting.split_once('=') {
            Some((name, value)) => {
                fields.insert(name.to_owned(), value.to_owned());
            }
            None => {
                println!("--set needs FIELD=VALUE, got {}", setting);
                process::exit(1);
            }
        }
    }

    let mut store = ChadoStore::open(Path::new(&db_path))?;
    if matches.opt_present("init-db") {
        store.create_tables()?;
    }

    let importer = MstImporter::new(config);

    let report = importer.validate_and_describe(&fields);
    if !report.is_ok() {
        eprintln!("invalid submission: {}", report);
        process::exit(1);
    }

    let reader = open_map_file(map_file_name);

    match importer.run(&mut store, &fields, reader) {
        Ok(outcome) => {
            println!("created featuremap {} (analysis {}) with {} linkage group(s), {} marker position(s)",
                     outcome.featuremap_id, outcome.analysis_id,
                     outcome.group_count, outcome.marker_count);
            Ok(())
        }
        Err(err) => {
            eprintln!("import failed: {}", err);
            process::exit(1);
        }
    }
}
