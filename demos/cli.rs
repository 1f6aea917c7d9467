use std::error;

use bibtexcustom::{Database, Parser, ParserConfig, Pipeline};

use clap;
use clap::Parser as CLIParser;
use tracing_subscriber::EnvFilter;

#[derive(clap::ArgEnum, Clone, Copy, Debug)]
enum Customize {
    None,
    Unicode,
    Latex,
}

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Settings {
    /// Filepath to file to parse
    #[clap(short, long)]
    input: String,

    /// Return only entries with this ID
    #[clap(short, long)]
    query_id: Option<String>,

    /// Customization bundle applied to every entry
    #[clap(short, long, arg_enum, default_value = "none")]
    customize: Customize,

    /// Predefine the month macros (jan, feb, ...)
    #[clap(long)]
    common_strings: bool,

    /// Print the entries as JSON
    #[cfg(feature = "serde_json")]
    #[clap(long)]
    json: bool,
}

fn load(s: &Settings) -> Result<Database, Box<dyn error::Error>> {
    let config = ParserConfig::new().common_strings(s.common_strings);
    let mut parser = Parser::from_file(&s.input)?.with_config(config);
    parser = match s.customize {
        Customize::None => parser,
        Customize::Unicode => parser.with_customization(Pipeline::unicode()),
        Customize::Latex => parser.with_customization(Pipeline::latex()),
    };
    let db = parser.parse();
    Ok(match &s.query_id {
        Some(query) => db.into_iter().filter(|entry| &entry.id == query).collect(),
        None => db,
    })
}

fn print_human_readable(db: &Database) {
    for entry in db {
        println!("type = {}", entry.kind);
        println!("id = {}", entry.id);
        let mut names: Vec<&String> = entry.fields.keys().collect();
        names.sort();
        for name in names {
            println!("\t{}\t= {}", name, entry.fields[name]);
        }
    }
    for skipped in db.skipped() {
        eprintln!("{}", skipped);
    }
}

#[cfg(feature = "serde_json")]
fn print_json(db: &Database) -> Result<(), Box<dyn error::Error>> {
    println!("{}", serde_json::to_string(db)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::parse();
    let db = load(&settings)?;

    #[cfg(feature = "serde_json")]
    {
        if settings.json {
            return print_json(&db);
        }
    }
    print_human_readable(&db);

    Ok(())
}
