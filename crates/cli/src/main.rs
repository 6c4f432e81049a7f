use api_shared::{Scope, ScopeSet};
use clap::{Parser, Subcommand};
use drc_core::constants::DEFAULT_DATA_DIR;
use drc_core::validators::{
    decode_inhoud, HttpFetcher, ReferenceValidator, RequiredKeysShapeChecker,
};
use drc_core::{
    fetch_timeout_from_env_value, CoreConfig, InformatieObjectService, Store, StoredDocument,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "drc")]
#[command(about = "DRC document registration CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all documents (latest version)
    List,
    /// Show one document
    Show {
        /// Document UUID
        uuid: String,
        /// Version to show (defaults to the latest)
        #[arg(long)]
        versie: Option<u32>,
    },
    /// Release a document lock without its token
    ForceUnlock {
        /// Document UUID
        uuid: String,
    },
    /// Decode a file holding base64 content
    CheckContent {
        /// File with the base64 text
        file: PathBuf,
        /// Expected size of the decoded content in bytes
        #[arg(long)]
        size: Option<u64>,
    },
}

/// Opens the document service over `DRC_DATA_DIR`.
fn open_documents() -> Result<InformatieObjectService, Box<dyn std::error::Error>> {
    let data_dir = std::env::var("DRC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = Path::new(&data_dir);
    if !data_path.exists() {
        return Err(format!("DRC data directory does not exist: {}", data_path.display()).into());
    }

    let base_url =
        std::env::var("DRC_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".into());
    let fetch_timeout = fetch_timeout_from_env_value(std::env::var("DRC_FETCH_TIMEOUT_SECS").ok())?;
    let cfg = Arc::new(CoreConfig::new(
        data_path.to_path_buf(),
        base_url,
        fetch_timeout,
        false,
    )?);

    let store = Arc::new(Store::new(cfg)?);
    let references = Arc::new(ReferenceValidator::new(
        Arc::new(HttpFetcher::new(fetch_timeout)?),
        Arc::new(RequiredKeysShapeChecker),
    ));
    Ok(InformatieObjectService::new(store, references))
}

fn print_document(doc: &StoredDocument) {
    let v = &doc.version;
    println!("UUID:            {}", doc.uuid);
    println!("Identificatie:   {}", v.identificatie);
    println!("Bronorganisatie: {}", v.bronorganisatie);
    println!("Titel:           {}", v.titel);
    println!("Versie:          {}", v.versie);
    println!(
        "Status:          {}",
        v.status.map(|s| s.as_str()).unwrap_or("-")
    );
    println!("Registered:      {}", v.begin_registratie);
    println!(
        "Content:         {}",
        v.bestandsomvang
            .map(|size| format!("{size} bytes"))
            .unwrap_or_else(|| "none".into())
    );
    println!("Locked:          {}", if doc.locked { "yes" } else { "no" });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => {
            let documents = open_documents()?.list();
            if documents.is_empty() {
                println!("No documents found.");
            } else {
                for doc in documents {
                    println!(
                        "ID: {}, Identificatie: {}, Versie: {}, Titel: {}",
                        doc.uuid, doc.version.identificatie, doc.version.versie, doc.version.titel
                    );
                }
            }
        }
        Some(Commands::Show { uuid, versie }) => match open_documents()?.get(&uuid, versie) {
            Ok(doc) => print_document(&doc),
            Err(e) => eprintln!("Error reading document: {}", e),
        },
        Some(Commands::ForceUnlock { uuid }) => {
            let scopes = ScopeSet::new([Scope::ForceUnlock]);
            match open_documents()?.unlock(&uuid, None, &scopes).await {
                Ok(()) => println!("Unlocked document: {}", uuid),
                Err(e) => eprintln!("Error unlocking document: {}", e),
            }
        }
        Some(Commands::CheckContent { file, size }) => {
            let encoded = std::fs::read_to_string(&file)?;
            match decode_inhoud(encoded.trim(), size) {
                Ok(bytes) => println!("OK: {} decodes to {} bytes", file.display(), bytes.len()),
                Err(e) => eprintln!("{}: {} ({})", e.name, e.reason, e.code),
            }
        }
        None => {
            println!("Use 'drc --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["drc", "show", "abc", "--versie", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show { versie: Some(2), .. })
        ));

        let cli =
            Cli::try_parse_from(["drc", "check-content", "inhoud.b64", "--size", "17"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::CheckContent { size: Some(17), .. })
        ));

        let cli = Cli::try_parse_from(["drc", "force-unlock", "abc"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ForceUnlock { .. })));
    }
}
