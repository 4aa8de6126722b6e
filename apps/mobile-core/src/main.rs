use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mobile_core::config::Config;
use mobile_core::credentials::MemoryStore;
use mobile_core::store::{self, LiveList};
use mobile_core::Client;
use sitedocs_common::ObjectSite;

fn prompt(label: &str) -> String {
    print!("{}: ", label);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
    input.trim().to_string()
}

fn print_objects(sites: &[ObjectSite]) {
    println!("Objects ({}):", sites.len());
    for site in sites {
        println!("  #{} {} ({})", site.id, site.title, site.address);
    }
}

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing; env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let client = Client::new(config, Arc::new(MemoryStore::new())).expect("failed to build client");

    println!("=== Sitedocs Console ===\n");

    let email = prompt("Email");
    print!("Password: ");
    io::stdout().flush().unwrap();
    let password = rpassword::read_password().expect("Failed to read password");

    let user = match client.api.log_in(&email, &password).await {
        Ok(user) => user,
        Err(err) => {
            eprintln!("Login failed: {}", err);
            std::process::exit(1);
        }
    };
    println!("\nLogged in as {} {} <{}>", user.name, user.surname, user.email);

    let objects = LiveList::<ObjectSite>::new();
    match client.api.objects().await {
        Ok(sites) => objects.replace(sites),
        Err(err) => eprintln!("Could not load objects: {}", err),
    }
    print_objects(&objects.snapshot());

    // Reconcile gateway events into the list; refetch when an event does not
    // carry enough payload to apply locally.
    let mut revision = objects.revision();
    let (channel, events) = client.open_events();
    let api = client.api.clone();
    let driver = tokio::spawn(store::drive(objects.clone(), events, move || {
        let api = api.clone();
        async move { api.objects().await }.boxed()
    }));

    println!("\nWatching for changes (Ctrl-C to quit)...");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = revision.changed() => {
                if changed.is_err() {
                    break;
                }
                print_objects(&objects.snapshot());
            }
        }
    }

    channel.close().await;
    let _ = driver.await;
    println!("\nGoodbye.");
}
