use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use log::{error, info};
use std::env;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use barista::api::models::{CupSize, StatusPatch, Temperature};
use barista::api::{beverages, history, machines, ApiClient};
use barista::capsules::{Capsule, CapsuleInventory};
use barista::config::Config;
use barista::monitor::{self, MonitorEvent};
use barista::store::memory::MemoryStore;
use barista::{inventory, routes, Error, Result};

#[derive(Debug, Parser)]
#[command(name = "barista", version, about = "Manage and simulate smart coffee machines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the in-memory development record store
    Serve {
        /// Preload the beverage catalog with the house recipes
        #[arg(long)]
        seed: bool,
    },
    #[command(subcommand)]
    Machines(MachineCommand),
    #[command(subcommand)]
    Beverages(BeverageCommand),
    #[command(subcommand)]
    Capsules(CapsuleCommand),
    /// Change a machine's settings without brewing
    Control {
        machine_id: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Start a brew, then follow it until it is served
    Brew {
        machine_id: String,
        #[command(flatten)]
        settings: SettingsArgs,
        /// Return once the brew has started instead of monitoring it
        #[arg(long)]
        detach: bool,
    },
    /// Follow a machine's brew; accepts an id, `?id=<id>` or a page URL
    Monitor { target: String },
    /// Show the most recent brews
    History {
        #[arg(long, default_value_t = history::DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum MachineCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        ip: String,
    },
    /// Replace a machine's name, location and IP address
    Edit {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        ip: String,
    },
    /// Delete a machine with its status and capsules
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
enum BeverageCommand {
    List,
    Add {
        name: String,
        #[arg(long)]
        coffee: u8,
        #[arg(long, default_value_t = 0)]
        milk: u8,
    },
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
enum CapsuleCommand {
    List,
    Add { machine_id: String, beverage: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Power {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Size {
    Standard,
    Large,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Temp {
    Hot,
    Cold,
}

#[derive(Debug, Args)]
struct SettingsArgs {
    #[arg(long, value_enum)]
    power: Option<Power>,
    #[arg(long, value_enum)]
    size: Option<Size>,
    #[arg(long)]
    beverage: Option<String>,
    #[arg(long, value_enum)]
    temperature: Option<Temp>,
}

impl SettingsArgs {
    fn patch(&self) -> StatusPatch {
        StatusPatch {
            power_status: self.power.map(|p| matches!(p, Power::On)),
            cup_size: self.size.map(|s| match s {
                Size::Standard => CupSize::Standard,
                Size::Large => CupSize::Large,
            }),
            beverage: self.beverage.as_ref().map(|b| b.trim().to_uppercase()),
            temperature: self.temperature.map(|t| match t {
                Temp::Hot => Temperature::Hot,
                Temp::Cold => Temperature::Cold,
            }),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();
    // Set logging levels if not already set
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "barista=info,tower_http=info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    let config = Config::from_env()?;
    let client = ApiClient::from_config(&config);
    let capsules = CapsuleInventory::new(&config.capsule_inventory);

    match command {
        Command::Serve { seed } => serve(&config, seed).await,
        Command::Machines(MachineCommand::List) => {
            for (machine, status) in inventory::fleet(&client).await? {
                let state = status
                    .map(|s| {
                        format!(
                            "{} {} {}%",
                            if s.power_status { "on" } else { "off" },
                            s.stage,
                            s.progress
                        )
                    })
                    .unwrap_or_else(|| String::from("no status"));
                println!(
                    "{:<6} {:<20} {:<20} {:<16} {}",
                    machine.id, machine.name, machine.location, machine.ip_address, state
                );
            }
            Ok(())
        }
        Command::Machines(MachineCommand::Add { name, location, ip }) => {
            let machine = inventory::new_machine(&name, &location, &ip)?;
            let (machine, _) = inventory::create_machine(&client, &machine).await?;
            println!("Machine '{}' added with ID {}", machine.name, machine.id);
            Ok(())
        }
        Command::Machines(MachineCommand::Edit {
            id,
            name,
            location,
            ip,
        }) => {
            let machine = inventory::edit_machine(&client, &id, &name, &location, &ip).await?;
            println!("Machine '{}' with ID {} updated", machine.name, machine.id);
            Ok(())
        }
        Command::Machines(MachineCommand::Remove { id }) => {
            inventory::delete_machine(&client, &capsules, &id).await?;
            println!("Machine {} deleted", id);
            Ok(())
        }
        Command::Beverages(BeverageCommand::List) => {
            for beverage in beverages::list_beverages(&client).await? {
                println!(
                    "{:<6} {:<16} ({}% coffee / {}% milk)",
                    beverage.id, beverage.name, beverage.coffee_percent, beverage.milk_percent
                );
            }
            Ok(())
        }
        Command::Beverages(BeverageCommand::Add { name, coffee, milk }) => {
            let beverage = inventory::add_beverage(&client, &name, coffee, milk).await?;
            println!("Beverage '{}' added with ID {}", beverage.name, beverage.id);
            Ok(())
        }
        Command::Beverages(BeverageCommand::Remove { id }) => {
            beverages::delete_beverage(&client, &id).await?;
            println!("Beverage {} deleted", id);
            Ok(())
        }
        Command::Capsules(CapsuleCommand::List) => {
            let stock = capsules.list()?;
            if stock.is_empty() {
                println!("No capsules in the inventory yet.");
            }
            for capsule in stock {
                println!("{:<30} {}", capsule.location, capsule.beverage);
            }
            Ok(())
        }
        Command::Capsules(CapsuleCommand::Add {
            machine_id,
            beverage,
        }) => {
            let machine = machines::get_machine(&client, &machine_id).await?;
            capsules.add(Capsule {
                location: format!("{} ({})", machine.name, machine.location),
                machine_id: machine.id,
                beverage: beverage.trim().to_uppercase(),
            })?;
            println!("Capsule added to {}", machine.name);
            Ok(())
        }
        Command::Control {
            machine_id,
            settings,
        } => {
            let status = inventory::update_settings(&client, &machine_id, &settings.patch()).await?;
            println!(
                "Machine {}: power {}, {} {} {}",
                machine_id,
                if status.power_status { "on" } else { "off" },
                status.cup_size,
                status.beverage,
                status.temperature
            );
            Ok(())
        }
        Command::Brew {
            machine_id,
            settings,
            detach,
        } => {
            inventory::start_brew(&client, &machine_id, &settings.patch()).await?;
            if detach {
                println!("Brew started on machine {}", machine_id);
                return Ok(());
            }
            follow(&config, client, &machine_id).await
        }
        Command::Monitor { target } => {
            let machine_id = monitor::machine_id_from_target(&target)?;
            follow(&config, client, &machine_id).await
        }
        Command::History { limit } => {
            let records = history::recent_history(&client, limit).await?;
            if records.is_empty() {
                println!("No brews recorded yet.");
            }
            for record in records {
                let at = record
                    .created_at
                    .map(|at| {
                        at.with_timezone(&chrono::Local)
                            .format("%d/%m/%Y %H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<16} {:<20} {:<12} {:<9} {:<9} {}",
                    record.machine_id,
                    record.ip_address,
                    record.location,
                    record.beverage,
                    record.temperature,
                    record.cup_size,
                    at
                );
            }
            Ok(())
        }
    }
}

async fn serve(config: &Config, seed: bool) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    if seed {
        for (name, coffee, milk) in inventory::HOUSE_RECIPES {
            store.insert_beverage(inventory::new_beverage(name, coffee, milk)?);
        }
        info!("Beverage catalog seeded");
    }
    let app = routes::router(store);

    info!("Listening on http://{}", config.bind_addr);
    axum::Server::bind(&config.bind_addr)
        .serve(app.into_make_service())
        .await
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::Other, e)))
}

/// Terminal rendition of the monitoring view.
async fn follow(config: &Config, client: ApiClient, machine_id: &str) -> Result<()> {
    let mut handle = monitor::spawn(Arc::new(client), machine_id, config.timings);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_milk = false;

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(MonitorEvent::Connected(machine)) => {
                    println!("Monitoring {} ({})", machine.name, machine.location);
                }
                Some(MonitorEvent::Rendered { view, .. }) => println!("{view}"),
                Some(MonitorEvent::MilkRequired) => {
                    awaiting_milk = true;
                    println!("Insert the milk capsule, then press Enter to continue.");
                }
                Some(MonitorEvent::HistoryRecorded(record)) => {
                    println!("Brew recorded in history ({} {})", record.cup_size, record.beverage);
                }
                Some(MonitorEvent::Failed { view, message }) => {
                    println!("{view}  {message}");
                    break;
                }
                Some(MonitorEvent::Stopped) | None => break,
            },
            line = stdin.next_line(), if awaiting_milk => match line {
                Ok(Some(_)) => {
                    awaiting_milk = false;
                    handle.continue_brew().await;
                }
                _ => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.stop().await
}
