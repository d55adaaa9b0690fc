use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use ringview_core::bus::RingEvent;
use ringview_core::coordinator::Operation;
use ringview_core::poller::Poller;
use ringview_core::remote::RemoteRing;
use ringview_core::remote::SharedRemoteRing;
use ringview_core::session::RingSession;
use ringview_node::config;
use ringview_node::config::Config;
use ringview_node::logging::init_logging;
use ringview_node::logging::LogLevel;
use ringview_node::util;
use ringview_rpc::Client;
use tokio::io;
use tokio::io::AsyncBufReadExt;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(about, version = util::build_version(), author)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, default_value_t = LogLevel::Info, value_enum, env)]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Command {
    #[command(about = "Initializes a client configuration file.")]
    Init(InitCommand),
    #[command(about = "Starts the interactive ring watcher.")]
    Run(ClientArgs),
    #[command(about = "Lists the nodes currently on the ring.")]
    Nodes(ClientArgs),
    #[command(about = "Shows the stored payload of one node.")]
    Info(NodeIdCommand),
    #[command(about = "Previews where a key would route.")]
    Hash(HashCommand),
    #[command(about = "Asks the cluster to spawn a new node.")]
    Join(ClientArgs),
    #[command(about = "Asks a node to leave the ring.")]
    Leave(NodeIdCommand),
    #[command(about = "Stores a key/value pair on the ring.")]
    Insert(InsertCommand),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(
        long,
        short = 'c',
        env,
        default_value = config::DEFAULT_CONFIG_PATH,
        help = "Config file location"
    )]
    pub config: String,
}

#[derive(Args, Debug)]
struct InitCommand {
    #[arg(
        long,
        default_value = config::DEFAULT_CONFIG_PATH,
        help = "The location of config file"
    )]
    pub location: String,
}

#[derive(Args, Debug)]
struct ClientArgs {
    #[arg(
        long,
        short = 'u',
        help = "Ring server endpoint url. If not provided, use endpoint_url in config file or http://127.0.0.1:5000",
        env
    )]
    endpoint_url: Option<String>,

    #[command(flatten)]
    config_args: ConfigArgs,
}

#[derive(Args, Debug)]
struct NodeIdCommand {
    #[command(flatten)]
    client_args: ClientArgs,

    id: u64,
}

#[derive(Args, Debug)]
struct HashCommand {
    #[command(flatten)]
    client_args: ClientArgs,

    key: String,
}

#[derive(Args, Debug)]
struct InsertCommand {
    #[command(flatten)]
    client_args: ClientArgs,

    key: String,

    #[arg(help = "Stored value. If not provided, use insert_value from the config file")]
    value: Option<String>,
}

impl ClientArgs {
    fn load_config(&self) -> Config {
        match Config::read_fs(self.config_args.config.as_str()) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("falling back to default config: {e}");
                Config::default()
            }
        }
    }

    fn new_session(&self) -> (Config, Arc<RingSession>) {
        let mut config = self.load_config();
        if let Some(url) = &self.endpoint_url {
            config.endpoint_url = url.clone();
        }
        let remote: SharedRemoteRing = Arc::new(Client::new(&config.endpoint_url));
        let session = RingSession::new(remote);
        (config, session)
    }
}

fn print_state(session: &RingSession) -> anyhow::Result<()> {
    let state = session.state()?;
    if state.snapshot.is_empty() {
        println!("the ring is empty");
        return Ok(());
    }
    println!("{:>6}  {:>6}  selected", "id", "keys");
    for node in state.snapshot.nodes() {
        let marker = if state.selection == Some(node.id) { "*" } else { "" };
        println!("{:>6}  {:>6}  {marker}", node.id, node.key_count);
    }
    Ok(())
}

/// Wait for the debounced preview of `key` to resolve.
async fn await_preview(session: &RingSession, key: &str) -> anyhow::Result<()> {
    session.set_key(key)?;
    for _ in 0..60 {
        if session.key_preview()?.is_some_and(|p| p.for_key == key) {
            return Ok(());
        }
        sleep(Duration::from_millis(50)).await;
    }
    Err(anyhow!("no hash preview resolved for {key:?}"))
}

async fn insert_command(cmd: &InsertCommand) -> anyhow::Result<()> {
    let (config, session) = cmd.client_args.new_session();
    tokio::spawn(session.preview_engine().wait());
    let events = session.subscribe()?;

    await_preview(&session, &cmd.key).await?;
    let value = cmd.value.clone().unwrap_or(config.insert_value);
    session
        .submit(Operation::Insert {
            key: cmd.key.clone(),
            value,
        })
        .await?;

    if let Ok(RingEvent::RouteHighlighted { node_id }) = events.try_recv() {
        println!("key {:?} routed to node {node_id}", cmd.key);
    }
    print_state(&session)
}

const RUN_HELP: &str = "\
commands:
  nodes             refresh and list the ring
  select <id>       select a node
  info [id]         fetch a node's stored payload (default: selected node)
  key <text>        type a key; its routing preview resolves in the background
  preview           show the current key preview
  insert [value]    insert the typed key (value defaults from config)
  join              spawn a new node
  leave [id]        remove a node (default: selected node)
  quit              exit";

async fn dispatch(session: &RingSession, config: &Config, line: &str) -> anyhow::Result<bool> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return Ok(true),
        ["nodes"] => {
            session.refresh().await?;
            print_state(session)?;
        }
        ["select", id] => {
            session.select(id.parse()?)?;
            print_state(session)?;
        }
        ["info", rest @ ..] => {
            let id = match rest {
                [id] => id.parse()?,
                _ => session
                    .state()?
                    .selection
                    .ok_or_else(|| anyhow!("no node selected"))?,
            };
            println!("{}", session.fetch_node_info(id).await?);
        }
        ["key", rest @ ..] => {
            session.set_key(&rest.join(" "))?;
        }
        ["preview"] => match session.key_preview()? {
            Some(p) => println!(
                "key {:?} hashes to {} and routes to node {}",
                p.for_key, p.hash, p.target_node_id
            ),
            None => println!("no preview resolved yet"),
        },
        ["insert", rest @ ..] => {
            let key = session.preview_engine().key()?;
            let value = match rest {
                [value] => value.to_string(),
                _ => config.insert_value.clone(),
            };
            session.submit(Operation::Insert { key, value }).await?;
        }
        ["join"] => {
            session.submit(Operation::Join).await?;
            print_state(session)?;
        }
        ["leave", rest @ ..] => {
            let node_id = match rest {
                [id] => id.parse()?,
                _ => session
                    .state()?
                    .selection
                    .ok_or_else(|| anyhow!("no node selected"))?,
            };
            session.submit(Operation::Leave { node_id }).await?;
            print_state(session)?;
        }
        _ => println!("{RUN_HELP}"),
    }
    Ok(false)
}

async fn run_command(args: &ClientArgs) -> anyhow::Result<()> {
    let (config, session) = args.new_session();
    tokio::spawn(session.preview_engine().wait());
    let poller = Arc::new(Poller::new(session.clone()));
    tokio::spawn(poller.wait(Duration::from_secs(config.poll_interval)));

    let events = session.subscribe()?;
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                RingEvent::RouteHighlighted { node_id } => {
                    println!("-> key routed to node {node_id}");
                }
                _ => {}
            }
        }
    });

    session.refresh().await?;
    print_state(&session)?;
    println!("{RUN_HELP}");

    let mut lines = io::BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match dispatch(&session, &config, line.trim()).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Command::Init(cmd) => {
            let path = Config::default().write_fs(&cmd.location)?;
            println!("config written to {path}");
            Ok(())
        }
        Command::Run(args) => run_command(&args).await,
        Command::Nodes(args) => {
            let (_, session) = args.new_session();
            session.refresh().await?;
            print_state(&session)
        }
        Command::Info(cmd) => {
            let (_, session) = cmd.client_args.new_session();
            session.refresh().await?;
            println!("{}", session.fetch_node_info(cmd.id).await?);
            Ok(())
        }
        Command::Hash(cmd) => {
            let (config, _) = cmd.client_args.new_session();
            let client = Client::new(&config.endpoint_url);
            match client.hash_preview(&cmd.key).await? {
                Some(p) => {
                    println!(
                        "key {:?} hashes to {} and routes to node {}",
                        cmd.key, p.hash, p.successor
                    );
                }
                None => println!("an empty key has no preview"),
            }
            Ok(())
        }
        Command::Join(args) => {
            let (_, session) = args.new_session();
            session.submit(Operation::Join).await?;
            print_state(&session)
        }
        Command::Leave(cmd) => {
            let (_, session) = cmd.client_args.new_session();
            session.refresh().await?;
            session
                .submit(Operation::Leave { node_id: cmd.id })
                .await?;
            print_state(&session)
        }
        Command::Insert(cmd) => insert_command(&cmd).await,
    }
}
