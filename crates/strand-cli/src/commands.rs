use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use colored::Colorize;
use serde_json::json;
use strand_sdk::{Address, Cost, HandleChain, Identity, Meta, Strand, StrandConfig, Task};

use crate::cli::*;

const DEFAULT_CONFIG: &str = "strand.toml";

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let strand = open_strand(cli.config.as_deref())?;
    dispatch(&strand, cli.command, cli.format).await
}

fn open_strand(config: Option<&Path>) -> anyhow::Result<Strand> {
    let config = match config {
        Some(path) => StrandConfig::load(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => StrandConfig::load(DEFAULT_CONFIG)
            .with_context(|| format!("reading {DEFAULT_CONFIG}"))?,
        None => StrandConfig::default(),
    };
    Ok(Strand::open(config)?)
}

async fn dispatch(strand: &Strand, command: Command, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Command::Register(args) => cmd_register(strand, args, format).await,
        Command::Push(args) => cmd_push(strand, args, format).await,
        Command::Replace(args) => cmd_replace(strand, args, format).await,
        Command::Remove(args) => cmd_remove(strand, args, format).await,
        Command::Load(args) => {
            let chain = strand.load(&args.handle).execute().await?;
            print_chain(&args.handle, &chain, format)
        }
        Command::Cat(args) => cmd_cat(strand, args, format).await,
        Command::Profile(args) => cmd_profile(strand, args.action, format).await,
        Command::Owner(args) => cmd_owner(strand, args.action, format).await,
    }
}

/// Run `task`, or only price it when `estimate` is set.
async fn run_or_estimate<C, R, E>(
    task: &Task<C, R, E>,
    estimate: bool,
    format: OutputFormat,
) -> anyhow::Result<Option<R>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if !estimate {
        return Ok(Some(task.execute().await?));
    }
    let cost = task.estimate().await?;
    print_cost(task.label(), &cost, format)?;
    Ok(None)
}

async fn cmd_register(
    strand: &Strand,
    args: RegisterArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let task = strand.register(&args.handle);
    if run_or_estimate(&task, args.estimate, format).await?.is_none() {
        return Ok(());
    }
    match format {
        OutputFormat::Json => print_json(&json!({
            "handle": args.handle,
            "owner": strand.identity(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Registered {} for {}",
                "✓".green().bold(),
                args.handle.yellow(),
                strand.identity().to_string().bold()
            );
            Ok(())
        }
    }
}

async fn cmd_push(strand: &Strand, args: PushArgs, format: OutputFormat) -> anyhow::Result<()> {
    let content = read_content(&args.content)?;
    let task = strand.push(&args.handle, content, to_meta(args.meta));
    match run_or_estimate(&task, args.estimate, format).await? {
        Some(chain) => print_chain(&args.handle, &chain, format),
        None => Ok(()),
    }
}

async fn cmd_replace(
    strand: &Strand,
    args: ReplaceArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let content = read_content(&args.content)?;
    let task = strand.replace(&args.handle, args.uuid, content, to_meta(args.meta));
    match run_or_estimate(&task, args.estimate, format).await? {
        Some(chain) => print_chain(&args.handle, &chain, format),
        None => Ok(()),
    }
}

async fn cmd_remove(strand: &Strand, args: RemoveArgs, format: OutputFormat) -> anyhow::Result<()> {
    let task = strand.remove(&args.handle, args.uuid);
    match run_or_estimate(&task, args.estimate, format).await? {
        Some(chain) => print_chain(&args.handle, &chain, format),
        None => Ok(()),
    }
}

async fn cmd_cat(strand: &Strand, args: CatArgs, format: OutputFormat) -> anyhow::Result<()> {
    let address = Address::parse(&args.address)?;
    let bytes = strand.read_content(&address).await?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "address": address,
            "bytes": bytes.len(),
            "content": String::from_utf8_lossy(&bytes),
        })),
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

async fn cmd_profile(
    strand: &Strand,
    action: ProfileAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        ProfileAction::Get { handle } => {
            let profile = strand.profile(&handle).execute().await?;
            match format {
                OutputFormat::Json => print_json(&profile),
                OutputFormat::Text => {
                    println!("{}", serde_json::to_string_pretty(&profile)?);
                    Ok(())
                }
            }
        }
        ProfileAction::Set { handle, profile, estimate } => {
            let task = strand.set_profile(&handle, profile);
            if run_or_estimate(&task, estimate, format).await?.is_some() {
                report_done("Updated profile of", &handle, format)?;
            }
            Ok(())
        }
    }
}

async fn cmd_owner(
    strand: &Strand,
    action: OwnerAction,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match action {
        OwnerAction::Get { handle } => {
            let owner = strand.owner(&handle).execute().await?;
            match format {
                OutputFormat::Json => print_json(&json!({ "handle": handle, "owner": owner })),
                OutputFormat::Text => {
                    match owner {
                        Some(owner) => {
                            println!("{} is owned by {}", handle.yellow(), owner.to_string().bold())
                        }
                        None => println!("{} is not registered", handle.yellow()),
                    }
                    Ok(())
                }
            }
        }
        OwnerAction::Set { handle, owner, estimate } => {
            let owner = Identity::new(owner)?;
            let task = strand.set_owner(&handle, owner);
            if run_or_estimate(&task, estimate, format).await?.is_some() {
                report_done("Transferred", &handle, format)?;
            }
            Ok(())
        }
    }
}

fn read_content(args: &ContentArgs) -> anyhow::Result<Vec<u8>> {
    match (&args.text, &args.file) {
        (Some(text), _) => Ok(text.clone().into_bytes()),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => anyhow::bail!("either --text or --file is required"),
    }
}

fn to_meta(pairs: Vec<(String, serde_json::Value)>) -> Meta {
    pairs.into_iter().collect()
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| format!("{ms}ms"))
}

fn print_chain(handle: &str, chain: &HandleChain, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&json!({
            "handle": handle,
            "head": chain.head,
            "entries": chain.entries,
        }));
    }

    match &chain.head {
        Some(head) => println!(
            "{} {} ({} entries, head {})",
            "Handle".bold(),
            handle.yellow(),
            chain.len(),
            head.short().cyan()
        ),
        None => {
            println!("{} {} has no entries", "Handle".bold(), handle.yellow());
            return Ok(());
        }
    }
    for entry in &chain.entries {
        let title = entry.meta_str("title").unwrap_or("(untitled)");
        println!(
            "  {} {} {}",
            entry.uuid.to_string().yellow(),
            format_timestamp(entry.timestamp).dimmed(),
            title
        );
        println!("      {}", entry.address.to_string().cyan());
    }
    Ok(())
}

fn print_cost(label: &str, cost: &Cost, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "task": label, "cost": cost })),
        OutputFormat::Text => {
            println!("{} {}: {}", "Estimate".bold(), label.cyan(), cost);
            Ok(())
        }
    }
}

fn report_done(verb: &str, handle: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "handle": handle, "ok": true })),
        OutputFormat::Text => {
            println!("{} {} {}", "✓".green().bold(), verb, handle.yellow());
            Ok(())
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::json;

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["strand"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    async fn registered() -> Strand {
        let strand = Strand::in_memory("alice").unwrap();
        dispatch(&strand, parse(&["register", "news"]), OutputFormat::Text)
            .await
            .unwrap();
        strand
    }

    #[tokio::test]
    async fn push_then_load() {
        let strand = registered().await;
        dispatch(
            &strand,
            parse(&["push", "news", "--text", "hello", "--meta", "title=Hi"]),
            OutputFormat::Json,
        )
        .await
        .unwrap();

        let chain = strand.load("news").execute().await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.entries[0].meta.get("title"), Some(&json!("Hi")));
        assert_eq!(
            strand.read_content(&chain.entries[0].address).await.unwrap(),
            b"hello"
        );
    }

    #[tokio::test]
    async fn estimate_flag_does_not_mutate() {
        let strand = registered().await;
        dispatch(
            &strand,
            parse(&["push", "news", "--text", "hello", "--estimate"]),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        assert!(strand.load("news").execute().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn push_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        std::fs::write(&path, "# from disk").unwrap();

        let strand = registered().await;
        let file = path.to_str().unwrap();
        dispatch(&strand, parse(&["push", "news", "--file", file]), OutputFormat::Text)
            .await
            .unwrap();
        let chain = strand.load("news").execute().await.unwrap();
        assert_eq!(
            strand.read_content(&chain.entries[0].address).await.unwrap(),
            b"# from disk"
        );
    }

    #[tokio::test]
    async fn replace_and_remove_by_uuid() {
        let strand = registered().await;
        for text in ["one", "two"] {
            dispatch(&strand, parse(&["push", "news", "--text", text]), OutputFormat::Text)
                .await
                .unwrap();
        }
        let chain = strand.load("news").execute().await.unwrap();
        let older = chain.entries[1].uuid.to_string();
        let newer = chain.entries[0].uuid.to_string();

        dispatch(
            &strand,
            parse(&["replace", "news", &older, "--text", "uno"]),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        dispatch(&strand, parse(&["remove", "news", &newer]), OutputFormat::Text)
            .await
            .unwrap();

        let chain = strand.load("news").execute().await.unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.entries[0].uuid.to_string(), older);
        assert_eq!(
            strand.read_content(&chain.entries[0].address).await.unwrap(),
            b"uno"
        );
    }

    #[tokio::test]
    async fn remove_unknown_uuid_fails() {
        let strand = registered().await;
        let missing = strand_sdk::Uuid::now_v7().to_string();
        let err = dispatch(&strand, parse(&["remove", "news", &missing]), OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not need modification"));
    }

    #[tokio::test]
    async fn profile_and_owner_commands() {
        let strand = registered().await;
        dispatch(
            &strand,
            parse(&["profile", "set", "news", "{\"bio\":\"daily\"}"]),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        assert_eq!(
            strand.profile("news").execute().await.unwrap(),
            json!({"bio": "daily"})
        );

        dispatch(&strand, parse(&["owner", "set", "news", "bob"]), OutputFormat::Json)
            .await
            .unwrap();
        assert_eq!(
            strand.owner("news").execute().await.unwrap(),
            Some(Identity::new("bob").unwrap())
        );
    }

    #[tokio::test]
    async fn cat_rejects_unknown_scheme() {
        let strand = registered().await;
        assert!(dispatch(&strand, parse(&["cat", "ipfs://abcd"]), OutputFormat::Text)
            .await
            .is_err());
    }

    #[test]
    fn open_reads_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alt.toml");
        std::fs::write(
            &path,
            "identity = \"carol\"\n[registry]\nbackend = \"memory\"\n",
        )
        .unwrap();
        let strand = open_strand(Some(&path)).unwrap();
        assert_eq!(strand.identity().as_str(), "carol");
        assert_eq!(strand.config().storage.root, dir.path().join(".strand/objects"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(open_strand(Some(Path::new("/nonexistent/strand.toml"))).is_err());
    }

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(u64::MAX), format!("{}ms", u64::MAX));
    }
}
